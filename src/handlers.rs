pub mod metricas;
pub mod notas;
