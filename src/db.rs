pub mod nota_repo;
pub use nota_repo::NotaRepository;
pub mod historico_repo;
pub use historico_repo::{HistoricoRepository, TransitionStore};
