pub mod metrics_service;
pub mod status_service;
pub mod validation_service;
