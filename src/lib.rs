//src/lib.rs

// Declaração dos nossos módulos
pub mod api;
pub mod common;
pub mod config;
pub mod guard;
pub mod models;
pub mod services;
pub mod store;

pub use crate::api::client::ApiClient;
pub use crate::common::error::ApiError;
pub use crate::config::ApiConfig;
pub use crate::services::session::SessionManager;
pub use crate::services::workflow::BeneficioWorkflow;
