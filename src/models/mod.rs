pub mod auth;
pub mod beneficio;
