pub mod auth;
pub mod beneficios;
pub mod client;
pub mod perfis;
