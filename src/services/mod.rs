pub mod session;
pub mod workflow;
