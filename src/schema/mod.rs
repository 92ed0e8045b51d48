//! Schema module - Configuration, genome and reporting types.

mod action;
mod config;
mod evolution;
mod genome;

pub use action::*;
pub use config::*;
pub use evolution::*;
pub use genome::*;
