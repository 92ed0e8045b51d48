//! Compute module - The environment seam, the demo course and the search.

mod course;
mod environment;

pub mod evolution;

pub use course::*;
pub use environment::*;
