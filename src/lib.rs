pub mod check;
pub mod config;
pub mod error;
pub mod exchange;
pub mod quest;
pub mod solutions;

pub use error::{LoresmithError, Result};
