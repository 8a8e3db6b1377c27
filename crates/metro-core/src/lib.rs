pub mod config;
pub mod error;
pub mod types;

pub use config::MetroConfig;
pub use error::{MetroError, Result};
pub use types::*;
