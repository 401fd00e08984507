pub mod config;
pub mod error;
pub mod header_store;

pub use config::OpenConfig;
pub use error::{FormatError, HeaderError, Result};
pub use header_store::HeaderStore;
