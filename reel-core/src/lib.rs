//! reel-core: framework-agnostic errors and configuration for Reel.

pub mod config;
pub mod errors;

pub use config::{ReelConfig, ReelConfigSnapshot};
pub use errors::{ErrorKind, ReelError, ReelResult};
