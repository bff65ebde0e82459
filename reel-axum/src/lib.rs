//! reel-axum: HTTP surface for Reel.
//!
//! Routes requests onto a [`reel_blob::BlobAdapter`] and maps its results and
//! errors back onto HTTP.

pub mod app;
pub mod multipart;
pub mod range;
pub mod rest;
pub mod state;
mod error;
pub use error::{blob_error_to_reel, ReelAxumError};
pub use state::ReelAxumState;

pub use app::{axum, AxumApp};
