//! # reel-blob: video storage with range-friendly streaming
//!
//! `reel-blob` keeps uploaded videos on the local filesystem and their
//! metadata in a single JSON document. It knows nothing about HTTP: the
//! handlers in `reel-axum` embed a [`BlobAdapter`] and translate requests
//! into its calls.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reel_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let store = FsBlobStore::open("./videos/uploads").await?;
//! let catalog = JsonMetadataStore::open("./videos").await?;
//! let adapter = BlobAdapter::new(store, catalog, BlobConfig::default()).await?;
//!
//! let body: ByteStream = Box::pin(futures_util::stream::once(async {
//!     Ok(bytes::Bytes::from_static(b"not really a movie"))
//! }));
//! let record = adapter
//!     .put(BlobPut::new().with_filename("holiday.mp4"), body)
//!     .await?;
//!
//! let opened = adapter
//!     .open(record.id, RangeRequest::from_header(Some("bytes=0-3")))
//!     .await?;
//! assert_eq!(opened.content_length(), 4);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  HTTP handlers  │  ← request/response mapping only
//! ├─────────────────┤
//! │   BlobAdapter   │  ← upload rules, ids, range resolution
//! ├────────┬────────┤
//! │BlobStore│Metadata│  ← bytes on disk / records in metadata.json
//! └────────┴────────┘
//! ```

pub mod adapter;
pub mod catalog;
mod config;
mod error;
mod fs_store;
mod receipt;
pub mod store;
mod types;

// Re-export main types for clean API
pub use adapter::BlobAdapter;
pub use catalog::{JsonMetadataStore, MemoryMetadataStore, MetadataStore, METADATA_FILE};
pub use config::BlobConfig;
pub use error::{BlobError, BlobResult};
pub use fs_store::FsBlobStore;
pub use receipt::{OpenedBlob, ResolvedRange, VideoRecord};
pub use store::{BlobKeyStrategy, BlobStore, DefaultKeyStrategy, GetResult, ObjectHead, PutResult};
pub use types::{BlobPut, ByteRange, ByteStream, RangeRequest, VideoId, VideoIdGenerator};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobAdapter, BlobConfig, BlobError, BlobPut, BlobResult, BlobStore, ByteStream,
        FsBlobStore, JsonMetadataStore, MetadataStore, OpenedBlob, RangeRequest, VideoId,
        VideoRecord,
    };
}
