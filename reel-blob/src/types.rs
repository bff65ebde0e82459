use bytes::Bytes;
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{BlobError, BlobResult};

/// Stream of bytes for blob content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Unique identifier for a video record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub u64);

impl VideoId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VideoId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(VideoId)
    }
}

/// Hands out ids that look like creation timestamps (milliseconds) but
/// never repeat: each id is `max(now, last + 1)`.
#[derive(Debug)]
pub struct VideoIdGenerator {
    last: AtomicU64,
}

impl VideoIdGenerator {
    /// Start after an id that is already taken.
    pub fn seeded(last: Option<VideoId>) -> Self {
        Self {
            last: AtomicU64::new(last.map(|id| id.0).unwrap_or(0)),
        }
    }

    pub fn next_id(&self) -> BlobResult<VideoId> {
        let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
        self.next_at(now)
    }

    fn next_at(&self, now: u64) -> BlobResult<VideoId> {
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = last
                .checked_add(1)
                .ok_or(BlobError::IdsExhausted { last })?;
            let candidate = now.max(next);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return Ok(VideoId(candidate)),
                Err(current) => last = current,
            }
        }
    }
}

/// Request to store a video
#[derive(Debug, Clone, Default)]
pub struct BlobPut {
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl BlobPut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filename<S: Into<String>>(mut self, filename: S) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// One byte range, as written in a `Range: bytes=...` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `start-` or `start-end` (inclusive)
    From { start: u64, end: Option<u64> },
    /// `-length`: the last `length` bytes
    Suffix { length: u64 },
}

impl ByteRange {
    pub fn new(start: u64, end: Option<u64>) -> Self {
        Self::From { start, end }
    }

    pub fn from_start(start: u64) -> Self {
        Self::From { start, end: None }
    }

    pub fn suffix(length: u64) -> Self {
        Self::Suffix { length }
    }

    /// Parse `bytes=<start>-<end>`, `bytes=<start>-` or `bytes=-<n>`.
    ///
    /// Returns None for another unit, several ranges, or bounds that are not
    /// numbers.
    pub fn parse(header: &str) -> Option<Self> {
        let (unit, ranges) = header.trim().split_once('=')?;
        if unit.trim() != "bytes" {
            return None;
        }
        let ranges = ranges.trim();
        if ranges.contains(',') {
            return None;
        }
        let (start_str, end_str) = ranges.split_once('-')?;
        let (start_str, end_str) = (start_str.trim(), end_str.trim());

        if start_str.is_empty() {
            return end_str.parse().ok().map(Self::suffix);
        }

        let start = start_str.parse().ok()?;
        let end = if end_str.is_empty() {
            None
        } else {
            Some(end_str.parse().ok()?)
        };
        Some(Self::From { start, end })
    }

    /// Clamp against the file size. None when nothing can be served.
    pub fn resolve(&self, total_size: u64) -> Option<crate::ResolvedRange> {
        if total_size == 0 {
            return None;
        }
        let last = total_size - 1;
        let (start, end) = match *self {
            Self::From { start, end } => (start, end.unwrap_or(last).min(last)),
            Self::Suffix { length: 0 } => return None,
            Self::Suffix { length } => (total_size.saturating_sub(length), last),
        };
        if start > end {
            return None;
        }
        Some(crate::ResolvedRange {
            start,
            end,
            total_size,
        })
    }
}

/// What the caller asked to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// No range: the whole file
    Full,
    Partial(ByteRange),
    /// A range header was sent but could not be parsed
    Unsatisfiable,
}

impl RangeRequest {
    pub fn from_header(header: Option<&str>) -> Self {
        match header {
            None => Self::Full,
            Some(value) => ByteRange::parse(value).map_or(Self::Unsatisfiable, Self::Partial),
        }
    }
}
