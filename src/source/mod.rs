//! Byte sources for the diff and log views.
//!
//! - [`command`]: argument builders and the [`CommandRunner`] seam
//! - [`fetcher`]: worker threads turning a [`ByteStream`] into view events

pub mod command;
pub mod fetcher;

pub use command::{
    log_args, BufferStream, ByteStream, ChildStream, CommandRunner, DiffRequest, DiffTarget,
    GitRunner, StopHandle, LOG_FORMAT, LOG_RECORD_SEPARATOR,
};
pub use fetcher::{DiffFetcher, FetchEvent, LogFetcher, READ_CHUNK_SIZE};
