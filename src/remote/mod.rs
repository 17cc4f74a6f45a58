//! Remote Module
//!
//! The remote file server seen as a single retrieval capability.
//!
//! # Implementations
//! - [`FtpRemote`]: one authenticated FTP session, serialized behind a mutex

mod ftp;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use ftp::{FtpRemote, FtpSettings};

// == Fetch Error ==
/// Why a remote retrieval produced no content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The remote server reports the object absent
    #[error("File not found on remote server: {0}")]
    NotFound(String),

    /// The transfer failed part-way or the session is unusable
    #[error("Error reading file from remote server: {0}")]
    Transient(String),
}

// == Remote Store ==
/// Retrieves whole files from the remote server by absolute remote path.
///
/// Failures are never retried by implementations.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetches the full content at `path`.
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError>;
}
