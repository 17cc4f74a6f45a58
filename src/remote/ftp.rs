//! FTP Remote
//!
//! Wraps one long-lived, authenticated FTP control connection.
//!
//! suppaftp's sync stream is blocking and a control connection cannot carry
//! two transfers at once, so every retrieval runs on tokio's blocking pool
//! while holding the session mutex. A dropped session is not reconnected:
//! every later fetch fails until the process restarts.

use std::fmt;
use std::io::Read;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use bytes::Bytes;
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream};
use tracing::{info, warn};

use super::{FetchError, RemoteStore};

// == FTP Settings ==
/// Connection parameters for the remote FTP server.
#[derive(Clone)]
pub struct FtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub connect_timeout: Duration,
}

impl fmt::Debug for FtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

// == FTP Remote ==
/// A single FTP session shared by all requests.
#[derive(Clone)]
pub struct FtpRemote {
    session: Arc<Mutex<FtpStream>>,
}

impl FtpRemote {
    // == Connect ==
    /// Dials, logs in and switches to binary mode.
    ///
    /// Blocks the calling thread; any failure here is fatal to startup.
    pub fn connect(settings: &FtpSettings) -> anyhow::Result<Self> {
        let addr = resolve(&settings.host, settings.port)?;

        let mut stream = FtpStream::connect_timeout(addr, settings.connect_timeout)
            .with_context(|| format!("Failed to connect to FTP server at {}", addr))?;
        stream
            .login(settings.username.as_str(), settings.password.as_str())
            .context("Failed to log in to FTP server")?;
        stream
            .transfer_type(FileType::Binary)
            .context("Failed to switch FTP session to binary mode")?;

        info!(%addr, user = %settings.username, "Connected to FTP server");

        Ok(Self {
            session: Arc::new(Mutex::new(stream)),
        })
    }

    // == Quit ==
    /// Politely closes the session during shutdown.
    pub async fn quit(&self) {
        let session = self.session.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut stream = session
                .lock()
                .map_err(|_| "session lock poisoned".to_string())?;
            stream.quit().map_err(|e| e.to_string())
        })
        .await;

        match result {
            Ok(Ok(())) => info!("FTP session closed"),
            Ok(Err(e)) => warn!(error = %e, "Failed to close FTP session"),
            Err(e) => warn!(error = %e, "FTP quit task failed"),
        }
    }
}

#[async_trait]
impl RemoteStore for FtpRemote {
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError> {
        let session = self.session.clone();
        let remote_path = path.to_string();

        tokio::task::spawn_blocking(move || {
            let mut stream = session
                .lock()
                .map_err(|_| FetchError::Transient("FTP session lock poisoned".to_string()))?;
            retrieve(&mut stream, &remote_path)
        })
        .await
        .map_err(|e| FetchError::Transient(format!("FTP transfer task failed: {}", e)))?
    }
}

/// Runs one RETR and always reads its closing reply.
///
/// The closing reply is consumed even when the data read fails, so the
/// control channel stays in step for the next command.
fn retrieve(stream: &mut FtpStream, path: &str) -> Result<Bytes, FetchError> {
    let mut data = stream.retr_as_stream(path).map_err(|e| classify(path, e))?;

    let mut buffer = Vec::new();
    let read = data.read_to_end(&mut buffer);
    let finalized = stream.finalize_retr_stream(data);

    match (read, finalized) {
        (Ok(_), Ok(())) => Ok(Bytes::from(buffer)),
        (Err(e), _) => Err(FetchError::Transient(format!(
            "{}: transfer interrupted: {}",
            path, e
        ))),
        // The server already opened the file, so any closing failure is a
        // broken transfer rather than a missing object.
        (Ok(_), Err(e)) => Err(FetchError::Transient(format!(
            "{}: transfer failed: {}",
            path, e
        ))),
    }
}

/// Maps a failure to start a RETR onto the gateway's two outcomes.
///
/// Only "file unavailable" replies (450, 550, 553) mean the object cannot be
/// served; every other reply or I/O error is a transfer or session failure.
fn classify(path: &str, err: FtpError) -> FetchError {
    match err {
        FtpError::UnexpectedResponse(resp) if matches!(resp.status.code(), 450 | 550 | 553) => {
            FetchError::NotFound(path.to_string())
        }
        other => FetchError::Transient(format!("{}: {}", path, other)),
    }
}

fn resolve(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .with_context(|| format!("Failed to resolve FTP host {}:{}", host, port))?
        .next()
        .ok_or_else(|| anyhow!("FTP host {}:{} resolved to no addresses", host, port))
}
