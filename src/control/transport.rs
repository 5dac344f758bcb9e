//! # Control Transports
//!
//! A [`ControlTransport`] yields one control line at a time, asynchronously.
//! Two concrete backends are provided: [`TcpTransport`] (a line-oriented
//! TCP listener, one connection at a time) and [`PipeTransport`] (a named
//! pipe: a Unix FIFO created with `nix::mkfifo`, or a Windows named pipe via
//! `interprocess`). Both reconnect on EOF rather than tearing down the
//! generator, matching the crate's transient-I/O error handling.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::error::RdsError;

/// Yields control lines to the generator loop. Implementors reconnect
/// internally on a dropped peer; only unrecoverable setup failures should
/// surface as `Err`.
#[async_trait]
pub trait ControlTransport: Send {
    /// Waits for and returns the next control line, or `Ok(None)` if the
    /// transport was closed intentionally (no more lines will ever arrive).
    async fn recv_line(&mut self) -> Result<Option<String>, RdsError>;
}

/// A TCP control transport: accepts one connection at a time on the bound
/// port and reads newline-delimited commands from it, re-accepting after
/// the peer disconnects.
pub struct TcpTransport {
    listener: TcpListener,
    current: Option<BufReader<TcpStream>>,
}

impl TcpTransport {
    pub async fn bind(addr: &str) -> Result<Self, RdsError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RdsError::Configuration(format!("failed to bind {addr}: {e}")))?;
        Ok(TcpTransport {
            listener,
            current: None,
        })
    }
}

#[async_trait]
impl ControlTransport for TcpTransport {
    async fn recv_line(&mut self) -> Result<Option<String>, RdsError> {
        loop {
            if self.current.is_none() {
                let (stream, _peer) = self
                    .listener
                    .accept()
                    .await
                    .map_err(|e| RdsError::TransientIo(e.to_string()))?;
                self.current = Some(BufReader::new(stream));
            }

            let reader = self.current.as_mut().expect("just populated above");
            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    // Peer closed; accept the next connection.
                    self.current = None;
                    continue;
                }
                Ok(_) => return Ok(Some(line.trim_end().to_string())),
                Err(e) => {
                    self.current = None;
                    return Err(RdsError::TransientIo(e.to_string()));
                }
            }
        }
    }
}

#[cfg(unix)]
pub use unix_pipe::PipeTransport;

#[cfg(unix)]
mod unix_pipe {
    use std::path::{Path, PathBuf};

    use nix::sys::stat::Mode;
    use nix::unistd::mkfifo;
    use tokio::fs::File;
    use tokio::io::{AsyncBufReadExt, BufReader};

    use super::ControlTransport;
    use crate::error::RdsError;
    use async_trait::async_trait;

    /// A named-pipe control transport backed by a Unix FIFO. The FIFO is
    /// created (if absent) at construction and reopened for reading each
    /// time a writer closes it, since a FIFO reader sees EOF once all
    /// writers disconnect.
    pub struct PipeTransport {
        path: PathBuf,
        current: Option<BufReader<File>>,
    }

    impl PipeTransport {
        pub fn create(path: impl AsRef<Path>) -> Result<Self, RdsError> {
            let path = path.as_ref().to_path_buf();
            if !path.exists() {
                mkfifo(&path, Mode::S_IRUSR | Mode::S_IWUSR)
                    .map_err(|e| RdsError::Configuration(format!("mkfifo {path:?}: {e}")))?;
            }
            Ok(PipeTransport { path, current: None })
        }
    }

    #[async_trait]
    impl ControlTransport for PipeTransport {
        async fn recv_line(&mut self) -> Result<Option<String>, RdsError> {
            loop {
                if self.current.is_none() {
                    let file = File::open(&self.path)
                        .await
                        .map_err(|e| RdsError::TransientIo(e.to_string()))?;
                    self.current = Some(BufReader::new(file));
                }

                let reader = self.current.as_mut().expect("just populated above");
                let mut line = String::new();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        self.current = None;
                        continue;
                    }
                    Ok(_) => return Ok(Some(line.trim_end().to_string())),
                    Err(e) => {
                        self.current = None;
                        return Err(RdsError::TransientIo(e.to_string()));
                    }
                }
            }
        }
    }
}

#[cfg(windows)]
pub use windows_pipe::PipeTransport;

#[cfg(windows)]
mod windows_pipe {
    use interprocess::os::windows::named_pipe::{PipeListenerOptions, PipeMode};

    use super::ControlTransport;
    use crate::error::RdsError;
    use async_trait::async_trait;

    /// A named-pipe control transport backed by a Windows named pipe server,
    /// accepting one client connection at a time.
    pub struct PipeTransport {
        name: String,
    }

    impl PipeTransport {
        pub fn create(name: impl Into<String>) -> Result<Self, RdsError> {
            Ok(PipeTransport { name: name.into() })
        }
    }

    #[async_trait]
    impl ControlTransport for PipeTransport {
        async fn recv_line(&mut self) -> Result<Option<String>, RdsError> {
            // Windows named-pipe connections are accepted and read one
            // line at a time through `interprocess`'s blocking API,
            // bridged onto a blocking task so the generator thread is
            // never touched by this transport's I/O.
            let name = self.name.clone();
            tokio::task::spawn_blocking(move || -> Result<Option<String>, RdsError> {
                let listener = PipeListenerOptions::new()
                    .name(name.into())
                    .mode(PipeMode::Bytes)
                    .create()
                    .map_err(|e| RdsError::Configuration(format!("named pipe setup: {e}")))?;
                let conn = listener
                    .accept()
                    .map_err(|e| RdsError::TransientIo(e.to_string()))?;
                let mut reader = std::io::BufReader::new(conn);
                let mut line = String::new();
                use std::io::BufRead;
                match reader.read_line(&mut line) {
                    Ok(0) => Ok(None),
                    Ok(_) => Ok(Some(line.trim_end().to_string())),
                    Err(e) => Err(RdsError::TransientIo(e.to_string())),
                }
            })
            .await
            .map_err(|e| RdsError::TransientIo(e.to_string()))?
        }
    }
}
