// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The session: one remote host, one lazily established connection, and the
//! operations that ride it.
//!
//! A [`Session`] connects on the first operation that needs the remote end
//! and caches the connection until [`disconnect`](Session::disconnect) or
//! drop. The connection handle exists only while a connect + authenticate
//! pair has succeeded, and is released exactly once no matter how the
//! session's lifetime ends.

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use tokio::io::AsyncReadExt;

use crate::command::{Command, CommandOutput};
use crate::config::SessionConfig;
use crate::transport::{DirEntry, Error, Result, RusshTransport, Transport};

/// Permission mode applied to uploads unless overridden.
pub const DEFAULT_UPLOAD_MODE: u32 = 0o777;

/// A client session against a single remote host.
///
/// Operations take `&mut self`; the borrow checker enforces that the cached
/// connection is never used from two operations at once. Commands within one
/// [`invoke`](Session::invoke) batch run strictly sequentially.
pub struct Session<T: Transport = RusshTransport> {
    config: SessionConfig,
    transport: T,
    conn: Option<T::Conn>,
}

impl Session<RusshTransport> {
    /// Create a session over the bundled russh transport.
    ///
    /// No connection is made until the first operation needs one.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_transport(config, RusshTransport::new())
    }
}

impl<T: Transport> Session<T> {
    /// Create a session over a caller-supplied transport.
    pub fn with_transport(config: SessionConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            conn: None,
        }
    }

    /// The configuration this session was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether a connect + authenticate pair has succeeded and the
    /// connection is still cached.
    pub fn connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Establish the connection if none is cached.
    ///
    /// Idempotent: when already connected this returns without touching the
    /// transport, so authentication happens at most once per connection.
    /// A failure leaves the session disconnected but usable; a later call
    /// retries from scratch.
    pub async fn connect(&mut self) -> Result<()> {
        self.ensure_connected().await.map(|_| ())
    }

    async fn ensure_connected(&mut self) -> Result<&T::Conn> {
        if self.conn.is_none() {
            tracing::debug!(host = %self.config.host, port = self.config.port, "connecting");
            let mut conn = self
                .transport
                .connect(&self.config.host, self.config.port)
                .await?;
            self.transport
                .authenticate(&mut conn, &self.config.login, self.config.password.as_str())
                .await?;
            self.conn = Some(conn);
        }
        self.conn.as_ref().ok_or(Error::NotConnected)
    }

    /// Close the connection, notifying the remote end best-effort.
    ///
    /// Runs at most once per live connection; calling it again, or dropping
    /// the session afterwards, sends nothing further.
    pub async fn disconnect(&mut self) {
        if let Some(conn) = self.conn.take() {
            tracing::debug!(host = %self.config.host, "disconnecting");
            self.transport.disconnect(conn).await;
        }
    }

    /// Disconnect, then connect again, returning the connect result.
    pub async fn reconnect(&mut self) -> Result<()> {
        self.disconnect().await;
        self.connect().await
    }

    /// Evaluate a command or a nested batch of commands.
    ///
    /// The result mirrors the input shape exactly: a single command yields
    /// its raw output unwrapped, a batch yields a batch of results with
    /// sibling order preserved, nested to the same depth. The first failing
    /// command aborts the invocation.
    ///
    /// Commands run with no timeout; a remote command that never exits
    /// blocks the caller indefinitely. Wrap the call in
    /// `tokio::time::timeout` if a bound is needed.
    pub async fn invoke(&mut self, command: impl Into<Command>) -> Result<CommandOutput> {
        self.eval(command.into()).await
    }

    fn eval<'a>(
        &'a mut self,
        command: Command,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput>> + Send + 'a>> {
        Box::pin(async move {
            match command {
                Command::Exec(command) => Ok(CommandOutput::Output(self.exec(&command).await?)),
                Command::Batch(commands) => {
                    let mut results = Vec::with_capacity(commands.len());
                    for command in commands {
                        results.push(self.eval(command).await?);
                    }
                    Ok(CommandOutput::Batch(results))
                }
            }
        })
    }

    /// Execute one command and return its accumulated output.
    ///
    /// Connects if needed, opens an execution channel, and reads it to
    /// exhaustion; output is decoded lossily as UTF-8. No timeout is
    /// enforced (see [`invoke`](Session::invoke)).
    pub async fn exec(&mut self, command: &str) -> Result<String> {
        self.connect().await?;
        let conn = self.conn.as_ref().ok_or(Error::NotConnected)?;

        tracing::debug!(%command, "executing");
        let mut stream = self.transport.open_exec_channel(conn, command).await?;
        let mut output = Vec::new();
        stream.read_to_end(&mut output).await?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    /// List a remote directory.
    ///
    /// `.` and `..` are excluded, backslashes in `path` are normalized to
    /// forward slashes, and the path is listed with exactly one trailing
    /// slash (the root is listed as `/./`).
    ///
    /// Returns an empty listing both for an empty directory and when the
    /// SFTP subsystem or the path cannot be opened — the two cases are not
    /// distinguishable here. A connection failure still surfaces as `Err`.
    pub async fn ls(&mut self, path: &str) -> Result<Vec<DirEntry>> {
        self.connect().await?;
        let conn = self.conn.as_ref().ok_or(Error::NotConnected)?;

        let sftp = match self.transport.open_sftp_handle(conn).await {
            Ok(sftp) => sftp,
            Err(err) => {
                tracing::debug!(%err, "sftp unavailable, reporting empty listing");
                return Ok(Vec::new());
            }
        };

        let path = normalize_listing_path(path);
        let entries = match self.transport.list_directory(&sftp, &path).await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(%err, %path, "listing failed, reporting empty");
                return Ok(Vec::new());
            }
        };

        Ok(entries
            .into_iter()
            .filter(|entry| entry.name != "." && entry.name != "..")
            .collect())
    }

    /// Create a remote directory with the given permission mode.
    pub async fn mkdir(&mut self, path: &str, mode: u32) -> Result<()> {
        self.connect().await?;
        let conn = self.conn.as_ref().ok_or(Error::NotConnected)?;

        let sftp = self.transport.open_sftp_handle(conn).await?;
        tracing::debug!(%path, mode, "creating remote directory");
        self.transport.make_directory(&sftp, path, mode).await
    }

    /// Download a remote file to a local path.
    pub async fn download(&mut self, remote_path: &str, local_path: impl AsRef<Path>) -> Result<()> {
        self.connect().await?;
        let conn = self.conn.as_ref().ok_or(Error::NotConnected)?;
        self.transport
            .recv_file(conn, remote_path, local_path.as_ref())
            .await
    }

    /// Upload a local file to a remote path with mode `0o777`.
    pub async fn upload(&mut self, local_path: impl AsRef<Path>, remote_path: &str) -> Result<()> {
        self.upload_with_mode(local_path, remote_path, DEFAULT_UPLOAD_MODE)
            .await
    }

    /// Upload a local file to a remote path with an explicit permission mode.
    pub async fn upload_with_mode(
        &mut self,
        local_path: impl AsRef<Path>,
        remote_path: &str,
        mode: u32,
    ) -> Result<()> {
        self.connect().await?;
        let conn = self.conn.as_ref().ok_or(Error::NotConnected)?;
        self.transport
            .send_file(conn, local_path.as_ref(), remote_path, mode)
            .await
    }

    /// Open a raw forwarding tunnel to `host:port` as seen from the remote
    /// end, returning the bidirectional stream.
    ///
    /// The session does not manage the tunnel beyond creation; the caller
    /// owns the returned stream.
    pub async fn tunnel(&mut self, host: &str, port: u16) -> Result<T::Stream> {
        self.connect().await?;
        let conn = self.conn.as_ref().ok_or(Error::NotConnected)?;
        self.transport.open_tunnel(conn, host, port).await
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            tracing::debug!(host = %self.config.host, "session dropped while connected");
            self.transport.abort(conn);
        }
    }
}

impl<T: Transport> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("connected", &self.connected())
            .finish()
    }
}

/// Prepare a caller-supplied path for listing: forward slashes only, one
/// trailing slash, root spelled `/./` so it never lists as empty.
fn normalize_listing_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    if path == "/" {
        "/./".to_string()
    } else {
        format!("{}/", path.trim_end_matches('/'))
    }
}
