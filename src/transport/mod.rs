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

//! The transport seam between [`crate::Session`] and the wire.
//!
//! [`Transport`] is the contract a session requires from its secure-shell
//! provider: connect, authenticate, open exec channels, serve SFTP directory
//! operations, move files, open tunnels, and tear the connection down. The
//! production implementation is [`RusshTransport`]; tests substitute a
//! scripted implementation to observe exactly which primitives a session
//! touches.

pub mod error;
pub mod russh;

use std::path::Path;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

pub use self::error::{Error, Result};
pub use self::russh::RusshTransport;

/// Kind of a remote directory entry, best-effort.
///
/// Providers that cannot determine an entry's type report [`EntryKind::File`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryKind {
    /// Regular file, and the fallback when the type is unknown.
    #[default]
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

/// One remote directory entry as returned by [`crate::Session::ls`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Base name of the entry, no path components.
    pub name: String,
    /// Entry type, best-effort.
    pub kind: EntryKind,
}

/// Wire-level primitives a session delegates to.
///
/// A connection handle produced by [`connect`] is only stored by the session
/// once [`authenticate`] has also succeeded, and every handle is consumed by
/// exactly one [`disconnect`] or [`abort`] call.
///
/// [`connect`]: Transport::connect
/// [`authenticate`]: Transport::authenticate
/// [`disconnect`]: Transport::disconnect
/// [`abort`]: Transport::abort
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opaque handle to one established connection.
    type Conn: Send + Sync + 'static;
    /// Opaque handle to one SFTP subsystem instance.
    type Sftp: Send + Sync;
    /// Bidirectional byte stream carrying one exec channel or tunnel.
    type Stream: AsyncRead + AsyncWrite + Send + Unpin + 'static;

    /// Open a transport connection to `host:port`.
    async fn connect(&self, host: &str, port: u16) -> Result<Self::Conn>;

    /// Authenticate the connection with a login/password pair.
    async fn authenticate(&self, conn: &mut Self::Conn, login: &str, password: &str)
        -> Result<()>;

    /// Open an execution channel for one command.
    ///
    /// The returned stream carries the command's output and reaches EOF when
    /// the channel is exhausted; the session reads it to completion.
    async fn open_exec_channel(&self, conn: &Self::Conn, command: &str) -> Result<Self::Stream>;

    /// Open an SFTP subsystem handle on the connection.
    async fn open_sftp_handle(&self, conn: &Self::Conn) -> Result<Self::Sftp>;

    /// List the entries of a remote directory, `.`/`..` included.
    async fn list_directory(&self, sftp: &Self::Sftp, path: &str) -> Result<Vec<DirEntry>>;

    /// Create a remote directory with the given permission mode.
    async fn make_directory(&self, sftp: &Self::Sftp, path: &str, mode: u32) -> Result<()>;

    /// Copy a remote file to a local path.
    async fn recv_file(&self, conn: &Self::Conn, remote_path: &str, local_path: &Path)
        -> Result<()>;

    /// Copy a local file to a remote path with the given permission mode.
    async fn send_file(
        &self,
        conn: &Self::Conn,
        local_path: &Path,
        remote_path: &str,
        mode: u32,
    ) -> Result<()>;

    /// Open a direct TCP forwarding channel to `host:port` as seen from the
    /// remote end.
    async fn open_tunnel(&self, conn: &Self::Conn, host: &str, port: u16) -> Result<Self::Stream>;

    /// Gracefully close the connection, notifying the remote end.
    ///
    /// Best-effort: a failure to deliver the notification is ignored.
    async fn disconnect(&self, conn: Self::Conn);

    /// Synchronously release the connection without waiting for the remote
    /// end. Used when a session is dropped with the connection still live.
    fn abort(&self, conn: Self::Conn);
}
