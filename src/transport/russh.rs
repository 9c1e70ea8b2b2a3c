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

//! The production [`Transport`] over russh and russh-sftp.
//!
//! Command channels and tunnels are surfaced as [`ChannelStream`]s; file
//! transfer and directory operations ride the SFTP subsystem. Host keys are
//! accepted without verification: this client carries no host-key policy,
//! which is acceptable for lab and automation use but not for hostile
//! networks.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{Config, Handle, Handler, Msg};
use russh::{ChannelStream, Disconnect};
use russh_sftp::client::SftpSession;
use russh_sftp::protocol::{FileAttributes, OpenFlags};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::error::{Error, Result};
use super::{DirEntry, EntryKind, Transport};

// Idle connections are dropped by the server side eventually anyway; five
// minutes matches common sshd defaults.
const INACTIVITY_TIMEOUT_SECS: u64 = 300;

/// Transport implementation backed by russh.
pub struct RusshTransport {
    config: Arc<Config>,
}

impl RusshTransport {
    pub fn new() -> Self {
        let config = Config {
            inactivity_timeout: Some(Duration::from_secs(INACTIVITY_TIMEOUT_SECS)),
            ..Default::default()
        };
        Self {
            config: Arc::new(config),
        }
    }

    /// Same as [`RusshTransport::new`], but with a non-default
    /// [`russh::client::Config`].
    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl Default for RusshTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// A live, possibly not yet authenticated, russh connection.
pub struct RusshConnection {
    handle: Handle<AcceptingHandler>,
}

/// Client handler that accepts any server key.
#[derive(Debug, Clone)]
pub(crate) struct AcceptingHandler;

impl Handler for AcceptingHandler {
    type Error = Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh::keys::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        Ok(true)
    }
}

impl RusshTransport {
    /// Open an SSH session channel bootstrapped into the SFTP subsystem.
    async fn sftp_session(&self, conn: &RusshConnection) -> Result<SftpSession> {
        let channel = conn.handle.channel_open_session().await?;
        channel.request_subsystem(true, "sftp").await?;
        let sftp = SftpSession::new(channel.into_stream()).await?;
        Ok(sftp)
    }
}

#[async_trait]
impl Transport for RusshTransport {
    type Conn = RusshConnection;
    type Sftp = SftpSession;
    type Stream = ChannelStream<Msg>;

    async fn connect(&self, host: &str, port: u16) -> Result<Self::Conn> {
        tracing::debug!(%host, port, "opening ssh connection");
        let handle =
            russh::client::connect(self.config.clone(), (host, port), AcceptingHandler).await?;
        Ok(RusshConnection { handle })
    }

    async fn authenticate(
        &self,
        conn: &mut Self::Conn,
        login: &str,
        password: &str,
    ) -> Result<()> {
        let auth_result = conn.handle.authenticate_password(login, password).await?;
        if !auth_result.success() {
            tracing::debug!(%login, "password authentication rejected");
            return Err(Error::AuthenticationFailed);
        }
        tracing::debug!(%login, "authenticated");
        Ok(())
    }

    async fn open_exec_channel(&self, conn: &Self::Conn, command: &str) -> Result<Self::Stream> {
        let channel = conn.handle.channel_open_session().await?;
        channel.exec(true, command).await?;
        Ok(channel.into_stream())
    }

    async fn open_sftp_handle(&self, conn: &Self::Conn) -> Result<Self::Sftp> {
        self.sftp_session(conn).await
    }

    async fn list_directory(&self, sftp: &Self::Sftp, path: &str) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in sftp.read_dir(path).await? {
            let file_type = entry.metadata().file_type();
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_symlink() {
                EntryKind::Symlink
            } else {
                // covers regular files and anything the server could not type
                EntryKind::File
            };
            entries.push(DirEntry {
                name: entry.file_name(),
                kind,
            });
        }
        Ok(entries)
    }

    async fn make_directory(&self, sftp: &Self::Sftp, path: &str, mode: u32) -> Result<()> {
        sftp.create_dir(path).await?;
        let attrs = FileAttributes {
            permissions: Some(mode),
            ..Default::default()
        };
        sftp.set_metadata(path, attrs).await?;
        Ok(())
    }

    async fn recv_file(
        &self,
        conn: &Self::Conn,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<()> {
        let sftp = self.sftp_session(conn).await?;

        let mut remote_file = sftp.open_with_flags(remote_path, OpenFlags::READ).await?;
        let mut contents = Vec::new();
        remote_file.read_to_end(&mut contents).await?;

        let mut local_file = tokio::fs::File::create(local_path).await?;
        local_file.write_all(&contents).await?;
        local_file.flush().await?;

        tracing::debug!(%remote_path, ?local_path, bytes = contents.len(), "file received");
        Ok(())
    }

    async fn send_file(
        &self,
        conn: &Self::Conn,
        local_path: &Path,
        remote_path: &str,
        mode: u32,
    ) -> Result<()> {
        let contents = tokio::fs::read(local_path).await?;
        let sftp = self.sftp_session(conn).await?;

        let mut remote_file = sftp
            .open_with_flags(
                remote_path,
                OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::WRITE,
            )
            .await?;
        remote_file.write_all(&contents).await?;
        remote_file.flush().await?;
        remote_file.shutdown().await?;

        let attrs = FileAttributes {
            permissions: Some(mode),
            ..Default::default()
        };
        sftp.set_metadata(remote_path, attrs).await?;

        tracing::debug!(?local_path, %remote_path, bytes = contents.len(), "file sent");
        Ok(())
    }

    async fn open_tunnel(&self, conn: &Self::Conn, host: &str, port: u16) -> Result<Self::Stream> {
        tracing::debug!(%host, port, "opening direct-tcpip channel");
        let channel = conn
            .handle
            .channel_open_direct_tcpip(host, u32::from(port), "127.0.0.1", 22)
            .await?;
        Ok(channel.into_stream())
    }

    async fn disconnect(&self, conn: Self::Conn) {
        if let Err(err) = conn
            .handle
            .disconnect(Disconnect::ByApplication, "", "")
            .await
        {
            // termination notice is best-effort
            tracing::debug!(%err, "disconnect notification failed");
        }
    }

    fn abort(&self, conn: Self::Conn) {
        // Without a reachable runtime the handle is simply dropped, which
        // closes the underlying socket.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = conn
                    .handle
                    .disconnect(Disconnect::ByApplication, "", "")
                    .await;
            });
        }
    }
}
