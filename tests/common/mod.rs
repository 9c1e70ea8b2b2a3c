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

//! A scripted transport for driving a `Session` without a network.
//!
//! Every primitive records its invocation in a shared [`TransportLog`], so
//! tests can assert not only on results but on exactly which primitives a
//! session touched and in what order.

#![allow(dead_code)] // not every test binary uses every helper

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tether::{DirEntry, Error, Result, Transport};

/// Everything a session asked of the transport.
#[derive(Debug, Default)]
pub struct TransportLog {
    pub connects: usize,
    pub auth_attempts: usize,
    pub exec_commands: Vec<String>,
    pub sftp_opens: usize,
    pub listed_paths: Vec<String>,
    pub created_dirs: Vec<(String, u32)>,
    pub received_files: Vec<(String, PathBuf)>,
    pub sent_files: Vec<(PathBuf, String, u32)>,
    pub tunnels: Vec<(String, u16)>,
    pub disconnects: usize,
}

/// Scripted [`Transport`]: canned outputs and listings, optional failure
/// injection, full invocation logging.
pub struct ScriptedTransport {
    log: Arc<Mutex<TransportLog>>,
    outputs: HashMap<String, String>,
    entries: Vec<DirEntry>,
    fail_connect: bool,
    fail_auth_from: Option<usize>,
    fail_sftp: bool,
    fail_list: bool,
    fail_exec_of: Option<String>,
}

/// Connection handle handed out by [`ScriptedTransport`].
pub struct ScriptedConn;

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(TransportLog::default())),
            outputs: HashMap::new(),
            entries: Vec::new(),
            fail_connect: false,
            fail_auth_from: None,
            fail_sftp: false,
            fail_list: false,
            fail_exec_of: None,
        }
    }

    /// Shared handle to the invocation log; clone it before moving the
    /// transport into a session.
    pub fn log(&self) -> Arc<Mutex<TransportLog>> {
        Arc::clone(&self.log)
    }

    /// Script the output of one command. Unscripted commands yield
    /// `out:<command>`.
    pub fn with_output(mut self, command: &str, output: &str) -> Self {
        self.outputs.insert(command.to_string(), output.to_string());
        self
    }

    /// Script the entries every listing returns, dot entries included.
    pub fn with_entries(mut self, entries: Vec<DirEntry>) -> Self {
        self.entries = entries;
        self
    }

    /// Make every connection attempt fail.
    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Make authentication fail from the given 1-based attempt onwards.
    pub fn failing_auth_from(mut self, attempt: usize) -> Self {
        self.fail_auth_from = Some(attempt);
        self
    }

    /// Make the SFTP subsystem unavailable.
    pub fn failing_sftp(mut self) -> Self {
        self.fail_sftp = true;
        self
    }

    /// Make directory listings fail after the subsystem opens.
    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Make the exec channel for one specific command fail to open.
    pub fn failing_exec_of(mut self, command: &str) -> Self {
        self.fail_exec_of = Some(command.to_string());
        self
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    type Conn = ScriptedConn;
    type Sftp = ();
    type Stream = DuplexStream;

    async fn connect(&self, _host: &str, _port: u16) -> Result<Self::Conn> {
        if self.fail_connect {
            return Err(Error::ConnectionFailed("host unreachable".to_string()));
        }
        self.log.lock().unwrap().connects += 1;
        Ok(ScriptedConn)
    }

    async fn authenticate(
        &self,
        _conn: &mut Self::Conn,
        _login: &str,
        _password: &str,
    ) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.auth_attempts += 1;
        if self
            .fail_auth_from
            .is_some_and(|from| log.auth_attempts >= from)
        {
            return Err(Error::AuthenticationFailed);
        }
        Ok(())
    }

    async fn open_exec_channel(&self, _conn: &Self::Conn, command: &str) -> Result<Self::Stream> {
        let output = self
            .outputs
            .get(command)
            .cloned()
            .unwrap_or_else(|| format!("out:{command}"));
        self.log
            .lock()
            .unwrap()
            .exec_commands
            .push(command.to_string());
        if self.fail_exec_of.as_deref() == Some(command) {
            return Err(Error::ChannelFailed("exec channel refused".to_string()));
        }

        let (mut tx, rx) = tokio::io::duplex(output.len().max(1) + 16);
        tx.write_all(output.as_bytes()).await?;
        drop(tx); // EOF marks the channel exhausted
        Ok(rx)
    }

    async fn open_sftp_handle(&self, _conn: &Self::Conn) -> Result<Self::Sftp> {
        if self.fail_sftp {
            return Err(Error::ChannelFailed("sftp subsystem refused".to_string()));
        }
        self.log.lock().unwrap().sftp_opens += 1;
        Ok(())
    }

    async fn list_directory(&self, _sftp: &Self::Sftp, path: &str) -> Result<Vec<DirEntry>> {
        self.log.lock().unwrap().listed_paths.push(path.to_string());
        if self.fail_list {
            return Err(Error::ChannelFailed("cannot open path".to_string()));
        }
        Ok(self.entries.clone())
    }

    async fn make_directory(&self, _sftp: &Self::Sftp, path: &str, mode: u32) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .created_dirs
            .push((path.to_string(), mode));
        Ok(())
    }

    async fn recv_file(
        &self,
        _conn: &Self::Conn,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .received_files
            .push((remote_path.to_string(), local_path.to_path_buf()));
        Ok(())
    }

    async fn send_file(
        &self,
        _conn: &Self::Conn,
        local_path: &Path,
        remote_path: &str,
        mode: u32,
    ) -> Result<()> {
        self.log.lock().unwrap().sent_files.push((
            local_path.to_path_buf(),
            remote_path.to_string(),
            mode,
        ));
        Ok(())
    }

    async fn open_tunnel(&self, _conn: &Self::Conn, host: &str, port: u16) -> Result<Self::Stream> {
        self.log
            .lock()
            .unwrap()
            .tunnels
            .push((host.to_string(), port));
        let (far_end, near_end) = tokio::io::duplex(1024);
        tokio::spawn(greet_then_echo(far_end));
        Ok(near_end)
    }

    async fn disconnect(&self, _conn: Self::Conn) {
        self.log.lock().unwrap().disconnects += 1;
    }

    fn abort(&self, _conn: Self::Conn) {
        self.log.lock().unwrap().disconnects += 1;
    }
}

/// Remote side of a scripted tunnel: says hello, then echoes.
async fn greet_then_echo(mut stream: DuplexStream) {
    if stream.write_all(b"ready\n").await.is_err() {
        return;
    }
    let mut buf = [0u8; 1024];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if stream.write_all(&buf[..n]).await.is_err() {
                    break;
                }
            }
        }
    }
}
