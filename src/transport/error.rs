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

use std::io;

use thiserror::Error;

/// Error type for session and transport operations.
///
/// Transport failures are deliberately coarse: a caller cannot tell a remote
/// error from a transport error, only that the operation did not succeed.
#[derive(Debug, Error)]
pub enum Error {
    /// Local or stream I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// SSH protocol error from russh.
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// SFTP subsystem error from russh-sftp.
    #[error("SFTP error: {0}")]
    Sftp(#[from] russh_sftp::client::error::Error),

    /// The server rejected the login/password pair.
    #[error("authentication rejected by server")]
    AuthenticationFailed,

    /// The remote host could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A channel could not be opened or was refused.
    #[error("channel failed: {0}")]
    ChannelFailed(String),

    /// An operation required a live connection and none was present.
    #[error("not connected")]
    NotConnected,
}

/// Result alias for session and transport operations.
pub type Result<T> = std::result::Result<T, Error>;
