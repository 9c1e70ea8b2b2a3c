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

//! Session configuration: the connection parameters a [`crate::Session`]
//! is constructed with. The target of a session is fixed at construction;
//! reaching a different host requires a new session.

use std::fmt;

use zeroize::Zeroizing;

/// Default SSH port.
pub const DEFAULT_PORT: u16 = 22;

/// Connection parameters for a session.
///
/// Defaults mirror a local root login: host `localhost`, login `root`,
/// empty password, port 22.
#[derive(Clone)]
pub struct SessionConfig {
    /// Remote host name or address.
    pub host: String,
    /// Login name used for password authentication.
    pub login: String,
    /// Password, kept on a zeroizing allocation and redacted from `Debug`.
    pub password: Zeroizing<String>,
    /// Remote SSH port.
    pub port: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            login: "root".to_string(),
            password: Zeroizing::new(String::new()),
            port: DEFAULT_PORT,
        }
    }
}

impl SessionConfig {
    /// Create a configuration for `login@host` with the default port.
    pub fn new(host: impl Into<String>, login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            login: login.into(),
            password: Zeroizing::new(password.into()),
            port: DEFAULT_PORT,
        }
    }

    /// Override the remote port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .finish()
    }
}
