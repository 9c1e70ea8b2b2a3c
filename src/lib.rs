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

//! An asynchronous SSH session client for a single remote host, powered by
//! the rust ssh implementation russh.
//!
//! The heart of this crate is [`Session`]. A session is configured once with
//! [`SessionConfig`], connects lazily on the first operation that needs the
//! remote end, and keeps that one connection cached until it is dropped or
//! explicitly disconnected.
//!
//! # Features
//! * Connect to an SSH host with password authentication
//! * Execute single commands or arbitrarily nested command batches, with the
//!   result mirroring the batch shape one-to-one
//! * List and create remote directories over SFTP
//! * Upload and download files
//! * Open raw `direct-tcpip` tunnels to hosts reachable from the remote end
//!
//! The wire-level transport sits behind the [`Transport`] trait, so tests can
//! drive a [`Session`] against a scripted stand-in while production code uses
//! the bundled [`RusshTransport`].

pub mod command;
pub mod config;
pub mod session;
pub mod transport;

pub use command::{Command, CommandOutput};
pub use config::SessionConfig;
pub use session::Session;
pub use transport::{DirEntry, EntryKind, Error, Result, RusshTransport, Transport};
