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

//! Back up a MySQL database from a remote server: dump and compress it
//! remotely, download the archive, then clean up.
//!
//! ```sh
//! cargo run --example backup
//! ```

use anyhow::Result;
use tether::{batch, Session, SessionConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .init();

    let config = SessionConfig::new("ssh.example.com", "root", "123456");
    let mut session = Session::new(config);

    // Dump and compress on the server.
    session
        .invoke(batch![
            "mysqldump -u root -p123456 base > /tmp/bases",
            "gzip -9 /tmp/bases",
        ])
        .await?;

    // Fetch the archive.
    session
        .download("/tmp/bases.gz", "/var/backups/bases.gz")
        .await?;

    // Remove the remote copy.
    session.invoke("rm /tmp/bases.gz").await?;

    session.disconnect().await;
    Ok(())
}
