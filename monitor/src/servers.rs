//! Server-list collaborator
//!
//! Owns the shared list of configured servers. The polling side only
//! ever takes immutable snapshots at cycle start; additions and
//! removals happen on the consumer side between cycles. The list is
//! persisted as a plain text file, one `host:port` per line, seeded
//! with a default set on first run.

use log::{info, warn};
use shared::ServerAddress;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Seed list written when no server file exists yet.
pub const DEFAULT_SERVERS: [&str; 7] = [
    "pug1.war-lords.net:27020",
    "pug2.war-lords.net:27021",
    "pug3.war-lords.net:27022",
    "pug1eu.war-lords.net:27016",
    "193.31.28.17:27015",
    "193.31.28.17:27035",
    "31.58.91.239:27015",
];

/// Cloneable handle to the configured server list.
#[derive(Debug, Clone)]
pub struct ServerList {
    entries: Arc<RwLock<Vec<ServerAddress>>>,
    path: Option<PathBuf>,
}

impl ServerList {
    /// In-memory list with no backing file. Used by tests and callers
    /// that manage persistence themselves.
    pub fn from_addresses(addresses: Vec<ServerAddress>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(addresses)),
            path: None,
        }
    }

    /// Loads the list from `path`, writing the default set first if the
    /// file does not exist. Unparseable lines are skipped with a warning
    /// rather than failing the whole load.
    pub fn load_or_seed(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            std::fs::write(path, DEFAULT_SERVERS.join("\n"))?;
            info!("seeded {} with {} default servers", path.display(), DEFAULT_SERVERS.len());
        }

        let contents = std::fs::read_to_string(path)?;
        let mut addresses = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<ServerAddress>() {
                Ok(address) => addresses.push(address),
                Err(e) => warn!("skipping bad server entry '{}': {}", line, e),
            }
        }

        info!("loaded {} servers from {}", addresses.len(), path.display());
        Ok(Self {
            entries: Arc::new(RwLock::new(addresses)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Immutable copy of the current list, taken once per cycle.
    pub async fn snapshot(&self) -> Vec<ServerAddress> {
        self.entries.read().await.clone()
    }

    /// Adds a server unless it is already present. Returns false on a
    /// duplicate. Persists on success.
    pub async fn add(&self, address: ServerAddress) -> io::Result<bool> {
        {
            let mut entries = self.entries.write().await;
            if entries.contains(&address) {
                return Ok(false);
            }
            entries.push(address);
        }
        self.save().await?;
        Ok(true)
    }

    /// Removes a server if present. Returns false when it was not in
    /// the list. Persists on success.
    pub async fn remove(&self, address: &ServerAddress) -> io::Result<bool> {
        {
            let mut entries = self.entries.write().await;
            let before = entries.len();
            entries.retain(|a| a != address);
            if entries.len() == before {
                return Ok(false);
            }
        }
        self.save().await?;
        Ok(true)
    }

    async fn save(&self) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let lines: Vec<String> = self
            .entries
            .read()
            .await
            .iter()
            .map(|a| a.to_string())
            .collect();
        std::fs::write(path, lines.join("\n"))
    }
}
