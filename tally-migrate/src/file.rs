//! Migration discovery and fingerprinting.
//!
//! Migrations live in one directory per migration, each holding an `up.sql`:
//!
//! ```text
//! migrations/
//! ├── 20231215120000_create_users/
//! │   └── up.sql
//! └── 20231216090000_add_posts/
//!     └── up.sql
//! ```

use std::io;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{MigrateResult, MigrationError};

/// Name of the body file inside every migration directory.
pub const MIGRATION_FILE_NAME: &str = "up.sql";

/// A migration discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalMigration {
    /// Migration name (the directory name).
    pub name: String,
    /// Path to the migration directory.
    pub path: PathBuf,
    /// Contents of `up.sql`.
    pub body: String,
    /// Fingerprint of `body`.
    pub fingerprint: String,
}

impl LocalMigration {
    /// Create a migration, fingerprinting its body.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, body: impl Into<String>) -> Self {
        let body = body.into();
        let fingerprint = fingerprint(body.as_bytes());
        Self {
            name: name.into(),
            path: path.into(),
            body,
            fingerprint,
        }
    }

    /// Path to this migration's body file.
    pub fn body_path(&self) -> PathBuf {
        self.path.join(MIGRATION_FILE_NAME)
    }
}

/// Fingerprint migration content: SHA-256, base64 encoded.
pub fn fingerprint(content: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(content))
}

/// Discover every migration under `dir`, ordered by name.
///
/// Only immediate subdirectories count as migrations. Any migration whose
/// body cannot be read fails the whole discovery.
pub async fn discover(dir: impl AsRef<Path>) -> MigrateResult<Vec<LocalMigration>> {
    let dir = dir.as_ref();

    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {}
        _ => return Err(MigrationError::NotADirectory(dir.to_path_buf())),
    }

    let unreadable = |source| MigrationError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(unreadable)?;
    let mut candidates = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let path = entry.path();
        let is_dir = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        candidates.push((name, path));
    }

    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some(pair) = candidates.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(MigrationError::DuplicateMigrationName(pair[0].0.clone()));
    }

    let mut migrations = Vec::with_capacity(candidates.len());
    for (name, path) in candidates {
        migrations.push(read_migration(name, path).await?);
    }

    debug!(
        dir = %dir.display(),
        count = migrations.len(),
        "Discovered migrations"
    );

    Ok(migrations)
}

async fn read_migration(name: String, path: PathBuf) -> MigrateResult<LocalMigration> {
    let bytes = match tokio::fs::read(path.join(MIGRATION_FILE_NAME)).await {
        Ok(bytes) => bytes,
        Err(source) => return Err(MigrationError::MigrationBodyUnreadable { name, source }),
    };

    let fingerprint = fingerprint(&bytes);
    let body = match String::from_utf8(bytes) {
        Ok(body) => body,
        Err(e) => {
            return Err(MigrationError::MigrationBodyUnreadable {
                name,
                source: io::Error::new(io::ErrorKind::InvalidData, e),
            });
        }
    };

    Ok(LocalMigration {
        name,
        path,
        body,
        fingerprint,
    })
}
