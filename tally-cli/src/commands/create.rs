//! `tally create` - Scaffold a new migration directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tally_migrate::MIGRATION_FILE_NAME;

use crate::cli::CreateArgs;
use crate::config::Config;
use crate::error::{CliError, CliResult};
use crate::output;

/// Body written into every new migration
pub const MIGRATION_TEMPLATE: &str = "-- Enter your migration here.";

/// Run the create command
pub async fn run(args: CreateArgs, config: &Config) -> CliResult<()> {
    let file = create_migration(&config.migrations.directory, &args.name, Utc::now()).await?;
    output::success(&format!("Created migration {}", file.display()));
    Ok(())
}

/// Create `<dir>/<timestamp>_<name>/up.sql` and return the file path.
pub async fn create_migration(
    dir: &Path,
    name: &str,
    now: DateTime<Utc>,
) -> CliResult<PathBuf> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if !meta.is_dir() => {
            return Err(CliError::Command(format!(
                "{} is not a directory and cannot be used for creating migrations.",
                dir.display()
            )));
        }
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tokio::fs::create_dir_all(dir).await?;
            output::info(&format!("Created directory {}", dir.display()));
        }
        Err(e) => return Err(e.into()),
    }

    let folder = dir.join(format!(
        "{}_{}",
        now.format("%Y%m%d%H%M%S"),
        normalize_name(name)
    ));
    tokio::fs::create_dir(&folder).await.map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => {
            CliError::Command(format!("Migration {} already exists.", folder.display()))
        }
        _ => CliError::Io(e),
    })?;

    let file = folder.join(MIGRATION_FILE_NAME);
    tokio::fs::write(&file, MIGRATION_TEMPLATE).await?;

    Ok(file)
}

/// Lower-case a migration name and replace dashes and spaces with underscores.
pub fn normalize_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return "migration".to_string();
    }
    name.to_lowercase().replace(['-', ' '], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Add-Users Table"), "add_users_table");
        assert_eq!(normalize_name("  "), "migration");
        assert_eq!(normalize_name("init"), "init");
    }

    #[tokio::test]
    async fn test_create_migration_layout() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("migrations");

        let file = create_migration(&dir, "Create Users", at()).await.unwrap();

        assert_eq!(
            file,
            dir.join("20240115103000_create_users").join("up.sql")
        );
        assert_eq!(std::fs::read_to_string(&file).unwrap(), MIGRATION_TEMPLATE);
    }

    #[tokio::test]
    async fn test_create_migration_twice_in_same_second() {
        let tmp = TempDir::new().unwrap();

        create_migration(tmp.path(), "a", at()).await.unwrap();
        let err = create_migration(tmp.path(), "a", at()).await.unwrap_err();

        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_create_migration_rejects_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("not-a-dir");
        std::fs::write(&file, "").unwrap();

        let err = create_migration(&file, "a", at()).await.unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }
}
