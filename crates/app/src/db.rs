use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

const IN_MEMORY: &str = "sqlite::memory:";
const URI_PREFIX: &str = "sqlite:file:";

/// URLs that sqlx resolves itself rather than as a plain filesystem path.
fn is_passthrough(url: &str) -> bool {
    url == IN_MEMORY || url.starts_with(URI_PREFIX)
}

/// Turn a bare path or `sqlite:` URL into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("invalid --db value: {raw:?}");
    }
    if is_passthrough(trimmed) || trimmed.starts_with("sqlite://") {
        return Ok(trimmed.to_owned());
    }

    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    Ok(format!("sqlite://{}", absolute.display()))
}

/// Create the database file and its parent directory if missing.
pub fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    if is_passthrough(db_url) {
        return Ok(());
    }

    let Some(rest) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid --db value: {db_url}");
    };
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() {
        bail!("invalid --db value: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("cannot create {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_memory_and_absolute_urls() {
        assert_eq!(normalize_sqlite_url(IN_MEMORY).unwrap(), IN_MEMORY);
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/a.db").unwrap(),
            "sqlite:///tmp/a.db"
        );
    }

    #[test]
    fn keeps_sqlite_file_uris() {
        let url = "sqlite:file:programs?mode=memory&cache=shared";
        assert_eq!(normalize_sqlite_url(url).unwrap(), url);
        prepare_sqlite_file(url).unwrap();
    }

    #[test]
    fn relative_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/programs.db").unwrap();
        assert!(url.starts_with("sqlite:///"), "{url}");
        assert!(url.ends_with("data/programs.db"), "{url}");
    }

    #[test]
    fn rejects_blank_urls() {
        assert!(normalize_sqlite_url("   ").is_err());
        assert!(prepare_sqlite_file("sqlite://").is_err());
        assert!(prepare_sqlite_file("postgres://x").is_err());
    }

    #[test]
    fn creates_missing_file_and_parents() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested/dir/programs.db");
        let url = format!("sqlite://{}", file.display());

        prepare_sqlite_file(&url).unwrap();
        assert!(file.exists());
        // second call leaves the existing file alone
        prepare_sqlite_file(&url).unwrap();
    }
}
