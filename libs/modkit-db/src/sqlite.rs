//! SQLite DSN helpers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{DbError, Result};

pub fn is_memory_dsn(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

/// Filesystem path of a file-backed SQLite DSN, without the query string.
fn file_path(dsn: &str) -> Option<&str> {
    let raw = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))?;
    let path = raw.split_once('?').map_or(raw, |(p, _)| p);
    if path.is_empty() || path.starts_with("file:") {
        None
    } else {
        Some(path)
    }
}

pub(crate) fn ensure_parent_dir(dsn: &str) -> Result<()> {
    if let Some(parent) = file_path(dsn).and_then(|p| Path::new(p).parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Rewrite a `sqlite://` DSN so that a relative path is anchored at `base_dir`.
///
/// In-memory DSNs are normalized to `sqlite::memory:`; any query string is kept.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if is_memory_dsn(dsn) {
        return Ok("sqlite::memory:".to_string());
    }
    let rest = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| DbError::InvalidSqliteDsn(format!("expected sqlite:// prefix: {dsn}")))?;

    let (path_str, query) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path_str.is_empty() {
        return Err(DbError::InvalidSqliteDsn(format!("empty path: {dsn}")));
    }

    let mut p = PathBuf::from(path_str);
    if p.is_relative() {
        p = base_dir.join(p);
    }
    if create_dirs {
        if let Some(dir) = p.parent() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// PRAGMAs applied to every new pooled connection.
#[derive(Clone, Debug)]
pub(crate) struct Pragmas {
    journal_mode: &'static str,
    busy_timeout_ms: Option<u128>,
}

impl Pragmas {
    pub(crate) fn for_dsn(memory: bool, busy_timeout: Option<Duration>) -> Self {
        if memory {
            Self {
                journal_mode: "MEMORY",
                busy_timeout_ms: None,
            }
        } else {
            Self {
                journal_mode: "WAL",
                busy_timeout_ms: busy_timeout.map(|d| d.as_millis()),
            }
        }
    }

    pub(crate) fn statements(&self) -> Vec<String> {
        let mut out = vec![
            format!("PRAGMA journal_mode = {}", self.journal_mode),
            "PRAGMA synchronous = NORMAL".to_string(),
        ];
        if let Some(ms) = self.busy_timeout_ms {
            out.push(format!("PRAGMA busy_timeout = {ms}"));
        }
        out
    }
}
