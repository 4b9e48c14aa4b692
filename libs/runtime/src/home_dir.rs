use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Resolve the service home directory to an absolute path.
///
/// - `None` or an empty value: `<platform home>/<default_subdir>`
///   (`%APPDATA%` on Windows, `$HOME` elsewhere).
/// - A leading `~` is expanded to the platform home.
/// - Other relative paths are anchored at the current working directory.
///
/// With `create` set, the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    resolve_with_base(configured, default_subdir, platform_home(), create)
}

#[cfg(target_os = "windows")]
fn platform_home() -> Option<PathBuf> {
    dirs::config_dir()
}

#[cfg(not(target_os = "windows"))]
fn platform_home() -> Option<PathBuf> {
    dirs::home_dir()
}

fn resolve_with_base(
    configured: Option<String>,
    default_subdir: &str,
    home: Option<PathBuf>,
    create: bool,
) -> Result<PathBuf> {
    let configured = configured.filter(|s| !s.trim().is_empty());

    let path = match configured.as_deref() {
        None => require_home(home)?.join(default_subdir),
        Some("~") => require_home(home)?,
        Some(p) if p.starts_with("~/") || p.starts_with("~\\") => {
            require_home(home)?.join(&p[2..])
        }
        Some(p) if p.starts_with('~') => {
            bail!("unsupported home_dir '{p}': only '~' for the current user is expanded")
        }
        Some(p) => absolute(Path::new(p))?,
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create home_dir {}", path.display()))?;
    }
    Ok(path)
}

fn require_home(home: Option<PathBuf>) -> Result<PathBuf> {
    home.context("cannot determine the user's home directory")
}

fn absolute(p: &Path) -> Result<PathBuf> {
    if p.is_absolute() {
        return Ok(p.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    Ok(cwd.join(p))
}
