use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Platform base for the default home directory: `%APPDATA%` on Windows, `$HOME` elsewhere.
fn platform_base() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";

    match std::env::var_os(var) {
        Some(v) if !v.is_empty() => Ok(PathBuf::from(v)),
        _ => bail!("environment variable {var} is not set"),
    }
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return platform_base();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_base()?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

/// Resolve the server home directory into an absolute path.
///
/// `None` falls back to `<platform base>/<default_subdir>`. A leading `~` is expanded and
/// relative paths are anchored at the current working directory.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let mut path = match configured.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => expand_tilde(raw)?,
        _ => platform_base()?.join(default_subdir),
    };

    if path.is_relative() {
        path = std::env::current_dir()
            .context("cannot read current directory")?
            .join(path);
    }

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home dir {}", path.display()))?;
    }
    Ok(path)
}

/// Join `file` onto `base` unless it is already absolute.
pub fn resolve_under(base: &Path, file: &str) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}
