//! SSH key references: resolution, generation and cleanup.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Key file name used when gitsw generates a key for `handle`.
pub fn default_key_name(handle: &str) -> String {
    format!("id_{handle}")
}

/// Map a stored key reference onto a path. Bare names live in `ssh_dir`.
pub fn key_path(ssh_dir: &Path, key_ref: &str) -> PathBuf {
    if let Some(rest) = key_ref.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    let path = Path::new(key_ref);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        ssh_dir.join(path)
    }
}

/// Resolve a key reference and require the private key to exist.
pub fn resolve(ssh_dir: &Path, key_ref: &str) -> Result<PathBuf> {
    let path = key_path(ssh_dir, key_ref);
    if path.is_file() {
        Ok(path)
    } else {
        Err(Error::KeyMissing(path))
    }
}

pub fn public_key_path(private: &Path) -> PathBuf {
    let mut name = private.as_os_str().to_owned();
    name.push(".pub");
    PathBuf::from(name)
}

/// Render a key path the way ssh expects it on every platform.
pub fn ssh_path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Generate an ed25519 key pair with no passphrase.
pub fn generate(ssh_dir: &Path, key_name: &str, comment: &str) -> Result<PathBuf> {
    let path = key_path(ssh_dir, key_name);
    if path.exists() || public_key_path(&path).exists() {
        return Err(Error::KeyExists(path));
    }
    fs::create_dir_all(ssh_dir)?;
    restrict_dir(ssh_dir)?;

    debug!(path = %path.display(), "running ssh-keygen");
    let output = Command::new("ssh-keygen")
        .args(["-t", "ed25519", "-q", "-N", "", "-C", comment, "-f"])
        .arg(&path)
        .output()
        .map_err(|source| Error::Spawn {
            program: "ssh-keygen".to_string(),
            source,
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(Error::KeyGen(stderr));
    }
    restrict_file(&path)?;
    info!(path = %path.display(), "generated SSH key");
    Ok(path)
}

pub fn read_public_key(private: &Path) -> Result<String> {
    Ok(fs::read_to_string(public_key_path(private))?.trim().to_string())
}

/// Delete both halves of a key pair. Missing files are ignored.
pub fn delete_pair(private: &Path) -> Result<()> {
    for path in [private.to_path_buf(), public_key_path(private)] {
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "deleted key file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_file(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(unix)]
fn restrict_dir(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_file(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(not(unix))]
fn restrict_dir(_path: &Path) -> Result<()> {
    Ok(())
}
