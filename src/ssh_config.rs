//! Managed `Host github.com` block in the SSH client config.
//!
//! The block is delimited by marker comments so it can be stripped and
//! re-inserted without touching the rest of the file:
//!
//! ```text
//! # >>> gitsw github.com >>>
//! Host github.com
//!   HostName github.com
//!   User git
//!   IdentityFile /home/me/.ssh/id_work
//!   IdentitiesOnly yes
//! # <<< gitsw github.com <<<
//! ```

use crate::error::Result;
use crate::keys::ssh_path_string;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const GITHUB_HOST: &str = "github.com";

fn begin_marker(host: &str) -> String {
    format!("# >>> gitsw {host} >>>")
}

fn end_marker(host: &str) -> String {
    format!("# <<< gitsw {host} <<<")
}

pub fn render_block(host: &str, key: &Path) -> String {
    format!(
        "{begin}\nHost {host}\n  HostName {host}\n  User git\n  IdentityFile {key}\n  IdentitiesOnly yes\n{end}\n",
        begin = begin_marker(host),
        end = end_marker(host),
        key = ssh_path_string(key),
    )
}

/// Remove every managed block for `host`. An unterminated block runs to EOF.
pub fn strip_block(content: &str, host: &str) -> String {
    let begin = begin_marker(host);
    let end = end_marker(host);
    let mut out = String::with_capacity(content.len());
    let mut inside = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if !inside && trimmed == begin {
            inside = true;
            continue;
        }
        if inside {
            if trimmed == end {
                inside = false;
            }
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Replace the managed block, prepending the fresh one to the remaining file.
pub fn with_block(content: &str, host: &str, key: &Path) -> String {
    let rest = strip_block(content, host);
    let rest = rest.trim_start_matches('\n');
    let block = render_block(host, key);
    if rest.is_empty() {
        block
    } else {
        format!("{block}\n{rest}")
    }
}

/// Rewrite the SSH config so GitHub traffic uses `key`.
pub fn apply(config_path: &Path, key: &Path) -> Result<()> {
    let current = match fs::read_to_string(config_path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(config_path, with_block(&current, GITHUB_HOST, key))?;
    debug!(path = %config_path.display(), key = %key.display(), "updated SSH config");
    Ok(())
}

/// Drop the managed block, leaving the rest of the file as it was.
pub fn clear(config_path: &Path) -> Result<()> {
    let current = match fs::read_to_string(config_path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    let rest = strip_block(&current, GITHUB_HOST);
    fs::write(config_path, rest.trim_start_matches('\n'))?;
    debug!(path = %config_path.display(), "removed managed SSH block");
    Ok(())
}
