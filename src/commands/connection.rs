//! `ssh -T git@github.com` with a single identity's key.

use super::Context;
use crate::error::{CommandFailure, Error, Result};
use crate::keys::{self, ssh_path_string};
use crate::ssh_config::GITHUB_HOST;
use colored::Colorize;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Extract the login from GitHub's "Hi <login>! You've successfully
/// authenticated" greeting.
pub fn parse_greeting(text: &str) -> Option<String> {
    let start = text.find("Hi ")? + "Hi ".len();
    let rest = &text[start..];
    let end = rest.find('!')?;
    let login = &rest[..end];
    if login.is_empty() || login.contains(char::is_whitespace) {
        None
    } else {
        Some(login.to_string())
    }
}

/// Authenticate against GitHub. GitHub closes the session with exit 1 even
/// on success, so the greeting decides.
pub fn test_key(key: &Path) -> Result<String> {
    let key_arg = ssh_path_string(key);
    let target = format!("git@{GITHUB_HOST}");
    debug!(key = %key_arg, "testing SSH authentication");
    let output = Command::new("ssh")
        .args([
            "-T",
            "-i",
            key_arg.as_str(),
            "-o",
            "IdentitiesOnly=yes",
            "-o",
            "BatchMode=yes",
            "-o",
            "StrictHostKeyChecking=accept-new",
            target.as_str(),
        ])
        .output()
        .map_err(|source| Error::Spawn {
            program: "ssh".to_string(),
            source,
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    match parse_greeting(&stderr) {
        Some(login) => Ok(login),
        None => Err(CommandFailure::new(format!("ssh -T {target}"), output.status.code(), stderr).into()),
    }
}

pub fn run(ctx: &Context, handle: Option<String>) -> Result<()> {
    let (handle, identity) = match handle {
        Some(h) => {
            let identity = ctx.store.get(&h)?;
            (h, identity)
        }
        None => {
            let (h, identity) = ctx.require_active()?;
            (h.to_string(), identity)
        }
    };
    let key = keys::resolve(&ctx.paths.ssh_dir, &identity.ssh_key)?;
    println!(
        "  {} testing {} with {}",
        "\u{21b7}".dimmed(),
        handle.cyan(),
        ssh_path_string(&key).dimmed()
    );
    let login = test_key(&key)?;
    println!(
        "  {} Authenticated to GitHub as {}",
        "✓".green().bold(),
        login.cyan().bold()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_greeting() {
        let text = "Hi octocat! You've successfully authenticated, but GitHub does not provide shell access.\n";
        assert_eq!(parse_greeting(text).as_deref(), Some("octocat"));
    }

    #[test]
    fn test_parse_greeting_rejects_denial() {
        assert_eq!(parse_greeting("git@github.com: Permission denied (publickey).\n"), None);
        assert_eq!(parse_greeting("Hi there, friend!"), None);
    }
}
