//! Remediation for the NoRepo, NoRemote and InsecureRemote states.

use super::Context;
use crate::error::{KnownFailure, Result};
use crate::exec::GitRunner;
use crate::inspect::{REMOTE, is_insecure_url, to_ssh_url};
use crate::tui::{Raw, raw_confirm, raw_input};
use colored::Colorize;
use tracing::info;

/// `git init` on the configured default branch.
pub fn init_repo(git: &dyn GitRunner, default_branch: &str) -> Result<()> {
    git.git(&["init"])?;
    // Works on an unborn HEAD regardless of init.defaultBranch.
    git.git(&["symbolic-ref", "HEAD", &format!("refs/heads/{default_branch}")])?;
    info!(default_branch, "initialized repository");
    Ok(())
}

/// Prefer the SSH form so the identity's key is actually used.
pub fn normalize_remote_url(url: &str) -> String {
    to_ssh_url(url).unwrap_or_else(|| url.trim().to_string())
}

/// Add `origin`, replacing its URL when it already exists.
pub fn set_remote(git: &dyn GitRunner, url: &str) -> Result<String> {
    let url = normalize_remote_url(url);
    match git.git(&["remote", "add", REMOTE, &url]) {
        Ok(_) => {}
        Err(e) if e.known_failure() == Some(KnownFailure::RemoteExists) => {
            info!(%url, "remote exists, updating its URL");
            git.git(&["remote", "set-url", REMOTE, &url])?;
        }
        Err(e) => return Err(e),
    }
    Ok(url)
}

/// Rewrite an HTTPS `origin` to its SSH equivalent.
pub fn convert_remote(git: &dyn GitRunner, current: &str) -> Result<Option<String>> {
    let Some(url) = to_ssh_url(current) else {
        return Ok(None);
    };
    git.git(&["remote", "set-url", REMOTE, &url])?;
    info!(from = current, to = %url, "converted remote to SSH");
    Ok(Some(url))
}

/// Clone below the working directory, returning the URL actually used.
pub fn clone_repo(git: &dyn GitRunner, url: &str) -> Result<String> {
    let url = normalize_remote_url(url);
    git.git(&["clone", &url])?;
    Ok(url)
}

pub fn run_init(ctx: &Context, git: &dyn GitRunner) -> Result<()> {
    let confirmed = {
        let _raw = Raw::enter();
        raw_confirm(
            &format!("Initialize a repository in {}?", ctx.cwd.display()),
            true,
        )
    };
    if confirmed != Some(true) {
        return Ok(());
    }
    init_repo(git, &ctx.store.default_branch)?;
    println!(
        "  {} Initialized repository on '{}'",
        "✓".green().bold(),
        ctx.store.default_branch.cyan()
    );
    Ok(())
}

pub fn run_clone(git: &dyn GitRunner) -> Result<()> {
    let url = {
        let _raw = Raw::enter();
        raw_input("Repository URL", "")
    };
    let Some(url) = url.filter(|u| !u.is_empty()) else {
        return Ok(());
    };
    println!("  {} cloning {}", "\u{21b7}".dimmed(), url);
    let used = clone_repo(git, &url)?;
    println!("  {} Cloned {}", "✓".green().bold(), used.cyan());
    println!(
        "  {}",
        "cd into the new directory and run gitsw again to work in it.".dimmed()
    );
    Ok(())
}

pub fn run_add_remote(git: &dyn GitRunner) -> Result<()> {
    let url = {
        let _raw = Raw::enter();
        raw_input("Remote URL (git@github.com:owner/repo.git)", "")
    };
    let Some(url) = url.filter(|u| !u.is_empty()) else {
        return Ok(());
    };
    let used = set_remote(git, &url)?;
    if is_insecure_url(&url) {
        println!("  {} Converted to SSH: {}", "\u{21b7}".dimmed(), used.cyan());
    }
    println!("  {} Remote '{}' set to {}", "✓".green().bold(), REMOTE, used.cyan());
    Ok(())
}

pub fn run_convert(git: &dyn GitRunner, current: &str) -> Result<()> {
    let confirmed = {
        let _raw = Raw::enter();
        raw_confirm(
            &format!(
                "Remote {} uses HTTPS, which ignores your SSH key. Convert to SSH?",
                current.yellow()
            ),
            true,
        )
    };
    if confirmed != Some(true) {
        return Ok(());
    }
    match convert_remote(git, current)? {
        Some(url) => println!("  {} Remote now {}", "✓".green().bold(), url.cyan()),
        None => println!(
            "  {} Could not derive an SSH URL from {}; set it manually.",
            "✗".red(),
            current
        ),
    }
    Ok(())
}
