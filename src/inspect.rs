//! Repository state derived from git's textual output.

use crate::error::{Error, Result};
use crate::exec::GitRunner;
use tracing::debug;

pub const REMOTE: &str = "origin";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoStatus {
    pub is_repository: bool,
    pub has_remote: bool,
    pub remote_url: Option<String>,
    pub uses_insecure_transport: bool,
}

/// Inspect the working directory. A missing remote is not an error.
pub fn inspect(git: &dyn GitRunner) -> Result<RepoStatus> {
    match git.git(&["status", "--porcelain"]) {
        Ok(_) => {}
        Err(Error::CommandFailed(failure)) => {
            debug!(stderr = %failure.stderr.trim(), "status check failed");
            return Ok(RepoStatus::default());
        }
        Err(e) => return Err(e),
    }

    let remote_url = match git.git_stdout(&["remote", "get-url", REMOTE]) {
        Ok(url) if !url.is_empty() => Some(url),
        Ok(_) | Err(Error::CommandFailed(_)) => None,
        Err(e) => return Err(e),
    };
    let uses_insecure_transport = remote_url.as_deref().is_some_and(is_insecure_url);

    Ok(RepoStatus {
        is_repository: true,
        has_remote: remote_url.is_some(),
        remote_url,
        uses_insecure_transport,
    })
}

/// HTTP(S) remotes authenticate with credentials, never with the SSH key.
pub fn is_insecure_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

/// Convert `https://host/owner/repo(.git)` to `git@host:owner/repo.git`.
pub fn to_ssh_url(url: &str) -> Option<String> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    let rest = if lower.starts_with("https://") {
        &url["https://".len()..]
    } else if lower.starts_with("http://") {
        &url["http://".len()..]
    } else {
        return None;
    };

    let (authority, path) = rest.split_once('/')?;
    // Drop embedded credentials and any explicit port.
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or(host);
    let path = path.trim_end_matches('/');
    if host.is_empty() || path.is_empty() {
        return None;
    }

    let path = if path.ends_with(".git") {
        path.to_string()
    } else {
        format!("{path}.git")
    };
    Some(format!("git@{host}:{path}"))
}

/// Where the local branch stands against its upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divergence {
    Ahead,
    Behind,
    Diverged,
    Even,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchComparison {
    pub ahead: u32,
    pub behind: u32,
}

impl BranchComparison {
    pub fn classify(&self) -> Divergence {
        match (self.ahead > 0, self.behind > 0) {
            (true, false) => Divergence::Ahead,
            (false, true) => Divergence::Behind,
            (true, true) => Divergence::Diverged,
            (false, false) => Divergence::Even,
        }
    }
}

/// Parse `git rev-list --left-right --count` output ("<ahead>\t<behind>").
pub fn parse_left_right(output: &str) -> Option<BranchComparison> {
    let mut parts = output.split_whitespace();
    let ahead = parts.next()?.parse().ok()?;
    let behind = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(BranchComparison { ahead, behind })
}

/// Compare `branch` with its upstream. `None` when there is no upstream to
/// compare against (first push, unborn branch).
pub fn compare(git: &dyn GitRunner, branch: &str) -> Result<Option<BranchComparison>> {
    let range = format!("{branch}...{branch}@{{upstream}}");
    match git.git_stdout(&["rev-list", "--left-right", "--count", &range]) {
        Ok(out) => Ok(parse_left_right(&out)),
        Err(Error::CommandFailed(failure)) => {
            debug!(branch, known = ?failure.known, "no upstream to compare against");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Name of the checked-out branch, including an unborn one.
pub fn current_branch(git: &dyn GitRunner) -> Result<Option<String>> {
    match git.git_stdout(&["symbolic-ref", "--quiet", "--short", "HEAD"]) {
        Ok(name) if !name.is_empty() => Ok(Some(name)),
        Ok(_) | Err(Error::CommandFailed(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn local_branches(git: &dyn GitRunner) -> Result<Vec<String>> {
    let out = git.git_stdout(&["branch", "--format=%(refname:short)"])?;
    Ok(out
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Parse `git ls-remote --heads` lines into branch names.
pub fn parse_ls_remote_heads(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|r| r.strip_prefix("refs/heads/"))
        .map(String::from)
        .collect()
}

pub fn remote_branches(git: &dyn GitRunner) -> Result<Vec<String>> {
    let out = git.git_stdout(&["ls-remote", "--heads", REMOTE])?;
    Ok(parse_ls_remote_heads(&out))
}

/// Remote tip as seen by the server versus the local tracking ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipCheck {
    pub remote: Option<String>,
    pub tracking: Option<String>,
}

impl TipCheck {
    /// True when the server tip differs from what we last fetched.
    pub fn remote_moved(&self) -> bool {
        match (&self.remote, &self.tracking) {
            (Some(remote), Some(tracking)) => remote != tracking,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

pub fn check_remote_tip(git: &dyn GitRunner, branch: &str) -> Result<TipCheck> {
    let refname = format!("refs/heads/{branch}");
    let out = git.git_stdout(&["ls-remote", REMOTE, &refname])?;
    let remote = out
        .lines()
        .find(|l| l.split_whitespace().nth(1) == Some(refname.as_str()))
        .and_then(|l| l.split_whitespace().next())
        .map(String::from);

    let tracking_ref = format!("refs/remotes/{REMOTE}/{branch}");
    let tracking = match git.git_stdout(&["rev-parse", "--verify", "--quiet", &tracking_ref]) {
        Ok(sha) if !sha.is_empty() => Some(sha),
        Ok(_) | Err(Error::CommandFailed(_)) => None,
        Err(e) => return Err(e),
    };
    Ok(TipCheck { remote, tracking })
}
