//! Decides what the working directory needs before git operations are
//! offered.
//!
//! ```text
//! NoRepo -> NoRemote -> InsecureRemote -> FirstRun -> Ready
//! ```
//!
//! Checks run in that order every loop iteration; each later check assumes
//! the earlier ones passed.

use crate::inspect::RepoStatus;
use crate::models::RepoSetting;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoState {
    /// Not inside a repository: offer init or clone.
    NoRepo,
    /// No `origin`: offer to add one.
    NoRemote,
    /// `origin` is HTTPS: offer conversion to SSH.
    InsecureRemote,
    /// Directory not seen before: pick or create a branch once.
    FirstRun,
    /// Push, commit, branch change and custom commands are available.
    Ready,
}

pub fn plan(status: &RepoStatus, setting: Option<&RepoSetting>) -> RepoState {
    if !status.is_repository {
        RepoState::NoRepo
    } else if !status.has_remote {
        RepoState::NoRemote
    } else if status.uses_insecure_transport {
        RepoState::InsecureRemote
    } else if !setting.is_some_and(|s| s.initialized) {
        RepoState::FirstRun
    } else {
        RepoState::Ready
    }
}

impl RepoState {
    pub fn describe(&self) -> &'static str {
        match self {
            RepoState::NoRepo => "not a git repository",
            RepoState::NoRemote => "no remote configured",
            RepoState::InsecureRemote => "remote uses HTTPS",
            RepoState::FirstRun => "branch not chosen yet",
            RepoState::Ready => "ready",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(repo: bool, remote: bool, https: bool) -> RepoStatus {
        RepoStatus {
            is_repository: repo,
            has_remote: remote,
            remote_url: remote.then(|| {
                if https {
                    "https://github.com/u/r.git".to_string()
                } else {
                    "git@github.com:u/r.git".to_string()
                }
            }),
            uses_insecure_transport: https,
        }
    }

    fn initialized() -> RepoSetting {
        RepoSetting {
            initialized: true,
            branch: Some("main".into()),
        }
    }

    #[test]
    fn test_priority_order() {
        // Inconsistent inputs still resolve to the earliest failing check.
        assert_eq!(plan(&status(false, true, true), None), RepoState::NoRepo);
        assert_eq!(plan(&status(true, false, true), None), RepoState::NoRemote);
        assert_eq!(
            plan(&status(true, true, true), Some(&initialized())),
            RepoState::InsecureRemote
        );
    }

    #[test]
    fn test_first_run_until_recorded() {
        let s = status(true, true, false);
        assert_eq!(plan(&s, None), RepoState::FirstRun);
        assert_eq!(
            plan(&s, Some(&RepoSetting::default())),
            RepoState::FirstRun
        );
        assert_eq!(plan(&s, Some(&initialized())), RepoState::Ready);
    }
}
