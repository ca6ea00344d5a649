//! Error types for gitsw.

use std::fmt;
use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while managing identities or running git.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No identity stored under this handle.
    #[error("no account named '{0}'")]
    AccountNotFound(String),

    /// Handle already taken. Identities are replaced by remove + add.
    #[error("account '{0}' already exists")]
    AccountExists(String),

    /// Handle is empty or contains characters unusable in a key file name.
    #[error("invalid account handle '{0}' (use letters, digits, '.', '_' or '-')")]
    InvalidHandle(String),

    /// An operation needs an active identity and none is set.
    #[error("no active account - run `gitsw use <handle>` first")]
    NoActiveAccount,

    /// The referenced private key does not exist.
    #[error("SSH key not found: {}", .0.display())]
    KeyMissing(PathBuf),

    /// Refusing to overwrite an existing key file.
    #[error("SSH key already exists: {}", .0.display())]
    KeyExists(PathBuf),

    /// ssh-keygen exited unsuccessfully.
    #[error("ssh-keygen failed: {0}")]
    KeyGen(String),

    /// Home directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDir,

    /// Working directory is not inside a git repository.
    #[error("not a git repository")]
    NotARepository,

    /// Repository has no `origin` remote.
    #[error("repository has no remote")]
    NoRemote,

    /// Remote uses HTTPS, so per-identity keys are never consulted.
    #[error("remote uses HTTPS and cannot select an SSH key: {0}")]
    InsecureRemote(String),

    /// HEAD points at a commit, not a branch, so there is nothing to push.
    #[error("HEAD is detached - check out a branch before pushing")]
    DetachedHead,

    /// A subprocess exited with a non-zero status.
    #[error(transparent)]
    CommandFailed(#[from] CommandFailure),

    /// A subprocess could not be started at all.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The known failure pattern, if this is a classified command failure.
    pub fn known_failure(&self) -> Option<KnownFailure> {
        match self {
            Error::CommandFailed(failure) => failure.known,
            _ => None,
        }
    }
}

/// Failure patterns recognised in git's stderr that drive fallback paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownFailure {
    /// Current branch has no upstream configured.
    NoUpstream,
    /// `git remote add` for a name that is already taken.
    RemoteExists,
    /// A branch with that name already exists.
    BranchExists,
    /// Remote rejected a push that would lose history.
    NonFastForward,
    /// `--force-with-lease` rejected because the remote moved.
    StaleLease,
    /// Not inside a repository.
    NotARepository,
}

impl fmt::Display for KnownFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KnownFailure::NoUpstream => "no upstream branch",
            KnownFailure::RemoteExists => "remote already exists",
            KnownFailure::BranchExists => "branch already exists",
            KnownFailure::NonFastForward => "non-fast-forward",
            KnownFailure::StaleLease => "stale lease",
            KnownFailure::NotARepository => "not a repository",
        };
        f.write_str(s)
    }
}

/// Structured result of a failed subprocess.
#[derive(Debug, Clone)]
pub struct CommandFailure {
    pub command: String,
    pub exit_code: Option<i32>,
    pub stderr: String,
    pub known: Option<KnownFailure>,
}

impl CommandFailure {
    pub fn new(command: String, exit_code: Option<i32>, stderr: String) -> Self {
        let known = classify_failure(&stderr);
        Self {
            command,
            exit_code,
            stderr,
            known,
        }
    }
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "`{}` failed (exit {code})", self.command)?,
            None => write!(f, "`{}` was killed by a signal", self.command)?,
        }
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            write!(f, ": {stderr}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CommandFailure {}

/// Map git's stderr text onto a [`KnownFailure`].
///
/// All substring coupling to git's wording lives here. Order matters: the
/// stale-lease rejection also contains "[rejected]".
pub fn classify_failure(stderr: &str) -> Option<KnownFailure> {
    let text = stderr.to_lowercase();
    if text.contains("no upstream") || text.contains("--set-upstream") {
        Some(KnownFailure::NoUpstream)
    } else if text.contains("stale info") {
        Some(KnownFailure::StaleLease)
    } else if text.contains("non-fast-forward") || text.contains("fetch first") {
        Some(KnownFailure::NonFastForward)
    } else if text.contains("already exists") {
        // git: "error: remote origin already exists."
        let remote = text
            .lines()
            .any(|l| l.trim_start().starts_with("error: remote ") && l.contains("already exists"));
        if remote {
            Some(KnownFailure::RemoteExists)
        } else {
            Some(KnownFailure::BranchExists)
        }
    } else if text.contains("not a git repository") {
        Some(KnownFailure::NotARepository)
    } else {
        None
    }
}
