//! Run git and shell commands with an identity-scoped SSH environment.
//!
//! ```text
//! Executor { cwd, key }
//!   |-- git(args)          captured, stderr classified on failure
//!   |-- run_inherited(args) stdio passed through, exit code returned
//!   `-- run_shell(line)    platform shell, same environment
//! ```

use crate::error::{CommandFailure, Error, Result};
use crate::keys::ssh_path_string;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output};
use tracing::debug;

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Both streams joined for display; git reports progress on stderr.
    pub fn combined(&self) -> String {
        let mut text = self.stdout.trim_end().to_string();
        let stderr = self.stderr.trim_end();
        if !stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stderr);
        }
        text
    }
}

/// Seam between git-driving logic and the real git binary.
pub trait GitRunner {
    /// Run `git <args>` and capture its output.
    fn git(&self, args: &[&str]) -> Result<CommandOutput>;

    /// Run git and return trimmed stdout.
    fn git_stdout(&self, args: &[&str]) -> Result<String> {
        Ok(self.git(args)?.stdout.trim().to_string())
    }
}

/// `GIT_SSH_COMMAND` value pinning ssh to a single key.
pub fn ssh_command(key: &Path) -> String {
    format!(
        "ssh -i \"{}\" -o IdentitiesOnly=yes",
        ssh_path_string(key)
    )
}

#[derive(Debug, Clone)]
pub struct Executor {
    cwd: PathBuf,
    key: Option<PathBuf>,
}

impl Executor {
    pub fn new(cwd: impl Into<PathBuf>, key: Option<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            key,
        }
    }

    fn command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.current_dir(&self.cwd);
        if let Some(key) = &self.key {
            cmd.env("GIT_SSH_COMMAND", ssh_command(key));
        }
        cmd
    }

    /// Run git with stdio inherited, for passthrough commands.
    pub fn run_inherited(&self, args: &[String]) -> Result<ExitStatus> {
        debug!(cwd = %self.cwd.display(), ?args, "git (inherited)");
        self.command("git")
            .args(args)
            .status()
            .map_err(|source| spawn_error("git", source))
    }

    /// Run a free-form command line through the platform shell.
    pub fn run_shell(&self, line: &str) -> Result<CommandOutput> {
        debug!(cwd = %self.cwd.display(), line, "shell");
        let (shell, flag) = if cfg!(windows) {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };
        let output = self
            .command(shell)
            .args([flag, line])
            .output()
            .map_err(|source| spawn_error(shell, source))?;
        finish(line.to_string(), output)
    }
}

impl GitRunner for Executor {
    fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        debug!(cwd = %self.cwd.display(), ?args, "git");
        let output = self
            .command("git")
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|source| spawn_error("git", source))?;
        finish(format!("git {}", args.join(" ")), output)
    }
}

fn spawn_error(program: &str, source: std::io::Error) -> Error {
    Error::Spawn {
        program: program.to_string(),
        source,
    }
}

fn finish(command: String, output: Output) -> Result<CommandOutput> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if output.status.success() {
        Ok(CommandOutput { stdout, stderr })
    } else {
        let failure = CommandFailure::new(command, output.status.code(), stderr);
        debug!(known = ?failure.known, "command failed");
        Err(failure.into())
    }
}

#[cfg(test)]
pub mod testing {
    //! Scripted [`GitRunner`] for exercising git-driving logic.

    use super::*;
    use crate::error::CommandFailure;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    type Reply = std::result::Result<String, (i32, String)>;

    /// Answers git invocations from a queue of replies keyed by argument
    /// prefix and records every call.
    #[derive(Default)]
    pub struct ScriptedGit {
        replies: RefCell<Vec<(String, VecDeque<Reply>)>>,
        pub calls: RefCell<Vec<String>>,
    }

    impl ScriptedGit {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a successful reply for commands starting with `prefix`.
        pub fn ok(self, prefix: &str, stdout: &str) -> Self {
            self.push(prefix, Ok(stdout.to_string()))
        }

        /// Queue a failure reply for commands starting with `prefix`.
        pub fn fail(self, prefix: &str, code: i32, stderr: &str) -> Self {
            self.push(prefix, Err((code, stderr.to_string())))
        }

        fn push(self, prefix: &str, reply: Reply) -> Self {
            {
                let mut replies = self.replies.borrow_mut();
                match replies.iter_mut().find(|(p, _)| p == prefix) {
                    Some((_, queue)) => queue.push_back(reply),
                    None => replies.push((prefix.to_string(), VecDeque::from([reply]))),
                }
            }
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl GitRunner for ScriptedGit {
        fn git(&self, args: &[&str]) -> Result<CommandOutput> {
            let line = args.join(" ");
            self.calls.borrow_mut().push(line.clone());

            let mut replies = self.replies.borrow_mut();
            // Longest matching prefix wins so specific scripts shadow generic ones.
            let entry = replies
                .iter_mut()
                .filter(|(prefix, queue)| line.starts_with(prefix.as_str()) && !queue.is_empty())
                .max_by_key(|(prefix, _)| prefix.len());
            let reply = match entry {
                Some((_, queue)) => queue.pop_front().unwrap_or(Ok(String::new())),
                None => Ok(String::new()),
            };
            match reply {
                Ok(stdout) => Ok(CommandOutput {
                    stdout,
                    stderr: String::new(),
                }),
                Err((code, stderr)) => {
                    Err(CommandFailure::new(format!("git {line}"), Some(code), stderr).into())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_command_pins_key() {
        assert_eq!(
            ssh_command(Path::new("/home/me/.ssh/id_work")),
            "ssh -i \"/home/me/.ssh/id_work\" -o IdentitiesOnly=yes"
        );
    }

    #[test]
    fn test_combined_output() {
        let out = CommandOutput {
            stdout: "line one\n".into(),
            stderr: "To github.com:u/r.git\n".into(),
        };
        assert_eq!(out.combined(), "line one\nTo github.com:u/r.git");
        assert_eq!(CommandOutput::default().combined(), "");
    }

    #[test]
    fn test_scripted_git_replays_in_order() {
        let git = testing::ScriptedGit::new()
            .fail("push", 128, "fatal: no upstream branch")
            .ok("push", "");

        assert!(git.git(&["push"]).is_err());
        assert!(git.git(&["push", "-u", "origin", "main"]).is_ok());
        assert_eq!(git.calls(), vec!["push", "push -u origin main"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_failure_is_structured() {
        let temp = tempfile::TempDir::new().unwrap();
        let exec = Executor::new(temp.path(), None);

        let out = exec.run_shell("echo hello").unwrap();
        assert_eq!(out.stdout.trim(), "hello");

        let err = exec.run_shell("echo 'error: remote origin already exists.' >&2; exit 3").unwrap_err();
        match err {
            Error::CommandFailed(f) => {
                assert_eq!(f.exit_code, Some(3));
                assert_eq!(f.known, Some(crate::error::KnownFailure::RemoteExists));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_executor_pins_key_only_when_given() {
        let temp = tempfile::TempDir::new().unwrap();
        let key = temp.path().join("id_work");
        let print_env = "printf %s \"$GIT_SSH_COMMAND\"";

        let pinned = Executor::new(temp.path(), Some(key.clone()));
        assert_eq!(pinned.run_shell(print_env).unwrap().stdout, ssh_command(&key));

        let unpinned = Executor::new(temp.path(), None);
        assert_eq!(unpinned.run_shell(print_env).unwrap().stdout, "");
    }
}
