//! Commit and custom-command handlers for the Ready state.

use crate::error::Result;
use crate::exec::{CommandOutput, Executor, GitRunner};
use crate::tui::{Raw, raw_input};
use colored::Colorize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(CommandOutput),
    NothingToCommit,
}

/// Stage everything and commit it.
pub fn commit_all(git: &dyn GitRunner, message: &str) -> Result<CommitOutcome> {
    git.git(&["add", "-A"])?;
    if git.git_stdout(&["status", "--porcelain"])?.is_empty() {
        return Ok(CommitOutcome::NothingToCommit);
    }
    Ok(CommitOutcome::Committed(git.git(&["commit", "-m", message])?))
}

pub fn run_commit(git: &dyn GitRunner) -> Result<()> {
    let message = {
        let _raw = Raw::enter();
        raw_input("Commit message", "")
    };
    let Some(message) = message.filter(|m| !m.is_empty()) else {
        return Ok(());
    };
    match commit_all(git, &message)? {
        CommitOutcome::Committed(output) => {
            print_output(&output);
            println!("  {} Committed", "✓".green().bold());
        }
        CommitOutcome::NothingToCommit => {
            println!("  {}", "Nothing to commit, working tree clean.".dimmed());
        }
    }
    Ok(())
}

/// Run a free-form command line with the identity's SSH environment.
pub fn run_custom(exec: &Executor) -> Result<()> {
    let line = {
        let _raw = Raw::enter();
        raw_input("Command", "git ")
    };
    let Some(line) = line.filter(|l| !l.is_empty() && l != "git") else {
        return Ok(());
    };
    println!("  {} {}", "\u{21b7}".dimmed(), line);
    let output = exec.run_shell(&line)?;
    print_output(&output);
    Ok(())
}

pub fn print_output(output: &CommandOutput) {
    let text = output.combined();
    if !text.is_empty() {
        for line in text.lines() {
            println!("    {}", line.dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::ScriptedGit;

    #[test]
    fn test_commit_all() {
        let git = ScriptedGit::new()
            .ok("status", "M  src/main.rs\n")
            .ok("commit", "[main abc123] msg\n");
        let outcome = commit_all(&git, "fix things").unwrap();
        assert!(matches!(outcome, CommitOutcome::Committed(_)));
        assert_eq!(
            git.calls(),
            vec!["add -A", "status --porcelain", "commit -m fix things"]
        );
    }

    #[test]
    fn test_nothing_to_commit() {
        let git = ScriptedGit::new();
        assert_eq!(
            commit_all(&git, "msg").unwrap(),
            CommitOutcome::NothingToCommit
        );
        assert_eq!(git.calls(), vec!["add -A", "status --porcelain"]);
    }
}
