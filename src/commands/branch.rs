//! First-run branch selection and branch changes.

use super::Context;
use crate::error::Result;
use crate::exec::GitRunner;
use crate::inspect::{REMOTE, current_branch, local_branches, remote_branches};
use crate::tui::{Raw, raw_input, raw_select};
use colored::Colorize;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchChoice {
    Local(String),
    /// Exists only on the remote; checked out as a tracking branch.
    Remote(String),
    Create,
}

impl fmt::Display for BranchChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchChoice::Local(name) => write!(f, "{name}"),
            BranchChoice::Remote(name) => write!(f, "{name} (remote)"),
            BranchChoice::Create => write!(f, "+ create new branch"),
        }
    }
}

/// Local branches first, then remote-only ones, then "create".
pub fn branch_choices(local: &[String], remote: &[String]) -> Vec<BranchChoice> {
    let mut choices: Vec<BranchChoice> = local.iter().cloned().map(BranchChoice::Local).collect();
    choices.extend(
        remote
            .iter()
            .filter(|r| !local.contains(r))
            .cloned()
            .map(BranchChoice::Remote),
    );
    choices.push(BranchChoice::Create);
    choices
}

/// Check out `choice`, creating `new_name` for [`BranchChoice::Create`].
/// Returns the branch now checked out.
pub fn apply_choice(git: &dyn GitRunner, choice: &BranchChoice, new_name: Option<&str>) -> Result<String> {
    match choice {
        BranchChoice::Local(name) => {
            if current_branch(git)?.as_deref() != Some(name.as_str()) {
                git.git(&["checkout", name])?;
            }
            Ok(name.clone())
        }
        BranchChoice::Remote(name) => {
            let start = format!("{REMOTE}/{name}");
            git.git(&["fetch", REMOTE, name])?;
            git.git(&["checkout", "-b", name, "--track", &start])?;
            Ok(name.clone())
        }
        BranchChoice::Create => {
            let name = new_name.unwrap_or_default();
            git.git(&["checkout", "-b", name])?;
            Ok(name.to_string())
        }
    }
}

/// Remote branches, tolerating an unreachable remote.
fn remote_or_empty(git: &dyn GitRunner) -> Vec<String> {
    remote_branches(git).unwrap_or_else(|e| {
        warn!(error = %e, "could not list remote branches");
        Vec::new()
    })
}

/// Pick a branch interactively; `None` when cancelled.
fn pick(git: &dyn GitRunner, prompt: &str, include_remote: bool, default_name: &str) -> Result<Option<String>> {
    let local = local_branches(git)?;
    let remote = if include_remote {
        remote_or_empty(git)
    } else {
        Vec::new()
    };
    let current = current_branch(git)?;
    let choices = branch_choices(&local, &remote);
    let labels: Vec<String> = choices
        .iter()
        .map(|c| match c {
            BranchChoice::Local(name) if current.as_deref() == Some(name.as_str()) => {
                format!("{} {}", name, "(current)".dimmed())
            }
            other => other.to_string(),
        })
        .collect();
    let default = choices
        .iter()
        .position(|c| matches!(c, BranchChoice::Local(n) if current.as_deref() == Some(n.as_str())))
        .unwrap_or(0);

    let (choice, new_name) = {
        let _raw = Raw::enter();
        let Some(index) = raw_select(prompt, &labels, default) else {
            return Ok(None);
        };
        let choice = choices[index].clone();
        let new_name = if choice == BranchChoice::Create {
            match raw_input("New branch name", default_name) {
                Some(name) if !name.is_empty() => Some(name),
                _ => return Ok(None),
            }
        } else {
            None
        };
        (choice, new_name)
    };

    apply_choice(git, &choice, new_name.as_deref()).map(Some)
}

/// FirstRun: choose the branch once and remember it for this directory.
pub fn run_first(ctx: &mut Context, git: &dyn GitRunner) -> Result<()> {
    let default_name = ctx.store.default_branch.clone();
    let Some(branch) = pick(git, "Choose the working branch for this directory", true, &default_name)?
    else {
        return Ok(());
    };
    ctx.store.record_repo_branch(&ctx.cwd, &branch);
    ctx.save()?;
    println!("  {} Working on '{}'", "✓".green().bold(), branch.cyan());
    Ok(())
}

pub fn run_change(ctx: &mut Context, git: &dyn GitRunner) -> Result<()> {
    let Some(branch) = pick(git, "Switch branch", true, "")? else {
        return Ok(());
    };
    ctx.store.record_repo_branch(&ctx.cwd, &branch);
    ctx.save()?;
    println!("  {} On branch '{}'", "✓".green().bold(), branch.cyan());
    Ok(())
}
