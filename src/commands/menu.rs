//! Interactive loop: inspect, plan, offer what the directory needs.
//!
//! ```text
//! loop {
//!   active account -> executor (key-pinned)
//!   inspect -> RepoState
//!   actions_for(state) -> select -> handler
//! }
//! ```

use super::{Context, add, branch, commit, connection, list, push, remove, repo, status, switch};
use crate::error::{Error, Result};
use crate::exec::Executor;
use crate::planner::RepoState;
use crate::tui::{Raw, raw_select};
use colored::Colorize;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    InitRepo,
    CloneRepo,
    AddRemote,
    ConvertRemote,
    ChooseBranch,
    Push,
    Commit,
    ChangeBranch,
    CustomCommand,
    SwitchAccount,
    AddAccount,
    RemoveAccount,
    TestConnection,
    Quit,
}

impl Action {
    /// Needs git and an active identity to do anything useful.
    fn needs_identity(self) -> bool {
        matches!(
            self,
            Action::CloneRepo
                | Action::ChooseBranch
                | Action::Push
                | Action::Commit
                | Action::ChangeBranch
                | Action::CustomCommand
                | Action::TestConnection
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::InitRepo => "Initialize repository here",
            Action::CloneRepo => "Clone a repository",
            Action::AddRemote => "Add remote",
            Action::ConvertRemote => "Convert remote to SSH",
            Action::ChooseBranch => "Choose working branch",
            Action::Push => "Push",
            Action::Commit => "Commit all changes",
            Action::ChangeBranch => "Change branch",
            Action::CustomCommand => "Run custom command",
            Action::SwitchAccount => "Switch account",
            Action::AddAccount => "Add account",
            Action::RemoveAccount => "Remove account",
            Action::TestConnection => "Test GitHub connection",
            Action::Quit => "Quit",
        };
        f.write_str(s)
    }
}

/// Menu for a planner state. Remediation comes first; account management
/// is always available.
pub fn actions_for(state: RepoState, has_accounts: bool) -> Vec<Action> {
    let mut actions = match state {
        RepoState::NoRepo => vec![Action::InitRepo, Action::CloneRepo],
        RepoState::NoRemote => vec![Action::AddRemote],
        RepoState::InsecureRemote => vec![Action::ConvertRemote],
        RepoState::FirstRun => vec![Action::ChooseBranch],
        RepoState::Ready => vec![
            Action::Push,
            Action::Commit,
            Action::ChangeBranch,
            Action::CustomCommand,
        ],
    };
    if has_accounts {
        actions.push(Action::SwitchAccount);
    }
    actions.push(Action::AddAccount);
    if has_accounts {
        actions.extend([Action::RemoveAccount, Action::TestConnection]);
    }
    actions.push(Action::Quit);
    actions
}

/// Executor for one loop iteration: pinned to `account` when given,
/// otherwise to the active identity.
fn menu_executor(ctx: &Context, account: Option<&str>) -> Result<Executor> {
    let result = match account {
        Some(handle) => ctx.executor_for(handle),
        None => ctx.executor(),
    };
    match result {
        Err(e @ Error::KeyMissing(_)) => {
            warn!(error = %e, "key missing, running git without it");
            println!("  {} {}", "⚠".yellow(), e);
            Ok(Executor::new(&ctx.cwd, None))
        }
        other => other,
    }
}

/// `account` pins every git command in the loop to that identity.
pub fn run(ctx: &mut Context, account: Option<&str>) -> Result<()> {
    loop {
        let exec = menu_executor(ctx, account)?;
        let (repo_status, state) = status::evaluate(ctx, &exec)?;

        print_header(ctx, &repo_status, state);

        let actions = actions_for(state, !ctx.store.accounts.is_empty());
        let labels: Vec<String> = actions.iter().map(Action::to_string).collect();
        let selection = {
            let _raw = Raw::enter();
            raw_select("What next?", &labels, 0)
        };
        let action = selection.map_or(Action::Quit, |i| actions[i]);
        if action == Action::Quit {
            return Ok(());
        }

        if action.needs_identity() && account.is_none() && ctx.store.current().is_none() {
            println!(
                "  {} Pick an account first so git uses the right key.",
                "⚠".yellow()
            );
            report(switch::run(ctx, None));
            continue;
        }

        let remote = repo_status.remote_url.clone().unwrap_or_default();
        report(dispatch(ctx, &exec, action, &remote));
    }
}

fn dispatch(ctx: &mut Context, exec: &Executor, action: Action, remote: &str) -> Result<()> {
    match action {
        Action::InitRepo => repo::run_init(ctx, exec),
        Action::CloneRepo => repo::run_clone(exec),
        Action::AddRemote => repo::run_add_remote(exec),
        Action::ConvertRemote => repo::run_convert(exec, remote),
        Action::ChooseBranch => branch::run_first(ctx, exec),
        Action::Push => push::run(ctx, exec, None),
        Action::Commit => commit::run_commit(exec),
        Action::ChangeBranch => branch::run_change(ctx, exec),
        Action::CustomCommand => commit::run_custom(exec),
        Action::SwitchAccount => switch::run(ctx, None),
        Action::AddAccount => add::run(ctx),
        Action::RemoveAccount => remove::run(ctx, None, None),
        Action::TestConnection => connection::run(ctx, None),
        Action::Quit => Ok(()),
    }
}

/// Failures end the current operation, not the loop.
fn report(result: Result<()>) {
    if let Err(e) = result {
        println!("  {} {}", "✗".red().bold(), e);
    }
}

fn print_header(ctx: &Context, repo_status: &crate::inspect::RepoStatus, state: RepoState) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    println!();
    println!(
        "  {} {} {}",
        "GITSW".bold(),
        "(GitHub SSH identity switch)".dimmed(),
        format!("v{}", VERSION).dimmed()
    );
    println!();
    for line in list::account_table(&ctx.store) {
        println!("{line}");
    }
    println!("{}", status::repo_line(ctx, repo_status, state));
    println!();
}
