use super::Context;
use crate::error::Result;
use crate::exec::GitRunner;
use crate::inspect::{RepoStatus, compare, current_branch, inspect};
use crate::planner::{RepoState, plan};
use crate::push::plan_push;
use colored::Colorize;

/// Inspect the working directory and classify it.
pub fn evaluate(ctx: &Context, git: &dyn GitRunner) -> Result<(RepoStatus, RepoState)> {
    let status = inspect(git)?;
    let state = plan(&status, ctx.store.repo_setting(&ctx.cwd));
    Ok((status, state))
}

/// One-line description of the repository for headers.
pub fn repo_line(ctx: &Context, status: &RepoStatus, state: RepoState) -> String {
    let remote = status.remote_url.as_deref().unwrap_or("-");
    let state_label = match state {
        RepoState::Ready => state.describe().green().to_string(),
        _ => state.describe().yellow().to_string(),
    };
    format!(
        "  {} {}  {} {}  {}",
        "Repo".dimmed(),
        ctx.cwd.display(),
        "Remote".dimmed(),
        remote,
        state_label
    )
}

pub fn run(ctx: &Context, git: &dyn GitRunner) -> Result<()> {
    match ctx.store.current() {
        Some((handle, identity)) => println!(
            "  {} {} {}",
            "Account".dimmed(),
            handle.cyan().bold(),
            format!("{} <{}>", identity.name, identity.email).dimmed()
        ),
        None => println!("  {} {}", "Account".dimmed(), "none active".yellow()),
    }

    let (status, state) = evaluate(ctx, git)?;
    println!("{}", repo_line(ctx, &status, state));
    if !status.is_repository {
        return Ok(());
    }

    if let Some(branch) = current_branch(git)? {
        let plan = plan_push(compare(git, &branch)?);
        println!(
            "  {} {} {}",
            "Branch".dimmed(),
            branch.cyan(),
            format!("· {}", plan.summary()).dimmed()
        );
    }
    Ok(())
}
