use super::Context;
use super::commit::print_output;
use super::status::evaluate;
use crate::error::{Error, Result};
use crate::exec::GitRunner;
use crate::inspect::{RepoStatus, check_remote_tip, compare, current_branch};
use crate::push::{PushOutcome, PushStrategy, execute, failure_hint, plan_push};
use crate::tui::{Raw, raw_select};
use colored::Colorize;
use tracing::warn;

/// Pushing needs a repository with an SSH remote; anything else goes back
/// through remediation.
pub fn ensure_pushable(status: &RepoStatus) -> Result<()> {
    if !status.is_repository {
        Err(Error::NotARepository)
    } else if !status.has_remote {
        Err(Error::NoRemote)
    } else if status.uses_insecure_transport {
        Err(Error::InsecureRemote(
            status.remote_url.clone().unwrap_or_default(),
        ))
    } else {
        Ok(())
    }
}

/// Push the checked-out branch. With no `strategy`, show the plan and
/// let the user choose.
pub fn run(ctx: &Context, git: &dyn GitRunner, strategy: Option<PushStrategy>) -> Result<()> {
    let (status, _) = evaluate(ctx, git)?;
    ensure_pushable(&status)?;

    // A bare `git push` sends HEAD, so the branch compared must be the one
    // checked out.
    let branch = current_branch(git)?.ok_or(Error::DetachedHead)?;

    let plan = plan_push(compare(git, &branch)?);
    println!(
        "  {} {} {}",
        "Branch".dimmed(),
        branch.cyan().bold(),
        format!("· {}", plan.summary()).dimmed()
    );

    match check_remote_tip(git, &branch) {
        Ok(tip) if tip.remote_moved() => println!(
            "  {} Remote has moved since the last fetch; counts may be stale.",
            "⚠".yellow()
        ),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "could not query remote tip"),
    }

    let strategy = match strategy {
        Some(s) => s,
        None => {
            let labels: Vec<String> = plan.options.iter().map(|s| plan.label(*s)).collect();
            let selection = {
                let _raw = Raw::enter();
                raw_select("Push strategy", &labels, 0)
            };
            match selection {
                Some(i) => plan.options[i],
                None => PushStrategy::Cancel,
            }
        }
    };

    if strategy == PushStrategy::ForceOverride {
        println!(
            "  {} Force push overwrites remote history unconditionally.",
            "⚠".yellow()
        );
    }

    match execute(git, strategy, &branch) {
        Ok(PushOutcome::Cancelled) => println!("  {}", "Cancelled.".dimmed()),
        Ok(PushOutcome::Pushed {
            output,
            set_upstream,
        }) => {
            print_output(&output);
            if set_upstream {
                println!(
                    "  {} Upstream set to origin/{}",
                    "\u{21b7}".dimmed(),
                    branch
                );
            }
            println!("  {} Pushed '{}' ({})", "✓".green().bold(), branch.cyan(), strategy);
        }
        Err(e) => {
            if let Some(hint) = failure_hint(&e) {
                println!("  {} {}", "⚠".yellow(), hint);
            }
            return Err(e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::ScriptedGit;
    use crate::models::Store;
    use crate::settings::Paths;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_pushable() {
        assert!(matches!(
            ensure_pushable(&RepoStatus::default()),
            Err(Error::NotARepository)
        ));

        let mut status = RepoStatus {
            is_repository: true,
            ..RepoStatus::default()
        };
        assert!(matches!(ensure_pushable(&status), Err(Error::NoRemote)));

        status.has_remote = true;
        status.remote_url = Some("https://github.com/u/r.git".into());
        status.uses_insecure_transport = true;
        assert!(matches!(
            ensure_pushable(&status),
            Err(Error::InsecureRemote(url)) if url == "https://github.com/u/r.git"
        ));

        status.uses_insecure_transport = false;
        assert!(ensure_pushable(&status).is_ok());
    }

    #[test]
    fn test_detached_head_refuses_to_push() {
        let temp = TempDir::new().unwrap();
        let cwd = temp.path().join("work");
        let mut store = Store::default();
        store.record_repo_branch(&cwd, "main");
        let ctx = Context {
            store,
            paths: Paths {
                config: temp.path().join("config.json"),
                ssh_dir: temp.path().join("ssh"),
            },
            cwd,
        };
        let git = ScriptedGit::new()
            .ok("remote get-url", "git@github.com:u/r.git\n")
            .fail("symbolic-ref", 128, "fatal: ref HEAD is not a symbolic ref");

        let err = run(&ctx, &git, Some(PushStrategy::Normal)).unwrap_err();
        assert!(matches!(err, Error::DetachedHead));
        assert!(git.calls().iter().all(|c| !c.starts_with("push")));
    }
}
