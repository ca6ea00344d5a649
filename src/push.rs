//! Push strategy selection and execution.

use crate::error::{Error, KnownFailure, Result};
use crate::exec::{CommandOutput, GitRunner};
use crate::inspect::{BranchComparison, Divergence, REMOTE};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PushStrategy {
    /// Plain push
    Normal,
    /// Overwrite only if the remote has not moved since last fetch
    ForceWithLease,
    /// Unconditional overwrite
    #[value(name = "force")]
    ForceOverride,
    /// Fetch, then force-with-lease
    #[value(name = "fetch-force")]
    FetchThenForce,
    /// Merge remote changes, then push
    #[value(name = "pull-push")]
    PullThenPush,
    #[value(skip)]
    Cancel,
}

impl fmt::Display for PushStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PushStrategy::Normal => "normal push",
            PushStrategy::ForceWithLease => "force-with-lease",
            PushStrategy::ForceOverride => "force-override",
            PushStrategy::FetchThenForce => "fetch-then-force",
            PushStrategy::PullThenPush => "pull-then-push",
            PushStrategy::Cancel => "cancel",
        };
        f.write_str(s)
    }
}

/// Recommendation plus the strategies offered, in menu order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPlan {
    /// `None` when the branch has no upstream yet.
    pub divergence: Option<Divergence>,
    pub recommended: PushStrategy,
    pub options: Vec<PushStrategy>,
}

impl PushPlan {
    /// Menu label, flagging options that are offered but discouraged.
    pub fn label(&self, strategy: PushStrategy) -> String {
        let discouraged = self.divergence == Some(Divergence::Diverged)
            && strategy == PushStrategy::Normal;
        if discouraged {
            format!("{strategy} (discouraged, will be rejected)")
        } else if strategy == self.recommended {
            format!("{strategy} (recommended)")
        } else {
            strategy.to_string()
        }
    }

    pub fn summary(&self) -> &'static str {
        match self.divergence {
            None => "branch has no upstream yet; the first push will set it",
            Some(Divergence::Ahead) => "local is ahead of remote",
            Some(Divergence::Behind) => "local is behind remote",
            Some(Divergence::Diverged) => "local and remote have diverged",
            Some(Divergence::Even) => "local and remote are even",
        }
    }
}

pub fn plan_push(comparison: Option<BranchComparison>) -> PushPlan {
    use PushStrategy::*;

    let Some(comparison) = comparison else {
        return PushPlan {
            divergence: None,
            recommended: Normal,
            options: vec![Normal, Cancel],
        };
    };
    let divergence = comparison.classify();
    let (recommended, options) = match divergence {
        Divergence::Ahead => (Normal, vec![Normal, ForceWithLease, ForceOverride]),
        Divergence::Behind => (
            PullThenPush,
            vec![PullThenPush, ForceWithLease, ForceOverride, Cancel],
        ),
        Divergence::Diverged => (
            FetchThenForce,
            vec![FetchThenForce, ForceWithLease, ForceOverride, Normal, Cancel],
        ),
        Divergence::Even => (Normal, vec![Normal, Cancel]),
    };
    PushPlan {
        divergence: Some(divergence),
        recommended,
        options,
    }
}

/// What happened when a strategy ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed {
        output: CommandOutput,
        set_upstream: bool,
    },
    Cancelled,
}

/// Run the chosen strategy. Nothing already done is rolled back on failure.
pub fn execute(git: &dyn GitRunner, strategy: PushStrategy, branch: &str) -> Result<PushOutcome> {
    info!(%strategy, branch, "pushing");
    match strategy {
        PushStrategy::Cancel => Ok(PushOutcome::Cancelled),
        PushStrategy::Normal => push(git, branch, None),
        PushStrategy::ForceWithLease => push(git, branch, Some("--force-with-lease")),
        PushStrategy::ForceOverride => push(git, branch, Some("--force")),
        PushStrategy::FetchThenForce => {
            git.git(&["fetch", REMOTE, branch])?;
            push(git, branch, Some("--force-with-lease"))
        }
        PushStrategy::PullThenPush => {
            git.git(&["pull", "--no-rebase", REMOTE, branch])?;
            push(git, branch, None)
        }
    }
}

/// Push, setting the upstream when git reports there is none.
fn push(git: &dyn GitRunner, branch: &str, flag: Option<&str>) -> Result<PushOutcome> {
    let mut args = vec!["push"];
    args.extend(flag);
    match git.git(&args) {
        Ok(output) => Ok(PushOutcome::Pushed {
            output,
            set_upstream: false,
        }),
        Err(e) if e.known_failure() == Some(KnownFailure::NoUpstream) => {
            info!(branch, "no upstream, pushing with --set-upstream");
            let mut args = vec!["push", "--set-upstream"];
            args.extend(flag);
            args.extend([REMOTE, branch]);
            let output = git.git(&args)?;
            Ok(PushOutcome::Pushed {
                output,
                set_upstream: true,
            })
        }
        Err(e) => Err(e),
    }
}

/// Short hint for a failed push, keyed on the classified failure.
pub fn failure_hint(err: &Error) -> Option<&'static str> {
    match err.known_failure()? {
        KnownFailure::NonFastForward => {
            Some("remote has commits you don't have; try pull-then-push or fetch-then-force")
        }
        KnownFailure::StaleLease => {
            Some("remote moved since your last fetch; fetch and review before forcing")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::PushStrategy::*;
    use crate::exec::testing::ScriptedGit;

    fn cmp(ahead: u32, behind: u32) -> Option<BranchComparison> {
        Some(BranchComparison { ahead, behind })
    }

    #[test]
    fn test_ahead_recommends_normal() {
        let plan = plan_push(cmp(2, 0));
        assert_eq!(plan.divergence, Some(Divergence::Ahead));
        assert_eq!(plan.recommended, Normal);
        assert_eq!(plan.options, vec![Normal, ForceWithLease, ForceOverride]);
        assert!(!plan.options.contains(&PullThenPush));
    }

    #[test]
    fn test_behind_recommends_pull() {
        let plan = plan_push(cmp(0, 3));
        assert_eq!(plan.divergence, Some(Divergence::Behind));
        assert_eq!(plan.recommended, PullThenPush);
        assert!(plan.options.contains(&Cancel));
    }

    #[test]
    fn test_diverged_leads_with_fetch_then_force() {
        let plan = plan_push(cmp(2, 1));
        assert_eq!(plan.divergence, Some(Divergence::Diverged));
        assert_eq!(plan.options.first(), Some(&FetchThenForce));
        assert_eq!(plan.options.len(), 5);
        assert!(plan.label(Normal).contains("discouraged"));
    }

    #[test]
    fn test_even_and_no_upstream() {
        let even = plan_push(cmp(0, 0));
        assert_eq!(even.divergence, Some(Divergence::Even));
        assert_eq!(even.recommended, Normal);

        let first = plan_push(None);
        assert_eq!(first.divergence, None);
        assert_eq!(first.options, vec![Normal, Cancel]);
    }

    #[test]
    fn test_option_counts_in_range() {
        for c in [None, cmp(1, 0), cmp(0, 1), cmp(1, 1), cmp(0, 0)] {
            let n = plan_push(c).options.len();
            assert!((2..=5).contains(&n));
        }
    }

    #[test]
    fn test_normal_push_sets_upstream_on_first_push() {
        let git = ScriptedGit::new().fail(
            "push",
            128,
            "fatal: The current branch feat has no upstream branch.",
        );
        let outcome = execute(&git, Normal, "feat").unwrap();
        assert!(matches!(
            outcome,
            PushOutcome::Pushed {
                set_upstream: true,
                ..
            }
        ));
        assert_eq!(git.calls(), vec!["push", "push --set-upstream origin feat"]);
    }

    #[test]
    fn test_lease_fallback_keeps_flag() {
        let git = ScriptedGit::new().fail("push", 128, "has no upstream branch");
        execute(&git, ForceWithLease, "feat").unwrap();
        assert_eq!(
            git.calls(),
            vec![
                "push --force-with-lease",
                "push --set-upstream --force-with-lease origin feat"
            ]
        );
    }

    #[test]
    fn test_non_fast_forward_is_not_retried() {
        let git = ScriptedGit::new().fail(
            "push",
            1,
            " ! [rejected]        main -> main (non-fast-forward)",
        );
        let err = execute(&git, Normal, "main").unwrap_err();
        assert_eq!(err.known_failure(), Some(KnownFailure::NonFastForward));
        assert!(failure_hint(&err).is_some());
        assert_eq!(git.calls(), vec!["push"]);
    }

    #[test]
    fn test_fetch_then_force_sequence() {
        let git = ScriptedGit::new();
        execute(&git, FetchThenForce, "main").unwrap();
        assert_eq!(
            git.calls(),
            vec!["fetch origin main", "push --force-with-lease"]
        );
    }

    #[test]
    fn test_pull_then_push_stops_on_pull_failure() {
        let git = ScriptedGit::new().fail("pull", 1, "CONFLICT (content): Merge conflict in a.txt");
        assert!(execute(&git, PullThenPush, "main").is_err());
        assert_eq!(git.calls(), vec!["pull --no-rebase origin main"]);
    }

    #[test]
    fn test_force_override_and_cancel() {
        let git = ScriptedGit::new();
        execute(&git, ForceOverride, "main").unwrap();
        assert_eq!(execute(&git, Cancel, "main").unwrap(), PushOutcome::Cancelled);
        assert_eq!(git.calls(), vec!["push --force"]);
    }
}
