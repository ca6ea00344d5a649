use super::Context;
use crate::error::Result;
use colored::Colorize;

/// Run `git <args>` as `account` (or the active identity), passing stdio
/// through. Returns git's exit code.
pub fn run(ctx: &Context, account: Option<String>, args: Vec<String>) -> Result<i32> {
    if args.is_empty() {
        eprintln!(
            "\n  {} No git command provided. Usage: {}\n",
            "✗".red().bold(),
            "gitsw git <args...>".cyan()
        );
        return Ok(1);
    }

    let (handle, identity, exec) = match account {
        Some(handle) => {
            let exec = ctx.executor_for(&handle)?;
            let identity = ctx.store.get(&handle)?;
            (handle, identity, exec)
        }
        None => {
            let (handle, identity) = ctx.require_active()?;
            (handle.to_string(), identity, ctx.executor()?)
        }
    };

    // Author info applies to this invocation only; global config is untouched.
    let mut full = vec![
        "-c".to_string(),
        format!("user.name={}", identity.name),
        "-c".to_string(),
        format!("user.email={}", identity.email),
    ];
    full.extend(args.iter().cloned());

    println!(
        "  {} git {} {}",
        "\u{21b7}".dimmed(),
        args.join(" "),
        format!("as {} <{}>", handle, identity.email).dimmed(),
    );
    println!();

    let status = exec.run_inherited(&full)?;
    Ok(status.code().unwrap_or(1))
}
