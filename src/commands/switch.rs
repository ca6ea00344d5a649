use super::Context;
use crate::activate::activate;
use crate::error::Result;
use crate::exec::Executor;
use crate::keys::ssh_path_string;
use crate::utils::resolve_account;
use colored::Colorize;

pub fn run(ctx: &mut Context, handle: Option<String>) -> Result<()> {
    let Some(handle) = resolve_account(&ctx.store, handle, "Switch to")? else {
        return Ok(());
    };

    let git = Executor::new(&ctx.cwd, None);
    let key = activate(&mut ctx.store, &handle, &ctx.paths, &git)?;
    let identity = ctx.store.get(&handle)?;

    println!(
        "  {} Switched to '{}' {}",
        "✔".green(),
        handle.cyan(),
        format!("{} <{}>", identity.name, identity.email).dimmed()
    );
    println!(
        "    {} github.com now uses {}",
        "\u{21b7}".dimmed(),
        ssh_path_string(&key).dimmed()
    );
    Ok(())
}
