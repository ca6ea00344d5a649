use super::Context;
use crate::error::Result;
use crate::exec::Executor;
use crate::models::Store;
use crate::utils::{Scope, git_config_get};
use colored::Colorize;

pub fn run(ctx: &Context) -> Result<()> {
    for line in account_table(&ctx.store) {
        println!("{line}");
    }
    let git = Executor::new(&ctx.cwd, None);
    for warning in identity_drift(&ctx.store, &GitIdentity::fetch(&git)) {
        println!("{warning}");
    }
    println!();
    Ok(())
}

/// user.name / user.email as git currently sees them.
#[derive(Debug, Default)]
pub struct GitIdentity {
    pub global_name: Option<String>,
    pub global_email: Option<String>,
    pub local_name: Option<String>,
    pub local_email: Option<String>,
}

impl GitIdentity {
    pub fn fetch(git: &Executor) -> Self {
        Self {
            global_name: git_config_get(git, "user.name", Scope::Global),
            global_email: git_config_get(git, "user.email", Scope::Global),
            local_name: git_config_get(git, "user.name", Scope::Local),
            local_email: git_config_get(git, "user.email", Scope::Local),
        }
    }
}

/// Warnings for git config that no longer matches the active identity,
/// e.g. after someone ran `git config --global` by hand, or a repository
/// pins its own author.
pub fn identity_drift(store: &Store, git: &GitIdentity) -> Vec<String> {
    let mut warnings = Vec::new();
    let Some((handle, identity)) = store.current() else {
        return warnings;
    };

    let global_matches = git.global_name.as_deref() == Some(identity.name.as_str())
        && git.global_email.as_deref() == Some(identity.email.as_str());
    if !global_matches {
        warnings.push(format!(
            "  {} Global git identity is {} <{}>, not '{}'. Switch again to re-apply.",
            "⚠".yellow(),
            git.global_name.as_deref().unwrap_or("unset"),
            git.global_email.as_deref().unwrap_or("unset"),
            handle.cyan()
        ));
    }

    let overridden = |local: &Option<String>, active: &str| {
        local.as_deref().is_some_and(|value| value != active)
    };
    if overridden(&git.local_name, &identity.name) || overridden(&git.local_email, &identity.email) {
        warnings.push(format!(
            "  {} This repository sets its own author ({} <{}>); commits here ignore '{}'.",
            "⚠".yellow(),
            git.local_name.as_deref().unwrap_or(&identity.name),
            git.local_email.as_deref().unwrap_or(&identity.email),
            handle.cyan()
        ));
    }
    warnings
}

/// Table of accounts with the active one marked.
pub fn account_table(store: &Store) -> Vec<String> {
    let mut frame = Vec::new();
    if store.accounts.is_empty() {
        frame.push(format!("  {}", "No accounts found.".italic().dimmed()));
        frame.push(format!("  Run {} to add one.", "gitsw add".cyan().bold()));
        return frame;
    }

    let handle_width = store
        .accounts
        .keys()
        .map(String::len)
        .chain(["Handle".len()])
        .max()
        .unwrap_or(0);
    let name_width = store
        .accounts
        .values()
        .map(|i| i.name.len())
        .chain(["Name".len()])
        .max()
        .unwrap_or(0);
    let email_width = store
        .accounts
        .values()
        .map(|i| i.email.len() + 2)
        .chain(["Email".len()])
        .max()
        .unwrap_or(0);

    frame.push(format!(
        "    {:<hw$}  {:<nw$}  {:<ew$}  {}",
        "Handle".dimmed(),
        "Name".dimmed(),
        "Email".dimmed(),
        "Key".dimmed(),
        hw = handle_width,
        nw = name_width,
        ew = email_width
    ));
    let sep = "─".repeat(handle_width + name_width + email_width + 14);
    frame.push(format!("  {}", sep.dimmed()));

    for (handle, identity) in &store.accounts {
        let active = store.current_account.as_deref() == Some(handle.as_str());
        let marker = if active {
            "●".green().bold()
        } else {
            "○".dimmed()
        };
        let shown_handle = if active {
            handle.green().bold().to_string()
        } else {
            handle.white().to_string()
        };
        let handle_pad = " ".repeat(handle_width.saturating_sub(handle.len()));
        let name_pad = " ".repeat(name_width.saturating_sub(identity.name.len()));
        let email = format!("<{}>", identity.email);
        let email_pad = " ".repeat(email_width.saturating_sub(email.len()));

        frame.push(format!(
            "  {} {}{}  {}{}  {}{}  {}",
            marker,
            shown_handle,
            handle_pad,
            identity.name,
            name_pad,
            email.dimmed(),
            email_pad,
            identity.ssh_key.dimmed()
        ));
    }
    frame.push(format!("  {}", sep.dimmed()));
    frame
}
