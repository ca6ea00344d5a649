use crate::error::{Error, Result};
use crate::exec::GitRunner;
use crate::models::{Identity, Store};
use crate::tui::{Raw, raw_select};
use colored::Colorize;
use std::process::Command;

pub fn check_git_installed() -> Result<()> {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|_| ())
        .map_err(|source| Error::Spawn {
            program: "git".to_string(),
            source,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Local,
}

impl Scope {
    fn flag(self) -> &'static str {
        match self {
            Scope::Global => "--global",
            Scope::Local => "--local",
        }
    }
}

pub fn git_config_set(git: &dyn GitRunner, key: &str, value: &str, scope: Scope) -> Result<()> {
    git.git(&["config", scope.flag(), key, value])?;
    Ok(())
}

/// Read a config value; unset keys come back as `None`.
pub fn git_config_get(git: &dyn GitRunner, key: &str, scope: Scope) -> Option<String> {
    let val = git
        .git_stdout(&["config", scope.flag(), "--get", key])
        .ok()?;
    if val.is_empty() { None } else { Some(val) }
}

pub fn format_account_label(handle: &str, identity: &Identity) -> String {
    format!("{} {} <{}>", handle, identity.name, identity.email)
}

/// Resolve a handle, or let the user pick one interactively.
pub fn resolve_account(store: &Store, identifier: Option<String>, prompt: &str) -> Result<Option<String>> {
    if store.accounts.is_empty() {
        println!("\n  {}\n", "No accounts configured.".dimmed());
        println!("  Run {} to add one.\n", "gitsw add".cyan().bold());
        return Ok(None);
    }

    if let Some(id) = identifier {
        store.get(&id)?;
        return Ok(Some(id));
    }

    let handles: Vec<&String> = store.accounts.keys().collect();
    let labels: Vec<String> = store
        .accounts
        .iter()
        .map(|(h, i)| format_account_label(h, i))
        .collect();
    let default = store
        .current_account
        .as_ref()
        .and_then(|c| handles.iter().position(|h| *h == c))
        .unwrap_or(0);

    let _raw = Raw::enter();
    Ok(raw_select(prompt, &labels, default).map(|i| handles[i].clone()))
}
