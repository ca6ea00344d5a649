use super::Context;
use crate::activate::activate;
use crate::error::{Error, Result};
use crate::exec::Executor;
use crate::keys::{self, default_key_name};
use crate::models::{Identity, Store, validate_handle};
use crate::settings::Paths;
use crate::tui::{Raw, raw_confirm, raw_input, raw_println, raw_select};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

const GITHUB_NEW_KEY_URL: &str = "https://github.com/settings/ssh/new";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Create `id_<handle>` with ssh-keygen.
    Generate,
    /// Reference a key that already exists (name in the SSH dir, or a path).
    Existing(String),
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub handle: String,
    pub name: String,
    pub email: String,
    pub key: KeySource,
}

/// Validate, obtain the key, then store and persist the identity.
/// On any failure the store is left untouched.
pub fn register(store: &mut Store, paths: &Paths, account: NewAccount) -> Result<PathBuf> {
    validate_handle(&account.handle)?;
    if store.accounts.contains_key(&account.handle) {
        return Err(Error::AccountExists(account.handle));
    }

    let (ssh_key, path, generated_key) = match account.key {
        KeySource::Generate => {
            let name = default_key_name(&account.handle);
            let path = keys::generate(&paths.ssh_dir, &name, &account.email)?;
            (name, path, true)
        }
        KeySource::Existing(reference) => {
            let path = keys::resolve(&paths.ssh_dir, &reference)?;
            (reference, path, false)
        }
    };

    store.add(
        &account.handle,
        Identity {
            name: account.name,
            email: account.email,
            ssh_key,
            generated_key,
        },
    )?;
    store.save(&paths.config)?;
    info!(handle = %account.handle, generated_key, "added account");
    Ok(path)
}

pub fn run(ctx: &mut Context) -> Result<()> {
    let Some((account, raw)) = prompt_account() else {
        return Ok(());
    };
    let generated = account.key == KeySource::Generate;
    let handle = account.handle.clone();

    let path = register(&mut ctx.store, &ctx.paths, account)?;
    raw_println(&format!(
        "\n  {} Account '{}' added.\n",
        "✓".green().bold(),
        handle.cyan()
    ));

    let open_settings = generated && {
        let public = keys::read_public_key(&path)?;
        raw_println(&format!("  {}", "Public key (add it to GitHub):".bold()));
        raw_println(&format!("  {}\n", public.dimmed()));
        raw_confirm("Open GitHub SSH key settings in the browser?", true) == Some(true)
    };
    drop(raw);

    if open_settings && open::that(GITHUB_NEW_KEY_URL).is_err() {
        println!("  (Failed to open browser, visit {GITHUB_NEW_KEY_URL})");
    }
    offer_switch(ctx, &handle)
}

fn offer_switch(ctx: &mut Context, handle: &str) -> Result<()> {
    let switch = {
        let _raw = Raw::enter();
        raw_confirm(&format!("Switch to '{}' now?", handle.cyan()), true)
    };
    if switch == Some(true) {
        let git = Executor::new(&ctx.cwd, None);
        activate(&mut ctx.store, handle, &ctx.paths, &git)?;
        println!("  {} Switched to '{}'", "✔".green(), handle.cyan());
    }
    Ok(())
}

/// Collect the new account's fields. Keeps raw mode on for follow-ups.
fn prompt_account() -> Option<(NewAccount, Raw)> {
    let raw = Raw::enter();

    raw_println("");
    raw_println(&format!("  {}", "Add Git Account".bold()));
    raw_println(&format!("  {}", "─".repeat(48).dimmed()));
    raw_println("");

    let methods = vec![
        "Generate a new SSH key".to_string(),
        "Use an existing key file".to_string(),
    ];
    let method = raw_select("SSH key", &methods, 0)?;

    let handle = raw_input("Handle (e.g. work, personal)", "").filter(|h| !h.is_empty())?;
    raw_println(&format!("  Handle: {}", handle.cyan()));
    let name = raw_input("Commit name", "").filter(|n| !n.is_empty())?;
    raw_println(&format!("  Commit name: {}", name.cyan()));
    let email = raw_input("Commit email", "").filter(|e| !e.is_empty())?;
    raw_println(&format!("  Commit email: {}", email.cyan()));

    let key = if method == 0 {
        KeySource::Generate
    } else {
        let reference = raw_input("Key file (name in ~/.ssh or path)", &default_key_name(&handle))
            .filter(|k| !k.is_empty())?;
        raw_println(&format!("  Key file: {}", reference.cyan()));
        KeySource::Existing(reference)
    };

    Some((
        NewAccount {
            handle,
            name,
            email,
            key,
        },
        raw,
    ))
}
