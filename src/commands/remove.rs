use super::Context;
use crate::error::Result;
use crate::keys;
use crate::models::{Identity, Store};
use crate::settings::Paths;
use crate::ssh_config;
use crate::tui::{Raw, raw_confirm};
use crate::utils::resolve_account;
use colored::Colorize;
use tracing::info;

/// Remove an identity and persist. Generated key files are deleted only
/// when asked to. Removing the active identity also drops its SSH routing.
pub fn remove_account(
    store: &mut Store,
    paths: &Paths,
    handle: &str,
    delete_key: bool,
) -> Result<Identity> {
    let was_active = store.current_account.as_deref() == Some(handle);
    let identity = store.remove(handle)?;
    store.save(&paths.config)?;
    if was_active {
        ssh_config::clear(&paths.ssh_config())?;
    }
    if delete_key && identity.generated_key {
        keys::delete_pair(&keys::key_path(&paths.ssh_dir, &identity.ssh_key))?;
    }
    info!(handle, delete_key, "removed account");
    Ok(identity)
}

/// `delete_key` of `None` asks interactively when the key was generated.
pub fn run(ctx: &mut Context, handle: Option<String>, delete_key: Option<bool>) -> Result<()> {
    let Some(handle) = resolve_account(&ctx.store, handle, "Remove")? else {
        return Ok(());
    };
    let generated = ctx.store.get(&handle)?.generated_key;

    let (confirmed, delete_key) = {
        let _raw = Raw::enter();
        let confirmed = raw_confirm(&format!("Remove account '{}'?", handle.yellow()), false);
        let delete_key = match (confirmed, delete_key) {
            (Some(true), Some(flag)) => flag,
            (Some(true), None) if generated => {
                raw_confirm("Also delete the SSH key files gitsw generated?", false) == Some(true)
            }
            _ => false,
        };
        (confirmed == Some(true), delete_key)
    };
    if !confirmed {
        println!("  {}", "Cancelled.".dimmed());
        return Ok(());
    }

    let was_active = ctx.store.current_account.as_deref() == Some(handle.as_str());
    remove_account(&mut ctx.store, &ctx.paths, &handle, delete_key)?;
    println!("  {} Removed '{}'", "✓".green().bold(), handle.cyan());
    if was_active {
        println!(
            "  {} No account is active now. Run {} to pick one.",
            "⚠".yellow(),
            "gitsw use".cyan()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup(generated: bool) -> (TempDir, Paths, Store) {
        let temp = TempDir::new().unwrap();
        let paths = Paths {
            config: temp.path().join("config.json"),
            ssh_dir: temp.path().join("ssh"),
        };
        fs::create_dir_all(&paths.ssh_dir).unwrap();
        fs::write(paths.ssh_dir.join("id_bob"), "priv").unwrap();
        fs::write(paths.ssh_dir.join("id_bob.pub"), "pub").unwrap();

        let mut store = Store::default();
        store
            .add(
                "bob",
                Identity {
                    name: "Bob".into(),
                    email: "bob@example.com".into(),
                    ssh_key: "id_bob".into(),
                    generated_key: generated,
                },
            )
            .unwrap();
        store.set_current("bob").unwrap();
        (temp, paths, store)
    }

    #[test]
    fn test_remove_active_persists_cleared_pointer() {
        let (_temp, paths, mut store) = setup(false);
        remove_account(&mut store, &paths, "bob", false).unwrap();

        let saved = Store::load(&paths.config).unwrap();
        assert!(saved.accounts.is_empty());
        assert_eq!(saved.current_account, None);
        assert!(paths.ssh_dir.join("id_bob").exists());
    }

    #[test]
    fn test_remove_active_drops_ssh_routing() {
        let (_temp, paths, mut store) = setup(true);
        fs::write(paths.ssh_config(), "Host work\n  User me\n").unwrap();
        ssh_config::apply(&paths.ssh_config(), &paths.ssh_dir.join("id_bob")).unwrap();

        remove_account(&mut store, &paths, "bob", true).unwrap();
        let ssh = fs::read_to_string(paths.ssh_config()).unwrap();
        assert!(!ssh.contains("id_bob"));
        assert!(ssh.contains("Host work"));
    }

    #[test]
    fn test_remove_inactive_keeps_ssh_routing() {
        let (_temp, paths, mut store) = setup(false);
        store
            .add(
                "carol",
                Identity {
                    name: "Carol".into(),
                    email: "carol@example.com".into(),
                    ssh_key: "id_carol".into(),
                    generated_key: false,
                },
            )
            .unwrap();
        ssh_config::apply(&paths.ssh_config(), &paths.ssh_dir.join("id_bob")).unwrap();

        remove_account(&mut store, &paths, "carol", false).unwrap();
        let ssh = fs::read_to_string(paths.ssh_config()).unwrap();
        assert!(ssh.contains("id_bob"));
    }

    #[test]
    fn test_remove_deletes_generated_key() {
        let (_temp, paths, mut store) = setup(true);
        remove_account(&mut store, &paths, "bob", true).unwrap();
        assert!(!paths.ssh_dir.join("id_bob").exists());
        assert!(!paths.ssh_dir.join("id_bob.pub").exists());
    }

    #[test]
    fn test_remove_never_deletes_user_key() {
        let (_temp, paths, mut store) = setup(false);
        remove_account(&mut store, &paths, "bob", true).unwrap();
        assert!(paths.ssh_dir.join("id_bob").exists());
    }
}
