//! Make an identity the active one.
//!
//! ```text
//! activate(handle)
//!   |-- resolve key           KeyMissing aborts before anything changes
//!   |-- git config --global   user.name / user.email
//!   |-- ~/.ssh/config         managed github.com block -> key
//!   `-- store.currentAccount  saved
//! ```

use crate::error::Result;
use crate::exec::GitRunner;
use crate::keys;
use crate::models::Store;
use crate::settings::Paths;
use crate::ssh_config;
use crate::utils::{Scope, git_config_set};
use std::path::PathBuf;
use tracing::info;

/// Apply `handle` globally and persist it as the active account.
/// Returns the private key path now routed for github.com.
pub fn activate(
    store: &mut Store,
    handle: &str,
    paths: &Paths,
    git: &dyn GitRunner,
) -> Result<PathBuf> {
    let identity = store.get(handle)?.clone();
    let key = keys::resolve(&paths.ssh_dir, &identity.ssh_key)?;

    git_config_set(git, "user.name", &identity.name, Scope::Global)?;
    git_config_set(git, "user.email", &identity.email, Scope::Global)?;
    ssh_config::apply(&paths.ssh_config(), &key)?;

    store.set_current(handle)?;
    store.save(&paths.config)?;
    info!(handle, key = %key.display(), "activated account");
    Ok(key)
}

/// Key of the active identity, if one is set and its key still exists.
pub fn active_key(store: &Store, paths: &Paths) -> Result<Option<PathBuf>> {
    match store.current() {
        Some((_, identity)) => Ok(Some(keys::resolve(&paths.ssh_dir, &identity.ssh_key)?)),
        None => Ok(None),
    }
}
