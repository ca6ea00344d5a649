pub mod add;
pub mod branch;
pub mod commit;
pub mod connection;
pub mod git;
pub mod list;
pub mod menu;
pub mod push;
pub mod remove;
pub mod repo;
pub mod status;
pub mod switch;

use crate::activate::active_key;
use crate::error::{Error, Result};
use crate::exec::Executor;
use crate::models::{Identity, Store};
use crate::settings::Paths;
use std::path::PathBuf;

/// State threaded through every command: the loaded store, where it lives,
/// and the directory git runs in.
pub struct Context {
    pub store: Store,
    pub paths: Paths,
    pub cwd: PathBuf,
}

impl Context {
    pub fn load(paths: Paths, cwd: PathBuf) -> Result<Self> {
        let store = Store::load(&paths.config)?;
        Ok(Self { store, paths, cwd })
    }

    pub fn save(&self) -> Result<()> {
        self.store.save(&self.paths.config)
    }

    /// Executor scoped to the active identity's key, if any.
    pub fn executor(&self) -> Result<Executor> {
        Ok(Executor::new(
            &self.cwd,
            active_key(&self.store, &self.paths)?,
        ))
    }

    /// Executor pinned to a specific identity, regardless of the active one.
    pub fn executor_for(&self, handle: &str) -> Result<Executor> {
        let identity = self.store.get(handle)?;
        let key = crate::keys::resolve(&self.paths.ssh_dir, &identity.ssh_key)?;
        Ok(Executor::new(&self.cwd, Some(key)))
    }

    pub fn require_active(&self) -> Result<(&str, &Identity)> {
        self.store.current().ok_or(Error::NoActiveAccount)
    }
}
