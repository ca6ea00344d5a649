use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub const DEFAULT_BRANCH: &str = "main";

/// A named git identity bound to one SSH key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub name: String,
    pub email: String,
    /// Key file name inside the SSH directory, or an absolute path.
    pub ssh_key: String,
    /// True when gitsw created the key pair and may delete it on removal.
    #[serde(default)]
    pub generated_key: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSetting {
    #[serde(default)]
    pub initialized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Everything gitsw persists. Saved wholesale after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Store {
    pub accounts: BTreeMap<String, Identity>,
    pub current_account: Option<String>,
    pub default_branch: String,
    /// Keyed by absolute working-directory path.
    pub repo_settings: BTreeMap<String, RepoSetting>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            accounts: BTreeMap::new(),
            current_account: None,
            default_branch: DEFAULT_BRANCH.to_string(),
            repo_settings: BTreeMap::new(),
        }
    }
}

impl Store {
    /// Load the store, falling back to an empty one when the file is
    /// missing or unparsable.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file absent, starting empty");
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        let mut store: Store = match serde_json::from_str(&data) {
            Ok(store) => store,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config file is corrupt, using defaults");
                return Ok(Self::default());
            }
        };
        if let Some(handle) = &store.current_account
            && !store.accounts.contains_key(handle)
        {
            warn!(handle = %handle, "active account no longer exists, clearing it");
            store.current_account = None;
        }
        if store.default_branch.trim().is_empty() {
            store.default_branch = DEFAULT_BRANCH.to_string();
        }
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        debug!(path = %path.display(), accounts = self.accounts.len(), "saved config");
        Ok(())
    }

    pub fn get(&self, handle: &str) -> Result<&Identity> {
        self.accounts
            .get(handle)
            .ok_or_else(|| Error::AccountNotFound(handle.to_string()))
    }

    pub fn add(&mut self, handle: &str, identity: Identity) -> Result<()> {
        validate_handle(handle)?;
        if self.accounts.contains_key(handle) {
            return Err(Error::AccountExists(handle.to_string()));
        }
        self.accounts.insert(handle.to_string(), identity);
        Ok(())
    }

    /// Remove an identity, clearing the active pointer if it referenced it.
    pub fn remove(&mut self, handle: &str) -> Result<Identity> {
        let identity = self
            .accounts
            .remove(handle)
            .ok_or_else(|| Error::AccountNotFound(handle.to_string()))?;
        if self.current_account.as_deref() == Some(handle) {
            self.current_account = None;
        }
        Ok(identity)
    }

    pub fn set_current(&mut self, handle: &str) -> Result<()> {
        if !self.accounts.contains_key(handle) {
            return Err(Error::AccountNotFound(handle.to_string()));
        }
        self.current_account = Some(handle.to_string());
        Ok(())
    }

    pub fn current(&self) -> Option<(&str, &Identity)> {
        let handle = self.current_account.as_deref()?;
        self.accounts.get(handle).map(|identity| (handle, identity))
    }

    pub fn repo_setting(&self, workdir: &Path) -> Option<&RepoSetting> {
        self.repo_settings.get(&repo_key(workdir))
    }

    /// Record the branch chosen on first use of a working directory.
    pub fn record_repo_branch(&mut self, workdir: &Path, branch: &str) {
        self.repo_settings.insert(
            repo_key(workdir),
            RepoSetting {
                initialized: true,
                branch: Some(branch.to_string()),
            },
        );
    }
}

fn repo_key(workdir: &Path) -> String {
    workdir.to_string_lossy().into_owned()
}

/// Handles become key file names, so keep them to a safe character set.
pub fn validate_handle(handle: &str) -> Result<()> {
    let valid = !handle.is_empty()
        && !handle.starts_with('.')
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidHandle(handle.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn identity(name: &str) -> Identity {
        Identity {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            ssh_key: format!("id_{name}"),
            generated_key: false,
        }
    }

    #[test]
    fn test_default_store() {
        let store = Store::default();
        assert!(store.accounts.is_empty());
        assert_eq!(store.current_account, None);
        assert_eq!(store.default_branch, "main");
    }

    #[test]
    fn test_add_rejects_duplicate_handle() {
        let mut store = Store::default();
        store.add("alice", identity("alice")).unwrap();
        let err = store.add("alice", identity("other")).unwrap_err();
        assert!(matches!(err, Error::AccountExists(h) if h == "alice"));
        assert_eq!(store.get("alice").unwrap().name, "alice");
    }

    #[test]
    fn test_add_rejects_bad_handle() {
        let mut store = Store::default();
        for bad in ["", "../evil", "a b", ".hidden", "x/y"] {
            assert!(matches!(
                store.add(bad, identity("x")),
                Err(Error::InvalidHandle(_))
            ));
        }
        assert!(store.accounts.is_empty());
    }

    #[test]
    fn test_remove_active_clears_pointer() {
        let mut store = Store::default();
        store.add("alice", identity("alice")).unwrap();
        store.add("bob", identity("bob")).unwrap();
        store.set_current("alice").unwrap();

        store.remove("alice").unwrap();
        assert_eq!(store.current_account, None);
        assert!(store.current().is_none());
    }

    #[test]
    fn test_remove_other_keeps_pointer() {
        let mut store = Store::default();
        store.add("alice", identity("alice")).unwrap();
        store.add("bob", identity("bob")).unwrap();
        store.set_current("alice").unwrap();

        store.remove("bob").unwrap();
        assert_eq!(store.current_account.as_deref(), Some("alice"));
    }

    #[test]
    fn test_remove_unknown() {
        let mut store = Store::default();
        assert!(matches!(
            store.remove("ghost"),
            Err(Error::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_set_current_unknown() {
        let mut store = Store::default();
        assert!(store.set_current("ghost").is_err());
        assert_eq!(store.current_account, None);
    }

    #[test]
    fn test_config_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.json");

        let mut store = Store::default();
        store.add("alice", identity("alice")).unwrap();
        store
            .add(
                "work",
                Identity {
                    generated_key: true,
                    ..identity("work")
                },
            )
            .unwrap();
        store.set_current("work").unwrap();
        store.record_repo_branch(Path::new("/home/me/project"), "develop");
        store.default_branch = "trunk".to_string();

        store.save(&path).unwrap();
        let loaded = Store::load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_json_layout() {
        let mut store = Store::default();
        store.add("alice", identity("alice")).unwrap();
        store.set_current("alice").unwrap();
        store.record_repo_branch(Path::new("/repo"), "main");

        let json: serde_json::Value = serde_json::to_value(&store).unwrap();
        assert_eq!(json["currentAccount"], "alice");
        assert_eq!(json["defaultBranch"], "main");
        assert_eq!(json["accounts"]["alice"]["sshKey"], "id_alice");
        assert_eq!(json["accounts"]["alice"]["generatedKey"], false);
        assert_eq!(json["repoSettings"]["/repo"]["initialized"], true);
        assert_eq!(json["repoSettings"]["/repo"]["branch"], "main");
    }

    #[test]
    fn test_load_missing_fields_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{"accounts":{"a":{"name":"A","email":"a@x","sshKey":"id_a"}}}"#,
        )
        .unwrap();

        let store = Store::load(&path).unwrap();
        assert_eq!(store.default_branch, "main");
        assert!(!store.get("a").unwrap().generated_key);
        assert!(store.repo_settings.is_empty());
    }

    #[test]
    fn test_load_corrupt_falls_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let store = Store::load(&path).unwrap();
        assert_eq!(store, Store::default());
    }

    #[test]
    fn test_load_clears_dangling_current() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"accounts":{},"currentAccount":"ghost"}"#).unwrap();

        let store = Store::load(&path).unwrap();
        assert_eq!(store.current_account, None);
    }

    #[test]
    fn test_repo_setting_keyed_by_path() {
        let mut store = Store::default();
        store.record_repo_branch(Path::new("/a/repo"), "main");

        let setting = store.repo_setting(Path::new("/a/repo")).unwrap();
        assert!(setting.initialized);
        assert_eq!(setting.branch.as_deref(), Some("main"));
        assert!(store.repo_setting(Path::new("/b/repo")).is_none());
    }
}
