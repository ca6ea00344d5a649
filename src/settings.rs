use crate::error::{Error, Result};
use std::path::PathBuf;

/// File locations gitsw reads and writes.
#[derive(Debug, Clone)]
pub struct Paths {
    pub config: PathBuf,
    pub ssh_dir: PathBuf,
}

impl Paths {
    /// Resolve locations, preferring explicit overrides over platform defaults.
    pub fn resolve(config: Option<PathBuf>, ssh_dir: Option<PathBuf>) -> Result<Self> {
        let config = match config {
            Some(path) => path,
            None => dirs::config_dir()
                .ok_or(Error::NoHomeDir)?
                .join("gitsw")
                .join("config.json"),
        };
        let ssh_dir = match ssh_dir {
            Some(path) => path,
            None => dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".ssh"),
        };
        Ok(Self { config, ssh_dir })
    }

    pub fn ssh_config(&self) -> PathBuf {
        self.ssh_dir.join("config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let paths = Paths::resolve(
            Some(PathBuf::from("/tmp/cfg.json")),
            Some(PathBuf::from("/tmp/ssh")),
        )
        .unwrap();
        assert_eq!(paths.config, PathBuf::from("/tmp/cfg.json"));
        assert_eq!(paths.ssh_config(), PathBuf::from("/tmp/ssh/config"));
    }
}
