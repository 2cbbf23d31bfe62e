//! Store location resolution
//!
//! The store directory comes from, in order:
//!
//! 1. an explicit path (`--store` flag or `STASH_DIR`)
//! 2. `store_dir` in `<config dir>/stash/config.toml`
//! 3. `~/.stash`
//!
//! A leading `~` in either configured path is expanded to the home
//! directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use stash_fs::constants::{CONFIG_DIR, CONFIG_FILE, DEFAULT_STORE_DIR};
use stash_fs::{ConfigStore, NormalizedPath};

use crate::{Error, Result};

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    store_dir: Option<String>,
}

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashConfig {
    pub store_dir: NormalizedPath,
}

impl StashConfig {
    /// Resolve settings using the platform config and home directories.
    pub fn resolve(explicit_store: Option<&Path>) -> Result<Self> {
        let config_dir = dirs::config_dir().map(|dir| dir.join(CONFIG_DIR));
        Self::resolve_with(
            explicit_store,
            config_dir.as_deref(),
            dirs::home_dir().as_deref(),
        )
    }

    /// Resolve settings with explicit config and home directories.
    pub fn resolve_with(
        explicit_store: Option<&Path>,
        config_dir: Option<&Path>,
        home: Option<&Path>,
    ) -> Result<Self> {
        if let Some(store) = explicit_store {
            let store_dir = expand_home(&store.to_string_lossy(), home)?;
            tracing::debug!(store = %store_dir.display(), "Using explicit store location");
            return Ok(Self::at(store_dir));
        }

        if let Some(config_dir) = config_dir {
            let path = NormalizedPath::new(config_dir.join(CONFIG_FILE));
            let file: Option<ConfigFile> = ConfigStore::new().load_optional(&path)?;
            if let Some(store_dir) = file.and_then(|f| f.store_dir) {
                let store_dir = expand_home(&store_dir, home)?;
                tracing::debug!(config = %path, store = %store_dir.display(), "Using configured store location");
                return Ok(Self::at(store_dir));
            }
        }

        let home = home.ok_or(Error::NoHomeDirectory)?;
        Ok(Self::at(home.join(DEFAULT_STORE_DIR)))
    }

    fn at(store_dir: PathBuf) -> Self {
        Self {
            store_dir: NormalizedPath::new(store_dir),
        }
    }
}

fn expand_home(path: &str, home: Option<&Path>) -> Result<PathBuf> {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => &rest[1..],
        _ => return Ok(PathBuf::from(path)),
    };
    let home = home.ok_or(Error::NoHomeDirectory)?;
    Ok(if rest.is_empty() {
        home.to_path_buf()
    } else {
        home.join(rest)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    struct Dirs {
        _temp: TempDir,
        config: PathBuf,
        home: PathBuf,
    }

    fn dirs_with_config(content: Option<&str>) -> Dirs {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config/stash");
        let home = temp.path().join("home");
        fs::create_dir_all(&config).unwrap();
        fs::create_dir_all(&home).unwrap();
        if let Some(content) = content {
            fs::write(config.join(CONFIG_FILE), content).unwrap();
        }
        Dirs {
            _temp: temp,
            config,
            home,
        }
    }

    #[test]
    fn defaults_to_dot_stash_in_home() {
        let dirs = dirs_with_config(None);
        let config = StashConfig::resolve_with(None, Some(&dirs.config), Some(&dirs.home)).unwrap();
        assert_eq!(config.store_dir, NormalizedPath::new(dirs.home.join(".stash")));
    }

    #[test]
    fn config_file_overrides_default() {
        let dirs = dirs_with_config(Some("store_dir = \"~/patches\"\n"));
        let config = StashConfig::resolve_with(None, Some(&dirs.config), Some(&dirs.home)).unwrap();
        assert_eq!(config.store_dir, NormalizedPath::new(dirs.home.join("patches")));
    }

    #[test]
    fn explicit_store_overrides_config_file() {
        let dirs = dirs_with_config(Some("store_dir = \"/from/config\"\n"));
        let config = StashConfig::resolve_with(
            Some(Path::new("/from/flag")),
            Some(&dirs.config),
            Some(&dirs.home),
        )
        .unwrap();
        assert_eq!(config.store_dir, NormalizedPath::new("/from/flag"));
    }

    #[test]
    fn config_without_store_dir_falls_back_to_default() {
        let dirs = dirs_with_config(Some("# nothing configured\n"));
        let config = StashConfig::resolve_with(None, Some(&dirs.config), Some(&dirs.home)).unwrap();
        assert_eq!(config.store_dir, NormalizedPath::new(dirs.home.join(".stash")));
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let dirs = dirs_with_config(Some("store = \"/typo\"\n"));
        let err = StashConfig::resolve_with(None, Some(&dirs.config), Some(&dirs.home)).unwrap_err();
        assert!(
            matches!(err, Error::Fs(stash_fs::Error::ConfigParse { .. })),
            "got {err:?}"
        );
        assert!(err.is_user_error());
    }

    #[test]
    fn missing_home_is_an_error_only_when_needed() {
        let err = StashConfig::resolve_with(None, None, None).unwrap_err();
        assert!(matches!(err, Error::NoHomeDirectory));

        let config = StashConfig::resolve_with(Some(Path::new("relative/store")), None, None).unwrap();
        assert_eq!(config.store_dir, NormalizedPath::new("relative/store"));
    }

    #[test]
    fn tilde_expansion_only_applies_to_leading_home() {
        let home = Path::new("/home/user");
        assert_eq!(expand_home("~", Some(home)).unwrap(), PathBuf::from("/home/user"));
        assert_eq!(
            expand_home("~/x/y", Some(home)).unwrap(),
            PathBuf::from("/home/user/x/y")
        );
        assert_eq!(expand_home("~other/x", Some(home)).unwrap(), PathBuf::from("~other/x"));
        assert_eq!(expand_home("/abs/~", Some(home)).unwrap(), PathBuf::from("/abs/~"));
    }
}
