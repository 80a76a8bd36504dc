use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";
const CREDENTIALS_FILE: &str = "credentials.toml";

/// Get the container base path from environment variable, defaulting to "/app"
pub fn container_base_path() -> PathBuf {
    std::env::var("LINKVAULT_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

/// Where the config directory was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLocation {
    /// `$LINKVAULT_CONFIG_DIR`
    Override,
    /// The container base path, which only exists inside the image
    Container,
    /// The platform config dir, e.g. `~/.config/linkvault`
    Platform,
}

impl fmt::Display for ConfigLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLocation::Override => write!(f, "LINKVAULT_CONFIG_DIR"),
            ConfigLocation::Container => write!(f, "container"),
            ConfigLocation::Platform => write!(f, "platform"),
        }
    }
}

/// Locates `config.toml` and `credentials.toml`.
///
/// Both files live in one directory, chosen in order: an explicit
/// `$LINKVAULT_CONFIG_DIR`, the container base path when it exists, then the
/// platform config dir.
pub struct PathManager {
    config_dir: PathBuf,
    location: ConfigLocation,
}

impl PathManager {
    pub fn resolve() -> Result<Self> {
        let explicit = std::env::var("LINKVAULT_CONFIG_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        let platform = dirs::config_dir().map(|dir| dir.join("linkvault"));
        Self::resolve_from(explicit, container_base_path(), platform)
    }

    fn resolve_from(explicit: Option<PathBuf>, container: PathBuf, platform: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = explicit {
            return Ok(Self::in_dir(dir, ConfigLocation::Override));
        }
        if container.exists() {
            return Ok(Self::in_dir(container, ConfigLocation::Container));
        }
        let dir = platform.ok_or_else(|| {
            anyhow::anyhow!("Could not determine config directory; set LINKVAULT_CONFIG_DIR")
        })?;
        Ok(Self::in_dir(dir, ConfigLocation::Platform))
    }

    pub fn in_dir(config_dir: impl Into<PathBuf>, location: ConfigLocation) -> Self {
        Self {
            config_dir: config_dir.into(),
            location,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn location(&self) -> ConfigLocation {
        self.location
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join(CREDENTIALS_FILE)
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        Self::resolve().unwrap_or_else(|_| Self::in_dir(container_base_path(), ConfigLocation::Container))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_dir_wins() {
        let container = TempDir::new().unwrap();
        let paths = PathManager::resolve_from(
            Some(PathBuf::from("/srv/linkvault")),
            container.path().to_path_buf(),
            Some(PathBuf::from("/home/u/.config/linkvault")),
        )
        .unwrap();
        assert_eq!(paths.location(), ConfigLocation::Override);
        assert_eq!(paths.config_file(), PathBuf::from("/srv/linkvault/config.toml"));
    }

    #[test]
    fn test_existing_container_dir_beats_platform() {
        let container = TempDir::new().unwrap();
        let paths = PathManager::resolve_from(
            None,
            container.path().to_path_buf(),
            Some(PathBuf::from("/home/u/.config/linkvault")),
        )
        .unwrap();
        assert_eq!(paths.location(), ConfigLocation::Container);
        assert_eq!(paths.credentials_file(), container.path().join("credentials.toml"));
    }

    #[test]
    fn test_platform_dir_when_not_in_container() {
        let paths = PathManager::resolve_from(
            None,
            PathBuf::from("/nonexistent/linkvault-base"),
            Some(PathBuf::from("/home/u/.config/linkvault")),
        )
        .unwrap();
        assert_eq!(paths.location(), ConfigLocation::Platform);
        assert_eq!(paths.config_dir(), Path::new("/home/u/.config/linkvault"));
    }

    #[test]
    fn test_no_platform_dir_is_an_error() {
        assert!(PathManager::resolve_from(None, PathBuf::from("/nonexistent/linkvault-base"), None).is_err());
    }

    #[test]
    fn test_ensure_directories_creates_config_dir() {
        let root = TempDir::new().unwrap();
        let paths = PathManager::in_dir(root.path().join("nested/linkvault"), ConfigLocation::Override);
        paths.ensure_directories().unwrap();
        assert!(paths.config_dir().is_dir());
    }
}
