//! TOML configuration file adapter.
//!
//! Implements [`ConfigPort`].  A missing file is not an error: the
//! defaults apply.  Unknown keys are tolerated, missing keys take their
//! default, and the merged result is range-checked before it is returned.
//!
//! ```toml
//! capacity = 40
//! cooldown_ms = 3000
//!
//! [entry]
//! camera_dir = "/var/lib/gatekeeper/entry"
//! serial_path = "/dev/ttyUSB0"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

#[derive(Debug, Clone)]
pub struct TomlConfigFile {
    path: PathBuf,
}

impl TomlConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for TomlConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let config = match fs::read_to_string(&self.path) {
            Ok(text) => {
                info!("Config: loading {}", self.path.display());
                parse_config(&text)?
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("Config: {} not found, using defaults", self.path.display());
                SystemConfig::default()
            }
            Err(e) => return Err(ConfigError::IoError(e)),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Parse (but do not validate) a TOML document.
pub fn parse_config(text: &str) -> Result<SystemConfig, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::Corrupted(e.to_string()))
}
