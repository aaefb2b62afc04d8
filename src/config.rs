//! TOML configuration for the server and the delivery pipeline.
//!
//! Every field has a default so a partial file (or no file at all) works.
//! Resolution order: explicit `--config` path, `webcalc.toml` in the working
//! directory, then `webcalc/config.toml` under the user config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Longest expression the eval API accepts, in bytes.
    #[serde(default = "default_max_expr_len")]
    pub max_expr_len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Image name without registry or tag, e.g. `webcalc`.
    #[serde(default = "default_image")]
    pub image: String,

    /// Image tag.
    #[serde(default = "default_tag")]
    pub tag: String,

    /// Registry host the image is pushed to.
    #[serde(default = "default_registry")]
    pub registry: String,

    /// Build context directory handed to `docker build`.
    #[serde(default = "default_context")]
    pub context: PathBuf,

    /// Repository to clone in the checkout stage. When unset, the checkout
    /// stage verifies the local build context instead.
    #[serde(default)]
    pub repo_url: Option<String>,

    /// Environment variable holding the registry username.
    #[serde(default = "default_username_env")]
    pub username_env: String,

    /// Environment variable holding the registry password.
    #[serde(default = "default_password_env")]
    pub password_env: String,
}

fn default_bind() -> String {
    "127.0.0.1:8350".to_string()
}

fn default_max_expr_len() -> usize {
    256
}

fn default_image() -> String {
    "webcalc".to_string()
}

fn default_tag() -> String {
    "latest".to_string()
}

fn default_registry() -> String {
    "docker.io".to_string()
}

fn default_context() -> PathBuf {
    PathBuf::from(".")
}

fn default_username_env() -> String {
    "REGISTRY_USERNAME".to_string()
}

fn default_password_env() -> String {
    "REGISTRY_PASSWORD".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_expr_len: default_max_expr_len(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            image: default_image(),
            tag: default_tag(),
            registry: default_registry(),
            context: default_context(),
            repo_url: None,
            username_env: default_username_env(),
            password_env: default_password_env(),
        }
    }
}

impl Config {
    /// Load configuration, preferring an explicit path.
    ///
    /// A missing file falls back to defaults; a present but unparsable file
    /// is an error, never silently ignored.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path(),
        };

        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            if explicit.is_some() {
                return Err(ConfigError::Io {
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "config file not found",
                    ),
                    path,
                });
            }
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// First existing candidate among the default locations.
    fn default_path() -> Option<PathBuf> {
        let local = PathBuf::from("webcalc.toml");
        if local.exists() {
            return Some(local);
        }
        let user = dirs::config_dir()?.join("webcalc").join("config.toml");
        if user.exists() {
            return Some(user);
        }
        None
    }

    /// Effective bind address: `WEBCALC_BIND` wins over the config file.
    pub fn bind_addr(&self) -> String {
        std::env::var("WEBCALC_BIND").unwrap_or_else(|_| self.server.bind.clone())
    }

    /// Fully qualified image reference, e.g. `docker.io/webcalc:latest`.
    pub fn image_ref(&self) -> String {
        format!(
            "{}/{}:{}",
            self.pipeline.registry, self.pipeline.image, self.pipeline.tag
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.bind, "127.0.0.1:8350");
        assert_eq!(config.server.max_expr_len, 256);
        assert_eq!(config.pipeline.tag, "latest");
        assert_eq!(config.image_ref(), "docker.io/webcalc:latest");
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pipeline]\nimage = \"calc\"\ntag = \"1.2.0\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.pipeline.image, "calc");
        assert_eq!(config.pipeline.tag, "1.2.0");
        // Untouched sections keep their defaults
        assert_eq!(config.server.bind, "127.0.0.1:8350");
        assert_eq!(config.pipeline.registry, "docker.io");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pipeline = not valid toml").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_full_file_roundtrip() {
        let config = Config {
            server: ServerConfig {
                bind: "0.0.0.0:8080".to_string(),
                max_expr_len: 512,
            },
            pipeline: PipelineConfig {
                image: "calc".to_string(),
                tag: "2.0".to_string(),
                registry: "registry.example.com".to_string(),
                context: PathBuf::from("site"),
                repo_url: Some("https://example.com/calc.git".to_string()),
                username_env: "CI_USER".to_string(),
                password_env: "CI_PASS".to_string(),
            },
        };

        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.image_ref(), "registry.example.com/calc:2.0");
    }
}
