//! core::config
//!
//! OCI config file loading.
//!
//! # Overview
//!
//! Credentials live in the INI-style file shared by every OCI SDK:
//!
//! ```text
//! [DEFAULT]
//! user=ocid1.user.oc1..aaaa
//! fingerprint=20:3b:97:13:55:1c:5b:0d:d3:37:d8:50:4e:c5:3a:34
//! key_file=~/.oci/oci_api_key.pem
//! tenancy=ocid1.tenancy.oc1..aaaa
//! region=us-ashburn-1
//!
//! [ACCEPTOR]
//! tenancy=ocid1.tenancy.oc1..bbbb
//! user=ocid1.user.oc1..bbbb
//! ```
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. `[DEFAULT]` section
//! 2. The requested profile's section
//!
//! Keys are case-insensitive. Lines starting with `#` or `;` are comments.
//!
//! # Example
//!
//! ```no_run
//! use peer_oracle_vcn::core::config::OciConfig;
//! use std::path::Path;
//!
//! let config = OciConfig::load(Path::new("/home/me/.oci/config")).unwrap();
//! let profile = config.profile("DEFAULT").unwrap();
//! println!("Region: {}", profile.region);
//! ```

pub mod schema;

pub use schema::{OciProfile, REQUIRED_KEYS};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::command::Credentials;
use crate::core::paths::DEFAULT_PROFILE;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}' at line {line}: {message}")]
    ParseError {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("profile '{profile}' not found in '{path}' (available: {})", available_list(.available))]
    ProfileNotFound {
        profile: String,
        path: PathBuf,
        available: Vec<String>,
    },

    #[error("profile '{profile}' is missing required key '{key}'")]
    MissingKey { profile: String, key: String },

    #[error("profile '{profile}' has invalid '{key}': {message}")]
    InvalidValue {
        profile: String,
        key: String,
        message: String,
    },

    #[error("failed to read key file '{path}': {source}")]
    KeyFileError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unusable private key '{path}': {message}")]
    InvalidKey { path: PathBuf, message: String },
}

fn available_list(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// A parsed OCI config file.
///
/// Holds the raw sections; profiles are validated lazily by
/// [`OciConfig::profile`] so that one broken profile does not prevent
/// using another.
#[derive(Debug, Clone, Default)]
pub struct OciConfig {
    /// Path the file was loaded from
    path: PathBuf,
    /// `[DEFAULT]` entries, inherited by every profile
    defaults: BTreeMap<String, String>,
    /// Named sections (excluding DEFAULT)
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl OciConfig {
    /// Load and parse a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(path, &contents)
    }

    /// Parse config file contents.
    ///
    /// `path` is only used in error messages.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let parse_err = |line: usize, message: String| ConfigError::ParseError {
            path: path.to_path_buf(),
            line,
            message,
        };

        let mut defaults = BTreeMap::new();
        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut current: Option<String> = None;

        for (idx, raw) in contents.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| parse_err(line_no, "unterminated section header".into()))?
                    .trim();
                if name.is_empty() {
                    return Err(parse_err(line_no, "empty section name".into()));
                }
                if name != DEFAULT_PROFILE {
                    if sections.contains_key(name) {
                        return Err(parse_err(line_no, format!("duplicate section '{name}'")));
                    }
                    sections.insert(name.to_string(), BTreeMap::new());
                }
                current = Some(name.to_string());
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| parse_err(line_no, format!("expected 'key=value', got '{line}'")))?;
            let key = key.trim().to_ascii_lowercase();
            if key.is_empty() {
                return Err(parse_err(line_no, "empty key".into()));
            }
            let value = value.trim().to_string();

            match current.as_deref() {
                None => {
                    return Err(parse_err(
                        line_no,
                        "key defined before any [section] header".into(),
                    ))
                }
                Some(DEFAULT_PROFILE) => {
                    defaults.insert(key, value);
                }
                Some(name) => {
                    if let Some(section) = sections.get_mut(name) {
                        section.insert(key, value);
                    }
                }
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            defaults,
            sections,
        })
    }

    /// Resolve a profile, applying `[DEFAULT]` inheritance.
    ///
    /// `DEFAULT` itself is a valid profile name when the file has a
    /// `[DEFAULT]` section.
    ///
    /// # Errors
    ///
    /// - `ConfigError::ProfileNotFound` if no such section exists
    /// - `ConfigError::MissingKey` / `InvalidValue` if the merged entries are incomplete
    pub fn profile(&self, name: &str) -> Result<OciProfile, ConfigError> {
        let mut merged = self.defaults.clone();

        if name == DEFAULT_PROFILE {
            if self.defaults.is_empty() {
                return Err(self.not_found(name));
            }
        } else {
            let section = self.sections.get(name).ok_or_else(|| self.not_found(name))?;
            merged.extend(section.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        OciProfile::from_entries(name, &merged)
    }

    /// Names of all profiles in the file, DEFAULT first when present.
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(self.sections.len() + 1);
        if !self.defaults.is_empty() {
            names.push(DEFAULT_PROFILE);
        }
        names.extend(self.sections.keys().map(String::as_str));
        names
    }

    /// Path the file was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn not_found(&self, profile: &str) -> ConfigError {
        ConfigError::ProfileNotFound {
            profile: profile.to_string(),
            path: self.path.clone(),
            available: self.profile_names().into_iter().map(String::from).collect(),
        }
    }
}

/// Load the profile a credential reference points at.
///
/// This is the single entry point commands use; it reads the file on
/// every call since each invocation loads at most two profiles.
pub fn load_profile(credentials: &Credentials) -> Result<OciProfile, ConfigError> {
    OciConfig::load(credentials.config_file())?.profile(credentials.profile())
}
