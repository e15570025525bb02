//! core::paths
//!
//! Centralized path handling for OCI credential files.
//!
//! # Conventions
//!
//! The OCI SDKs and CLI agree on:
//! - `~/.oci/config` as the default config file
//! - `DEFAULT` as the default profile name
//! - `~` in `key_file` values meaning the user's home directory
//!
//! All tilde expansion goes through [`expand_home`] so the CLI validator
//! and the config loader resolve paths identically.
//!
//! # Example
//!
//! ```
//! use peer_oracle_vcn::core::paths::expand_home;
//! use std::path::{Path, PathBuf};
//!
//! assert_eq!(expand_home(Path::new("/etc/oci/config")), PathBuf::from("/etc/oci/config"));
//! ```

use std::path::{Path, PathBuf};

/// Default config file location, before tilde expansion.
pub const DEFAULT_CONFIG_LOCATION: &str = "~/.oci/config";

/// Default profile name.
pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// Expand a leading `~` or `~/` to the home directory.
///
/// Paths without a leading tilde, and `~user` forms, are returned
/// unchanged. If the home directory cannot be determined the path is
/// also returned unchanged and the later `is_file` check reports it.
pub fn expand_home(path: &Path) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path.to_path_buf();
    };

    let rest = if s == "~" {
        ""
    } else if let Some(rest) = s.strip_prefix("~/") {
        rest
    } else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// The default config file, with the home directory expanded.
pub fn default_config_file() -> PathBuf {
    expand_home(Path::new(DEFAULT_CONFIG_LOCATION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_unchanged() {
        let p = Path::new("/opt/oci/config");
        assert_eq!(expand_home(p), PathBuf::from("/opt/oci/config"));
    }

    #[test]
    fn relative_path_unchanged() {
        let p = Path::new("config/oci");
        assert_eq!(expand_home(p), PathBuf::from("config/oci"));
    }

    #[test]
    fn other_user_tilde_unchanged() {
        let p = Path::new("~alice/.oci/config");
        assert_eq!(expand_home(p), PathBuf::from("~alice/.oci/config"));
    }

    #[test]
    fn tilde_slash_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home(Path::new("~/.oci/config")),
                home.join(".oci/config")
            );
            assert_eq!(expand_home(Path::new("~")), home);
        }
    }

    #[test]
    fn default_config_file_ends_with_oci_config() {
        let p = default_config_file();
        assert!(p.ends_with(".oci/config"));
    }
}
