//! core::config::schema
//!
//! Typed view of one OCI config profile.
//!
//! # Required keys
//!
//! | Key | Meaning |
//! |---|---|
//! | `user` | OCID of the API user |
//! | `fingerprint` | Fingerprint of the uploaded public key |
//! | `key_file` | Path to the PEM private key |
//! | `tenancy` | OCID of the tenancy |
//! | `region` | Region identifier, e.g. `us-ashburn-1` |
//!
//! `pass_phrase` is recognized so that encrypted keys can be rejected with
//! a clear message instead of a parse failure deep in the signer.

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::ConfigError;
use crate::core::paths::expand_home;
use crate::core::types::Ocid;

/// Keys every profile must define (directly or through `[DEFAULT]`).
pub const REQUIRED_KEYS: [&str; 5] = ["user", "fingerprint", "key_file", "tenancy", "region"];

/// A fully resolved OCI profile.
#[derive(Clone, PartialEq, Eq)]
pub struct OciProfile {
    /// Section name the profile was loaded from
    pub name: String,
    /// API user OCID
    pub user: Ocid,
    /// Public key fingerprint (`aa:bb:...`)
    pub fingerprint: String,
    /// Private key location, home-expanded
    pub key_file: PathBuf,
    /// Tenancy OCID
    pub tenancy: Ocid,
    /// Region identifier
    pub region: String,
    /// Key passphrase, if configured
    pub pass_phrase: Option<String>,
}

// Custom Debug to avoid exposing pass_phrase
impl std::fmt::Debug for OciProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OciProfile")
            .field("name", &self.name)
            .field("user", &self.user)
            .field("fingerprint", &self.fingerprint)
            .field("key_file", &self.key_file)
            .field("tenancy", &self.tenancy)
            .field("region", &self.region)
            .field("has_pass_phrase", &self.pass_phrase.is_some())
            .finish()
    }
}

impl OciProfile {
    /// Build a profile from merged `key = value` pairs.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingKey` if a required key is absent or blank
    /// - `ConfigError::InvalidValue` if `user` or `tenancy` is not an OCID,
    ///   or `region` contains characters that cannot appear in a hostname
    pub fn from_entries(
        name: &str,
        entries: &BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let get = |key: &str| -> Result<&str, ConfigError> {
            entries
                .get(key)
                .map(String::as_str)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingKey {
                    profile: name.to_string(),
                    key: key.to_string(),
                })
        };

        let user = Ocid::new(get("user")?).map_err(|e| ConfigError::InvalidValue {
            profile: name.to_string(),
            key: "user".into(),
            message: e.to_string(),
        })?;
        let tenancy = Ocid::new(get("tenancy")?).map_err(|e| ConfigError::InvalidValue {
            profile: name.to_string(),
            key: "tenancy".into(),
            message: e.to_string(),
        })?;

        let region = get("region")?.to_ascii_lowercase();
        if !region
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ConfigError::InvalidValue {
                profile: name.to_string(),
                key: "region".into(),
                message: format!("'{region}' is not a region identifier"),
            });
        }

        Ok(Self {
            name: name.to_string(),
            user,
            fingerprint: get("fingerprint")?.to_string(),
            key_file: expand_home(std::path::Path::new(get("key_file")?)),
            tenancy,
            region,
            pass_phrase: entries
                .get("pass_phrase")
                .filter(|v| !v.is_empty())
                .cloned(),
        })
    }

    /// The `keyId` used in request signatures: `tenancy/user/fingerprint`.
    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy, self.user, self.fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn complete() -> BTreeMap<String, String> {
        entries(&[
            ("user", "ocid1.user.oc1..alice"),
            ("fingerprint", "20:3b:97:13"),
            ("key_file", "/keys/oci.pem"),
            ("tenancy", "ocid1.tenancy.oc1..acme"),
            ("region", "us-ashburn-1"),
        ])
    }

    #[test]
    fn complete_profile_parses() {
        let profile = OciProfile::from_entries("DEFAULT", &complete()).unwrap();
        assert_eq!(profile.user.as_str(), "ocid1.user.oc1..alice");
        assert_eq!(profile.region, "us-ashburn-1");
        assert_eq!(profile.key_file, PathBuf::from("/keys/oci.pem"));
        assert!(profile.pass_phrase.is_none());
    }

    #[test]
    fn each_required_key_is_checked() {
        for key in REQUIRED_KEYS {
            let mut e = complete();
            e.remove(key);
            let err = OciProfile::from_entries("P", &e).unwrap_err();
            assert!(
                matches!(&err, ConfigError::MissingKey { key: k, .. } if k == key),
                "expected MissingKey({key}), got {err:?}"
            );
        }
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut e = complete();
        e.insert("region".into(), String::new());
        assert!(matches!(
            OciProfile::from_entries("P", &e),
            Err(ConfigError::MissingKey { .. })
        ));
    }

    #[test]
    fn invalid_tenancy_rejected() {
        let mut e = complete();
        e.insert("tenancy".into(), "acme".into());
        assert!(matches!(
            OciProfile::from_entries("P", &e),
            Err(ConfigError::InvalidValue { key, .. }) if key == "tenancy"
        ));
    }

    #[test]
    fn invalid_region_rejected() {
        let mut e = complete();
        e.insert("region".into(), "us ashburn/1".into());
        assert!(matches!(
            OciProfile::from_entries("P", &e),
            Err(ConfigError::InvalidValue { key, .. }) if key == "region"
        ));
    }

    #[test]
    fn key_id_format() {
        let profile = OciProfile::from_entries("DEFAULT", &complete()).unwrap();
        assert_eq!(
            profile.key_id(),
            "ocid1.tenancy.oc1..acme/ocid1.user.oc1..alice/20:3b:97:13"
        );
    }

    #[test]
    fn debug_redacts_pass_phrase() {
        let mut e = complete();
        e.insert("pass_phrase".into(), "hunter2".into());
        let profile = OciProfile::from_entries("DEFAULT", &e).unwrap();
        let debug = format!("{:?}", profile);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("has_pass_phrase: true"));
    }
}
