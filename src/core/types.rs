//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Ocid`] - Validated Oracle Cloud identifier
//! - [`Cidr`] - Validated IPv4/IPv6 network block
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so a command that carries them never reaches
//! the cloud with a malformed identifier or route destination.
//!
//! # Examples
//!
//! ```
//! use peer_oracle_vcn::core::types::{Cidr, Ocid};
//!
//! let vcn = Ocid::new("ocid1.vcn.oc1.iad.aaaaaaaexample").unwrap();
//! assert_eq!(vcn.resource_type(), Some("vcn"));
//!
//! let cidr: Cidr = "10.0.0.0/24".parse().unwrap();
//! assert_eq!(cidr.to_string(), "10.0.0.0/24");
//!
//! assert!(Ocid::new("vcn-1234").is_err());
//! assert!("10.0.0.0".parse::<Cidr>().is_err());
//! ```

use std::str::FromStr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid OCID: {0}")]
    InvalidOcid(String),

    #[error("invalid CIDR block: {0}")]
    InvalidCidr(String),
}

/// A validated Oracle Cloud identifier.
///
/// OCIDs look like `ocid1.<resource-type>.<realm>.[region][.future-use].<unique-id>`.
/// Validation is structural only:
/// - Must start with `ocid1.`
/// - Must have at least three dot-separated components after the prefix
/// - Cannot contain whitespace or control characters
///
/// # Example
///
/// ```
/// use peer_oracle_vcn::core::types::Ocid;
///
/// let tenancy = Ocid::new("ocid1.tenancy.oc1..aaaaaaaexample").unwrap();
/// assert_eq!(tenancy.resource_type(), Some("tenancy"));
/// assert_eq!(tenancy.short(8), "aexample");
///
/// assert!(Ocid::new("").is_err());
/// assert!(Ocid::new("ocid1.vcn").is_err());
/// assert!(Ocid::new("ocid1.vcn.oc1.iad.has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ocid(String);

impl Ocid {
    const PREFIX: &'static str = "ocid1.";

    /// Create a new validated OCID.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOcid` if the value is not shaped like an OCID.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        Self::validate(&value)?;
        Ok(Self(value))
    }

    fn validate(value: &str) -> Result<(), TypeError> {
        if value.is_empty() {
            return Err(TypeError::InvalidOcid("OCID cannot be empty".into()));
        }
        if !value.starts_with(Self::PREFIX) {
            return Err(TypeError::InvalidOcid(format!(
                "'{value}' does not start with '{}'",
                Self::PREFIX
            )));
        }
        if value
            .chars()
            .any(|c| c.is_whitespace() || c.is_ascii_control())
        {
            return Err(TypeError::InvalidOcid(format!(
                "'{value}' contains whitespace or control characters"
            )));
        }
        // resource type, realm, region (may be empty), unique id
        let rest = &value[Self::PREFIX.len()..];
        let components: Vec<&str> = rest.split('.').collect();
        if components.len() < 3 || components[0].is_empty() {
            return Err(TypeError::InvalidOcid(format!(
                "'{value}' is missing resource type, realm or unique id"
            )));
        }
        if components.last().is_some_and(|id| id.is_empty()) {
            return Err(TypeError::InvalidOcid(format!(
                "'{value}' has an empty unique id"
            )));
        }
        Ok(())
    }

    /// Get the OCID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The resource type component (`vcn`, `tenancy`, `localpeeringgateway`, ...).
    pub fn resource_type(&self) -> Option<&str> {
        self.0[Self::PREFIX.len()..].split('.').next()
    }

    /// The last `len` characters of the unique id, for display names.
    pub fn short(&self, len: usize) -> &str {
        let unique = self.0.rsplit('.').next().unwrap_or(&self.0);
        let start = unique
            .char_indices()
            .rev()
            .nth(len.saturating_sub(1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        &unique[start..]
    }
}

impl TryFrom<String> for Ocid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl FromStr for Ocid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<Ocid> for String {
    fn from(ocid: Ocid) -> Self {
        ocid.0
    }
}

impl AsRef<str> for Ocid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ocid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated network block used as a route destination.
///
/// Host bits are cleared on construction (`10.0.0.7/24` becomes
/// `10.0.0.0/24`) because OCI rejects route rules whose destination is
/// not a network address.
///
/// # Example
///
/// ```
/// use peer_oracle_vcn::core::types::Cidr;
///
/// let cidr: Cidr = "10.0.0.7/24".parse().unwrap();
/// assert_eq!(cidr.to_string(), "10.0.0.0/24");
///
/// let wide: Cidr = "10.0.0.0/16".parse().unwrap();
/// assert!(wide.overlaps(&cidr));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cidr(IpNet);

impl Cidr {
    /// Parse and normalize a CIDR block.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCidr` if the value is empty or is not
    /// `<address>/<prefix>`.
    pub fn new(value: &str) -> Result<Self, TypeError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TypeError::InvalidCidr("CIDR block cannot be empty".into()));
        }
        let net: IpNet = trimmed
            .parse()
            .map_err(|_| TypeError::InvalidCidr(format!("'{value}' is not <address>/<prefix>")))?;
        Ok(Self(net.trunc()))
    }

    /// Check if two blocks share any address.
    pub fn overlaps(&self, other: &Cidr) -> bool {
        self.0.contains(&other.0.network()) || other.0.contains(&self.0.network())
    }
}

impl FromStr for Cidr {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Cidr {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<Cidr> for String {
    fn from(cidr: Cidr) -> Self {
        cidr.to_string()
    }
}

impl std::fmt::Display for Cidr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
