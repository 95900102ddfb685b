//! # Version Management Module
//!
//! Centralized version management for the Model Context Protocol (MCP).
//!
//! This module is the single source of truth for which wire-level protocol
//! version strings this server accepts, and for negotiating a session's
//! dialect from the version string a client sends in `initialize`. Version
//! strings that are not in [`SUPPORTED_VERSIONS`] are rejected outright; the
//! server never silently substitutes a different version than the one it
//! advertises back to the client.

use serde::{Deserialize, Serialize};

/// All protocol version strings this server understands, newest first.
///
/// `2025-06-18` and `2025-03-26` both negotiate the [`Dialect::V2025`] wire
/// shape; `2024-11-05` negotiates [`Dialect::V2024`].
pub const SUPPORTED_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// The response-shaping dialect associated with a negotiated protocol version.
///
/// Exactly two shapes exist on the wire today; everything from tool-call
/// result envelopes to resource-read payloads branches on this value rather
/// than on the raw version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    /// `2024-11-05` wire shape.
    V2024,
    /// `2025-03-26` / `2025-06-18` wire shape.
    V2025,
}

impl Dialect {
    /// Map a supported version string to its dialect. Returns `None` for any
    /// string not present in [`SUPPORTED_VERSIONS`].
    pub fn for_version(version: &str) -> Option<Self> {
        match version {
            "2024-11-05" => Some(Dialect::V2024),
            "2025-03-26" | "2025-06-18" => Some(Dialect::V2025),
            _ => None,
        }
    }
}

/// Negotiate a session's protocol version from the client's requested string.
///
/// Unlike a best-effort negotiator that falls back to the latest supported
/// version, this rejects any string outside [`SUPPORTED_VERSIONS`] with
/// [`VersionNegotiationError::UnsupportedVersion`]. On success, the exact
/// requested string is echoed back unchanged, since the caller is expected to
/// reuse it verbatim as the `protocolVersion` field of the initialize
/// response.
pub fn negotiate_version(requested_version: &str) -> Result<String, VersionNegotiationError> {
    if SUPPORTED_VERSIONS.contains(&requested_version) {
        Ok(requested_version.to_string())
    } else {
        Err(VersionNegotiationError::UnsupportedVersion(
            requested_version.to_string(),
        ))
    }
}

/// MCP Protocol Version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProtocolVersion {
    /// Year component (e.g., 2025)
    pub year: u16,
    /// Month component (e.g., 6)
    pub month: u8,
    /// Day component (e.g., 18)
    pub day: u8,
}

impl ProtocolVersion {
    /// Create a new protocol version
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Parse a version string in the format "YYYY-MM-DD"
    pub fn parse(version_str: &str) -> Result<Self, VersionParseError> {
        let parts: Vec<&str> = version_str.split('-').collect();
        if parts.len() != 3 {
            return Err(VersionParseError::InvalidFormat);
        }

        let year = parts[0]
            .parse::<u16>()
            .map_err(|_| VersionParseError::InvalidYear)?;
        let month = parts[1]
            .parse::<u8>()
            .map_err(|_| VersionParseError::InvalidMonth)?;
        let day = parts[2]
            .parse::<u8>()
            .map_err(|_| VersionParseError::InvalidDay)?;

        // Validate date components
        if month == 0 || month > 12 {
            return Err(VersionParseError::InvalidMonth);
        }
        if day == 0 || day > 31 {
            return Err(VersionParseError::InvalidDay);
        }

        Ok(Self { year, month, day })
    }

    /// Convert to string representation
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// Check if this version is compatible with another version
    pub fn is_compatible_with(&self, other: &ProtocolVersion) -> bool {
        // We only support exact matches; there is no semantic versioning
        // skew tolerance in this protocol.
        self == other
    }

    /// Get the latest supported version
    pub fn latest() -> Self {
        Self::new(2025, 6, 18)
    }

    /// Get all supported versions (ordered from oldest to newest)
    pub fn supported_versions() -> Vec<Self> {
        vec![
            Self::new(2024, 11, 5),
            Self::new(2025, 3, 26),
            Self::new(2025, 6, 18),
        ]
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string())
    }
}

impl TryFrom<&str> for ProtocolVersion {
    type Error = VersionParseError;

    fn try_from(version_str: &str) -> Result<Self, Self::Error> {
        Self::parse(version_str)
    }
}

/// Version parse error
#[derive(Debug, thiserror::Error)]
pub enum VersionParseError {
    #[error("Invalid version format, expected YYYY-MM-DD")]
    InvalidFormat,
    #[error("Invalid year component")]
    InvalidYear,
    #[error("Invalid month component")]
    InvalidMonth,
    #[error("Invalid day component")]
    InvalidDay,
}

/// Version negotiator for protocol compatibility.
///
/// Kept for callers that want a `ProtocolVersion`-typed result rather than
/// the raw-string [`negotiate_version`] function; semantics are identical
/// (reject, never substitute).
pub struct VersionNegotiator {
    supported_versions: Vec<ProtocolVersion>,
}

impl Default for VersionNegotiator {
    fn default() -> Self {
        Self::new(ProtocolVersion::supported_versions())
    }
}

impl VersionNegotiator {
    /// Create a new version negotiator with supported versions
    pub fn new(supported_versions: Vec<ProtocolVersion>) -> Self {
        Self { supported_versions }
    }

    /// Negotiate protocol version with client. Returns an error rather than
    /// falling back to the latest version when the requested version is not
    /// one this negotiator was built with.
    pub fn negotiate(
        &self,
        requested_version: &str,
    ) -> Result<ProtocolVersion, VersionNegotiationError> {
        let requested = ProtocolVersion::parse(requested_version)
            .map_err(VersionNegotiationError::ParseError)?;

        if self.supported_versions.contains(&requested) {
            return Ok(requested);
        }

        Err(VersionNegotiationError::UnsupportedVersion(
            requested_version.to_string(),
        ))
    }

    /// Get all supported versions
    pub fn supported_versions(&self) -> &[ProtocolVersion] {
        &self.supported_versions
    }

    /// Check if a version is supported
    pub fn supports(&self, version: &ProtocolVersion) -> bool {
        self.supported_versions.contains(version)
    }

    /// Get the latest supported version
    pub fn latest(&self) -> Option<&ProtocolVersion> {
        self.supported_versions.last()
    }
}

/// Version negotiation error
#[derive(Debug, thiserror::Error)]
pub enum VersionNegotiationError {
    #[error("Failed to parse version: {0}")]
    ParseError(#[from] VersionParseError),
    #[error("No supported protocol versions available")]
    NoSupportedVersions,
    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(String),
}

/// Check whether a feature gated by protocol version is available for the
/// given version string. Unrecognized versions support nothing.
pub fn version_supports_feature(version: &str, feature: &str) -> bool {
    match (Dialect::for_version(version), feature) {
        (Some(Dialect::V2025), "resource_subscriptions") => true,
        (Some(Dialect::V2025), "progress_tracking") => true,
        (Some(Dialect::V2025), "authorization") => true,
        (Some(Dialect::V2025), "completion") => true,
        _ => false,
    }
}

/// Constants for commonly used versions
pub mod constants {
    use super::ProtocolVersion;

    /// Current MCP protocol version (2025-06-18)
    pub const CURRENT_VERSION: &str = "2025-06-18";

    /// Previous MCP protocol version (2024-11-05)
    pub const PREVIOUS_VERSION: &str = "2024-11-05";

    /// Current protocol version as ProtocolVersion
    pub fn current() -> ProtocolVersion {
        ProtocolVersion::new(2025, 6, 18)
    }

    /// Previous protocol version as ProtocolVersion
    pub fn previous() -> ProtocolVersion {
        ProtocolVersion::new(2024, 11, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        let version = ProtocolVersion::parse("2025-06-18").unwrap();
        assert_eq!(version.year, 2025);
        assert_eq!(version.month, 6);
        assert_eq!(version.day, 18);
        assert_eq!(version.to_string(), "2025-06-18");
    }

    #[test]
    fn test_version_parsing_invalid() {
        assert!(ProtocolVersion::parse("invalid").is_err());
        assert!(ProtocolVersion::parse("2025-13-01").is_err()); // Invalid month
        assert!(ProtocolVersion::parse("2025-06-32").is_err()); // Invalid day
    }

    #[test]
    fn test_version_comparison() {
        let v1 = ProtocolVersion::new(2025, 6, 18);
        let v2 = ProtocolVersion::new(2024, 11, 5);

        assert!(v1 > v2);
        assert!(v2 < v1);
        assert_eq!(v1, v1);
    }

    #[test]
    fn test_version_negotiation_exact_match() {
        let negotiator = VersionNegotiator::default();

        let negotiated = negotiator.negotiate("2025-06-18").unwrap();
        assert_eq!(negotiated, ProtocolVersion::new(2025, 6, 18));

        let negotiated = negotiator.negotiate("2024-11-05").unwrap();
        assert_eq!(negotiated, ProtocolVersion::new(2024, 11, 5));
    }

    #[test]
    fn test_version_negotiation_rejects_unsupported() {
        let negotiator = VersionNegotiator::default();

        let err = negotiator.negotiate("2026-01-01").unwrap_err();
        assert!(matches!(err, VersionNegotiationError::UnsupportedVersion(_)));
    }

    #[test]
    fn test_negotiate_version_free_fn_echoes_requested_string() {
        assert_eq!(negotiate_version("2025-03-26").unwrap(), "2025-03-26");
        assert_eq!(negotiate_version("2024-11-05").unwrap(), "2024-11-05");
    }

    #[test]
    fn test_negotiate_version_free_fn_rejects_unknown() {
        let err = negotiate_version("1999-12-31").unwrap_err();
        assert!(matches!(err, VersionNegotiationError::UnsupportedVersion(v) if v == "1999-12-31"));
    }

    #[test]
    fn test_dialect_for_version() {
        assert_eq!(Dialect::for_version("2024-11-05"), Some(Dialect::V2024));
        assert_eq!(Dialect::for_version("2025-03-26"), Some(Dialect::V2025));
        assert_eq!(Dialect::for_version("2025-06-18"), Some(Dialect::V2025));
        assert_eq!(Dialect::for_version("bogus"), None);
    }

    #[test]
    fn test_version_supports_feature() {
        assert!(version_supports_feature("2025-06-18", "resource_subscriptions"));
        assert!(!version_supports_feature("2024-11-05", "resource_subscriptions"));
        assert!(version_supports_feature("2025-06-18", "progress_tracking"));
        assert!(!version_supports_feature("2024-11-05", "progress_tracking"));
    }

    #[test]
    fn test_version_constants() {
        assert_eq!(constants::CURRENT_VERSION, "2025-06-18");
        assert_eq!(constants::PREVIOUS_VERSION, "2024-11-05");
        assert_eq!(constants::current(), ProtocolVersion::new(2025, 6, 18));
        assert_eq!(constants::previous(), ProtocolVersion::new(2024, 11, 5));
    }

    #[test]
    fn test_version_display() {
        let version = ProtocolVersion::new(2025, 6, 18);
        assert_eq!(version.to_string(), "2025-06-18");
        assert_eq!(format!("{}", version), "2025-06-18");
    }

    #[test]
    fn test_version_try_from_string() {
        let version = ProtocolVersion::try_from("2025-06-18").unwrap();
        assert_eq!(version, ProtocolVersion::new(2025, 6, 18));

        assert!(ProtocolVersion::try_from("invalid").is_err());
    }
}
