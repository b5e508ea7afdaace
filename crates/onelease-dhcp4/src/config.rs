//! Hook configuration
//!
//! The host hands the hook a parameters object when the library is loaded:
//!
//! ```json
//! "parameters": {
//!     "enabled": true,
//!     "byte-prefix": "02:00",
//!     "subnets": ["10.20.0.0/16"],
//!     "logger-name": "onelease-dhcp4",
//!     "debug": false,
//!     "debug-logfile": "/var/log/onelease-dhcp4-debug.log"
//! }
//! ```
//!
//! Every key is optional. The parameters are validated once into an
//! immutable [`OneleaseConfig`]; a bad value fails the load and the hook
//! never sees a transaction.

use crate::error::{OneleaseError, Result};
use crate::hwaddr::BytePrefix;
use crate::subnet::{SubnetPrefix, SubnetSet};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default `logger-name`
pub const DEFAULT_LOGGER_NAME: &str = "onelease-dhcp4";

/// Default `debug-logfile`
pub const DEFAULT_DEBUG_LOGFILE: &str = "/var/log/onelease-dhcp4-debug.log";

/// Raw hook parameters as found in the host configuration
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HookParameters {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub byte_prefix: Option<String>,
    #[serde(default)]
    pub subnets: Option<Vec<String>>,
    #[serde(default)]
    pub logger_name: Option<String>,
    #[serde(default)]
    pub debug: Option<bool>,
    #[serde(default)]
    pub debug_logfile: Option<PathBuf>,
}

/// Validated hook configuration, shared read-only by every transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneleaseConfig {
    /// Whether lease overriding is active
    pub enabled: bool,

    /// Hardware-address gate; empty accepts every client
    pub byte_prefix: BytePrefix,

    /// Allowed candidate networks; empty means no restriction
    pub subnets: SubnetSet,

    /// Name attached to every log event from the hook
    pub logger_name: String,

    /// Write observability events to [`Self::debug_logfile`]
    pub debug: bool,

    /// Destination of the debug log
    pub debug_logfile: PathBuf,
}

impl Default for OneleaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            byte_prefix: BytePrefix::any(),
            subnets: SubnetSet::default(),
            logger_name: DEFAULT_LOGGER_NAME.to_string(),
            debug: false,
            debug_logfile: PathBuf::from(DEFAULT_DEBUG_LOGFILE),
        }
    }
}

impl OneleaseConfig {
    /// Validate raw parameters, filling in defaults for absent keys
    pub fn from_parameters(params: HookParameters) -> Result<Self> {
        let defaults = Self::default();

        let byte_prefix = match params.byte_prefix {
            Some(text) => text.parse()?,
            None => defaults.byte_prefix,
        };

        let subnets = match params.subnets {
            Some(entries) => SubnetSet::parse(&entries)?,
            None => defaults.subnets,
        };

        Ok(Self {
            enabled: params.enabled.unwrap_or(defaults.enabled),
            byte_prefix,
            subnets,
            logger_name: params.logger_name.unwrap_or(defaults.logger_name),
            debug: params.debug.unwrap_or(defaults.debug),
            debug_logfile: params.debug_logfile.unwrap_or(defaults.debug_logfile),
        })
    }

    /// Load from an already parsed parameters object
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Self::from_parameters(serde_json::from_value(value)?)
    }

    /// Load from parameters JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_parameters(serde_json::from_str(json)?)
    }

    /// Load from a parameters JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| OneleaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Enable or disable lease overriding
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the hardware-address gate
    pub fn with_byte_prefix(mut self, prefix: BytePrefix) -> Self {
        self.byte_prefix = prefix;
        self
    }

    /// Add a subnet restriction
    pub fn with_subnet(mut self, prefix: SubnetPrefix) -> Self {
        let mut prefixes: Vec<_> = self.subnets.iter().copied().collect();
        prefixes.push(prefix);
        self.subnets = SubnetSet::new(prefixes);
        self
    }

    /// Set the logger name
    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    /// Turn on the debug log at `path`
    pub fn with_debug_logfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug = true;
        self.debug_logfile = path.into();
        self
    }

    /// Whether the receive and send callouts have anything to do
    ///
    /// They still run while overriding is disabled if debugging is on, so
    /// the debug log keeps showing what the hook would have derived.
    pub fn observes(&self) -> bool {
        self.enabled || self.debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = OneleaseConfig::from_json_str("{}").unwrap();

        assert_eq!(config, OneleaseConfig::default());
        assert!(config.enabled);
        assert!(config.byte_prefix.is_empty());
        assert!(config.subnets.is_empty());
        assert_eq!(config.logger_name, "onelease-dhcp4");
        assert!(!config.debug);
        assert_eq!(
            config.debug_logfile,
            PathBuf::from("/var/log/onelease-dhcp4-debug.log")
        );
    }

    #[test]
    fn test_full_parameters() {
        let config = OneleaseConfig::from_json_str(
            r#"{
                "enabled": false,
                "byte-prefix": "02:00",
                "subnets": ["10.20.0.0/16", "192.168.0.0/24"],
                "logger-name": "lab",
                "debug": true,
                "debug-logfile": "/tmp/onelease.log"
            }"#,
        )
        .unwrap();

        assert!(!config.enabled);
        assert_eq!(config.byte_prefix.as_bytes(), &[0x02, 0x00]);
        assert_eq!(config.subnets.to_string(), "10.20.0.0/16, 192.168.0.0/24");
        assert_eq!(config.logger_name, "lab");
        assert!(config.debug);
        assert_eq!(config.debug_logfile, PathBuf::from("/tmp/onelease.log"));
        assert!(config.observes());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config =
            OneleaseConfig::from_json_str(r#"{"byte-prefix": "", "lease-database": {}}"#);
        assert!(config.is_ok());
    }

    #[test]
    fn test_three_byte_prefix_rejected() {
        let err = OneleaseConfig::from_json_str(r#"{"byte-prefix": "02:00:01"}"#).unwrap_err();
        assert!(matches!(
            err,
            OneleaseError::InvalidBytePrefix { len: 3, .. }
        ));
    }

    #[test]
    fn test_bad_subnet_rejected() {
        let err = OneleaseConfig::from_json_str(r#"{"subnets": ["10.0.0.0/0"]}"#).unwrap_err();
        assert!(matches!(err, OneleaseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_wrong_types_rejected() {
        for json in [
            r#"{"enabled": "yes"}"#,
            r#"{"byte-prefix": 2}"#,
            r#"{"subnets": "10.0.0.0/8"}"#,
            r#"{"debug": 1}"#,
            r#"{"logger-name": []}"#,
        ] {
            assert!(
                matches!(
                    OneleaseConfig::from_json_str(json),
                    Err(OneleaseError::Parameters(_))
                ),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_value() {
        let value = serde_json::json!({ "byte-prefix": "0x0200" });
        let config = OneleaseConfig::from_value(value).unwrap();
        assert_eq!(config.byte_prefix.as_bytes(), &[0x02, 0x00]);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"subnets": ["10.20.30.0/24"]}}"#).unwrap();

        let config = OneleaseConfig::from_file(file.path()).unwrap();
        assert_eq!(config.subnets.len(), 1);

        let err = OneleaseConfig::from_file("/nonexistent/onelease.json").unwrap_err();
        assert!(matches!(err, OneleaseError::Io { .. }));
    }

    #[test]
    fn test_builder() {
        let config = OneleaseConfig::default()
            .with_enabled(false)
            .with_byte_prefix("02:00".parse().unwrap())
            .with_subnet("10.20.0.0/16".parse().unwrap())
            .with_subnet("10.30.0.0/16".parse().unwrap())
            .with_logger_name("builder")
            .with_debug_logfile("/tmp/debug.log");

        assert!(!config.enabled);
        assert_eq!(config.subnets.len(), 2);
        assert_eq!(config.logger_name, "builder");
        assert!(config.debug);
        assert!(config.observes());
        assert!(!OneleaseConfig::default().with_enabled(false).observes());
    }
}
