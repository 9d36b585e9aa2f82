//! Configuration for sparkless-io sessions.
//!
//! Use [`IoConfig`] to configure a session from code, JSON, or environment
//! variables, then build a session from it.

use serde::{Deserialize, Serialize};

use crate::storage::ObjectStoreConfig;

/// Records sampled for JSON schema inference unless overridden.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 100;

pub const ENV_ACCESS_KEY: &str = "SPARKLESS_IO_S3_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "SPARKLESS_IO_S3_SECRET_KEY";
pub const ENV_REGION: &str = "SPARKLESS_IO_S3_REGION";
pub const ENV_ENDPOINT: &str = "SPARKLESS_IO_S3_ENDPOINT";
pub const ENV_INFER_SCHEMA_LENGTH: &str = "SPARKLESS_IO_INFER_SCHEMA_LENGTH";

/// Session-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoConfig {
    /// Credentials bound to every reader and writer handed out by the session.
    #[serde(default)]
    pub object_store: Option<ObjectStoreConfig>,
    /// Default number of JSON records used for schema inference.
    #[serde(default = "default_infer_schema_length")]
    pub infer_schema_length: usize,
}

fn default_infer_schema_length() -> usize {
    DEFAULT_INFER_SCHEMA_LENGTH
}

impl Default for IoConfig {
    fn default() -> Self {
        IoConfig {
            object_store: None,
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

impl IoConfig {
    /// Build from process environment.
    ///
    /// `SPARKLESS_IO_S3_*` variables win over the standard `AWS_*` ones.
    /// An object-store config is produced only when both keys are set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (tests, embedders).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let first = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| lookup(k).filter(|v| !v.trim().is_empty()))
        };
        let access_key = first(&[ENV_ACCESS_KEY, "AWS_ACCESS_KEY_ID"]);
        let secret_key = first(&[ENV_SECRET_KEY, "AWS_SECRET_ACCESS_KEY"]);
        let region = first(&[ENV_REGION, "AWS_REGION", "AWS_DEFAULT_REGION"]);
        let endpoint = first(&[ENV_ENDPOINT]);

        let object_store = match (access_key, secret_key) {
            (Some(ak), Some(sk)) => {
                let mut cfg = match &region {
                    Some(r) => ObjectStoreConfig::for_region(ak, sk, r.clone()),
                    None => ObjectStoreConfig::new(ak, sk, "s3.amazonaws.com"),
                };
                if let Some(ep) = endpoint {
                    cfg.endpoint = ep;
                }
                Some(cfg)
            }
            _ => None,
        };

        let infer_schema_length = first(&[ENV_INFER_SCHEMA_LENGTH])
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_INFER_SCHEMA_LENGTH);

        IoConfig {
            object_store,
            infer_schema_length,
        }
    }

    /// Parse from a JSON document.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = IoConfig::from_lookup(|_| None);
        assert_eq!(cfg, IoConfig::default());
    }

    #[test]
    fn aws_variables_build_regional_config() {
        let cfg = IoConfig::from_lookup(lookup(&[
            ("AWS_ACCESS_KEY_ID", "AK"),
            ("AWS_SECRET_ACCESS_KEY", "SK"),
            ("AWS_DEFAULT_REGION", "eu-west-1"),
        ]));
        let store = cfg.object_store.expect("object store config");
        assert_eq!(store.access_key, "AK");
        assert_eq!(store.endpoint, "s3.eu-west-1.amazonaws.com");
    }

    #[test]
    fn prefixed_variables_win_and_endpoint_overrides() {
        let cfg = IoConfig::from_lookup(lookup(&[
            ("AWS_ACCESS_KEY_ID", "aws"),
            (ENV_ACCESS_KEY, "mine"),
            (ENV_SECRET_KEY, "SK"),
            (ENV_ENDPOINT, "http://localhost:9000"),
            (ENV_INFER_SCHEMA_LENGTH, "25"),
        ]));
        let store = cfg.object_store.expect("object store config");
        assert_eq!(store.access_key, "mine");
        assert_eq!(store.endpoint, "http://localhost:9000");
        assert_eq!(cfg.infer_schema_length, 25);
    }

    #[test]
    fn missing_secret_means_no_object_store() {
        let cfg = IoConfig::from_lookup(lookup(&[("AWS_ACCESS_KEY_ID", "AK")]));
        assert!(cfg.object_store.is_none());
    }

    #[test]
    fn from_json_fills_defaults() {
        let cfg = IoConfig::from_json(
            r#"{"object_store":{"access_key":"AK","secret_key":"SK","endpoint":"s3.amazonaws.com"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.infer_schema_length, DEFAULT_INFER_SCHEMA_LENGTH);
        assert!(cfg.object_store.unwrap().region.is_none());
    }
}
