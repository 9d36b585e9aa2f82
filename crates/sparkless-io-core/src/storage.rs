//! Object-store credentials, threaded explicitly into engine calls.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// URL schemes routed to object storage.
pub const OBJECT_STORE_SCHEMES: [&str; 3] = ["s3://", "s3a://", "s3n://"];

/// True when `locator` addresses object storage rather than the local filesystem.
pub fn is_object_store_locator(locator: &str) -> bool {
    let lower = locator.trim_start().to_ascii_lowercase();
    OBJECT_STORE_SCHEMES
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// Credentials and endpoint for S3-compatible object storage.
///
/// The secret is accepted on deserialization but never serialized.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    pub access_key: String,
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl ObjectStoreConfig {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        ObjectStoreConfig {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            endpoint: endpoint.into(),
            region: None,
        }
    }

    /// AWS config for `region`, with the regional endpoint `s3.<region>.amazonaws.com`.
    pub fn for_region(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        let region = region.into();
        ObjectStoreConfig {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            endpoint: format!("s3.{region}.amazonaws.com"),
            region: Some(region),
        }
    }

    /// Endpoint as a URL; a bare host gets `https://`.
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else {
            format!("https://{}", self.endpoint)
        }
    }

    /// Hadoop S3A configuration keys for engines configured that way.
    pub fn to_hadoop_options(&self) -> HashMap<String, String> {
        HashMap::from([
            ("fs.s3a.access.key".to_string(), self.access_key.clone()),
            ("fs.s3a.secret.key".to_string(), self.secret_key.clone()),
            ("fs.s3a.endpoint".to_string(), self.endpoint.clone()),
        ])
    }
}

impl fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStoreConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_store_schemes() {
        assert!(is_object_store_locator("s3://bucket/data/a.json"));
        assert!(is_object_store_locator("S3A://bucket/a"));
        assert!(is_object_store_locator("s3n://bucket/a"));
        assert!(!is_object_store_locator("/data/a.json"));
        assert!(!is_object_store_locator("file:///data/a.json"));
    }

    #[test]
    fn region_endpoint_and_hadoop_keys() {
        let cfg = ObjectStoreConfig::for_region("AK", "SK", "ap-northeast-1");
        assert_eq!(cfg.endpoint, "s3.ap-northeast-1.amazonaws.com");
        assert_eq!(cfg.endpoint_url(), "https://s3.ap-northeast-1.amazonaws.com");
        assert_eq!(cfg.region.as_deref(), Some("ap-northeast-1"));

        let hadoop = cfg.to_hadoop_options();
        assert_eq!(hadoop["fs.s3a.access.key"], "AK");
        assert_eq!(hadoop["fs.s3a.secret.key"], "SK");
        assert_eq!(hadoop["fs.s3a.endpoint"], "s3.ap-northeast-1.amazonaws.com");
    }

    #[test]
    fn explicit_endpoint_url_is_kept() {
        let cfg = ObjectStoreConfig::new("AK", "SK", "http://localhost:9000");
        assert_eq!(cfg.endpoint_url(), "http://localhost:9000");
    }

    #[test]
    fn debug_redacts_secret() {
        let cfg = ObjectStoreConfig::new("AK", "very-secret", "s3.amazonaws.com");
        let shown = format!("{cfg:?}");
        assert!(shown.contains("AK"));
        assert!(!shown.contains("very-secret"));
    }

    #[test]
    fn serialization_omits_secret() {
        let cfg = ObjectStoreConfig::for_region("AK", "very-secret", "us-east-1");
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"access_key\":\"AK\""));
        assert!(!json.contains("very-secret"));
        assert!(!json.contains("secret_key"));

        let back: ObjectStoreConfig = serde_json::from_str(
            r#"{"access_key":"AK","secret_key":"SK","endpoint":"s3.amazonaws.com"}"#,
        )
        .unwrap();
        assert_eq!(back.secret_key, "SK");
    }
}
