//! Configuration for sparkless-io sessions.
//!
//! Use [`IoConfig`] to configure a session from code, JSON or environment variables,
//! then create a session with [`IoSession::from_config`](crate::IoSession::from_config).

pub use sparkless_io_core::IoConfig;
pub use sparkless_io_core::ObjectStoreConfig;
pub use sparkless_io_core::config::{
    DEFAULT_INFER_SCHEMA_LENGTH, ENV_ACCESS_KEY, ENV_ENDPOINT, ENV_INFER_SCHEMA_LENGTH, ENV_REGION,
    ENV_SECRET_KEY,
};
