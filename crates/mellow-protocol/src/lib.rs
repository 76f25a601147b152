pub mod error;
pub mod types;

pub use error::{ConfigError, ProviderError, RewriteError};
pub use types::{
    ProviderKind, RewriteRequest, RewriteResponse, Settings, REWRITE_ACTION, STORAGE_KEY_API_KEY,
    STORAGE_KEY_PROVIDER,
};
