use thiserror::Error;

use crate::math::integration::integrationerror::IntegrationError;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("cannot read configuration: {0}")]
    IOError(#[from] std::io::Error),

    #[error("cannot parse configuration: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Integration(#[from] IntegrationError)
}
