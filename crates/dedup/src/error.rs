use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (threshold out of range, empty preference list, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
}
