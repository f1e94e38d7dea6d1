use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("check interval must be greater than zero")]
    ZeroInterval,

    #[error("check timeout must be greater than zero")]
    ZeroTimeout,

    #[error("check command must not be empty")]
    EmptyCommand,

    #[error("check already registered: {0}")]
    DuplicateCheck(String),

    #[error("check not found: {0}")]
    CheckNotFound(String),
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
