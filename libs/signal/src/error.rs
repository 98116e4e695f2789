use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Fabric(#[from] tether_fabric::Error),

    #[error(transparent)]
    Core(#[from] tether_core::Error),

    #[error("Evaluator error: {0}")]
    Evaluator(String),

    #[error("Registration error: {0}")]
    Registration(String),

    #[error("Channel already has a call in flight")]
    Busy,
}

impl Error {
    pub fn evaluator(msg: impl Into<String>) -> Self {
        Self::Evaluator(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
