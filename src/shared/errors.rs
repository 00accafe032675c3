//! Error handling for the application

use thiserror::Error;

/// Accounting errors raised by the pool, farm and registry layers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmmError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid fee {0}: must be below 1000 (tenths of a percent)")]
    InvalidFee(u32),

    #[error("Pool tokens must differ: {0}")]
    IdenticalTokens(String),

    #[error("Invalid farm schedule: start block {start} must precede end block {end}")]
    InvalidFarmSchedule { start: u64, end: u64 },

    #[error("Invalid rune id {0:?}: must be non-empty and must not contain '-'")]
    InvalidRuneId(String),

    #[error("Pool not found: {0}")]
    PoolNotFound(String),

    #[error("Farm not found: {0}")]
    FarmNotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Transaction expired: deadline {deadline} is before {now}")]
    DeadlineExpired { deadline: i64, now: i64 },

    #[error("Insufficient liquidity: {0}")]
    InsufficientLiquidity(String),

    #[error("Insufficient stake: requested {requested}, staked {staked}")]
    InsufficientStake { requested: String, staked: String },

    #[error("Slippage exceeded: got {actual}, minimum {minimum}")]
    SlippageExceeded { actual: String, minimum: String },

    #[error("Deposit ratio out of tolerance: expected {expected}, got {actual}")]
    RatioOutOfTolerance { expected: String, actual: String },
}

impl AmmError {
    /// Stable numeric code reported at the HTTP boundary
    pub fn code(&self) -> u16 {
        match self {
            AmmError::InvalidAmount(_) => 1001,
            AmmError::InvalidFee(_) => 1002,
            AmmError::IdenticalTokens(_) => 1003,
            AmmError::InvalidFarmSchedule { .. } => 1004,
            AmmError::InvalidRuneId(_) => 1005,
            AmmError::PoolNotFound(_) => 2001,
            AmmError::FarmNotFound(_) => 2002,
            AmmError::AlreadyExists(_) => 2003,
            AmmError::DeadlineExpired { .. } => 3001,
            AmmError::InsufficientLiquidity(_) => 4001,
            AmmError::InsufficientStake { .. } => 4002,
            AmmError::SlippageExceeded { .. } => 4003,
            AmmError::RatioOutOfTolerance { .. } => 4004,
        }
    }
}

/// Execution-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Broadcaster unavailable")]
    Unavailable,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ExecutionError {
    pub fn code(&self) -> u16 {
        match self {
            ExecutionError::Rejected(_) => 5001,
            ExecutionError::Unavailable => 5002,
            ExecutionError::NetworkError(_) => 5003,
        }
    }
}

/// Errors surfaced by the application service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Amm(#[from] AmmError),

    #[error("Submission failed, state rolled back: {0}")]
    Execution(#[from] ExecutionError),
}

impl ServiceError {
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Amm(err) => err.code(),
            ServiceError::Execution(err) => err.code(),
        }
    }
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::Unknown(err.to_string())
    }
}
