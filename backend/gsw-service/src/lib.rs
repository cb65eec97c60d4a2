pub mod cli;
pub mod error;
pub mod exit_codes;
pub mod logger;
pub mod service;
pub mod signals;


pub use error::{Result as ServiceResult, ServiceError};

const LOG_FILE_PREFIX: &str = "gsw";
const LOG_FILE_SUFFIX: &str = "log";
const MAX_LOG_FILES: usize = 7;
