//! 核心基础设施层：错误类型与日志系统

pub mod error;
pub mod logger;

pub use error::{AppError, AppResult};
pub use logger::init_logger;
