//! 数据管理器实现
//!
//! - `json`: JSON 文件管理器（原子写入 + 排他锁）

pub mod json;

pub use json::{FileLock, JsonManager};
