//! 业务错误类型定义
//!
//! Profile 管理的所有失败都归入 `AppError`，CLI 只打印 `Display` 文案。

use crate::data::DataError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Profile {0} already exists")]
    AlreadyExists(String),

    #[error("Profile {0} not found")]
    NotFound(String),

    #[error("Profile {0} is currently activated")]
    CurrentlyActivated(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// 激活前发现密钥对缺失
    #[error("SSH key not found: {}", .0.display())]
    KeyMissing(PathBuf),

    /// 外部命令启动失败或返回非零退出码
    #[error("`{program}` failed{}: {stderr}", code.map(|c| format!(" (exit code {c})")).unwrap_or_default())]
    CommandFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Data(#[from] DataError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
