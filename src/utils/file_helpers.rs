//! 文件操作辅助函数
//!
//! 密钥安装、目录清理与校验和计算。

use crate::core::{AppError, AppResult};
use std::fs;
use std::io;
use std::path::Path;

/// 计算文件的 SHA256 哈希值（十六进制字符串）
///
/// 用于比对已安装的密钥与 profile 自己的密钥是否一致。
pub fn file_checksum(path: &Path) -> AppResult<String> {
    use sha2::{Digest, Sha256};

    let content = fs::read(path).map_err(|e| AppError::io(path, e))?;
    let digest = Sha256::digest(&content);
    Ok(format!("{digest:x}"))
}

/// 复制文件并覆盖目标，`private` 为 true 时在 Unix 上把目标权限收紧为 0o600
pub fn install_file(src: &Path, dst: &Path, private: bool) -> AppResult<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
    }
    fs::copy(src, dst).map_err(|e| AppError::io(src, e))?;
    if private {
        restrict_permissions(dst)?;
    }
    Ok(())
}

/// 递归删除目录，忽略所有错误（目录不存在不算错误）
///
/// 返回 false 表示删除失败，调用方可自行记录日志。
pub fn remove_dir_best_effort(path: &Path) -> bool {
    match fs::remove_dir_all(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "删除目录失败，已忽略");
            false
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> AppResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| AppError::io(path, e))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> AppResult<()> {
    Ok(())
}
