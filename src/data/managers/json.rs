//! JSON 文件管理器
//!
//! 提供 JSON 文件的整体读写，支持：
//! - 缺失文件的惰性初始化
//! - 原子写入（同目录临时文件 + rename）
//! - 自动创建父目录
//! - Unix 权限设置（0o600）
//! - 读-改-写期间的排他文件锁
//!
//! 读写直接在文件文本与目标类型之间转换，不经过 `serde_json::Value`，
//! 因此对象键的顺序由目标类型自己决定。
//!
//! # 使用示例
//!
//! ```rust
//! use std::path::Path;
//! use crate::data::managers::JsonManager;
//!
//! let manager = JsonManager::new();
//! let path = Path::new("profiles.json");
//! let _lock = manager.lock(path)?;
//! let mut store: ProfilesStore = manager.read_or_init(path, ProfilesStore::new())?;
//! store.insert("a@x.com", Profile::new("A"));
//! manager.write(path, &store)?;
//! ```

use crate::data::{DataError, Result};
use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// JSON 文件管理器（无状态，可随意复制）
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonManager;

impl JsonManager {
    pub fn new() -> Self {
        Self
    }

    /// 读取整个 JSON 文件并反序列化为 `T`
    pub fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        let value = serde_json::from_str(&content)?;
        Ok(value)
    }

    /// 读取 JSON 文件，文件不存在时先写入 `default` 再返回
    pub fn read_or_init<T>(&self, path: &Path, default: T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "文件不存在，写入初始内容");
            self.write(path, &default)?;
            return Ok(default);
        }
        self.read(path)
    }

    /// 原子写入整个 JSON 文件
    ///
    /// 先写入同目录下的临时文件再 rename，读者不会看到写了一半的文档。
    pub fn write<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
        }

        let content = serde_json::to_string_pretty(value)?;
        let tmp_path = temp_path_for(path);
        fs::write(&tmp_path, content).map_err(|e| DataError::io(&tmp_path, e))?;
        set_permissions(&tmp_path)?;

        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(DataError::io(path, e));
        }

        tracing::trace!(path = %path.display(), "JSON 写入完成");
        Ok(())
    }

    /// 获取 `path` 对应锁文件（`<path>.lock`）的排他锁，阻塞直到其他进程释放
    ///
    /// 锁在返回的 guard drop 时释放。
    pub fn lock(&self, path: &Path) -> Result<FileLock> {
        let lock_path = lock_path_for(path);
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| DataError::io(&lock_path, e))?;
        file.lock_exclusive().map_err(|source| DataError::Lock {
            path: lock_path.clone(),
            source,
        })?;

        Ok(FileLock {
            file,
            path: lock_path,
        })
    }
}

/// 排他文件锁 guard
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "释放文件锁失败");
        }
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    path.with_file_name(name)
}

/// 设置文件权限（Unix 平台 0o600）
#[cfg(unix)]
fn set_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| DataError::io(path, e))
}

#[cfg(not(unix))]
fn set_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
