//! Profile 管理数据类型定义
//!
//! profiles.json 是一个按插入顺序保存的 `email -> Profile` 对象：
//!
//! ```json
//! {
//!   "a@x.com": { "name": "A", "activated": true, "created_at": "2024-05-01T08:00:00Z" }
//! }
//! ```

use crate::core::{AppError, AppResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// 每个 profile 的密钥文件名
pub const PRIVATE_KEY_FILE: &str = "id_ed25519";
pub const PUBLIC_KEY_FILE: &str = "id_ed25519.pub";

// ==================== Profile ====================

/// 单个 Git 身份，email 作为 profiles.json 中的键
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub activated: bool,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            activated: false,
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }
}

/// 兼容旧文档的时间戳：RFC 3339，或 `2024-05-01 08:00:00.123456+00:00` 这样的空格分隔格式
///
/// 无法解析的值按缺失处理，不让整个 store 加载失败。
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    tracing::debug!(raw, "无法解析的时间戳，按缺失处理");
    None
}

// ==================== profiles.json 结构 ====================

/// profiles.json 顶层结构，保持插入顺序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfilesStore {
    profiles: LinkedHashMap<String, Profile>,
}

impl ProfilesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn contains(&self, email: &str) -> bool {
        self.profiles.contains_key(email)
    }

    pub fn get(&self, email: &str) -> Option<&Profile> {
        self.profiles.get(email)
    }

    pub fn get_mut(&mut self, email: &str) -> Option<&mut Profile> {
        self.profiles.get_mut(email)
    }

    /// 追加新 profile；email 已存在时不做任何修改并返回 false
    pub fn insert(&mut self, email: &str, profile: Profile) -> bool {
        if self.profiles.contains_key(email) {
            return false;
        }
        self.profiles.insert(email.to_string(), profile);
        true
    }

    pub fn remove(&mut self, email: &str) -> Option<Profile> {
        self.profiles.remove(email)
    }

    /// 按插入顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Profile)> {
        self.profiles.iter().map(|(email, p)| (email.as_str(), p))
    }

    /// 当前激活的 profile
    pub fn active(&self) -> Option<(&str, &Profile)> {
        self.iter().find(|(_, p)| p.activated)
    }

    /// 将 `email` 设为唯一激活的 profile（先全部清除再设置目标）
    ///
    /// 目标不存在时不做任何修改并返回 false。
    pub fn set_active(&mut self, email: &str) -> bool {
        if !self.profiles.contains_key(email) {
            return false;
        }
        for (key, profile) in self.profiles.iter_mut() {
            profile.activated = key == email;
        }
        true
    }

    /// 模糊匹配：精确命中优先，否则返回第一个以 `query` 为前缀的 email（插入顺序）
    pub fn resolve(&self, query: &str) -> Option<&str> {
        self.profiles
            .keys()
            .find(|email| email.as_str() == query)
            .or_else(|| self.profiles.keys().find(|email| email.starts_with(query)))
            .map(String::as_str)
    }
}

// ==================== 密钥路径 ====================

/// 一对 Ed25519 密钥文件的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPaths {
    pub dir: PathBuf,
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

impl KeyPaths {
    fn in_dir(dir: PathBuf) -> Self {
        Self {
            private_key: dir.join(PRIVATE_KEY_FILE),
            public_key: dir.join(PUBLIC_KEY_FILE),
            dir,
        }
    }

    /// profile 自己的密钥：`<ssh_dir>/<email>/id_ed25519{,.pub}`
    pub fn for_profile(ssh_dir: &Path, email: &str) -> Self {
        Self::in_dir(ssh_dir.join(email))
    }

    /// 系统默认 SSH 认证读取的位置：`<ssh_dir>/id_ed25519{,.pub}`
    pub fn installed(ssh_dir: &Path) -> Self {
        Self::in_dir(ssh_dir.to_path_buf())
    }

    /// 第一个不存在的密钥文件（先私钥后公钥），都存在时返回 `None`
    pub fn first_missing(&self) -> Option<&Path> {
        [&self.private_key, &self.public_key]
            .into_iter()
            .find(|key| !key.is_file())
            .map(PathBuf::as_path)
    }
}

/// email 会直接作为 `<ssh_dir>` 下的目录名，必须恰好是一个普通路径分量
///
/// `.`、`..`、带分隔符或尾部斜杠的值会让密钥目录落到 `<ssh_dir>` 本身或其他位置。
pub fn validate_email(email: &str) -> AppResult<()> {
    let mut components = Path::new(email).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == OsStr::new(email) => Ok(()),
        _ => Err(AppError::InvalidAction(format!(
            "{email:?} cannot be used as a profile email"
        ))),
    }
}

// ==================== Profile Descriptor（列表展示用）====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDescriptor {
    pub email: String,
    pub name: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileDescriptor {
    pub fn from_profile(email: &str, profile: &Profile) -> Self {
        Self {
            email: email.to_string(),
            name: profile.name.clone(),
            is_active: profile.activated,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }

    /// `Name <email>` 形式的身份串
    pub fn identity(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }
}

/// `show` 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveState {
    /// store 为空
    NoProfiles,
    /// 有 profile，但没有激活任何一个
    NoneActive,
    Active(ProfileDescriptor),
}

// ==================== check 报告 ====================

/// 已记录的激活状态与系统实际状态之间的一处偏差
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    /// 已安装的密钥文件与 profile 的不一致（或缺失）
    InstalledKey { path: PathBuf },
    /// Git 全局配置与 profile 不一致
    GitConfig {
        key: String,
        expected: String,
        actual: Option<String>,
    },
}

impl std::fmt::Display for Drift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Drift::InstalledKey { path } => {
                write!(f, "installed key {} does not match the profile", path.display())
            }
            Drift::GitConfig {
                key,
                expected,
                actual: Some(actual),
            } => write!(f, "git {key} is {actual:?}, expected {expected:?}"),
            Drift::GitConfig {
                key,
                expected,
                actual: None,
            } => write!(f, "git {key} is unset, expected {expected:?}"),
        }
    }
}

/// `check` 的结果
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    /// 记录中的激活 profile，`None` 表示没有激活任何 profile
    pub active: Option<ProfileDescriptor>,
    pub drifts: Vec<Drift>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.drifts.is_empty()
    }
}
