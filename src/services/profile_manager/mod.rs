//! Profile 管理模块
//!
//! 设计原则：email 即身份
//! - profiles.json: 按插入顺序保存 `email -> Profile`，`activated` 至多一个为 true
//! - `<ssh_dir>/<email>/`: 每个 profile 的 Ed25519 密钥对
//! - 激活时把密钥复制到 `<ssh_dir>/` 并写 Git 全局 user.name / user.email

mod manager;
mod native_config;
mod types;


pub use manager::ProfileManager;
pub use types::{
    ActiveState, CheckReport, Drift, KeyPaths, Profile, ProfileDescriptor, ProfilesStore,
    PRIVATE_KEY_FILE, PUBLIC_KEY_FILE,
};
