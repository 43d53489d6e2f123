// Identity Backend Traits - 外部身份工具接口
//
// 密钥生成与全局 Git 配置都依赖系统上的外部程序，
// ProfileManager 只通过这两个 trait 与其交互

use crate::core::AppResult;
use std::path::Path;

/// Git 全局配置中的用户名键
pub const GIT_USER_NAME: &str = "user.name";
/// Git 全局配置中的邮箱键
pub const GIT_USER_EMAIL: &str = "user.email";

/// SSH 密钥对生成器
pub trait KeyGenerator {
    /// 在 `private_key` 处生成无口令的 Ed25519 密钥对，公钥写入同名 `.pub` 文件，注释为 `email`
    ///
    /// 调用方负责确保父目录存在且目标文件不存在。
    fn generate(&self, email: &str, private_key: &Path) -> AppResult<()>;
}

/// 全局 Git 配置读写
pub trait GitConfigurator {
    /// 设置全局配置项
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// 读取全局配置项，未设置时返回 `None`
    fn get(&self, key: &str) -> AppResult<Option<String>>;
}
