// 服务层模块
//
// - identity: 外部身份工具（ssh-keygen / git config）
// - profile_manager: profile 存储、激活与系统同步

pub mod identity;
pub mod profile_manager;

pub use identity::{GitCli, GitConfigurator, KeyGenerator, SshKeygen};
pub use profile_manager::ProfileManager;
