//! 外部身份工具：SSH 密钥生成与 Git 全局配置

mod git_cli;
mod identity_trait;
mod ssh_keygen;

pub use git_cli::GitCli;
pub use identity_trait::{GitConfigurator, KeyGenerator, GIT_USER_EMAIL, GIT_USER_NAME};
pub use ssh_keygen::SshKeygen;
