//! 基于 `git config --global` 的全局身份读写

use super::identity_trait::GitConfigurator;
use crate::core::AppResult;
use crate::utils::CommandExecutor;

const PROGRAM: &str = "git";

#[derive(Debug, Default)]
pub struct GitCli {
    executor: CommandExecutor,
}

impl GitCli {
    pub fn new() -> Self {
        Self {
            executor: CommandExecutor::new(),
        }
    }
}

impl GitConfigurator for GitCli {
    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.executor
            .run(PROGRAM, ["config", "--global", key, value])
            .into_result(PROGRAM)?;

        tracing::debug!(key, value, "已更新 Git 全局配置");
        Ok(())
    }

    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let result = self
            .executor
            .run(PROGRAM, ["config", "--global", "--get", key]);

        // git config --get 在键不存在时以退出码 1 结束且没有错误输出
        if !result.success && result.exit_code == Some(1) && result.stderr.is_empty() {
            return Ok(None);
        }

        let value = result.into_result(PROGRAM)?;
        Ok(Some(value))
    }
}
