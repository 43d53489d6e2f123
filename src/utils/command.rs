use crate::core::{AppError, AppResult};
use std::ffi::OsStr;
use std::io;
use std::process::{Command, Output, Stdio};

/// 命令执行结果
#[derive(Debug)]
pub struct CommandResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CommandResult {
    pub fn from_output(output: Output) -> Self {
        CommandResult {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            exit_code: output.status.code(),
        }
    }

    pub fn from_error(error: io::Error) -> Self {
        CommandResult {
            success: false,
            stdout: String::new(),
            stderr: error.to_string(),
            exit_code: None,
        }
    }

    /// 成功时返回 stdout，失败时转换为 `AppError::CommandFailed`
    pub fn into_result(self, program: &str) -> AppResult<String> {
        if self.success {
            Ok(self.stdout)
        } else {
            Err(AppError::CommandFailed {
                program: program.to_string(),
                code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }
}

/// 命令执行器
///
/// 参数按 argv 逐个传递，不经过 shell，邮箱/用户名中的特殊字符无需转义。
/// stdin 接 /dev/null，外部工具不会因等待交互而挂起。
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn new() -> Self {
        CommandExecutor
    }

    /// 执行命令并等待其退出
    pub fn run<I, S>(&self, program: &str, args: I) -> CommandResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args
            .into_iter()
            .map(|a| a.as_ref().to_os_string())
            .collect();
        tracing::debug!(program, args = ?args, "执行外部命令");

        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .output();

        let result = match output {
            Ok(output) => CommandResult::from_output(output),
            Err(e) => CommandResult::from_error(e),
        };

        tracing::debug!(
            program,
            success = result.success,
            exit_code = ?result.exit_code,
            stderr = %result.stderr,
            "外部命令结束"
        );
        result
    }
}
