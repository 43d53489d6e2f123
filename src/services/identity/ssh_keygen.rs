//! 基于 `ssh-keygen` 的密钥对生成

use super::identity_trait::KeyGenerator;
use crate::core::AppResult;
use crate::utils::CommandExecutor;
use std::ffi::OsStr;
use std::path::Path;

const PROGRAM: &str = "ssh-keygen";

#[derive(Debug, Default)]
pub struct SshKeygen {
    executor: CommandExecutor,
}

impl SshKeygen {
    pub fn new() -> Self {
        Self {
            executor: CommandExecutor::new(),
        }
    }
}

/// `ssh-keygen -t ed25519 -N "" -C <email> -f <path> -q`
fn keygen_args<'a>(email: &'a str, private_key: &'a Path) -> [&'a OsStr; 9] {
    [
        OsStr::new("-t"),
        OsStr::new("ed25519"),
        OsStr::new("-N"),
        OsStr::new(""),
        OsStr::new("-C"),
        OsStr::new(email),
        OsStr::new("-f"),
        private_key.as_os_str(),
        OsStr::new("-q"),
    ]
}

impl KeyGenerator for SshKeygen {
    fn generate(&self, email: &str, private_key: &Path) -> AppResult<()> {
        self.executor
            .run(PROGRAM, keygen_args(email, private_key))
            .into_result(PROGRAM)?;

        tracing::info!(email, path = %private_key.display(), "已生成 Ed25519 密钥对");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keygen_args() {
        let path = Path::new("/home/u/.ssh/a@x.com/id_ed25519");
        let args: Vec<_> = keygen_args("a@x.com", path)
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            [
                "-t",
                "ed25519",
                "-N",
                "",
                "-C",
                "a@x.com",
                "-f",
                "/home/u/.ssh/a@x.com/id_ed25519",
                "-q"
            ]
        );
    }
}
