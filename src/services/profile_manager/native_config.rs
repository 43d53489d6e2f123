//! 系统侧同步逻辑：安装 SSH 密钥、写 Git 全局身份，以及反向检查两者是否与记录一致

use super::types::*;
use crate::core::AppResult;
use crate::services::identity::{GIT_USER_EMAIL, GIT_USER_NAME};
use crate::utils::{file_checksum, install_file};

impl super::manager::ProfileManager {
    /// 将 profile 应用到系统：依次复制私钥、公钥，设置 user.name、user.email
    ///
    /// 任一步失败立即返回，已完成的步骤不会撤销。
    pub fn apply_profile_to_native(&self, email: &str, name: &str) -> AppResult<()> {
        let source = self.key_paths(email);
        let target = self.installed_key_paths();

        install_file(&source.private_key, &target.private_key, true)?;
        install_file(&source.public_key, &target.public_key, false)?;
        tracing::debug!(email, target = %target.dir.display(), "已安装 SSH 密钥");

        self.git.set(GIT_USER_NAME, name)?;
        self.git.set(GIT_USER_EMAIL, email)?;

        tracing::info!(email, name, "已应用 profile 到 SSH 与 Git 全局配置");
        Ok(())
    }

    /// 检查记录中的激活 profile 与系统实际状态是否一致
    pub fn check_native_state(&self) -> AppResult<CheckReport> {
        let active = match self.active_state()? {
            ActiveState::Active(descriptor) => descriptor,
            ActiveState::NoProfiles | ActiveState::NoneActive => {
                return Ok(CheckReport {
                    active: None,
                    drifts: Vec::new(),
                })
            }
        };

        let source = self.key_paths(&active.email);
        let target = self.installed_key_paths();
        let mut drifts = Vec::new();

        for (expected, installed) in [
            (&source.private_key, &target.private_key),
            (&source.public_key, &target.public_key),
        ] {
            if !same_content(expected, installed) {
                drifts.push(Drift::InstalledKey {
                    path: installed.to_path_buf(),
                });
            }
        }

        for (key, expected) in [
            (GIT_USER_NAME, active.name.as_str()),
            (GIT_USER_EMAIL, active.email.as_str()),
        ] {
            let actual = self.git.get(key)?;
            if actual.as_deref() != Some(expected) {
                drifts.push(Drift::GitConfig {
                    key: key.to_string(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        if !drifts.is_empty() {
            tracing::warn!(email = %active.email, drifts = drifts.len(), "系统状态与激活记录不一致");
        }

        Ok(CheckReport {
            active: Some(active),
            drifts,
        })
    }
}

/// 两个文件都可读且 SHA-256 相同
fn same_content(a: &std::path::Path, b: &std::path::Path) -> bool {
    match (file_checksum(a), file_checksum(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}
