use crate::models::AppConfig;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = ".gitext";
const CONFIG_FILE: &str = "config.json";
const PROFILES_FILE: &str = "profiles.json";
const SSH_DIR: &str = ".ssh";

/// gitext 配置目录，缺省为 ~/.gitext（不会主动创建）
pub fn default_config_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("无法获取用户主目录"))?;
    Ok(home_dir.join(APP_DIR))
}

/// 读取 `<config_dir>/config.json`，文件不存在时返回默认配置
pub fn read_app_config(config_dir: &Path) -> Result<AppConfig> {
    let config_path = config_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("读取配置文件失败: {config_path:?}"))?;
    serde_json::from_str(&content).with_context(|| format!("解析配置文件失败: {config_path:?}"))
}

/// 运行时使用的路径集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// SSH 目录：每个 profile 的密钥位于 `<ssh_dir>/<email>/`，激活的密钥安装到 `<ssh_dir>/`
    pub ssh_dir: PathBuf,
    /// profile 存储文件
    pub profiles_path: PathBuf,
}

impl AppPaths {
    pub fn new(ssh_dir: impl Into<PathBuf>, profiles_path: impl Into<PathBuf>) -> Self {
        Self {
            ssh_dir: ssh_dir.into(),
            profiles_path: profiles_path.into(),
        }
    }

    /// 按优先级解析路径：命令行/环境变量 > config.json > 主目录下的默认位置
    pub fn resolve(
        config_dir: &Path,
        ssh_dir: Option<PathBuf>,
        profiles_path: Option<PathBuf>,
        config: &AppConfig,
    ) -> Result<Self> {
        let ssh_dir = match ssh_dir.or_else(|| config.ssh_dir.clone()) {
            Some(dir) => dir,
            None => dirs::home_dir()
                .ok_or_else(|| anyhow!("无法获取用户主目录"))?
                .join(SSH_DIR),
        };
        let profiles_path = profiles_path
            .or_else(|| config.profiles_path.clone())
            .unwrap_or_else(|| config_dir.join(PROFILES_FILE));

        Ok(Self::new(ssh_dir, profiles_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    struct TempHomeGuard {
        home: Option<String>,
    }

    impl TempHomeGuard {
        fn new(dir: &TempDir) -> Self {
            let home = env::var("HOME").ok();
            env::set_var("HOME", dir.path());
            Self { home }
        }
    }

    impl Drop for TempHomeGuard {
        fn drop(&mut self) {
            match &self.home {
                Some(val) => env::set_var("HOME", val),
                None => env::remove_var("HOME"),
            }
        }
    }

    #[test]
    #[cfg(unix)]
    #[serial]
    fn resolve_defaults_under_home() -> Result<()> {
        let temp = TempDir::new()?;
        let _guard = TempHomeGuard::new(&temp);

        let config_dir = default_config_dir()?;
        let paths = AppPaths::resolve(&config_dir, None, None, &AppConfig::default())?;

        assert_eq!(config_dir, temp.path().join(".gitext"));
        assert_eq!(paths.ssh_dir, temp.path().join(".ssh"));
        assert_eq!(paths.profiles_path, temp.path().join(".gitext/profiles.json"));
        Ok(())
    }

    #[test]
    fn resolve_prefers_explicit_over_config_file() -> Result<()> {
        let config = AppConfig {
            ssh_dir: Some(PathBuf::from("/from/config/ssh")),
            profiles_path: Some(PathBuf::from("/from/config/profiles.json")),
            ..Default::default()
        };

        let paths = AppPaths::resolve(
            Path::new("/cfg"),
            Some(PathBuf::from("/from/cli/ssh")),
            None,
            &config,
        )?;

        assert_eq!(paths.ssh_dir, PathBuf::from("/from/cli/ssh"));
        assert_eq!(paths.profiles_path, PathBuf::from("/from/config/profiles.json"));
        Ok(())
    }

    #[test]
    fn read_app_config_missing_file_returns_default() -> Result<()> {
        let temp = TempDir::new()?;
        let config = read_app_config(temp.path())?;
        assert!(config.ssh_dir.is_none());
        Ok(())
    }

    #[test]
    fn read_app_config_parses_file() -> Result<()> {
        let temp = TempDir::new()?;
        fs::write(
            temp.path().join("config.json"),
            r#"{"ssh_dir": "/keys", "log": {"level": "debug"}}"#,
        )?;

        let config = read_app_config(temp.path())?;
        assert_eq!(config.ssh_dir, Some(PathBuf::from("/keys")));
        assert_eq!(config.log.level, crate::models::LogLevel::Debug);
        Ok(())
    }

    #[test]
    fn read_app_config_rejects_invalid_json() -> Result<()> {
        let temp = TempDir::new()?;
        fs::write(temp.path().join("config.json"), "{ssh_dir")?;

        assert!(read_app_config(temp.path()).is_err());
        Ok(())
    }
}
