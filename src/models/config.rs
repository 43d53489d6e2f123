// 全局配置结构，放在 models 以便在库和二进制之间共享
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// 解析字符串为日志级别（大小写不敏感）
    pub fn parse(level_str: &str) -> Option<Self> {
        match level_str.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// 日志输出目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Console,
    File,
    Both,
}

/// 日志配置
///
/// CLI 默认只输出 warn 及以上到 stderr，避免干扰命令的正常输出。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LogConfig {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub output: LogOutput,
    /// 日志目录（文件输出时使用，缺省为 ~/.gitext/logs）
    #[serde(default)]
    pub file_path: Option<String>,
}

/// ~/.gitext/config.json 的内容，所有字段均可省略
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// SSH 目录（缺省为 ~/.ssh）
    #[serde(default)]
    pub ssh_dir: Option<PathBuf>,
    /// profiles.json 路径（缺省为 ~/.gitext/profiles.json）
    #[serde(default)]
    pub profiles_path: Option<PathBuf>,
    #[serde(default)]
    pub log: LogConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    #[test]
    fn test_app_config_defaults_from_empty_object() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert!(config.ssh_dir.is_none());
        assert!(config.profiles_path.is_none());
        assert_eq!(config.log.level, LogLevel::Warn);
        assert_eq!(config.log.output, LogOutput::Console);
    }

    #[test]
    fn test_app_config_partial_log_section() {
        let config: AppConfig =
            serde_json::from_str(r#"{"ssh_dir": "/tmp/ssh", "log": {"format": "json"}}"#).unwrap();
        assert_eq!(config.ssh_dir, Some(PathBuf::from("/tmp/ssh")));
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, LogLevel::Warn);
    }
}
