// lib.rs - 暴露服务层给 CLI 使用

pub mod core;
pub mod data;
pub mod models;
pub mod services;
pub mod utils;

pub use models::*;
pub use services::profile_manager::{
    ActiveState, CheckReport, Drift, Profile, ProfileDescriptor, ProfileManager, ProfilesStore,
};
pub use utils::{AppPaths, CommandExecutor, CommandResult};

// 重新导出常用类型
pub use anyhow::{Context, Result};

pub use core::{init_logger, AppError, AppResult};
