//! ProfileManager 核心实现
//!
//! 所有写操作都遵循同一流程：加排他锁 → 读取整个 profiles.json →
//! 内存中修改 → 原子写回 → 执行外部副作用（生成密钥 / 安装密钥 / 写 Git 配置）。
//! store 相关的错误总在副作用之前返回。

use super::types::*;
use crate::core::{AppError, AppResult};
use crate::data::{FileLock, JsonManager};
use crate::services::identity::{GitCli, GitConfigurator, KeyGenerator, SshKeygen, GIT_USER_NAME};
use crate::utils::{remove_dir_best_effort, AppPaths};
use chrono::Utc;
use std::fs;

pub struct ProfileManager {
    json: JsonManager,
    paths: AppPaths,
    pub(super) keygen: Box<dyn KeyGenerator>,
    pub(super) git: Box<dyn GitConfigurator>,
}

impl ProfileManager {
    /// 使用系统的 `ssh-keygen` 与 `git`
    pub fn new(paths: AppPaths) -> Self {
        Self::with_backends(paths, Box::new(SshKeygen::new()), Box::new(GitCli::new()))
    }

    pub fn with_backends(
        paths: AppPaths,
        keygen: Box<dyn KeyGenerator>,
        git: Box<dyn GitConfigurator>,
    ) -> Self {
        Self {
            json: JsonManager::new(),
            paths,
            keygen,
            git,
        }
    }

    /// profile 自己的密钥位置
    pub fn key_paths(&self, email: &str) -> KeyPaths {
        KeyPaths::for_profile(&self.paths.ssh_dir, email)
    }

    /// 激活时密钥的安装位置
    pub fn installed_key_paths(&self) -> KeyPaths {
        KeyPaths::installed(&self.paths.ssh_dir)
    }

    // ==================== store 读写 ====================

    fn lock_store(&self) -> AppResult<FileLock> {
        Ok(self.json.lock(&self.paths.profiles_path)?)
    }

    /// 读取 store，文件不存在时写入空对象；调用方需持有锁
    fn load_profiles_store(&self) -> AppResult<ProfilesStore> {
        let store = self
            .json
            .read_or_init(&self.paths.profiles_path, ProfilesStore::new())?;
        Ok(store)
    }

    /// 整体写回 store，键顺序与插入顺序一致；调用方需持有锁
    fn save_profiles_store(&self, store: &ProfilesStore) -> AppResult<()> {
        self.json.write(&self.paths.profiles_path, store)?;
        tracing::debug!(
            path = %self.paths.profiles_path.display(),
            profiles = store.len(),
            "已写入 profiles.json"
        );
        Ok(())
    }

    /// 读取全部 profile（文件不存在时初始化为空）
    pub fn read_profiles(&self) -> AppResult<ProfilesStore> {
        let _lock = self.lock_store()?;
        self.load_profiles_store()
    }

    pub fn get_profile(&self, email: &str) -> AppResult<Profile> {
        self.read_profiles()?
            .get(email)
            .cloned()
            .ok_or_else(|| AppError::NotFound(email.to_string()))
    }

    /// 按插入顺序列出所有 profile
    pub fn list_descriptors(&self) -> AppResult<Vec<ProfileDescriptor>> {
        let store = self.read_profiles()?;
        Ok(store
            .iter()
            .map(|(email, profile)| ProfileDescriptor::from_profile(email, profile))
            .collect())
    }

    /// 当前激活状态
    pub fn active_state(&self) -> AppResult<ActiveState> {
        let store = self.read_profiles()?;
        if store.is_empty() {
            return Ok(ActiveState::NoProfiles);
        }
        Ok(match store.active() {
            Some((email, profile)) => {
                ActiveState::Active(ProfileDescriptor::from_profile(email, profile))
            }
            None => ActiveState::NoneActive,
        })
    }

    // ==================== 创建 / 更新 / 删除 ====================

    /// 创建 profile 并生成密钥对
    ///
    /// 密钥生成失败时回滚刚写入的记录，store 不会留下没有密钥的 profile。
    /// 密钥目录只有在本次调用中新建时才会随回滚删除。
    pub fn create_profile(&self, email: &str, name: &str) -> AppResult<()> {
        validate_email(email)?;
        let _lock = self.lock_store()?;
        let mut store = self.load_profiles_store()?;

        if !store.insert(email, Profile::new(name)) {
            return Err(AppError::AlreadyExists(email.to_string()));
        }
        self.save_profiles_store(&store)?;

        let key_dir = self.key_paths(email).dir;
        let dir_existed = key_dir.exists();
        if let Err(e) = self.generate_key_pair(email) {
            tracing::error!(email, error = %e, "生成密钥失败，回滚 profile 记录");
            store.remove(email);
            self.save_profiles_store(&store)?;
            if !dir_existed {
                remove_dir_best_effort(&key_dir);
            }
            return Err(e);
        }

        tracing::info!(email, name, "已创建 profile");
        Ok(())
    }

    fn generate_key_pair(&self, email: &str) -> AppResult<()> {
        let keys = self.key_paths(email);
        fs::create_dir_all(&keys.dir).map_err(|e| AppError::io(&keys.dir, e))?;

        // 残留的旧密钥会让 ssh-keygen 询问是否覆盖
        for stale in [&keys.private_key, &keys.public_key] {
            if stale.exists() {
                tracing::warn!(path = %stale.display(), "删除残留的旧密钥");
                fs::remove_file(stale).map_err(|e| AppError::io(stale, e))?;
            }
        }

        self.keygen.generate(email, &keys.private_key)?;

        match keys.first_missing() {
            Some(missing) => Err(AppError::KeyMissing(missing.to_path_buf())),
            None => Ok(()),
        }
    }

    /// 修改显示名；profile 处于激活状态时同步 Git 全局 `user.name`
    pub fn update_profile(&self, email: &str, name: &str) -> AppResult<()> {
        validate_email(email)?;
        let _lock = self.lock_store()?;
        let mut store = self.load_profiles_store()?;

        let profile = store
            .get_mut(email)
            .ok_or_else(|| AppError::NotFound(email.to_string()))?;
        profile.name = name.to_string();
        profile.updated_at = Some(Utc::now());
        let activated = profile.activated;

        self.save_profiles_store(&store)?;

        if activated {
            tracing::info!(email, "Profile 处于激活状态，同步 Git user.name");
            self.git.set(GIT_USER_NAME, name)?;
        }

        tracing::info!(email, name, "已更新 profile");
        Ok(())
    }

    /// 删除未激活的 profile 及其密钥目录（目录删除失败只记录日志）
    pub fn delete_profile(&self, email: &str) -> AppResult<()> {
        validate_email(email)?;
        let _lock = self.lock_store()?;
        let mut store = self.load_profiles_store()?;

        let profile = store
            .get(email)
            .ok_or_else(|| AppError::NotFound(email.to_string()))?;
        if profile.activated {
            return Err(AppError::CurrentlyActivated(email.to_string()));
        }

        store.remove(email);
        self.save_profiles_store(&store)?;

        remove_dir_best_effort(&self.key_paths(email).dir);

        tracing::info!(email, "已删除 profile");
        Ok(())
    }

    // ==================== 激活管理 ====================

    /// 激活 profile：一次写回完成"全部清除 + 设置目标"，随后安装密钥并写 Git 配置
    ///
    /// 安装或配置失败时 store 已记录新的激活状态，重新执行 activate 即可补齐。
    pub fn activate_profile(&self, email: &str) -> AppResult<()> {
        let _lock = self.lock_store()?;
        self.activate_locked(email)
    }

    /// 模糊激活：精确匹配优先，否则取第一个以 `query` 为前缀的 email
    ///
    /// 返回实际激活的 email。
    pub fn use_profile(&self, query: &str) -> AppResult<String> {
        let _lock = self.lock_store()?;
        let store = self.load_profiles_store()?;

        let email = store
            .resolve(query)
            .map(str::to_string)
            .ok_or_else(|| AppError::NotFound(query.to_string()))?;
        tracing::debug!(query, email = %email, "模糊匹配 profile");

        self.activate_locked(&email)?;
        Ok(email)
    }

    fn activate_locked(&self, email: &str) -> AppResult<()> {
        // use 的匹配结果可能来自手工编辑的 profiles.json，同样需要校验
        validate_email(email)?;
        let mut store = self.load_profiles_store()?;
        if !store.contains(email) {
            return Err(AppError::NotFound(email.to_string()));
        }

        if let Some(missing) = self.key_paths(email).first_missing() {
            return Err(AppError::KeyMissing(missing.to_path_buf()));
        }

        store.set_active(email);
        self.save_profiles_store(&store)?;

        let name = store
            .get(email)
            .map(|p| p.name.clone())
            .ok_or_else(|| AppError::NotFound(email.to_string()))?;
        self.apply_profile_to_native(email, &name)?;

        tracing::info!(email, "已激活 profile");
        Ok(())
    }
}
