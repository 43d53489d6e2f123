//! Profile 管理命令：参数校验 + 调用 ProfileManager + 生成输出文本

use ::gitext::core::{AppError, AppResult};
use ::gitext::services::profile_manager::{ActiveState, ProfileDescriptor, ProfileManager};

fn require_non_empty(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidAction(format!("{field} must not be empty")));
    }
    Ok(())
}

/// 省略 name 时使用 email
fn name_or_email(email: &str, name: Option<String>) -> String {
    name.filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| email.to_string())
}

fn identity(email: &str, name: &str) -> String {
    format!("{name} <{email}>")
}

pub fn create(manager: &ProfileManager, email: &str, name: Option<String>) -> AppResult<String> {
    require_non_empty("email", email)?;
    let name = name_or_email(email, name);
    manager.create_profile(email, &name)?;
    Ok(format!("Created profile {}", identity(email, &name)))
}

pub fn update(manager: &ProfileManager, email: &str, name: Option<String>) -> AppResult<String> {
    require_non_empty("email", email)?;
    let name = name_or_email(email, name);
    manager.update_profile(email, &name)?;
    Ok(format!("Updated profile {}", identity(email, &name)))
}

pub fn delete(manager: &ProfileManager, email: &str) -> AppResult<String> {
    require_non_empty("email", email)?;
    manager.delete_profile(email)?;
    Ok(format!("Deleted profile {email}"))
}

pub fn activate(manager: &ProfileManager, email: &str) -> AppResult<String> {
    require_non_empty("email", email)?;
    manager.activate_profile(email)?;
    activated_message(manager, email)
}

pub fn use_profile(manager: &ProfileManager, query: &str) -> AppResult<String> {
    require_non_empty("query", query)?;
    let email = manager.use_profile(query)?;
    activated_message(manager, &email)
}

fn activated_message(manager: &ProfileManager, email: &str) -> AppResult<String> {
    let profile = manager.get_profile(email)?;
    Ok(format!("Activated {}", identity(email, &profile.name)))
}

pub fn show(manager: &ProfileManager) -> AppResult<String> {
    Ok(match manager.active_state()? {
        ActiveState::NoProfiles => "No profiles".to_string(),
        ActiveState::NoneActive => "No active profile".to_string(),
        ActiveState::Active(descriptor) => descriptor.identity(),
    })
}

pub fn list(manager: &ProfileManager, json: bool) -> AppResult<String> {
    let descriptors = manager.list_descriptors()?;
    if json {
        let text = serde_json::to_string_pretty(&descriptors)
            .map_err(::gitext::data::DataError::from)?;
        return Ok(text);
    }
    if descriptors.is_empty() {
        return Ok("No profiles".to_string());
    }
    Ok(descriptors
        .iter()
        .map(list_line)
        .collect::<Vec<_>>()
        .join("\n"))
}

fn list_line(descriptor: &ProfileDescriptor) -> String {
    let marker = if descriptor.is_active { '*' } else { ' ' };
    format!("{marker} {}", descriptor.identity())
}

pub fn check(manager: &ProfileManager) -> AppResult<String> {
    let report = manager.check_native_state()?;
    let Some(active) = report.active.as_ref() else {
        return Ok("No active profile".to_string());
    };

    if report.is_clean() {
        return Ok(format!(
            "{} matches the installed SSH key and Git config",
            active.identity()
        ));
    }

    let mut lines = vec![format!(
        "{} is recorded as active, but the system differs:",
        active.identity()
    )];
    lines.extend(report.drifts.iter().map(|d| format!("  - {d}")));
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::gitext::core::AppResult;
    use ::gitext::services::identity::{GitConfigurator, KeyGenerator};
    use ::gitext::utils::AppPaths;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct DummyKeygen;

    impl KeyGenerator for DummyKeygen {
        fn generate(&self, email: &str, private_key: &Path) -> AppResult<()> {
            std::fs::write(private_key, email).unwrap();
            std::fs::write(private_key.with_extension("pub"), email).unwrap();
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct MemoryGit(Rc<RefCell<HashMap<String, String>>>);

    impl GitConfigurator for MemoryGit {
        fn set(&self, key: &str, value: &str) -> AppResult<()> {
            self.0.borrow_mut().insert(key.into(), value.into());
            Ok(())
        }

        fn get(&self, key: &str) -> AppResult<Option<String>> {
            Ok(self.0.borrow().get(key).cloned())
        }
    }

    fn manager(temp: &TempDir) -> ProfileManager {
        ProfileManager::with_backends(
            AppPaths::new(temp.path().join("ssh"), temp.path().join("profiles.json")),
            Box::new(DummyKeygen),
            Box::new(MemoryGit::default()),
        )
    }

    #[test]
    fn create_defaults_name_to_email() {
        let temp = TempDir::new().unwrap();
        let m = manager(&temp);

        let out = create(&m, "a@x.com", None).unwrap();

        assert_eq!(out, "Created profile a@x.com <a@x.com>");
        assert_eq!(m.get_profile("a@x.com").unwrap().name, "a@x.com");
    }

    #[test]
    fn empty_email_is_invalid_action() {
        let temp = TempDir::new().unwrap();
        let m = manager(&temp);

        let err = create(&m, "  ", Some("A".into())).unwrap_err();
        assert!(matches!(err, AppError::InvalidAction(_)));
        assert_eq!(err.to_string(), "Invalid action: email must not be empty");
    }

    #[test]
    fn show_and_list_output() {
        let temp = TempDir::new().unwrap();
        let m = manager(&temp);
        assert_eq!(show(&m).unwrap(), "No profiles");
        assert_eq!(list(&m, false).unwrap(), "No profiles");

        create(&m, "a@x.com", Some("A".into())).unwrap();
        create(&m, "ab@x.com", Some("AB".into())).unwrap();
        assert_eq!(show(&m).unwrap(), "No active profile");

        assert_eq!(use_profile(&m, "a").unwrap(), "Activated A <a@x.com>");
        assert_eq!(show(&m).unwrap(), "A <a@x.com>");
        assert_eq!(
            list(&m, false).unwrap(),
            "* A <a@x.com>\n  AB <ab@x.com>"
        );

        let json: serde_json::Value = serde_json::from_str(&list(&m, true).unwrap()).unwrap();
        assert_eq!(json[0]["email"], "a@x.com");
        assert_eq!(json[0]["is_active"], true);
        assert_eq!(json[1]["is_active"], false);
    }

    #[test]
    fn check_output_reports_drift() {
        let temp = TempDir::new().unwrap();
        let m = manager(&temp);
        assert_eq!(check(&m).unwrap(), "No active profile");

        create(&m, "a@x.com", Some("A".into())).unwrap();
        activate(&m, "a@x.com").unwrap();
        assert_eq!(
            check(&m).unwrap(),
            "A <a@x.com> matches the installed SSH key and Git config"
        );

        std::fs::remove_file(temp.path().join("ssh").join("id_ed25519.pub")).unwrap();
        let out = check(&m).unwrap();
        assert!(out.starts_with("A <a@x.com> is recorded as active"));
        assert!(out.contains("id_ed25519.pub"));
    }

    #[test]
    fn errors_carry_user_facing_messages() {
        let temp = TempDir::new().unwrap();
        let m = manager(&temp);
        create(&m, "a@x.com", Some("A".into())).unwrap();
        activate(&m, "a@x.com").unwrap();

        assert_eq!(
            create(&m, "a@x.com", None).unwrap_err().to_string(),
            "Profile a@x.com already exists"
        );
        assert_eq!(
            delete(&m, "a@x.com").unwrap_err().to_string(),
            "Profile a@x.com is currently activated"
        );
        assert_eq!(
            delete(&m, "b@x.com").unwrap_err().to_string(),
            "Profile b@x.com not found"
        );
    }
}
