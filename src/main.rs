//! gitext - 多 Git 身份切换命令行工具

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gitext::core::{init_logger, AppError, AppResult};
use gitext::models::LogLevel;
use gitext::services::ProfileManager;
use gitext::utils::{default_config_dir, read_app_config, AppPaths};

/// Switch between Git identities (user.name, user.email and SSH key).
#[derive(Parser)]
#[command(name = "gitext")]
#[command(about = "Switch between Git identities (name, email and SSH key)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// SSH directory holding per-profile keys and the installed key pair. Defaults to ~/.ssh
    #[arg(long, env = "GITEXT_SSH_DIR", global = true)]
    ssh_dir: Option<PathBuf>,

    /// Profile store file. Defaults to <config-dir>/profiles.json
    #[arg(long, env = "GITEXT_PROFILES_PATH", global = true)]
    profiles: Option<PathBuf>,

    /// Directory holding config.json. Defaults to ~/.gitext
    #[arg(long, env = "GITEXT_CONFIG_DIR", global = true)]
    config_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a profile and generate its SSH key pair
    Create {
        email: String,
        /// Display name, defaults to the email
        name: Option<String>,
    },
    /// Change the display name of a profile
    Update {
        email: String,
        /// Display name, defaults to the email
        name: Option<String>,
    },
    /// Delete an inactive profile and its keys
    Delete { email: String },
    /// Activate a profile by exact email
    Activate { email: String },
    /// Activate the profile whose email equals QUERY, otherwise the first (in creation order) whose email starts with QUERY
    Use { query: String },
    /// Show the active profile
    Show,
    /// List all profiles
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare the active profile with the installed key and Git config
    Check,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.downcast_ref::<AppError>() {
                Some(app_error) => eprintln!("{app_error}"),
                None => eprintln!("{e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => default_config_dir()?,
    };
    let mut config = read_app_config(&config_dir)?;

    if let Some(level) = cli.log_level.as_deref() {
        config.log.level = LogLevel::parse(level)
            .ok_or_else(|| AppError::InvalidAction(format!("unknown log level {level:?}")))?;
    }
    init_logger(&config.log)?;

    let paths = AppPaths::resolve(&config_dir, cli.ssh_dir, cli.profiles, &config)?;
    tracing::debug!(
        ssh_dir = %paths.ssh_dir.display(),
        profiles = %paths.profiles_path.display(),
        "路径解析完成"
    );

    let manager = ProfileManager::new(paths);
    Ok(dispatch(&manager, cli.command.unwrap_or(Commands::Show))?)
}

fn dispatch(manager: &ProfileManager, command: Commands) -> AppResult<String> {
    match command {
        Commands::Create { email, name } => commands::create(manager, &email, name),
        Commands::Update { email, name } => commands::update(manager, &email, name),
        Commands::Delete { email } => commands::delete(manager, &email),
        Commands::Activate { email } => commands::activate(manager, &email),
        Commands::Use { query } => commands::use_profile(manager, &query),
        Commands::Show => commands::show(manager),
        Commands::List { json } => commands::list(manager, json),
        Commands::Check => commands::check(manager),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_show() {
        let cli = Cli::try_parse_from(["gitext"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn create_name_is_optional() {
        let cli = Cli::try_parse_from(["gitext", "create", "a@x.com"]).unwrap();
        match cli.command {
            Some(Commands::Create { email, name }) => {
                assert_eq!(email, "a@x.com");
                assert!(name.is_none());
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn use_help_mentions_exact_match_priority() {
        let cli = Cli::command();
        let about = cli
            .find_subcommand("use")
            .and_then(|c| c.get_about())
            .map(|a| a.to_string())
            .unwrap_or_default();
        assert!(about.contains("equals QUERY"), "{about}");
        assert!(about.contains("starts with QUERY"), "{about}");
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "gitext",
            "use",
            "a",
            "--ssh-dir",
            "/tmp/ssh",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.ssh_dir, Some(PathBuf::from("/tmp/ssh")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }
}
