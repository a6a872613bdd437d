use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;

pub mod env_vars;
pub mod models;
pub use models::*;

/// Directory searched for `default.*` and `{RUN_ENV}.*` when `CONFIG_DIR` is unset.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Loads the layered runtime configuration.
///
/// Sources, later ones winning: `{CONFIG_DIR}/default`, `{CONFIG_DIR}/{RUN_ENV}`
/// (both optional, any format the `config` crate understands), then
/// `AGENDADOR__SECTION__KEY` environment variables. `"secret_from_env"` markers
/// are resolved afterwards, see [`env_vars::inject_env_vars`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = env::var("CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    tracing::debug!(
        "loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(environment_source());

    finish(builder)
}

/// Parses configuration from an in-memory TOML document, still honoring
/// environment overrides. Used by tests and embedded deployments.
pub fn parse_config_str(toml: &str) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .add_source(environment_source());
    finish(builder)
}

fn environment_source() -> Environment {
    Environment::with_prefix(&env_vars::get_config_prefix())
        .separator(env_vars::CONFIG_SEPARATOR)
        .try_parsing(true)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    let mut raw: serde_json::Value = builder.build()?.try_deserialize()?;
    env_vars::inject_env_vars(&mut raw);
    let config: AppConfig = serde_json::from_value(raw)
        .map_err(|err| ConfigError::Message(format!("invalid configuration: {err}")))?;
    config.validate().map_err(ConfigError::Message)?;
    Ok(config)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file into the process environment, once.
///
/// `DOTENV_OVERRIDE` names the file, then a first command line argument starting
/// with `.env`, then `.env`. A missing file is not an error. Returns the path tried.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
