use axum_helpers::JwtConfig;
use core_config::{AppInfo, ConfigError, FromEnv, app_info, server::ServerConfig};
use database::postgres::PostgresConfig;
use std::env;

pub use core_config::Environment;

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub jwt: JwtConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub super_admin: Option<SuperAdminConfig>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?; // Required - will fail if not set
        let jwt = JwtConfig::from_env()?; // Required - will fail if not set
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=3000
        let super_admin = SuperAdminConfig::from_env_optional()?;

        Ok(Self {
            app: app_info!(),
            database,
            jwt,
            server,
            environment,
            super_admin,
        })
    }
}

/// Account created at startup when the store has no user by that name.
///
/// Environment variables (set both or neither):
/// - `SUPER_ADMIN_USERNAME`
/// - `SUPER_ADMIN_PASSWORD`
#[derive(Clone)]
pub struct SuperAdminConfig {
    pub username: String,
    pub password: String,
}

impl SuperAdminConfig {
    pub fn from_env_optional() -> Result<Option<Self>, ConfigError> {
        match (
            env::var("SUPER_ADMIN_USERNAME").ok(),
            env::var("SUPER_ADMIN_PASSWORD").ok(),
        ) {
            (Some(username), Some(password)) => Ok(Some(Self { username, password })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar("SUPER_ADMIN_PASSWORD".into())),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("SUPER_ADMIN_USERNAME".into())),
        }
    }
}

impl std::fmt::Debug for SuperAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperAdminConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
