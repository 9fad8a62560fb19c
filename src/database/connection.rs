use crate::utils::{Result, WorkflowError};
use tokio_postgres::{Client, Config, NoTls};
use tracing::{info, warn};

const DEFAULT_PORT: u16 = 5432;

/// Connection settings read from `CMS_DB_USER`, `CMS_DB_PWD`, `CMS_DB_HOST`,
/// `CMS_DB_PORT` and `CMS_DB_NAME`.
#[derive(Clone, PartialEq, Eq)]
pub struct CmsDbConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

impl std::fmt::Debug for CmsDbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsDbConfig")
            .field("user", &self.user)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl CmsDbConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Every variable but the port is required; the port defaults to 5432.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    WorkflowError::ConfigError(format!("environment variable {} is not set", key))
                })
        };

        let port = match lookup("CMS_DB_PORT").filter(|p| !p.is_empty()) {
            Some(raw) => raw.trim().parse().map_err(|_| {
                WorkflowError::ConfigError(format!("CMS_DB_PORT '{}' is not a port", raw))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            user: required("CMS_DB_USER")?,
            password: required("CMS_DB_PWD")?,
            host: required("CMS_DB_HOST")?,
            port,
            name: required("CMS_DB_NAME")?,
        })
    }

    pub fn pg_config(&self) -> Config {
        let mut config = Config::new();
        config
            .user(self.user.as_str())
            .password(self.password.as_str())
            .host(self.host.as_str())
            .port(self.port)
            .dbname(self.name.as_str());
        config
    }
}

/// A live connection to the CMS database.
pub struct CmsDatabase {
    pub(crate) client: Client,
}

impl CmsDatabase {
    pub async fn connect(config: &CmsDbConfig) -> Result<Self> {
        let (client, connection) = config.pg_config().connect(NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "CMS database connection closed with an error");
            }
        });
        info!(host = %config.host, database = %config.name, "Connected to CMS database");
        Ok(Self { client })
    }
}
