//! Database primitives: connection settings, the on-disk `config.json` and
//! the one-connection-per-operation connector.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// A single open connection. Each logical operation gets its own.
pub type DbPool = DatabaseConnection;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_DATABASE: &str = "sed_db";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum DbError {
    #[error("config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config file is not valid JSON: {0}")]
    ConfigFormat(#[from] serde_json::Error),
    #[error("invalid database name {0:?}")]
    InvalidDatabaseName(String),
    #[error("invalid connection settings: {0}")]
    InvalidSettings(String),
    #[error("cannot open database: {0}")]
    Connection(#[source] DbErr),
    #[error(transparent)]
    Query(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    #[default]
    Mysql,
    /// `database` is a file path.
    Sqlite,
}

/// Connection settings as persisted under the `db` key of `config.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub driver: Driver,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port", deserialize_with = "port_from_number_or_string")]
    pub port: u16,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn port_from_number_or_string<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(raw) => raw
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid port {raw:?}"))),
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            driver: Driver::Mysql,
            host: default_host(),
            port: DEFAULT_PORT,
            user: default_user(),
            password: String::new(),
            database: default_database(),
        }
    }
}

impl DatabaseSettings {
    /// Settings for a file-backed SQLite database.
    pub fn sqlite(path: impl AsRef<Path>) -> Self {
        Self {
            driver: Driver::Sqlite,
            database: path.as_ref().to_string_lossy().into_owned(),
            ..Self::default()
        }
    }

    /// URL including the configured database.
    pub fn database_url(&self) -> DbResult<String> {
        match self.driver {
            Driver::Mysql => {
                validate_database_name(&self.database)?;
                self.mysql_url(Some(&self.database))
            }
            Driver::Sqlite => Ok(self.sqlite_url()),
        }
    }

    /// URL of the server alone, used before the database exists.
    pub fn server_url(&self) -> DbResult<String> {
        match self.driver {
            Driver::Mysql => self.mysql_url(None),
            Driver::Sqlite => Ok(self.sqlite_url()),
        }
    }

    fn mysql_url(&self, database: Option<&str>) -> DbResult<String> {
        let invalid = |what: &str| DbError::InvalidSettings(format!("{what} rejected"));
        let mut url = Url::parse("mysql://localhost")
            .map_err(|err| DbError::InvalidSettings(err.to_string()))?;
        url.set_host(Some(self.host.trim()))
            .map_err(|err| DbError::InvalidSettings(format!("host: {err}")))?;
        url.set_port(Some(self.port)).map_err(|_| invalid("port"))?;
        url.set_username(&self.user).map_err(|_| invalid("user"))?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| invalid("password"))?;
        }
        if let Some(name) = database {
            url.set_path(&format!("/{name}"));
        }
        Ok(url.to_string())
    }

    fn sqlite_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.database)
    }
}

/// MySQL identifiers are interpolated into `CREATE DATABASE`, so only a
/// conservative character set is accepted.
pub fn validate_database_name(name: &str) -> DbResult<()> {
    let ok = !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if ok {
        Ok(())
    } else {
        Err(DbError::InvalidDatabaseName(name.to_string()))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    db: DatabaseSettings,
}

/// The JSON file written by first-run setup.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Strict read: `Ok(None)` when the file is absent.
    pub fn try_load(&self) -> DbResult<Option<DatabaseSettings>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(DbError::ConfigIo {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let doc: ConfigDocument = serde_json::from_str(&raw)?;
        Ok(Some(doc.db))
    }

    /// Lenient read used at startup: any failure falls back to defaults.
    pub fn load(&self) -> DatabaseSettings {
        match self.try_load() {
            Ok(Some(settings)) => settings,
            Ok(None) => DatabaseSettings::default(),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "config unreadable; using defaults"
                );
                DatabaseSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &DatabaseSettings) -> DbResult<()> {
        let doc = ConfigDocument {
            db: settings.clone(),
        };
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        doc.serialize(&mut ser)?;
        buf.push(b'\n');

        let io_err = |source| DbError::ConfigIo {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, buf).map_err(io_err)?;
        info!(path = %self.path.display(), "database config saved");
        Ok(())
    }
}

/// Raw values typed into the setup form. Blank inputs fall back to defaults.
#[derive(Clone, Debug, Default)]
pub struct SetupForm {
    pub driver: Driver,
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl SetupForm {
    pub fn from_settings(settings: &DatabaseSettings) -> Self {
        Self {
            driver: settings.driver,
            host: settings.host.clone(),
            port: settings.port.to_string(),
            user: settings.user.clone(),
            password: settings.password.clone(),
            database: settings.database.clone(),
        }
    }

    pub fn collect(&self) -> DatabaseSettings {
        fn or_default(value: &str, fallback: &str) -> String {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                fallback.to_string()
            } else {
                trimmed.to_string()
            }
        }

        DatabaseSettings {
            driver: self.driver,
            host: or_default(&self.host, DEFAULT_HOST),
            port: self.port.trim().parse().unwrap_or(DEFAULT_PORT),
            user: or_default(&self.user, DEFAULT_USER),
            // Passwords may legitimately carry surrounding whitespace.
            password: self.password.clone(),
            database: or_default(&self.database, DEFAULT_DATABASE),
        }
    }
}

async fn open(url: String) -> DbResult<DbPool> {
    let mut opts = ConnectOptions::new(url);
    opts.max_connections(1)
        .min_connections(0)
        .connect_timeout(CONNECT_TIMEOUT)
        .sqlx_logging(false);
    Database::connect(opts).await.map_err(DbError::Connection)
}

fn prepare_sqlite_file(settings: &DatabaseSettings) -> DbResult<()> {
    let path = Path::new(&settings.database);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| DbError::ConfigIo {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Open a connection to the configured database.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    if settings.driver == Driver::Sqlite {
        prepare_sqlite_file(settings)?;
    }
    debug!(driver = ?settings.driver, host = %settings.host, "opening database connection");
    open(settings.database_url()?).await
}

/// Close a connection opened for a single operation.
pub async fn release(conn: DbPool) {
    if let Err(err) = conn.close().await {
        debug!(error = %err, "closing connection failed");
    }
}

/// Reach the server without selecting a database.
pub async fn test_connection(settings: &DatabaseSettings) -> DbResult<()> {
    if settings.driver == Driver::Sqlite {
        prepare_sqlite_file(settings)?;
    }
    let conn = open(settings.server_url()?).await?;
    let result = conn.ping().await.map_err(DbError::Connection);
    release(conn).await;
    result
}

/// `CREATE DATABASE IF NOT EXISTS` for MySQL; SQLite files are created on connect.
pub async fn ensure_database(settings: &DatabaseSettings) -> DbResult<()> {
    match settings.driver {
        Driver::Sqlite => prepare_sqlite_file(settings),
        Driver::Mysql => {
            validate_database_name(&settings.database)?;
            let conn = open(settings.server_url()?).await?;
            let sql = format!(
                "CREATE DATABASE IF NOT EXISTS `{}` \
                 DEFAULT CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci",
                settings.database
            );
            let result = conn.execute_unprepared(&sql).await;
            release(conn).await;
            result?;
            info!(database = %settings.database, "database ensured");
            Ok(())
        }
    }
}

/// Hands out a fresh connection per operation; nothing is pooled between calls.
#[derive(Clone, Debug)]
pub struct Connector {
    settings: DatabaseSettings,
}

impl Connector {
    pub fn new(settings: DatabaseSettings) -> Self {
        Self { settings }
    }

    pub async fn open(&self) -> DbResult<DbPool> {
        connect(&self.settings).await
    }
}
