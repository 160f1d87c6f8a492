use chrono::{DateTime, Utc};
use envconfig::Envconfig;
use log::debug;
use std::str::FromStr;

#[derive(Envconfig, Clone)]
pub struct PostgresConfig {
    #[envconfig(from = "DB_HOST", default = "localhost")]
    pub host: String,
    #[envconfig(from = "DB_PORT", default = "5432")]
    pub port: u16,
    #[envconfig(from = "DB_USER", default = "postgres")]
    pub user: String,
    #[envconfig(from = "DB_PASSWORD", default = "postgres")]
    pub password: String,
    #[envconfig(from = "DB_NAME", default = "pixel")]
    pub dbname: String,
}

impl PostgresConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "PostgresConfig loaded: host={}, port={}, user={}, dbname={}",
            config.host, config.port, config.user, config.dbname
        );
        Ok(config)
    }

    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={} sslmode=disable",
            self.host, self.port, self.user, self.password, self.dbname
        )
    }
}

/// What the `report` binary prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportShape {
    Table,
    LineChart,
    /// The newest stored events rather than an aggregate report.
    Recent,
}

impl FromStr for ReportShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(ReportShape::Table),
            "line_chart" => Ok(ReportShape::LineChart),
            "recent" => Ok(ReportShape::Recent),
            _ => Err(format!("Unknown report shape: {}", s)),
        }
    }
}

/// Which report the `report` binary runs. Dimensions and measures are
/// comma-separated catalog keys.
#[derive(Envconfig, Clone)]
pub struct ReportConfig {
    #[envconfig(from = "REPORT_DIMENSIONS", default = "")]
    pub dimensions: String,
    #[envconfig(from = "REPORT_MEASURES", default = "")]
    pub measures: String,
    #[envconfig(from = "REPORT_LIMIT", default = "0")]
    pub limit: u32,
    #[envconfig(from = "REPORT_SHAPE", default = "table")]
    pub shape: ReportShape,
}

impl ReportConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "ReportConfig loaded: dimensions={}, measures={}, limit={}, shape={:?}",
            config.dimensions, config.measures, config.limit, config.shape
        );
        Ok(config)
    }

    /// Number of events listed by [`ReportShape::Recent`].
    pub fn recent_limit(&self) -> u32 {
        match self.limit {
            0 => DEFAULT_RECENT_EVENTS,
            limit => limit,
        }
    }
}

const DEFAULT_RECENT_EVENTS: u32 = 10;

/// Shape and time window of the dummy traffic the `seed` binary loads.
#[derive(Envconfig, Clone)]
pub struct SeedConfig {
    #[envconfig(from = "SEED_USERS", default = "12000")]
    pub users: usize,
    #[envconfig(from = "SEED_SESSIONS_PER_USER", default = "2.5")]
    pub sessions_per_user: f64,
    #[envconfig(from = "SEED_EVENTS_PER_SESSION", default = "5.5")]
    pub events_per_session: f64,
    #[envconfig(from = "SEED_START", default = "2023-01-01T00:00:00Z")]
    pub start: DateTime<Utc>,
    #[envconfig(from = "SEED_END", default = "2023-12-31T23:59:59Z")]
    pub end: DateTime<Utc>,
}

impl SeedConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "SeedConfig loaded: users={}, sessions_per_user={}, events_per_session={}, start={}, end={}",
            config.users,
            config.sessions_per_user,
            config.events_per_session,
            config.start,
            config.end
        );
        Ok(config)
    }
}
