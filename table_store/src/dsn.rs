//! Data source names
//!
//! Connection strings use the form
//! `user:password@tcp(host:port)/database?charset=utf8mb4&loc=Asia%2FShanghai`.

use crate::errors::{StoreError, StoreResult};
use sqlx::mysql::MySqlConnectOptions;
use sqlx::ConnectOptions;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Statements slower than this are logged at WARN when debug logging is on
pub const SLOW_STATEMENT_THRESHOLD: Duration = Duration::from_millis(200);

const DEFAULT_CHARSET: &str = "utf8mb4";

/// A parsed DSN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub params: BTreeMap<String, String>,
}

impl Dsn {
    pub fn parse(dsn: &str) -> StoreResult<Self> {
        let invalid = |reason: &str| StoreError::configuration(format!("invalid DSN: {}", reason));

        let (credentials, rest) = dsn
            .rsplit_once("@tcp(")
            .ok_or_else(|| invalid("expected '@tcp(host:port)'"))?;
        let (user, password) = credentials.split_once(':').unwrap_or((credentials, ""));

        let (address, rest) = rest
            .split_once(')')
            .ok_or_else(|| invalid("unclosed address"))?;
        let (host, port) = address
            .rsplit_once(':')
            .ok_or_else(|| invalid("address must be host:port"))?;
        if host.is_empty() {
            return Err(invalid("empty host"));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| invalid(&format!("bad port '{}'", port)))?;

        let rest = rest
            .strip_prefix('/')
            .ok_or_else(|| invalid("missing '/database'"))?;
        let (database, query) = rest.split_once('?').unwrap_or((rest, ""));
        if database.is_empty() {
            return Err(invalid("empty database name"));
        }

        let params = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Ok(Self {
            user: user.to_string(),
            password: password.to_string(),
            host: host.to_string(),
            port,
            database: database.to_string(),
            params,
        })
    }

    pub fn charset(&self) -> &str {
        self.params
            .get("charset")
            .map(String::as_str)
            .unwrap_or(DEFAULT_CHARSET)
    }

    /// Location from `loc`; `Local` means no explicit location
    pub fn timezone(&self) -> Option<&str> {
        self.params
            .get("loc")
            .map(String::as_str)
            .filter(|tz| !tz.is_empty() && !tz.eq_ignore_ascii_case("local"))
    }

    /// Time zone sent to the server as the session `time_zone`.
    ///
    /// Only `UTC` and fixed offsets such as `+08:00` are forwarded. Named zones
    /// need the server's time zone tables, so the session keeps the server default.
    pub fn session_timezone(&self) -> Option<String> {
        let tz = self.timezone()?;
        if tz.eq_ignore_ascii_case("utc") {
            return Some("+00:00".to_string());
        }
        is_fixed_offset(tz).then(|| tz.to_string())
    }

    /// Driver options. With `debug` every statement is logged at INFO and slow ones at WARN.
    pub fn to_connect_options(&self, debug: bool) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .charset(self.charset())
            .timezone(self.session_timezone());

        if debug {
            options
                .log_statements(log::LevelFilter::Info)
                .log_slow_statements(log::LevelFilter::Warn, SLOW_STATEMENT_THRESHOLD)
        } else {
            options.disable_statement_logging()
        }
    }
}

/// `+HH:MM` or `-HH:MM`
fn is_fixed_offset(tz: &str) -> bool {
    let Some(rest) = tz.strip_prefix('+').or_else(|| tz.strip_prefix('-')) else {
        return false;
    };
    match rest.split_once(':') {
        Some((hours, minutes)) => {
            hours.len() == 2
                && minutes.len() == 2
                && hours.parse::<u8>().is_ok_and(|h| h <= 14)
                && minutes.parse::<u8>().is_ok_and(|m| m < 60)
        }
        None => false,
    }
}

impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}@tcp({}:{})/{}",
            self.user, self.password, self.host, self.port, self.database
        )?;

        if !self.params.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.params.iter())
                .finish();
            write!(f, "?{}", query)?;
        }

        Ok(())
    }
}

impl std::str::FromStr for Dsn {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
