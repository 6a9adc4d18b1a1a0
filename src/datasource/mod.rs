pub mod param;
pub mod password;
pub mod sqlserver;

use crate::datasource::param::{ConnectionDescriptor, ConnectionRequest};
use crate::datasource::password::PasswordEncoder;
use crate::engine::dialect::SqlDialect;
use crate::error::{DatasourceError, Result};
use crate::util::splitter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Database kinds known to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DbType {
    Mysql,
    Postgresql,
    Hive,
    Clickhouse,
    Oracle,
    Sqlserver,
    Db2,
}

impl DbType {
    pub fn name(self) -> &'static str {
        match self {
            DbType::Mysql => "mysql",
            DbType::Postgresql => "postgresql",
            DbType::Hive => "hive",
            DbType::Clickhouse => "clickhouse",
            DbType::Oracle => "oracle",
            DbType::Sqlserver => "sqlserver",
            DbType::Db2 => "db2",
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DbType {
    type Err = DatasourceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(DbType::Mysql),
            "postgresql" | "postgres" => Ok(DbType::Postgresql),
            "hive" => Ok(DbType::Hive),
            "clickhouse" => Ok(DbType::Clickhouse),
            "oracle" => Ok(DbType::Oracle),
            "sqlserver" | "mssql" => Ok(DbType::Sqlserver),
            "db2" => Ok(DbType::Db2),
            _ => Err(DatasourceError::UnsupportedDbType(s.to_string())),
        }
    }
}

/// Fixed per-vendor constants.
#[derive(Debug)]
pub struct VendorMetadata {
    pub db_type: DbType,
    pub driver_class: &'static str,
    pub validation_query: &'static str,
    pub jdbc_scheme: &'static str,
}

/// Capability contract every vendor adapter implements.
pub trait DataSourceProcessor: Send + Sync {
    fn metadata(&self) -> &'static VendorMetadata;

    fn dialect(&self) -> &'static dyn SqlDialect;

    /// Reject requests the platform must not turn into a descriptor.
    fn check_params(&self, request: &ConnectionRequest) -> Result<()>;

    /// Build the stored descriptor. Does not re-validate the request.
    fn create_connection_params(&self, request: &ConnectionRequest) -> Result<ConnectionDescriptor>;

    /// Rebuild the request a stored descriptor was created from.
    fn create_request(&self, descriptor: &ConnectionDescriptor) -> Result<ConnectionRequest>;

    /// Decode the stored password for opening a session.
    fn decode_password(&self, descriptor: &ConnectionDescriptor) -> Result<String>;

    fn db_type(&self) -> DbType {
        self.metadata().db_type
    }

    fn driver_class(&self) -> &'static str {
        self.metadata().driver_class
    }

    fn validation_query(&self) -> &'static str {
        self.metadata().validation_query
    }

    fn jdbc_url<'a>(&self, descriptor: &'a ConnectionDescriptor) -> &'a str {
        &descriptor.jdbc_url
    }

    /// Key the platform caches connections under.
    fn unique_id(&self, descriptor: &ConnectionDescriptor) -> String {
        format!(
            "{}@{}@{}",
            self.db_type().name(),
            descriptor.user,
            descriptor.jdbc_url
        )
    }

    fn split_and_remove_comment(&self, script: &str) -> Vec<String> {
        let statements = splitter::split(script, self.dialect());
        debug!(
            dialect = self.dialect().name(),
            count = statements.len(),
            "split script into statements"
        );
        statements
    }
}

/// Processors by vendor tag, populated once at startup.
#[derive(Default)]
pub struct ProcessorRegistry {
    processors: HashMap<DbType, Arc<dyn DataSourceProcessor>>,
}

impl ProcessorRegistry {
    pub fn with_defaults(encoder: Arc<dyn PasswordEncoder>) -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(sqlserver::SqlServerDataSourceProcessor::new(encoder)));
        registry
    }

    pub fn register(&mut self, processor: Arc<dyn DataSourceProcessor>) {
        self.processors.insert(processor.db_type(), processor);
    }

    pub fn get(&self, db_type: DbType) -> Result<Arc<dyn DataSourceProcessor>> {
        self.processors
            .get(&db_type)
            .cloned()
            .ok_or_else(|| DatasourceError::UnsupportedDbType(db_type.to_string()))
    }
}

fn all_chars(value: &str, allowed: impl Fn(char) -> bool) -> bool {
    !value.is_empty() && value.chars().all(allowed)
}

pub(crate) fn check_host(host: &str) -> Result<()> {
    if all_chars(host, |c| c.is_ascii_alphanumeric() || "_-.,".contains(c)) {
        Ok(())
    } else {
        Err(DatasourceError::invalid("host", format!("illegal host `{}`", host)))
    }
}

pub(crate) fn check_port(port: u16) -> Result<()> {
    if port == 0 {
        return Err(DatasourceError::invalid("port", "port must be between 1 and 65535"));
    }
    Ok(())
}

pub(crate) fn check_database(database: &str) -> Result<()> {
    if all_chars(database, |c| c.is_ascii_alphanumeric() || "_-.".contains(c)) {
        Ok(())
    } else {
        Err(DatasourceError::invalid(
            "database",
            format!("illegal database name `{}`", database),
        ))
    }
}

pub(crate) fn check_other<'a>(other: impl IntoIterator<Item = (&'a String, &'a String)>) -> Result<()> {
    let legal = |s: &str| all_chars(s, |c| c.is_ascii_alphanumeric() || "-_/@.:".contains(c));
    for (key, value) in other {
        if !legal(key) || !legal(value) {
            return Err(DatasourceError::invalid(
                "other",
                format!("illegal property `{}={}`", key, value),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::password::PlainPasswordEncoder;

    #[test]
    fn test_db_type_from_str() {
        assert_eq!("SQLServer".parse::<DbType>().unwrap(), DbType::Sqlserver);
        assert_eq!("mssql".parse::<DbType>().unwrap(), DbType::Sqlserver);
        assert!(matches!(
            "sybase".parse::<DbType>(),
            Err(DatasourceError::UnsupportedDbType(_))
        ));
    }

    #[test]
    fn test_db_type_serde_tag() {
        assert_eq!(
            serde_json::to_string(&DbType::Sqlserver).unwrap(),
            "\"SQLSERVER\""
        );
    }

    #[test]
    fn test_registry_lookup() {
        let registry = ProcessorRegistry::with_defaults(Arc::new(PlainPasswordEncoder));
        let processor = registry.get(DbType::Sqlserver).unwrap();
        assert_eq!(processor.db_type(), DbType::Sqlserver);

        assert!(matches!(
            registry.get(DbType::Oracle),
            Err(DatasourceError::UnsupportedDbType(name)) if name == "oracle"
        ));
    }

    #[test]
    fn test_check_host() {
        assert!(check_host("localhost").is_ok());
        assert!(check_host("10.0.0.1").is_ok());
        assert!(check_host("db-1.internal,db-2.internal").is_ok());
        assert!(check_host("").is_err());
        assert!(check_host("evil;host").is_err());
    }

    #[test]
    fn test_check_database() {
        assert!(check_database("default").is_ok());
        assert!(check_database("sales.2024").is_ok());
        assert!(check_database("a b").is_err());
        assert!(check_database("x;drop").is_err());
    }

    #[test]
    fn test_check_other() {
        let mut other = indexmap::IndexMap::new();
        other.insert("serverTimezone".to_string(), "utc".to_string());
        assert!(check_other(&other).is_ok());

        other.insert("encrypt".to_string(), "true;integratedSecurity=true".to_string());
        assert!(matches!(
            check_other(&other),
            Err(DatasourceError::InvalidParam { field: "other", .. })
        ));
    }
}
