pub mod dialect;
pub mod sqlserver;

use crate::datasource::param::ConnectionDescriptor;
use crate::datasource::DbType;
use crate::error::{DatasourceError, Result};
use async_trait::async_trait;

/// Database engine trait for provider abstraction
#[async_trait]
pub trait DbEngine: Send + Sync {
    /// Open a session from a stored descriptor and the decoded password
    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
        password: &str,
    ) -> Result<Box<dyn DbSession>>;
}

/// Active database session for executing statements
#[async_trait]
pub trait DbSession: Send {
    /// Run the validation query against the session
    async fn validate(&mut self, query: &str) -> Result<()>;

    /// Execute one statement, returning the affected row count
    async fn execute(&mut self, sql: &str) -> Result<u64>;
}

/// Factory for creating database engines
pub fn create_engine(db_type: DbType) -> Result<Box<dyn DbEngine>> {
    match db_type {
        DbType::Sqlserver => Ok(Box::new(sqlserver::SqlServerEngine)),
        other => Err(DatasourceError::UnsupportedDbType(other.to_string())),
    }
}
