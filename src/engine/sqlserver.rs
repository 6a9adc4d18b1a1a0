use super::{DbEngine, DbSession};
use crate::datasource::param::ConnectionDescriptor;
use crate::error::Result;
use async_trait::async_trait;
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

pub struct SqlServerEngine;

/// Driver configuration for a stored descriptor. The JDBC URL carries host,
/// port, database and any extra properties; credentials are set separately.
pub fn session_config(descriptor: &ConnectionDescriptor, password: &str) -> Result<Config> {
    let mut config = Config::from_jdbc_string(&descriptor.jdbc_url)?;
    config.authentication(AuthMethod::sql_server(&descriptor.user, password));
    Ok(config)
}

#[async_trait]
impl DbEngine for SqlServerEngine {
    async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
        password: &str,
    ) -> Result<Box<dyn DbSession>> {
        let config = session_config(descriptor, password)?;
        let addr = config.get_addr();

        info!(address = %addr, database = %descriptor.database, "connecting to SQL Server");
        let tcp = TcpStream::connect(&addr).await?;
        tcp.set_nodelay(true)?;

        let client = Client::connect(config, tcp.compat_write()).await?;

        Ok(Box::new(SqlServerSession { client }))
    }
}

pub struct SqlServerSession {
    client: Client<Compat<TcpStream>>,
}

#[async_trait]
impl DbSession for SqlServerSession {
    async fn validate(&mut self, query: &str) -> Result<()> {
        let row = self.client.simple_query(query).await?.into_row().await?;
        debug!(query, returned_row = row.is_some(), "validation query finished");
        Ok(())
    }

    async fn execute(&mut self, sql: &str) -> Result<u64> {
        let result = self.client.execute(sql, &[]).await?;
        Ok(result.total())
    }
}
