//! SQL Server adapter.

use super::{
    check_database, check_host, check_other, check_port, DataSourceProcessor, DbType,
    VendorMetadata,
};
use crate::datasource::param::{ConnectionDescriptor, ConnectionRequest};
use crate::datasource::password::PasswordEncoder;
use crate::engine::dialect::SqlDialect;
use crate::error::{DatasourceError, Result};
use crate::util::dialects::sqlserver::SQLSERVER_DIALECT;
use std::sync::Arc;

pub struct SqlServerDataSourceProcessor {
    encoder: Arc<dyn PasswordEncoder>,
}

impl SqlServerDataSourceProcessor {
    pub const METADATA: VendorMetadata = VendorMetadata {
        db_type: DbType::Sqlserver,
        driver_class: "com.microsoft.sqlserver.jdbc.SQLServerDriver",
        validation_query: "select 1",
        jdbc_scheme: "jdbc:sqlserver://",
    };

    pub fn new(encoder: Arc<dyn PasswordEncoder>) -> Self {
        Self { encoder }
    }
}

impl DataSourceProcessor for SqlServerDataSourceProcessor {
    fn metadata(&self) -> &'static VendorMetadata {
        &Self::METADATA
    }

    fn dialect(&self) -> &'static dyn SqlDialect {
        &SQLSERVER_DIALECT
    }

    fn check_params(&self, request: &ConnectionRequest) -> Result<()> {
        check_host(&request.host)?;
        check_port(request.port)?;
        check_database(&request.database)?;
        check_other(&request.other)
    }

    fn create_connection_params(&self, request: &ConnectionRequest) -> Result<ConnectionDescriptor> {
        let address = format!("{}{}:{}", Self::METADATA.jdbc_scheme, request.host, request.port);

        let mut jdbc_url = format!("{};databaseName={}", address, request.database);
        for (key, value) in &request.other {
            jdbc_url.push(';');
            jdbc_url.push_str(key);
            jdbc_url.push('=');
            jdbc_url.push_str(value);
        }

        Ok(ConnectionDescriptor {
            user: request.user_name.clone(),
            password: self.encoder.encode(&request.password)?,
            address,
            database: request.database.clone(),
            jdbc_url,
            other: request.other.clone(),
        })
    }

    fn create_request(&self, descriptor: &ConnectionDescriptor) -> Result<ConnectionRequest> {
        let authority = descriptor
            .address
            .rsplit("//")
            .next()
            .unwrap_or_default();
        let first_host = authority.split(',').next().unwrap_or_default();
        let (host, port) = first_host
            .rsplit_once(':')
            .ok_or_else(|| {
                DatasourceError::invalid("address", format!("no port in `{}`", descriptor.address))
            })?;
        let port = port.parse::<u16>().map_err(|e| {
            DatasourceError::invalid("address", format!("bad port `{}`: {}", port, e))
        })?;

        Ok(ConnectionRequest {
            host: host.to_string(),
            port,
            database: descriptor.database.clone(),
            user_name: descriptor.user.clone(),
            password: self.decode_password(descriptor)?,
            other: descriptor.other.clone(),
        })
    }

    fn decode_password(&self, descriptor: &ConnectionDescriptor) -> Result<String> {
        self.encoder.decode(&descriptor.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::password::{PlainPasswordEncoder, SaltedBase64Encoder};
    use indexmap::IndexMap;

    /// Stands in for the platform's secret store.
    struct FixedEncoder;

    impl PasswordEncoder for FixedEncoder {
        fn encode(&self, _plaintext: &str) -> Result<String> {
            Ok("test".to_string())
        }

        fn decode(&self, _encoded: &str) -> Result<String> {
            Ok("123456".to_string())
        }
    }

    struct FailingEncoder;

    impl PasswordEncoder for FailingEncoder {
        fn encode(&self, _plaintext: &str) -> Result<String> {
            Err(DatasourceError::PasswordEncode("secret store unavailable".into()))
        }

        fn decode(&self, _encoded: &str) -> Result<String> {
            Err(DatasourceError::PasswordDecode("secret store unavailable".into()))
        }
    }

    fn request(other: &[(&str, &str)]) -> ConnectionRequest {
        ConnectionRequest {
            host: "localhost".into(),
            port: 1234,
            database: "default".into(),
            user_name: "root".into(),
            password: "123456".into(),
            other: other
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<IndexMap<_, _>>(),
        }
    }

    fn processor(encoder: impl PasswordEncoder + 'static) -> SqlServerDataSourceProcessor {
        SqlServerDataSourceProcessor::new(Arc::new(encoder))
    }

    #[test]
    fn test_create_connection_params() {
        let descriptor = processor(FixedEncoder)
            .create_connection_params(&request(&[]))
            .unwrap();

        assert_eq!(descriptor.address, "jdbc:sqlserver://localhost:1234");
        assert_eq!(
            descriptor.jdbc_url,
            "jdbc:sqlserver://localhost:1234;databaseName=default"
        );
        assert_eq!(descriptor.user, "root");
        assert_eq!(descriptor.password, "test");
        assert_eq!(descriptor.database, "default");
        assert!(descriptor.jdbc_url.starts_with(&descriptor.address));
    }

    #[test]
    fn test_extra_properties_appended_in_insertion_order() {
        let descriptor = processor(FixedEncoder)
            .create_connection_params(&request(&[("serverTimezone", "utc"), ("encrypt", "false")]))
            .unwrap();

        assert_eq!(
            descriptor.jdbc_url,
            "jdbc:sqlserver://localhost:1234;databaseName=default;serverTimezone=utc;encrypt=false"
        );
        assert!(descriptor.jdbc_url.starts_with(&descriptor.address));
    }

    #[test]
    fn test_encoder_failure_propagates() {
        let err = processor(FailingEncoder)
            .create_connection_params(&request(&[]))
            .unwrap_err();
        assert!(matches!(err, DatasourceError::PasswordEncode(msg) if msg == "secret store unavailable"));
    }

    #[test]
    fn test_password_is_encoded() {
        let descriptor = processor(SaltedBase64Encoder::new("!@#$%^&*"))
            .create_connection_params(&request(&[]))
            .unwrap();
        assert_eq!(descriptor.password, "IUAjJCVeJipNVEl6TkRVMg==");
    }

    #[test]
    fn test_create_request_reverses_descriptor() {
        let processor = processor(SaltedBase64Encoder::new("salt"));
        let original = request(&[("serverTimezone", "utc")]);
        let descriptor = processor.create_connection_params(&original).unwrap();

        assert_eq!(processor.create_request(&descriptor).unwrap(), original);
    }

    #[test]
    fn test_create_request_from_stored_json() {
        let descriptor = ConnectionDescriptor::from_json(
            r#"{"user":"root","password":"123456","address":"jdbc:sqlserver://localhost:1234","database":"default","jdbcUrl":"jdbc:sqlserver://localhost:1234;databaseName=default"}"#,
        )
        .unwrap();
        let request = processor(PlainPasswordEncoder)
            .create_request(&descriptor)
            .unwrap();

        assert_eq!(request.host, "localhost");
        assert_eq!(request.port, 1234);
        assert_eq!(request.user_name, "root");
        assert_eq!(request.password, "123456");
    }

    #[test]
    fn test_create_request_rejects_address_without_port() {
        let descriptor = ConnectionDescriptor {
            address: "jdbc:sqlserver://localhost".into(),
            ..Default::default()
        };
        assert!(matches!(
            processor(PlainPasswordEncoder).create_request(&descriptor),
            Err(DatasourceError::InvalidParam { field: "address", .. })
        ));
    }

    #[test]
    fn test_vendor_metadata() {
        let processor = processor(PlainPasswordEncoder);
        assert_eq!(
            processor.driver_class(),
            "com.microsoft.sqlserver.jdbc.SQLServerDriver"
        );
        assert_eq!(processor.db_type(), DbType::Sqlserver);
        assert_eq!(processor.validation_query(), "select 1");
    }

    #[test]
    fn test_jdbc_url_is_pass_through() {
        let descriptor = ConnectionDescriptor {
            jdbc_url: "jdbc:sqlserver://localhost:1234;databaseName=default".into(),
            ..Default::default()
        };
        assert_eq!(
            processor(PlainPasswordEncoder).jdbc_url(&descriptor),
            "jdbc:sqlserver://localhost:1234;databaseName=default"
        );
    }

    #[test]
    fn test_unique_id() {
        let descriptor = processor(FixedEncoder)
            .create_connection_params(&request(&[]))
            .unwrap();
        assert_eq!(
            processor(FixedEncoder).unique_id(&descriptor),
            "sqlserver@root@jdbc:sqlserver://localhost:1234;databaseName=default"
        );
    }

    #[test]
    fn test_check_params() {
        let processor = processor(PlainPasswordEncoder);
        assert!(processor.check_params(&request(&[("serverTimezone", "utc")])).is_ok());

        let mut bad = request(&[]);
        bad.port = 0;
        assert!(matches!(
            processor.check_params(&bad),
            Err(DatasourceError::InvalidParam { field: "port", .. })
        ));

        let mut bad = request(&[]);
        bad.host = "localhost;user=sa".into();
        assert!(matches!(
            processor.check_params(&bad),
            Err(DatasourceError::InvalidParam { field: "host", .. })
        ));
    }

    #[test]
    fn test_split_and_remove_comment() {
        let statements = processor(PlainPasswordEncoder)
            .split_and_remove_comment("-- setup\nselect * from table;\n/* done */");
        assert_eq!(statements, vec!["select * from table;"]);
    }
}
