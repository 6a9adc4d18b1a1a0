use crate::engine::dialect::SqlDialect;

#[derive(Debug)]
pub struct SqlServerDialect;

pub static SQLSERVER_DIALECT: SqlServerDialect = SqlServerDialect;

impl SqlDialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "SQL Server"
    }

    fn identifier_quotes(&self) -> Option<(char, char)> {
        Some(('[', ']'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlserver_lexical_conventions() {
        assert_eq!(SQLSERVER_DIALECT.statement_delimiter(), ';');
        assert_eq!(SQLSERVER_DIALECT.identifier_quotes(), Some(('[', ']')));
    }
}
