/// Lexical conventions a dialect contributes to script splitting.
pub trait SqlDialect: Send + Sync {
    /// Dialect display name (used in logs).
    fn name(&self) -> &'static str;

    /// Character terminating a statement at the lexical top level.
    fn statement_delimiter(&self) -> char {
        ';'
    }

    /// Opening and closing characters of the delimited-identifier syntax,
    /// when the dialect has one besides double quotes.
    fn identifier_quotes(&self) -> Option<(char, char)>;
}
