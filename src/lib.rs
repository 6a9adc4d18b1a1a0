//! SQL Server datasource adapter for a workflow scheduler.
//!
//! Two capabilities make up the adapter: turning user connection settings
//! into a stored JDBC descriptor ([`datasource`]), and splitting SQL scripts
//! into executable statements with comments removed ([`util::splitter`]).

pub mod datasource;
pub mod engine;
pub mod error;
pub mod util;
