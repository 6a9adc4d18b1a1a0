pub mod sqlserver;
