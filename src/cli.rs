use clap::{Args, Parser, Subcommand};
use datasquiel::datasource::password::DEFAULT_ENCRYPTION_SALT;
use indexmap::IndexMap;

#[derive(Parser, Debug)]
#[command(name = "datasquiel")]
#[command(
    about = "Datasource adapter: build connection params and split SQL scripts",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub encryption: EncryptionArgs,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct EncryptionArgs {
    /// Store passwords salted and base64 encoded
    #[arg(long, global = true, env = "DATASOURCE_ENCRYPTION_ENABLE")]
    pub encryption_enable: bool,

    /// Salt used when password encryption is enabled
    #[arg(
        long,
        global = true,
        env = "DATASOURCE_ENCRYPTION_SALT",
        hide_env_values = true,
        default_value = DEFAULT_ENCRYPTION_SALT
    )]
    pub encryption_salt: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a SQL script into statements with comments removed
    Split {
        /// Script file path (.sql or .sql.gz), or - for stdin
        #[arg(short, long)]
        input: String,

        /// Database type whose lexical rules apply
        #[arg(long, default_value = "sqlserver")]
        db_type: String,

        /// Fail on an unterminated string, identifier or block comment
        #[arg(long)]
        strict: bool,

        /// Print statements as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Build the stored connection descriptor for a datasource
    Params {
        #[arg(long)]
        host: String,

        #[arg(long)]
        port: u16,

        #[arg(long)]
        database: String,

        #[arg(short, long)]
        user: String,

        /// Plaintext password
        #[arg(long)]
        password: Option<String>,

        /// Environment variable containing the password
        #[arg(long)]
        password_env: Option<String>,

        /// Extra connection properties (key=value, comma-separated)
        #[arg(long, value_delimiter = ',')]
        other: Vec<String>,

        #[arg(long, default_value = "sqlserver")]
        db_type: String,
    },

    /// Open a connection and run the validation query
    Check {
        /// File containing the connection descriptor JSON
        #[arg(short, long)]
        connection: Option<String>,

        /// Environment variable containing the connection descriptor JSON
        #[arg(long)]
        connection_env: Option<String>,

        #[arg(long, default_value = "sqlserver")]
        db_type: String,
    },

    /// Split a script and execute its statements in order
    Run {
        /// File containing the connection descriptor JSON
        #[arg(short, long)]
        connection: Option<String>,

        /// Environment variable containing the connection descriptor JSON
        #[arg(long)]
        connection_env: Option<String>,

        /// Script file path (.sql or .sql.gz), or - for stdin
        #[arg(short, long)]
        input: String,

        #[arg(long, default_value = "sqlserver")]
        db_type: String,

        /// Refuse to run a script ending inside a string, identifier or block comment
        #[arg(long)]
        strict: bool,
    },
}

impl Commands {
    /// Get a value from either a direct argument or an environment variable
    pub fn get_optional(
        direct: &Option<String>,
        env_var: &Option<String>,
    ) -> anyhow::Result<Option<String>> {
        if let Some(value) = direct {
            Ok(Some(value.clone()))
        } else if let Some(env) = env_var {
            std::env::var(env)
                .map(Some)
                .map_err(|_| anyhow::anyhow!("Environment variable {} not found", env))
        } else {
            Ok(None)
        }
    }

    /// Connection descriptor JSON from a file or an environment variable
    pub fn get_connection_json(
        path: &Option<String>,
        env_var: &Option<String>,
    ) -> anyhow::Result<String> {
        if let Some(path) = path {
            std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read connection file {}: {}", path, e))
        } else if let Some(json) = Self::get_optional(&None, env_var)? {
            Ok(json)
        } else {
            Err(anyhow::anyhow!(
                "Either --connection or --connection-env must be provided"
            ))
        }
    }
}

/// Parse `key=value` pairs, keeping their order
pub fn parse_other(pairs: &[String]) -> anyhow::Result<IndexMap<String, String>> {
    let mut other = IndexMap::new();

    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Invalid property '{}'. Expected key=value", pair))?;
        other.insert(key.trim().to_string(), value.trim().to_string());
    }

    Ok(other)
}
