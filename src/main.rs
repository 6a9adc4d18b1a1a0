mod cli;
mod run;
mod script;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use datasquiel::datasource::param::{ConnectionDescriptor, ConnectionRequest};
use datasquiel::datasource::password::{encoder_from_settings, EncryptionSettings};
use datasquiel::datasource::ProcessorRegistry;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let settings = EncryptionSettings {
        enable: cli.encryption.encryption_enable,
        salt: cli.encryption.encryption_salt.clone(),
    };
    info!(encryption = settings.enable, "password encoding configured");
    let registry = ProcessorRegistry::with_defaults(encoder_from_settings(&settings));

    match cli.command {
        Commands::Split {
            input,
            db_type,
            strict,
            json,
        } => {
            let processor = registry.get(db_type.parse()?)?;
            let sql = script::read_script(&input)?;
            let statements = script::split_script(&*processor, &sql, strict)?;

            println!("{}", script::render_statements(&statements, json)?);
        }

        Commands::Params {
            host,
            port,
            database,
            user,
            password,
            password_env,
            other,
            db_type,
        } => {
            let processor = registry.get(db_type.parse()?)?;

            let request = ConnectionRequest {
                host,
                port,
                database,
                user_name: user,
                password: Commands::get_optional(&password, &password_env)?.unwrap_or_default(),
                other: cli::parse_other(&other)?,
            };

            processor
                .check_params(&request)
                .context("Invalid datasource parameters")?;
            let descriptor = processor.create_connection_params(&request)?;

            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }

        Commands::Check {
            connection,
            connection_env,
            db_type,
        } => {
            let processor = registry.get(db_type.parse()?)?;
            let json = Commands::get_connection_json(&connection, &connection_env)?;
            let descriptor =
                ConnectionDescriptor::from_json(&json).context("Malformed connection descriptor")?;

            run::check(&*processor, &descriptor).await?;
        }

        Commands::Run {
            connection,
            connection_env,
            input,
            db_type,
            strict,
        } => {
            let processor = registry.get(db_type.parse()?)?;
            let json = Commands::get_connection_json(&connection, &connection_env)?;
            let descriptor =
                ConnectionDescriptor::from_json(&json).context("Malformed connection descriptor")?;

            let opts = run::RunOptions { strict };

            run::run(&*processor, &descriptor, &input, opts).await?;
        }
    }

    Ok(())
}
