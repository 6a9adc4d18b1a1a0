use crate::script::{read_script, split_script};
use anyhow::{Context, Result};
use datasquiel::datasource::param::ConnectionDescriptor;
use datasquiel::datasource::DataSourceProcessor;
use datasquiel::engine::{create_engine, DbSession};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

pub struct RunOptions {
    pub strict: bool,
}

async fn open_session(
    processor: &dyn DataSourceProcessor,
    descriptor: &ConnectionDescriptor,
) -> Result<Box<dyn DbSession>> {
    let engine = create_engine(processor.db_type())?;
    let password = processor
        .decode_password(descriptor)
        .context("Failed to decode stored password")?;

    engine
        .connect(descriptor, &password)
        .await
        .with_context(|| format!("Failed to connect to {}", descriptor.address))
}

/// Open a session and run the vendor's validation query
pub async fn check(
    processor: &dyn DataSourceProcessor,
    descriptor: &ConnectionDescriptor,
) -> Result<()> {
    let mut session = open_session(processor, descriptor).await?;

    session
        .validate(processor.validation_query())
        .await
        .context("Validation query failed")?;

    println!("Connection to {} is valid", descriptor.address);
    Ok(())
}

pub async fn run(
    processor: &dyn DataSourceProcessor,
    descriptor: &ConnectionDescriptor,
    input_path: &str,
    opts: RunOptions,
) -> Result<()> {
    let script = read_script(input_path)?;
    let statements = split_script(processor, &script, opts.strict)?;
    info!(path = input_path, statements = statements.len(), "script split");

    let mut session = open_session(processor, descriptor).await?;

    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);

    let affected = execute_statements(&mut *session, &statements, &progress).await;
    progress.finish_and_clear();
    let affected = affected?;

    println!(
        "Executed {} statements ({} rows affected)",
        statements.len(),
        affected
    );
    Ok(())
}

/// Execute statements in order, stopping at the first failure
pub async fn execute_statements(
    session: &mut dyn DbSession,
    statements: &[String],
    progress: &ProgressBar,
) -> Result<u64> {
    let mut affected = 0u64;

    for (idx, statement) in statements.iter().enumerate() {
        progress.set_message(format!("[{}/{}] executing...", idx + 1, statements.len()));

        affected += session
            .execute(statement)
            .await
            .with_context(|| format!("Failed to execute statement {}: {}", idx + 1, statement))?;
    }

    Ok(affected)
}
