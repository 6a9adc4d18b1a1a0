use anyhow::{Context, Result};
use datasquiel::datasource::DataSourceProcessor;
use datasquiel::util::splitter;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};

/// Read a whole script from a file, a gzip file, or stdin (`-`)
pub fn read_script(input_path: &str) -> Result<String> {
    let reader: Box<dyn Read> = if input_path == "-" {
        Box::new(io::stdin())
    } else if input_path.ends_with(".gz") {
        Box::new(GzDecoder::new(open_script(input_path)?))
    } else {
        Box::new(open_script(input_path)?)
    };

    let mut script = String::new();
    BufReader::new(reader)
        .read_to_string(&mut script)
        .with_context(|| format!("Failed to read script from {}", input_path))?;
    Ok(script)
}

fn open_script(input_path: &str) -> Result<File> {
    File::open(input_path).with_context(|| format!("Failed to open script {}", input_path))
}

/// Split with the processor's dialect, optionally rejecting unterminated regions
pub fn split_script(
    processor: &dyn DataSourceProcessor,
    script: &str,
    strict: bool,
) -> Result<Vec<String>> {
    if strict {
        splitter::split_strict(script, processor.dialect())
            .context("Script ends inside an unterminated region")
    } else {
        Ok(processor.split_and_remove_comment(script))
    }
}

pub fn render_statements(statements: &[String], json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(statements)?);
    }
    Ok(statements.join("\n\n"))
}
