use std::fs;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use steptrace::{trace, EngineConfig, EngineError, ToolchainValidator, Validate};

/// CLI driver: validate a source file with the native toolchain, trace it,
/// and print the state sequence as JSON.
///
/// Usage: `steptrace [--no-validate] [--compact] <file.cpp>`
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(engine) = err.downcast_ref::<EngineError>() {
                eprintln!("{}", engine.code());
                if let Some(details) = engine.details() {
                    eprintln!("{}", details.trim_end());
                }
            } else {
                eprintln!("error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let mut validate = true;
    let mut compact = false;
    let mut path = None;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--no-validate" => validate = false,
            "--compact" => compact = true,
            "--help" | "-h" => {
                println!("usage: steptrace [--no-validate] [--compact] <file.cpp>");
                return Ok(());
            }
            other if other.starts_with('-') => bail!("unknown option '{}'", other),
            other => path = Some(other.to_string()),
        }
    }
    let Some(path) = path else {
        bail!("usage: steptrace [--no-validate] [--compact] <file.cpp>");
    };

    let source =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path))?;

    let config = EngineConfig::from_env();
    if validate {
        ToolchainValidator::new(config.validator.clone()).validate(&source)?;
    }

    let states = trace(&source, &config.limits);
    let rendered = if compact {
        serde_json::to_string(&states)?
    } else {
        serde_json::to_string_pretty(&states)?
    };
    println!("{}", rendered);
    Ok(())
}
