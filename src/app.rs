//! Application driver
//!
//! Ties the stages of one invocation together: parse, resolve, configure,
//! dispatch, print. Standard output and standard error are passed in so the
//! whole flow can be exercised in memory.

use std::ffi::OsString;
use std::io::{self, Write};

use anyhow::Context;
use tracing::{debug, error};

use crate::cli::OptionSet;
use crate::config::{Config, ConfigManager};
use crate::engine::{JsonSchemaEngine, SchemaEngine};
use crate::error::UsageError;
use crate::help::HelpFormatter;
use crate::mode::InputSpec;
use crate::output::{ExitCode, Output};
use crate::validator::Dispatcher;

/// What the command line asks for, once it has been checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Validate(InputSpec),
}

/// Parse and resolve the arguments (program name excluded).
///
/// Touches neither the filesystem nor the engine.
pub fn prepare<I, S>(args: I) -> Result<Invocation, UsageError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let options = OptionSet::parse(args)?;
    if options.help_requested() {
        return Ok(Invocation::Help);
    }
    Ok(Invocation::Validate(InputSpec::resolve(&options)?))
}

/// Run one invocation with configuration loaded from files and environment
pub async fn run<I, S>(args: I, out: &mut impl Write, err: &mut impl Write) -> ExitCode
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let help = HelpFormatter::default();
    let inputs = match resolve_invocation(args, &help, out, err) {
        Ok(Some(inputs)) => inputs,
        Ok(None) => return ExitCode::Success,
        Err(code) => return code,
    };

    let config = match ConfigManager::load_config()
        .await
        .context("cannot load configuration")
    {
        Ok(config) => config,
        Err(e) => return report_exception(&e, err),
    };

    let engine = JsonSchemaEngine::new(&config.engine);
    execute(&engine, &config, &inputs, out, err).await
}

/// Run one invocation with an explicit configuration and engine
pub async fn run_with<I, S, E>(
    args: I,
    config: &Config,
    engine: &E,
    out: &mut impl Write,
    err: &mut impl Write,
) -> ExitCode
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    E: SchemaEngine + ?Sized,
{
    let help = HelpFormatter::default();
    match resolve_invocation(args, &help, out, err) {
        Ok(Some(inputs)) => execute(engine, config, &inputs, out, err).await,
        Ok(None) => ExitCode::Success,
        Err(code) => code,
    }
}

/// Handle help and usage errors. `Ok(None)` means help was printed.
fn resolve_invocation<I, S>(
    args: I,
    help: &HelpFormatter,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<Option<InputSpec>, ExitCode>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    match prepare(args) {
        Ok(Invocation::Help) => write_help(help, out)
            .map(|()| None)
            .map_err(|e| report_exception(&e.into(), err)),
        Ok(Invocation::Validate(inputs)) => Ok(Some(inputs)),
        Err(usage) => {
            debug!(%usage, "usage error");
            let written = writeln!(err, "{}", usage).and_then(|()| write_help(help, err));
            if let Err(e) = written {
                error!(error = %e, "cannot write usage message");
            }
            Err(ExitCode::CommandLine)
        }
    }
}

async fn execute<E>(
    engine: &E,
    config: &Config,
    inputs: &InputSpec,
    out: &mut impl Write,
    err: &mut impl Write,
) -> ExitCode
where
    E: SchemaEngine + ?Sized,
{
    let outcomes = Dispatcher::new(engine).run(inputs).await;
    let output = Output::new(&config.output);

    match output.emit(&outcomes, out, err) {
        Ok(code) => code,
        Err(e) => report_exception(&anyhow::Error::new(e).context("cannot write reports"), err),
    }
}

fn write_help(help: &HelpFormatter, sink: &mut impl Write) -> io::Result<()> {
    sink.write_all(help.render().as_bytes())?;
    sink.flush()
}

/// Best-effort report of an error that escaped the per-input handling
fn report_exception(e: &anyhow::Error, err: &mut impl Write) -> ExitCode {
    error!(error = %e, "aborting");
    // Nothing else to do if standard error itself is gone
    let _ = writeln!(err, "error: {:#}", e);
    ExitCode::Exception
}
