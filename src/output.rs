//! Report output and exit codes
//!
//! This module prints the outcome of every input and reduces all outcomes to
//! the single exit code of the process.

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use crate::config::{OutputConfig, ReportFormat};
use crate::report::{Report, ReportMessage};
use crate::validator::{InputOutcome, ValidationOutcome};

/// Exit status of `validate-json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExitCode {
    /// Every input validated
    Success,
    /// At least one input failed validation
    ValidationFailure,
    /// An exception occurred; its message is on standard error
    Exception,
    /// Command line syntax error
    CommandLine,
}

impl ExitCode {
    pub fn code(self) -> u8 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Exception => 1,
            ExitCode::CommandLine => 2,
            ExitCode::ValidationFailure => 100,
        }
    }

    /// Exit code of a run that reached the dispatcher.
    ///
    /// An exception outranks a reported failure, which outranks success;
    /// the order of the outcomes does not matter.
    pub fn from_outcomes(outcomes: &[InputOutcome]) -> Self {
        outcomes
            .iter()
            .map(|input| match input.outcome {
                ValidationOutcome::Success(_) => ExitCode::Success,
                ValidationOutcome::ReportedFailure(_) => ExitCode::ValidationFailure,
                ValidationOutcome::EngineException(_) => ExitCode::Exception,
            })
            .max()
            .unwrap_or(ExitCode::Success)
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: String,
    success: bool,
    messages: &'a [ReportMessage],
}

/// Writes reports to standard output and exceptions to standard error
pub struct Output {
    format: ReportFormat,
    show_colors: bool,
}

impl Output {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            format: config.format,
            show_colors: config.color.enabled(),
        }
    }

    /// Plain text output, never coloured
    pub fn plain(format: ReportFormat) -> Self {
        Self {
            format,
            show_colors: false,
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    /// Text block printed for one report
    pub fn format_report(&self, input: &InputOutcome, report: &Report) -> io::Result<String> {
        let path = input.path.display();
        match self.format {
            ReportFormat::Text => {
                let text = report.to_string();
                if !self.show_colors {
                    return Ok(format!("{}: {}", path, text));
                }
                let color = if report.is_success() { "32" } else { "31" };
                let rest = &text[report.status().len()..];
                Ok(format!(
                    "{}: {}{}",
                    path,
                    self.colorize(report.status(), color),
                    rest
                ))
            }
            ReportFormat::Json => {
                let json = JsonReport {
                    file: path.to_string(),
                    success: report.is_success(),
                    messages: report.messages(),
                };
                serde_json::to_string(&json).map_err(io::Error::other)
            }
        }
    }

    /// Print every outcome in input order and compute the exit code.
    ///
    /// Reports go to `out`, exception messages to `err`.
    pub fn emit(
        &self,
        outcomes: &[InputOutcome],
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<ExitCode> {
        for input in outcomes {
            match &input.outcome {
                ValidationOutcome::Success(report) | ValidationOutcome::ReportedFailure(report) => {
                    writeln!(out, "{}", self.format_report(input, report)?)?;
                }
                ValidationOutcome::EngineException(error) => {
                    writeln!(err, "{}: {}", input.path.display(), error)?;
                }
            }
        }
        out.flush()?;
        err.flush()?;

        Ok(ExitCode::from_outcomes(outcomes))
    }
}
