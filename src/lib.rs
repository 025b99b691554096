//! # validate-json Library
//!
//! Command line validation of JSON documents against JSON Schemas. The
//! library holds every stage of `validate-json`: option parsing, help text,
//! mode resolution, document loading, the schema engine, dispatch and
//! exit-code mapping.

pub mod app;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod help;
pub mod loader;
pub mod mode;
pub mod output;
pub mod report;
pub mod validator;

pub use app::{Invocation, prepare, run, run_with};
pub use cli::{OptionParser, OptionSet, OptionSpec};
pub use config::{
    ColorChoice, Config, ConfigError, ConfigManager, EngineConfig, OutputConfig, ReportFormat,
};
pub use engine::{CompiledSchema, DraftVersion, JsonSchemaEngine, SchemaEngine};
pub use error::{EngineError, UsageError};
pub use help::HelpFormatter;
pub use loader::DocumentLoader;
pub use mode::{InputSpec, Mode};
pub use output::{ExitCode, Output};
pub use report::{LogLevel, Report, ReportMessage};
pub use validator::{Dispatcher, InputOutcome, ValidationOutcome};
