//! Validation dispatcher
//!
//! Runs the schema engine over every input of an [`InputSpec`], strictly in
//! command line order, and records one [`ValidationOutcome`] per input. A
//! failing input never stops the batch: its error is recorded and the next
//! input is processed.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::engine::SchemaEngine;
use crate::error::EngineError;
use crate::loader::DocumentLoader;
use crate::mode::InputSpec;
use crate::report::Report;

/// What happened to one input
#[derive(Debug)]
pub enum ValidationOutcome {
    /// The engine produced a successful report
    Success(Report),
    /// The engine produced a report whose success flag is false
    ReportedFailure(Report),
    /// Loading the document or running the engine failed
    EngineException(EngineError),
}

impl ValidationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationOutcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ValidationOutcome::ReportedFailure(_))
    }

    pub fn is_exception(&self) -> bool {
        matches!(self, ValidationOutcome::EngineException(_))
    }

    /// Report produced by the engine, if it got that far
    pub fn report(&self) -> Option<&Report> {
        match self {
            ValidationOutcome::Success(report) | ValidationOutcome::ReportedFailure(report) => {
                Some(report)
            }
            ValidationOutcome::EngineException(_) => None,
        }
    }
}

impl From<Report> for ValidationOutcome {
    fn from(report: Report) -> Self {
        if report.is_success() {
            ValidationOutcome::Success(report)
        } else {
            ValidationOutcome::ReportedFailure(report)
        }
    }
}

impl From<Result<Report, EngineError>> for ValidationOutcome {
    fn from(result: Result<Report, EngineError>) -> Self {
        match result {
            Ok(report) => report.into(),
            Err(error) => ValidationOutcome::EngineException(error),
        }
    }
}

/// Outcome of one input, tagged with the file it came from
#[derive(Debug)]
pub struct InputOutcome {
    pub path: PathBuf,
    pub outcome: ValidationOutcome,
}

impl InputOutcome {
    pub fn new(path: impl Into<PathBuf>, outcome: impl Into<ValidationOutcome>) -> Self {
        Self {
            path: path.into(),
            outcome: outcome.into(),
        }
    }
}

/// Drives a [`SchemaEngine`] over the inputs of one invocation
pub struct Dispatcher<'a, E: SchemaEngine + ?Sized> {
    engine: &'a E,
    loader: DocumentLoader,
}

impl<'a, E: SchemaEngine + ?Sized> Dispatcher<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self {
            engine,
            loader: DocumentLoader::new(),
        }
    }

    /// Process every input and return the outcomes in input order
    pub async fn run(&self, inputs: &InputSpec) -> Vec<InputOutcome> {
        info!(mode = ?inputs.mode(), files = inputs.input_count(), "dispatching validation");
        let mut outcomes = Vec::with_capacity(inputs.input_count());
        match inputs {
            InputSpec::Syntax { schemas } => self.check_syntax_all(schemas, &mut outcomes).await,
            InputSpec::Instances { schema, instances } => {
                self.validate_instances(schema, instances, &mut outcomes).await
            }
        }

        debug!(
            inputs = outcomes.len(),
            failures = outcomes.iter().filter(|o| o.outcome.is_failure()).count(),
            exceptions = outcomes.iter().filter(|o| o.outcome.is_exception()).count(),
            "dispatch complete"
        );
        outcomes
    }

    async fn check_syntax_all(&self, schemas: &[PathBuf], outcomes: &mut Vec<InputOutcome>) {
        for path in schemas {
            let result = self.check_syntax(path).await;
            if let Err(error) = &result {
                warn!(path = %path.display(), %error, "syntax check aborted");
            }
            outcomes.push(InputOutcome::new(path, result));
        }
    }

    async fn check_syntax(&self, path: &Path) -> Result<Report, EngineError> {
        let document = self.loader.load(path).await?;
        self.engine.check_syntax(&document)
    }

    /// A schema that cannot be loaded or compiled is the only outcome recorded
    async fn validate_instances(
        &self,
        schema_path: &Path,
        instances: &[PathBuf],
        outcomes: &mut Vec<InputOutcome>,
    ) {
        let schema = match self.loader.load(schema_path).await {
            Ok(document) => document,
            Err(error) => {
                warn!(path = %schema_path.display(), %error, "cannot load schema");
                outcomes.push(InputOutcome::new(
                    schema_path,
                    ValidationOutcome::EngineException(error),
                ));
                return;
            }
        };

        let compiled = match self.engine.compile(&schema) {
            Ok(compiled) => compiled,
            Err(error) => {
                warn!(path = %schema_path.display(), %error, "cannot compile schema");
                outcomes.push(InputOutcome::new(
                    schema_path,
                    ValidationOutcome::EngineException(error),
                ));
                return;
            }
        };
        // The schema document is no longer needed once compiled
        drop(schema);

        for path in instances {
            let outcome = match self.loader.load(path).await {
                Ok(instance) => ValidationOutcome::from(compiled.validate(&instance)),
                Err(error) => {
                    warn!(path = %path.display(), %error, "cannot load instance");
                    ValidationOutcome::EngineException(error)
                }
            };
            outcomes.push(InputOutcome::new(path, outcome));
        }
    }
}
