use std::path::PathBuf;

use crate::cli::OptionSet;
use crate::error::UsageError;

/// What the invocation checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every file is a candidate schema whose structure is checked
    SyntaxOnly,
    /// The first file is a schema, the others are instances validated against it
    FullValidation,
}

impl Mode {
    /// Minimum number of file operands the mode needs
    pub fn required_args(self) -> usize {
        match self {
            Mode::SyntaxOnly => 1,
            Mode::FullValidation => 2,
        }
    }
}

impl From<&OptionSet> for Mode {
    fn from(options: &OptionSet) -> Self {
        if options.syntax_mode() {
            Mode::SyntaxOnly
        } else {
            Mode::FullValidation
        }
    }
}

/// Files to process, grouped by the role they play
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    Syntax { schemas: Vec<PathBuf> },
    Instances { schema: PathBuf, instances: Vec<PathBuf> },
}

impl InputSpec {
    /// Check the operand count for the selected mode and assign roles.
    ///
    /// Runs before any file is opened, so a malformed invocation does no work.
    pub fn resolve(options: &OptionSet) -> Result<Self, UsageError> {
        let mode = Mode::from(options);
        let args = options.positionals();

        if args.len() < mode.required_args() {
            return Err(UsageError::MissingArguments);
        }

        let spec = match mode {
            Mode::SyntaxOnly => InputSpec::Syntax {
                schemas: args.to_vec(),
            },
            Mode::FullValidation => InputSpec::Instances {
                schema: args[0].clone(),
                instances: args[1..].to_vec(),
            },
        };
        Ok(spec)
    }

    pub fn mode(&self) -> Mode {
        match self {
            InputSpec::Syntax { .. } => Mode::SyntaxOnly,
            InputSpec::Instances { .. } => Mode::FullValidation,
        }
    }

    /// Number of files the run reads, the shared schema included
    pub fn input_count(&self) -> usize {
        match self {
            InputSpec::Syntax { schemas } => schemas.len(),
            InputSpec::Instances { instances, .. } => instances.len() + 1,
        }
    }
}
