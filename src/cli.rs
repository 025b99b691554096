//! Command line option parsing
//!
//! Options are described once, in the static [`OPTIONS`] table. The table is
//! turned into a clap [`Command`], which drives both the parser below and the
//! help renderer in [`crate::help`].

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::error::UsageError;

/// Prefix of every long option alias
pub const OPTION_MARKER: &str = "--";

/// Token after which every argument is positional
const END_OF_OPTIONS: &str = "--";

const PROGRAM: &str = "validate-json";
const FILES: &str = "files";

pub const SYNTAX: &str = "syntax";
pub const HELP: &str = "help";

/// Declarative description of a recognized option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Names accepted on the command line, without the option marker.
    /// The first alias is the canonical name.
    pub aliases: &'static [&'static str],
    /// One-line description shown in the help text
    pub description: &'static str,
    /// Whether the option consumes a value
    pub takes_value: bool,
}

impl OptionSpec {
    /// Canonical name of the option
    pub fn name(&self) -> &'static str {
        self.aliases[0]
    }

    fn to_arg(self) -> Arg {
        let arg = Arg::new(self.name())
            .long(self.name())
            .visible_aliases(self.aliases[1..].iter().copied())
            .help(self.description);

        if self.takes_value {
            arg.action(ArgAction::Set).value_parser(value_parser!(String))
        } else {
            arg.action(ArgAction::SetTrue)
        }
    }
}

/// Every option understood by `validate-json`
pub static OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        aliases: &[SYNTAX],
        description: "check the syntax of schema(s) given as argument(s)",
        takes_value: false,
    },
    OptionSpec {
        aliases: &[HELP],
        description: "show this help",
        takes_value: false,
    },
];

/// Option problems found by looking at each option token on its own
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Scan {
    help_requested: bool,
    /// Option names without their marker, in command line order
    unrecognized: Vec<String>,
}

/// Parser for an option table, backed by clap
#[derive(Debug, Clone, Copy)]
pub struct OptionParser {
    table: &'static [OptionSpec],
}

impl Default for OptionParser {
    fn default() -> Self {
        Self::new(OPTIONS)
    }
}

impl OptionParser {
    pub fn new(table: &'static [OptionSpec]) -> Self {
        Self { table }
    }

    /// clap command for the table.
    ///
    /// Built-in help and version flags are off, so `--help` is an ordinary
    /// flag of the table. Unique prefixes of long options are accepted and
    /// every positional operand is collected as a path.
    pub fn command(&self) -> Command {
        Command::new(PROGRAM)
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .infer_long_args(true)
            .args_override_self(true)
            .args(self.table.iter().map(|spec| spec.to_arg()))
            .arg(
                Arg::new(FILES)
                    .num_args(1..)
                    .action(ArgAction::Append)
                    .value_parser(value_parser!(PathBuf)),
            )
    }

    /// Parse the whole argument vector (program name excluded)
    pub fn parse(&self, args: &[OsString]) -> Result<ArgMatches, UsageError> {
        self.command()
            .try_get_matches_from(args)
            .map_err(|error| usage_error(&error))
    }

    /// Match every option token on its own, so that one bad option does not
    /// hide the next. Short clusters are looked at one character at a time.
    fn scan(&self, args: &[OsString]) -> Scan {
        let mut scan = Scan::default();
        let mut args = args.iter();

        while let Some(arg) = args.next() {
            let text = arg.to_string_lossy();
            if text == END_OF_OPTIONS {
                break;
            }
            if text == "-" || !text.starts_with('-') {
                continue;
            }

            for token in split_token(&text) {
                match self.command().try_get_matches_from([token.as_str()]) {
                    Ok(matches) => scan.help_requested |= flag(&matches, HELP),
                    Err(error) => match error.kind() {
                        ErrorKind::UnknownArgument => {
                            let name = option_name(&error).unwrap_or_else(|| strip_marker(&token));
                            scan.unrecognized.push(name);
                        }
                        // The option's value is the next token
                        ErrorKind::InvalidValue => {
                            args.next();
                        }
                        _ => {}
                    },
                }
            }
        }

        scan
    }
}

/// A long option stays whole; `-xy` is looked at as `-x` and `-y`
fn split_token(text: &str) -> Vec<String> {
    if text.starts_with(OPTION_MARKER) {
        vec![text.to_string()]
    } else {
        text.chars().skip(1).map(|c| format!("-{}", c)).collect()
    }
}

/// Option name without dashes or attached value
fn strip_marker(token: &str) -> String {
    let name = token.trim_start_matches('-');
    name.split_once('=').map_or(name, |(name, _)| name).to_string()
}

/// Name of the option a clap error is about. clap renders it as
/// `--name` or `--name <value>`.
fn option_name(error: &clap::Error) -> Option<String> {
    match error.get(ContextKind::InvalidArg)? {
        ContextValue::String(arg) => arg.split_whitespace().next().map(strip_marker),
        _ => None,
    }
}

fn usage_error(error: &clap::Error) -> UsageError {
    let option = || option_name(error).unwrap_or_default();
    match error.kind() {
        ErrorKind::UnknownArgument => UsageError::UnrecognizedOptions(vec![option()]),
        ErrorKind::TooManyValues => UsageError::UnexpectedValue { option: option() },
        ErrorKind::InvalidValue => UsageError::MissingValue { option: option() },
        kind => {
            let description = kind.as_str().unwrap_or("invalid command line");
            UsageError::Rejected(description.to_string())
        }
    }
}

/// Value of a flag, false when the table does not define it
fn flag(matches: &ArgMatches, id: &str) -> bool {
    matches
        .try_get_one::<bool>(id)
        .ok()
        .flatten()
        .copied()
        .unwrap_or(false)
}

fn files(matches: &ArgMatches) -> Vec<PathBuf> {
    matches
        .get_many::<PathBuf>(FILES)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Immutable view of one invocation's command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    syntax_mode: bool,
    help_requested: bool,
    positionals: Vec<PathBuf>,
}

impl OptionSet {
    /// Parse the arguments (program name excluded) against [`OPTIONS`].
    ///
    /// `--help` wins over every other problem: when it is present the parse
    /// succeeds with [`OptionSet::help_requested`] set, even if other tokens
    /// are invalid. Otherwise all unrecognized options are reported together.
    pub fn parse<I, S>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let parser = OptionParser::default();
        let scan = parser.scan(&args);

        if scan.help_requested {
            let matches = parser.parse(&args).ok();
            return Ok(Self {
                syntax_mode: matches.as_ref().is_some_and(|m| flag(m, SYNTAX)),
                help_requested: true,
                positionals: matches.as_ref().map(files).unwrap_or_default(),
            });
        }

        if !scan.unrecognized.is_empty() {
            return Err(UsageError::UnrecognizedOptions(scan.unrecognized));
        }

        let matches = parser.parse(&args)?;
        Ok(Self {
            syntax_mode: flag(&matches, SYNTAX),
            help_requested: false,
            positionals: files(&matches),
        })
    }

    pub fn syntax_mode(&self) -> bool {
        self.syntax_mode
    }

    pub fn help_requested(&self) -> bool {
        self.help_requested
    }

    /// File operands, in command line order
    pub fn positionals(&self) -> &[PathBuf] {
        &self.positionals
    }
}
