//! Usage text
//!
//! The help text is part of the documented interface of the tool: its layout
//! is fixed and covered by exact-match tests.

use clap::{Arg, Command};

use crate::cli::{OPTION_MARKER, OptionParser};

pub const HELP_PREAMBLE: &str = "Syntax: validate-json [options] file [file...]";

const EXIT_CODE_LINES: [&str; 4] = [
    "\t0: validation successful;",
    "\t1: exception occurred (appears on stderr)",
    "\t2: command line syntax error (missing argument, etc)",
    "\t100: one or more file(s) failed validation",
];

/// Line terminator of the host platform
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Renders the usage text from a command's options
#[derive(Debug, Clone)]
pub struct HelpFormatter {
    line_separator: String,
    alias_joiner: String,
}

impl Default for HelpFormatter {
    fn default() -> Self {
        Self::new(LINE_SEPARATOR, ", ")
    }
}

impl HelpFormatter {
    pub fn new(line_separator: impl Into<String>, alias_joiner: impl Into<String>) -> Self {
        Self {
            line_separator: line_separator.into(),
            alias_joiner: alias_joiner.into(),
        }
    }

    /// Help text for the options `validate-json` understands
    pub fn render(&self) -> String {
        self.format(&OptionParser::default().command())
    }

    /// Help text for the long options of a command, sorted by canonical
    /// name. Every line, the last one included, ends with the line separator.
    pub fn format(&self, command: &Command) -> String {
        let mut options: Vec<&Arg> = command
            .get_arguments()
            .filter(|arg| arg.get_long().is_some())
            .collect();
        options.sort_by(|a, b| a.get_long().cmp(&b.get_long()));

        let mut lines = vec![HELP_PREAMBLE.to_string(), String::new(), "Options:".to_string()];
        lines.extend(options.iter().map(|arg| {
            let description = arg.get_help().map(ToString::to_string).unwrap_or_default();
            format!("\t{}: {}", self.aliases_to_string(arg), description)
        }));
        lines.push(String::new());
        lines.push("Exit codes:".to_string());
        lines.extend(EXIT_CODE_LINES.iter().map(|line| line.to_string()));

        let mut text = lines.join(&self.line_separator);
        text.push_str(&self.line_separator);
        text
    }

    fn aliases_to_string(&self, arg: &Arg) -> String {
        arg.get_long()
            .into_iter()
            .chain(arg.get_visible_aliases().unwrap_or_default())
            .map(|alias| format!("{}{}", OPTION_MARKER, alias))
            .collect::<Vec<_>>()
            .join(&self.alias_joiner)
    }
}
