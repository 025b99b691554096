//! Validation reports
//!
//! A [`Report`] is what the engine says about one document: a success flag
//! and the messages that explain it. Its `Display` rendering is what the tool
//! prints on standard output, so it must stay deterministic.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a report message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// One diagnostic produced while checking a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMessage {
    pub level: LogLevel,
    pub message: String,
    /// JSON Pointer into the checked document
    #[serde(rename = "instance")]
    pub instance_pointer: String,
    /// JSON Pointer into the schema (or meta-schema) that produced the message
    #[serde(rename = "schema")]
    pub schema_pointer: String,
}

impl ReportMessage {
    pub fn warning(
        message: impl Into<String>,
        instance_pointer: impl Into<String>,
        schema_pointer: impl Into<String>,
    ) -> Self {
        Self {
            level: LogLevel::Warning,
            message: message.into(),
            instance_pointer: instance_pointer.into(),
            schema_pointer: schema_pointer.into(),
        }
    }

    pub fn error(
        message: impl Into<String>,
        instance_pointer: impl Into<String>,
        schema_pointer: impl Into<String>,
    ) -> Self {
        Self {
            level: LogLevel::Error,
            message: message.into(),
            instance_pointer: instance_pointer.into(),
            schema_pointer: schema_pointer.into(),
        }
    }
}

/// Outcome of a syntax check or of an instance validation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Report {
    success: bool,
    messages: Vec<ReportMessage>,
}

impl Report {
    pub fn success() -> Self {
        Self {
            success: true,
            messages: Vec::new(),
        }
    }

    /// Build a report from messages; it is successful when none is an error
    pub fn from_messages(messages: Vec<ReportMessage>) -> Self {
        let success = messages.iter().all(|m| m.level < LogLevel::Error);
        Self { success, messages }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn messages(&self) -> &[ReportMessage] {
        &self.messages
    }

    /// Word describing the outcome, as printed on the first line
    pub fn status(&self) -> &'static str {
        if self.success { "success" } else { "failure" }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status())?;
        if self.messages.is_empty() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "--- BEGIN MESSAGES ---")?;
        for message in &self.messages {
            writeln!(f, "{}: {}", message.level, message.message)?;
            writeln!(f, "    instance: \"{}\"", message.instance_pointer)?;
            writeln!(f, "    schema: \"{}\"", message.schema_pointer)?;
        }
        write!(f, "--- END MESSAGES ---")
    }
}
