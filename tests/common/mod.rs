#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

pub const PERSON_SCHEMA: &str = r#"{
    "$schema": "http://json-schema.org/draft-04/schema#",
    "type": "object",
    "properties": {
        "name": { "type": "string" },
        "age": { "type": "integer", "minimum": 0 }
    },
    "required": ["name"]
}"#;

pub const VALID_PERSON: &str = r#"{ "name": "Ada", "age": 36 }"#;

pub const INVALID_PERSON: &str = r#"{ "age": -1 }"#;

/// Schema whose `type` keyword is not a valid type name
pub const BROKEN_SCHEMA: &str = r#"{
    "$schema": "http://json-schema.org/draft-07/schema#",
    "type": "banana"
}"#;

/// Scratch directory with helpers for writing documents
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("write fixture");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Run the binary inside the workspace, isolated from user configuration
    pub fn run(&self, args: &[&str]) -> Output {
        let mut command = Command::new(env!("CARGO_BIN_EXE_validate-json"));
        command
            .args(args)
            .current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env_remove("VALIDATE_JSON_LOG");
        for var in [
            "VALIDATE_JSON_CONFIG",
            "VALIDATE_JSON_DRAFT",
            "VALIDATE_JSON_VALIDATE_FORMATS",
            "VALIDATE_JSON_FORMAT",
            "VALIDATE_JSON_COLOR",
        ] {
            command.env_remove(var);
        }
        command.output().expect("run validate-json")
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
