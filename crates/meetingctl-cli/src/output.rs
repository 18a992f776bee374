//! The single point where internal results become stdout output and a
//! process exit code. Exit codes per spec.md §6: 0 success (including
//! benign idle stop), 1 precondition-failed for `start`, 2 structured error.

use serde_json::Value;

pub struct CliOutcome {
    pub json: Value,
    pub human: String,
    pub exit_code: i32,
}

impl CliOutcome {
    pub fn success(json: Value, human: impl Into<String>) -> Self {
        Self { json, human: human.into(), exit_code: 0 }
    }

    pub fn precondition_failed(json: Value, human: impl Into<String>) -> Self {
        Self { json, human: human.into(), exit_code: 1 }
    }

    pub fn error(json: Value, human: impl Into<String>) -> Self {
        Self { json, human: human.into(), exit_code: 2 }
    }

    pub fn emit(self, json_mode: bool) -> i32 {
        if json_mode {
            println!("{}", self.json);
        } else {
            println!("{}", self.human);
        }
        self.exit_code
    }
}
