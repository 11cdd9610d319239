//! JSON output types for machine-readable CLI output.
//!
//! Every command invoked with `--json` prints exactly one [`CommandOutput`]
//! document on stdout, whether it succeeded or not.

use anyhow::Result;
use partials_model::PartialsError;
use serde::{Deserialize, Serialize};
use std::process::ExitCode;

/// Error codes for failures that do not originate in the Partials crates.
pub mod error_codes {
    /// Any other CLI failure (file access, decoding, argument parsing)
    pub const CLI_ERROR: &str = "CLI_001";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g. "PARTIALS_001", "CLI_001")
    pub code: String,
    /// Human-readable message including its context chain
    pub message: String,
}

impl JsonError {
    /// Converts an error, keeping the library error code when there is one.
    pub fn from_error(error: &anyhow::Error) -> Self {
        let code = error
            .chain()
            .find_map(|cause| cause.downcast_ref::<PartialsError>())
            .map(PartialsError::code)
            .unwrap_or(error_codes::CLI_ERROR);
        Self {
            code: code.to_string(),
            message: format!("{:#}", error),
        }
    }
}

/// Top-level document printed by `--json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandOutput<T> {
    pub success: bool,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
}

impl<T> CommandOutput<T> {
    pub fn success(command: &str, result: T) -> Self {
        Self {
            success: true,
            command: command.to_string(),
            result: Some(result),
            errors: Vec::new(),
        }
    }

    pub fn failure(command: &str, error: JsonError) -> Self {
        Self {
            success: false,
            command: command.to_string(),
            result: None,
            errors: vec![error],
        }
    }
}

/// Prints the outcome of `command` as JSON and maps it to an exit code.
pub fn report<T: Serialize>(command: &str, outcome: Result<T>) -> Result<ExitCode> {
    let (output, code) = match outcome {
        Ok(result) => (CommandOutput::success(command, result), ExitCode::SUCCESS),
        Err(e) => (
            CommandOutput::failure(command, JsonError::from_error(&e)),
            ExitCode::from(1),
        ),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_library_error_code_survives_context() {
        let err: anyhow::Error = Err::<(), _>(PartialsError::invalid_argument("interval", "bad"))
            .context("Resampling failed")
            .unwrap_err();
        let json = JsonError::from_error(&err);
        assert_eq!(json.code, "PARTIALS_001");
        assert!(json.message.starts_with("Resampling failed"));
    }

    #[test]
    fn test_other_errors_use_cli_code() {
        let json = JsonError::from_error(&anyhow::anyhow!("boom"));
        assert_eq!(json.code, error_codes::CLI_ERROR);
    }

    #[test]
    fn test_failure_omits_result() {
        let output: CommandOutput<u32> =
            CommandOutput::failure("f0", JsonError::from_error(&anyhow::anyhow!("x")));
        let value = serde_json::to_value(&output).unwrap();
        assert!(value.get("result").is_none());
        assert_eq!(value["success"], false);
    }
}
