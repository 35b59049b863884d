use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by discovery and by the command runner.
///
/// An empty selection on confirm is deliberately absent: it is reported as a
/// warning and the session still exits successfully.
#[derive(Error, Debug)]
pub enum PickError {
    /// Discovery found nothing to pick from.
    #[error("no test files found under {}", root.display())]
    EmptyDiscovery { root: PathBuf },

    /// An include, exclude or preselect pattern could not be compiled.
    #[error("invalid pattern '{pattern}': {reason}")]
    MalformedPattern { pattern: String, reason: String },

    /// The command ran but exited unsuccessfully.
    #[error("test command exited with status {code}")]
    RunnerFailure { code: i32 },

    /// The command could not be started at all.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl PickError {
    /// Process exit code this error maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            PickError::RunnerFailure { code } if *code != 0 => *code,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runner_failure_keeps_its_code() {
        assert_eq!(PickError::RunnerFailure { code: 3 }.exit_code(), 3);
    }

    #[test]
    fn other_errors_exit_with_one() {
        let err = PickError::EmptyDiscovery {
            root: PathBuf::from("tests"),
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "no test files found under tests");

        let err = PickError::MalformedPattern {
            pattern: "[".to_string(),
            reason: "unclosed".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "invalid pattern '[': unclosed");
    }
}
