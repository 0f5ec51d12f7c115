//! Error type shared by configuration loading, experiment setup and output.
//!
//! Every variant here is fatal for the sweep that raised it: a run that hits
//! one is abandoned and its partial dataset dropped.

/// Failure raised by the harness.
#[derive(Debug)]
pub enum HarnessError {
    /// A configuration or scenario file could not be read.
    FileReadError(String),
    /// A configuration or scenario file could not be parsed.
    ParseError(String),
    /// The topology table is inconsistent (size, ids, references).
    MalformedTopology(String),
    /// A collaborator the run depends on was not installed.
    MissingCollaborator(String),
    /// A configuration variant cannot be executed as described.
    InvalidVariant(String),
    /// Writing rendered output failed.
    OutputError(String),
}

impl std::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HarnessError::FileReadError(msg) => write!(f, "Failed to read file: {}", msg),
            HarnessError::ParseError(msg) => write!(f, "Failed to parse: {}", msg),
            HarnessError::MalformedTopology(msg) => write!(f, "Malformed topology: {}", msg),
            HarnessError::MissingCollaborator(msg) => write!(f, "Missing collaborator: {}", msg),
            HarnessError::InvalidVariant(msg) => write!(f, "Invalid configuration variant: {}", msg),
            HarnessError::OutputError(msg) => write!(f, "Failed to write output: {}", msg),
        }
    }
}

impl std::error::Error for HarnessError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failure_class() {
        let err = HarnessError::MissingCollaborator("energy source on node 1".to_string());
        assert_eq!(err.to_string(), "Missing collaborator: energy source on node 1");

        let err = HarnessError::MalformedTopology("empty node table".to_string());
        assert!(err.to_string().starts_with("Malformed topology"));
    }
}
