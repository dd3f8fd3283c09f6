//! Pipeline error kinds.
//!
//! One variant per failure class so callers can tell a bad manifest from a
//! failed fetch without parsing messages. Recovered conditions (unreadable
//! type descriptors) are logged at the site and never surface here.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors surfaced to the invoking host. Any of these aborts the
/// remaining steps of the current invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required input was missing before the pipeline mutated anything.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// The simulation manifest failed validation; `field` names the
    /// offending attribute.
    #[error("invalid simulation manifest: '{field}' {reason}")]
    ManifestInvalid { field: &'static str, reason: String },

    /// The runner template could not be materialized.
    #[error("failed to resolve runner '{version}': {reason}")]
    Resolution { version: String, reason: String },

    /// Template injection finished with unsatisfied attributes. Lists every
    /// missing name so template/runner drift is diagnosable in one pass.
    #[error("attributes not found in template content: {}", .0.join(", "))]
    TemplateDrift(Vec<String>),

    /// The external build invocation returned a failure.
    #[error("runner task(s) [{tasks}] failed with exit code {code}")]
    TaskFailed { tasks: String, code: i32 },

    /// Filesystem failure with the path it happened on.
    #[error("{op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config or manifest document could not be parsed.
    #[error("cannot parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
}

impl PipelineError {
    /// Attach a path to an I/O error.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}
