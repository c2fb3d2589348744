use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Everything that can stop a diagram from reaching disk.
#[derive(Debug, Error)]
pub enum RenderingError {
    #[error("duplicate node identifier `{0}`")]
    DuplicateNode(String),

    #[error("edge `{from}` -> `{to}` references unknown node `{missing}`")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },

    #[error("invalid value `{value}` for attribute `{attribute}`")]
    InvalidAttribute { attribute: String, value: String },

    #[error("syntax error in graph description: {0}")]
    Syntax(String),

    /// The layout engine could not be located on `PATH` or at the given path.
    #[error("layout engine `{engine}` not found; install Graphviz or pass --engine")]
    EngineNotFound {
        engine: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to run layout engine {}: {source}", path.display())]
    EngineLaunch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("layout engine exited with {status}: {}", stderr.trim())]
    EngineFailed { status: ExitStatus, stderr: String },

    #[error("layout engine produced an empty {format} file")]
    EmptyOutput { format: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenderingError::Io {
            path: path.into(),
            source,
        }
    }
}
