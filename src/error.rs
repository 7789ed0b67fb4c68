use crate::types::{Context, NodeKind, Violation, ViolationKind};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure raised by a strict parse, or by an engine invariant in any mode.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0}")]
    UnknownFunction(Violation),

    #[error("{0}")]
    InvalidArguments(Violation),

    #[error("{0}")]
    MissingInclude(Violation),

    #[error("{violation}")]
    CyclicInclude {
        chain: Vec<PathBuf>,
        violation: Violation,
    },

    #[error("{context} — {kind} node cannot carry both children and text")]
    MalformedNode { kind: NodeKind, context: Context },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ParseError {
    pub fn kind(&self) -> Option<ViolationKind> {
        match self {
            ParseError::UnknownFunction(_) => Some(ViolationKind::UnknownFunction),
            ParseError::InvalidArguments(_) => Some(ViolationKind::InvalidArguments),
            ParseError::MissingInclude(_) => Some(ViolationKind::MissingInclude),
            ParseError::CyclicInclude { .. } => Some(ViolationKind::CyclicInclude),
            ParseError::MalformedNode { .. } => Some(ViolationKind::MalformedNode),
            ParseError::Io { .. } => None,
        }
    }

    /// The diagnostic this error was raised for, if it came from user input.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            ParseError::UnknownFunction(v)
            | ParseError::InvalidArguments(v)
            | ParseError::MissingInclude(v)
            | ParseError::CyclicInclude { violation: v, .. } => Some(v),
            ParseError::MalformedNode { .. } | ParseError::Io { .. } => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ParseError::Io {
            path: path.into(),
            source,
        }
    }
}
