use thiserror::Error;

/// Failure of one extraction unit (a class entry or a build descriptor).
///
/// None of these abort a run: the archive walker records them in the report
/// and carries on with the remaining entries.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unreadable class {entry}: {reason}")]
    UnreadableClass { entry: String, reason: String },
    #[error("malformed build descriptor {entry}: {reason}")]
    MalformedDescriptor { entry: String, reason: String },
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Archive entry the failure belongs to, if it is tied to one.
    pub fn entry(&self) -> Option<&str> {
        match self {
            ExtractError::UnreadableClass { entry, .. }
            | ExtractError::MalformedDescriptor { entry, .. } => Some(entry),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
