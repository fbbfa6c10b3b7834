use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("dataset or tab not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Retryable: quota exhaustion, a locked file, an interrupted read.
    #[error("transient store failure: {0}")]
    Transient(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid tab name {0:?}")]
    InvalidName(String),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("workbook error in {path}: {message}")]
    Xlsx { path: PathBuf, message: String },
}

impl StoreError {
    /// Map an I/O error on `path`, classifying the kinds callers act on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.display().to_string()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.display().to_string()),
            std::io::ErrorKind::Interrupted | std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                Self::Transient(format!("{}: {source}", path.display()))
            }
            _ => Self::Io { path, source },
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv { path: path.into(), source }
    }

    pub fn xlsx(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Xlsx {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether `PacedStore` should retry the call.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

#[derive(Debug, Error)]
pub enum ReportFileError {
    #[error("cannot open report {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report {path} is missing required column(s): {}", missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("malformed report {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_kinds_are_classified() {
        let nf = StoreError::io("x.csv", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(matches!(nf, StoreError::NotFound(_)));

        let denied = StoreError::io("x.csv", std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(matches!(denied, StoreError::PermissionDenied(_)));

        let busy = StoreError::io("x.csv", std::io::Error::from(std::io::ErrorKind::TimedOut));
        assert!(busy.is_transient());

        let other = StoreError::io("x.csv", std::io::Error::from(std::io::ErrorKind::InvalidData));
        assert!(!other.is_transient());
    }
}
