use thiserror::Error;

/// Failure talking to the persistence layer (listing pending entities,
/// recording completion timestamps).
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Failure of a single synchronizer moving one category of data.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("sync failed: {0}")]
    Failed(String),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("rejected by remote: {reason}")]
    Rejected { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_converts_into_sync_error() {
        let err: SyncError = SourceError::Connection("pool exhausted".to_string()).into();
        assert!(matches!(err, SyncError::Source(SourceError::Connection(_))));
        assert_eq!(err.to_string(), "source error: connection error: pool exhausted");
    }

    #[test]
    fn io_error_converts_into_source_error() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "socket timed out");
        let err: SourceError = io.into();
        assert!(err.to_string().contains("socket timed out"));
    }
}
