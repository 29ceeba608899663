use thiserror::Error;

/// Every way a song operation can fail.
#[derive(Debug, Error)]
pub enum SongError {
    #[error("bad group")]
    BadGroup,

    #[error("bad name")]
    BadName,

    #[error("bad release date")]
    BadReleaseDate,

    #[error("bad limit")]
    BadLimit,

    #[error("bad offset")]
    BadOffset,

    #[error("bad nil request")]
    NilRequest,

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("malformed query: {0}")]
    MalformedQuery(String),

    #[error("song not found")]
    NotFound,

    #[error("song already exists")]
    AlreadyExists,

    #[error("error while adding new song")]
    AddFailed(#[source] rusqlite::Error),

    #[error("error while deleting song")]
    DeleteFailed(#[source] rusqlite::Error),

    #[error("error while updating song")]
    UpdateFailed(#[source] rusqlite::Error),

    #[error("error while getting song")]
    GetFailed(#[source] rusqlite::Error),

    #[error("error while getting songs")]
    ListFailed(#[source] rusqlite::Error),

    #[error("storage call timed out")]
    Timeout,

    #[error("internal server error")]
    InternalServer,

    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        #[source]
        source: Box<SongError>,
    },
}

/// How a failure should be reported to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadRequest,
    NotFound,
    Conflict,
    Internal,
}

impl SongError {
    pub fn context(self, context: &'static str) -> Self {
        SongError::Context {
            context,
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through any `Context` wrappers.
    pub fn root(&self) -> &SongError {
        match self {
            SongError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self.root() {
            SongError::BadGroup
            | SongError::BadName
            | SongError::BadReleaseDate
            | SongError::BadLimit
            | SongError::BadOffset => ErrorClass::BadRequest,
            SongError::NotFound => ErrorClass::NotFound,
            SongError::AlreadyExists => ErrorClass::Conflict,
            _ => ErrorClass::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_classification() {
        let err = SongError::BadOffset.context("getcouplet error");
        assert_eq!(err.class(), ErrorClass::BadRequest);
        assert!(matches!(err.root(), SongError::BadOffset));
        assert_eq!(err.to_string(), "getcouplet error: bad offset");
    }

    #[test]
    fn storage_failures_are_internal() {
        let err = SongError::GetFailed(rusqlite::Error::InvalidQuery).context("get error");
        assert_eq!(err.class(), ErrorClass::Internal);
        assert_eq!(SongError::Timeout.class(), ErrorClass::Internal);
    }

    #[test]
    fn unreadable_requests_are_internal() {
        assert_eq!(SongError::NilRequest.class(), ErrorClass::Internal);
        assert_eq!(
            SongError::MalformedBody("eof".to_string()).class(),
            ErrorClass::Internal
        );
        assert_eq!(
            SongError::MalformedQuery("duplicate field".to_string()).class(),
            ErrorClass::Internal
        );
    }

    #[test]
    fn lookup_failures_have_their_own_classes() {
        assert_eq!(SongError::NotFound.class(), ErrorClass::NotFound);
        assert_eq!(SongError::AlreadyExists.class(), ErrorClass::Conflict);
    }
}
