//! Error type shared by every collaborator.

/// Why a collaborator could not complete a request.
///
/// The coordinator maps these onto its own taxonomy depending on which
/// operation failed: an `Unavailable` identity gateway becomes
/// `IdentityUnavailable`, a `Rejected` join becomes `JoinRejected`, and so
/// on. Collaborators only need to say whether the service was reachable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The service could not be reached at all (offline, not configured,
    /// timed out).
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The service was reached and declined the request.
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl ServiceError {
    /// The human-readable reason, without the variant prefix.
    pub fn reason(&self) -> &str {
        match self {
            Self::Unavailable(r) | Self::Rejected(r) => r,
        }
    }
}
