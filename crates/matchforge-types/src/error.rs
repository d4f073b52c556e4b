//! Error types for descriptor validation.

/// Reasons a [`SessionDescriptor`](crate::SessionDescriptor) cannot be
/// hosted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    /// Both public and private slot counts are zero.
    #[error("session descriptor has no slots")]
    NoCapacity,

    /// An attribute was registered under the empty key.
    #[error("session attribute keys must not be empty")]
    EmptyAttributeKey,
}
