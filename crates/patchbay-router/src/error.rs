//! Error types for channel routing.

use patchbay_core::PatchError;
use thiserror::Error;

/// Errors from router construction or re-patching.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A routing update referenced a channel outside the router's matrix.
    #[error("{direction} channel {index} out of range ({count} channels)")]
    ChannelOutOfRange {
        /// `"input"` or `"output"`.
        direction: &'static str,
        /// The offending channel index.
        index: u32,
        /// Number of channels on that side of the matrix.
        count: u32,
    },

    /// The router was already destroyed.
    #[error("router was destroyed")]
    RouterDestroyed,

    /// A live patch operation failed underneath the router.
    #[error(transparent)]
    Patch(#[from] PatchError),
}
