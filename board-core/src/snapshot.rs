//! Opaque full-surface snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result type for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Errors raised while capturing or decoding a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot is empty or could not be decoded.
    #[error("Malformed snapshot: {0}")]
    Malformed(String),
    /// The surface could not be encoded.
    #[error("Failed to encode snapshot: {0}")]
    Encode(String),
}

/// A complete encoded image of a surface at one instant.
///
/// A snapshot is never a diff: restoring it replaces everything on the
/// target surface. The encoding is owned by the [`SnapshotStore`]
/// implementation; the engine and the relay treat it as an opaque string.
///
/// [`SnapshotStore`]: crate::SnapshotStore
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    /// Wrap an encoded snapshot.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The encoded form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the snapshot carries no data at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Encoded size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<String> for Snapshot {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Snapshot {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// Snapshots are whole images; printing them in logs would flood the output.
impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.0.chars().take(24).collect();
        write!(f, "Snapshot({head:?}.., {} bytes)", self.0.len())
    }
}
