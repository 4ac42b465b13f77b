//! Handles to OS accessibility objects.
//!
//! The rate limiter sits between the operating system's accessibility layer
//! and the screen reader's own event handlers. It never inspects UI state
//! itself; the only thing it asks of an element is a stable identity to
//! coalesce by. The traits here are implemented by the embedder on top of
//! the concrete OS client library, which keeps this crate free of platform
//! bindings.

use std::fmt;

/// An OS-assigned ordered integer sequence identifying an element for the
/// lifetime of a process session.
///
/// Two handles refer to the same underlying UI object exactly when their
/// runtime ids compare equal, which is what makes the id usable as a
/// coalescing prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuntimeId(Vec<i32>);

impl RuntimeId {
    /// Create a runtime id from its OS-provided parts.
    pub fn new(parts: Vec<i32>) -> Self {
        Self(parts)
    }

    /// The id as an integer slice.
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    /// Consume the id, returning its parts.
    pub fn into_parts(self) -> Vec<i32> {
        self.0
    }

    /// Whether the OS handed back an id with no parts.
    ///
    /// Some providers do this for transient elements; events for such
    /// elements coalesce within a shared degraded bucket.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<i32>> for RuntimeId {
    fn from(parts: Vec<i32>) -> Self {
        Self(parts)
    }
}

impl fmt::Display for RuntimeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{part}")?;
        }
        write!(f, "]")
    }
}

/// A strong handle to a UI object exposed by the OS accessibility layer.
///
/// Buffered events hold one of these for as long as the record is alive, so
/// the element is still valid when the real handler finally sees it.
pub trait AccessibleElement: Send + Sync {
    /// The element's stable identity, if the OS can provide one.
    ///
    /// Obtaining the id may cost a cross-process round trip; the sink calls
    /// this before taking any lock. `None` means the identity is
    /// unavailable and events for this element fall back to a degraded
    /// coalescing bucket keyed by event kind alone.
    fn runtime_id(&self) -> Option<RuntimeId>;
}

/// An opaque handle to a span of accessible text.
///
/// Carried through active-text-position events untouched; only the upstream
/// handler interprets it.
pub trait AccessibleTextRange: Send + Sync {}
