use std::fmt::Display;
use std::sync::Arc;

/// Client-side state of a write whose result is not known yet.
///
/// A pending draft is never a persisted record. It becomes one only by
/// reconciling it with the result of the real write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Optimistic<T, D> {
    Pending(D),
    Persisted(T),
    RolledBack { draft: D, reason: Arc<str> },
}

impl<T, D> Optimistic<T, D> {
    pub fn pending(draft: D) -> Self {
        Self::Pending(draft)
    }

    /// Resolves a pending draft. Already resolved states are left untouched.
    pub fn reconcile<E: Display>(self, result: Result<T, E>) -> Self {
        match self {
            Self::Pending(draft) => match result {
                Ok(persisted) => Self::Persisted(persisted),
                Err(err) => Self::RolledBack {
                    draft,
                    reason: err.to_string().into(),
                },
            },
            resolved => resolved,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    pub fn persisted(&self) -> Option<&T> {
        match self {
            Self::Persisted(value) => Some(value),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<&D> {
        match self {
            Self::Pending(draft) | Self::RolledBack { draft, .. } => Some(draft),
            Self::Persisted(_) => None,
        }
    }
}
