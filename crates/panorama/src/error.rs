#![forbid(unsafe_code)]

//! Error types for the panel.

use std::fmt;

use panorama_layout::{ItemId, PageStoreError};

/// Errors surfaced by [`PanoramaPanel`](crate::PanoramaPanel) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelError {
    /// A structural page store operation was rejected.
    Store(PageStoreError),
    /// The item is not in the panel.
    UnknownItem(ItemId),
    /// A page index outside `[0, page_count)`.
    PageOutOfRange { page: usize, page_count: usize },
    /// A pointer event arrived through a detached behavior.
    NotAttached(ItemId),
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(err) => write!(f, "page store error: {err}"),
            Self::UnknownItem(item) => write!(f, "{item} is not in the panel"),
            Self::PageOutOfRange { page, page_count } => {
                write!(f, "page {page} out of range (page count {page_count})")
            }
            Self::NotAttached(item) => write!(f, "behavior for {item} is detached"),
        }
    }
}

impl std::error::Error for PanelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PageStoreError> for PanelError {
    fn from(err: PageStoreError) -> Self {
        Self::Store(err)
    }
}

/// Standard result type for panel operations.
pub type Result<T> = std::result::Result<T, PanelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn store_errors_convert_and_chain() {
        let err: PanelError = PageStoreError::UnknownItem(ItemId(3)).into();
        assert_eq!(err, PanelError::Store(PageStoreError::UnknownItem(ItemId(3))));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("page store error"));
    }

    #[test]
    fn display_names_the_page() {
        let err = PanelError::PageOutOfRange {
            page: 4,
            page_count: 2,
        };
        assert_eq!(err.to_string(), "page 4 out of range (page count 2)");
        assert!(err.source().is_none());
    }
}
