//! ScratchPad trait: the assistant's persistent private memory.
//!
//! The scratch pad is a single plain-text blob. Edits use an exact-match
//! protocol: the caller quotes the text it wants to replace, and the edit is
//! only applied when that quote identifies exactly one location.

use async_trait::async_trait;

use crate::error::MemoryError;

/// The core ScratchPad trait.
///
/// Implementations: file-backed (production), in-memory (tests).
#[async_trait]
pub trait ScratchPad: Send + Sync {
    /// Read the entire blob. A pad that was never written reads as empty.
    async fn content(&self) -> std::result::Result<String, MemoryError>;

    /// Replace the unique occurrence of `old_text` with `new_text`.
    async fn rewrite(&self, old_text: &str, new_text: &str) -> std::result::Result<(), MemoryError>;
}

/// Apply the exact-match rewrite protocol to `content`.
///
/// Counts non-overlapping occurrences of `old_text`: zero fails with
/// [`MemoryError::NotFound`], more than one with [`MemoryError::Ambiguous`].
/// An empty `old_text` matches an empty blob exactly once.
pub fn apply_rewrite(
    content: &str,
    old_text: &str,
    new_text: &str,
) -> std::result::Result<String, MemoryError> {
    match content.matches(old_text).count() {
        0 => Err(MemoryError::NotFound),
        1 => Ok(content.replace(old_text, new_text)),
        occurrences => Err(MemoryError::Ambiguous { occurrences }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_match_is_replaced() {
        let out = apply_rewrite("name: Bob", "Bob", "Alice").unwrap();
        assert_eq!(out, "name: Alice");
    }

    #[test]
    fn missing_match_is_not_found() {
        let err = apply_rewrite("name: Alice", "Bob", "X").unwrap_err();
        assert!(matches!(err, MemoryError::NotFound));
    }

    #[test]
    fn repeated_match_is_ambiguous() {
        let err = apply_rewrite("todo\ntodo\n", "todo", "done").unwrap_err();
        assert!(matches!(err, MemoryError::Ambiguous { occurrences: 2 }));
    }

    #[test]
    fn overlapping_candidates_count_once() {
        // "aa" occurs once non-overlapping in "aaa"
        let out = apply_rewrite("aaa", "aa", "b").unwrap();
        assert_eq!(out, "ba");
    }

    #[test]
    fn empty_anchor_writes_into_empty_pad() {
        let out = apply_rewrite("", "", "first note").unwrap();
        assert_eq!(out, "first note");
    }

    #[test]
    fn empty_anchor_is_ambiguous_once_pad_has_content() {
        let err = apply_rewrite("x", "", "y").unwrap_err();
        assert!(matches!(err, MemoryError::Ambiguous { .. }));
    }
}
