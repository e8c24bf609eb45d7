//! Immutable source text and the splice primitive.

use std::fmt;
use std::sync::Arc;

use crate::Result;

/// The full content of one script module at one point in the pipeline.
///
/// `SourceText` is immutable; each pipeline step that changes the text
/// produces a new value. Clones are cheap (the text is shared), which lets the
/// pipeline keep the pristine input around for diagnostics while rules work on
/// successive revisions.
///
/// # Examples
///
/// ```rust
/// use tapscope::source::{SourceText, Splice};
///
/// let source = SourceText::new("var a=1;");
/// let patched = source.splice(vec![Splice::insert_at(8, "var b=2;")])?;
/// assert_eq!(patched.as_str(), "var a=1;var b=2;");
/// assert_eq!(source.as_str(), "var a=1;"); // original untouched
/// # Ok::<(), tapscope::Error>(())
/// ```
#[derive(Clone)]
pub struct SourceText {
    text: Arc<str>,
}

impl SourceText {
    /// Create a new `SourceText` from any string-like value.
    pub fn new(text: impl Into<String>) -> Self {
        SourceText {
            text: Arc::from(text.into()),
        }
    }

    /// The text as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The text as raw bytes, the view the pattern scanner works on.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Length of the text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` if the text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Apply a set of splices, producing a new `SourceText`.
    ///
    /// Splices may be planned in any order; they are applied in ascending
    /// offset order. Validation happens before any text is assembled:
    ///
    /// - every splice must lie within the text, on UTF-8 character boundaries
    /// - no two splices may overlap
    /// - a replacement splice planned with [`Splice::replacing`] must still
    ///   find its expected bytes at the planned range
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Misapplied`] for out-of-bounds or stale-range
    /// splices and [`crate::Error::SpliceOverlap`] when two splices touch the
    /// same bytes. On error the original text is unchanged and no partial
    /// result exists.
    pub fn splice(&self, mut splices: Vec<Splice>) -> Result<SourceText> {
        splices.sort_by_key(|s| s.at);

        let text = self.as_str();
        let mut previous_end = 0usize;
        let mut previous_at = 0usize;
        for (i, splice) in splices.iter().enumerate() {
            let end = splice.at + splice.replace_len;
            if end > text.len() {
                return Err(misapplied_error!(
                    "splice {}..{} exceeds source length {}",
                    splice.at,
                    end,
                    text.len()
                ));
            }
            if !text.is_char_boundary(splice.at) || !text.is_char_boundary(end) {
                return Err(misapplied_error!(
                    "splice {}..{} does not fall on character boundaries",
                    splice.at,
                    end
                ));
            }
            // Two pure insertions at the same offset are still an overlap: the
            // relative order of their payloads would be unspecified.
            if i > 0 && splice.at < previous_end.max(previous_at + 1) {
                return Err(crate::Error::SpliceOverlap {
                    first: previous_at,
                    second: splice.at,
                });
            }
            if let Some(expected) = &splice.expect {
                let actual = &text[splice.at..end];
                if actual != expected.as_str() {
                    return Err(misapplied_error!(
                        "splice at {} expected '{}' but source holds '{}'",
                        splice.at,
                        expected,
                        actual
                    ));
                }
            }
            previous_at = splice.at;
            previous_end = end;
        }

        let grown: usize = splices.iter().map(|s| s.insert.len()).sum();
        let mut out = String::with_capacity(text.len() + grown);
        let mut cursor = 0usize;
        for splice in &splices {
            out.push_str(&text[cursor..splice.at]);
            out.push_str(&splice.insert);
            cursor = splice.at + splice.replace_len;
        }
        out.push_str(&text[cursor..]);

        Ok(SourceText::new(out))
    }
}

impl fmt::Debug for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceText")
            .field("len", &self.text.len())
            .finish()
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        SourceText::new(text)
    }
}

impl From<String> for SourceText {
    fn from(text: String) -> Self {
        SourceText::new(text)
    }
}

/// One planned edit against a [`SourceText`].
///
/// A splice either inserts new text at an offset (`replace_len == 0`) or
/// replaces an exact byte range. Replacements carry the text the planning rule
/// saw at that range, so application can detect a stale or wrongly-located
/// plan instead of corrupting the host script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    /// Byte offset at which the edit applies.
    pub at: usize,
    /// Number of bytes removed at `at`; zero for pure insertions.
    pub replace_len: usize,
    /// Text inserted at `at`.
    pub insert: String,
    /// For replacements, the bytes the planner expects to remove.
    pub expect: Option<String>,
}

impl Splice {
    /// Plan a pure insertion at `at`.
    pub fn insert_at(at: usize, insert: impl Into<String>) -> Self {
        Splice {
            at,
            replace_len: 0,
            insert: insert.into(),
            expect: None,
        }
    }

    /// Plan a replacement of `expected` (as currently present at `at`) with
    /// `insert`. Passing `""` as `insert` deletes the range.
    pub fn replacing(at: usize, expected: impl Into<String>, insert: impl Into<String>) -> Self {
        let expected = expected.into();
        Splice {
            at,
            replace_len: expected.len(),
            insert: insert.into(),
            expect: Some(expected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_preserves_surrounding_bytes() {
        let source = SourceText::new("abcdef");
        let out = source.splice(vec![Splice::insert_at(3, "XYZ")]).unwrap();
        assert_eq!(out.as_str(), "abcXYZdef");
    }

    #[test]
    fn multiple_splices_apply_in_offset_order() {
        let source = SourceText::new("0123456789");
        let out = source
            .splice(vec![
                Splice::insert_at(8, "b"),
                Splice::insert_at(2, "a"),
            ])
            .unwrap();
        assert_eq!(out.as_str(), "01a234567b89");
    }

    #[test]
    fn replacement_validates_expected_bytes() {
        let source = SourceText::new("let x = min(v, 9);");
        let ok = source.splice(vec![Splice::replacing(8, "min(v, 9)", "v")]);
        assert_eq!(ok.unwrap().as_str(), "let x = v;");

        let stale = source.splice(vec![Splice::replacing(8, "max(v, 9)", "v")]);
        assert!(matches!(stale, Err(crate::Error::Misapplied { .. })));
    }

    #[test]
    fn out_of_bounds_splice_is_rejected() {
        let source = SourceText::new("short");
        let result = source.splice(vec![Splice::insert_at(6, "x")]);
        assert!(matches!(result, Err(crate::Error::Misapplied { .. })));
    }

    #[test]
    fn overlapping_splices_are_rejected() {
        let source = SourceText::new("0123456789");
        let result = source.splice(vec![
            Splice::replacing(2, "2345", ""),
            Splice::replacing(4, "45", "x"),
        ]);
        assert!(matches!(result, Err(crate::Error::SpliceOverlap { .. })));
    }

    #[test]
    fn deletion_shrinks_text() {
        let source = SourceText::new("keep-drop-keep");
        let out = source
            .splice(vec![Splice::replacing(4, "-drop", "")])
            .unwrap();
        assert_eq!(out.as_str(), "keep-keep");
    }
}
