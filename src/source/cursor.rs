//! Position-tracked view over source text, used by the pattern scanner.

/// A bounds-checked cursor over the bytes of one script module.
///
/// `Cursor` provides the primitive operations the pattern scanner is built
/// from: literal prefix tests, character-class run measurement, and position
/// bookkeeping. All operations validate availability instead of panicking, so
/// a scan that walks off the end of a truncated module simply fails to match.
///
/// Minified script source is treated as bytes throughout; every shape the
/// matcher supports is ASCII, and multi-byte UTF-8 content can only appear
/// inside regions a pattern skips over or captures verbatim.
///
/// # Examples
///
/// ```rust
/// use tapscope::source::Cursor;
///
/// let mut cursor = Cursor::new(b"abc[12]");
/// assert!(cursor.eat_literal(b"abc"));
/// assert_eq!(cursor.pos(), 3);
/// assert_eq!(cursor.run_len(|b| b.is_ascii_digit(), 4), 0); // '[' next
/// ```
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    /// The text being scanned
    data: &'a [u8],
    /// Current position within the text
    position: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new `Cursor` over a byte slice, positioned at the start.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Cursor { data, position: 0 }
    }

    /// Length of the underlying text.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if the cursor has not reached the end of the text.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.position < self.data.len()
    }

    /// Current position of the cursor.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Move the cursor to an absolute position.
    ///
    /// Positions up to and including the end of the text are valid; anything
    /// beyond is clamped-rejected by returning `false` with the cursor
    /// unmoved.
    pub fn seek(&mut self, pos: usize) -> bool {
        if pos > self.data.len() {
            return false;
        }
        self.position = pos;
        true
    }

    /// Advance the cursor by `step` bytes if that many remain.
    pub fn advance_by(&mut self, step: usize) -> bool {
        if self.position + step > self.data.len() {
            return false;
        }
        self.position += step;
        true
    }

    /// Byte at the current position, if any.
    #[must_use]
    pub fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    /// The remaining text from the current position onward.
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    /// Test whether the remaining text starts with `literal` and consume it
    /// when it does. The cursor is unmoved on a failed test.
    pub fn eat_literal(&mut self, literal: &[u8]) -> bool {
        if self.rest().starts_with(literal) {
            self.position += literal.len();
            true
        } else {
            false
        }
    }

    /// Measure the run of consecutive bytes satisfying `class`, starting at
    /// the current position, up to `max` bytes. The cursor is not moved.
    #[must_use]
    pub fn run_len(&self, class: impl Fn(u8) -> bool, max: usize) -> usize {
        self.rest().iter().take(max).take_while(|&&b| class(b)).count()
    }
}
