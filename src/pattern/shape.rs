//! Shape descriptions: the token classes patterns are written in.

use std::borrow::Cow;

use bitflags::bitflags;

bitflags! {
    /// Character classes an identifier or literal run may draw from.
    ///
    /// Minified identifiers in the target module use the full
    /// `[A-Za-z0-9$_]` alphabet; some anchors are narrower (a leading
    /// single letter, a digit run). Sets compose with the usual bit
    /// operations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CharSet: u8 {
        /// ASCII letters `A-Z` and `a-z`.
        const ALPHA = 1;
        /// ASCII digits `0-9`.
        const DIGIT = 1 << 1;
        /// The `$` character.
        const DOLLAR = 1 << 2;
        /// The `_` character.
        const UNDERSCORE = 1 << 3;
        /// The full minified-identifier alphabet `[A-Za-z0-9$_]`.
        const MINIFIED = Self::ALPHA.bits()
            | Self::DIGIT.bits()
            | Self::DOLLAR.bits()
            | Self::UNDERSCORE.bits();
    }
}

impl CharSet {
    /// Returns `true` if `byte` belongs to this character set.
    #[must_use]
    pub fn contains_byte(self, byte: u8) -> bool {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' => self.contains(CharSet::ALPHA),
            b'0'..=b'9' => self.contains(CharSet::DIGIT),
            b'$' => self.contains(CharSet::DOLLAR),
            b'_' => self.contains(CharSet::UNDERSCORE),
            _ => false,
        }
    }
}

/// One element of a structural pattern.
///
/// Patterns are sequences of shapes; see the builder functions in this module
/// for the idiomatic way to assemble them. The matcher treats `Lit` as exact
/// bytes, `Run` as a greedy bounded character-class run, and `SkipUpTo` as a
/// lazy bounded gap.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Exact literal text.
    Lit(Cow<'static, str>),
    /// A run of `min..=max` characters from `set`, matched greedily with
    /// backtracking.
    Run {
        /// Character classes the run draws from
        set: CharSet,
        /// Minimum run length
        min: usize,
        /// Maximum run length
        max: usize,
    },
    /// A sub-sequence matched in order.
    Group(Vec<Shape>),
    /// The inner shape repeated `min..=max` times, greedily.
    Repeat {
        /// Shape being repeated
        shape: Box<Shape>,
        /// Minimum repetition count
        min: usize,
        /// Maximum repetition count
        max: usize,
    },
    /// The first alternative that lets the remainder of the pattern match.
    AnyOf(Vec<Shape>),
    /// The inner shape, with its matched span recorded under `name`.
    Capture {
        /// Name the span is recorded under
        name: &'static str,
        /// Shape whose span is captured
        shape: Box<Shape>,
    },
    /// A lazy gap of `0..=limit` bytes; the shortest gap that lets the
    /// remainder match wins.
    SkipUpTo(usize),
}

/// Exact literal text.
pub fn lit(text: impl Into<Cow<'static, str>>) -> Shape {
    Shape::Lit(text.into())
}

/// A minified identifier of exactly `len` characters (`[A-Za-z0-9$_]{len}`).
#[must_use]
pub fn ident(len: usize) -> Shape {
    Shape::Run {
        set: CharSet::MINIFIED,
        min: len,
        max: len,
    }
}

/// A minified identifier of `min..=max` characters.
#[must_use]
pub fn ident_upto(min: usize, max: usize) -> Shape {
    Shape::Run {
        set: CharSet::MINIFIED,
        min,
        max,
    }
}

/// A run of exactly `len` ASCII letters (`[A-Za-z]{len}`).
#[must_use]
pub fn alpha(len: usize) -> Shape {
    Shape::Run {
        set: CharSet::ALPHA,
        min: len,
        max: len,
    }
}

/// A run of `1..=max` decimal digits.
#[must_use]
pub fn digits(max: usize) -> Shape {
    Shape::Run {
        set: CharSet::DIGIT,
        min: 1,
        max,
    }
}

/// A bracket-indexed access: `[` followed by `1..=max_digits` digits and `]`.
///
/// This is the single most common token class in the target module, where
/// obfuscated property names are routed through numeric lookup tables.
#[must_use]
pub fn index(max_digits: usize) -> Shape {
    Shape::Group(vec![lit("["), digits(max_digits), lit("]")])
}

/// A sub-sequence matched in order.
#[must_use]
pub fn group(shapes: Vec<Shape>) -> Shape {
    Shape::Group(shapes)
}

/// The inner shape repeated `min..=max` times.
#[must_use]
pub fn repeat(shape: Shape, min: usize, max: usize) -> Shape {
    Shape::Repeat {
        shape: Box::new(shape),
        min,
        max,
    }
}

/// The first alternative that lets the remainder of the pattern match.
#[must_use]
pub fn any_of(shapes: Vec<Shape>) -> Shape {
    Shape::AnyOf(shapes)
}

/// Record the inner shape's matched span under `name`.
#[must_use]
pub fn cap(name: &'static str, shape: Shape) -> Shape {
    Shape::Capture {
        name,
        shape: Box::new(shape),
    }
}

/// A lazy gap of up to `limit` bytes before the next shape.
#[must_use]
pub fn skip_up_to(limit: usize) -> Shape {
    Shape::SkipUpTo(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minified_set_covers_identifier_alphabet() {
        for byte in [b'a', b'Z', b'7', b'$', b'_'] {
            assert!(CharSet::MINIFIED.contains_byte(byte), "{}", byte as char);
        }
        for byte in [b'[', b'.', b' ', b'(', 0xC3] {
            assert!(!CharSet::MINIFIED.contains_byte(byte));
        }
    }

    #[test]
    fn narrow_sets_reject_other_classes() {
        assert!(CharSet::ALPHA.contains_byte(b'q'));
        assert!(!CharSet::ALPHA.contains_byte(b'3'));
        assert!(CharSet::DIGIT.contains_byte(b'3'));
        assert!(!CharSet::DIGIT.contains_byte(b'$'));
    }
}
