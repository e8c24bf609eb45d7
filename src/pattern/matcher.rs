//! The linear scanner that binds shape patterns to source text.

use crate::pattern::shape::Shape;
use crate::source::Cursor;

/// A compiled shape sequence, ready to scan source text.
///
/// A pattern either binds completely at some offset or not at all; captures
/// are only reported for complete matches. Scanning is a linear sweep over
/// candidate start offsets with backtracking inside each attempt, accelerated
/// by jumping between occurrences of the pattern's leading literal when it
/// has one.
pub struct Pattern {
    shapes: Vec<Shape>,
}

impl Pattern {
    /// Compile a sequence of shapes into a pattern.
    #[must_use]
    pub fn new(shapes: Vec<Shape>) -> Self {
        Pattern { shapes }
    }

    /// Find the first match in `text`.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<Match> {
        self.find_from(text, 0)
    }

    /// Find the first match in `text` at or after byte offset `from`.
    #[must_use]
    pub fn find_from(&self, text: &str, from: usize) -> Option<Match> {
        let bytes = text.as_bytes();
        if from > bytes.len() {
            return None;
        }

        // When the pattern opens with fixed text, candidate starts are found
        // with a substring search instead of trying every offset.
        if let Some(lead) = leading_literal(&self.shapes) {
            let mut at = from;
            while at <= bytes.len() {
                let start = find_bytes(bytes, lead.as_bytes(), at)?;
                if let Some(m) = self.try_at(bytes, start) {
                    return Some(m);
                }
                at = start + 1;
            }
            return None;
        }

        (from..=bytes.len()).find_map(|start| self.try_at(bytes, start))
    }

    /// Find all non-overlapping matches, scanning left to right.
    #[must_use]
    pub fn find_all(&self, text: &str) -> Vec<Match> {
        let mut matches = Vec::new();
        let mut from = 0usize;
        while let Some(m) = self.find_from(text, from) {
            // Zero-width matches still have to make progress.
            from = m.end.max(m.start + 1);
            matches.push(m);
            if from > text.len() {
                break;
            }
        }
        matches
    }

    fn try_at(&self, bytes: &[u8], start: usize) -> Option<Match> {
        let mut state = MatchState {
            cursor: Cursor::new(bytes),
            captures: Vec::new(),
        };
        if !state.cursor.seek(start) {
            return None;
        }
        let mut end = 0usize;
        let matched = match_seq(&self.shapes, &mut state, &mut |st| {
            end = st.cursor.pos();
            true
        });
        matched.then(|| Match {
            start,
            end,
            captures: state.captures,
        })
    }
}

/// A located landmark: the matched byte range plus captured sub-tokens.
#[derive(Debug, Clone)]
pub struct Match {
    /// Byte offset where the match begins.
    pub start: usize,
    /// Byte offset one past the end of the match.
    pub end: usize,
    /// Captured sub-token spans, in the order they were bound.
    pub captures: Vec<Capture>,
}

impl Match {
    /// The matched text, resolved against the source it was found in.
    #[must_use]
    pub fn text<'t>(&self, source: &'t str) -> &'t str {
        &source[self.start..self.end]
    }

    /// Look up a capture by name.
    #[must_use]
    pub fn capture(&self, name: &str) -> Option<&Capture> {
        self.captures.iter().find(|c| c.name == name)
    }

    /// Look up a capture's text by name, resolved against the source.
    #[must_use]
    pub fn capture_text<'t>(&self, source: &'t str, name: &str) -> Option<&'t str> {
        self.capture(name).map(|c| &source[c.start..c.end])
    }
}

/// One captured sub-token within a [`Match`].
///
/// The captured text is typically a discovered minified identifier that must
/// be reused verbatim in injected code so the patch binds to the correct
/// variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Name the capture was declared under.
    pub name: &'static str,
    /// Byte offset where the captured span begins.
    pub start: usize,
    /// Byte offset one past the end of the captured span.
    pub end: usize,
}

struct MatchState<'t> {
    cursor: Cursor<'t>,
    captures: Vec<Capture>,
}

type Continuation<'k> = &'k mut dyn FnMut(&mut MatchState<'_>) -> bool;

fn match_seq(shapes: &[Shape], state: &mut MatchState, k: Continuation) -> bool {
    match shapes.split_first() {
        None => k(state),
        Some((first, rest)) => {
            match_shape(first, state, &mut |state| match_seq(rest, state, &mut *k))
        }
    }
}

fn match_shape(shape: &Shape, state: &mut MatchState, k: Continuation) -> bool {
    match shape {
        Shape::Lit(text) => {
            let save = state.cursor.pos();
            if state.cursor.eat_literal(text.as_bytes()) {
                if k(state) {
                    return true;
                }
                state.cursor.seek(save);
            }
            false
        }
        Shape::Run { set, min, max } => {
            let start = state.cursor.pos();
            let set = *set;
            let available = state.cursor.run_len(|b| set.contains_byte(b), *max);
            if available < *min {
                return false;
            }
            // Greedy: longest run first, giving back on demand.
            let mut len = available;
            loop {
                state.cursor.seek(start + len);
                let mark = state.captures.len();
                if k(state) {
                    return true;
                }
                state.captures.truncate(mark);
                if len == *min {
                    break;
                }
                len -= 1;
            }
            state.cursor.seek(start);
            false
        }
        Shape::Group(inner) => match_seq(inner, state, k),
        Shape::Repeat { shape, min, max } => match_repeat(shape, *min, *max, 0, state, k),
        Shape::AnyOf(alternatives) => {
            let save = state.cursor.pos();
            let mark = state.captures.len();
            for alternative in alternatives {
                if match_shape(alternative, state, &mut *k) {
                    return true;
                }
                state.cursor.seek(save);
                state.captures.truncate(mark);
            }
            false
        }
        Shape::Capture { name, shape } => {
            let name = *name;
            let start = state.cursor.pos();
            match_shape(shape, state, &mut |state| {
                let end = state.cursor.pos();
                state.captures.push(Capture { name, start, end });
                if k(state) {
                    true
                } else {
                    state.captures.pop();
                    false
                }
            })
        }
        Shape::SkipUpTo(limit) => {
            let start = state.cursor.pos();
            let furthest = (start + limit).min(state.cursor.len());
            // Lazy: shortest gap that lets the remainder match wins.
            for pos in start..=furthest {
                state.cursor.seek(pos);
                let mark = state.captures.len();
                if k(state) {
                    return true;
                }
                state.captures.truncate(mark);
            }
            state.cursor.seek(start);
            false
        }
    }
}

fn match_repeat(
    shape: &Shape,
    min: usize,
    max: usize,
    done: usize,
    state: &mut MatchState,
    k: Continuation,
) -> bool {
    if done < max {
        let save = state.cursor.pos();
        let mark = state.captures.len();
        if match_shape(shape, state, &mut |state| {
            match_repeat(shape, min, max, done + 1, state, &mut *k)
        }) {
            return true;
        }
        state.cursor.seek(save);
        state.captures.truncate(mark);
    }
    if done >= min {
        k(state)
    } else {
        false
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return (from <= haystack.len()).then_some(from);
    }
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|found| from + found)
}

fn leading_literal(shapes: &[Shape]) -> Option<&str> {
    leading_of(shapes.first()?)
}

fn leading_of(shape: &Shape) -> Option<&str> {
    match shape {
        Shape::Lit(text) => Some(text),
        Shape::Group(inner) => leading_literal(inner),
        Shape::Capture { shape, .. } => leading_of(shape),
        _ => None,
    }
}
