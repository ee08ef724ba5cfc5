// ember-value - Regex and Matcher value kinds
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Regex values wrap a compiled [`regex::Regex`]. A [`Matcher`] walks the
//! matches of one pattern over one input string.
//!
//! Match results follow `re-find`: the whole match as a string when the
//! pattern has no groups, otherwise a vector of the whole match followed by
//! each group (nil for groups that did not participate).

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use regex::{Captures, Regex};

use crate::error::{Result, ValueError};
use crate::value::Value;

/// A compiled regular expression.
pub struct Pattern {
    source: Arc<str>,
    regex: Regex,
    anchored: Regex,
}

impl Pattern {
    pub fn compile(source: &str) -> Result<Self> {
        let invalid = |e: regex::Error| ValueError::InvalidPattern(e.to_string());
        let regex = Regex::new(source).map_err(invalid)?;
        let anchored = Regex::new(&format!("^(?:{})$", source)).map_err(invalid)?;
        Ok(Pattern {
            source: Arc::from(source),
            regex,
            anchored,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// `re-matches`: the whole input must match.
    pub fn matches(&self, input: &str) -> Value {
        self.anchored
            .captures(input)
            .map_or(Value::Nil, |caps| self.result(&caps))
    }

    /// `re-find`: the first match anywhere in the input.
    pub fn find(&self, input: &str) -> Value {
        self.regex
            .captures(input)
            .map_or(Value::Nil, |caps| self.result(&caps))
    }

    fn result(&self, caps: &Captures<'_>) -> Value {
        let group = |i: usize| caps.get(i).map_or(Value::Nil, |m| Value::string(m.as_str()));
        if caps.len() == 1 {
            group(0)
        } else {
            Value::vector((0..caps.len()).map(group).collect())
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#\"{}\"", self.source)
    }
}

/// A stateful cursor over successive matches.
pub struct Matcher {
    pattern: Arc<Pattern>,
    input: Arc<str>,
    cursor: Mutex<MatcherState>,
}

#[derive(Default)]
struct MatcherState {
    position: usize,
    last: Option<Value>,
    exhausted: bool,
}

impl Matcher {
    pub fn new(pattern: Arc<Pattern>, input: impl Into<Arc<str>>) -> Self {
        Matcher {
            pattern,
            input: input.into(),
            cursor: Mutex::new(MatcherState::default()),
        }
    }

    pub fn pattern(&self) -> &Arc<Pattern> {
        &self.pattern
    }

    /// Advance to the next match and return it, or nil when exhausted.
    pub fn find_next(&self) -> Value {
        let mut state = self.cursor.lock();
        if state.exhausted || state.position > self.input.len() {
            return Value::Nil;
        }
        let Some(caps) = self.pattern.regex.captures_at(&self.input, state.position) else {
            state.exhausted = true;
            state.last = None;
            return Value::Nil;
        };
        let Some(whole) = caps.get(0) else {
            return Value::Nil;
        };
        // Step past empty matches so the cursor always advances
        state.position = if whole.end() == whole.start() {
            next_char_boundary(&self.input, whole.end())
        } else {
            whole.end()
        };
        let result = self.pattern.result(&caps);
        state.last = Some(result.clone());
        result
    }

    /// `re-groups`: the most recent match.
    pub fn groups(&self) -> Result<Value> {
        self.cursor
            .lock()
            .last
            .clone()
            .ok_or_else(|| ValueError::callback("No match found"))
    }
}

fn next_char_boundary(s: &str, from: usize) -> usize {
    s[from..]
        .chars()
        .next()
        .map_or(from + 1, |c| from + c.len_utf8())
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Matcher {}>", self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            Pattern::compile("(").err(),
            Some(ValueError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_find_and_matches() {
        let p = Pattern::compile(r"\d+").unwrap();
        assert_eq!(p.find("ab12cd"), Value::string("12"));
        assert_eq!(p.matches("ab12"), Value::Nil);
        assert_eq!(p.matches("12"), Value::string("12"));
        // Alternation must still consider the longer branch
        let alt = Pattern::compile("a|ab").unwrap();
        assert_eq!(alt.matches("ab"), Value::string("ab"));
    }

    #[test]
    fn test_groups_become_vector() {
        let p = Pattern::compile(r"(\w)(\d)?").unwrap();
        assert_eq!(
            p.find("a"),
            Value::vector(vec![Value::string("a"), Value::string("a"), Value::Nil])
        );
    }

    #[test]
    fn test_matcher_walks_matches() {
        let p = Arc::new(Pattern::compile(r"\d").unwrap());
        let m = Matcher::new(p, "1a2b3");
        let found: Vec<_> = std::iter::from_fn(|| Some(m.find_next()).filter(|v| !v.is_nil())).collect();
        assert_eq!(
            found,
            vec![Value::string("1"), Value::string("2"), Value::string("3")]
        );
        assert_eq!(m.groups().unwrap_err(), ValueError::callback("No match found"));
    }

    #[test]
    fn test_empty_matches_advance() {
        let p = Arc::new(Pattern::compile(r"x*").unwrap());
        let m = Matcher::new(p, "ab");
        let mut count = 0;
        while !m.find_next().is_nil() {
            count += 1;
            assert!(count < 10);
        }
        assert_eq!(count, 3);
    }
}
