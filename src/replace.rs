//! Replacement strategies built on the matching scan.
//!
//! All three strategies collect the full match list first and then resolve
//! overlaps the same way: matches are taken in order of start position, and
//! a match is dropped when it starts inside one already taken. For `abc` and
//! `bcd` over `abcd` only `abc` is replaced. Patterns without a static
//! replacement take part in this selection too: the static strategies then
//! leave their text as it is, so the span they claimed stays intact.
//!
//! - [`Automaton::replace_in_place`] rewrites a caller buffer, end to start.
//! - [`Automaton::replace_all`] builds a new buffer sized exactly once.
//! - [`Automaton::replace_with`] asks a callback for each replacement, so one
//!   compiled automaton can serve calls whose substitutions differ.

use std::ops::Range;

use tracing::{debug, trace};

use crate::automaton::{Automaton, Match};
use crate::error::{AcError, Result};

/// Outcome of an in-place replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InPlace {
    /// Substitutions actually applied
    pub replacements: usize,
    /// Length of the text in the buffer afterwards
    pub len: usize,
}

/// Output of an allocating replacement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replaced {
    pub bytes: Vec<u8>,
    pub replacements: usize,
}

impl Replaced {
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Keep the earliest-starting matches, dropping any that overlap one already kept.
///
/// The sort is stable, so among matches with the same start the one found
/// first (the shorter) wins.
pub fn select_non_overlapping(matches: &mut Vec<Match<'_>>) {
    matches.sort_by_key(|m| m.start);
    let mut cursor = 0;
    matches.retain(|m| {
        if m.start < cursor {
            return false;
        }
        cursor = m.end + 1;
        true
    });
}

/// Reserve exactly `len` bytes, failing instead of aborting.
fn allocate(len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| AcError::Allocation { requested: len })?;
    Ok(out)
}

/// Length of a text after swapping spans of `pattern_len` for `replacement_len` bytes.
fn output_len(text_len: usize, spans: impl IntoIterator<Item = (usize, usize)>) -> usize {
    spans
        .into_iter()
        .fold(text_len, |len, (pattern_len, replacement_len)| {
            len - pattern_len + replacement_len
        })
}

/// Copy `text` into `out`, writing each replacement over its range.
///
/// Ranges must be sorted and non-overlapping.
fn splice<'r>(
    text: &[u8],
    out: &mut Vec<u8>,
    pieces: impl IntoIterator<Item = (Range<usize>, &'r [u8])>,
) {
    let mut pos = 0;
    for (range, replacement) in pieces {
        out.extend_from_slice(&text[pos..range.start]);
        out.extend_from_slice(replacement);
        pos = range.end;
    }
    out.extend_from_slice(&text[pos..]);
}

impl<U> Automaton<'_, U> {
    /// Replace matches inside `buffer`, whose full length is the capacity.
    ///
    /// `len` is the length of the text at the start of `buffer`. Matches are
    /// applied from the end of the text backwards; a substitution that would
    /// grow the text past `buffer.len()` is skipped and the rest still apply.
    /// Zero matches leaves the buffer untouched.
    pub fn replace_in_place(&self, buffer: &mut [u8], len: usize) -> Result<InPlace> {
        let capacity = buffer.len();
        if len > capacity {
            return Err(AcError::LengthExceedsCapacity { len, capacity });
        }

        let mut matches = self.search(&buffer[..len])?;
        select_non_overlapping(&mut matches);
        matches.retain(|m| m.replacement.is_some());
        if matches.is_empty() {
            return Ok(InPlace {
                replacements: 0,
                len,
            });
        }

        let mut current = len;
        let mut applied = 0;
        for m in matches.iter().rev() {
            let Some(replacement) = m.replacement else {
                continue;
            };
            let new_len = current - m.pattern_len() + replacement.len();
            if new_len > capacity {
                trace!(start = m.start, new_len, capacity, "replacement exceeds capacity");
                continue;
            }

            if replacement.len() != m.pattern_len() {
                buffer.copy_within(m.end + 1..current, m.start + replacement.len());
            }
            buffer[m.start..m.start + replacement.len()].copy_from_slice(replacement);

            current = new_len;
            applied += 1;
        }

        debug!(
            input_len = len,
            output_len = current,
            replacements = applied,
            skipped = matches.len() - applied,
            "replaced in place"
        );
        Ok(InPlace {
            replacements: applied,
            len: current,
        })
    }

    /// Replace matches into a newly allocated buffer.
    ///
    /// The output length is computed up front and reserved once. On allocation
    /// failure nothing is returned.
    pub fn replace_all(&self, text: &[u8]) -> Result<Replaced> {
        let mut matches = self.search(text)?;
        select_non_overlapping(&mut matches);
        matches.retain(|m| m.replacement.is_some());
        if matches.is_empty() {
            return verbatim(text);
        }

        let total = output_len(
            text.len(),
            matches.iter().map(|m| (m.pattern_len(), m.replacement_len())),
        );
        let mut bytes = allocate(total)?;
        splice(
            text,
            &mut bytes,
            matches.iter().filter_map(|m| Some((m.range(), m.replacement?))),
        );

        debug!(
            input_len = text.len(),
            output_len = bytes.len(),
            replacements = matches.len(),
            "replaced"
        );
        Ok(Replaced {
            bytes,
            replacements: matches.len(),
        })
    }

    /// Replace matches with whatever `f` returns for them.
    ///
    /// `f` receives the matched pattern, the user data attached to it and
    /// `context`, which stays the same for the whole call. It is called once
    /// per match that survives overlap resolution, in text order. Matches
    /// dropped there never reach `f`, so a callback with side effects can see
    /// fewer calls than [`search`](Self::search) reports matches. The
    /// automaton itself is not modified, so the same compiled automaton can
    /// be reused with a different context on every call.
    pub fn replace_with<'s, 'c, C, F, R>(
        &'s self,
        text: &[u8],
        context: &'c C,
        mut f: F,
    ) -> Result<Replaced>
    where
        C: ?Sized,
        F: FnMut(&'s [u8], Option<&'s U>, &'c C) -> R,
        R: AsRef<[u8]>,
    {
        let mut matches = self.search(text)?;
        if matches.is_empty() {
            return verbatim(text);
        }
        select_non_overlapping(&mut matches);

        let replacements: Vec<R> = matches
            .iter()
            .map(|m| f(m.pattern, self.user_data(m.node), context))
            .collect();

        let total = output_len(
            text.len(),
            matches
                .iter()
                .zip(&replacements)
                .map(|(m, r)| (m.pattern_len(), r.as_ref().len())),
        );
        let mut bytes = allocate(total)?;
        splice(
            text,
            &mut bytes,
            matches
                .iter()
                .zip(&replacements)
                .map(|(m, r)| (m.range(), r.as_ref())),
        );

        debug!(
            input_len = text.len(),
            output_len = bytes.len(),
            replacements = matches.len(),
            "replaced with callback"
        );
        Ok(Replaced {
            bytes,
            replacements: matches.len(),
        })
    }
}

fn verbatim(text: &[u8]) -> Result<Replaced> {
    let mut bytes = allocate(text.len())?;
    bytes.extend_from_slice(text);
    Ok(Replaced {
        bytes,
        replacements: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled<'a>(rules: &[(&'a str, &'a str)]) -> Automaton<'a> {
        let mut ac = Automaton::new();
        for &(pattern, replacement) in rules {
            ac.add_pattern(pattern.as_bytes(), replacement.as_bytes())
                .unwrap();
        }
        ac.compile().unwrap();
        ac
    }

    fn in_place(ac: &Automaton<'_>, text: &[u8], capacity: usize) -> (Vec<u8>, InPlace) {
        let mut buffer = vec![0u8; capacity];
        buffer[..text.len()].copy_from_slice(text);
        let outcome = ac.replace_in_place(&mut buffer, text.len()).unwrap();
        buffer.truncate(outcome.len);
        (buffer, outcome)
    }

    #[test]
    fn test_end_to_end_cat_mouse() {
        let ac = compiled(&[("cat", "dog"), ("mouse", "elephant")]);
        let out = ac.replace_all(b"The cat chased the mouse").unwrap();
        assert_eq!(out.bytes, b"The dog chased the elephant");
        assert_eq!(out.replacements, 2);
    }

    #[test]
    fn test_length_changes() {
        let ac = compiled(&[("hello", "hi"), ("ok", "okay")]);

        let out = ac.replace_all(b"hello ok").unwrap();
        assert_eq!(out.bytes, b"hi okay");
        assert_eq!(out.replacements, 2);

        let (buffer, outcome) = in_place(&ac, b"hello ok", 64);
        assert_eq!(buffer, b"hi okay");
        assert_eq!(outcome, InPlace { replacements: 2, len: 7 });
    }

    #[test]
    fn test_disjoint_occurrences_agree() {
        let ac = compiled(&[("test", "exam"), ("red", "crimson"), ("blue", "b")]);
        let text = b"test red blue test, blue red test";

        let out = ac.replace_all(text).unwrap();
        let (buffer, outcome) = in_place(&ac, text, 128);

        assert_eq!(out.replacements, 7);
        assert_eq!(outcome.replacements, 7);
        assert_eq!(out.bytes, buffer);
        assert_eq!(out.bytes, b"exam crimson b exam, b crimson exam");
    }

    #[test]
    fn test_no_matches_is_verbatim() {
        let ac = compiled(&[("xyz", "abc")]);
        let text = b"hello world";

        let out = ac.replace_all(text).unwrap();
        assert_eq!(out.bytes, text);
        assert_eq!(out.replacements, 0);

        let (buffer, outcome) = in_place(&ac, text, text.len());
        assert_eq!(buffer, text);
        assert_eq!(outcome, InPlace { replacements: 0, len: text.len() });

        let out = ac
            .replace_with(text, &(), |_, _, _| b"never".to_vec())
            .unwrap();
        assert_eq!(out.bytes, text);
    }

    #[test]
    fn test_empty_text() {
        let ac = compiled(&[("a", "b")]);
        assert_eq!(ac.replace_all(b"").unwrap().bytes, b"");
        let mut buffer = [0u8; 4];
        assert_eq!(
            ac.replace_in_place(&mut buffer, 0).unwrap(),
            InPlace { replacements: 0, len: 0 }
        );
    }

    #[test]
    fn test_overlap_earlier_start_wins() {
        let ac = compiled(&[("abc", "123"), ("bcd", "456")]);

        let out = ac.replace_all(b"abcd").unwrap();
        assert_eq!(out.bytes, b"123d");
        assert_eq!(out.replacements, 1);

        let (buffer, outcome) = in_place(&ac, b"abcd", 16);
        assert_eq!(buffer, b"123d");
        assert_eq!(outcome.replacements, 1);

        let out = ac
            .replace_with(b"abcd", &(), |pattern, _, _| match pattern {
                b"abc" => "X",
                _ => "Y",
            })
            .unwrap();
        assert_eq!(out.bytes, b"Xd");
        assert_eq!(out.replacements, 1);
    }

    #[test]
    fn test_overlap_same_start_prefers_first_found() {
        let ac = compiled(&[("he", "1"), ("hers", "2")]);
        let out = ac.replace_all(b"hers").unwrap();
        assert_eq!(out.bytes, b"1rs");
        assert_eq!(out.replacements, 1);
    }

    #[test]
    fn test_adjacent_matches_both_apply() {
        let ac = compiled(&[("ab", "x"), ("cd", "yy")]);
        let out = ac.replace_all(b"abcd").unwrap();
        assert_eq!(out.bytes, b"xyy");
        let (buffer, _) = in_place(&ac, b"abcd", 8);
        assert_eq!(buffer, b"xyy");
    }

    #[test]
    fn test_in_place_capacity_boundary() {
        let ac = compiled(&[("a", "xyz")]);

        // "a a a" (5 bytes) in a 9-byte buffer: each growth adds 2, so only
        // two of the three substitutions fit. They are applied from the end.
        let (buffer, outcome) = in_place(&ac, b"a a a", 9);
        assert_eq!(outcome.replacements, 2);
        assert_eq!(outcome.len, 9);
        assert_eq!(buffer, b"a xyz xyz");
    }

    #[test]
    fn test_in_place_shrinking_always_fits() {
        let ac = compiled(&[("hello", "")]);
        let (buffer, outcome) = in_place(&ac, b"hello world hello", 17);
        assert_eq!(buffer, b" world ");
        assert_eq!(outcome, InPlace { replacements: 2, len: 7 });
    }

    #[test]
    fn test_in_place_rejects_len_past_buffer() {
        let ac = compiled(&[("a", "b")]);
        let mut buffer = [0u8; 2];
        assert_eq!(
            ac.replace_in_place(&mut buffer, 3),
            Err(AcError::LengthExceedsCapacity { len: 3, capacity: 2 })
        );
    }

    #[test]
    fn test_requires_compile() {
        let mut ac = Automaton::new();
        ac.add_pattern(b"a", b"b").unwrap();

        assert_eq!(ac.replace_all(b"a"), Err(AcError::NotCompiled));
        let mut buffer = *b"a";
        assert_eq!(ac.replace_in_place(&mut buffer, 1), Err(AcError::NotCompiled));
        assert_eq!(
            ac.replace_with(b"a", &(), |_, _, _| "c"),
            Err(AcError::NotCompiled)
        );
    }

    #[test]
    fn test_patterns_without_replacement_are_left_alone() {
        let mut ac: Automaton<'_, &str> = Automaton::default();
        ac.add_pattern_with(b"{{USER}}", None, Some("user")).unwrap();
        ac.add_pattern(b"hello", b"hi").unwrap();
        ac.compile().unwrap();

        let out = ac.replace_all(b"hello {{USER}}").unwrap();
        assert_eq!(out.bytes, b"hi {{USER}}");
        assert_eq!(out.replacements, 1);

        let (buffer, outcome) = {
            let mut buffer = b"hello {{USER}}".to_vec();
            let outcome = ac.replace_in_place(&mut buffer, 14).unwrap();
            buffer.truncate(outcome.len);
            (buffer, outcome)
        };
        assert_eq!(buffer, b"hi {{USER}}");
        assert_eq!(outcome.replacements, 1);
    }

    #[test]
    fn test_pattern_without_replacement_still_claims_its_span() {
        let mut ac = Automaton::new();
        ac.add_pattern_with(b"{{X}}", None, None).unwrap();
        ac.add_pattern(b"X}}y", b"Z").unwrap();
        ac.compile().unwrap();

        // The first X}}y starts inside {{X}}, so only the second is replaced
        let text = b"a {{X}}y X}}y";
        let out = ac.replace_all(text).unwrap();
        assert_eq!(out.bytes, b"a {{X}}y Z");
        assert_eq!(out.replacements, 1);

        let (buffer, outcome) = in_place(&ac, text, 32);
        assert_eq!(buffer, b"a {{X}}y Z");
        assert_eq!(outcome.replacements, 1);

        let out = ac.replace_all(b"a {{X}}y b").unwrap();
        assert_eq!(out.bytes, b"a {{X}}y b");
        assert_eq!(out.replacements, 0);
    }

    #[test]
    fn test_callback_varies_with_context() {
        let mut ac: Automaton<'_, &str> = Automaton::default();
        ac.add_pattern_with(b"{{USER}}", None, Some("user")).unwrap();
        ac.add_pattern_with(b"{{NONCE}}", None, Some("nonce")).unwrap();
        ac.add_pattern_with(b"{{SITE}}", Some(b"example.org".as_slice()), None)
            .unwrap();
        ac.compile().unwrap();

        struct Request<'r> {
            user: &'r str,
            nonce: &'r str,
        }

        let expand = |pattern: &[u8], tag: Option<&&str>, request: &Request<'_>| -> Vec<u8> {
            match tag.copied() {
                Some("user") => request.user.as_bytes().to_vec(),
                Some("nonce") => request.nonce.as_bytes().to_vec(),
                _ => pattern.to_vec(),
            }
        };

        let text = b"Welcome {{USER}} <script nonce=\"{{NONCE}}\"> {{SITE}}";

        let first = ac
            .replace_with(text, &Request { user: "alice", nonce: "n1" }, expand)
            .unwrap();
        assert!(ac.is_compiled());
        let second = ac
            .replace_with(text, &Request { user: "bob", nonce: "n2" }, expand)
            .unwrap();

        assert_eq!(
            first.bytes,
            b"Welcome alice <script nonce=\"n1\"> {{SITE}}".to_vec()
        );
        assert_eq!(
            second.bytes,
            b"Welcome bob <script nonce=\"n2\"> {{SITE}}".to_vec()
        );
        assert_eq!(first.replacements, 3);
        assert_ne!(first.bytes, second.bytes);
    }

    #[test]
    fn test_callback_may_borrow_context() {
        let mut ac = Automaton::new();
        ac.add_pattern_with(b"$NAME", None, None).unwrap();
        ac.compile().unwrap();

        let name = String::from("carol");
        let out = ac
            .replace_with(b"hi $NAME!", name.as_str(), |_, _, ctx| ctx)
            .unwrap();
        assert_eq!(out.bytes, b"hi carol!");
    }

    #[test]
    fn test_callback_is_called_once_per_kept_match() {
        let ac = compiled(&[("abc", ""), ("bcd", ""), ("d", "")]);
        let mut calls = Vec::new();
        let out = ac
            .replace_with(b"abcdd", &(), |pattern, _, _| {
                calls.push(pattern.to_vec());
                "_"
            })
            .unwrap();
        assert_eq!(calls, vec![b"abc".to_vec(), b"d".to_vec(), b"d".to_vec()]);
        assert_eq!(out.bytes, b"___");
    }

    #[test]
    fn test_select_non_overlapping() {
        let ac = compiled(&[("a", ""), ("ab", ""), ("abc", ""), ("bc", "")]);
        let mut matches = ac.search(b"abcabc").unwrap();
        select_non_overlapping(&mut matches);
        let kept: Vec<_> = matches.iter().map(|m| (m.start, m.pattern)).collect();
        assert_eq!(kept, vec![(0, &b"a"[..]), (1, &b"bc"[..]), (3, &b"a"[..]), (4, &b"bc"[..])]);
    }
}
