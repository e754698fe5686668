use std::collections::HashSet;

use regex::Regex;

use crate::content::GlossaryEntry;

/// A slice of input text, either plain or a recognised glossary term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment<'t, 'g> {
    Plain(&'t str),
    Term {
        text: &'t str,
        entry: &'g GlossaryEntry,
    },
}

impl<'t> Segment<'t, '_> {
    pub fn text(&self) -> &'t str {
        match self {
            Segment::Plain(text) | Segment::Term { text, .. } => *text,
        }
    }
}

/// Splits text into plain runs and glossary-term occurrences.
///
/// Terms are tried longest first, so when one term is a prefix of another
/// (e.g. `الأنا` and `الأنا الأعلى`) the longer one wins. Matches never overlap.
pub struct Highlighter {
    entries: Vec<GlossaryEntry>,
    pattern: Option<Regex>,
}

impl Highlighter {
    pub fn new<'a>(entries: impl IntoIterator<Item = &'a GlossaryEntry>) -> Self {
        let mut seen = HashSet::new();
        let mut entries: Vec<GlossaryEntry> = entries
            .into_iter()
            .filter(|e| !e.term.is_empty() && seen.insert(e.term.as_str()))
            .cloned()
            .collect();
        entries.sort_by_key(|e| std::cmp::Reverse(e.term.chars().count()));

        let pattern = if entries.is_empty() {
            None
        } else {
            let alternation = entries
                .iter()
                .map(|e| regex::escape(&e.term))
                .collect::<Vec<_>>()
                .join("|");
            match Regex::new(&alternation) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("term pattern failed to compile: {e}");
                    None
                }
            }
        };

        Self { entries, pattern }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, term: &str) -> Option<&GlossaryEntry> {
        self.entries.iter().find(|e| e.term == term)
    }

    pub fn segments<'t>(&self, text: &'t str) -> Vec<Segment<'t, '_>> {
        let mut out = Vec::new();
        let Some(pattern) = &self.pattern else {
            if !text.is_empty() {
                out.push(Segment::Plain(text));
            }
            return out;
        };

        let mut cursor = 0;
        for m in pattern.find_iter(text) {
            let Some(entry) = self.lookup(m.as_str()) else {
                continue;
            };
            if m.start() > cursor {
                out.push(Segment::Plain(&text[cursor..m.start()]));
            }
            out.push(Segment::Term {
                text: m.as_str(),
                entry,
            });
            cursor = m.end();
        }
        if cursor < text.len() {
            out.push(Segment::Plain(&text[cursor..]));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures::entry;

    fn concat(segments: &[Segment]) -> String {
        segments.iter().map(Segment::text).collect()
    }

    #[test]
    fn longer_term_wins_over_prefix() {
        let entries = vec![
            entry("الأنا", Some("Ego"), "mediator"),
            entry("الأنا الأعلى", Some("Superego"), "conscience"),
        ];
        let hl = Highlighter::new(&entries);
        let text = "يتصارع الأنا الأعلى مع الأنا باستمرار";
        let segments = hl.segments(text);

        let terms: Vec<&str> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Term { text, .. } => Some(*text),
                Segment::Plain(_) => None,
            })
            .collect();
        assert_eq!(terms, vec!["الأنا الأعلى", "الأنا"]);
        assert_eq!(concat(&segments), text);
    }

    #[test]
    fn repeated_term_keeps_first_definition() {
        let entries = vec![
            entry("الهو", None, "catalog"),
            entry("الكبت", None, "other"),
            entry("الهو", None, "mine"),
        ];
        let hl = Highlighter::new(&entries);
        assert_eq!(hl.len(), 2);
        assert_eq!(hl.lookup("الهو").unwrap().definition, "catalog");
    }

    #[test]
    fn concatenation_reproduces_input() {
        let entries = vec![entry("id", None, "x"), entry("ego", None, "y")];
        let hl = Highlighter::new(&entries);
        for text in ["", "id", "ego and id", "no terms here", "idego", "ididid "] {
            assert_eq!(concat(&hl.segments(text)), text);
        }
    }

    #[test]
    fn empty_catalog_yields_single_plain_segment() {
        let hl = Highlighter::new(std::iter::empty());
        assert!(hl.is_empty());
        assert_eq!(hl.segments("text"), vec![Segment::Plain("text")]);
        assert!(hl.segments("").is_empty());
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let entries = vec![entry("a+b (c)", None, "literal")];
        let hl = Highlighter::new(&entries);
        let segments = hl.segments("x a+b (c) y aab c");
        let term_count = segments
            .iter()
            .filter(|s| matches!(s, Segment::Term { .. }))
            .count();
        assert_eq!(term_count, 1);
    }

    #[test]
    fn term_segment_carries_its_entry() {
        let entries = vec![entry("الهو", Some("Id"), "instinct reservoir")];
        let hl = Highlighter::new(&entries);
        let segments = hl.segments("الهو");
        match &segments[..] {
            [Segment::Term { entry, .. }] => assert_eq!(entry.term_en.as_deref(), Some("Id")),
            other => panic!("unexpected segments: {other:?}"),
        }
    }
}
