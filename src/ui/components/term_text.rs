use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::engine::{Highlighter, Segment};
use crate::ui::theme::Theme;

/// Spans for `text` with every glossary term in the theme's term colour.
pub fn term_spans(text: &str, highlighter: &Highlighter, base: Style, theme: &Theme) -> Vec<Span<'static>> {
    let term_style = base
        .fg(theme.colors.term())
        .add_modifier(Modifier::UNDERLINED);
    highlighter
        .segments(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(s) => Span::styled(s.to_string(), base),
            Segment::Term { text, .. } => Span::styled(text.to_string(), term_style),
        })
        .collect()
}

pub fn term_line(text: &str, highlighter: &Highlighter, base: Style, theme: &Theme) -> Line<'static> {
    Line::from(term_spans(text, highlighter, base, theme))
}

/// Glosses for the distinct terms found in `text`, in order of first use.
pub fn terms_in(text: &str, highlighter: &Highlighter) -> Vec<(String, String)> {
    let mut seen: Vec<(String, String)> = Vec::new();
    for segment in highlighter.segments(text) {
        if let Segment::Term { entry, .. } = segment {
            if !seen.iter().any(|(term, _)| *term == entry.term) {
                seen.push((entry.term.clone(), entry.definition.clone()));
            }
        }
    }
    seen
}
