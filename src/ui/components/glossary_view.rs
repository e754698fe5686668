use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::content::glossary::{GlossaryFilter, GlossaryItem, TermSource};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

pub fn filter_label(filter: GlossaryFilter) -> String {
    match filter {
        GlossaryFilter::All => "All terms".to_string(),
        GlossaryFilter::Lecture(id) => format!("Lecture {id}"),
        GlossaryFilter::Custom => "My terms".to_string(),
    }
}

fn input_spans(input: &LineInput, focused: bool, theme: &Theme) -> Vec<Span<'static>> {
    let colors = &theme.colors;
    let text = Style::default().fg(colors.fg());
    if !focused {
        return vec![Span::styled(input.value().to_string(), text)];
    }
    let (before, at, after) = input.render_parts();
    vec![
        Span::styled(before.to_string(), text),
        Span::styled(
            at.map_or(" ".to_string(), |c| c.to_string()),
            Style::default().fg(colors.bg()).bg(colors.fg()),
        ),
        Span::styled(after.to_string(), text),
    ]
}

/// Search box, filter, result list and the selected term's definition.
pub struct GlossaryView<'a> {
    items: &'a [GlossaryItem<'a>],
    selected: usize,
    query: &'a LineInput,
    search_focused: bool,
    filter: GlossaryFilter,
    theme: &'a Theme,
}

impl<'a> GlossaryView<'a> {
    pub fn new(
        items: &'a [GlossaryItem<'a>],
        selected: usize,
        query: &'a LineInput,
        search_focused: bool,
        filter: GlossaryFilter,
        theme: &'a Theme,
    ) -> Self {
        Self {
            items,
            selected,
            query,
            search_focused,
            filter,
            theme,
        }
    }

    fn list_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        if self.items.is_empty() {
            return vec![Line::from(Span::styled(
                "No terms match.",
                Style::default().fg(colors.text_muted()),
            ))];
        }
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let tag = match item.source {
                    TermSource::Custom => "mine".to_string(),
                    TermSource::Lecture(id) => format!("L{id}"),
                };
                let mut style = Style::default().fg(if item.is_custom() {
                    colors.accent()
                } else {
                    colors.fg()
                });
                if i == self.selected {
                    style = style.bg(colors.selected_bg()).add_modifier(Modifier::BOLD);
                }
                let en = item.term_en.map(|e| format!(" ({e})")).unwrap_or_default();
                Line::from(vec![
                    Span::styled(format!(" {:<5}", tag), Style::default().fg(colors.text_muted())),
                    Span::styled(format!("{}{en}", item.term), style),
                ])
            })
            .collect()
    }

    fn detail_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let Some(item) = self.items.get(self.selected) else {
            return Vec::new();
        };
        let mut lines = vec![Line::from(Span::styled(
            item.term.to_string(),
            Style::default()
                .fg(colors.term())
                .add_modifier(Modifier::BOLD),
        ))];
        if let Some(en) = item.term_en {
            lines.push(Line::from(Span::styled(
                en.to_string(),
                Style::default().fg(colors.text_muted()),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            item.definition.to_string(),
            Style::default().fg(colors.fg()),
        )));
        if item.is_custom() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "[x] delete this term",
                Style::default().fg(colors.text_muted()),
            )));
        }
        lines
    }
}

impl Widget for GlossaryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        let search_border = if self.search_focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let search = Block::bordered()
            .title(format!(" Search · {} · {} result(s) ", filter_label(self.filter), self.items.len()))
            .border_style(Style::default().fg(search_border));
        let search_inner = search.inner(rows[0]);
        search.render(rows[0], buf);
        Paragraph::new(Line::from(input_spans(self.query, self.search_focused, self.theme)))
            .render(search_inner, buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[1]);

        let list = Block::bordered()
            .title(" Terms ")
            .border_style(Style::default().fg(colors.border()));
        let list_inner = list.inner(columns[0]);
        list.render(columns[0], buf);
        let height = list_inner.height as usize;
        let offset = if height > 0 && self.selected >= height {
            (self.selected + 1 - height) as u16
        } else {
            0
        };
        Paragraph::new(self.list_lines())
            .scroll((offset, 0))
            .render(list_inner, buf);

        let detail = Block::bordered()
            .title(" Definition ")
            .border_style(Style::default().fg(colors.border()));
        let detail_inner = detail.inner(columns[1]);
        detail.render(columns[1], buf);
        Paragraph::new(self.detail_lines())
            .wrap(Wrap { trim: false })
            .render(detail_inner, buf);
    }
}

/// Which field of the add-term popup has focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Term,
    TermEn,
    Definition,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Term => FormField::TermEn,
            FormField::TermEn => FormField::Definition,
            FormField::Definition => FormField::Term,
        }
    }
}

pub struct GlossaryFormPopup<'a> {
    pub term: &'a LineInput,
    pub term_en: &'a LineInput,
    pub definition: &'a LineInput,
    pub focus: FormField,
    pub theme: &'a Theme,
}

impl Widget for GlossaryFormPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        Clear.render(area, buf);

        let block = Block::bordered()
            .title(" Add a term ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let fields = [
            ("Term (required)", self.term, FormField::Term),
            ("English term (optional)", self.term_en, FormField::TermEn),
            ("Definition (required)", self.definition, FormField::Definition),
        ];

        let mut lines = Vec::new();
        for (label, input, focus) in fields {
            let focused = focus == self.focus;
            lines.push(Line::from(Span::styled(
                label,
                Style::default()
                    .fg(if focused { colors.accent() } else { colors.text_muted() })
                    .add_modifier(if focused { Modifier::BOLD } else { Modifier::empty() }),
            )));
            let mut spans = vec![Span::raw("  ")];
            spans.extend(input_spans(input, focused, self.theme));
            lines.push(Line::from(spans));
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "[Tab] next field  [Enter] save  [Esc] cancel",
            Style::default().fg(colors.text_muted()),
        )));

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item<'a>(term: &'a str, source: TermSource) -> GlossaryItem<'a> {
        GlossaryItem {
            id: term,
            term,
            term_en: None,
            definition: "def",
            source,
        }
    }

    #[test]
    fn list_tags_source_and_detail_offers_delete_for_custom() {
        let items = [item("التسامي", TermSource::Custom), item("الهو", TermSource::Lecture(1))];
        let query = LineInput::default();
        let theme = Theme::default();
        let view = GlossaryView::new(&items, 0, &query, false, GlossaryFilter::All, &theme);

        let list: Vec<String> = view.list_lines().iter().map(|l| l.to_string()).collect();
        assert_eq!(list, vec![" mine التسامي", " L1   الهو"]);
        let detail: Vec<String> = view.detail_lines().iter().map(|l| l.to_string()).collect();
        assert!(detail.iter().any(|l| l.contains("[x] delete")));
    }

    #[test]
    fn filter_labels() {
        assert_eq!(filter_label(GlossaryFilter::Lecture(3)), "Lecture 3");
        assert_eq!(filter_label(GlossaryFilter::Custom), "My terms");
    }
}
