use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::content::LectureRecord;
use crate::content::progress::ProgressTracker;
use crate::engine::Highlighter;
use crate::ui::components::term_text::{term_line, terms_in};
use crate::ui::theme::Theme;

pub struct LectureList<'a> {
    lectures: &'a [LectureRecord],
    progress: &'a ProgressTracker,
    selected: usize,
    theme: &'a Theme,
}

impl<'a> LectureList<'a> {
    pub fn new(
        lectures: &'a [LectureRecord],
        progress: &'a ProgressTracker,
        selected: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            lectures,
            progress,
            selected,
            theme,
        }
    }
}

impl Widget for LectureList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Lectures ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = self
            .lectures
            .iter()
            .enumerate()
            .map(|(i, lecture)| {
                let is_selected = i == self.selected;
                let done = self.progress.is_completed(lecture.id);
                let mark = if done { "✓" } else { " " };
                let mut style = Style::default().fg(if done { colors.success() } else { colors.fg() });
                if is_selected {
                    style = style.bg(colors.selected_bg()).add_modifier(Modifier::BOLD);
                }
                Line::from(Span::styled(
                    format!(" {mark} {:>2}. {}", lecture.id, lecture.title),
                    style,
                ))
            })
            .collect();

        // Keep the selection visible in short panes.
        let height = inner.height as usize;
        let offset = if height > 0 && self.selected >= height {
            (self.selected + 1 - height) as u16
        } else {
            0
        };
        Paragraph::new(lines).scroll((offset, 0)).render(inner, buf);
    }
}

/// Full reading view of one lecture with glossary terms highlighted.
pub struct LectureDetail<'a> {
    lecture: &'a LectureRecord,
    completed: bool,
    highlighter: &'a Highlighter,
    scroll: u16,
    theme: &'a Theme,
}

impl<'a> LectureDetail<'a> {
    pub fn new(
        lecture: &'a LectureRecord,
        completed: bool,
        highlighter: &'a Highlighter,
        scroll: u16,
        theme: &'a Theme,
    ) -> Self {
        Self {
            lecture,
            completed,
            highlighter,
            scroll,
            theme,
        }
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let lecture = self.lecture;
        let heading = Style::default()
            .fg(colors.accent())
            .add_modifier(Modifier::BOLD);
        let body = Style::default().fg(colors.fg());
        let muted = Style::default().fg(colors.text_muted());

        let mut lines = vec![
            Line::from(Span::styled(
                lecture.title.clone(),
                heading.add_modifier(Modifier::UNDERLINED),
            )),
            Line::from(Span::styled(lecture.description.clone(), muted)),
            Line::from(Span::styled(
                if self.completed {
                    "Status: studied ✓"
                } else {
                    "Status: not studied yet"
                },
                Style::default().fg(if self.completed {
                    colors.success()
                } else {
                    colors.warning()
                }),
            )),
            Line::from(""),
        ];

        if !lecture.goals.is_empty() {
            lines.push(Line::from(Span::styled("Goals", heading)));
            for goal in &lecture.goals {
                lines.push(Line::from(Span::styled(format!("  • {goal}"), body)));
            }
            lines.push(Line::from(""));
        }

        if !lecture.key_concepts.is_empty() {
            lines.push(Line::from(Span::styled("Key concepts", heading)));
            lines.push(Line::from(Span::styled(
                format!("  {}", lecture.key_concepts.join(" · ")),
                body,
            )));
            lines.push(Line::from(""));
        }

        for paragraph in lecture.text.split("\n\n") {
            for text in paragraph.lines() {
                lines.push(term_line(text, self.highlighter, body, self.theme));
            }
            lines.push(Line::from(""));
        }

        let mentioned = terms_in(&lecture.text, self.highlighter);
        if !mentioned.is_empty() {
            lines.push(Line::from(Span::styled("Terms in this lecture", heading)));
            for (term, definition) in mentioned {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  {term}: "),
                        Style::default().fg(colors.term()).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(definition, muted),
                ]));
            }
        }
        lines
    }
}

impl Widget for LectureDetail<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" Lecture {} ", self.lecture.id))
            .border_style(Style::default().fg(colors.border_focused()));
        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.lines())
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures::{entry, lecture};

    #[test]
    fn detail_lists_terms_used_in_text() {
        let mut record = lecture(1, vec![entry("الهو", Some("Id"), "مستودع الغرائز")]);
        record.text = "يمثل الهو الجانب البدائي.\n\nفقرة ثانية.".to_string();
        let hl = Highlighter::new(&record.glossary);
        let theme = Theme::default();

        let text: Vec<String> = LectureDetail::new(&record, true, &hl, 0, &theme)
            .lines()
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert!(text.iter().any(|l| l == "Status: studied ✓"));
        assert!(text.iter().any(|l| l == "يمثل الهو الجانب البدائي."));
        assert!(text.iter().any(|l| l == "  الهو: مستودع الغرائز"));
    }
}
