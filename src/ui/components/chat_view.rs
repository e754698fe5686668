use std::collections::HashSet;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::assistant::{Message, Role};
use crate::engine::Highlighter;
use crate::engine::reply::{self, QuizBlock};
use crate::ui::components::term_text::term_spans;
use crate::ui::layout::wrapped_line_count;
use crate::ui::theme::Theme;

/// The conversation, newest at the bottom. Assistant replies are parsed into
/// headings, bullets, paragraphs and quiz blocks.
pub struct ChatTranscript<'a> {
    messages: &'a [Message],
    highlighter: &'a Highlighter,
    theme: &'a Theme,
    busy: bool,
    error: Option<&'a str>,
    quiz_focus: Option<usize>,
    revealed: Option<&'a HashSet<usize>>,
    scroll_from_bottom: u16,
}

impl<'a> ChatTranscript<'a> {
    pub fn new(messages: &'a [Message], highlighter: &'a Highlighter, theme: &'a Theme) -> Self {
        Self {
            messages,
            highlighter,
            theme,
            busy: false,
            error: None,
            quiz_focus: None,
            revealed: None,
            scroll_from_bottom: 0,
        }
    }

    pub fn busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }

    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    /// Quiz blocks are numbered across the whole transcript, oldest first.
    pub fn quiz_focus(mut self, focus: Option<usize>) -> Self {
        self.quiz_focus = focus;
        self
    }

    pub fn revealed(mut self, revealed: &'a HashSet<usize>) -> Self {
        self.revealed = Some(revealed);
        self
    }

    pub fn scroll_from_bottom(mut self, lines: u16) -> Self {
        self.scroll_from_bottom = lines;
        self
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let mut lines = Vec::new();
        let mut quiz_index = 0;

        for message in self.messages {
            match message.role {
                Role::User => {
                    lines.push(Line::from(Span::styled(
                        "You",
                        Style::default()
                            .fg(colors.user_message())
                            .add_modifier(Modifier::BOLD),
                    )));
                    for text in message.content.lines() {
                        lines.push(Line::from(Span::styled(
                            format!("  {text}"),
                            Style::default().fg(colors.fg()),
                        )));
                    }
                }
                Role::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "Assistant",
                        Style::default()
                            .fg(colors.assistant_message())
                            .add_modifier(Modifier::BOLD),
                    )));
                    self.push_reply(&message.content, &mut quiz_index, &mut lines);
                }
            }
            lines.push(Line::from(""));
        }

        if self.busy {
            lines.push(Line::from(Span::styled(
                "  Assistant is thinking…",
                Style::default()
                    .fg(colors.text_muted())
                    .add_modifier(Modifier::ITALIC),
            )));
        }
        if let Some(error) = self.error {
            lines.push(Line::from(Span::styled(
                format!("  ✗ {error}  (Ctrl+R to retry)"),
                Style::default().fg(colors.error()),
            )));
        }
        lines
    }

    fn push_reply(&self, content: &str, quiz_index: &mut usize, lines: &mut Vec<Line<'static>>) {
        let colors = &self.theme.colors;
        let base = Style::default().fg(colors.fg());

        for block in reply::parse(content) {
            match block {
                reply::Block::Heading(text) => lines.push(Line::from(Span::styled(
                    format!("  {text}"),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ))),
                reply::Block::Bullet(text) => {
                    let mut spans = vec![Span::styled("  • ", Style::default().fg(colors.accent()))];
                    spans.extend(term_spans(&text, self.highlighter, base, self.theme));
                    lines.push(Line::from(spans));
                }
                reply::Block::Paragraph(text) => {
                    let mut spans = vec![Span::raw("  ")];
                    spans.extend(term_spans(&text, self.highlighter, base, self.theme));
                    lines.push(Line::from(spans));
                }
                reply::Block::Blank => lines.push(Line::from("")),
                reply::Block::Quiz(quiz) => {
                    self.push_quiz(&quiz, *quiz_index, lines);
                    *quiz_index += 1;
                }
            }
        }
    }

    fn push_quiz(&self, quiz: &QuizBlock, index: usize, lines: &mut Vec<Line<'static>>) {
        let colors = &self.theme.colors;
        let base = Style::default().fg(colors.fg());
        let focused = self.quiz_focus == Some(index);
        let reveal = self.revealed.is_some_and(|set| set.contains(&index));
        let frame = if focused {
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.border_focused())
        };

        lines.push(Line::from(Span::styled(
            format!(
                "  ┌ Practice question {}{}",
                index + 1,
                if focused { "  ◀" } else { "" }
            ),
            frame,
        )));
        let mut question = vec![Span::raw("  │ ")];
        question.extend(term_spans(
            &quiz.question,
            self.highlighter,
            base.add_modifier(Modifier::BOLD),
            self.theme,
        ));
        lines.push(Line::from(question));

        for option in &quiz.options {
            let is_answer = reveal
                && quiz
                    .answer
                    .as_deref()
                    .is_some_and(|a| a.trim_start().starts_with(option.label.as_str()));
            let style = if is_answer {
                Style::default().fg(colors.success()).add_modifier(Modifier::BOLD)
            } else {
                base
            };
            let mut spans = vec![Span::styled(format!("  │   {}) ", option.label), style)];
            spans.extend(term_spans(&option.text, self.highlighter, style, self.theme));
            lines.push(Line::from(spans));
        }

        if reveal {
            if let Some(answer) = &quiz.answer {
                lines.push(Line::from(Span::styled(
                    format!("  │ ✓ {answer}"),
                    Style::default().fg(colors.success()),
                )));
            }
            if let Some(explanation) = &quiz.explanation {
                let mut spans = vec![Span::styled("  │ ", Style::default().fg(colors.text_muted()))];
                spans.extend(term_spans(
                    explanation,
                    self.highlighter,
                    Style::default().fg(colors.text_muted()),
                    self.theme,
                ));
                lines.push(Line::from(spans));
            }
        } else if quiz.answer.is_some() || quiz.explanation.is_some() {
            let hint = if focused {
                "  │ [Ctrl+O] show answer"
            } else {
                "  │ [Tab] select this question"
            };
            lines.push(Line::from(Span::styled(
                hint,
                Style::default().fg(colors.text_muted()),
            )));
        }
        lines.push(Line::from(Span::styled("  └", frame)));
    }
}

impl Widget for ChatTranscript<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Academic Assistant ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines = self.lines();
        let width = inner.width as usize;
        let total: usize = lines
            .iter()
            .map(|line| wrapped_line_count(&line.to_string(), width))
            .sum();
        let bottom = total.saturating_sub(inner.height as usize) as u16;
        let offset = bottom.saturating_sub(self.scroll_from_bottom);

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((offset, 0))
            .render(inner, buf);
    }
}
