use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::content::{ContentStore, Difficulty};
use crate::engine::Highlighter;
use crate::engine::scoring::{grade_label, percentage};
use crate::session::quiz::{QuizEngine, QuizState};
use crate::ui::components::term_text::term_spans;
use crate::ui::theme::Theme;

pub struct QuizView<'a> {
    quiz: &'a QuizEngine,
    content: &'a ContentStore,
    cursor: usize,
    highlighter: &'a Highlighter,
    theme: &'a Theme,
}

impl<'a> QuizView<'a> {
    pub fn new(
        quiz: &'a QuizEngine,
        content: &'a ContentStore,
        cursor: usize,
        highlighter: &'a Highlighter,
        theme: &'a Theme,
    ) -> Self {
        Self {
            quiz,
            content,
            cursor,
            highlighter,
            theme,
        }
    }

    fn title(&self) -> String {
        match (self.quiz.lecture_id(), self.quiz.difficulty()) {
            (Some(id), Some(d)) => format!(" Quiz Bank · Lecture {id} · {} ", d.as_str()),
            (Some(id), None) => format!(" Quiz Bank · Lecture {id} "),
            _ => " Quiz Bank ".to_string(),
        }
    }

    fn cursor_line(&self, index: usize, text: String) -> Line<'static> {
        let colors = &self.theme.colors;
        if index == self.cursor {
            Line::from(Span::styled(
                format!(" > {text}"),
                Style::default()
                    .fg(colors.accent())
                    .bg(colors.selected_bg())
                    .add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::from(Span::styled(format!("   {text}"), Style::default().fg(colors.fg())))
        }
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let muted = Style::default().fg(colors.text_muted());
        let heading = Style::default()
            .fg(colors.accent())
            .add_modifier(Modifier::BOLD);

        match self.quiz.state() {
            QuizState::LectureSelect => {
                let mut lines = vec![Line::from(Span::styled("Choose a lecture", heading)), Line::from("")];
                for (i, lecture) in self.content.lectures().iter().enumerate() {
                    lines.push(self.cursor_line(i, format!("{}. {}", lecture.id, lecture.title)));
                }
                lines
            }
            QuizState::DifficultySelect => {
                let mut lines = vec![Line::from(Span::styled("Choose a difficulty", heading)), Line::from("")];
                for (i, difficulty) in Difficulty::ALL.iter().enumerate() {
                    let count = self.quiz.question_count(*difficulty);
                    lines.push(self.cursor_line(
                        i,
                        format!("{:<7} {count} question(s)", difficulty.as_str()),
                    ));
                    lines.push(Line::from(Span::styled(
                        format!("     {}", difficulty.description()),
                        muted,
                    )));
                }
                lines
            }
            QuizState::Empty => vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No questions at this difficulty yet.",
                    Style::default().fg(colors.warning()),
                )),
                Line::from(Span::styled(
                    "Press Enter to pick another difficulty.",
                    muted,
                )),
            ],
            QuizState::Answering => self.question_lines(),
            QuizState::Completed => {
                let mut lines = self.question_lines();
                let (score, total) = self.quiz.result().unwrap_or((0, 0));
                let pct = percentage(score, total);
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("Result: {score}/{total} ({pct}%) · {}", grade_label(score, total)),
                    heading,
                )));
                lines.push(Line::from(Span::styled(
                    "[Enter] Try again  [d] Change difficulty  [l] Change lecture",
                    muted,
                )));
                lines
            }
        }
    }

    fn question_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let Some(question) = self.quiz.current_question() else {
            return Vec::new();
        };
        let base = Style::default().fg(colors.fg());
        let submitted = self.quiz.is_submitted();

        let mut lines = vec![
            Line::from(Span::styled(
                format!(
                    "Question {} of {}   ·   score {}",
                    self.quiz.index() + 1,
                    self.quiz.total(),
                    self.quiz.score()
                ),
                Style::default().fg(colors.text_muted()),
            )),
            Line::from(""),
            Line::from(term_spans(
                &question.scenario,
                self.highlighter,
                base.add_modifier(Modifier::BOLD),
                self.theme,
            )),
            Line::from(""),
        ];

        for (i, option) in question.options.iter().enumerate() {
            let chosen = self.quiz.selected() == Some(i);
            let (marker, style) = if submitted && i == question.correct_answer {
                ("✓", Style::default().fg(colors.success()).add_modifier(Modifier::BOLD))
            } else if submitted && chosen {
                ("✗", Style::default().fg(colors.error()))
            } else if !submitted && i == self.cursor {
                (">", Style::default().fg(colors.accent()).bg(colors.selected_bg()))
            } else {
                (" ", base)
            };
            let mut spans = vec![Span::styled(format!(" {marker} {}. ", i + 1), style)];
            spans.extend(term_spans(option, self.highlighter, style, self.theme));
            lines.push(Line::from(spans));
        }

        if submitted {
            lines.push(Line::from(""));
            let verdict = match self.quiz.last_answer_correct() {
                Some(true) => Span::styled("Correct.", Style::default().fg(colors.success())),
                _ => Span::styled("Incorrect.", Style::default().fg(colors.error())),
            };
            lines.push(Line::from(verdict));
            let mut explanation = vec![Span::styled("Explanation: ", Style::default().fg(colors.accent()))];
            explanation.extend(term_spans(&question.explanation, self.highlighter, base, self.theme));
            lines.push(Line::from(explanation));
        }
        lines
    }
}

impl Widget for QuizView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(self.title())
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.lines())
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
