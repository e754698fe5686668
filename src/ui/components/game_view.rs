use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::content::LectureRecord;
use crate::session::games::matching::{CardKind, Matching};
use crate::session::games::scramble::Scramble;
use crate::session::games::sequencing::Sequencing;
use crate::session::games::sorting::{CATEGORIES, Sorting};
use crate::session::games::true_false::{COUNTDOWN_TICKS, Phase, TrueFalse};
use crate::session::games::{GameBoard, GameMode, GameSession};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Lecture list, then the modes that lecture offers.
pub struct GamePicker<'a> {
    lectures: &'a [LectureRecord],
    /// `Some` once a lecture is chosen: its id and available modes.
    modes: Option<(u32, Vec<GameMode>)>,
    cursor: usize,
    theme: &'a Theme,
}

impl<'a> GamePicker<'a> {
    pub fn lectures(lectures: &'a [LectureRecord], cursor: usize, theme: &'a Theme) -> Self {
        Self {
            lectures,
            modes: None,
            cursor,
            theme,
        }
    }

    pub fn modes(lecture_id: u32, modes: Vec<GameMode>, cursor: usize, theme: &'a Theme) -> Self {
        Self {
            lectures: &[],
            modes: Some((lecture_id, modes)),
            cursor,
            theme,
        }
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let row = |i: usize, text: String| {
            if i == self.cursor {
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
        };

        match &self.modes {
            None => self
                .lectures
                .iter()
                .enumerate()
                .map(|(i, lecture)| row(i, format!("{}. {}", lecture.id, lecture.title)))
                .collect(),
            Some((_, modes)) if modes.is_empty() => vec![Line::from(Span::styled(
                "This lecture has no games yet.",
                Style::default().fg(colors.warning()),
            ))],
            Some((_, modes)) => modes
                .iter()
                .enumerate()
                .flat_map(|(i, mode)| {
                    [
                        row(i, mode.label().to_string()),
                        Line::from(Span::styled(
                            format!("     {}", mode.description()),
                            Style::default().fg(colors.text_muted()),
                        )),
                    ]
                })
                .collect(),
        }
    }
}

impl Widget for GamePicker<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let title = match &self.modes {
            None => " Games · choose a lecture ".to_string(),
            Some((id, _)) => format!(" Games · lecture {id} "),
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);
        Paragraph::new(self.lines()).render(inner, buf);
    }
}

/// The board of a running game.
pub struct GameView<'a> {
    session: &'a GameSession,
    cursor: usize,
    input: &'a LineInput,
    theme: &'a Theme,
}

impl<'a> GameView<'a> {
    pub fn new(session: &'a GameSession, cursor: usize, input: &'a LineInput, theme: &'a Theme) -> Self {
        Self {
            session,
            cursor,
            input,
            theme,
        }
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let mut lines = vec![
            Line::from(vec![
                Span::styled(
                    self.session.mode().label(),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("   score {}", self.session.score()),
                    Style::default().fg(colors.text_muted()),
                ),
            ]),
            Line::from(""),
        ];

        match self.session.board() {
            GameBoard::Matching(g) => self.matching(g, &mut lines),
            GameBoard::TrueFalse(g) => self.true_false(g, &mut lines),
            GameBoard::Sorting(g) => self.sorting(g, &mut lines),
            GameBoard::Sequencing(g) => self.sequencing(g, &mut lines),
            GameBoard::Scramble(g) => self.scramble(g, &mut lines),
        }

        if self.session.is_won() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("★ Finished with {} points. [Enter] play again", self.session.score()),
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            )));
        }
        lines
    }

    fn matching(&self, game: &Matching, lines: &mut Vec<Line<'static>>) {
        let colors = &self.theme.colors;
        lines.push(Line::from(Span::styled(
            format!("Pairs found: {}/{}", game.matched_count(), game.cards().len() / 2),
            Style::default().fg(colors.text_muted()),
        )));
        for (i, card) in game.cards().iter().enumerate() {
            let tag = match card.kind {
                CardKind::Term => "T",
                CardKind::Definition => "D",
            };
            let mut style = if game.is_matched(i) {
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::CROSSED_OUT)
            } else if game.pending() == Some(i) {
                Style::default()
                    .fg(colors.warning())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            let marker = if i == self.cursor { ">" } else { " " };
            if i == self.cursor {
                style = style.bg(colors.selected_bg());
            }
            lines.push(Line::from(Span::styled(
                format!(" {marker} [{tag}] {}", card.text),
                style,
            )));
        }
    }

    fn true_false(&self, game: &TrueFalse, lines: &mut Vec<Line<'static>>) {
        let colors = &self.theme.colors;
        let total = game.statements().len();
        let Some(statement) = game.current() else {
            return;
        };
        lines.push(Line::from(Span::styled(
            format!("Statement {} of {total}", game.index() + 1),
            Style::default().fg(colors.text_muted()),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}: ", statement.term),
                Style::default()
                    .fg(colors.term())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(statement.claim.clone(), Style::default().fg(colors.fg())),
        ]));
        lines.push(Line::from(""));

        match game.phase() {
            Phase::Asking { remaining } => {
                let filled = remaining as usize;
                let empty = COUNTDOWN_TICKS.saturating_sub(remaining) as usize;
                let timer_color = if remaining <= 3 { colors.error() } else { colors.accent() };
                lines.push(Line::from(vec![
                    Span::styled("█".repeat(filled), Style::default().fg(timer_color)),
                    Span::styled("░".repeat(empty), Style::default().fg(colors.bar_empty())),
                    Span::styled(format!(" {remaining}s"), Style::default().fg(timer_color)),
                ]));
                lines.push(Line::from(Span::styled(
                    "[t] True   [f] False",
                    Style::default().fg(colors.text_muted()),
                )));
            }
            Phase::Feedback { correct, .. } => {
                let (text, color) = if correct {
                    ("Correct!", colors.success())
                } else {
                    ("Wrong.", colors.error())
                };
                lines.push(Line::from(Span::styled(text, Style::default().fg(color))));
                if !statement.is_true {
                    lines.push(Line::from(Span::styled(
                        format!("Actual definition: {}", statement.definition),
                        Style::default().fg(colors.text_muted()),
                    )));
                }
            }
            Phase::Finished => {}
        }
    }

    fn sorting(&self, game: &Sorting, lines: &mut Vec<Line<'static>>) {
        let colors = &self.theme.colors;
        lines.push(Line::from(Span::styled(
            format!("Sorted {}/{}", Sorting::total() - game.remaining(), Sorting::total()),
            Style::default().fg(colors.text_muted()),
        )));
        if let Some(item) = game.current() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  «{}»", item.text),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            let choices: Vec<Span> = CATEGORIES
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    Span::styled(format!("[{}] {name}   ", i + 1), Style::default().fg(colors.accent()))
                })
                .collect();
            lines.push(Line::from(choices));
        }
    }

    fn sequencing(&self, game: &Sequencing, lines: &mut Vec<Line<'static>>) {
        let colors = &self.theme.colors;
        lines.push(Line::from(Span::styled(
            "Pyramid so far (top first):",
            Style::default().fg(colors.text_muted()),
        )));
        for level in game.built().iter().rev() {
            lines.push(Line::from(Span::styled(
                format!("   {}. {}", level.order, level.text),
                Style::default().fg(colors.success()),
            )));
        }
        if !game.pool().is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Pick the next level up:",
                Style::default().fg(colors.text_muted()),
            )));
        }
        for (i, level) in game.pool().iter().enumerate() {
            let line = if i == self.cursor {
                Line::from(Span::styled(
                    format!(" > {}", level.text),
                    Style::default().fg(colors.accent()).bg(colors.selected_bg()),
                ))
            } else {
                Line::from(Span::styled(format!("   {}", level.text), Style::default().fg(colors.fg())))
            };
            lines.push(line);
        }
    }

    fn scramble(&self, game: &Scramble, lines: &mut Vec<Line<'static>>) {
        let colors = &self.theme.colors;
        let spaced: String = game
            .scrambled()
            .chars()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(Line::from(Span::styled(
            spaced,
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Hint: {}", game.hint()),
            Style::default().fg(colors.text_muted()),
        )));
        lines.push(Line::from(""));

        if self.session.is_won() {
            lines.push(Line::from(Span::styled(
                format!("Answer: {}", game.answer()),
                Style::default().fg(colors.success()),
            )));
        } else {
            let (before, at, after) = self.input.render_parts();
            let cursor_style = Style::default().fg(colors.bg()).bg(colors.fg());
            lines.push(Line::from(vec![
                Span::styled("Your guess: ", Style::default().fg(colors.fg())),
                Span::styled(before.to_string(), Style::default().fg(colors.fg())),
                Span::styled(at.map_or(" ".to_string(), |c| c.to_string()), cursor_style),
                Span::styled(after.to_string(), Style::default().fg(colors.fg())),
            ]));
        }
        lines.push(Line::from(Span::styled(
            format!("Attempts: {}", game.attempts()),
            Style::default().fg(colors.text_muted()),
        )));
    }
}

impl Widget for GameView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(" Games · lecture {} ", self.session.lecture_id()))
            .border_style(Style::default().fg(colors.border_focused()));
        let inner = block.inner(area);
        block.render(area, buf);
        Paragraph::new(self.lines())
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
