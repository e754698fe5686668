use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

use dynapsy::app::{App, AppScreen, FlashKind, GameStage, GlossaryFocus};
use dynapsy::config::Config;
use dynapsy::event::{AppEvent, EventHandler};
use dynapsy::session::games::{GameAction, GameMode};
use dynapsy::session::quiz::QuizState;
use dynapsy::ui;
use dynapsy::ui::components::chart::{NormalCurveChart, legend_lines};
use dynapsy::ui::components::chat_view::ChatTranscript;
use dynapsy::ui::components::game_view::{GamePicker, GameView};
use dynapsy::ui::components::glossary_view::{GlossaryFormPopup, GlossaryView};
use dynapsy::ui::components::lecture_view::{LectureDetail, LectureList};
use dynapsy::ui::components::progress_bar::ProgressBar;
use dynapsy::ui::components::quiz_view::QuizView;
use dynapsy::ui::layout::{AppLayout, LayoutTier, list_and_detail, pack_hint_lines};
use dynapsy::ui::line_input::InputResult;
use dynapsy::{assistant, logging};

#[derive(Parser)]
#[command(
    name = "dynapsy",
    version,
    about = "Study companion for dynamic psychology and psychological measurement"
)]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Directory for progress, custom terms and logs")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Run without contacting the assistant service")]
    offline: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir.to_string_lossy().to_string();
    }
    if let Some(theme) = &cli.theme {
        config.theme = theme.clone();
    }
    config.validate();

    logging::init(&config.data_path(), &config.log_level)?;

    let assistant = assistant::from_config(&config, cli.offline);
    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut app = App::new(config, assistant)?;

    if let Some(theme_name) = cli.theme {
        match ui::theme::Theme::load(&theme_name) {
            Some(theme) => app.set_theme(theme),
            None => tracing::warn!(theme = %theme_name, "unknown theme, using default"),
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(tick_rate);
    app.attach_events(events.sender());

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!("exiting after error: {err:#}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    app.advance_clock(Instant::now());
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
            AppEvent::AssistantReply(result) => app.on_assistant_reply(result),
        }
        app.advance_clock(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Home => handle_home_key(app, key),
        AppScreen::Chat => handle_chat_key(app, key),
        AppScreen::Lectures => handle_lectures_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::Games => handle_games_key(app, key),
        AppScreen::Glossary => handle_glossary_key(app, key),
        AppScreen::Measurement => handle_measurement_key(app, key),
    }
}

fn handle_home_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char(ch @ '1'..='6') => {
            app.menu.selected = (ch as usize) - ('1' as usize);
            app.open_menu_selection();
        }
        KeyCode::Char('t') => app.cycle_theme(),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => app.open_menu_selection(),
        _ => {}
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('r') if ctrl => return app.retry_chat(),
        KeyCode::Char('o') if ctrl => return app.toggle_chat_answer(),
        KeyCode::Tab => return app.chat_focus_quiz(1),
        KeyCode::BackTab => return app.chat_focus_quiz(-1),
        KeyCode::PageUp => {
            app.chat_scroll = app.chat_scroll.saturating_add(5);
            return;
        }
        KeyCode::PageDown => {
            app.chat_scroll = app.chat_scroll.saturating_sub(5);
            return;
        }
        _ => {}
    }
    match app.chat_input.handle(key) {
        InputResult::Submit => app.send_chat(),
        InputResult::Cancel => app.go_home(),
        InputResult::Continue => {}
    }
}

fn handle_lectures_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_home(),
        KeyCode::Up | KeyCode::Char('k') => app.lecture_move(-1),
        KeyCode::Down | KeyCode::Char('j') => app.lecture_move(1),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected_lecture(),
        KeyCode::PageDown => app.lecture_scroll = app.lecture_scroll.saturating_add(5),
        KeyCode::PageUp => app.lecture_scroll = app.lecture_scroll.saturating_sub(5),
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    let state = app.quiz.state();
    match key.code {
        KeyCode::Esc => app.quiz_back(),
        KeyCode::Up | KeyCode::Char('k') => app.quiz_move(-1),
        KeyCode::Down | KeyCode::Char('j') => app.quiz_move(1),
        KeyCode::Enter => app.quiz_confirm(),
        KeyCode::Char(ch @ '1'..='9') if state == QuizState::Answering => {
            let index = (ch as usize) - ('1' as usize);
            if !app.quiz.is_submitted() && index < app.quiz.current_question().map_or(0, |q| q.options.len()) {
                app.quiz_cursor = index;
                app.quiz_move(0);
            }
        }
        KeyCode::Char('r') if matches!(state, QuizState::Answering | QuizState::Completed) => {
            app.quiz_restart()
        }
        KeyCode::Char('d') if matches!(state, QuizState::Answering | QuizState::Completed | QuizState::Empty) => {
            app.quiz_back()
        }
        KeyCode::Char('l') => app.quiz_change_lecture(),
        _ => {}
    }
}

fn handle_games_key(app: &mut App, key: KeyEvent) {
    if app.game_stage != GameStage::Playing {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => app.games_back(),
            KeyCode::Up | KeyCode::Char('k') => app.games_move(-1),
            KeyCode::Down | KeyCode::Char('j') => app.games_move(1),
            KeyCode::Enter => app.games_confirm(),
            _ => {}
        }
        return;
    }

    let won = app.game.as_ref().is_some_and(|g| g.is_won());
    let Some(mode) = app.game.as_ref().map(|g| g.mode()) else {
        return app.games_back();
    };

    if won {
        match key.code {
            KeyCode::Enter | KeyCode::Char('r') => app.games_restart(),
            KeyCode::Esc | KeyCode::Char('q') => app.games_back(),
            _ => {}
        }
        return;
    }

    if mode == GameMode::Scramble {
        match app.scramble_input.handle(key) {
            InputResult::Submit => app.submit_scramble_guess(),
            InputResult::Cancel => app.games_back(),
            InputResult::Continue => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.games_back(),
        KeyCode::Char('r') => app.games_restart(),
        KeyCode::Up | KeyCode::Char('k') => app.games_move(-1),
        KeyCode::Down | KeyCode::Char('j') => app.games_move(1),
        KeyCode::Enter => app.games_confirm(),
        KeyCode::Char('t') | KeyCode::Char('y') if mode == GameMode::TrueFalse => {
            app.game_action(GameAction::Answer(true))
        }
        KeyCode::Char('f') | KeyCode::Char('n') if mode == GameMode::TrueFalse => {
            app.game_action(GameAction::Answer(false))
        }
        KeyCode::Char(ch @ '1'..='3') if mode == GameMode::Sorting => {
            app.game_action(GameAction::Assign((ch as usize) - ('1' as usize)))
        }
        _ => {}
    }
}

fn handle_glossary_key(app: &mut App, key: KeyEvent) {
    match app.glossary_focus {
        GlossaryFocus::List => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => app.go_home(),
            KeyCode::Up | KeyCode::Char('k') => app.glossary_move(-1),
            KeyCode::Down | KeyCode::Char('j') => app.glossary_move(1),
            KeyCode::Char('/') | KeyCode::Char('s') => app.glossary_focus = GlossaryFocus::Search,
            KeyCode::Tab | KeyCode::Char('f') => app.cycle_glossary_filter(),
            KeyCode::Char('a') => app.open_glossary_form(),
            KeyCode::Char('x') | KeyCode::Delete => app.delete_selected_term(),
            _ => {}
        },
        GlossaryFocus::Search => {
            match app.glossary_query.handle(key) {
                InputResult::Submit | InputResult::Cancel => app.glossary_focus = GlossaryFocus::List,
                InputResult::Continue => {}
            }
            app.glossary_selected = 0;
        }
        GlossaryFocus::Form(field) => {
            if key.code == KeyCode::Tab {
                app.glossary_focus = GlossaryFocus::Form(field.next());
                return;
            }
            match app.glossary_form.field_mut(field).handle(key) {
                InputResult::Submit => app.submit_glossary_form(),
                InputResult::Cancel => app.glossary_focus = GlossaryFocus::List,
                InputResult::Continue => {}
            }
        }
    }
}

fn handle_measurement_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_home(),
        KeyCode::Left | KeyCode::Char('h') => app.measurement_move(-1.0),
        KeyCode::Right | KeyCode::Char('l') => app.measurement_move(1.0),
        KeyCode::Char('0') => app.measurement_z = 0.0,
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    if app.screen == AppScreen::Home {
        return render_home(frame, app);
    }

    let layout = AppLayout::new(area);
    render_header(frame, app, layout.header);
    match app.screen {
        AppScreen::Home => {}
        AppScreen::Chat => render_chat(frame, app, &layout),
        AppScreen::Lectures => render_lectures(frame, app, &layout),
        AppScreen::Quiz => render_quiz(frame, app, &layout),
        AppScreen::Games => render_games(frame, app, &layout),
        AppScreen::Glossary => render_glossary(frame, app, &layout),
        AppScreen::Measurement => render_measurement(frame, app, &layout),
    }
    render_footer(frame, app, layout.footer);
}

fn screen_title(screen: AppScreen) -> &'static str {
    match screen {
        AppScreen::Home => "Home",
        AppScreen::Chat => "Academic Assistant",
        AppScreen::Lectures => "Lectures",
        AppScreen::Quiz => "Quiz Bank",
        AppScreen::Games => "Games",
        AppScreen::Glossary => "Glossary",
        AppScreen::Measurement => "Measurement",
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let mut spans = vec![
        Span::styled(
            " dynapsy ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("| {} ", screen_title(app.screen)),
            Style::default().fg(colors.text_muted()).bg(colors.header_bg()),
        ),
    ];
    if let Some(flash) = &app.flash {
        let color = match flash.kind {
            FlashKind::Info => colors.accent(),
            FlashKind::Success => colors.success(),
            FlashKind::Error => colors.error(),
        };
        spans.push(Span::styled(
            format!("| {}", flash.text),
            Style::default().fg(color).bg(colors.header_bg()),
        ));
    }
    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn footer_hints(app: &App) -> Vec<&'static str> {
    match app.screen {
        AppScreen::Home => vec!["[1-6] Open", "[t] Theme", "[q] Quit"],
        AppScreen::Chat => vec![
            "[Enter] Send",
            "[Tab] Next question",
            "[Ctrl+O] Show/hide answer",
            "[Ctrl+R] Retry",
            "[PgUp/PgDn] Scroll",
            "[Esc] Home",
        ],
        AppScreen::Lectures => vec![
            "[↑/↓] Select",
            "[Space] Mark studied",
            "[PgUp/PgDn] Scroll",
            "[Esc] Home",
        ],
        AppScreen::Quiz => match app.quiz.state() {
            QuizState::LectureSelect | QuizState::DifficultySelect => {
                vec!["[↑/↓] Select", "[Enter] Choose", "[Esc] Back"]
            }
            QuizState::Answering if app.quiz.is_submitted() => {
                vec!["[Enter] Next", "[r] Restart", "[d] Difficulty", "[l] Lecture", "[Esc] Back"]
            }
            QuizState::Answering => vec![
                "[↑/↓ or 1-4] Choose",
                "[Enter] Submit",
                "[r] Restart",
                "[d] Difficulty",
                "[l] Lecture",
            ],
            QuizState::Completed => vec!["[Enter] Try again", "[d] Difficulty", "[l] Lecture"],
            QuizState::Empty => vec!["[Enter] Other difficulty", "[l] Lecture", "[Esc] Back"],
        },
        AppScreen::Games => match (app.game_stage, app.game.as_ref().map(|g| g.mode())) {
            (GameStage::Playing, Some(GameMode::TrueFalse)) => {
                vec!["[t] True", "[f] False", "[r] Restart", "[Esc] Leave"]
            }
            (GameStage::Playing, Some(GameMode::Sorting)) => {
                vec!["[1-3] Category", "[r] Restart", "[Esc] Leave"]
            }
            (GameStage::Playing, Some(GameMode::Scramble)) => {
                vec!["[Enter] Guess", "[Esc] Leave"]
            }
            (GameStage::Playing, _) => vec!["[↑/↓] Move", "[Enter] Pick", "[r] Restart", "[Esc] Leave"],
            _ => vec!["[↑/↓] Select", "[Enter] Choose", "[Esc] Back"],
        },
        AppScreen::Glossary => match app.glossary_focus {
            GlossaryFocus::List => vec![
                "[/] Search",
                "[Tab] Filter",
                "[a] Add term",
                "[x] Delete mine",
                "[Esc] Home",
            ],
            GlossaryFocus::Search => vec!["[Enter/Esc] Done"],
            GlossaryFocus::Form(_) => vec!["[Tab] Next field", "[Enter] Save", "[Esc] Cancel"],
        },
        AppScreen::Measurement => vec!["[←/→] Move z", "[0] Reset", "[Esc] Home"],
    }
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let hints = footer_hints(app);
    let text = pack_hint_lines(&hints, area.width as usize)
        .into_iter()
        .next()
        .unwrap_or_default();
    let footer = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(colors.text_muted()),
    )));
    frame.render_widget(footer, area);
}

fn render_home(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, layout[0]);

    let menu_area = ui::layout::centered_rect(50, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    let status = if app.assistant_enabled() {
        "assistant online"
    } else {
        "assistant offline"
    };
    let mut hints = footer_hints(app);
    hints.push(status);
    let text = pack_hint_lines(&hints, layout[2].width as usize)
        .into_iter()
        .next()
        .unwrap_or_default();
    let footer = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(colors.text_muted()),
    )));
    frame.render_widget(footer, layout[2]);
}

fn render_chat(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(layout.main);

    let transcript = ChatTranscript::new(app.chat.transcript(), &app.highlighter, app.theme)
        .busy(app.chat.is_busy())
        .error(app.chat.last_error())
        .quiz_focus(app.chat_quiz_focus)
        .revealed(&app.chat_revealed)
        .scroll_from_bottom(app.chat_scroll);
    frame.render_widget(transcript, parts[0]);

    let (before, at, after) = app.chat_input.render_parts();
    let title = if app.chat.is_busy() {
        " Waiting for reply… "
    } else if !app.assistant_enabled() {
        " Message (assistant offline) "
    } else {
        " Message "
    };
    let input = Paragraph::new(Line::from(vec![
        Span::styled(before.to_string(), Style::default().fg(colors.fg())),
        Span::styled(
            at.map_or(" ".to_string(), |c| c.to_string()),
            Style::default().fg(colors.bg()).bg(colors.fg()),
        ),
        Span::styled(after.to_string(), Style::default().fg(colors.fg())),
    ]))
    .block(
        Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border_focused())),
    );
    frame.render_widget(input, parts[1]);
}

fn render_lectures(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(layout.main);

    let lectures = app.content.lectures();
    let done = app.progress.completed_count().min(lectures.len());
    let bar = ProgressBar::new("Course progress", app.overall_progress(), app.theme)
        .caption(format!("{done} of {} studied", lectures.len()));
    frame.render_widget(bar, rows[0]);

    let (list_area, detail_area) = list_and_detail(rows[1], layout.tier, lectures.len() as u16);
    frame.render_widget(
        LectureList::new(lectures, &app.progress, app.lecture_selected, app.theme),
        list_area,
    );
    if let Some(lecture) = app.selected_lecture() {
        frame.render_widget(
            LectureDetail::new(
                lecture,
                app.progress.is_completed(lecture.id),
                &app.highlighter,
                app.lecture_scroll,
                app.theme,
            ),
            detail_area,
        );
    }
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let view = QuizView::new(
        &app.quiz,
        &app.content,
        app.quiz_cursor,
        &app.highlighter,
        app.theme,
    );
    frame.render_widget(view, layout.main);
}

fn render_games(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    match (app.game_stage, app.game.as_ref()) {
        (GameStage::Playing, Some(session)) => {
            let view = GameView::new(session, app.game_cursor, &app.scramble_input, app.theme);
            frame.render_widget(view, layout.main);
        }
        (GameStage::PickMode(id), _) => {
            let picker = GamePicker::modes(id, app.game_modes(id), app.game_cursor, app.theme);
            frame.render_widget(picker, layout.main);
        }
        _ => {
            let picker = GamePicker::lectures(app.content.lectures(), app.game_cursor, app.theme);
            frame.render_widget(picker, layout.main);
        }
    }
}

fn render_glossary(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let items = app.glossary_items();
    let view = GlossaryView::new(
        &items,
        app.glossary_selected,
        &app.glossary_query,
        app.glossary_focus == GlossaryFocus::Search,
        app.glossary_filter,
        app.theme,
    );
    frame.render_widget(view, layout.main);

    if let GlossaryFocus::Form(field) = app.glossary_focus {
        let popup_area = ui::layout::centered_rect(60, 60, layout.main);
        let popup = GlossaryFormPopup {
            term: &app.glossary_form.term,
            term_en: &app.glossary_form.term_en,
            definition: &app.glossary_form.definition,
            focus: field,
            theme: app.theme,
        };
        frame.render_widget(popup, popup_area);
    }
}

fn render_measurement(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let direction = match layout.tier {
        LayoutTier::Wide => Direction::Horizontal,
        LayoutTier::Narrow => Direction::Vertical,
    };
    let parts = Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(layout.main);

    frame.render_widget(NormalCurveChart::new(app.measurement_z, app.theme), parts[0]);

    let legend = Paragraph::new(legend_lines(app.measurement_z, app.theme))
        .wrap(Wrap { trim: false })
        .block(
            Block::bordered()
                .title(" Scores ")
                .border_style(Style::default().fg(colors.border())),
        );
    frame.render_widget(legend, parts[1]);
}
