use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::assistant::{Assistant, AssistantError, Message};
use crate::config::Config;
use crate::content::glossary::{GlossaryError, GlossaryFilter, GlossaryItem, GlossaryManager};
use crate::content::progress::ProgressTracker;
use crate::content::{ContentStore, Difficulty, GlossaryEntry, LectureRecord};
use crate::engine::Highlighter;
use crate::engine::measurement;
use crate::event::AppEvent;
use crate::session::chat::ChatSession;
use crate::session::games::{GameAction, GameBoard, GameMode, GameSession, Outcome};
use crate::session::quiz::{QuizEngine, QuizError, QuizState};
use crate::store::json_store::{JsonStore, KeyValueStore};
use crate::store::repository::JsonRepository;
use crate::store::schema::{COMPLETED_LECTURES_KEY, CUSTOM_TERMS_KEY};
use crate::ui::components::glossary_view::FormField;
use crate::ui::components::menu::Menu;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

const GAME_SECOND_MS: u64 = 1000;
const Z_STEP: f64 = 0.5;
const Z_LIMIT: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Home,
    Chat,
    Lectures,
    Quiz,
    Games,
    Glossary,
    Measurement,
}

impl AppScreen {
    /// Order of the home menu entries.
    pub const MENU: [AppScreen; 6] = [
        AppScreen::Chat,
        AppScreen::Lectures,
        AppScreen::Quiz,
        AppScreen::Games,
        AppScreen::Glossary,
        AppScreen::Measurement,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStage {
    PickLecture,
    PickMode(u32),
    Playing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlossaryFocus {
    List,
    Search,
    Form(FormField),
}

#[derive(Default)]
pub struct GlossaryForm {
    pub term: LineInput,
    pub term_en: LineInput,
    pub definition: LineInput,
}

impl GlossaryForm {
    pub fn field_mut(&mut self, field: FormField) -> &mut LineInput {
        match field {
            FormField::Term => &mut self.term,
            FormField::TermEn => &mut self.term_en,
            FormField::Definition => &mut self.definition,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug)]
pub struct Flash {
    pub text: String,
    pub kind: FlashKind,
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub content: Arc<ContentStore>,
    pub highlighter: Highlighter,
    pub progress: ProgressTracker,
    pub glossary: GlossaryManager,
    pub quiz: QuizEngine,
    pub chat: ChatSession,
    pub game: Option<GameSession>,
    pub should_quit: bool,
    pub flash: Option<Flash>,

    pub lecture_selected: usize,
    pub lecture_scroll: u16,
    pub quiz_cursor: usize,
    pub game_stage: GameStage,
    pub game_cursor: usize,
    pub scramble_input: LineInput,
    pub chat_input: LineInput,
    pub chat_scroll: u16,
    pub chat_quiz_focus: Option<usize>,
    pub chat_revealed: HashSet<usize>,
    pub glossary_query: LineInput,
    pub glossary_filter: GlossaryFilter,
    pub glossary_focus: GlossaryFocus,
    pub glossary_selected: usize,
    pub glossary_form: GlossaryForm,
    pub measurement_z: f64,

    assistant: Arc<dyn Assistant>,
    events: Option<Sender<AppEvent>>,
    game_clock_ms: u64,
    last_clock: Option<Instant>,
}

impl App {
    pub fn new(config: Config, assistant: Arc<dyn Assistant>) -> Result<Self> {
        let content = Arc::new(ContentStore::load()?);
        let store = JsonStore::with_base_dir(config.data_path())?;
        tracing::info!(
            data_dir = %store.base_dir().display(),
            lectures = content.lectures().len(),
            "starting"
        );
        Ok(Self::with_store(config, content, store, assistant))
    }

    pub fn with_store<S>(
        config: Config,
        content: Arc<ContentStore>,
        store: S,
        assistant: Arc<dyn Assistant>,
    ) -> Self
    where
        S: KeyValueStore + Clone + 'static,
    {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        let progress = ProgressTracker::new(Box::new(JsonRepository::new(
            store.clone(),
            COMPLETED_LECTURES_KEY,
        )));
        let glossary = GlossaryManager::new(
            &content,
            Box::new(JsonRepository::new(store, CUSTOM_TERMS_KEY)),
        );
        let highlighter = build_highlighter(&content, &glossary);
        let mut menu = Menu::new(theme);
        menu.progress = progress.ratio(&lecture_ids(&content));

        Self {
            screen: AppScreen::Home,
            menu,
            theme,
            config,
            quiz: QuizEngine::new(Arc::clone(&content)),
            content,
            highlighter,
            progress,
            glossary,
            chat: ChatSession::new(),
            game: None,
            should_quit: false,
            flash: None,
            lecture_selected: 0,
            lecture_scroll: 0,
            quiz_cursor: 0,
            game_stage: GameStage::PickLecture,
            game_cursor: 0,
            scramble_input: LineInput::default(),
            chat_input: LineInput::default(),
            chat_scroll: 0,
            chat_quiz_focus: None,
            chat_revealed: HashSet::new(),
            glossary_query: LineInput::default(),
            glossary_filter: GlossaryFilter::All,
            glossary_focus: GlossaryFocus::List,
            glossary_selected: 0,
            glossary_form: GlossaryForm::default(),
            measurement_z: 0.0,
            assistant,
            events: None,
            game_clock_ms: 0,
            last_clock: None,
        }
    }

    /// Route assistant replies through the event loop instead of blocking.
    pub fn attach_events(&mut self, tx: Sender<AppEvent>) {
        self.events = Some(tx);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        let theme: &'static Theme = Box::leak(Box::new(theme));
        self.theme = theme;
        self.menu.theme = theme;
    }

    /// Switch to the next bundled theme and remember it in the config file.
    pub fn cycle_theme(&mut self) {
        let names = Theme::available_themes();
        if names.is_empty() {
            return;
        }
        let next = names
            .iter()
            .position(|n| *n == self.config.theme)
            .map_or(0, |i| (i + 1) % names.len());
        let name = names[next].clone();
        let Some(theme) = Theme::load(&name) else {
            self.error(format!("Theme {name} could not be loaded"));
            return;
        };
        self.set_theme(theme);
        self.config.theme = name.clone();
        match self.config.save() {
            Ok(()) => self.info(format!("Theme: {name}")),
            Err(e) => {
                tracing::warn!("failed to save config: {e:#}");
                self.error(format!("Theme {name} applied but not saved: {e}"));
            }
        }
    }

    pub fn assistant_enabled(&self) -> bool {
        self.assistant.is_enabled()
    }

    fn info(&mut self, text: impl Into<String>) {
        self.flash = Some(Flash {
            text: text.into(),
            kind: FlashKind::Info,
        });
    }

    fn success(&mut self, text: impl Into<String>) {
        self.flash = Some(Flash {
            text: text.into(),
            kind: FlashKind::Success,
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.flash = Some(Flash {
            text: text.into(),
            kind: FlashKind::Error,
        });
    }

    // --- navigation ---

    pub fn go_to(&mut self, screen: AppScreen) {
        self.screen = screen;
        self.flash = None;
    }

    pub fn go_home(&mut self) {
        self.go_to(AppScreen::Home);
    }

    pub fn open_menu_selection(&mut self) {
        if let Some(screen) = AppScreen::MENU.get(self.menu.selected) {
            self.go_to(*screen);
        }
    }

    /// Feed wall-clock time to the running game. Called after every event, so
    /// the countdown keeps moving while keys are held down.
    pub fn advance_clock(&mut self, now: Instant) {
        let elapsed = self
            .last_clock
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_clock = Some(now);
        if self.screen != AppScreen::Games {
            return;
        }
        self.game_clock_ms += elapsed.as_millis() as u64;
        while self.game_clock_ms >= GAME_SECOND_MS {
            self.game_clock_ms -= GAME_SECOND_MS;
            if let Some(game) = self.game.as_mut() {
                game.apply(GameAction::Tick);
            }
        }
    }

    // --- lectures ---

    pub fn lecture_ids(&self) -> Vec<u32> {
        lecture_ids(&self.content)
    }

    pub fn selected_lecture(&self) -> Option<&LectureRecord> {
        self.content.lectures().get(self.lecture_selected)
    }

    pub fn overall_progress(&self) -> f64 {
        self.progress.ratio(&self.lecture_ids())
    }

    pub fn lecture_move(&mut self, delta: isize) {
        self.lecture_selected = step(self.lecture_selected, delta, self.content.lectures().len());
        self.lecture_scroll = 0;
    }

    pub fn toggle_selected_lecture(&mut self) {
        let Some(id) = self.selected_lecture().map(|l| l.id) else {
            return;
        };
        let toggled = self.progress.toggle(id);
        self.menu.progress = self.overall_progress();
        match toggled {
            Ok(true) => self.success(format!("Lecture {id} marked as studied")),
            Ok(false) => self.info(format!("Lecture {id} marked as not studied")),
            Err(e) => {
                tracing::warn!(lecture = id, "failed to save progress: {e:#}");
                self.error(format!("Could not save progress: {e}"));
            }
        }
    }

    // --- quiz ---

    fn quiz_list_len(&self) -> usize {
        match self.quiz.state() {
            QuizState::LectureSelect => self.content.lectures().len(),
            QuizState::DifficultySelect => Difficulty::ALL.len(),
            QuizState::Answering => self.quiz.current_question().map_or(0, |q| q.options.len()),
            QuizState::Empty | QuizState::Completed => 0,
        }
    }

    pub fn quiz_move(&mut self, delta: isize) {
        if self.quiz.is_submitted() {
            return;
        }
        self.quiz_cursor = step(self.quiz_cursor, delta, self.quiz_list_len());
        if self.quiz.state() == QuizState::Answering {
            let result = self.quiz.select_option(self.quiz_cursor);
            self.report_quiz(result);
        }
    }

    /// Enter on the quiz screen: the default action for the current state.
    pub fn quiz_confirm(&mut self) {
        let result = match self.quiz.state() {
            QuizState::LectureSelect => match self.content.lectures().get(self.quiz_cursor) {
                Some(lecture) => self.quiz.choose_lecture(lecture.id),
                None => Ok(()),
            },
            QuizState::DifficultySelect => match Difficulty::ALL.get(self.quiz_cursor) {
                Some(d) => self.quiz.choose_difficulty(*d).map(|_| ()),
                None => Ok(()),
            },
            QuizState::Answering if !self.quiz.is_submitted() => {
                if self.quiz.selected().is_none() && self.quiz_list_len() > 0 {
                    // Enter with the cursor on an option both selects and submits it.
                    let _ = self.quiz.select_option(self.quiz_cursor);
                }
                self.quiz.submit().map(|correct| {
                    if correct {
                        self.success("Correct!");
                    } else {
                        self.error("Not quite. Read the explanation below.");
                    }
                })
            }
            QuizState::Answering => self.quiz.next_question(),
            QuizState::Completed => self.quiz.restart_same_difficulty(),
            QuizState::Empty => self.quiz.change_difficulty(),
        };
        if self.report_quiz(result) {
            self.quiz_cursor = 0;
        }
    }

    pub fn quiz_back(&mut self) {
        let result = match self.quiz.state() {
            QuizState::LectureSelect => {
                self.go_home();
                return;
            }
            QuizState::DifficultySelect => self.quiz.back_to_lectures(),
            QuizState::Answering | QuizState::Completed | QuizState::Empty => {
                self.quiz.change_difficulty()
            }
        };
        if self.report_quiz(result) {
            self.quiz_cursor = 0;
        }
    }

    pub fn quiz_restart(&mut self) {
        let result = self.quiz.restart_same_difficulty();
        if self.report_quiz(result) {
            self.quiz_cursor = 0;
        }
    }

    pub fn quiz_change_lecture(&mut self) {
        self.quiz.change_lecture();
        self.quiz_cursor = 0;
    }

    fn report_quiz(&mut self, result: Result<(), QuizError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                self.error(e.to_string());
                false
            }
        }
    }

    // --- games ---

    pub fn game_modes(&self, lecture_id: u32) -> Vec<GameMode> {
        self.content
            .lecture(lecture_id)
            .map(GameMode::available_for)
            .unwrap_or_default()
    }

    pub fn games_move(&mut self, delta: isize) {
        let len = match self.game_stage {
            GameStage::PickLecture => self.content.lectures().len(),
            GameStage::PickMode(id) => self.game_modes(id).len(),
            GameStage::Playing => match self.game.as_ref().map(GameSession::board) {
                Some(GameBoard::Matching(g)) => g.cards().len(),
                Some(GameBoard::Sequencing(g)) => g.pool().len(),
                _ => 0,
            },
        };
        self.game_cursor = step(self.game_cursor, delta, len);
    }

    pub fn games_confirm(&mut self) {
        match self.game_stage {
            GameStage::PickLecture => {
                if let Some(lecture) = self.content.lectures().get(self.game_cursor) {
                    self.game_stage = GameStage::PickMode(lecture.id);
                    self.game_cursor = 0;
                }
            }
            GameStage::PickMode(lecture_id) => {
                let Some(mode) = self.game_modes(lecture_id).get(self.game_cursor).copied() else {
                    return;
                };
                let Some(lecture) = self.content.lecture(lecture_id) else {
                    return;
                };
                match GameSession::start(lecture, mode) {
                    Ok(session) => {
                        self.game = Some(session);
                        self.game_stage = GameStage::Playing;
                        self.game_cursor = 0;
                        self.game_clock_ms = 0;
                        self.scramble_input.clear();
                    }
                    Err(e) => self.error(e.to_string()),
                }
            }
            GameStage::Playing => {
                if self.game.as_ref().is_some_and(GameSession::is_won) {
                    self.games_restart();
                    return;
                }
                let action = match self.game.as_ref().map(GameSession::mode) {
                    Some(GameMode::Matching) | Some(GameMode::Sequencing) => {
                        GameAction::Select(self.game_cursor)
                    }
                    _ => return,
                };
                self.game_action(action);
            }
        }
    }

    pub fn game_action(&mut self, action: GameAction) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        let mode = game.mode();
        let outcome = game.apply(action);
        let won = game.is_won();
        let points = game.score();

        if let GameBoard::Sequencing(g) = game.board() {
            if self.game_cursor >= g.pool().len() {
                self.game_cursor = g.pool().len().saturating_sub(1);
            }
        }

        match (mode, outcome) {
            (GameMode::Scramble, Outcome::Wrong) => {
                self.scramble_input.clear();
                self.error("Not the term. Try again.");
            }
            (GameMode::Sorting | GameMode::Sequencing, Outcome::Wrong) => {
                self.error("Wrong choice");
            }
            (_, Outcome::Correct) => self.flash = None,
            _ => {}
        }
        if won {
            self.success(format!("Well done! Final score: {points}"));
        }
    }

    pub fn submit_scramble_guess(&mut self) {
        let guess = self.scramble_input.take();
        self.game_action(GameAction::Guess(guess));
    }

    pub fn games_restart(&mut self) {
        if let Some(game) = self.game.as_mut() {
            game.restart();
            self.game_cursor = 0;
            self.game_clock_ms = 0;
            self.scramble_input.clear();
            self.flash = None;
        }
    }

    pub fn games_back(&mut self) {
        match self.game_stage {
            GameStage::PickLecture => self.go_home(),
            GameStage::PickMode(_) => {
                self.game_stage = GameStage::PickLecture;
                self.game_cursor = 0;
            }
            GameStage::Playing => {
                self.game = None;
                self.game_stage = GameStage::PickLecture;
                self.game_cursor = 0;
                self.flash = None;
            }
        }
    }

    // --- glossary ---

    pub fn glossary_items(&self) -> Vec<GlossaryItem<'_>> {
        self.glossary
            .search(self.glossary_query.value(), self.glossary_filter)
    }

    pub fn glossary_move(&mut self, delta: isize) {
        let len = self.glossary_items().len();
        self.glossary_selected = step(self.glossary_selected, delta, len);
    }

    /// All → each lecture in order → Custom → All.
    pub fn cycle_glossary_filter(&mut self) {
        let ids = self.lecture_ids();
        self.glossary_filter = match self.glossary_filter {
            GlossaryFilter::All => ids
                .first()
                .map_or(GlossaryFilter::Custom, |id| GlossaryFilter::Lecture(*id)),
            GlossaryFilter::Lecture(current) => ids
                .iter()
                .skip_while(|id| **id != current)
                .nth(1)
                .map_or(GlossaryFilter::Custom, |id| GlossaryFilter::Lecture(*id)),
            GlossaryFilter::Custom => GlossaryFilter::All,
        };
        self.glossary_selected = 0;
    }

    pub fn open_glossary_form(&mut self) {
        self.glossary_form = GlossaryForm::default();
        self.glossary_focus = GlossaryFocus::Form(FormField::Term);
    }

    pub fn submit_glossary_form(&mut self) {
        let result = self.glossary.add(
            self.glossary_form.term.value(),
            self.glossary_form.term_en.value(),
            self.glossary_form.definition.value(),
        );
        match result {
            Ok(term) => {
                let message = format!("Added \"{}\"", term.term);
                self.rebuild_highlighter();
                self.glossary_focus = GlossaryFocus::List;
                self.glossary_filter = GlossaryFilter::Custom;
                self.glossary_selected = 0;
                self.success(message);
            }
            Err(GlossaryError::EmptyTerm) => {
                self.glossary_focus = GlossaryFocus::Form(FormField::Term);
                self.error("A term is required");
            }
            Err(GlossaryError::EmptyDefinition) => {
                self.glossary_focus = GlossaryFocus::Form(FormField::Definition);
                self.error("A definition is required");
            }
            Err(e @ GlossaryError::Persist(_)) => {
                tracing::warn!("failed to save glossary: {e:#}");
                self.error(format!("Could not save glossary: {e}"));
            }
        }
    }

    pub fn delete_selected_term(&mut self) {
        let Some(id) = self
            .glossary_items()
            .get(self.glossary_selected)
            .filter(|item| item.is_custom())
            .map(|item| item.id.to_string())
        else {
            self.info("Only your own terms can be deleted");
            return;
        };
        match self.glossary.delete(&id) {
            Ok(true) => {
                self.rebuild_highlighter();
                let len = self.glossary_items().len();
                self.glossary_selected = self.glossary_selected.min(len.saturating_sub(1));
                self.success("Term deleted");
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(term = %id, "failed to save glossary: {e:#}");
                self.error(format!("Could not save glossary: {e}"));
            }
        }
    }

    fn rebuild_highlighter(&mut self) {
        self.highlighter = build_highlighter(&self.content, &self.glossary);
    }

    // --- chat ---

    pub fn send_chat(&mut self) {
        match self.chat.submit(self.chat_input.value()) {
            Ok(history) => {
                self.chat_input.clear();
                self.chat_scroll = 0;
                self.dispatch(history);
            }
            Err(e) => self.info(e.to_string()),
        }
    }

    pub fn retry_chat(&mut self) {
        match self.chat.retry() {
            Ok(history) => self.dispatch(history),
            Err(e) => self.info(e.to_string()),
        }
    }

    /// Move the practice-question focus. With nothing focused yet, the newest
    /// question is picked first.
    pub fn chat_focus_quiz(&mut self, delta: isize) {
        let count = self.chat.quiz_count();
        self.chat_quiz_focus = match (count, self.chat_quiz_focus) {
            (0, _) => None,
            (_, None) => Some(count - 1),
            (_, Some(current)) => Some(step(current.min(count - 1), delta, count)),
        };
    }

    /// Show or hide the answer of the focused practice question.
    pub fn toggle_chat_answer(&mut self) {
        let Some(index) = self.chat_quiz_focus else {
            self.info("Press Tab to pick a practice question first");
            return;
        };
        if !self.chat_revealed.remove(&index) {
            self.chat_revealed.insert(index);
        }
    }

    fn dispatch(&mut self, history: Vec<Message>) {
        match &self.events {
            Some(tx) => {
                let tx = tx.clone();
                let assistant = Arc::clone(&self.assistant);
                thread::spawn(move || {
                    let result = assistant.reply(&history);
                    let _ = tx.send(AppEvent::AssistantReply(result));
                });
            }
            None => {
                let result = self.assistant.reply(&history);
                self.on_assistant_reply(result);
            }
        }
    }

    pub fn on_assistant_reply(&mut self, result: Result<String, AssistantError>) {
        let failed = result.is_err();
        self.chat.receive(result);
        self.chat_scroll = 0;
        if failed {
            self.error("The assistant could not answer. Press Ctrl+R to retry.");
        }
    }

    // --- measurement ---

    pub fn measurement_move(&mut self, delta: f64) {
        self.measurement_z = (self.measurement_z + delta * Z_STEP).clamp(-Z_LIMIT, Z_LIMIT);
    }

    pub fn measurement_t(&self) -> f64 {
        measurement::t_score(self.measurement_z)
    }
}

fn lecture_ids(content: &ContentStore) -> Vec<u32> {
    content.lectures().iter().map(|l| l.id).collect()
}

fn build_highlighter(content: &ContentStore, glossary: &GlossaryManager) -> Highlighter {
    let custom: Vec<GlossaryEntry> = glossary
        .custom_terms()
        .iter()
        .map(|t| t.as_entry())
        .collect();
    Highlighter::new(content.all_terms().map(|(_, e)| e).chain(custom.iter()))
}

/// Move a list cursor by `delta`, wrapping at both ends.
fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as isize + delta).rem_euclid(len as isize) as usize
}
