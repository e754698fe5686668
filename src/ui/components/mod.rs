pub mod chart;
pub mod chat_view;
pub mod game_view;
pub mod glossary_view;
pub mod lecture_view;
pub mod menu;
pub mod progress_bar;
pub mod quiz_view;
pub mod term_text;
