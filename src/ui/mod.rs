pub mod components;
pub mod layout;
pub mod line_input;
pub mod theme;
