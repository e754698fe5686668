pub mod chat;
pub mod games;
pub mod quiz;
