pub mod catalog;
pub mod draw;
pub mod play;
