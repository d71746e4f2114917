pub mod app;
pub mod input;
pub mod jobs;
pub mod render;
pub mod text_field;
pub mod theme;

pub use app::run;
