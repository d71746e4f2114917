pub mod agent;
pub mod comment;
pub mod config;
pub mod issue;
pub mod project;

pub use agent::*;
pub use comment::*;
pub use config::*;
pub use issue::*;
pub use project::*;
