pub mod session;
pub mod suggest;
pub mod sync;
