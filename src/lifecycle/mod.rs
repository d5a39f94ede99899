pub mod state;
pub mod manager;

pub use state::*;
pub use manager::RequestLifecycle;
