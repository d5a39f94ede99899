pub mod provider;
pub mod openrouter;
pub mod router;
pub mod types;
pub mod catalog;
pub mod caller;

pub use provider::LLMProvider;
pub use router::create_provider;
pub use types::{ApiOptions, LLMResponse};
pub use caller::Caller;
