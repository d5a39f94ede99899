pub mod catalog;
pub mod builtin;
pub mod personas;
pub mod loader;
pub mod file_catalog;

pub use catalog::PromptCatalog;
pub use builtin::BuiltinPrompts;
pub use loader::{PromptLoader, PromptVariables};
pub use file_catalog::FilePromptCatalog;
