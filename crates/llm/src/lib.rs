pub mod composer;
pub mod provider;
pub mod providers;

pub use composer::{Answer, Composer, DATA_NOT_AVAILABLE};
pub use provider::{complete_with_retry, LlmError, LlmProvider, Message, Role};
pub use providers::create_provider;
