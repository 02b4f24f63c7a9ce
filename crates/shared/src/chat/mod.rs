pub mod orchestrator;
pub mod suggestions;

pub use orchestrator::{ChatError, ChatOrchestrator, ChatReply, ChatTurn, render_context};
pub use suggestions::{SuggestionError, SuggestionGenerator, parse_suggestions};
