//! Service Kit - Tools for the tutoring chat agent

mod score_feedback;
mod web_search;

pub use score_feedback::ScoreFeedbackTool;
pub use web_search::{DEFAULT_SEARCH_TIMEOUT, SearchHit, TAVILY_SEARCH_URL, WebSearchTool};
