//! services/api/src/web/state.rs
//!
//! Defines the application state shared by all handlers.

use crate::config::Config;
use quiz_core::{KnowledgeStore, QuizService, TemplateBank};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub quiz: QuizService,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the quiz service to `store` with the given template bank.
    pub fn new(store: Arc<dyn KnowledgeStore>, bank: TemplateBank, config: Arc<Config>) -> Self {
        let quiz = QuizService::new(store, Arc::new(bank), config.root_chapter_id);
        Self { quiz, config }
    }
}
