//! Canned reply generator
//!
//! Simulates the other side of the chat by picking a random entry from a
//! fixed catalog. The user's text is never inspected.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::conversation::ConversationError;

/// Reply used when the catalog has no usable entries
pub const FALLBACK_REPLY: &str = "Resposta automática";

/// Built-in reply catalog
pub const DEFAULT_REPLIES: [&str; 6] = [
    "Entendi! Obrigado por compartilhar.",
    "Isso é interessante! Conte-me mais.",
    "Resposta automática: Recebi sua mensagem.",
    "Legal! Posso ajudar com mais alguma coisa?",
    "Boa! Vou processar isso.",
    "Compreendo. Alguma outra dúvida?",
];

pub fn default_catalog() -> Vec<String> {
    DEFAULT_REPLIES.iter().map(|s| s.to_string()).collect()
}

pub struct ReplyGenerator {
    catalog: Vec<String>,
    fallback: String,
    rng: Mutex<StdRng>,
}

impl ReplyGenerator {
    /// Build a generator from a catalog. Blank entries are dropped.
    pub fn new(catalog: impl IntoIterator<Item = String>, fallback: impl Into<String>) -> Self {
        Self::with_rng(catalog, fallback, StdRng::from_entropy())
    }

    /// Build a generator whose choices are reproducible
    pub fn with_seed(
        catalog: impl IntoIterator<Item = String>,
        fallback: impl Into<String>,
        seed: u64,
    ) -> Self {
        Self::with_rng(catalog, fallback, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        catalog: impl IntoIterator<Item = String>,
        fallback: impl Into<String>,
        rng: StdRng,
    ) -> Self {
        let catalog: Vec<String> = catalog
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let fallback = fallback.into();
        let fallback = if fallback.trim().is_empty() {
            FALLBACK_REPLY.to_string()
        } else {
            fallback.trim().to_string()
        };

        if catalog.is_empty() {
            tracing::warn!("Reply catalog is empty, every reply will be \"{}\"", fallback);
        }

        Self {
            catalog,
            fallback,
            rng: Mutex::new(rng),
        }
    }

    /// Pick a reply, falling back to the default text if there is nothing
    /// to choose from.
    pub fn produce(&self, user_text: &str) -> String {
        self.try_produce(user_text)
            .unwrap_or_else(|_| self.fallback.clone())
    }

    /// Pick a reply from the catalog.
    pub fn try_produce(&self, _user_text: &str) -> Result<String, ConversationError> {
        let mut rng = self.rng.lock().expect("rng mutex poisoned");
        self.catalog
            .choose(&mut *rng)
            .cloned()
            .ok_or(ConversationError::EmptyCatalog)
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

impl Default for ReplyGenerator {
    fn default() -> Self {
        Self::new(default_catalog(), FALLBACK_REPLY)
    }
}
