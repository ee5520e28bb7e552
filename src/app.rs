//! Chat session
//!
//! Wires the conversation store, the reply simulator and the input bar
//! together for the lifetime of one chat screen.

use std::sync::{Arc, Weak};

use crate::conversation::{
    ConversationError, ConversationStore, ReplyGenerator, ReplyScheduler, SubscriptionId,
};
use crate::storage::settings::ChatSettings;
use crate::types::{Author, Message};
use crate::ui::chat::input::{Composer, ComposerState};
use crate::ui::chat::RenderAdapter;

/// One open chat screen.
///
/// Must be created inside a tokio runtime: the reply dispatcher is spawned
/// on it.
pub struct ChatSession {
    store: Option<Arc<ConversationStore>>,
    scheduler: ReplyScheduler,
    composer: Composer,
}

impl ChatSession {
    pub fn new(settings: &ChatSettings) -> Self {
        Self::open(settings, Vec::new()).0
    }

    /// Open a session with render adapters attached before the welcome
    /// message is seeded, so they see the whole conversation.
    pub fn open(
        settings: &ChatSettings,
        adapters: Vec<Arc<dyn RenderAdapter>>,
    ) -> (Self, Vec<SubscriptionId>) {
        let store = ConversationStore::new();
        let subscriptions = adapters
            .into_iter()
            .map(|adapter| store.subscribe(adapter))
            .collect();
        if settings.seed_welcome {
            store.seed_welcome(&settings.welcome_message);
        }

        let catalog = settings.reply_catalog.clone();
        let generator = match settings.reply_seed {
            Some(seed) => ReplyGenerator::with_seed(catalog, &*settings.fallback_reply, seed),
            None => ReplyGenerator::new(catalog, &*settings.fallback_reply),
        };

        let scheduler = ReplyScheduler::spawn(Arc::new(generator), settings.reply_delay());
        tracing::info!(
            "Chat session opened ({} messages, reply delay {:?})",
            store.len(),
            settings.reply_delay()
        );

        let session = Self {
            store: Some(Arc::new(store)),
            scheduler,
            composer: Composer::new(),
        };
        (session, subscriptions)
    }

    /// The live store, or `None` once the session is closed
    pub fn store(&self) -> Option<&Arc<ConversationStore>> {
        self.store.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    /// Current messages; empty once closed
    pub fn messages(&self) -> Vec<Message> {
        self.store.as_ref().map(|s| s.all()).unwrap_or_default()
    }

    pub fn subscribe(&self, adapter: Arc<dyn RenderAdapter>) -> Option<SubscriptionId> {
        self.store.as_ref().map(|s| s.subscribe(adapter))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.as_ref().is_some_and(|s| s.unsubscribe(id))
    }

    /// Mirror a keystroke into the input bar
    pub fn type_text(&mut self, text: impl Into<String>) {
        self.composer.input(text);
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn composer_state(&self) -> ComposerState {
        self.composer.state()
    }

    /// Send whatever is in the input bar.
    ///
    /// Returns the position of the user's message, or `None` if the bar was
    /// blank or the session is closed.
    pub fn send(&mut self) -> Option<usize> {
        let store = self.store.clone()?;
        let scheduler = &self.scheduler;
        self.composer
            .submit(|text| send_with_reply(&store, scheduler, &text))?
            .ok()
    }

    /// Type and send in one step
    pub fn send_text(&mut self, text: &str) -> Result<usize, ConversationError> {
        self.type_text(text);
        let Some(store) = self.store.clone() else {
            tracing::debug!("Session closed, ignoring send");
            return Err(ConversationError::SessionClosed);
        };
        let scheduler = &self.scheduler;
        self.composer
            .submit(|text| send_with_reply(&store, scheduler, &text))
            .unwrap_or(Err(ConversationError::InvalidMessage))
    }

    /// Replies scheduled but not yet delivered
    pub fn pending_replies(&self) -> usize {
        self.scheduler.pending()
    }

    /// Wait for every scheduled reply to land
    pub async fn wait_for_replies(&self) {
        self.scheduler.idle().await;
    }

    /// Tear the session down. Pending replies will not touch anything.
    pub fn close(&mut self) {
        if self.store.take().is_some() {
            self.scheduler.shutdown();
            tracing::info!("Chat session closed");
        }
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Append the user's message and schedule the canned reply for it
fn send_with_reply(
    store: &Arc<ConversationStore>,
    scheduler: &ReplyScheduler,
    text: &str,
) -> Result<usize, ConversationError> {
    let position = store.submit(Author::User, text)?;

    let weak: Weak<ConversationStore> = Arc::downgrade(store);
    scheduler.schedule_reply(text, move |reply| {
        let Some(store) = weak.upgrade() else {
            tracing::debug!("Session closed before reply was delivered");
            return;
        };
        if let Err(e) = store.submit(Author::System, &reply) {
            tracing::warn!("Dropping canned reply: {}", e);
        }
    });

    Ok(position)
}
