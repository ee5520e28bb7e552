//! Chat list presentation
//!
//! [`ChatView`] is the headless counterpart of the toolkit's message list.
//! It applies store updates incrementally (diffing by message id) and then
//! anchors the scroll position so the second-to-last message sits at the
//! top of the visible area, which pushes older content up by one message
//! per insert instead of jumping straight to the bottom.

pub mod input;
pub mod message;

use std::collections::HashSet;
use std::sync::Mutex;

use serde::Serialize;

use crate::types::{Author, ConversationUpdate, Message, MessageId};
use crate::ui::viewport::Viewport;
use message::{BubbleAlignment, BubbleMetrics, RowMeasure};

/// Receives one update per successful append.
///
/// Implementations are called with the store locked and must not call back
/// into it; everything they need is in the update.
pub trait RenderAdapter: Send + Sync {
    fn apply(&self, update: &ConversationUpdate);
}

/// Messages in `snapshot` that are not in `rendered`, with their index.
pub fn diff_insertions(rendered: &[MessageId], snapshot: &[Message]) -> Vec<(usize, Message)> {
    let known: HashSet<MessageId> = rendered.iter().copied().collect();
    snapshot
        .iter()
        .enumerate()
        .filter(|(_, m)| !known.contains(&m.id()))
        .map(|(i, m)| (i, m.clone()))
        .collect()
}

/// One drawn row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub id: MessageId,
    pub author: Author,
    pub text: String,
    pub height: f64,
}

impl Row {
    pub fn alignment(&self) -> BubbleAlignment {
        self.author.into()
    }
}

/// Scroll state after the last layout pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ListLayout {
    pub scroll_offset: f64,
    pub content_inset: f64,
    pub content_height: f64,
    pub visible_height: f64,
    /// Row pinned to the top of the visible area
    pub anchor: Option<usize>,
}

struct ChatViewState {
    rows: Vec<Row>,
    viewport: Viewport,
    scroll_offset: f64,
    content_inset: f64,
}

impl ChatViewState {
    fn content_height(&self) -> f64 {
        self.rows.iter().map(|r| r.height).sum()
    }

    fn row_top(&self, index: usize) -> f64 {
        self.rows.iter().take(index).map(|r| r.height).sum()
    }

    fn anchor_index(&self) -> Option<usize> {
        if self.rows.is_empty() {
            None
        } else {
            Some(self.rows.len().saturating_sub(2))
        }
    }

    fn update_content_inset(&mut self) {
        let last_two = match self.rows.as_slice() {
            [.., second_to_last, last] => Some((last.height, second_to_last.height)),
            _ => None,
        };
        self.content_inset = self.viewport.trailing_inset(last_two);
    }

    /// Scroll so the anchor row's top meets the top of the visible area
    fn scroll_to_anchor(&mut self) {
        let Some(anchor) = self.anchor_index() else {
            return;
        };
        self.update_content_inset();
        let target = self.row_top(anchor);
        self.scroll_offset =
            self.viewport
                .clamp_offset(target, self.content_height(), self.content_inset);
    }

    fn layout(&self) -> ListLayout {
        ListLayout {
            scroll_offset: self.scroll_offset,
            content_inset: self.content_inset,
            content_height: self.content_height(),
            visible_height: self.viewport.visible_height(),
            anchor: self.anchor_index(),
        }
    }
}

pub struct ChatView {
    state: Mutex<ChatViewState>,
    measure: Box<dyn RowMeasure>,
}

impl ChatView {
    pub fn new(viewport: Viewport) -> Self {
        Self::with_measure(viewport, Box::new(BubbleMetrics::default()))
    }

    pub fn with_measure(viewport: Viewport, measure: Box<dyn RowMeasure>) -> Self {
        let content_inset = viewport.visible_height();
        Self {
            state: Mutex::new(ChatViewState {
                rows: Vec::new(),
                viewport,
                scroll_offset: 0.0,
                content_inset,
            }),
            measure,
        }
    }

    pub fn rows(&self) -> Vec<Row> {
        self.state.lock().expect("chat view mutex poisoned").rows.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("chat view mutex poisoned").rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn layout(&self) -> ListLayout {
        self.state.lock().expect("chat view mutex poisoned").layout()
    }

    pub fn viewport(&self) -> Viewport {
        self.state.lock().expect("chat view mutex poisoned").viewport
    }

    /// Top edge of a row in content coordinates
    pub fn row_top(&self, index: usize) -> f64 {
        self.state.lock().expect("chat view mutex poisoned").row_top(index)
    }

    /// Move the list up with the keyboard and keep the newest messages in view
    pub fn keyboard_will_show(&self, height: f64) {
        let mut state = self.state.lock().expect("chat view mutex poisoned");
        state.viewport.keyboard_will_show(height);
        state.scroll_to_anchor();
    }

    pub fn keyboard_will_hide(&self) {
        let mut state = self.state.lock().expect("chat view mutex poisoned");
        state.viewport.keyboard_will_hide();
        let max = state
            .viewport
            .max_offset(state.content_height(), state.content_inset);
        state.scroll_offset = state.scroll_offset.min(max);
    }
}

impl RenderAdapter for ChatView {
    fn apply(&self, update: &ConversationUpdate) {
        let mut state = self.state.lock().expect("chat view mutex poisoned");
        let rendered: Vec<MessageId> = state.rows.iter().map(|r| r.id).collect();
        let insertions = diff_insertions(&rendered, &update.snapshot);
        if insertions.is_empty() {
            return;
        }

        let row_width = state.viewport.screen_width;
        for (index, message) in insertions {
            let row = Row {
                id: message.id(),
                author: message.author(),
                text: message.text().to_string(),
                height: self.measure.row_height(&message, row_width),
            };
            let index = index.min(state.rows.len());
            state.rows.insert(index, row);
        }

        state.scroll_to_anchor();
        tracing::debug!(
            "Chat view has {} rows, offset {:.1}, inset {:.1}",
            state.rows.len(),
            state.scroll_offset,
            state.content_inset
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationStore;
    use std::sync::Arc;

    /// Every row is exactly as tall as its text is long, times ten
    struct TenPerChar;

    impl RowMeasure for TenPerChar {
        fn row_height(&self, message: &Message, _row_width: f64) -> f64 {
            message.text().chars().count() as f64 * 10.0
        }
    }

    fn view(screen_height: f64) -> Arc<ChatView> {
        let viewport = Viewport::new(390.0, screen_height).with_input_bar(60.0);
        Arc::new(ChatView::with_measure(viewport, Box::new(TenPerChar)))
    }

    #[test]
    fn test_diff_insertions() {
        let a = Message::new(Author::User, "a").unwrap();
        let b = Message::new(Author::System, "b").unwrap();
        let c = Message::new(Author::User, "c").unwrap();

        let diff = diff_insertions(&[a.id()], &[a.clone(), b.clone(), c.clone()]);
        let ids: Vec<(usize, MessageId)> = diff.iter().map(|(i, m)| (*i, m.id())).collect();
        assert_eq!(ids, vec![(1, b.id()), (2, c.id())]);

        assert!(diff_insertions(&[a.id(), b.id()], &[a, b]).is_empty());
    }

    #[test]
    fn test_first_message_anchors_at_top() {
        let store = ConversationStore::new();
        let view = view(560.0);
        store.subscribe(view.clone());

        store.submit(Author::System, "Hello").unwrap();
        let layout = view.layout();
        assert_eq!(layout.anchor, Some(0));
        assert_eq!(layout.scroll_offset, 0.0);
        // A lone row gets the whole visible height as trailing space
        assert_eq!(layout.content_inset, 500.0);
    }

    #[test]
    fn test_second_to_last_row_pinned_to_top() {
        let store = ConversationStore::new();
        let view = view(560.0);
        store.subscribe(view.clone());

        store.submit(Author::System, "aaaa").unwrap(); // 40
        store.submit(Author::User, "bbbbbb").unwrap(); // 60
        store.submit(Author::System, "cc").unwrap(); // 20

        let layout = view.layout();
        assert_eq!(layout.anchor, Some(1));
        assert_eq!(layout.scroll_offset, 40.0);
        assert_eq!(layout.content_inset, 500.0 - (20.0 + 60.0));
        assert_eq!(layout.content_height, 120.0);

        store.submit(Author::User, "d").unwrap(); // 10
        let layout = view.layout();
        assert_eq!(layout.anchor, Some(2));
        // Older content moved up by exactly one row
        assert_eq!(layout.scroll_offset, 100.0);
    }

    #[test]
    fn test_tall_rows_clamp_to_bottom() {
        let store = ConversationStore::new();
        let view = view(160.0); // 100pt visible
        store.subscribe(view.clone());

        store.submit(Author::User, "x".repeat(8).as_str()).unwrap(); // 80
        store.submit(Author::System, "y".repeat(9).as_str()).unwrap(); // 90

        let layout = view.layout();
        assert_eq!(layout.content_inset, 0.0);
        assert_eq!(layout.scroll_offset, 0.0);

        store.submit(Author::User, "z".repeat(9).as_str()).unwrap(); // 90
        let layout = view.layout();
        assert_eq!(layout.content_height, 260.0);
        assert_eq!(layout.content_inset, 0.0);
        assert_eq!(layout.scroll_offset, 80.0);

        store.submit(Author::System, "w".repeat(30).as_str()).unwrap(); // 300
        let layout = view.layout();
        assert_eq!(layout.content_height, 560.0);
        assert_eq!(layout.scroll_offset, 170.0);
    }

    #[test]
    fn test_late_subscriber_catches_up() {
        let store = ConversationStore::new();
        store.submit(Author::System, "one").unwrap();
        store.submit(Author::User, "two").unwrap();

        let view = view(560.0);
        store.subscribe(view.clone());
        store.submit(Author::System, "three").unwrap();

        let rows = view.rows();
        let texts: Vec<&str> = rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert_eq!(rows[1].alignment(), BubbleAlignment::Trailing);
    }

    #[test]
    fn test_keyboard_reanchors() {
        let store = ConversationStore::new();
        let view = view(560.0);
        store.subscribe(view.clone());
        store.submit(Author::System, "aaaa").unwrap();
        store.submit(Author::User, "bbbbbb").unwrap();

        view.keyboard_will_show(300.0);
        let layout = view.layout();
        assert_eq!(layout.visible_height, 200.0);
        assert_eq!(layout.content_inset, 200.0 - 100.0);
        assert_eq!(layout.scroll_offset, 0.0);

        view.keyboard_will_hide();
        let layout = view.layout();
        assert_eq!(layout.visible_height, 500.0);
        assert_eq!(layout.scroll_offset, 0.0);
    }

    #[test]
    fn test_empty_view_does_not_scroll() {
        let view = view(560.0);
        view.keyboard_will_show(200.0);
        let layout = view.layout();
        assert!(view.is_empty());
        assert_eq!(layout.anchor, None);
        assert_eq!(layout.scroll_offset, 0.0);
    }
}
