//! Plain-text transcript renderer used by the headless harness

use std::io::Write;
use std::sync::Mutex;

use crate::types::{ConversationUpdate, Message};
use crate::ui::chat::RenderAdapter;

/// Output format for each appended message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    /// `[12:00:01] you: Hello`
    Text,
    /// One JSON object per line
    Json,
}

/// Writes every appended message as one line
pub struct TranscriptPrinter<W: Write + Send> {
    out: Mutex<W>,
    format: TranscriptFormat,
}

impl<W: Write + Send> TranscriptPrinter<W> {
    pub fn new(out: W, format: TranscriptFormat) -> Self {
        Self {
            out: Mutex::new(out),
            format,
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn line(&self, message: &Message) -> String {
        match self.format {
            TranscriptFormat::Text => format!(
                "[{}] {}: {}",
                message.created_at().format("%H:%M:%S"),
                message.author().label(),
                message.text()
            ),
            TranscriptFormat::Json => {
                serde_json::to_string(message).unwrap_or_else(|_| "{}".to_string())
            }
        }
    }
}

impl<W: Write + Send> RenderAdapter for TranscriptPrinter<W> {
    fn apply(&self, update: &ConversationUpdate) {
        let line = self.line(&update.message);
        let mut out = self.out.lock().expect("transcript mutex poisoned");
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            tracing::warn!("Failed to write transcript: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationStore;
    use crate::types::Author;
    use std::sync::Arc;

    #[test]
    fn test_text_transcript() {
        let store = ConversationStore::new();
        let printer = Arc::new(TranscriptPrinter::new(Vec::new(), TranscriptFormat::Text));
        let id = store.subscribe(printer.clone());

        store.submit(Author::User, "Hello").unwrap();
        store.submit(Author::System, "Oi").unwrap();
        store.unsubscribe(id);

        let printer = Arc::try_unwrap(printer).ok().unwrap();
        let out = String::from_utf8(printer.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] you: Hello"));
        assert!(lines[1].ends_with("] bot: Oi"));
    }

    #[test]
    fn test_json_transcript() {
        let store = ConversationStore::new();
        let printer = Arc::new(TranscriptPrinter::new(Vec::new(), TranscriptFormat::Json));
        let id = store.subscribe(printer.clone());

        store.submit(Author::User, "Hello").unwrap();
        store.unsubscribe(id);

        let printer = Arc::try_unwrap(printer).ok().unwrap();
        let out = String::from_utf8(printer.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["author"], "user");
        assert_eq!(value["text"], "Hello");
    }
}
