//! Chat input bar
//!
//! Holds the text being typed and gates sending on non-blank input.

/// Input bar state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    /// Nothing worth sending in the buffer
    Idle,
    /// The user is typing
    Composing,
    /// The buffer is being handed off
    Submitting,
}

/// Estimate how many rows the text field needs based on content
pub fn compute_rows(text: &str, chars_per_row: usize) -> usize {
    let chars_per_row = chars_per_row.max(1);
    let newlines = text.chars().filter(|&c| c == '\n').count();
    let wrap_lines: usize = text
        .lines()
        .map(|line| {
            let len = line.chars().count();
            if len == 0 { 0 } else { (len - 1) / chars_per_row }
        })
        .sum();
    let total = newlines + wrap_lines + 1;
    total.clamp(1, 8)
}

#[derive(Debug, Clone)]
pub struct Composer {
    buffer: String,
    state: ComposerState,
    chars_per_row: usize,
}

impl Composer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            state: ComposerState::Idle,
            chars_per_row: 40,
        }
    }

    pub fn with_chars_per_row(mut self, chars_per_row: usize) -> Self {
        self.chars_per_row = chars_per_row.max(1);
        self
    }

    /// Replace the buffer with what is in the text field
    pub fn input(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.state = if self.buffer.trim().is_empty() {
            ComposerState::Idle
        } else {
            ComposerState::Composing
        };
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn state(&self) -> ComposerState {
        self.state
    }

    pub fn can_send(&self) -> bool {
        !self.buffer.trim().is_empty()
    }

    pub fn rows(&self) -> usize {
        compute_rows(&self.buffer, self.chars_per_row)
    }

    /// Hand the trimmed buffer to `on_send` and clear the field.
    ///
    /// Blank input is rejected: `on_send` is not called, the buffer and state
    /// are left alone, and `None` is returned.
    pub fn submit<R>(&mut self, on_send: impl FnOnce(String) -> R) -> Option<R> {
        if !self.can_send() {
            return None;
        }

        self.state = ComposerState::Submitting;
        let text = self.buffer.trim().to_string();
        self.buffer.clear();
        let result = on_send(text);
        self.state = ComposerState::Idle;
        Some(result)
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_rows() {
        assert_eq!(compute_rows("", 10), 1);
        assert_eq!(compute_rows("short", 10), 1);
        assert_eq!(compute_rows("a\nb", 10), 2);
        assert_eq!(compute_rows(&"x".repeat(25), 10), 3);
        assert_eq!(compute_rows(&"\n".repeat(20), 10), 8);
    }

    #[test]
    fn test_typing_transitions() {
        let mut composer = Composer::new();
        assert_eq!(composer.state(), ComposerState::Idle);

        composer.input("h");
        assert_eq!(composer.state(), ComposerState::Composing);
        assert!(composer.can_send());

        composer.input("   ");
        assert_eq!(composer.state(), ComposerState::Idle);
        assert!(!composer.can_send());
    }

    #[test]
    fn test_submit_trims_and_resets() {
        let mut composer = Composer::new();
        composer.input("  Hello \n");

        let mut seen_text = None;
        let sent = composer.submit(|text| {
            seen_text = Some(text.clone());
            text.len()
        });

        assert_eq!(sent, Some(5));
        assert_eq!(seen_text.as_deref(), Some("Hello"));
        assert_eq!(composer.text(), "");
        assert_eq!(composer.state(), ComposerState::Idle);
    }

    #[test]
    fn test_blank_submit_rejected() {
        let mut composer = Composer::new();
        composer.input(" \t ");
        let mut called = false;
        assert_eq!(composer.submit(|_| called = true), None);
        assert!(!called);
        assert_eq!(composer.text(), " \t ");
        assert_eq!(composer.state(), ComposerState::Idle);
    }
}
