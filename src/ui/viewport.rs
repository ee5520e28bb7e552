//! Viewport geometry
//!
//! Tracks how much of the screen the message list can use once the input
//! bar and the on-screen keyboard have taken their share, and derives the
//! trailing content inset and scroll bounds from it. All values are in
//! points.

use serde::{Deserialize, Serialize};

/// Height of the input bar pinned under the list
pub const DEFAULT_INPUT_BAR_HEIGHT: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub screen_width: f64,
    pub screen_height: f64,
    pub input_bar_height: f64,
    keyboard_height: f64,
}

impl Viewport {
    pub fn new(screen_width: f64, screen_height: f64) -> Self {
        Self {
            screen_width: screen_width.max(0.0),
            screen_height: screen_height.max(0.0),
            input_bar_height: DEFAULT_INPUT_BAR_HEIGHT,
            keyboard_height: 0.0,
        }
    }

    pub fn with_input_bar(mut self, height: f64) -> Self {
        self.input_bar_height = height.max(0.0);
        self
    }

    /// The keyboard slid up; the input bar moves up with it
    pub fn keyboard_will_show(&mut self, height: f64) {
        self.keyboard_height = height.max(0.0);
        tracing::debug!("Keyboard shown ({}pt)", self.keyboard_height);
    }

    pub fn keyboard_will_hide(&mut self) {
        self.keyboard_height = 0.0;
        tracing::debug!("Keyboard hidden");
    }

    pub fn keyboard_height(&self) -> f64 {
        self.keyboard_height
    }

    pub fn is_keyboard_visible(&self) -> bool {
        self.keyboard_height > 0.0
    }

    /// Height available to the message list
    pub fn visible_height(&self) -> f64 {
        (self.screen_height - self.input_bar_height - self.keyboard_height).max(0.0)
    }

    /// Blank space reserved after the last row so the second-to-last row
    /// can be scrolled up to the top of the list.
    ///
    /// `last_two` holds the heights of the last and second-to-last rows, or
    /// `None` when there are fewer than two rows.
    pub fn trailing_inset(&self, last_two: Option<(f64, f64)>) -> f64 {
        let visible = self.visible_height();
        match last_two {
            None => visible,
            Some((last, second_to_last)) => (visible - (last + second_to_last)).max(0.0),
        }
    }

    /// Largest reachable scroll offset
    pub fn max_offset(&self, content_height: f64, inset: f64) -> f64 {
        (content_height + inset - self.visible_height()).max(0.0)
    }

    pub fn clamp_offset(&self, offset: f64, content_height: f64, inset: f64) -> f64 {
        offset.clamp(0.0, self.max_offset(content_height, inset))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(390.0, 844.0)
    }
}
