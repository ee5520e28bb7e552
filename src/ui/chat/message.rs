//! Message bubble layout
//!
//! The real layout engine belongs to the toolkit. [`RowMeasure`] is the seam
//! it plugs into; [`BubbleMetrics`] is a text-wrapping estimate good enough
//! for the headless harness and tests.

use crate::types::{Author, Message};

/// Measures the rendered height of a message row
pub trait RowMeasure: Send + Sync {
    fn row_height(&self, message: &Message, row_width: f64) -> f64;
}

/// Which side of the list a bubble hugs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleAlignment {
    Leading,
    Trailing,
}

impl From<Author> for BubbleAlignment {
    fn from(author: Author) -> Self {
        match author {
            Author::User => BubbleAlignment::Trailing,
            Author::System => BubbleAlignment::Leading,
        }
    }
}

/// Fixed metrics of a chat bubble cell
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleMetrics {
    /// Bubble width as a fraction of the row width
    pub max_width_ratio: f64,
    /// Gap between the bubble and the row edge
    pub side_margin: f64,
    /// Label padding inside the bubble, left and right
    pub horizontal_padding: f64,
    /// Label padding inside the bubble, top and bottom
    pub vertical_padding: f64,
    /// Gap between the bubble and the cell, top and bottom
    pub cell_padding: f64,
    pub line_height: f64,
    /// Average glyph advance for the 16pt system font
    pub char_width: f64,
}

impl Default for BubbleMetrics {
    fn default() -> Self {
        Self {
            max_width_ratio: 0.75,
            side_margin: 16.0,
            horizontal_padding: 12.0,
            vertical_padding: 8.0,
            cell_padding: 4.0,
            line_height: 20.0,
            char_width: 8.0,
        }
    }
}

impl BubbleMetrics {
    /// Widest a bubble may grow in a row of the given width
    pub fn bubble_width(&self, row_width: f64) -> f64 {
        (row_width * self.max_width_ratio)
            .min(row_width - 2.0 * self.side_margin)
            .max(0.0)
    }

    /// How many glyphs fit on one line of the label
    pub fn chars_per_line(&self, row_width: f64) -> usize {
        let label_width = self.bubble_width(row_width) - 2.0 * self.horizontal_padding;
        ((label_width / self.char_width).floor() as usize).max(1)
    }

    /// Number of wrapped lines for `text`
    pub fn line_count(&self, text: &str, row_width: f64) -> usize {
        let per_line = self.chars_per_line(row_width);
        text.split('\n')
            .map(|line| line.chars().count().div_ceil(per_line).max(1))
            .sum()
    }
}

impl RowMeasure for BubbleMetrics {
    fn row_height(&self, message: &Message, row_width: f64) -> f64 {
        let lines = self.line_count(message.text(), row_width) as f64;
        lines * self.line_height + 2.0 * self.vertical_padding + 2.0 * self.cell_padding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_by_author() {
        assert_eq!(BubbleAlignment::from(Author::User), BubbleAlignment::Trailing);
        assert_eq!(BubbleAlignment::from(Author::System), BubbleAlignment::Leading);
    }

    #[test]
    fn test_bubble_width_capped() {
        let metrics = BubbleMetrics::default();
        assert_eq!(metrics.bubble_width(400.0), 300.0);
        // Narrow rows are limited by the side margins instead
        assert_eq!(metrics.bubble_width(40.0), 8.0);
        assert_eq!(metrics.bubble_width(10.0), 0.0);
    }

    #[test]
    fn test_short_message_is_one_line() {
        let metrics = BubbleMetrics::default();
        let msg = Message::new(Author::User, "Hello").unwrap();
        assert_eq!(metrics.line_count(msg.text(), 390.0), 1);
        assert_eq!(metrics.row_height(&msg, 390.0), 44.0);
    }

    #[test]
    fn test_long_message_wraps() {
        let metrics = BubbleMetrics::default();
        // 390pt row -> 292.5pt bubble -> 268.5pt label -> 33 glyphs per line
        assert_eq!(metrics.chars_per_line(390.0), 33);

        let text = "x".repeat(70);
        assert_eq!(metrics.line_count(&text, 390.0), 3);

        let msg = Message::new(Author::System, "one\ntwo\n\nfour").unwrap();
        assert_eq!(metrics.line_count(msg.text(), 390.0), 4);
        assert_eq!(metrics.row_height(&msg, 390.0), 104.0);
    }
}
