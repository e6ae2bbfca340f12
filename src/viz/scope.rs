//! Oscilloscope widget for ratatui
//!
//! Draws the most recent output samples as a connected trace, newest on the
//! right. A sample of 1.0 sits on the top row and -1.0 on the bottom row.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Widget},
};

/// A widget that traces recent output samples
pub struct Scope<'a> {
    samples: &'a [f32],
    style: Style,
    block: Option<Block<'a>>,
}

impl<'a> Scope<'a> {
    pub fn new(samples: &'a [f32]) -> Self {
        Self {
            samples,
            style: Style::default(),
            block: None,
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Row (0 = top) of `sample` in a trace `height` rows tall
    fn row_of(sample: f32, height: u16) -> u16 {
        let span = (height - 1) as f32;
        let level = (1.0 - sample.clamp(-1.0, 1.0)) / 2.0;
        (level * span).round() as u16
    }

    fn render_trace(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.samples.is_empty() {
            return;
        }

        let columns = area.width as usize;
        let mut previous: Option<u16> = None;

        for column in 0..columns {
            // stretch or squeeze the samples across the width
            let index = column * self.samples.len() / columns;
            let row = Self::row_of(self.samples[index], area.height);

            // join to the previous column the way a line segment would
            let (from, to) = match previous {
                Some(prev) if prev < row => (prev + 1, row),
                Some(prev) if prev > row => (row, prev - 1),
                _ => (row, row),
            };
            for y in from..=to {
                buf.set_string(area.x + column as u16, area.y + y, "•", self.style);
            }
            previous = Some(row);
        }
    }
}

impl Widget for Scope<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        self.render_trace(inner_area, buf);
    }
}
