//! Picture widget for ratatui
//!
//! Each terminal cell shows two picture rows with an upper half block: the
//! foreground is the top pixel, the background the bottom one.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Widget},
};

use crate::surface::{to_canvas, Rgb, Surface};

/// Picture pixel under terminal cell `(column, row)` of `area`
///
/// `None` when the cell lies outside `area`.
pub fn canvas_point(area: Rect, column: u16, row: u16, width: u32, height: u32) -> Option<(u32, u32)> {
    if column < area.x || row < area.y || column >= area.right() || row >= area.bottom() {
        return None;
    }
    let x = to_canvas((column - area.x) as u32, area.width as u32, width);
    let y = to_canvas((row - area.y) as u32 * 2, area.height as u32 * 2, height);
    Some((x, y))
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Renders a surface scaled to fill its area
pub struct Picture<'a> {
    surface: &'a dyn Surface,
    cursor: Option<(u32, u32)>,
    block: Option<Block<'a>>,
}

impl<'a> Picture<'a> {
    pub fn new(surface: &'a dyn Surface) -> Self {
        Self {
            surface,
            cursor: None,
            block: None,
        }
    }

    /// Mark the picture pixel under the pointer
    pub fn cursor(mut self, cursor: Option<(u32, u32)>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn render_picture(&self, area: Rect, buf: &mut Buffer) {
        let (width, height) = (self.surface.width(), self.surface.height());
        if area.width == 0 || area.height == 0 || width == 0 || height == 0 {
            return;
        }

        let rows = area.height as u32 * 2;
        for cy in 0..area.height {
            let top_y = to_canvas(cy as u32 * 2, rows, height);
            let bottom_y = to_canvas(cy as u32 * 2 + 1, rows, height);
            for cx in 0..area.width {
                let x = to_canvas(cx as u32, area.width as u32, width);
                let top = self.surface.read_pixel(x, top_y);
                let bottom = self.surface.read_pixel(x, bottom_y);
                let style = Style::default().fg(color(top)).bg(color(bottom));
                buf.set_string(area.x + cx, area.y + cy, "▀", style);
            }
        }

        if let Some((x, y)) = self.cursor {
            let column = (x as u64 * area.width as u64 / width as u64) as u16;
            let row = (y as u64 * rows as u64 / height as u64 / 2) as u16;
            let column = area.x + column.min(area.width - 1);
            let row = area.y + row.min(area.height - 1);
            let under = self.surface.read_pixel(x, y);
            let mark = if under.brightness() > 127.0 { Color::Black } else { Color::White };
            buf.set_string(column, row, "+", Style::default().fg(mark).bg(color(under)));
        }
    }
}

impl Widget for Picture<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        self.render_picture(inner_area, buf);
    }
}
