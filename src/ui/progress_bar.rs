use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Widget};

/// Bordered bar showing `done/total` questions of the current stage.
pub struct ProgressBar {
    pub label: String,
    pub done: usize,
    pub total: usize,
}

impl ProgressBar {
    pub fn new(label: &str, done: usize, total: usize) -> Self {
        Self {
            label: label.to_string(),
            done: done.min(total),
            total,
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64
        }
    }
}

impl Widget for ProgressBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(format!(" {} ", self.label))
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio() * f64::from(inner.width)) as u16;
        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(Color::Black).bg(Color::Green)
            } else {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label = format!("{}/{}", self.done, self.total);
        let width = u16::try_from(label.len()).unwrap_or(inner.width);
        let label_x = inner.x + inner.width.saturating_sub(width) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default());
    }
}
