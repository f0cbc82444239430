use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::Model;
use crate::slides::{Slide, SlideKind};

const CARD_MIN_WIDTH: u16 = 26;
const CARD_HEIGHT: u16 = 5;
const MAX_COLUMNS: usize = 6;

/// Number of card columns that fit a terminal `width` cells wide.
pub fn grid_columns(width: u16) -> usize {
    usize::from(width / CARD_MIN_WIDTH).clamp(1, MAX_COLUMNS)
}

/// Card positions for the grid view.
///
/// Rows scroll so the highlighted card is always on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    area: Rect,
    len: usize,
    columns: usize,
    card_width: u16,
    first_row: usize,
    visible_rows: usize,
}

impl GridLayout {
    pub fn new(area: Rect, len: usize, highlighted: Option<usize>) -> Self {
        let columns = grid_columns(area.width);
        #[allow(clippy::cast_possible_truncation)]
        let card_width = area.width / columns as u16;
        let visible_rows = usize::from(area.height / CARD_HEIGHT).max(1);
        let highlighted_row = highlighted.unwrap_or(0) / columns;
        let first_row = highlighted_row.saturating_sub(visible_rows - 1);
        Self {
            area,
            len,
            columns,
            card_width,
            first_row,
            visible_rows,
        }
    }

    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Visible card indices, in drawing order.
    pub fn visible(&self) -> std::ops::Range<usize> {
        let start = (self.first_row * self.columns).min(self.len);
        let end = (start + self.visible_rows * self.columns).min(self.len);
        start..end
    }

    /// Screen rectangle of card `index`, if it is on screen.
    pub fn card_rect(&self, index: usize) -> Option<Rect> {
        if !self.visible().contains(&index) {
            return None;
        }
        let row = index / self.columns - self.first_row;
        let col = index % self.columns;
        #[allow(clippy::cast_possible_truncation)]
        let (x, y) = (
            self.area.x + col as u16 * self.card_width,
            self.area.y + row as u16 * CARD_HEIGHT,
        );
        let height = CARD_HEIGHT.min(self.area.bottom().saturating_sub(y));
        Some(Rect::new(x, y, self.card_width, height))
    }

    /// Card under a screen cell.
    pub fn index_at(&self, column: u16, row: u16) -> Option<usize> {
        self.visible().find(|&index| {
            self.card_rect(index)
                .is_some_and(|rect| rect.contains(Position::new(column, row)))
        })
    }
}

pub(super) fn render_grid(model: &Model, frame: &mut Frame, area: Rect) {
    let layout = GridLayout::new(area, model.slides.len(), model.navigator.current());
    for index in layout.visible() {
        let (Some(slide), Some(rect)) = (model.slides.get(index), layout.card_rect(index)) else {
            continue;
        };
        let highlighted = model.navigator.current() == Some(index);
        render_card(slide, index, highlighted, frame, rect);
    }
}

fn render_card(slide: &Slide, index: usize, highlighted: bool, frame: &mut Frame, area: Rect) {
    let (border, title_style) = if highlighted {
        (
            Style::default().fg(Color::Yellow),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (Style::default().fg(Color::DarkGray), Style::default())
    };
    let dim = Style::default().fg(Color::Indexed(245));

    let (kind_line, preview) = match slide.kind() {
        SlideKind::Diagram { code, diagram_type } => (
            Line::styled(diagram_type.label(), Style::default().fg(Color::Cyan)),
            code.lines().find(|l| !l.trim().is_empty()).unwrap_or_default().trim(),
        ),
        SlideKind::Image { source, alt_text } => (
            Line::styled("Image", Style::default().fg(Color::Magenta)),
            if alt_text.is_empty() { source.as_str() } else { alt_text.as_str() },
        ),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(format!(" {} ", slide.title(index)), title_style));
    let preview = truncate_to_width(preview, area.width.saturating_sub(2).into());
    let body = Paragraph::new(vec![kind_line, Line::styled(preview, dim)]).block(block);
    frame.render_widget(body, area);
}

/// Cut `text` to at most `max_width` display columns, marking the cut with `…`.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::truncate_to_width;

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("graph TD", 20), "graph TD");
        assert_eq!(truncate_to_width("sequenceDiagram", 6), "seque…");
        assert_eq!(truncate_to_width("流程图流程图", 5), "流程…");
    }
}
