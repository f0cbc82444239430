use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::app::Model;

/// Inline panel for a diagram the renderer rejected.
pub fn render_error_panel(frame: &mut Frame, area: Rect, message: &str, code: &str) {
    let error_style = Style::default().fg(Color::Red);
    let mut lines = vec![
        Line::styled(
            message.to_string(),
            error_style.add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
    ];
    lines.extend(
        code.lines()
            .map(|line| Line::styled(line.to_string(), Style::default().fg(Color::Indexed(245)))),
    );

    let block = Block::default()
        .title(" Render error ")
        .borders(Borders::ALL)
        .border_style(error_style)
        .padding(Padding::uniform(1));
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let left = vec![
        Line::styled("Navigation", section_style),
        help_line("Right/l/Spc", "Next slide"),
        help_line("Left/h/PgUp", "Previous slide"),
        help_line("Home/End", "First / last"),
        help_line("1-9", "Jump to slide"),
        help_line("Scroll/click", "Prev / next"),
        Line::raw(""),
        Line::styled("Grid", section_style),
        help_line("g / Tab", "Toggle grid"),
        help_line("Arrows", "Move highlight"),
        help_line("Enter/click", "Open slide"),
        help_line("Esc", "Back to slide"),
    ];
    let right = vec![
        Line::styled("Other", section_style),
        help_line("t", format!("Theme ({})", model.theme.as_str())),
        help_line("a", "Toggle auto-hide"),
        help_line("r", "Reload file"),
        help_line("? / F1", "Toggle help"),
        help_line("q / Ctrl-c", "Quit"),
    ];
    let config = vec![
        Line::styled("Config", section_style),
        Line::raw(format!("  Global: {global_cfg}")),
        Line::raw(format!("  Local override: {local_cfg}")),
    ];

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    let inner = block.inner(popup);

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    let [keys_area, config_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(inner);
    let [left_area, right_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(keys_area);
    frame.render_widget(Paragraph::new(left), left_area);
    frame.render_widget(Paragraph::new(right), right_area);
    frame.render_widget(Paragraph::new(config), config_area);
}

fn help_line(keys: &str, action: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {keys:<12}"), Style::default().fg(Color::Cyan)),
        Span::raw(action.into()),
    ])
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
