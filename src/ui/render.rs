use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};
use ratatui_image::{Resize, StatefulImage};

use crate::app::{ImageSlot, Model, RendererStatus, SlideRender};
use crate::slides::SlideKind;

use super::{ScreenLayout, grid, overlays, status};

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let layout = ScreenLayout::new(area, model.controls_visible());

    if model.slides.is_empty() {
        let empty = Paragraph::new("No diagrams or images to show")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Indexed(245)));
        frame.render_widget(empty, layout.body);
    } else if model.navigator.is_grid() {
        grid::render_grid(model, frame, layout.body);
    } else {
        render_single(model, frame, layout.body);
    }

    if let Some(header) = layout.header {
        status::render_header(model, frame, header);
    }
    if let Some(footer) = layout.footer {
        status::render_footer(model, frame, footer);
    }
    status::render_toast_bar(model, frame, layout.toast);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_single(model: &mut Model, frame: &mut Frame, area: Rect) {
    let Some(index) = model.navigator.current() else {
        return;
    };
    let Some(slide) = model.slides.get(index).cloned() else {
        return;
    };
    let title = slide.title(index);

    match slide.kind() {
        SlideKind::Diagram { code, diagram_type } => match model.renders.get_mut(slide.id()) {
            Some(SlideRender::Image(protocol)) => {
                let image = StatefulImage::default().resize(Resize::Fit(None));
                frame.render_stateful_widget(image, area, protocol);
            }
            Some(SlideRender::Text(text)) => {
                let block = Block::default()
                    .title(format!(" {title} · {} ", diagram_type.label()))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .padding(Padding::horizontal(1));
                let source = Paragraph::new(text.clone())
                    .style(Style::default().fg(Color::Cyan))
                    .block(block);
                frame.render_widget(source, area);
            }
            Some(SlideRender::Failed { message, code }) => {
                overlays::render_error_panel(frame, area, message, code);
            }
            Some(SlideRender::Pending) | None => {
                let renderer = match &model.renderer_status {
                    RendererStatus::Starting => "starting renderer".to_string(),
                    RendererStatus::Ready(name) => format!("via {name}"),
                    RendererStatus::Failed(message) => message.clone(),
                };
                let lines = vec![
                    Line::styled(
                        format!("Rendering {title}…"),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Line::styled(renderer, Style::default().fg(Color::Indexed(245))),
                    Line::raw(""),
                    Line::styled(
                        code.lines().next().unwrap_or_default().to_string(),
                        Style::default().fg(Color::Indexed(245)),
                    ),
                ];
                frame.render_widget(
                    Paragraph::new(lines).alignment(Alignment::Center),
                    centered_rows(area, 4),
                );
            }
        },
        SlideKind::Image { source, alt_text } => match model.images.get_mut(slide.id()) {
            Some(ImageSlot::Loaded(protocol)) => {
                let image = StatefulImage::default().resize(Resize::Fit(None));
                frame.render_stateful_widget(image, area, protocol);
            }
            Some(ImageSlot::Unavailable(reason)) => {
                render_image_placeholder(frame, area, alt_text, source, Some(reason));
            }
            None => render_image_placeholder(frame, area, alt_text, source, None),
        },
    }
}

fn render_image_placeholder(
    frame: &mut Frame,
    area: Rect,
    alt_text: &str,
    source: &str,
    reason: Option<&String>,
) {
    let label = if alt_text.is_empty() { "image" } else { alt_text };
    let mut lines = vec![
        Line::styled(
            format!("[Image: {label}]"),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Line::styled(source.to_string(), Style::default().fg(Color::Indexed(245))),
    ];
    if let Some(reason) = reason {
        lines.push(Line::raw(""));
        lines.push(Line::styled(reason.clone(), Style::default().fg(Color::Yellow)));
    }
    #[allow(clippy::cast_possible_truncation)]
    let height = lines.len() as u16;
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        centered_rows(area, height),
    );
}

/// A full-width band of `height` rows in the vertical middle of `area`.
fn centered_rows(area: Rect, height: u16) -> Rect {
    let h = height.min(area.height);
    Rect::new(
        area.x,
        area.y + (area.height - h) / 2,
        area.width,
        h,
    )
}
