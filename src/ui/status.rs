use ratatui::prelude::*;
use ratatui::widgets::{LineGauge, Paragraph};

use crate::app::{Model, RendererStatus, ToastLevel};

pub fn render_header(model: &Model, frame: &mut Frame, area: Rect) {
    let counter = format!(" {} ", model.navigator.position_label());
    #[allow(clippy::cast_possible_truncation)]
    let counter_width = (counter.len() as u16).min(area.width);
    let [title_area, counter_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(counter_width)]).areas(area);

    let mut spans = vec![Span::styled(
        format!(" {}", model.source.label()),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let (Some(index), Some(slide)) = (model.navigator.current(), model.current_slide()) {
        spans.push(Span::raw(format!("  {}", slide.title(index))));
        let kind = slide
            .diagram_type()
            .map_or("Image", |diagram_type| diagram_type.label());
        spans.push(Span::styled(
            format!("  [{kind}]"),
            Style::default().fg(Color::Cyan),
        ));
    }
    if model.navigator.is_grid() {
        spans.push(Span::styled("  grid", Style::default().fg(Color::Yellow)));
    }

    let bar_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    frame.render_widget(Paragraph::new(Line::from(spans)).style(bar_style), title_area);
    frame.render_widget(
        Paragraph::new(counter).style(bar_style.add_modifier(Modifier::BOLD)),
        counter_area,
    );
}

pub fn render_footer(model: &Model, frame: &mut Frame, area: Rect) {
    let [progress_area, status_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);

    let percent = model.navigator.progress_percent();
    let progress = LineGauge::default()
        .ratio(f64::from(percent) / 100.0)
        .label(format!("{percent:>3}%"))
        .filled_style(Style::default().fg(Color::Cyan))
        .unfilled_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(progress, progress_area);

    render_status_bar(model, frame, status_area);
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let renderer = match &model.renderer_status {
        RendererStatus::Starting => "starting".to_string(),
        RendererStatus::Ready(name) => (*name).to_string(),
        RendererStatus::Failed(_) => "unavailable".to_string(),
    };
    let watch_indicator = if model.watch_enabled {
        " [watching]"
    } else {
        ""
    };
    let auto_hide = if model.autohide.is_enabled() {
        ""
    } else {
        " [pinned]"
    };
    let hints = if model.navigator.is_grid() {
        "arrows:move  Enter:open  Esc:back"
    } else {
        "←/→:navigate  g:grid"
    };

    let status = format!(
        " {hints}  t:theme({})  ?:help  renderer:{renderer}{watch_indicator}{auto_hide}",
        model.theme.as_str()
    );
    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
