use std::path::PathBuf;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use tempfile::tempdir;

use crate::config::DiagramTheme;
use crate::render::{RenderResponse, RenderResult, Visual, WorkerEvent};
use crate::slides::extract;

use super::event_loop::ResizeDebouncer;
use super::{App, ImageSlot, Message, Model, SlideRender, SlideSource, ToastLevel, update};

const DECK: &str = "# Deck\n\n```mermaid\ngraph TD\n  A --> B\n```\n\n![Logo](logo.png)\n\n```mermaid\npie title Pets\n  \"Dogs\" : 3\n```\n";

fn create_test_model() -> Model {
    Model::new(SlideSource::File(PathBuf::from("deck.md")), extract(DECK), (80, 24))
}

fn create_many_slides_model(count: usize) -> Model {
    let mut md = String::new();
    for i in 0..count {
        md.push_str(&format!("```mermaid\ngraph LR\n  N{i} --> M{i}\n```\n\n"));
    }
    Model::new(SlideSource::Sample, extract(&md), (80, 24))
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn click(column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind: MouseEventKind::Up(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

fn rendered(ticket: crate::render::RenderTicket, text: &str) -> WorkerEvent {
    WorkerEvent::Rendered(RenderResponse {
        ticket,
        result: RenderResult::Success(Visual::Text(text.to_string())),
    })
}

#[test]
fn test_next_and_previous_wrap() {
    let model = create_test_model();
    let model = update(model, Message::Previous);
    assert_eq!(model.navigator.current(), Some(2));
    let model = update(model, Message::Next);
    assert_eq!(model.navigator.current(), Some(0));
}

#[test]
fn test_go_to_out_of_range_is_ignored() {
    let model = create_test_model();
    let model = update(model, Message::GoTo(1));
    assert_eq!(model.navigator.current(), Some(1));
    let model = update(model, Message::GoTo(3));
    assert_eq!(model.navigator.current(), Some(1));
}

#[test]
fn test_first_and_last() {
    let model = update(create_test_model(), Message::Last);
    assert_eq!(model.navigator.current(), Some(2));
    let model = update(model, Message::First);
    assert_eq!(model.navigator.current(), Some(0));
}

#[test]
fn test_slide_change_resets_auto_hide() {
    let mut model = create_test_model().with_auto_hide(3000);
    model.clock_ms = 2500;
    let mut model = update(model, Message::Next);
    assert_eq!(model.autohide.deadline(), Some(5500));

    model.clock_ms = 5000;
    let mut model = update(model, Message::Tick);
    assert!(model.controls_visible());

    model.clock_ms = 5500;
    let model = update(model, Message::Tick);
    assert!(!model.controls_visible());
}

#[test]
fn test_activity_shows_controls_again() {
    let mut model = create_test_model().with_auto_hide(1000);
    model.clock_ms = 1000;
    let mut model = update(model, Message::Tick);
    assert!(!model.autohide.is_visible());

    model.clock_ms = 1200;
    let model = update(model, Message::Activity);
    assert!(model.autohide.is_visible());
    assert_eq!(model.autohide.deadline(), Some(2200));
}

#[test]
fn test_ignored_navigation_does_not_reset_timer() {
    let mut model = create_test_model().with_auto_hide(1000);
    model.clock_ms = 400;
    let model = update(model, Message::GoTo(0));
    assert_eq!(model.autohide.deadline(), Some(1000));
}

#[test]
fn test_help_keeps_controls_visible() {
    let mut model = create_test_model();
    model.autohide.hide();
    let model = update(model, Message::ToggleHelp);
    assert!(model.controls_visible());
}

#[test]
fn test_help_pauses_auto_hide_until_closed() {
    let model = create_test_model().with_auto_hide(1000);
    let mut model = update(model, Message::ToggleHelp);
    assert!(model.autohide.is_visible());
    assert_eq!(model.autohide.deadline(), None);

    model.clock_ms = 5000;
    let mut model = update(model, Message::Tick);
    assert!(model.autohide.is_visible());

    model.clock_ms = 6000;
    let model = update(model, Message::HideHelp);
    assert!(!model.help_visible);
    assert_eq!(model.autohide.deadline(), Some(7000));
}

#[test]
fn test_escape_leaves_grid_then_quits() {
    let model = update(create_test_model(), Message::ToggleGrid);
    assert!(model.navigator.is_grid());
    let model = update(model, Message::Escape);
    assert!(!model.navigator.is_grid());
    assert!(!model.should_quit);
    let model = update(model, Message::Escape);
    assert!(model.should_quit);
}

#[test]
fn test_escape_closes_help_first() {
    let model = update(create_test_model(), Message::ToggleHelp);
    let model = update(model, Message::Escape);
    assert!(!model.help_visible);
    assert!(!model.should_quit);
}

#[test]
fn test_grid_move_uses_terminal_columns() {
    // 80 columns fit three cards per row.
    let model = update(create_many_slides_model(8), Message::ToggleGrid);
    let model = update(model, Message::GridMove(1));
    assert_eq!(model.navigator.current(), Some(3));
    let model = update(model, Message::GridMove(1));
    assert_eq!(model.navigator.current(), Some(6));
    let model = update(model, Message::GridMove(1));
    assert_eq!(model.navigator.current(), Some(6), "no row below");
    let model = update(model, Message::SelectHighlighted);
    assert!(!model.navigator.is_grid());
    assert_eq!(model.navigator.current(), Some(6));
}

#[test]
fn test_grid_move_ignored_in_single_view() {
    let model = update(create_many_slides_model(8), Message::GridMove(1));
    assert_eq!(model.navigator.current(), Some(0));
}

#[test]
fn test_select_in_grid_opens_slide() {
    let model = update(create_test_model(), Message::ToggleGrid);
    let model = update(model, Message::SelectInGrid(2));
    assert!(!model.navigator.is_grid());
    assert_eq!(model.navigator.current(), Some(2));
}

#[test]
fn test_cycle_theme_invalidates_renders() {
    let mut model = create_test_model();
    let _ = model.plan_renders();
    assert!(model.tracker.is_pending("diagram-0"));

    let mut model = update(model, Message::CycleTheme);
    assert_eq!(model.theme, DiagramTheme::Dark);
    assert!(model.renders.is_empty());
    assert!(!model.tracker.is_pending("diagram-0"));

    let requests = model.plan_renders();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].theme, DiagramTheme::Dark);
}

#[test]
fn test_toggle_auto_hide() {
    let model = create_test_model().with_auto_hide(2000);
    let model = update(model, Message::ToggleAutoHide);
    assert!(!model.autohide.is_enabled());
    assert!(model.autohide.deadline().is_none());
    let model = update(model, Message::ToggleAutoHide);
    assert_eq!(model.autohide.timeout_ms(), 2000);
}

#[test]
fn test_toggle_auto_hide_from_pinned_uses_default() {
    let model = update(create_test_model(), Message::ToggleAutoHide);
    assert_eq!(
        model.autohide.timeout_ms(),
        crate::autohide::DEFAULT_TIMEOUT_MS
    );
}

#[test]
fn test_toast_expires_on_tick() {
    let mut model = update(create_test_model(), Message::CycleTheme);
    assert!(model.active_toast().is_some());
    model.clock_ms = 10_000;
    let model = update(model, Message::Tick);
    assert!(model.active_toast().is_none());
}

#[test]
fn test_plan_renders_requests_current_diagram_once() {
    let mut model = create_test_model();
    let requests = model.plan_renders();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].ticket.slide_id, "diagram-0");
    assert!(requests[0].code.starts_with("graph TD"));
    assert!(matches!(model.renders.get("diagram-0"), Some(SlideRender::Pending)));

    assert!(model.plan_renders().is_empty(), "pending slide is not re-requested");
}

#[test]
fn test_plan_renders_skips_images_and_grid() {
    let mut model = update(create_test_model(), Message::GoTo(1));
    assert!(model.plan_renders().is_empty());

    let mut model = update(model, Message::ToggleGrid);
    assert!(model.plan_renders().is_empty());
}

#[test]
fn test_accepted_render_is_stored() {
    let mut model = create_test_model();
    let request = model.plan_renders().remove(0);
    assert!(model.apply_worker_event(rendered(request.ticket, "graph TD")));
    assert!(matches!(
        model.renders.get("diagram-0"),
        Some(SlideRender::Text(text)) if text == "graph TD"
    ));
}

#[test]
fn test_late_render_after_navigating_away_is_discarded() {
    let mut model = create_test_model();
    let stale = model.plan_renders().remove(0);

    let mut model = update(model, Message::Next);
    assert!(model.plan_renders().is_empty(), "image slide needs no render");
    assert!(!model.apply_worker_event(rendered(stale.ticket.clone(), "too late")));
    assert!(!model.renders.contains_key("diagram-0"));

    // Coming back asks again with a fresh render id.
    let mut model = update(model, Message::Previous);
    let fresh = model.plan_renders().remove(0);
    assert_ne!(fresh.ticket.render_id, stale.ticket.render_id);
}

#[test]
fn test_render_failure_is_scoped_to_slide() {
    let mut model = create_test_model();
    let request = model.plan_renders().remove(0);
    let event = WorkerEvent::Rendered(RenderResponse {
        ticket: request.ticket,
        result: RenderResult::Failure {
            message: "Parse error".to_string(),
            code: request.code.clone(),
        },
    });
    assert!(model.apply_worker_event(event));
    assert!(matches!(
        model.renders.get("diagram-0"),
        Some(SlideRender::Failed { message, .. }) if message == "Parse error"
    ));

    let mut model = update(model, Message::Last);
    assert_eq!(model.plan_renders().len(), 1, "navigation continues after a failure");
}

#[test]
fn test_rejected_request_becomes_failure() {
    let mut model = create_test_model();
    let request = model.plan_renders().remove(0);
    model.reject_request(request, "render worker is not running");
    assert!(matches!(
        model.renders.get("diagram-0"),
        Some(SlideRender::Failed { message, code })
            if message == "render worker is not running" && code.starts_with("graph TD")
    ));
}

#[test]
fn test_renderer_init_failure_shows_toast() {
    let mut model = create_test_model();
    model.apply_worker_event(WorkerEvent::InitFailed {
        renderer: "mmdc",
        message: "not installed".to_string(),
    });
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Warning);
    assert!(message.contains("not installed"));
}

#[test]
fn test_image_slide_unavailable_when_images_disabled() {
    let mut model = update(create_test_model(), Message::GoTo(1));
    model.images_enabled = false;
    model.load_visible_images();
    assert!(matches!(
        model.images.get("image-1"),
        Some(ImageSlot::Unavailable(reason)) if reason == "images disabled"
    ));
}

#[test]
fn test_image_slide_loads_relative_to_markdown() {
    let dir = tempdir().unwrap();
    let md_path = dir.path().join("deck.md");
    image::DynamicImage::new_rgba8(4, 4)
        .save(dir.path().join("logo.png"))
        .unwrap();

    let model = Model::new(SlideSource::File(md_path), extract(DECK), (80, 24))
        .with_picker(Some(ratatui_image::picker::Picker::halfblocks()));
    let mut model = update(model, Message::GoTo(1));
    model.load_visible_images();
    assert!(matches!(model.images.get("image-1"), Some(ImageSlot::Loaded(_))));
}

#[test]
fn test_missing_image_is_reported() {
    let model =
        create_test_model().with_picker(Some(ratatui_image::picker::Picker::halfblocks()));
    let mut model = update(model, Message::GoTo(1));
    model.load_visible_images();
    assert!(matches!(
        model.images.get("image-1"),
        Some(ImageSlot::Unavailable(reason)) if reason.contains("logo.png")
    ));
}

#[test]
fn test_reload_replaces_slides_and_resets_navigation() {
    let mut model = create_test_model();
    model.navigator.go_to(2);
    model.navigator.toggle_grid_view();
    let _ = model.plan_renders();

    assert!(model.reload_from_text("```mermaid\ngantt\n  title Plan\n```"));
    assert_eq!(model.slides.len(), 1);
    assert_eq!(model.navigator.current(), Some(0));
    assert!(!model.navigator.is_grid());
    assert!(model.renders.is_empty());
}

#[test]
fn test_reload_with_no_content_keeps_previous_slides() {
    let mut model = update(create_test_model(), Message::Next);
    assert!(!model.reload_from_text("# Nothing here"));
    assert_eq!(model.slides.len(), 3);
    assert_eq!(model.navigator.current(), Some(1));
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Error);
    assert!(message.contains("deck.md"));
}

#[test]
fn test_force_reload_reads_file_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("deck.md");
    std::fs::write(&path, DECK).unwrap();
    let mut model = Model::new(SlideSource::File(path.clone()), extract(DECK), (80, 24));

    std::fs::write(&path, "```mermaid\nerDiagram\n  A ||--o{ B : has\n```\n").unwrap();
    model = update(model, Message::ForceReload);
    App::handle_message_side_effects(&mut model, &Message::ForceReload);

    assert_eq!(model.slides.len(), 1);
    assert_eq!(model.active_toast().map(|t| t.0), Some("Reloaded (1 slides)"));
}

#[test]
fn test_force_reload_without_file_warns() {
    let mut model = create_many_slides_model(2);
    App::handle_message_side_effects(&mut model, &Message::ForceReload);
    assert_eq!(model.slides.len(), 2);
    assert_eq!(model.active_toast().map(|t| t.1), Some(ToastLevel::Error));
}

#[test]
fn test_key_mapping_single_view() {
    let model = create_test_model();
    assert_eq!(App::handle_key(key(KeyCode::Right), &model), Some(Message::Next));
    assert_eq!(App::handle_key(key(KeyCode::Char(' ')), &model), Some(Message::Next));
    assert_eq!(App::handle_key(key(KeyCode::Left), &model), Some(Message::Previous));
    assert_eq!(App::handle_key(key(KeyCode::Home), &model), Some(Message::First));
    assert_eq!(App::handle_key(key(KeyCode::End), &model), Some(Message::Last));
    assert_eq!(App::handle_key(key(KeyCode::Char('3')), &model), Some(Message::GoTo(2)));
    assert_eq!(App::handle_key(key(KeyCode::Char('g')), &model), Some(Message::ToggleGrid));
    assert_eq!(App::handle_key(key(KeyCode::Esc), &model), Some(Message::Escape));
    assert_eq!(App::handle_key(key(KeyCode::Enter), &model), None);
}

#[test]
fn test_key_mapping_grid_view() {
    let model = update(create_test_model(), Message::ToggleGrid);
    assert_eq!(App::handle_key(key(KeyCode::Down), &model), Some(Message::GridMove(1)));
    assert_eq!(App::handle_key(key(KeyCode::Up), &model), Some(Message::GridMove(-1)));
    assert_eq!(App::handle_key(key(KeyCode::Enter), &model), Some(Message::SelectHighlighted));
    assert_eq!(
        App::handle_key(key(KeyCode::Char('2')), &model),
        Some(Message::SelectInGrid(1))
    );
}

#[test]
fn test_key_release_and_ctrl_c() {
    let model = create_test_model();
    let release = KeyEvent::new_with_kind(KeyCode::Right, KeyModifiers::NONE, KeyEventKind::Release);
    assert_eq!(App::handle_key(release, &model), None);
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(App::handle_key(ctrl_c, &model), Some(Message::Quit));
}

#[test]
fn test_help_captures_keys() {
    let model = update(create_test_model(), Message::ToggleHelp);
    assert_eq!(App::handle_key(key(KeyCode::Right), &model), None);
    assert_eq!(App::handle_key(key(KeyCode::Esc), &model), Some(Message::HideHelp));
}

#[test]
fn test_click_on_grid_card_selects_it() {
    let model = update(create_many_slides_model(6), Message::ToggleGrid);
    // Body starts below the one-row header; cards are 26x5.
    assert_eq!(App::handle_mouse(click(30, 7), &model), Some(Message::SelectInGrid(4)));
    assert_eq!(App::handle_mouse(click(70, 20), &model), None);
}

#[test]
fn test_click_on_slide_edges_navigates() {
    let model = create_test_model();
    assert_eq!(App::handle_mouse(click(2, 10), &model), Some(Message::Previous));
    assert_eq!(App::handle_mouse(click(78, 10), &model), Some(Message::Next));
    assert_eq!(App::handle_mouse(click(40, 10), &model), None);
}

#[test]
fn test_activity_events() {
    assert!(App::is_activity(&Event::FocusGained));
    assert!(App::is_activity(&Event::Key(key(KeyCode::Char('x')))));
    assert!(!App::is_activity(&Event::Resize(80, 24)));
    assert!(!App::is_activity(&Event::FocusLost));
}

#[test]
fn test_resize_event_is_debounced() {
    let model = create_test_model();
    let mut debouncer = ResizeDebouncer::new(100);
    let msg = App::handle_event(&Event::Resize(100, 30), &model, 1000, &mut debouncer);
    assert_eq!(msg, None);
    assert!(debouncer.is_pending());
    assert_eq!(debouncer.take_ready(1050), None);
    assert_eq!(debouncer.take_ready(1100), Some((100, 30)));

    let model = update(model, Message::Resize(100, 30));
    assert_eq!(model.size, (100, 30));
}

#[test]
fn test_source_labels() {
    assert_eq!(SlideSource::File(PathBuf::from("/tmp/deck.md")).label(), "deck.md");
    assert_eq!(SlideSource::Stdin.label(), "<stdin>");
    assert_eq!(
        SlideSource::File(PathBuf::from("deck.md")).base_dir(),
        PathBuf::from(".")
    );
}

#[test]
fn test_watch_needs_a_file_source() {
    let mut model = Model::new(SlideSource::Stdin, extract(DECK), (80, 24));
    model.watch_enabled = true;
    assert!(App::make_file_watcher(&mut model).is_none());
    assert!(!model.watch_enabled);

    let dir = tempdir().unwrap();
    let path = dir.path().join("deck.md");
    std::fs::write(&path, DECK).unwrap();
    let mut model = Model::new(SlideSource::File(path), extract(DECK), (80, 24));
    model.watch_enabled = true;
    assert!(App::make_file_watcher(&mut model).is_some());
    assert!(model.watch_enabled);
}
