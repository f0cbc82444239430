use crate::app::Model;
use crate::app::model::ToastLevel;

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Navigation
    /// Next slide (wraps)
    Next,
    /// Previous slide (wraps)
    Previous,
    First,
    Last,
    /// Jump to a 0-based slide index; out-of-range targets are ignored
    GoTo(usize),

    // Grid
    ToggleGrid,
    /// Open the slide at this index in single view
    SelectInGrid(usize),
    /// Open the highlighted grid card
    SelectHighlighted,
    /// Move the grid highlight by whole rows
    GridMove(isize),
    /// Leave grid view, or quit when already in single view
    Escape,

    // Presentation
    CycleTheme,
    ToggleAutoHide,
    ToggleHelp,
    HideHelp,

    // Time and input
    /// Any user input: keeps the controls visible
    Activity,
    /// Periodic clock tick from the event loop
    Tick,

    // File
    /// File changed on disk
    FileChanged,
    /// Reload requested by the user
    ForceReload,

    // Window
    Resize(u16, u16),

    Quit,
}

/// Pure state transition.
///
/// Rendering, image loading and file IO happen in the event loop's side
/// effects after the model has been updated.
pub fn update(mut model: Model, msg: Message) -> Model {
    let before = model.navigator.current();

    match msg {
        Message::Next => model.navigator.next(),
        Message::Previous => model.navigator.previous(),
        Message::First => model.navigator.first(),
        Message::Last => model.navigator.last(),
        Message::GoTo(index) => {
            model.navigator.go_to(index);
        }
        Message::ToggleGrid => model.navigator.toggle_grid_view(),
        Message::SelectInGrid(index) => {
            model.navigator.select_in_grid(index);
        }
        Message::SelectHighlighted => {
            if model.navigator.is_grid() {
                model.navigator.exit_grid();
            }
        }
        Message::GridMove(rows) => {
            if model.navigator.is_grid() {
                let columns = crate::ui::grid_columns(model.size.0);
                model.navigator.grid_move(rows, columns);
            }
        }
        Message::Escape => {
            if model.help_visible {
                close_help(&mut model);
            } else if model.navigator.is_grid() {
                model.navigator.exit_grid();
            } else {
                model.should_quit = true;
            }
        }
        Message::CycleTheme => {
            model.theme = model.theme.cycle();
            model.invalidate_renders();
            model.show_toast(
                ToastLevel::Info,
                format!("Theme: {}", model.theme.as_str()),
            );
        }
        Message::ToggleAutoHide => {
            if model.autohide.is_enabled() {
                model.autohide.set_timeout(0, model.clock_ms);
                model.show_toast(ToastLevel::Info, "Auto-hide off");
            } else {
                let timeout = match model.auto_hide_timeout_ms {
                    0 => crate::autohide::DEFAULT_TIMEOUT_MS,
                    ms => ms,
                };
                model.auto_hide_timeout_ms = timeout;
                model.autohide.set_timeout(timeout, model.clock_ms);
                model.show_toast(ToastLevel::Info, format!("Auto-hide after {timeout} ms"));
            }
        }
        Message::ToggleHelp => {
            if model.help_visible {
                close_help(&mut model);
            } else {
                model.help_visible = true;
                model.autohide.show();
            }
        }
        Message::HideHelp => close_help(&mut model),
        Message::Activity => model.autohide.on_activity(model.clock_ms),
        Message::Tick => {
            model.autohide.tick(model.clock_ms);
            model.expire_toast();
        }
        // Reloading reads the file; handled as a side effect.
        Message::FileChanged | Message::ForceReload => {}
        Message::Resize(width, height) => model.size = (width, height),
        Message::Quit => model.should_quit = true,
    }

    if model.navigator.current() != before {
        model.autohide.on_activity(model.clock_ms);
    }
    model
}

/// Controls stay up while help is open; the idle countdown restarts on close.
fn close_help(model: &mut Model) {
    model.help_visible = false;
    model.autohide.on_activity(model.clock_ms);
}
