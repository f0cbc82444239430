use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::{debug, warn};

use crate::app::{App, Message, Model, update};
use crate::render::{RenderWorker, renderer_for};

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

impl App {
    /// Run the presentation until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized or drawn to.
    pub fn run(&mut self) -> Result<()> {
        // Query the terminal for graphics support before the alternate screen.
        let picker = if self.images_enabled {
            crate::image::create_picker(self.force_half_cell)
        } else {
            None
        };

        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; mermaid-slides requires an interactive terminal")?;
        super::set_ui_active(true);
        let size = terminal.size()?;

        let mut model = Model::new(
            self.source.clone(),
            self.slides.clone(),
            (size.width, size.height),
        )
        .with_picker(picker)
        .with_auto_hide(self.auto_hide_ms);
        model.theme = self.theme;
        model.images_enabled = self.images_enabled;
        model.watch_enabled = self.watch_enabled;
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);

        let worker = RenderWorker::spawn(renderer_for(self.renderer));
        let result = Self::event_loop(&mut terminal, &mut model, &worker);

        let _ = execute!(stdout(), DisableFocusChange, DisableMouseCapture);
        ratatui::restore();
        super::set_ui_active(false);
        result
    }

    fn dispatch(model: &mut Model, msg: Message) {
        debug!(?msg, "message");
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, &side_msg);
    }

    fn event_loop(
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        worker: &RenderWorker,
    ) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut watcher = Self::make_file_watcher(model);
        execute!(stdout(), EnableMouseCapture, EnableFocusChange)?;
        let mut needs_render = true;

        loop {
            model.clock_ms = elapsed_ms(start);

            let controls_before = model.controls_visible();
            let toast_before = model.active_toast().is_some();
            *model = update(std::mem::take(model), Message::Tick);
            if controls_before != model.controls_visible()
                || toast_before != model.active_toast().is_some()
            {
                needs_render = true;
            }

            if let Some((width, height)) = resize_debouncer.take_ready(model.clock_ms) {
                Self::dispatch(model, Message::Resize(width, height));
                needs_render = true;
            }

            if watcher
                .as_mut()
                .is_some_and(|w| w.poll(model.clock_ms))
            {
                Self::dispatch(model, Message::FileChanged);
                needs_render = true;
            }

            while let Some(event) = worker.try_next() {
                needs_render |= model.apply_worker_event(event);
            }

            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() {
                10
            } else {
                50
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Drain key repeat bursts before drawing.
                loop {
                    let input = event::read()?;
                    model.clock_ms = elapsed_ms(start);
                    if Self::is_activity(&input) {
                        let controls_before = model.controls_visible();
                        *model = update(std::mem::take(model), Message::Activity);
                        needs_render |= controls_before != model.controls_visible();
                    }
                    if let Some(msg) =
                        Self::handle_event(&input, model, model.clock_ms, &mut resize_debouncer)
                    {
                        Self::dispatch(model, msg);
                        needs_render = true;
                    }
                    if !event::poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }

            if needs_render {
                let requests = model.plan_renders();
                worker.retain(model.tracker.render_ids());
                for request in requests {
                    if !worker.submit(request.clone()) {
                        warn!(render_id = %request.ticket.render_id, "render worker is not running");
                        model.reject_request(request, "render worker is not running");
                    }
                }
                model.load_visible_images();
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
