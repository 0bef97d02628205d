//! Event handling for the console

use crate::display::OutputRenderer;
use crate::logging::log_event_with_tracing;
use sov_events::{AppEvent, GeneralEvent, GuardEvent};

/// Turns verification events into console lines
pub struct EventHandler {
    renderer: OutputRenderer,
    /// Path whose `Checking` line has been printed but not finished
    open_line: Option<String>,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(renderer: OutputRenderer) -> Self {
        Self {
            renderer,
            open_line: None,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        log_event_with_tracing(&event);

        if self.renderer.is_json() {
            return;
        }

        match event {
            AppEvent::Guard(GuardEvent::VerificationStarted {
                model_dir,
                total_bytes,
                ..
            }) => self.renderer.render_header(&model_dir, total_bytes),
            AppEvent::Guard(GuardEvent::EntryHashing { path, .. }) => {
                // A failed flush only delays the line
                let _ = self.renderer.render_checking(&path);
                self.open_line = Some(path);
            }
            AppEvent::Guard(GuardEvent::EntryVerified { path, outcome, .. }) => {
                let line_open = self.open_line.take().is_some_and(|open| open == path);
                self.renderer.render_outcome(&path, &outcome, line_open);
            }
            AppEvent::General(GeneralEvent::Warning { message, context }) => {
                self.renderer.render_warning(&message, context.as_deref());
            }
            AppEvent::Guard(
                GuardEvent::ManifestLoaded { .. } | GuardEvent::VerificationCompleted { .. },
            )
            | AppEvent::General(GeneralEvent::DebugLog { .. }) => {}
        }
    }
}
