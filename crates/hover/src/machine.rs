//! The hover state machine.

use tracing::debug;

use crate::surface::HoverSurface;
use crate::types::{
    DEBOUNCE_DELAY, Effect, HoverInput, HoverState, POLL_INTERVAL, RESIZE_GRACE, Timer, TimerKind,
    WindowAction,
};

/// Tracks window visibility and which timers are still live.
///
/// Never touches the window itself; every step returns the effects the
/// caller has to carry out.
#[derive(Debug)]
pub struct HoverMachine {
    state: HoverState,
    /// Bumped by every hover, click, toggle, show and hide.
    hover_generation: u64,
    /// Bumped by every resize.
    resize_generation: u64,
    resizing: bool,
}

impl HoverMachine {
    pub fn new(state: HoverState) -> Self {
        Self {
            state,
            hover_generation: 0,
            resize_generation: 0,
            resizing: false,
        }
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    /// True between a resize and the end of its grace period.
    pub fn is_resizing(&self) -> bool {
        self.resizing
    }

    /// Advances the machine by one input.
    pub fn handle(&mut self, input: HoverInput, surface: &dyn HoverSurface) -> Vec<Effect> {
        match input {
            HoverInput::TrayHover => self.on_tray_hover(surface),
            HoverInput::TrayClicked | HoverInput::ToggleRequested => self.toggle(),
            HoverInput::ShowRequested => self.show(),
            HoverInput::HideRequested => self.hide(),
            HoverInput::WindowBlurred => {
                if self.state.is_visible() && surface.policy().hides_on_blur() {
                    debug!("window lost focus, hiding");
                    self.hide()
                } else {
                    Vec::new()
                }
            }
            HoverInput::WindowResized => self.on_resized(surface),
            HoverInput::TimerFired(timer) => self.on_timer(timer, surface),
            HoverInput::Shutdown => {
                self.hover_generation += 1;
                self.resize_generation += 1;
                self.resizing = false;
                Vec::new()
            }
        }
    }

    fn on_tray_hover(&mut self, surface: &dyn HoverSurface) -> Vec<Effect> {
        if !surface.policy().hover_enabled() {
            return Vec::new();
        }

        let mut effects = Vec::with_capacity(2);
        if !self.state.is_visible() {
            self.state = HoverState::Visible;
            effects.push(Effect::Window(WindowAction::Show));
        }
        self.hover_generation += 1;
        effects.push(Effect::schedule(
            TimerKind::Debounce,
            self.hover_generation,
            DEBOUNCE_DELAY,
        ));
        effects
    }

    fn on_resized(&mut self, surface: &dyn HoverSurface) -> Vec<Effect> {
        self.resize_generation += 1;
        self.resizing = true;

        let mut effects = vec![Effect::schedule(
            TimerKind::ResizeSettle,
            self.resize_generation,
            RESIZE_GRACE,
        )];
        if !surface.policy().detached {
            effects.push(Effect::Window(WindowAction::Reposition));
        }
        effects
    }

    fn on_timer(&mut self, timer: Timer, surface: &dyn HoverSurface) -> Vec<Effect> {
        match timer.kind {
            TimerKind::ResizeSettle => {
                if timer.generation == self.resize_generation {
                    self.resizing = false;
                }
                Vec::new()
            }
            TimerKind::Debounce | TimerKind::Poll if timer.generation != self.hover_generation => {
                Vec::new()
            }
            TimerKind::Debounce => self.after_debounce(surface),
            TimerKind::Poll => self.poll(surface),
        }
    }

    fn after_debounce(&mut self, surface: &dyn HoverSurface) -> Vec<Effect> {
        if !self.state.is_visible() || !surface.policy().hover_enabled() {
            return Vec::new();
        }

        let on_tray = match (surface.cursor_position(), surface.tray_bounds()) {
            (Some(cursor), Some(tray)) => tray.contains(cursor),
            _ => false,
        };
        if on_tray {
            // Still resting on the icon, which sends no further hover events.
            vec![Effect::schedule(
                TimerKind::Debounce,
                self.hover_generation,
                DEBOUNCE_DELAY,
            )]
        } else {
            vec![self.rearm_poll()]
        }
    }

    fn poll(&mut self, surface: &dyn HoverSurface) -> Vec<Effect> {
        if !self.state.is_visible() || !surface.policy().hover_enabled() {
            return Vec::new();
        }
        if self.resizing {
            return vec![self.rearm_poll()];
        }

        let Some(cursor) = surface.cursor_position() else {
            return vec![self.rearm_poll()];
        };
        let over_window = surface.window_bounds().is_some_and(|w| w.contains(cursor));
        let over_tray = surface.tray_bounds().is_some_and(|t| t.contains(cursor));

        if over_window || over_tray {
            vec![self.rearm_poll()]
        } else {
            debug!(x = cursor.x, y = cursor.y, "cursor left window, hiding");
            self.hide()
        }
    }

    fn rearm_poll(&self) -> Effect {
        Effect::schedule(TimerKind::Poll, self.hover_generation, POLL_INTERVAL)
    }

    fn show(&mut self) -> Vec<Effect> {
        self.hover_generation += 1;
        self.state = HoverState::Visible;
        vec![Effect::Window(WindowAction::Show)]
    }

    fn hide(&mut self) -> Vec<Effect> {
        self.hover_generation += 1;
        self.state = HoverState::Hidden;
        vec![Effect::Window(WindowAction::Hide)]
    }

    fn toggle(&mut self) -> Vec<Effect> {
        if self.state.is_visible() {
            self.hide()
        } else {
            self.show()
        }
    }
}
