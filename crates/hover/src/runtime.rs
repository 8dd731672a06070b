//! Runs a [`HoverMachine`] on the tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::machine::HoverMachine;
use crate::surface::HoverSurface;
use crate::types::{Effect, HoverInput, HoverState, Timer};

/// Sending side of a hover loop. Cheap to clone; usable from any thread,
/// including synchronous OS callbacks.
#[derive(Clone)]
pub struct HoverHandle {
    tx: mpsc::UnboundedSender<HoverInput>,
    state: watch::Receiver<HoverState>,
    cancel: CancellationToken,
}

impl HoverHandle {
    /// Queues an input. Inputs sent after shutdown are dropped.
    pub fn send(&self, input: HoverInput) {
        if self.tx.send(input).is_err() {
            trace!(?input, "hover loop gone, input dropped");
        }
    }

    /// Visibility as of the last processed input.
    pub fn state(&self) -> HoverState {
        *self.state.borrow()
    }

    /// Stops the loop and every pending timer.
    pub fn shutdown(&self) {
        self.send(HoverInput::Shutdown);
        self.cancel.cancel();
    }
}

/// The task that owns the machine. Obtain one from [`hover_loop`].
pub struct HoverLoop {
    machine: HoverMachine,
    surface: Arc<dyn HoverSurface>,
    rx: mpsc::UnboundedReceiver<HoverInput>,
    tx: mpsc::UnboundedSender<HoverInput>,
    state: watch::Sender<HoverState>,
    cancel: CancellationToken,
}

/// Creates a hover loop and its handle without starting it.
///
/// The loop stops when `cancel` fires; cancelling also drops every timer
/// that has not fired yet.
pub fn hover_loop(
    surface: Arc<dyn HoverSurface>,
    initial: HoverState,
    cancel: CancellationToken,
) -> (HoverHandle, HoverLoop) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(initial);

    let handle = HoverHandle {
        tx: tx.clone(),
        state: state_rx,
        cancel: cancel.clone(),
    };
    let hover_loop = HoverLoop {
        machine: HoverMachine::new(initial),
        surface,
        rx,
        tx,
        state: state_tx,
        cancel,
    };
    (handle, hover_loop)
}

/// Creates a hover loop and spawns it on the current tokio runtime.
pub fn spawn_hover_loop(
    surface: Arc<dyn HoverSurface>,
    initial: HoverState,
    cancel: CancellationToken,
) -> HoverHandle {
    let (handle, hover_loop) = hover_loop(surface, initial, cancel);
    tokio::spawn(hover_loop.run());
    handle
}

impl HoverLoop {
    pub async fn run(mut self) {
        debug!("hover loop started");
        loop {
            let input = tokio::select! {
                _ = self.cancel.cancelled() => break,
                input = self.rx.recv() => match input {
                    Some(input) => input,
                    None => break,
                },
            };

            trace!(?input, "hover input");
            for effect in self.machine.handle(input, self.surface.as_ref()) {
                match effect {
                    Effect::Window(action) => {
                        debug!(?action, "window action");
                        self.surface.apply(action);
                    }
                    Effect::Schedule { timer, delay } => self.arm(timer, delay),
                }
            }
            self.state.send_replace(self.machine.state());
        }
        debug!("hover loop stopped");
    }

    fn arm(&self, timer: Timer, delay: Duration) {
        let tx = self.tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(HoverInput::TimerFired(timer));
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::tests::FakeSurface;
    use crate::types::{HoverPolicy, WindowAction};

    fn start(surface: &Arc<FakeSurface>) -> (HoverHandle, CancellationToken) {
        let cancel = CancellationToken::new();
        let handle = spawn_hover_loop(surface.clone(), HoverState::Hidden, cancel.clone());
        (handle, cancel)
    }

    #[tokio::test(start_paused = true)]
    async fn hover_then_leave_hides_window() {
        let surface = Arc::new(FakeSurface::new());
        let (handle, _cancel) = start(&surface);

        handle.send(HoverInput::TrayHover);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(surface.applied(), vec![WindowAction::Show]);
        assert_eq!(handle.state(), HoverState::Visible);

        surface.move_cursor(300, 900);
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(surface.applied(), vec![WindowAction::Show, WindowAction::Hide]);
        assert_eq!(handle.state(), HoverState::Hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn window_stays_while_cursor_inside() {
        let surface = Arc::new(FakeSurface::new());
        let (handle, _cancel) = start(&surface);

        handle.send(HoverInput::TrayHover);
        surface.move_cursor(1600, 200);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(surface.applied(), vec![WindowAction::Show]);
        assert!(handle.state().is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn resize_grace_delays_hide() {
        let surface = Arc::new(FakeSurface::new());
        let (handle, _cancel) = start(&surface);

        handle.send(HoverInput::TrayHover);
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.send(HoverInput::WindowResized);
        surface.move_cursor(300, 900);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!surface.applied().contains(&WindowAction::Hide));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(surface.applied().last(), Some(&WindowAction::Hide));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drops_pending_timers() {
        let surface = Arc::new(FakeSurface::new());
        let (handle, cancel) = start(&surface);

        handle.send(HoverInput::TrayHover);
        tokio::time::sleep(Duration::from_millis(10)).await;
        surface.move_cursor(300, 900);
        handle.shutdown();
        assert!(cancel.is_cancelled());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(surface.applied(), vec![WindowAction::Show]);

        // Later inputs go nowhere.
        handle.send(HoverInput::TrayClicked);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(surface.applied(), vec![WindowAction::Show]);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_hover_ignores_tray_but_not_clicks() {
        let surface = Arc::new(FakeSurface::new());
        surface.set_policy(HoverPolicy {
            disable_hover: true,
            ..Default::default()
        });
        let (handle, _cancel) = start(&surface);

        handle.send(HoverInput::TrayHover);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(surface.applied().is_empty());

        handle.send(HoverInput::TrayClicked);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(surface.applied(), vec![WindowAction::Show]);
    }
}
