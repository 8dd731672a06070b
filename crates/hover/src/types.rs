use std::time::Duration;

/// Delay before re-checking the cursor after it moved over the tray icon.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(100);

/// Period of the "has the cursor left the window" check.
pub const POLL_INTERVAL: Duration = Duration::from_millis(110);

/// How long after the last resize the window counts as still being resized.
pub const RESIZE_GRACE: Duration = Duration::from_millis(600);

/// Settings that switch hover behaviour off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverPolicy {
    pub disable_hover: bool,
    pub detached: bool,
    pub always_on_top: bool,
}

impl HoverPolicy {
    /// True when hovering may show the window and leaving it may hide it.
    pub fn hover_enabled(&self) -> bool {
        !self.disable_hover && !self.detached && !self.always_on_top
    }

    /// True when losing focus should hide the window.
    pub fn hides_on_blur(&self) -> bool {
        !self.detached && !self.always_on_top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverState {
    Hidden,
    Visible,
}

impl HoverState {
    pub fn is_visible(self) -> bool {
        self == HoverState::Visible
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fires once after the last tray hover.
    Debounce,
    /// Re-arms itself until the cursor leaves the window.
    Poll,
    /// Ends the resize grace period.
    ResizeSettle,
}

/// A timer as armed by the machine. `generation` is compared against the
/// machine's counters when the timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub kind: TimerKind,
    pub generation: u64,
}

/// Everything the machine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverInput {
    /// The cursor moved over the tray icon.
    TrayHover,
    TrayClicked,
    /// Global shortcut or the Show/Hide menu entry.
    ToggleRequested,
    ShowRequested,
    HideRequested,
    WindowBlurred,
    WindowResized,
    TimerFired(Timer),
    /// Invalidates every pending timer.
    Shutdown,
}

/// Something the shell has to do to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    /// Show and focus. In tray-anchored mode the shell repositions first.
    Show,
    Hide,
    /// Move next to the tray icon without changing visibility.
    Reposition,
}

/// Output of one machine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Window(WindowAction),
    Schedule { timer: Timer, delay: Duration },
}

impl Effect {
    pub(crate) fn schedule(kind: TimerKind, generation: u64, delay: Duration) -> Self {
        Effect::Schedule {
            timer: Timer { kind, generation },
            delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_flag_disables_hover() {
        assert!(HoverPolicy::default().hover_enabled());
        for policy in [
            HoverPolicy {
                disable_hover: true,
                ..Default::default()
            },
            HoverPolicy {
                detached: true,
                ..Default::default()
            },
            HoverPolicy {
                always_on_top: true,
                ..Default::default()
            },
        ] {
            assert!(!policy.hover_enabled(), "{policy:?}");
        }
    }

    #[test]
    fn disable_hover_still_hides_on_blur() {
        let policy = HoverPolicy {
            disable_hover: true,
            ..Default::default()
        };
        assert!(policy.hides_on_blur());
        let pinned = HoverPolicy {
            always_on_top: true,
            ..Default::default()
        };
        assert!(!pinned.hides_on_blur());
    }
}
