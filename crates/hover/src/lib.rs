//! Show/auto-hide behaviour of the tray window.
//!
//! [`HoverMachine`] is a plain state machine: it consumes [`HoverInput`]s,
//! samples the cursor through a [`HoverSurface`], and returns [`Effect`]s
//! instead of touching the window or arming timers itself. [`HoverLoop`]
//! drives it from a queue on the tokio runtime and turns scheduled timers
//! into sleeps that feed back into the same queue.
//!
//! # Timers
//!
//! Every timer carries the generation number that was current when it was
//! armed. A firing whose generation has since moved on is dropped, so
//! restarting a timer never needs to cancel the old one.

pub mod machine;
pub mod runtime;
pub mod surface;
pub mod types;

pub use machine::HoverMachine;
pub use runtime::{HoverHandle, HoverLoop, hover_loop, spawn_hover_loop};
pub use surface::HoverSurface;
pub use types::{
    DEBOUNCE_DELAY, Effect, HoverInput, HoverPolicy, HoverState, POLL_INTERVAL, RESIZE_GRACE,
    Timer, TimerKind, WindowAction,
};
