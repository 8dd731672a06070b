//! Where to put the popup window relative to the tray icon.

use crate::types::{Display, Point, Rect, TaskbarPosition};

/// Works out which edge of `display` the tray icon sits on.
///
/// The edge closest to the centre of the tray rectangle wins. Ties resolve
/// in the order bottom, top, left, right.
pub fn taskbar_position(tray: &Rect, display: &Display) -> TaskbarPosition {
    let c = tray.center();
    let b = &display.bounds;

    let candidates = [
        (TaskbarPosition::Bottom, b.bottom() as i64 - c.y as i64),
        (TaskbarPosition::Top, c.y as i64 - b.y as i64),
        (TaskbarPosition::Left, c.x as i64 - b.x as i64),
        (TaskbarPosition::Right, b.right() as i64 - c.x as i64),
    ];

    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.1.abs() < best.1.abs() {
            best = *candidate;
        }
    }
    best.0
}

/// Returns the display containing `point`, or else the one closest to it.
pub fn nearest_display(displays: &[Display], point: Point) -> Option<&Display> {
    displays.iter().min_by_key(|d| d.bounds.distance_sq(point))
}

/// Computes the top-left corner for a window of `window`'s size so that it
/// sits next to the tray icon without leaving the display's work area.
///
/// Only the size of `window` is used; its current origin is ignored.
pub fn compute_position(tray: &Rect, window: &Rect, display: &Display) -> Point {
    let wa = &display.work_area;
    let w = window.width as i64;
    let h = window.height as i64;

    let tray_x = tray.x as i64;
    let tray_y = tray.y as i64;
    let tray_w = tray.width as i64;
    let tray_h = tray.height as i64;

    let (mut x, mut y) = match taskbar_position(tray, display) {
        side @ (TaskbarPosition::Top | TaskbarPosition::Bottom) => {
            let mut x = tray_x + tray_w / 2 - w / 2;
            let y = if side == TaskbarPosition::Top {
                tray_y + tray_h
            } else {
                tray_y - h
            };
            // Anchor from the far side instead of spilling off the right edge.
            if x + w > wa.right() as i64 {
                x = wa.right() as i64 - w;
            }
            (x, y)
        }
        side @ (TaskbarPosition::Left | TaskbarPosition::Right) => {
            let x = if side == TaskbarPosition::Left {
                tray_x + tray_w
            } else {
                tray_x - w
            };
            let mut y = tray_y + tray_h / 2 - h / 2;
            if y + h > wa.bottom() as i64 {
                y = wa.bottom() as i64 - h;
            }
            (x, y)
        }
    };

    x = clamp_axis(x, w, wa.x as i64, wa.right() as i64);
    y = clamp_axis(y, h, wa.y as i64, wa.bottom() as i64);

    Point::new(x as i32, y as i32)
}

/// Keeps `[start, start + len)` inside `[lo, hi)`. Oversize spans are
/// pinned to `lo`.
fn clamp_axis(start: i64, len: i64, lo: i64, hi: i64) -> i64 {
    let max_start = (hi - len).max(lo);
    start.clamp(lo, max_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_hd() -> Display {
        Display::new(Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1040))
    }

    fn mac_display() -> Display {
        Display::new(Rect::new(0, 0, 1440, 900), Rect::new(0, 25, 1440, 875))
    }

    #[test]
    fn taskbar_bottom_for_windows_tray() {
        let tray = Rect::new(1700, 1045, 24, 30);
        assert_eq!(taskbar_position(&tray, &full_hd()), TaskbarPosition::Bottom);
    }

    #[test]
    fn taskbar_top_for_menu_bar() {
        let tray = Rect::new(1200, 0, 22, 24);
        assert_eq!(taskbar_position(&tray, &mac_display()), TaskbarPosition::Top);
    }

    #[test]
    fn taskbar_left_and_right() {
        let left = Rect::new(0, 600, 40, 24);
        let right = Rect::new(1880, 600, 40, 24);
        assert_eq!(taskbar_position(&left, &full_hd()), TaskbarPosition::Left);
        assert_eq!(taskbar_position(&right, &full_hd()), TaskbarPosition::Right);
    }

    #[test]
    fn taskbar_position_is_idempotent() {
        let tray = Rect::new(913, 1050, 24, 30);
        let display = full_hd();
        let first = taskbar_position(&tray, &display);
        for _ in 0..5 {
            assert_eq!(taskbar_position(&tray, &display), first);
        }
    }

    #[test]
    fn top_taskbar_places_window_below_tray_centered() {
        let tray = Rect::new(700, 0, 20, 25);
        let window = Rect::new(0, 0, 420, 420);
        let p = compute_position(&tray, &window, &mac_display());
        assert_eq!(p, Point::new(700 + 10 - 210, 25));
    }

    #[test]
    fn bottom_taskbar_places_window_above_tray() {
        let tray = Rect::new(900, 1045, 24, 30);
        let window = Rect::new(0, 0, 420, 420);
        let display = Display::new(Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1045));
        let p = compute_position(&tray, &window, &display);
        assert_eq!(p, Point::new(900 + 12 - 210, 1045 - 420));
    }

    #[test]
    fn right_overflow_anchors_to_work_area_edge() {
        let tray = Rect::new(1870, 1045, 24, 30);
        let window = Rect::new(0, 0, 420, 420);
        let display = Display::new(Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1045));
        let p = compute_position(&tray, &window, &display);
        assert_eq!(p.x, 1920 - 420);
        assert_eq!(p.y, 1045 - 420);
    }

    #[test]
    fn left_taskbar_places_window_to_the_right() {
        let display = Display::new(Rect::new(0, 0, 1920, 1080), Rect::new(48, 0, 1872, 1080));
        let tray = Rect::new(8, 500, 32, 32);
        let window = Rect::new(0, 0, 400, 300);
        let p = compute_position(&tray, &window, &display);
        assert_eq!(p.y, 500 + 16 - 150);
        // Tray sits outside the work area, the clamp pulls the window in.
        assert_eq!(p.x, 48);
    }

    #[test]
    fn right_taskbar_places_window_to_the_left() {
        let display = Display::new(Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1872, 1080));
        let tray = Rect::new(1880, 400, 32, 32);
        let window = Rect::new(0, 0, 400, 300);
        let p = compute_position(&tray, &window, &display);
        assert_eq!(p, Point::new(1872 - 400, 400 + 16 - 150));
    }

    #[test]
    fn vertical_bottom_overflow_anchors_to_work_area_bottom() {
        let display = Display::new(Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1872, 1080));
        let tray = Rect::new(1884, 1030, 32, 32);
        let window = Rect::new(0, 0, 400, 300);
        let p = compute_position(&tray, &window, &display);
        assert_eq!(p.y, 1080 - 300);
    }

    #[test]
    fn secondary_display_with_negative_origin() {
        let display = Display::new(
            Rect::new(-1920, 0, 1920, 1080),
            Rect::new(-1920, 0, 1920, 1040),
        );
        let tray = Rect::new(-100, 1045, 24, 30);
        let window = Rect::new(0, 0, 420, 420);
        let p = compute_position(&tray, &window, &display);
        assert_eq!(p.x, -420);
        assert_eq!(p.y, 1040 - 420);
    }

    #[test]
    fn oversize_window_pinned_to_work_area_origin() {
        let tray = Rect::new(700, 0, 20, 25);
        let window = Rect::new(0, 0, 3000, 2000);
        let p = compute_position(&tray, &window, &mac_display());
        assert_eq!(p, Point::new(0, 25));
    }

    #[test]
    fn window_never_fully_outside_work_area() {
        let displays = [
            full_hd(),
            mac_display(),
            Display::new(Rect::new(1920, -200, 1280, 1024), Rect::new(1920, -200, 1280, 984)),
            Display::new(Rect::new(0, 0, 800, 600), Rect::new(40, 0, 760, 600)),
        ];
        let windows = [Rect::new(0, 0, 420, 420), Rect::new(0, 0, 1000, 900)];

        for display in &displays {
            let b = display.bounds;
            let step_x = (b.width / 8) as i32;
            let step_y = (b.height / 8) as i32;
            for i in 0..=8 {
                for j in 0..=8 {
                    let tray = Rect::new(b.x + i * step_x, b.y + j * step_y, 24, 24);
                    for window in &windows {
                        let p = compute_position(&tray, window, display);
                        let placed = Rect::new(p.x, p.y, window.width, window.height);
                        assert!(
                            placed.intersects(&display.work_area),
                            "window {placed} outside work area {} (tray {tray})",
                            display.work_area
                        );
                        assert!(p.x >= display.work_area.x);
                        assert!(p.y >= display.work_area.y);
                    }
                }
            }
        }
    }

    #[test]
    fn nearest_display_prefers_containing_display() {
        let displays = [
            full_hd(),
            Display::new(Rect::new(1920, 0, 1280, 1024), Rect::new(1920, 0, 1280, 984)),
        ];
        let d = nearest_display(&displays, Point::new(2000, 1000)).unwrap();
        assert_eq!(d.bounds.x, 1920);
    }

    #[test]
    fn nearest_display_falls_back_to_closest() {
        let displays = [
            full_hd(),
            Display::new(Rect::new(1920, 0, 1280, 1024), Rect::new(1920, 0, 1280, 984)),
        ];
        // Below the second display, in the gap left by its shorter height.
        let d = nearest_display(&displays, Point::new(3000, 1070)).unwrap();
        assert_eq!(d.bounds.x, 1920);
        assert!(nearest_display(&[], Point::new(0, 0)).is_none());
    }
}
