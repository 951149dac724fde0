//! Console rendering of the clicker state
//!
//! Renders through the log: status text, short notifications and an
//! ASCII speed bar, in the style of the floating widget.

use tracing::info;

use crate::state::{MAX_CPM, MIN_CPM};

use super::DisplaySurface;

const STATUS_ON_ICON: char = '●';
const STATUS_OFF_ICON: char = '○';

const BAR_WIDTH: usize = 15;
const BAR_HANDLE: &str = "░▒░";
const BAR_HANDLE_LEN: usize = 3;

/// Status label for the given activation
pub fn status_text(active: bool) -> String {
    if active {
        format!("{{ON:[{STATUS_ON_ICON}]}}")
    } else {
        format!("{{OFF:[{STATUS_OFF_ICON}]}}")
    }
}

/// ASCII slider with the handle placed proportionally to `rate_cpm`
pub fn render_speed_bar(rate_cpm: u32) -> String {
    let track = BAR_WIDTH - BAR_HANDLE_LEN;
    let range = (MAX_CPM - MIN_CPM).max(1) as f64;
    let position = (rate_cpm.clamp(MIN_CPM, MAX_CPM) - MIN_CPM) as f64 / range;

    let left = ((position * track as f64) as usize).min(track);
    let right = track - left;
    format!("[0 {}{}{}]", "█".repeat(left), BAR_HANDLE, "█".repeat(right))
}

/// Surface that renders to the log
#[derive(Debug)]
pub struct ConsoleSurface {
    rate_cpm: u32,
    active: bool,
}

impl ConsoleSurface {
    pub fn new(rate_cpm: u32) -> Self {
        info!(
            status = %status_text(false),
            speed = %render_speed_bar(rate_cpm),
            "[cpm] {}",
            rate_cpm
        );
        Self {
            rate_cpm,
            active: false,
        }
    }

    /// Notification shown for an activation change
    fn notification(&self) -> String {
        if self.active {
            format!("Activated {} ({} CPM)", STATUS_ON_ICON, self.rate_cpm)
        } else {
            format!("Deactivated {}", STATUS_OFF_ICON)
        }
    }
}

impl DisplaySurface for ConsoleSurface {
    fn on_status_changed(&mut self, active: bool) {
        self.active = active;
        info!(status = %status_text(active), "{}", self.notification());
    }

    fn on_rate_changed(&mut self, rate_cpm: u32) {
        self.rate_cpm = rate_cpm;
        info!(speed = %render_speed_bar(rate_cpm), "[cpm] {}", rate_cpm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(true), "{ON:[●]}");
        assert_eq!(status_text(false), "{OFF:[○]}");
        assert!(status_text(true).contains(STATUS_ON_ICON));
        assert!(status_text(false).contains(STATUS_OFF_ICON));
    }

    #[test]
    fn test_speed_bar_bounds() {
        assert_eq!(render_speed_bar(MIN_CPM), "[0 ░▒░████████████]");
        assert_eq!(render_speed_bar(MAX_CPM), "[0 ████████████░▒░]");
        assert_eq!(render_speed_bar(0), render_speed_bar(MIN_CPM));
        assert_eq!(render_speed_bar(99_999), render_speed_bar(MAX_CPM));
    }

    #[test]
    fn test_speed_bar_width_is_constant() {
        for cpm in [1, 600, 1500, 2999, 3000] {
            let bar = render_speed_bar(cpm);
            assert_eq!(bar.chars().count(), BAR_WIDTH + 4, "{bar}");
        }
    }

    #[test]
    fn test_speed_bar_default_rate() {
        assert_eq!(render_speed_bar(600), "[0 ██░▒░██████████]");
    }

    #[test]
    fn test_notifications_follow_rate() {
        let mut surface = ConsoleSurface::new(600);
        surface.on_rate_changed(1200);
        surface.on_status_changed(true);
        assert_eq!(surface.notification(), "Activated ● (1200 CPM)");
        surface.on_status_changed(false);
        assert_eq!(surface.notification(), "Deactivated ○");
    }
}
