use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::editor::link_parser::{self, find_link_at};
use crate::editor::{EditorQuery, PointerTarget};
use crate::ui::approach::{is_approaching, is_in_approach_corridor};
use crate::ui::preview_panel::PreviewPanel;
use crate::ui::{Point, Rect};

/// Debounce before a hovered link opens the panel.
pub const OPEN_DELAY: Duration = Duration::from_millis(100);
/// Grace period before a hide fires when the pointer left the link moving
/// toward the panel.
pub const GRACE_DELAY: Duration = Duration::from_millis(300);

/// Which exit-trajectory predicate decides whether the panel survives the
/// pointer leaving the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApproachStrategy {
    /// Half-plane test on the angle between link center, panel center, and
    /// pointer.
    #[default]
    Angular,
    /// Direction-aware corridor between the link and the panel's placement
    /// side; falls back to the angular test when no side is recorded.
    Corridor,
}

#[derive(Debug, Clone)]
struct PendingOpen {
    url: String,
    anchor_rect: Rect,
    deadline: Instant,
}

/// Turns raw pointer traffic into panel open/close decisions. Holds at most
/// one pending open intent and one pending close deadline; arming a new
/// intent of either kind replaces the previous one. Deadlines fire from
/// `tick`, so every intent stays cancelable until it actually runs.
pub struct HoverController {
    strategy: ApproachStrategy,
    pending_open: Option<PendingOpen>,
    pending_close: Option<Instant>,
    last_pointer: Point,
}

impl HoverController {
    pub fn new() -> Self {
        Self::with_strategy(ApproachStrategy::default())
    }

    pub fn with_strategy(strategy: ApproachStrategy) -> Self {
        Self {
            strategy,
            pending_open: None,
            pending_close: None,
            last_pointer: Point::default(),
        }
    }

    /// Pointer entered an editor element. Non-hoverable targets return
    /// before any editor query runs; this is the dominant path while the
    /// pointer crosses plain text.
    pub fn on_pointer_enter(
        &mut self,
        target: &PointerTarget,
        point: Point,
        editor: &dyn EditorQuery,
        panel: &PreviewPanel,
        now: Instant,
    ) {
        if !link_parser::is_hoverable_target(&target.capabilities) {
            return;
        }

        self.last_pointer = point;
        self.pending_open = None;

        let Some(offset) = editor.offset_at_point(point) else {
            return;
        };
        let Some(line) = editor.line_at(offset) else {
            return;
        };
        let Some(link) = find_link_at(&line.text, line.start, offset) else {
            return;
        };

        if panel.current_url() == Some(link.url.as_str()) {
            // Back over the anchor of what is already showing: the panel
            // stays, so any pending hide is obsolete.
            self.pending_close = None;
            return;
        }

        debug!(url = %link.url, "link hovered, debouncing open");
        self.pending_open = Some(PendingOpen {
            url: link.url,
            anchor_rect: target.rect,
            deadline: now + OPEN_DELAY,
        });
    }

    /// Tracks the pointer so a firing open uses the position the pointer
    /// reached during the debounce window, not where it entered.
    pub fn on_pointer_move(&mut self, point: Point) {
        self.last_pointer = point;
    }

    /// Pointer left the hovered element. Hides immediately unless the exit
    /// trajectory points at the panel, in which case the grace deadline is
    /// armed and the hide decision is deferred to `tick`.
    pub fn on_pointer_leave(&mut self, point: Point, panel: &mut PreviewPanel, now: Instant) {
        self.pending_open = None;
        self.last_pointer = point;

        let Some(anchor_rect) = panel.anchor_rect() else {
            panel.close();
            return;
        };

        let approaching = match self.strategy {
            ApproachStrategy::Angular => is_approaching(point, anchor_rect, panel.rect()),
            ApproachStrategy::Corridor => match panel.placement() {
                Some(side) => is_in_approach_corridor(point, anchor_rect, panel.rect(), side),
                None => is_approaching(point, anchor_rect, panel.rect()),
            },
        };

        if approaching {
            trace!("pointer heading for the panel, arming grace period");
            self.pending_close = Some(now + GRACE_DELAY);
        } else {
            panel.close();
        }
    }

    /// Wheel traffic while a panel is open: the zoom modifier turns the
    /// wheel into a zoom gesture (the event is consumed); plain scrolling
    /// dismisses the preview and cancels whatever was pending.
    pub fn on_wheel(&mut self, delta: f32, zoom_modifier: bool, panel: &mut PreviewPanel) -> bool {
        if panel.current_url().is_none() {
            return false;
        }
        if zoom_modifier {
            panel.zoom(delta);
            return true;
        }
        panel.close();
        self.pending_open = None;
        self.pending_close = None;
        false
    }

    /// Fires any due intents. An open uses the latest pointer position and
    /// cancels a pending close, since the freshly opened content supersedes
    /// the close intent of whatever it replaced. A close only lands when
    /// the pointer has not reached the panel in the meantime.
    pub fn tick(&mut self, now: Instant, panel: &mut PreviewPanel) {
        if self.pending_open.as_ref().is_some_and(|p| now >= p.deadline) {
            if let Some(pending) = self.pending_open.take() {
                panel.open(&pending.url, pending.anchor_rect, self.last_pointer);
                self.pending_close = None;
            }
        }

        if self.pending_close.is_some_and(|deadline| now >= deadline) {
            self.pending_close = None;
            if !panel.is_pointer_inside() {
                panel.close();
            }
        }
    }

    pub fn teardown(&mut self) {
        self.pending_open = None;
        self.pending_close = None;
    }

    #[cfg(test)]
    fn has_pending_open(&self) -> bool {
        self.pending_open.is_some()
    }

    #[cfg(test)]
    fn has_pending_close(&self) -> bool {
        self.pending_close.is_some()
    }
}

impl Default for HoverController {
    fn default() -> Self {
        Self::new()
    }
}
