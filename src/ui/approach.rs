use crate::ui::{Point, Rect};

/// Extra room, in pixels, granted around the corridor between the anchor
/// and the panel before a pointer position stops counting as approaching.
pub const CORRIDOR_MARGIN: f32 = 50.0;

/// Which side of the anchor the panel was placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelSide {
    Above,
    Below,
    Left,
    Right,
}

/// Returns true when the pointer sits in the half-plane facing the panel:
/// the angle between (anchor center -> panel center) and (anchor center ->
/// pointer) is strictly below 90 degrees. A pointer coinciding with the
/// anchor center, or degenerate rectangles, count as not approaching.
pub fn is_approaching(pointer: Point, from: Rect, toward: Rect) -> bool {
    let from_center = from.center();
    let toward_center = toward.center();

    let to_panel_x = toward_center.x - from_center.x;
    let to_panel_y = toward_center.y - from_center.y;
    let to_pointer_x = pointer.x - from_center.x;
    let to_pointer_y = pointer.y - from_center.y;

    if (to_panel_x == 0.0 && to_panel_y == 0.0) || (to_pointer_x == 0.0 && to_pointer_y == 0.0) {
        return false;
    }

    // Strictly positive dot product <=> angle strictly below 90 degrees.
    to_panel_x * to_pointer_x + to_panel_y * to_pointer_y > 0.0
}

/// Direction-aware corridor variant for a known placement side. The pointer
/// must have crossed the anchor's edge on the approach axis, may overshoot
/// the panel's near edge by at most `CORRIDOR_MARGIN`, and must stay within
/// the union of both rectangles' extents (padded by the same margin) on the
/// perpendicular axis. Moving away on the approach axis never approaches.
pub fn is_in_approach_corridor(pointer: Point, from: Rect, toward: Rect, side: PanelSide) -> bool {
    match side {
        PanelSide::Below => {
            pointer.y >= from.bottom()
                && pointer.y <= toward.y + CORRIDOR_MARGIN
                && within_span(pointer.x, from.x, from.right(), toward.x, toward.right())
        }
        PanelSide::Above => {
            pointer.y <= from.y
                && pointer.y >= toward.bottom() - CORRIDOR_MARGIN
                && within_span(pointer.x, from.x, from.right(), toward.x, toward.right())
        }
        PanelSide::Right => {
            pointer.x >= from.right()
                && pointer.x <= toward.x + CORRIDOR_MARGIN
                && within_span(pointer.y, from.y, from.bottom(), toward.y, toward.bottom())
        }
        PanelSide::Left => {
            pointer.x <= from.x
                && pointer.x >= toward.right() - CORRIDOR_MARGIN
                && within_span(pointer.y, from.y, from.bottom(), toward.y, toward.bottom())
        }
    }
}

fn within_span(value: f32, a_start: f32, a_end: f32, b_start: f32, b_end: f32) -> bool {
    let low = a_start.min(b_start) - CORRIDOR_MARGIN;
    let high = a_end.max(b_end) + CORRIDOR_MARGIN;
    value >= low && value <= high
}
