use crate::editor::PointerTarget;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    pub fn origin(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Pointer events arriving from the editor surface.
#[derive(Debug, Clone)]
pub enum EditorEvent {
    PointerEnter { target: PointerTarget, point: Point },
    PointerMove { point: Point },
    PointerLeave { point: Point },
}

/// Pointer events arriving from the preview panel element itself.
#[derive(Debug, Clone)]
pub enum PanelEvent {
    PointerEnter,
    PointerLeave,
    PointerDown { point: Point },
    PointerMove { point: Point },
    PointerUp,
    DoubleClick,
}

pub mod approach;
pub mod preview_panel;
