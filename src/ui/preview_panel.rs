use tracing::{debug, trace};

use crate::fetch::url_rewrite::to_direct_image_url;
use crate::fetch::{FetchTicket, FetchUpdate, ImageFetcher, PreviewImage};
use crate::settings::schema::PreviewSettings;
use crate::ui::approach::PanelSide;
use crate::ui::{Point, Rect, Size};

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;
pub const ZOOM_STEP: f32 = 0.1;

const POSITION_MARGIN: f32 = 10.0;
const CONTENT_PADDING: f32 = 5.0;
const PLACEHOLDER_SIZE: Size = Size {
    width: 120.0,
    height: 40.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualStatus {
    Hidden,
    Loading,
    Shown,
    Error,
}

#[derive(Debug, Clone, Copy)]
struct DragGesture {
    pointer_start: Point,
    panel_start: Point,
}

/// The floating preview element. All visual state lives here; the host
/// draws whatever this struct reports through its accessors. Only one
/// panel exists per plugin instance, so opening a link always supersedes
/// whatever the panel showed before.
pub struct PreviewPanel {
    fetcher: Box<dyn ImageFetcher>,
    status: VisualStatus,
    current_url: Option<String>,
    anchor_rect: Option<Rect>,
    bounds: Rect,
    placement: Option<PanelSide>,
    content: Option<PreviewImage>,
    fitted: Size,
    scale: f32,
    last_scale: f32,
    position_locked: bool,
    pointer_inside: bool,
    drag: Option<DragGesture>,
    open_origin: Point,
    viewport: Size,
    max_width: f32,
    max_height: f32,
    remember_last_size: bool,
    generation: u64,
}

impl PreviewPanel {
    pub fn new(fetcher: Box<dyn ImageFetcher>, settings: &PreviewSettings, viewport: Size) -> Self {
        Self {
            fetcher,
            status: VisualStatus::Hidden,
            current_url: None,
            anchor_rect: None,
            bounds: Rect::default(),
            placement: None,
            content: None,
            fitted: PLACEHOLDER_SIZE,
            scale: 1.0,
            last_scale: 1.0,
            position_locked: false,
            pointer_inside: false,
            drag: None,
            open_origin: Point::default(),
            viewport,
            max_width: settings.max_width,
            max_height: settings.max_height,
            remember_last_size: settings.remember_last_size,
            generation: 0,
        }
    }

    /// Shows the panel for `url`, anchored at the hovered link's rectangle,
    /// positioned from the pointer position. Re-opening the URL already on
    /// display is a no-op; a different URL supersedes the old content and
    /// makes any in-flight load for it stale.
    pub fn open(&mut self, url: &str, anchor_rect: Rect, origin: Point) {
        if self.current_url.as_deref() == Some(url) {
            trace!(url, "preview already open");
            return;
        }
        debug!(url, "opening preview");

        self.current_url = Some(url.to_string());
        self.anchor_rect = Some(anchor_rect);
        self.status = VisualStatus::Loading;
        self.scale = if self.remember_last_size {
            self.last_scale
        } else {
            1.0
        };
        self.content = None;
        self.fitted = PLACEHOLDER_SIZE;
        self.drag = None;
        self.open_origin = origin;
        self.apply_position(origin);

        self.generation += 1;
        let ticket = FetchTicket(self.generation);
        let direct_url = to_direct_image_url(url);
        self.fetcher.request(ticket, &direct_url);
    }

    /// Feeds one fetch completion into the panel. Completions whose ticket
    /// does not match the latest open are stale and must not touch state.
    pub fn apply_fetch(&mut self, update: FetchUpdate) {
        if update.ticket() != FetchTicket(self.generation) || self.current_url.is_none() {
            trace!(ticket = update.ticket().0, "discarding stale fetch result");
            return;
        }

        match update {
            FetchUpdate::Loaded { image, .. } => {
                debug!(width = image.width, height = image.height, "preview loaded");
                self.fitted = self.fit_content(image.width, image.height);
                self.content = Some(image);
                self.status = VisualStatus::Shown;
                self.resize_bounds();
                // The placeholder geometry no longer matches; re-clamp
                // unless a drag gesture currently owns the position.
                if self.drag.is_none() {
                    self.apply_position(self.open_origin);
                }
            }
            FetchUpdate::Failed { message, .. } => {
                debug!(%message, "preview failed to load");
                self.content = None;
                self.fitted = PLACEHOLDER_SIZE;
                self.status = VisualStatus::Error;
                self.resize_bounds();
            }
        }
    }

    /// Hides the panel. Suppressed while the position is locked; safe to
    /// call when already hidden.
    pub fn close(&mut self) {
        if self.position_locked {
            trace!("close suppressed: position locked");
            return;
        }
        if self.current_url.take().is_some() {
            debug!("closing preview");
        }
        self.status = VisualStatus::Hidden;
        self.anchor_rect = None;
        self.placement = None;
        self.content = None;
        self.fitted = PLACEHOLDER_SIZE;
        self.pointer_inside = false;
        self.drag = None;
    }

    /// Steps the zoom scale: wheel-up (negative delta) zooms in, wheel-down
    /// zooms out, clamped to `[MIN_SCALE, MAX_SCALE]`. Ignored when nothing
    /// is on display.
    pub fn zoom(&mut self, delta: f32) {
        if self.current_url.is_none() {
            return;
        }
        let step = if delta > 0.0 { -ZOOM_STEP } else { ZOOM_STEP };
        let next = (self.scale + step).clamp(MIN_SCALE, MAX_SCALE);
        if next != self.scale {
            self.scale = next;
            self.last_scale = next;
            self.resize_bounds();
        }
    }

    pub fn begin_drag(&mut self, pointer: Point) {
        if self.current_url.is_none() {
            return;
        }
        self.drag = Some(DragGesture {
            pointer_start: pointer,
            panel_start: self.bounds.origin(),
        });
    }

    /// Position tracks the pointer delta directly; no clamping while the
    /// gesture is live so the panel never jumps under the cursor.
    pub fn update_drag(&mut self, pointer: Point) {
        if let Some(gesture) = self.drag {
            self.bounds.x = gesture.panel_start.x + (pointer.x - gesture.pointer_start.x);
            self.bounds.y = gesture.panel_start.y + (pointer.y - gesture.pointer_start.y);
        }
    }

    pub fn end_drag(&mut self) {
        if self.drag.take().is_some() {
            debug!("drag finished, position locked");
            self.position_locked = true;
        }
    }

    /// Explicit user action (double-activation on the panel): releases the
    /// position lock and hides the panel.
    pub fn unlock(&mut self) {
        self.position_locked = false;
        self.close();
    }

    pub fn set_pointer_inside(&mut self, inside: bool) {
        self.pointer_inside = inside;
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Live settings change: new size limits apply to the current image
    /// without re-fetching.
    pub fn apply_settings(&mut self, settings: &PreviewSettings) {
        self.max_width = settings.max_width;
        self.max_height = settings.max_height;
        self.remember_last_size = settings.remember_last_size;
        if let Some(content) = &self.content {
            self.fitted = self.fit_content(content.width, content.height);
            self.resize_bounds();
        }
    }

    /// Full teardown: forces the lock open, hides the panel, and makes any
    /// in-flight fetch completion stale.
    pub fn teardown(&mut self) {
        self.position_locked = false;
        self.generation += 1;
        self.close();
    }

    pub fn status(&self) -> VisualStatus {
        self.status
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn anchor_rect(&self) -> Option<Rect> {
        self.anchor_rect
    }

    pub fn rect(&self) -> Rect {
        self.bounds
    }

    pub fn placement(&self) -> Option<PanelSide> {
        self.placement
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_position_locked(&self) -> bool {
        self.position_locked
    }

    pub fn is_pointer_inside(&self) -> bool {
        self.pointer_inside
    }

    pub fn content(&self) -> Option<&PreviewImage> {
        self.content.as_ref()
    }

    fn fit_content(&self, width: u32, height: u32) -> Size {
        if width == 0 || height == 0 {
            return PLACEHOLDER_SIZE;
        }
        let fit = (self.max_width / width as f32)
            .min(self.max_height / height as f32)
            .min(1.0);
        Size {
            width: width as f32 * fit,
            height: height as f32 * fit,
        }
    }

    fn displayed_size(&self) -> Size {
        Size {
            width: self.fitted.width * self.scale + CONTENT_PADDING * 2.0,
            height: self.fitted.height * self.scale + CONTENT_PADDING * 2.0,
        }
    }

    fn resize_bounds(&mut self) {
        let size = self.displayed_size();
        self.bounds.width = size.width;
        self.bounds.height = size.height;
    }

    /// Prefer below-and-right of the origin; flip above on bottom overflow
    /// and clamp horizontally on right overflow.
    fn apply_position(&mut self, origin: Point) {
        let size = self.displayed_size();
        let mut x = origin.x;
        let mut y = origin.y + POSITION_MARGIN;
        let mut side = PanelSide::Below;

        if x + size.width > self.viewport.width - POSITION_MARGIN {
            x = self.viewport.width - size.width - POSITION_MARGIN;
        }
        if y + size.height > self.viewport.height - POSITION_MARGIN {
            y = origin.y - size.height - POSITION_MARGIN;
            side = PanelSide::Above;
        }

        self.bounds = Rect::new(x, y, size.width, size.height);
        self.placement = Some(side);
    }
}
