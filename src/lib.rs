//! Hover image previews for text editors.
//!
//! Point the cursor at a markdown link whose destination is an imgur page
//! and a floating panel opens with the image, without a click. The crate
//! owns the hover-intent decisions (debounce, exit-trajectory grace), the
//! panel's visual state machine (loading, shown, error, zoom, drag, lock),
//! viewport-aware positioning, and URL-to-direct-image rewriting. The host
//! editor supplies pointer events, text lookups, and rendering; it talks to
//! the engine through [`plugin::GlancePlugin`] and the traits in
//! [`editor`] and [`fetch`].

pub mod editor;
pub mod fetch;
pub mod plugin;
pub mod settings;
pub mod ui;

pub use editor::hover::{ApproachStrategy, GRACE_DELAY, HoverController, OPEN_DELAY};
pub use editor::link_parser::{LinkSpan, find_link_at, is_hoverable_target};
pub use editor::{EditorQuery, LineSpan, PointerTarget, TargetCapabilities};
pub use fetch::url_rewrite::to_direct_image_url;
pub use fetch::{FetchTicket, FetchUpdate, HttpImageFetcher, ImageFetcher, PreviewImage};
pub use plugin::GlancePlugin;
pub use settings::schema::{PreviewSettings, Settings};
pub use settings::{SettingsStore, search_settings};
pub use ui::approach::{PanelSide, is_approaching, is_in_approach_corridor};
pub use ui::preview_panel::{MAX_SCALE, MIN_SCALE, PreviewPanel, VisualStatus, ZOOM_STEP};
pub use ui::{EditorEvent, PanelEvent, Point, Rect, Size};
