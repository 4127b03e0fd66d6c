use std::sync::mpsc::Receiver;
use std::time::Instant;

use tracing::debug;

use crate::editor::EditorQuery;
use crate::editor::hover::HoverController;
use crate::fetch::{FetchUpdate, HttpImageFetcher, ImageFetcher};
use crate::settings::SettingsStore;
use crate::settings::schema::Settings;
use crate::ui::preview_panel::PreviewPanel;
use crate::ui::{EditorEvent, PanelEvent, Size};

/// The object handed to the host plugin shell: one bundle of event
/// handlers, a pump the host calls when idle, and a teardown. Composes the
/// panel, the hover controller, and the settings store; the host brings the
/// editor queries and the event wiring.
pub struct GlancePlugin {
    settings: SettingsStore,
    panel: PreviewPanel,
    hover: HoverController,
    fetch_updates: Receiver<FetchUpdate>,
    running: bool,
}

impl GlancePlugin {
    /// Production wiring: persisted settings and the HTTP fetcher.
    pub fn start(viewport: Size) -> Self {
        let (fetcher, fetch_updates) = HttpImageFetcher::spawn();
        Self::start_with(
            SettingsStore::load(),
            Box::new(fetcher),
            fetch_updates,
            viewport,
        )
    }

    /// Wiring with explicit collaborators, which is also the test seam.
    pub fn start_with(
        settings: SettingsStore,
        fetcher: Box<dyn ImageFetcher>,
        fetch_updates: Receiver<FetchUpdate>,
        viewport: Size,
    ) -> Self {
        debug!("starting hover preview plugin");
        let panel = PreviewPanel::new(fetcher, &settings.settings().preview, viewport);
        Self {
            settings,
            panel,
            hover: HoverController::new(),
            fetch_updates,
            running: true,
        }
    }

    pub fn handle_editor_event(
        &mut self,
        event: &EditorEvent,
        editor: &dyn EditorQuery,
        now: Instant,
    ) {
        if !self.running {
            return;
        }
        match event {
            EditorEvent::PointerEnter { target, point } => {
                self.hover
                    .on_pointer_enter(target, *point, editor, &self.panel, now);
            }
            EditorEvent::PointerMove { point } => self.hover.on_pointer_move(*point),
            EditorEvent::PointerLeave { point } => {
                self.hover.on_pointer_leave(*point, &mut self.panel, now);
            }
        }
    }

    pub fn handle_panel_event(&mut self, event: &PanelEvent) {
        if !self.running {
            return;
        }
        match event {
            PanelEvent::PointerEnter => self.panel.set_pointer_inside(true),
            PanelEvent::PointerLeave => {
                self.panel.set_pointer_inside(false);
                self.panel.close();
            }
            PanelEvent::PointerDown { point } => self.panel.begin_drag(*point),
            PanelEvent::PointerMove { point } => self.panel.update_drag(*point),
            PanelEvent::PointerUp => self.panel.end_drag(),
            PanelEvent::DoubleClick => self.panel.unlock(),
        }
    }

    /// Returns whether the event was consumed (the host should suppress its
    /// default scroll handling only for zoom gestures).
    pub fn handle_wheel(&mut self, delta: f32, zoom_modifier: bool) -> bool {
        if !self.running {
            return false;
        }
        self.hover.on_wheel(delta, zoom_modifier, &mut self.panel)
    }

    /// Idle pump: fires due hover deadlines, applies any fetch completions
    /// that arrived since the last call, and flushes a dirty settings
    /// record once its debounce has passed.
    pub fn pump(&mut self, now: Instant) {
        if !self.running {
            return;
        }
        self.hover.tick(now, &mut self.panel);
        while let Ok(update) = self.fetch_updates.try_recv() {
            self.panel.apply_fetch(update);
        }
        self.settings.flush_if_due(now);
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.panel.set_viewport(viewport);
    }

    /// Writes through the settings store and re-applies the preview limits
    /// to the live panel.
    pub fn update_settings<F>(&mut self, now: Instant, mutator: F)
    where
        F: FnOnce(&mut Settings),
    {
        self.settings.update(now, mutator);
        self.panel.apply_settings(&self.settings.settings().preview);
    }

    pub fn settings(&self) -> &Settings {
        self.settings.settings()
    }

    pub fn panel(&self) -> &PreviewPanel {
        &self.panel
    }

    /// Teardown: cancels pending hover intents, hides the panel (locked or
    /// not), invalidates in-flight fetches, and flushes settings. Events
    /// arriving afterwards are ignored.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        debug!("stopping hover preview plugin");
        self.running = false;
        self.hover.teardown();
        self.panel.teardown();
        self.settings.force_flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{LineSpan, PointerTarget, TargetCapabilities};
    use crate::fetch::{FetchTicket, PreviewImage};
    use crate::ui::preview_panel::VisualStatus;
    use crate::ui::{Point, Rect};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc::{Sender, channel};
    use std::time::Duration;

    const LINE: &str = "shot: [screenshot](https://imgur.com/abc123) done";

    #[derive(Default, Clone)]
    struct RecordingFetcher {
        requests: Rc<RefCell<Vec<(FetchTicket, String)>>>,
    }

    impl ImageFetcher for RecordingFetcher {
        fn request(&mut self, ticket: FetchTicket, url: &str) {
            self.requests.borrow_mut().push((ticket, url.to_string()));
        }
    }

    struct FakeEditor;

    impl EditorQuery for FakeEditor {
        fn offset_at_point(&self, point: Point) -> Option<usize> {
            let offset = point.x as usize;
            (offset <= LINE.len()).then_some(offset)
        }

        fn line_at(&self, _offset: usize) -> Option<LineSpan> {
            Some(LineSpan {
                text: LINE.to_string(),
                start: 0,
            })
        }
    }

    struct Harness {
        plugin: GlancePlugin,
        fetcher: RecordingFetcher,
        updates: Sender<FetchUpdate>,
        settings_path: std::path::PathBuf,
    }

    fn harness(name: &str) -> Harness {
        let dir = std::env::temp_dir().join("glance-plugin-tests");
        let _ = std::fs::create_dir_all(&dir);
        let settings_path = dir.join(format!("{name}-{}.json", std::process::id()));

        let (updates, rx) = channel();
        let fetcher = RecordingFetcher::default();
        let plugin = GlancePlugin::start_with(
            SettingsStore::with_path(&settings_path),
            Box::new(fetcher.clone()),
            rx,
            Size {
                width: 1000.0,
                height: 800.0,
            },
        );
        Harness {
            plugin,
            fetcher,
            updates,
            settings_path,
        }
    }

    fn link_target() -> PointerTarget {
        PointerTarget {
            capabilities: TargetCapabilities {
                underlined_link: true,
                ..Default::default()
            },
            rect: Rect::new(48.0, 100.0, 90.0, 18.0),
        }
    }

    fn over_label() -> Point {
        let offset = LINE.find("screenshot").expect("label") + 2;
        Point {
            x: offset as f32,
            y: 108.0,
        }
    }

    fn enter(plugin: &mut GlancePlugin, point: Point, now: Instant) {
        plugin.handle_editor_event(
            &EditorEvent::PointerEnter {
                target: link_target(),
                point,
            },
            &FakeEditor,
            now,
        );
    }

    #[test]
    fn hover_to_shown_to_dismiss_end_to_end() {
        let mut h = harness("end-to-end");
        let t0 = Instant::now();

        // Pointer settles on the link; nothing shows inside the debounce.
        enter(&mut h.plugin, over_label(), t0);
        h.plugin.pump(t0 + Duration::from_millis(50));
        assert_eq!(h.plugin.panel().status(), VisualStatus::Hidden);

        // Debounce elapses: the panel opens in loading and the fetch goes
        // out for the rewritten direct image URL.
        h.plugin.pump(t0 + Duration::from_millis(100));
        assert_eq!(h.plugin.panel().status(), VisualStatus::Loading);
        let (ticket, requested) = h.fetcher.requests.borrow()[0].clone();
        assert_eq!(requested, "https://i.imgur.com/abc123.jpg");

        // The image resolves at t+150ms: shown, sized to fit 300x300 while
        // keeping the 3:2 aspect of the 600x400 source.
        h.updates
            .send(FetchUpdate::Loaded {
                ticket,
                image: PreviewImage {
                    width: 600,
                    height: 400,
                    rgba: vec![0; 600 * 400 * 4],
                },
            })
            .expect("send update");
        h.plugin.pump(t0 + Duration::from_millis(150));
        assert_eq!(h.plugin.panel().status(), VisualStatus::Shown);
        let rect = h.plugin.panel().rect();
        assert_eq!(rect.width, 300.0 + 10.0);
        assert_eq!(rect.height, 200.0 + 10.0);

        // Pointer leaves the link heading straight for the panel: the
        // grace period arms instead of hiding.
        let toward_panel = Point {
            x: rect.center().x,
            y: rect.y + 1.0,
        };
        h.plugin.handle_editor_event(
            &EditorEvent::PointerLeave {
                point: toward_panel,
            },
            &FakeEditor,
            t0 + Duration::from_millis(200),
        );
        assert_eq!(h.plugin.panel().status(), VisualStatus::Shown);

        // The pointer reaches the panel before the grace deadline, so the
        // panel survives it.
        h.plugin.handle_panel_event(&PanelEvent::PointerEnter);
        h.plugin.pump(t0 + Duration::from_millis(600));
        assert_eq!(h.plugin.panel().status(), VisualStatus::Shown);

        // Leaving the panel finally dismisses it.
        h.plugin.handle_panel_event(&PanelEvent::PointerLeave);
        assert_eq!(h.plugin.panel().status(), VisualStatus::Hidden);
        assert_eq!(h.plugin.panel().current_url(), None);

        let _ = std::fs::remove_file(h.settings_path);
    }

    #[test]
    fn drag_through_panel_events_locks_and_double_click_releases() {
        let mut h = harness("drag-lock");
        let t0 = Instant::now();

        enter(&mut h.plugin, over_label(), t0);
        h.plugin.pump(t0 + Duration::from_millis(100));
        let before = h.plugin.panel().rect();

        h.plugin.handle_panel_event(&PanelEvent::PointerDown {
            point: Point { x: 200.0, y: 200.0 },
        });
        h.plugin.handle_panel_event(&PanelEvent::PointerMove {
            point: Point { x: 230.0, y: 220.0 },
        });
        h.plugin.handle_panel_event(&PanelEvent::PointerUp);

        let after = h.plugin.panel().rect();
        assert_eq!(after.x, before.x + 30.0);
        assert_eq!(after.y, before.y + 20.0);
        assert!(h.plugin.panel().is_position_locked());

        // Locked: neither panel-leave nor scrolling hides it.
        h.plugin.handle_panel_event(&PanelEvent::PointerLeave);
        assert!(!h.plugin.handle_wheel(-120.0, false));
        assert_eq!(h.plugin.panel().status(), VisualStatus::Loading);

        h.plugin.handle_panel_event(&PanelEvent::DoubleClick);
        assert_eq!(h.plugin.panel().status(), VisualStatus::Hidden);

        let _ = std::fs::remove_file(h.settings_path);
    }

    #[test]
    fn wheel_routing_zooms_or_dismisses() {
        let mut h = harness("wheel-routing");
        let t0 = Instant::now();

        enter(&mut h.plugin, over_label(), t0);
        h.plugin.pump(t0 + Duration::from_millis(100));

        assert!(h.plugin.handle_wheel(-120.0, true));
        assert!((h.plugin.panel().scale() - 1.1).abs() < 1e-6);

        assert!(!h.plugin.handle_wheel(-120.0, false));
        assert_eq!(h.plugin.panel().status(), VisualStatus::Hidden);

        let _ = std::fs::remove_file(h.settings_path);
    }

    #[test]
    fn settings_updates_apply_live_and_persist() {
        let mut h = harness("settings-live");
        let t0 = Instant::now();

        enter(&mut h.plugin, over_label(), t0);
        h.plugin.pump(t0 + Duration::from_millis(100));
        let (ticket, _) = h.fetcher.requests.borrow()[0].clone();
        h.updates
            .send(FetchUpdate::Loaded {
                ticket,
                image: PreviewImage {
                    width: 600,
                    height: 400,
                    rgba: vec![0; 600 * 400 * 4],
                },
            })
            .expect("send update");
        h.plugin.pump(t0 + Duration::from_millis(150));
        assert_eq!(h.plugin.panel().rect().width, 310.0);

        h.plugin
            .update_settings(t0 + Duration::from_millis(200), |settings| {
                settings.preview.max_width = 150.0;
                settings.preview.max_height = 150.0;
            });
        assert_eq!(h.plugin.panel().rect().width, 160.0);

        // The debounced write lands through a later pump.
        h.plugin.pump(t0 + Duration::from_secs(2));
        let reloaded = SettingsStore::with_path(&h.settings_path);
        assert_eq!(reloaded.settings().preview.max_width, 150.0);

        let _ = std::fs::remove_file(h.settings_path);
    }

    #[test]
    fn stop_tears_down_and_ignores_later_events() {
        let mut h = harness("stop-teardown");
        let t0 = Instant::now();

        enter(&mut h.plugin, over_label(), t0);
        h.plugin.pump(t0 + Duration::from_millis(100));
        let (ticket, _) = h.fetcher.requests.borrow()[0].clone();

        h.plugin.stop();
        assert_eq!(h.plugin.panel().status(), VisualStatus::Hidden);

        // A completion for the torn-down fetch and fresh hover traffic both
        // bounce off.
        h.updates
            .send(FetchUpdate::Loaded {
                ticket,
                image: PreviewImage {
                    width: 10,
                    height: 10,
                    rgba: vec![0; 400],
                },
            })
            .expect("send update");
        enter(&mut h.plugin, over_label(), t0 + Duration::from_secs(1));
        h.plugin.pump(t0 + Duration::from_secs(2));
        assert_eq!(h.plugin.panel().status(), VisualStatus::Hidden);

        let _ = std::fs::remove_file(h.settings_path);
    }
}
