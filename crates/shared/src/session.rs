use crate::canvas::{
    draw_annotation, CanvasAdapter, Layer, Shape, ShapeStyle, SvgCanvas, REGION_FILL,
    REGION_HOVER_FILL, REGION_STROKE,
};
use crate::geo::RegionFeature;
use crate::interaction::AnnotationState;
use crate::layout::DeviceClass;
use crate::placement::{layout_annotation, AnnotationLayout, TextMeasure};
use crate::projection::hit_test;
use crate::registry::RegionRegistry;
use crate::viewport::{
    wheel_zoom_factor, ResizeOutcome, ViewportController, ViewportTransform, ZOOM_STEP,
};

const HIGHLIGHT_OPACITY: f64 = 0.7;

pub struct MapSession<C: CanvasAdapter> {
    registry: RegionRegistry,
    features: Vec<RegionFeature>,
    viewport: ViewportController,
    annotation: AnnotationState,
    layout: Option<AnnotationLayout>,
    hovered: Option<String>,
    flashed: Option<String>,
    canvas: C,
}

impl<C: CanvasAdapter> MapSession<C> {
    pub fn new(
        registry: RegionRegistry,
        features: Vec<RegionFeature>,
        canvas: C,
        window_width: f64,
        window_height: f64,
    ) -> Self {
        let viewport = ViewportController::new(&features, window_width, window_height);
        let mut session = MapSession {
            registry,
            features,
            viewport,
            annotation: AnnotationState::default(),
            layout: None,
            hovered: None,
            flashed: None,
            canvas,
        };
        session.sync_canvas();
        session.redraw_regions();
        tracing::info!(
            regions = session.features.len(),
            class = ?session.viewport.device_class(),
            "Map session ready"
        );
        session
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn device_class(&self) -> DeviceClass {
        self.viewport.device_class()
    }

    pub fn transform(&self) -> ViewportTransform {
        self.viewport.transform()
    }

    /// The open annotation, if any.
    pub fn annotation(&self) -> Option<&AnnotationLayout> {
        self.layout.as_ref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.annotation.selected()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Geometry id of the region under a map-surface point.
    pub fn region_at(&self, point: (f64, f64)) -> Option<&str> {
        hit_test(self.viewport.shapes(), point, &self.viewport.transform())
            .map(|s| s.geometry_id.as_str())
    }

    /// Link target under a point inside the open annotation.
    pub fn link_at(&self, point: (f64, f64)) -> Option<String> {
        self.layout.as_ref()?.link_at(point)
    }

    /// Rerun the projector for a new window size and redraw.
    pub fn resize(&mut self, window_width: f64, window_height: f64) -> ResizeOutcome {
        let outcome = self
            .viewport
            .resize(&self.features, window_width, window_height);
        if outcome.gestures_removed {
            self.flashed = None;
        }
        if outcome.gestures_installed {
            self.hovered = None;
        }
        self.sync_canvas();
        self.redraw_regions();

        // Re-anchor an open annotation to the freshly projected shape.
        if let Some(id) = self.annotation.selected().map(str::to_string) {
            self.show_annotation(&id);
        }
        outcome
    }

    /// Dispatch a click at a point in map-surface coordinates.
    ///
    /// Clicks landing on the open annotation are left to its links.
    /// Returns the geometry id whose annotation is open afterwards.
    pub fn click_at(&mut self, point: (f64, f64)) -> Option<&str> {
        let on_annotation = self
            .layout
            .as_ref()
            .is_some_and(|l| l.rect().contains_point(point));
        if !on_annotation {
            match self.region_at(point).map(str::to_string) {
                Some(id) => {
                    self.click_region(&id);
                }
                None => {
                    self.click_empty();
                }
            }
        }
        self.selected()
    }

    /// Touch tap: dispatch like a click, then flash the region actually
    /// under the finger when gestures are enabled. Returns the flashed id.
    pub fn tap_at(&mut self, point: (f64, f64)) -> Option<String> {
        let on_annotation = self
            .layout
            .as_ref()
            .is_some_and(|l| l.rect().contains_point(point));
        let hit = if on_annotation {
            None
        } else {
            self.region_at(point).map(str::to_string)
        };
        self.click_at(point);

        let id = hit.filter(|_| self.viewport.gestures_enabled())?;
        self.flash_region(&id);
        Some(id)
    }

    /// Open the annotation for a region, replacing any open one.
    /// Returns whether an annotation is now shown.
    pub fn click_region(&mut self, geometry_id: &str) -> bool {
        self.show_annotation(geometry_id)
    }

    /// Click on the canvas outside every region. Only desktop dismisses.
    pub fn click_empty(&mut self) -> bool {
        if self.viewport.gestures_enabled() {
            return false;
        }
        self.clear_annotation()
    }

    /// Desktop hover highlight. Returns whether the highlight changed.
    pub fn hover_at(&mut self, point: (f64, f64)) -> bool {
        if self.viewport.gestures_enabled() {
            return false;
        }
        let hit = self.region_at(point).map(str::to_string);
        if hit == self.hovered {
            return false;
        }
        self.hovered = hit;
        self.redraw_regions();
        true
    }

    pub fn pointer_leave(&mut self) -> bool {
        if self.hovered.take().is_none() {
            return false;
        }
        self.redraw_regions();
        true
    }

    /// Transient tap highlight used on touch devices.
    pub fn flash_region(&mut self, geometry_id: &str) {
        self.flashed = Some(geometry_id.to_string());
        self.redraw_regions();
    }

    pub fn clear_flash(&mut self) -> bool {
        if self.flashed.take().is_none() {
            return false;
        }
        self.redraw_regions();
        true
    }

    pub fn begin_pan(&mut self, point: (f64, f64)) {
        self.viewport.begin_pan(point);
    }

    pub fn begin_pinch(&mut self, p0: (f64, f64), p1: (f64, f64)) {
        self.viewport.begin_pinch(p0, p1);
    }

    pub fn update_pan(&mut self, point: (f64, f64)) -> bool {
        let changed = self.viewport.update_pan(point);
        self.after_transform(changed)
    }

    pub fn update_pinch(&mut self, p0: (f64, f64), p1: (f64, f64)) -> bool {
        let changed = self.viewport.update_pinch(p0, p1);
        self.after_transform(changed)
    }

    pub fn end_gesture(&mut self) {
        self.viewport.end_gesture();
    }

    pub fn is_gesturing(&self) -> bool {
        self.viewport.gesture().is_some()
    }

    pub fn wheel_zoom(&mut self, point: (f64, f64), delta_y: f64) -> bool {
        let changed = self.viewport.zoom_at(point, wheel_zoom_factor(delta_y));
        self.after_transform(changed)
    }

    pub fn zoom_in(&mut self) -> bool {
        let changed = self.viewport.zoom_by(ZOOM_STEP);
        self.after_transform(changed)
    }

    pub fn zoom_out(&mut self) -> bool {
        let changed = self.viewport.zoom_by(1.0 / ZOOM_STEP);
        self.after_transform(changed)
    }

    pub fn reset_zoom(&mut self) -> bool {
        let changed = self.viewport.reset_transform();
        self.after_transform(changed)
    }

    fn after_transform(&mut self, changed: bool) -> bool {
        if changed {
            self.clear_annotation();
            self.sync_canvas();
        }
        changed
    }

    fn sync_canvas(&mut self) {
        let area = self.viewport.area();
        self.canvas
            .set_viewport(area.width, area.height, self.viewport.transform());
    }

    fn clear_annotation(&mut self) -> bool {
        self.canvas.clear_layer(Layer::Annotation);
        self.layout = None;
        self.annotation.clear()
    }

    fn show_annotation(&mut self, geometry_id: &str) -> bool {
        self.clear_annotation();

        let Some(shape) = self.viewport.shape(geometry_id) else {
            tracing::debug!(geometry_id, "Annotation requested for unknown shape");
            return false;
        };
        let transform = self.viewport.transform();
        let centroid = shape.centroid.map(|c| transform.apply(c));
        let bbox = shape.bbox.map(|b| transform.apply_rect(&b));

        let entry = self.registry.resolve(geometry_id);
        let layout = layout_annotation(
            entry.name,
            entry.items,
            centroid,
            bbox,
            self.viewport.profile(),
            self.viewport.popup_scale(),
            &self.viewport.area().bounds(),
            &self.canvas,
        );
        let Some(layout) = layout else {
            tracing::debug!(geometry_id, "Region geometry unresolved, no annotation");
            return false;
        };

        draw_annotation(&mut self.canvas, &layout);
        self.annotation.select(geometry_id);
        self.layout = Some(layout);
        true
    }

    fn redraw_regions(&mut self) {
        self.canvas.clear_layer(Layer::Regions);
        for shape in self.viewport.shapes() {
            let highlighted = self.hovered.as_deref() == Some(shape.geometry_id.as_str())
                || self.flashed.as_deref() == Some(shape.geometry_id.as_str());
            let style = if highlighted {
                ShapeStyle::filled(REGION_HOVER_FILL).with_opacity(HIGHLIGHT_OPACITY)
            } else {
                ShapeStyle::filled(REGION_FILL)
            };
            self.canvas.draw_shape(
                Layer::Regions,
                Shape::Path {
                    id: Some(shape.geometry_id.clone()),
                    rings: shape.rings.clone(),
                },
                style.with_stroke(REGION_STROKE, 0.5),
            );
        }
    }
}

impl<M: TextMeasure> MapSession<SvgCanvas<M>> {
    pub fn render_svg(&self) -> String {
        self.canvas.to_svg()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Primitive;
    use crate::models::{ContentDataset, TranslationTable};
    use crate::placement::{ApproxTextMeasure, PLACEHOLDER_TEXT};
    use geo_types::{Coord, LineString, MultiPolygon, Polygon};

    type Session = MapSession<SvgCanvas<ApproxTextMeasure>>;

    fn square(id: &str, lon: f64, lat: f64, w: f64, h: f64) -> RegionFeature {
        let ring = LineString::new(vec![
            Coord { x: lon, y: lat },
            Coord { x: lon + w, y: lat },
            Coord { x: lon + w, y: lat + h },
            Coord { x: lon, y: lat + h },
            Coord { x: lon, y: lat },
        ]);
        RegionFeature::new(id, MultiPolygon(vec![Polygon::new(ring, vec![])]))
    }

    fn session(width: f64, height: f64) -> Session {
        let translations: TranslationTable = [("Adygey", "Адыгея"), ("Tuva", "Тыва")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let content = ContentDataset::from_json(
            r#"{"regions":{
                "Адыгея":{"recipes":[{"id":"a","name":"Плов","url":"https://x/a"}]},
                "Тыва":{"recipes":[{"id":"b","name":"Хан","url":"https://x/b"}]}
            }}"#,
        )
        .unwrap();
        let features = vec![
            square("Adygey", 36.0, 43.0, 6.0, 4.0),
            square("Tuva", 89.0, 50.0, 10.0, 4.0),
            square("Nowhere", 120.0, 60.0, 8.0, 6.0),
        ];
        MapSession::new(
            RegionRegistry::new(translations, content),
            features,
            SvgCanvas::new(ApproxTextMeasure),
            width,
            height,
        )
    }

    fn screen_centroid(s: &Session, id: &str) -> (f64, f64) {
        let c = s.viewport().shape(id).unwrap().centroid.unwrap();
        s.transform().apply(c)
    }

    fn annotation_text(s: &Session) -> Vec<&str> {
        s.canvas().layer_text(Layer::Annotation)
    }

    #[test]
    fn test_click_region_shows_title_and_items() {
        let mut s = session(1280.0, 800.0);
        let point = screen_centroid(&s, "Adygey");
        assert_eq!(s.click_at(point), Some("Adygey"));
        assert_eq!(annotation_text(&s), vec!["Адыгея", "Плов"]);
        assert!(s.render_svg().contains(r#"href="https://x/a""#));
        assert_eq!(s.annotation().unwrap().title, "Адыгея");
    }

    #[test]
    fn test_click_empty_on_desktop_clears() {
        let mut s = session(1280.0, 800.0);
        s.click_region("Adygey");
        assert_eq!(s.click_at((1.0, 1.0)), None);
        assert!(annotation_text(&s).is_empty());
        assert!(s.annotation().is_none());
    }

    #[test]
    fn test_click_empty_on_mobile_keeps_annotation() {
        let mut s = session(600.0, 900.0);
        assert!(s.click_region("Tuva"));
        assert!(!s.click_empty());
        assert_eq!(s.selected(), Some("Tuva"));
        assert_eq!(annotation_text(&s), vec!["Тыва", "Хан"]);
    }

    #[test]
    fn test_selecting_second_region_replaces_first() {
        let mut s = session(1280.0, 800.0);
        s.click_region("Adygey");
        s.click_region("Tuva");
        let text = annotation_text(&s);
        assert_eq!(text, vec!["Тыва", "Хан"]);
        assert!(!text.contains(&"Адыгея"));
        assert!(!text.contains(&"Плов"));
        let boxes = s
            .canvas()
            .primitives(Layer::Annotation)
            .iter()
            .filter(|p| matches!(p, Primitive::Shape(Shape::Rect { .. }, _)))
            .count();
        assert_eq!(boxes, 1);
    }

    #[test]
    fn test_untranslated_region_shows_placeholder() {
        let mut s = session(1280.0, 800.0);
        assert!(s.click_region("Nowhere"));
        assert_eq!(annotation_text(&s), vec!["Неизвестный регион", PLACEHOLDER_TEXT]);
    }

    #[test]
    fn test_unknown_shape_is_noop_and_clears() {
        let mut s = session(1280.0, 800.0);
        s.click_region("Adygey");
        assert!(!s.click_region("Atlantis"));
        assert!(s.annotation().is_none());
        assert!(annotation_text(&s).is_empty());
    }

    #[test]
    fn test_click_on_annotation_is_ignored() {
        let mut s = session(1280.0, 800.0);
        s.click_region("Tuva");
        let center = s.annotation().unwrap().rect().center();
        assert_eq!(s.click_at(center), Some("Tuva"));
    }

    #[test]
    fn test_annotation_within_map_surface() {
        for (w, h) in [(1280.0, 800.0), (700.0, 900.0), (360.0, 640.0)] {
            let mut s = session(w, h);
            for id in ["Adygey", "Tuva", "Nowhere"] {
                s.click_region(id);
                let rect = s.annotation().unwrap().rect();
                let area = s.viewport().area().bounds();
                assert!(area.contains_rect(&rect, 1e-6), "{} at {}x{}: {:?}", id, w, h, rect);
            }
        }
    }

    #[test]
    fn test_transform_change_clears_annotation() {
        let mut s = session(600.0, 900.0);
        s.click_region("Adygey");
        assert!(s.zoom_in());
        assert!(s.annotation().is_none());
        assert!(annotation_text(&s).is_empty());
        assert!(s.render_svg().contains("scale(1.5)"));

        s.click_region("Adygey");
        s.begin_pan((100.0, 100.0));
        assert!(s.update_pan((120.0, 90.0)));
        assert!(s.annotation().is_none());
        s.end_gesture();
        assert!(!s.is_gesturing());
    }

    #[test]
    fn test_desktop_zoom_is_disabled() {
        let mut s = session(1280.0, 800.0);
        s.click_region("Adygey");
        assert!(!s.zoom_in());
        assert!(!s.wheel_zoom((10.0, 10.0), -200.0));
        assert!(s.annotation().is_some());
        assert!(s.transform().is_identity());
    }

    #[test]
    fn test_click_after_zoom_hits_transformed_shape() {
        let mut s = session(600.0, 900.0);
        s.zoom_in();
        s.zoom_in();
        let point = screen_centroid(&s, "Tuva");
        assert_eq!(s.click_at(point), Some("Tuva"));
    }

    #[test]
    fn test_resize_to_desktop_resets_transform() {
        let mut s = session(600.0, 900.0);
        s.begin_pinch((100.0, 100.0), (200.0, 100.0));
        s.update_pinch((50.0, 100.0), (250.0, 100.0));
        assert!(!s.transform().is_identity());

        let outcome = s.resize(1280.0, 800.0);
        assert!(outcome.gestures_removed);
        assert_eq!(s.transform(), ViewportTransform::IDENTITY);
        assert_eq!(s.device_class(), DeviceClass::Desktop);
    }

    #[test]
    fn test_resize_reanchors_open_annotation() {
        let mut s = session(1280.0, 800.0);
        s.click_region("Tuva");
        let before = s.annotation().unwrap().rect();
        s.resize(1600.0, 1000.0);
        let after = s.annotation().unwrap().rect();
        assert_eq!(s.selected(), Some("Tuva"));
        assert!((before.x - after.x).abs() > 1.0 || (before.y - after.y).abs() > 1.0);
        assert_eq!(annotation_text(&s), vec!["Тыва", "Хан"]);
    }

    #[test]
    fn test_hover_highlight_desktop_only() {
        let mut s = session(1280.0, 800.0);
        let point = screen_centroid(&s, "Adygey");
        assert!(s.hover_at(point));
        assert_eq!(s.hovered(), Some("Adygey"));
        assert!(!s.hover_at(point));
        assert!(s.render_svg().contains(REGION_HOVER_FILL));
        assert!(s.pointer_leave());
        assert!(!s.render_svg().contains(REGION_HOVER_FILL));

        let mut m = session(600.0, 900.0);
        let point = screen_centroid(&m, "Adygey");
        assert!(!m.hover_at(point));
    }

    #[test]
    fn test_region_and_link_lookup() {
        let mut s = session(1280.0, 800.0);
        let point = screen_centroid(&s, "Tuva");
        assert_eq!(s.region_at(point), Some("Tuva"));
        assert_eq!(s.region_at((1.0, 1.0)), None);
        assert_eq!(s.link_at(point), None);

        s.click_region("Tuva");
        let layout = s.annotation().unwrap().clone();
        let item = &layout.text_runs()[1];
        assert_eq!(s.link_at((item.x, item.y - 2.0)).as_deref(), Some("https://x/b"));
    }

    #[test]
    fn test_flash_region() {
        let mut s = session(600.0, 900.0);
        s.flash_region("Tuva");
        assert!(s.render_svg().contains(REGION_HOVER_FILL));
        assert!(s.clear_flash());
        assert!(!s.clear_flash());
    }

    #[test]
    fn test_tap_flashes_only_the_tapped_region() {
        let mut s = session(600.0, 900.0);
        let point = screen_centroid(&s, "Tuva");
        assert_eq!(s.tap_at(point).as_deref(), Some("Tuva"));
        assert_eq!(s.selected(), Some("Tuva"));
        assert!(s.clear_flash());

        // Empty space on mobile keeps the selection but flashes nothing.
        assert_eq!(s.tap_at((1.0, 1.0)), None);
        assert_eq!(s.selected(), Some("Tuva"));
        assert!(!s.clear_flash());
    }

    #[test]
    fn test_tap_on_annotation_box_does_not_flash() {
        let mut s = session(600.0, 900.0);
        s.click_region("Tuva");
        let rect = s.annotation().unwrap().rect();
        let inside = (rect.x + 2.0, rect.y + 2.0);
        assert_eq!(s.tap_at(inside), None);
        assert_eq!(s.selected(), Some("Tuva"));
        assert!(!s.clear_flash());
    }

    #[test]
    fn test_tap_on_desktop_never_flashes() {
        let mut s = session(1280.0, 800.0);
        let point = screen_centroid(&s, "Adygey");
        assert_eq!(s.tap_at(point), None);
        assert_eq!(s.selected(), Some("Adygey"));
    }
}
