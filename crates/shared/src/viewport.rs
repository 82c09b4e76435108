use crate::geo::RegionFeature;
use crate::layout::{DeviceClass, DeviceProfile, MapArea, Rect};
use crate::projection::{fit_projection, project_features, ProjectedShape, Projection};

/// Allowed gesture scale range on mobile.
pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 3.0;
/// Multiplier applied by the zoom buttons.
pub const ZOOM_STEP: f64 = 1.5;
/// Exponential wheel sensitivity.
const WHEEL_SENSITIVITY: f64 = 0.002;

/// Screen transform layered on top of the base projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        ViewportTransform::IDENTITY
    }
}

impl ViewportTransform {
    pub const IDENTITY: ViewportTransform = ViewportTransform {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == ViewportTransform::IDENTITY
    }

    /// Base pixel → screen.
    pub fn apply(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (
            x * self.scale + self.translate_x,
            y * self.scale + self.translate_y,
        )
    }

    /// Screen → base pixel.
    pub fn invert(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (
            (x - self.translate_x) / self.scale,
            (y - self.translate_y) / self.scale,
        )
    }

    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        let (x, y) = self.apply((rect.x, rect.y));
        Rect::new(x, y, rect.width * self.scale, rect.height * self.scale)
    }

    /// Scale about a screen-space focus point, keeping that point fixed.
    pub fn zoom_at(&self, focus: (f64, f64), factor: f64) -> ViewportTransform {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let (cx, cy) = focus;
        let content_x = (cx - self.translate_x) / self.scale;
        let content_y = (cy - self.translate_y) / self.scale;
        ViewportTransform {
            translate_x: cx - content_x * new_scale,
            translate_y: cy - content_y * new_scale,
            scale: new_scale,
        }
    }

    pub fn pan_by(&self, dx: f64, dy: f64) -> ViewportTransform {
        ViewportTransform {
            translate_x: self.translate_x + dx,
            translate_y: self.translate_y + dy,
            scale: self.scale,
        }
    }

    /// SVG `transform` attribute value.
    pub fn to_svg(&self) -> String {
        format!(
            "translate({},{}) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

/// Convert a wheel delta to a zoom factor (scroll up zooms in).
pub fn wheel_zoom_factor(delta_y: f64) -> f64 {
    (-delta_y * WHEEL_SENSITIVITY).exp()
}

/// Euclidean distance between two screen points.
pub fn point_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// In-progress touch/drag gesture, anchored at its start transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Pan {
        start: (f64, f64),
        start_transform: ViewportTransform,
    },
    Pinch {
        start_distance: f64,
        midpoint: (f64, f64),
        start_transform: ViewportTransform,
    },
}

impl GestureState {
    pub fn pan(start: (f64, f64), start_transform: ViewportTransform) -> Self {
        GestureState::Pan {
            start,
            start_transform,
        }
    }

    pub fn pinch(p0: (f64, f64), p1: (f64, f64), start_transform: ViewportTransform) -> Self {
        GestureState::Pinch {
            start_distance: point_distance(p0, p1),
            midpoint: ((p0.0 + p1.0) / 2.0, (p0.1 + p1.1) / 2.0),
            start_transform,
        }
    }

    /// Transform for a single pointer now at `current`.
    pub fn pan_to(&self, current: (f64, f64)) -> Option<ViewportTransform> {
        match *self {
            GestureState::Pan {
                start,
                start_transform,
            } => Some(start_transform.pan_by(current.0 - start.0, current.1 - start.1)),
            GestureState::Pinch { .. } => None,
        }
    }

    /// Transform for two pointers now at `p0`/`p1`, zooming about the
    /// original midpoint.
    pub fn pinch_to(&self, p0: (f64, f64), p1: (f64, f64)) -> Option<ViewportTransform> {
        match *self {
            GestureState::Pinch {
                start_distance,
                midpoint,
                start_transform,
            } => {
                if start_distance < 1.0 {
                    return None;
                }
                let factor = point_distance(p0, p1) / start_distance;
                Some(start_transform.zoom_at(midpoint, factor))
            }
            GestureState::Pan { .. } => None,
        }
    }
}

/// What a resize changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeOutcome {
    pub class_changed: bool,
    pub gestures_installed: bool,
    pub gestures_removed: bool,
    pub transform_reset: bool,
}

/// Owns the viewport size, device profile, fitted projection, projected
/// shapes and the single active pan/zoom transform.
#[derive(Debug, Clone)]
pub struct ViewportController {
    window: (f64, f64),
    profile: &'static DeviceProfile,
    area: MapArea,
    projection: Projection,
    shapes: Vec<ProjectedShape>,
    transform: ViewportTransform,
    gestures_enabled: bool,
    gesture: Option<GestureState>,
}

impl ViewportController {
    pub fn new(features: &[RegionFeature], window_width: f64, window_height: f64) -> Self {
        let profile = DeviceProfile::for_width(window_width);
        let area = profile.map_area(window_width, window_height);
        let projection = fit_projection(features, &area.drawing);
        ViewportController {
            window: (window_width, window_height),
            profile,
            area,
            projection,
            shapes: project_features(&projection, features),
            transform: ViewportTransform::IDENTITY,
            gestures_enabled: profile.class.gestures_enabled(),
            gesture: None,
        }
    }

    /// Re-evaluate the size class, rerun the projector and redraw shapes.
    ///
    /// The transform is reset whenever gestures are active or the class
    /// changes, so a resize mid-gesture never pairs a stale transform with
    /// the new projection.
    pub fn resize(
        &mut self,
        features: &[RegionFeature],
        window_width: f64,
        window_height: f64,
    ) -> ResizeOutcome {
        let old_class = self.profile.class;
        let profile = DeviceProfile::for_width(window_width);
        let new_class = profile.class;

        self.window = (window_width, window_height);
        self.profile = profile;
        self.area = profile.map_area(window_width, window_height);
        self.projection = fit_projection(features, &self.area.drawing);
        self.shapes = project_features(&self.projection, features);

        let mut outcome = ResizeOutcome {
            class_changed: old_class != new_class,
            ..ResizeOutcome::default()
        };

        let enable = new_class.gestures_enabled();
        if enable && !self.gestures_enabled {
            outcome.gestures_installed = true;
        } else if !enable && self.gestures_enabled {
            outcome.gestures_removed = true;
        }
        self.gestures_enabled = enable;
        self.gesture = None;

        if !self.transform.is_identity() {
            self.transform = ViewportTransform::IDENTITY;
            outcome.transform_reset = true;
        }

        tracing::debug!(
            width = window_width,
            height = window_height,
            class = ?new_class,
            scale = self.projection.scale,
            "Viewport resized"
        );
        outcome
    }

    pub fn window_size(&self) -> (f64, f64) {
        self.window
    }

    pub fn device_class(&self) -> DeviceClass {
        self.profile.class
    }

    pub fn profile(&self) -> &'static DeviceProfile {
        self.profile
    }

    pub fn area(&self) -> &MapArea {
        &self.area
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn shapes(&self) -> &[ProjectedShape] {
        &self.shapes
    }

    pub fn shape(&self, geometry_id: &str) -> Option<&ProjectedShape> {
        self.shapes.iter().find(|s| s.geometry_id == geometry_id)
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn gestures_enabled(&self) -> bool {
        self.gestures_enabled
    }

    pub fn popup_scale(&self) -> f64 {
        self.profile.popup_scale(&self.area.drawing)
    }

    /// Replace the transform. Returns whether anything changed.
    pub fn apply_transform(&mut self, transform: ViewportTransform) -> bool {
        if !self.gestures_enabled || transform == self.transform {
            return false;
        }
        let scale = transform.scale.clamp(MIN_SCALE, MAX_SCALE);
        self.transform = ViewportTransform { scale, ..transform };
        true
    }

    /// Zoom about the map center by `factor` (zoom buttons).
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        let center = (self.area.width / 2.0, self.area.height / 2.0);
        self.zoom_at(center, factor)
    }

    pub fn zoom_at(&mut self, focus: (f64, f64), factor: f64) -> bool {
        let next = self.transform.zoom_at(focus, factor);
        self.apply_transform(next)
    }

    pub fn reset_transform(&mut self) -> bool {
        self.gesture = None;
        if self.transform.is_identity() {
            return false;
        }
        self.transform = ViewportTransform::IDENTITY;
        true
    }

    pub fn can_zoom_in(&self) -> bool {
        self.gestures_enabled && self.transform.scale < MAX_SCALE
    }

    pub fn can_zoom_out(&self) -> bool {
        self.gestures_enabled && self.transform.scale > MIN_SCALE
    }

    pub fn begin_pan(&mut self, start: (f64, f64)) {
        if self.gestures_enabled {
            self.gesture = Some(GestureState::pan(start, self.transform));
        }
    }

    pub fn begin_pinch(&mut self, p0: (f64, f64), p1: (f64, f64)) {
        if self.gestures_enabled {
            self.gesture = Some(GestureState::pinch(p0, p1, self.transform));
        }
    }

    pub fn gesture(&self) -> Option<GestureState> {
        self.gesture
    }

    pub fn update_pan(&mut self, current: (f64, f64)) -> bool {
        match self.gesture.and_then(|g| g.pan_to(current)) {
            Some(next) => self.apply_transform(next),
            None => false,
        }
    }

    pub fn update_pinch(&mut self, p0: (f64, f64), p1: (f64, f64)) -> bool {
        match self.gesture.and_then(|g| g.pinch_to(p0, p1)) {
            Some(next) => self.apply_transform(next),
            None => false,
        }
    }

    pub fn end_gesture(&mut self) {
        self.gesture = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{Coord, LineString, MultiPolygon, Polygon};

    fn features() -> Vec<RegionFeature> {
        let ring = LineString::new(vec![
            Coord { x: 30.0, y: 50.0 },
            Coord { x: 170.0, y: 50.0 },
            Coord { x: 170.0, y: 75.0 },
            Coord { x: 30.0, y: 75.0 },
            Coord { x: 30.0, y: 50.0 },
        ]);
        vec![RegionFeature::new(
            "Everything",
            MultiPolygon(vec![Polygon::new(ring, vec![])]),
        )]
    }

    #[test]
    fn test_transform_apply_invert_roundtrip() {
        let t = ViewportTransform {
            translate_x: 12.0,
            translate_y: -7.0,
            scale: 2.5,
        };
        let (x, y) = t.invert(t.apply((100.0, 40.0)));
        assert!((x - 100.0).abs() < 1e-9);
        assert!((y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_at_keeps_focus_fixed() {
        let t = ViewportTransform::IDENTITY.zoom_at((200.0, 100.0), 2.0);
        assert!((t.scale - 2.0).abs() < 1e-9);
        let (x, y) = t.apply((200.0, 100.0));
        assert!((x - 200.0).abs() < 1e-9);
        assert!((y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_at_clamps_scale() {
        let t = ViewportTransform::IDENTITY.zoom_at((0.0, 0.0), 100.0);
        assert!((t.scale - MAX_SCALE).abs() < 1e-9);
        let t = ViewportTransform::IDENTITY.zoom_at((0.0, 0.0), 0.01);
        assert!((t.scale - MIN_SCALE).abs() < 1e-9);
    }

    #[test]
    fn test_wheel_zoom_direction() {
        assert!(wheel_zoom_factor(-100.0) > 1.0);
        assert!(wheel_zoom_factor(100.0) < 1.0);
        assert!((wheel_zoom_factor(0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_apply_transform_rect() {
        let t = ViewportTransform {
            translate_x: 10.0,
            translate_y: 20.0,
            scale: 2.0,
        };
        let r = t.apply_rect(&Rect::new(5.0, 5.0, 10.0, 4.0));
        assert_eq!(r, Rect::new(20.0, 30.0, 20.0, 8.0));
        assert_eq!(t.to_svg(), "translate(10,20) scale(2)");
    }

    #[test]
    fn test_pinch_gesture_scales_about_midpoint() {
        let g = GestureState::pinch((100.0, 100.0), (200.0, 100.0), ViewportTransform::IDENTITY);
        let t = g.pinch_to((50.0, 100.0), (250.0, 100.0)).unwrap();
        assert!((t.scale - 2.0).abs() < 1e-9);
        let (mx, my) = t.apply((150.0, 100.0));
        assert!((mx - 150.0).abs() < 1e-9);
        assert!((my - 100.0).abs() < 1e-9);
        assert!(g.pan_to((0.0, 0.0)).is_none());
    }

    #[test]
    fn test_pinch_with_touching_fingers_is_ignored() {
        let g = GestureState::pinch((100.0, 100.0), (100.2, 100.0), ViewportTransform::IDENTITY);
        assert!(g.pinch_to((0.0, 0.0), (300.0, 0.0)).is_none());
    }

    #[test]
    fn test_pan_gesture_offsets_from_start() {
        let start = ViewportTransform {
            translate_x: 5.0,
            translate_y: 5.0,
            scale: 1.5,
        };
        let g = GestureState::pan((10.0, 10.0), start);
        let t = g.pan_to((30.0, 0.0)).unwrap();
        assert_eq!(
            t,
            ViewportTransform {
                translate_x: 25.0,
                translate_y: -5.0,
                scale: 1.5
            }
        );
    }

    #[test]
    fn test_desktop_ignores_gestures() {
        let mut vc = ViewportController::new(&features(), 1280.0, 800.0);
        assert_eq!(vc.device_class(), DeviceClass::Desktop);
        assert!(!vc.gestures_enabled());
        assert!(!vc.zoom_by(ZOOM_STEP));
        vc.begin_pan((0.0, 0.0));
        assert!(vc.gesture().is_none());
        assert!(vc.transform().is_identity());
        assert!(!vc.can_zoom_in());
    }

    #[test]
    fn test_mobile_zoom_buttons_respect_bounds() {
        let mut vc = ViewportController::new(&features(), 600.0, 900.0);
        assert!(vc.gestures_enabled());
        assert!(vc.zoom_by(ZOOM_STEP));
        assert!(vc.zoom_by(ZOOM_STEP));
        assert!(vc.zoom_by(ZOOM_STEP));
        assert!((vc.transform().scale - MAX_SCALE).abs() < 1e-9);
        assert!(!vc.can_zoom_in());
        assert!(!vc.zoom_by(ZOOM_STEP));
        assert!(vc.reset_transform());
        assert!(!vc.reset_transform());
        assert!(vc.can_zoom_out());
    }

    #[test]
    fn test_resize_from_mobile_to_desktop_resets_and_disables() {
        let f = features();
        let mut vc = ViewportController::new(&f, 600.0, 900.0);
        assert!(vc.apply_transform(ViewportTransform {
            translate_x: 10.0,
            translate_y: 10.0,
            scale: 2.0,
        }));

        let outcome = vc.resize(&f, 1280.0, 900.0);
        assert!(outcome.class_changed);
        assert!(outcome.gestures_removed);
        assert!(outcome.transform_reset);
        assert_eq!(vc.transform(), ViewportTransform::IDENTITY);
        assert!(!vc.gestures_enabled());
    }

    #[test]
    fn test_resize_from_desktop_to_mobile_installs_gestures() {
        let f = features();
        let mut vc = ViewportController::new(&f, 1280.0, 900.0);
        let outcome = vc.resize(&f, 700.0, 900.0);
        assert!(outcome.class_changed);
        assert!(outcome.gestures_installed);
        assert!(!outcome.transform_reset);
        assert!(vc.gestures_enabled());
    }

    #[test]
    fn test_resize_mid_gesture_discards_gesture() {
        let f = features();
        let mut vc = ViewportController::new(&f, 600.0, 900.0);
        vc.begin_pinch((100.0, 100.0), (200.0, 100.0));
        assert!(vc.update_pinch((50.0, 100.0), (250.0, 100.0)));
        vc.resize(&f, 620.0, 900.0);
        assert!(vc.gesture().is_none());
        assert!(vc.transform().is_identity());
        // A stale move event after the resize changes nothing.
        assert!(!vc.update_pinch((0.0, 100.0), (300.0, 100.0)));
    }

    #[test]
    fn test_resize_reprojects_shapes() {
        let f = features();
        let mut vc = ViewportController::new(&f, 1280.0, 900.0);
        let before = vc.shapes()[0].bbox.unwrap();
        vc.resize(&f, 1920.0, 1080.0);
        let after = vc.shapes()[0].bbox.unwrap();
        assert!(after.width > before.width);
        assert!(vc.area().drawing.contains_rect(&after, 1e-6));
    }
}
