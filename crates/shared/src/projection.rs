use crate::geo::RegionFeature;
use crate::layout::Rect;
use crate::viewport::ViewportTransform;

/// Longitude rotation applied before projecting (degrees).
pub const ROTATE_LAMBDA_DEG: f64 = -105.0;
/// Projection center in rotated (longitude, latitude) degrees.
pub const CENTER_DEG: (f64, f64) = (2.0, 56.0);
/// Standard parallels (degrees).
pub const PARALLELS_DEG: (f64, f64) = (50.0, 70.0);
/// Scale used for the measuring pass of the fit.
pub const REFERENCE_SCALE: f64 = 1000.0;
/// Fraction of the drawing area the dataset may occupy.
pub const MARGIN_FACTOR: f64 = 0.95;

const EPSILON: f64 = 1e-9;

/// Raw conic equal-area projection on a rotated globe.
///
/// Output is in unit-sphere coordinates with y pointing north.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlbersConic {
    delta_lambda: f64,
    n: f64,
    c: f64,
    r0: f64,
    cos_phi0: f64,
}

impl Default for AlbersConic {
    fn default() -> Self {
        AlbersConic::new(ROTATE_LAMBDA_DEG, PARALLELS_DEG)
    }
}

impl AlbersConic {
    pub fn new(rotate_lambda_deg: f64, parallels_deg: (f64, f64)) -> Self {
        let phi0 = parallels_deg.0.to_radians();
        let phi1 = parallels_deg.1.to_radians();
        let sy0 = phi0.sin();
        let n = (sy0 + phi1.sin()) / 2.0;
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        let r0 = if n.abs() < EPSILON { 0.0 } else { c.sqrt() / n };
        AlbersConic {
            delta_lambda: (rotate_lambda_deg % 360.0).to_radians(),
            n,
            c,
            r0,
            cos_phi0: phi0.cos(),
        }
    }

    /// Project already-rotated spherical coordinates (radians).
    pub fn raw(&self, lambda: f64, phi: f64) -> (f64, f64) {
        if self.n.abs() < EPSILON {
            // Degenerate parallels: cylindrical equal-area.
            return (lambda * self.cos_phi0, phi.sin() / self.cos_phi0);
        }
        let r = (self.c - 2.0 * self.n * phi.sin()).max(0.0).sqrt() / self.n;
        let theta = lambda * self.n;
        (r * theta.sin(), self.r0 - r * theta.cos())
    }

    /// Rotate then project a (longitude, latitude) pair in degrees.
    pub fn forward(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let lambda = wrap_longitude(lon_deg.to_radians() + self.delta_lambda);
        self.raw(lambda, lat_deg.to_radians())
    }
}

fn wrap_longitude(lambda: f64) -> f64 {
    use std::f64::consts::PI;
    if lambda > PI {
        lambda - 2.0 * PI
    } else if lambda < -PI {
        lambda + 2.0 * PI
    } else {
        lambda
    }
}

/// A conic projection with pixel scale and translate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    conic: AlbersConic,
    center_raw: (f64, f64),
    pub scale: f64,
    pub translate: (f64, f64),
}

impl Projection {
    pub fn new(scale: f64, translate: (f64, f64)) -> Self {
        let conic = AlbersConic::default();
        // The center is taken on the rotated globe, like the rotation itself.
        let center_raw = conic.raw(CENTER_DEG.0.to_radians(), CENTER_DEG.1.to_radians());
        Projection {
            conic,
            center_raw,
            scale,
            translate,
        }
    }

    /// Map (longitude, latitude) degrees to pixel coordinates (y down).
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = self.conic.forward(lon, lat);
        (
            self.translate.0 + self.scale * (x - self.center_raw.0),
            self.translate.1 - self.scale * (y - self.center_raw.1),
        )
    }
}

/// Pixel bounding box of every projected point.
pub fn projected_bounds(projection: &Projection, features: &[RegionFeature]) -> Option<Rect> {
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for coord in features
        .iter()
        .flat_map(|f| f.rings())
        .flat_map(|ring| ring.0.iter())
    {
        let (x, y) = projection.project(coord.x, coord.y);
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| Rect::from_corners(x0, y0, x1, y1))
}

/// Fit the projection so the whole dataset fills `drawing` (less the margin)
/// without distortion, centered on the dataset's own bounding box.
pub fn fit_projection(features: &[RegionFeature], drawing: &Rect) -> Projection {
    let mut projection = Projection::new(REFERENCE_SCALE, (0.0, 0.0));
    let Some(reference) = projected_bounds(&projection, features) else {
        projection.translate = drawing.center();
        return projection;
    };
    if reference.width <= EPSILON || reference.height <= EPSILON {
        projection.translate = drawing.center();
        return projection;
    }

    let fit = (drawing.width / reference.width).min(drawing.height / reference.height);
    projection.scale = MARGIN_FACTOR * fit * REFERENCE_SCALE;

    if let Some(actual) = projected_bounds(&projection, features) {
        let (bx, by) = actual.center();
        let (ax, ay) = drawing.center();
        projection.translate = (ax - bx, ay - by);
    }
    tracing::debug!(
        scale = projection.scale,
        tx = projection.translate.0,
        ty = projection.translate.1,
        "Fitted projection"
    );
    projection
}

/// A region projected into base pixel space (before pan/zoom).
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedShape {
    pub geometry_id: String,
    pub rings: Vec<Vec<(f64, f64)>>,
    pub centroid: Option<(f64, f64)>,
    pub bbox: Option<Rect>,
}

impl ProjectedShape {
    /// Even-odd containment test in base pixel space.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let Some(bbox) = self.bbox else {
            return false;
        };
        if x < bbox.x || x > bbox.right() || y < bbox.y || y > bbox.bottom() {
            return false;
        }
        let mut inside = false;
        for ring in &self.rings {
            if ring.len() < 3 {
                continue;
            }
            let mut j = ring.len() - 1;
            for i in 0..ring.len() {
                let (xi, yi) = ring[i];
                let (xj, yj) = ring[j];
                if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }
}

/// Signed area and centroid of a single ring.
fn ring_area_centroid(ring: &[(f64, f64)]) -> (f64, (f64, f64)) {
    let mut area2 = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..ring.len() {
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[(i + 1) % ring.len()];
        let cross = x0 * y1 - x1 * y0;
        area2 += cross;
        cx += (x0 + x1) * cross;
        cy += (y0 + y1) * cross;
    }
    if area2.abs() < EPSILON {
        return (0.0, (0.0, 0.0));
    }
    (area2 / 2.0, (cx / (3.0 * area2), cy / (3.0 * area2)))
}

pub fn project_feature(projection: &Projection, feature: &RegionFeature) -> ProjectedShape {
    let project_ring = |ring: &geo_types::LineString<f64>| -> Vec<(f64, f64)> {
        ring.0.iter().map(|c| projection.project(c.x, c.y)).collect()
    };

    let mut rings = Vec::new();
    let mut weight = 0.0;
    let mut wx = 0.0;
    let mut wy = 0.0;
    for polygon in &feature.polygons.0 {
        let exterior = project_ring(polygon.exterior());
        let (area, (cx, cy)) = ring_area_centroid(&exterior);
        weight += area.abs();
        wx += area.abs() * cx;
        wy += area.abs() * cy;
        rings.push(exterior);

        for hole in polygon.interiors() {
            let hole = project_ring(hole);
            let (area, (cx, cy)) = ring_area_centroid(&hole);
            weight -= area.abs();
            wx -= area.abs() * cx;
            wy -= area.abs() * cy;
            rings.push(hole);
        }
    }

    let bbox = rings
        .iter()
        .flatten()
        .fold(None::<(f64, f64, f64, f64)>, |acc, &(x, y)| {
            Some(match acc {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            })
        })
        .map(|(x0, y0, x1, y1)| Rect::from_corners(x0, y0, x1, y1));

    let centroid = if weight.abs() > EPSILON {
        Some((wx / weight, wy / weight))
    } else {
        bbox.map(|b| b.center())
    };

    ProjectedShape {
        geometry_id: feature.geometry_id.clone(),
        rings,
        centroid,
        bbox,
    }
}

pub fn project_features(projection: &Projection, features: &[RegionFeature]) -> Vec<ProjectedShape> {
    features
        .iter()
        .map(|f| project_feature(projection, f))
        .collect()
}

/// Find the topmost shape under a screen-space point.
pub fn hit_test<'a>(
    shapes: &'a [ProjectedShape],
    point: (f64, f64),
    transform: &ViewportTransform,
) -> Option<&'a ProjectedShape> {
    let (x, y) = transform.invert(point);
    shapes.iter().rev().find(|s| s.contains(x, y))
}
