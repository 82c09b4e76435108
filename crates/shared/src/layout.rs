/// Viewport widths at or below this are treated as mobile.
pub const MOBILE_BREAKPOINT: f64 = 768.0;
/// Viewport widths at or below this are treated as small mobile.
pub const SMALL_MOBILE_BREAKPOINT: f64 = 480.0;

const MIN_POPUP_SCALE: f64 = 0.8;
const MAX_POPUP_SCALE: f64 = 1.2;

/// Axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_corners(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_corners(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    pub fn contains_point(&self, (x, y): (f64, f64)) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect, eps: f64) -> bool {
        other.x >= self.x - eps
            && other.y >= self.y - eps
            && other.right() <= self.right() + eps
            && other.bottom() <= self.bottom() + eps
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Desktop,
    Mobile,
    SmallMobile,
}

impl DeviceClass {
    pub fn from_width(width: f64) -> Self {
        if width <= SMALL_MOBILE_BREAKPOINT {
            DeviceClass::SmallMobile
        } else if width <= MOBILE_BREAKPOINT {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    /// Pinch/pan gestures are only available on mobile-sized viewports.
    pub fn gestures_enabled(self) -> bool {
        !matches!(self, DeviceClass::Desktop)
    }

    pub fn profile(self) -> &'static DeviceProfile {
        match self {
            DeviceClass::Desktop => &DESKTOP,
            DeviceClass::Mobile => &MOBILE,
            DeviceClass::SmallMobile => &SMALL_MOBILE,
        }
    }
}

/// Typography and bounds for the map annotation, before popup scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupMetrics {
    pub title_font_size: f64,
    pub item_font_size: f64,
    pub placeholder_font_size: f64,
    pub padding: f64,
    pub min_width: f64,
    pub max_width: f64,
    pub base_height: f64,
    pub line_height: f64,
    pub item_spacing: f64,
    /// Title baseline offset from the box top.
    pub title_offset: f64,
    /// First item baseline offset from the box top.
    pub items_offset: f64,
    /// Distance between the region edge and the box.
    pub gap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    pub class: DeviceClass,
    pub horizontal_padding: f64,
    pub vertical_padding_ratio: f64,
    /// Map height as a fraction of the window height, then clamped.
    pub map_height_ratio: f64,
    pub map_height_range: Option<(f64, f64)>,
    /// Drawing-area size at which the popup is rendered at 1:1.
    pub reference_extent: f64,
    pub popup: PopupMetrics,
}

pub const DESKTOP: DeviceProfile = DeviceProfile {
    class: DeviceClass::Desktop,
    horizontal_padding: 80.0,
    vertical_padding_ratio: 0.15,
    map_height_ratio: 1.0,
    map_height_range: None,
    reference_extent: 640.0,
    popup: PopupMetrics {
        title_font_size: 22.0,
        item_font_size: 16.0,
        placeholder_font_size: 14.0,
        padding: 24.0,
        min_width: 280.0,
        max_width: 320.0,
        base_height: 80.0,
        line_height: 20.0,
        item_spacing: 8.0,
        title_offset: 35.0,
        items_offset: 65.0,
        gap: 15.0,
    },
};

pub const MOBILE: DeviceProfile = DeviceProfile {
    class: DeviceClass::Mobile,
    horizontal_padding: 40.0,
    vertical_padding_ratio: 0.08,
    map_height_ratio: 0.6,
    map_height_range: Some((400.0, 500.0)),
    reference_extent: 400.0,
    popup: PopupMetrics {
        title_font_size: 20.0,
        item_font_size: 15.0,
        placeholder_font_size: 13.0,
        padding: 20.0,
        min_width: 240.0,
        max_width: 300.0,
        base_height: 70.0,
        line_height: 18.0,
        item_spacing: 6.0,
        title_offset: 32.0,
        items_offset: 58.0,
        gap: 15.0,
    },
};

pub const SMALL_MOBILE: DeviceProfile = DeviceProfile {
    class: DeviceClass::SmallMobile,
    horizontal_padding: 20.0,
    vertical_padding_ratio: 0.05,
    map_height_ratio: 0.5,
    map_height_range: Some((350.0, 400.0)),
    reference_extent: 300.0,
    popup: PopupMetrics {
        title_font_size: 18.0,
        item_font_size: 14.0,
        placeholder_font_size: 12.0,
        padding: 16.0,
        min_width: 200.0,
        max_width: 250.0,
        base_height: 60.0,
        line_height: 16.0,
        item_spacing: 6.0,
        title_offset: 28.0,
        items_offset: 50.0,
        gap: 12.0,
    },
};

/// The on-screen map surface and the inset area the projection fits into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapArea {
    pub width: f64,
    pub height: f64,
    pub drawing: Rect,
}

impl MapArea {
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl DeviceProfile {
    pub fn for_width(width: f64) -> &'static DeviceProfile {
        DeviceClass::from_width(width).profile()
    }

    /// Map surface for a window of the given size.
    pub fn map_area(&self, window_width: f64, window_height: f64) -> MapArea {
        let width = window_width.max(0.0);
        let mut height = window_height.max(0.0) * self.map_height_ratio;
        if let Some((lo, hi)) = self.map_height_range {
            height = height.clamp(lo, hi);
        }
        let pad_x = self.horizontal_padding.min(width / 4.0);
        let pad_y = height * self.vertical_padding_ratio;
        MapArea {
            width,
            height,
            drawing: Rect::new(
                pad_x,
                pad_y,
                (width - 2.0 * pad_x).max(0.0),
                (height - 2.0 * pad_y).max(0.0),
            ),
        }
    }

    /// Popup size multiplier that follows the rendered map size.
    pub fn popup_scale(&self, drawing: &Rect) -> f64 {
        let extent = drawing.width.min(drawing.height);
        if extent <= 0.0 {
            return MIN_POPUP_SCALE;
        }
        (extent / self.reference_extent).clamp(MIN_POPUP_SCALE, MAX_POPUP_SCALE)
    }
}
