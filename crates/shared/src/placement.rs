use crate::layout::{DeviceProfile, Rect};
use crate::models::ContentItem;

/// Minimum distance between the annotation box and the viewport edge.
pub const VIEWPORT_MARGIN: f64 = 8.0;
/// The map annotation never lists more than this many items.
pub const MAX_VISIBLE_ITEMS: usize = 3;
/// Size of the pointer triangle.
pub const POINTER_SIZE: f64 = 8.0;
/// Corner radius of the annotation box.
pub const CORNER_RADIUS: f64 = 12.0;

pub const PLACEHOLDER_TEXT: &str = "Рецепты скоро появятся";

const ELLIPSIS: char = '…';

const FONT_FAMILY: &str = "system-ui, -apple-system, sans-serif";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
}

impl Font {
    pub fn regular(size: f64) -> Self {
        Font {
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(size: f64) -> Self {
        Font {
            bold: true,
            ..Font::regular(size)
        }
    }

    pub fn italic(size: f64) -> Self {
        Font {
            italic: true,
            ..Font::regular(size)
        }
    }

    pub fn family(&self) -> &'static str {
        FONT_FAMILY
    }

    /// CSS shorthand, e.g. `"700 22px system-ui, ..."`.
    pub fn css(&self) -> String {
        let style = if self.italic { "italic " } else { "" };
        let weight = if self.bold { 700 } else { 400 };
        format!("{}{} {}px {}", style, weight, self.size, FONT_FAMILY)
    }
}

/// Rendered text width in pixels.
pub trait TextMeasure {
    fn measure_text(&self, text: &str, font: &Font) -> f64;
}

/// Width estimate from an average glyph advance. Used in tests and wherever
/// no rendering context is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        let advance = if font.bold { 0.6 } else { 0.55 };
        text.chars().count() as f64 * font.size * advance
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        (**self).measure_text(text, font)
    }
}

/// Greedy word wrap.
///
/// A word is appended to the current line unless that would exceed
/// `max_width` and the line already has content; single words wider than
/// `max_width` stay on their own line.
pub fn wrap_text<M: TextMeasure + ?Sized>(
    text: &str,
    max_width: f64,
    font: &Font,
    measure: &M,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if measure.measure_text(&candidate, font) > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Cut `lines` down to `keep`, ending the last kept line with an ellipsis
/// that still fits `max_width` where possible.
fn truncate_lines<M: TextMeasure + ?Sized>(
    lines: &mut Vec<String>,
    keep: usize,
    max_width: f64,
    font: &Font,
    measure: &M,
) {
    if lines.len() <= keep {
        return;
    }
    lines.truncate(keep);
    let Some(last) = lines.last_mut() else { return };
    let mut text = last.clone();
    loop {
        let candidate = format!("{}{}", text, ELLIPSIS);
        let shorter = text.rsplit_once(' ').map(|(head, _)| head.to_string());
        match shorter {
            Some(head) if measure.measure_text(&candidate, font) > max_width => text = head,
            _ => {
                *last = candidate;
                return;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WrappedItem {
    pub lines: Vec<String>,
    pub url: String,
}

/// Computed annotation dimensions and typography, already scaled.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationSize {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub line_height: f64,
    pub item_spacing: f64,
    pub title_offset: f64,
    pub items_offset: f64,
    pub title_font: Font,
    pub item_font: Font,
    pub placeholder_font: Font,
    /// At most [`MAX_VISIBLE_ITEMS`] entries.
    pub items: Vec<WrappedItem>,
}

impl AnnotationSize {
    pub fn line_count(&self) -> usize {
        self.items.iter().map(|i| i.lines.len()).sum()
    }
}

pub fn size_annotation<M: TextMeasure + ?Sized>(
    title: &str,
    items: &[ContentItem],
    profile: &DeviceProfile,
    popup_scale: f64,
    viewport: &Rect,
    measure: &M,
) -> AnnotationSize {
    let m = &profile.popup;
    let s = popup_scale;

    let title_font = Font::bold(m.title_font_size * s);
    let item_font = Font::regular(m.item_font_size * s);
    let placeholder_font = Font::italic(m.placeholder_font_size * s);
    let padding = m.padding * s;
    let line_height = m.line_height * s;
    let item_spacing = m.item_spacing * s;

    // Narrow viewports cap the width so the box can still fit between margins.
    let available = (viewport.width - 2.0 * VIEWPORT_MARGIN).max(0.0);
    let max_width = (m.max_width * s).min(available);
    let min_width = (m.min_width * s).min(max_width);
    let title_width = measure.measure_text(title, &title_font);
    let width = (title_width + 2.0 * padding).min(max_width).max(min_width);

    let wrap_width = (width - 2.0 * padding).max(0.0);
    let mut items: Vec<WrappedItem> = items
        .iter()
        .take(MAX_VISIBLE_ITEMS)
        .map(|item| WrappedItem {
            lines: wrap_text(&item.title, wrap_width, &item_font, measure),
            url: item.url.clone(),
        })
        .collect();

    let base_height = m.base_height * s;
    if !items.is_empty() {
        // Every item keeps its first line; the rest share what the viewport leaves.
        let max_height = (viewport.height - 2.0 * VIEWPORT_MARGIN).max(0.0);
        let fixed = base_height + items.len() as f64 * item_spacing;
        let room = ((max_height - fixed) / line_height).floor();
        let max_lines = if room > 0.0 { room as usize } else { 0 };
        let mut spare = max_lines.saturating_sub(items.len());
        for item in &mut items {
            let extra = spare.min(item.lines.len().saturating_sub(1));
            spare -= extra;
            truncate_lines(&mut item.lines, 1 + extra, wrap_width, &item_font, measure);
        }
    }
    let height = if items.is_empty() {
        base_height
    } else {
        let lines: usize = items.iter().map(|i| i.lines.len()).sum();
        base_height + lines as f64 * line_height + items.len() as f64 * item_spacing
    };

    AnnotationSize {
        width,
        height,
        padding,
        line_height,
        item_spacing,
        title_offset: m.title_offset * s,
        items_offset: m.items_offset * s,
        title_font,
        item_font,
        placeholder_font,
        items,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementStrategy {
    Above,
    Below,
    Right,
    Left,
    Clamped,
}

/// Which edge of the box the pointer sits on, named by the way it points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDirection {
    Down,
    Up,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub rect: Rect,
    pub strategy: PlacementStrategy,
    pub pointer: Option<PointerDirection>,
}

/// Screen-space geometry of the selected region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationAnchor {
    pub centroid: (f64, f64),
    pub bbox: Rect,
}

/// Keep `[pos, pos + size]` inside `[lo, hi]`, favouring `lo` when it cannot fit.
fn clamp_span(pos: f64, size: f64, lo: f64, hi: f64) -> f64 {
    if size >= hi - lo {
        lo
    } else {
        pos.clamp(lo, hi - size)
    }
}

/// Position a box of `width` × `height` next to `anchor`, staying inside
/// `viewport` less [`VIEWPORT_MARGIN`].
///
/// Tries above, below, right, then left of the region's bounding box, and
/// falls back to clamping a box centered on the centroid.
pub fn place_annotation(
    anchor: &AnnotationAnchor,
    width: f64,
    height: f64,
    gap: f64,
    viewport: &Rect,
) -> Placement {
    let min_x = viewport.x + VIEWPORT_MARGIN;
    let max_x = viewport.right() - VIEWPORT_MARGIN;
    let min_y = viewport.y + VIEWPORT_MARGIN;
    let max_y = viewport.bottom() - VIEWPORT_MARGIN;
    let (cx, cy) = anchor.centroid;
    let bbox = &anchor.bbox;

    let fits_y = |y: f64| y >= min_y && y + height <= max_y;
    let fits_x = |x: f64| x >= min_x && x + width <= max_x;
    let centered_x = clamp_span(cx - width / 2.0, width, min_x, max_x);
    let centered_y = clamp_span(cy - height / 2.0, height, min_y, max_y);

    let above = bbox.y - gap - height;
    let below = bbox.bottom() + gap;
    let right = bbox.right() + gap;
    let left = bbox.x - gap - width;

    let (x, y, strategy) = if fits_y(above) {
        (centered_x, above, PlacementStrategy::Above)
    } else if fits_y(below) {
        (centered_x, below, PlacementStrategy::Below)
    } else if fits_x(right) {
        (right, centered_y, PlacementStrategy::Right)
    } else if fits_x(left) {
        (left, centered_y, PlacementStrategy::Left)
    } else {
        (centered_x, centered_y, PlacementStrategy::Clamped)
    };

    let rect = Rect::new(x, y, width, height);
    Placement {
        rect,
        strategy,
        pointer: pointer_direction(&rect, anchor.centroid),
    }
}

/// Pick the box edge facing the centroid. `None` when the box covers it.
pub fn pointer_direction(rect: &Rect, (cx, cy): (f64, f64)) -> Option<PointerDirection> {
    if rect.bottom() <= cy {
        Some(PointerDirection::Down)
    } else if rect.y >= cy {
        Some(PointerDirection::Up)
    } else if rect.right() <= cx {
        Some(PointerDirection::Right)
    } else if rect.x >= cx {
        Some(PointerDirection::Left)
    } else {
        None
    }
}

/// Triangle vertices for the pointer: two base points on the box edge, then the tip.
pub fn pointer_triangle(
    rect: &Rect,
    direction: PointerDirection,
    (cx, cy): (f64, f64),
    size: f64,
) -> [(f64, f64); 3] {
    let inset = CORNER_RADIUS.min(rect.width / 2.0).min(rect.height / 2.0) + size;
    let along_x = if rect.width > 2.0 * inset {
        cx.clamp(rect.x + inset, rect.right() - inset)
    } else {
        rect.center().0
    };
    let along_y = if rect.height > 2.0 * inset {
        cy.clamp(rect.y + inset, rect.bottom() - inset)
    } else {
        rect.center().1
    };
    match direction {
        PointerDirection::Down => {
            let y = rect.bottom();
            [(along_x - size, y), (along_x + size, y), (along_x, y + size)]
        }
        PointerDirection::Up => {
            let y = rect.y;
            [(along_x - size, y), (along_x + size, y), (along_x, y - size)]
        }
        PointerDirection::Right => {
            let x = rect.right();
            [(x, along_y - size), (x, along_y + size), (x + size, along_y)]
        }
        PointerDirection::Left => {
            let x = rect.x;
            [(x, along_y - size), (x, along_y + size), (x - size, along_y)]
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Title,
    Item,
    Placeholder,
}

/// A positioned line of annotation text, centered on `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font: Font,
    pub role: TextRole,
    pub href: Option<String>,
}

/// Fully resolved annotation: content, size and screen position.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationLayout {
    pub title: String,
    pub size: AnnotationSize,
    pub placement: Placement,
    pub pointer: Option<[(f64, f64); 3]>,
}

impl AnnotationLayout {
    pub fn rect(&self) -> Rect {
        self.placement.rect
    }

    /// Title, wrapped item lines and placeholder, in drawing order.
    pub fn text_runs(&self) -> Vec<TextRun> {
        let rect = self.placement.rect;
        let x = rect.center().0;
        let size = &self.size;
        let mut runs = vec![TextRun {
            text: self.title.clone(),
            x,
            y: rect.y + size.title_offset,
            font: size.title_font,
            role: TextRole::Title,
            href: None,
        }];

        if size.items.is_empty() {
            runs.push(TextRun {
                text: PLACEHOLDER_TEXT.to_string(),
                x,
                y: rect.y + size.items_offset,
                font: size.placeholder_font,
                role: TextRole::Placeholder,
                href: None,
            });
            return runs;
        }

        let mut y = rect.y + size.items_offset;
        for item in &size.items {
            for line in &item.lines {
                runs.push(TextRun {
                    text: line.clone(),
                    x,
                    y,
                    font: size.item_font,
                    role: TextRole::Item,
                    href: Some(item.url.clone()),
                });
                y += size.line_height;
            }
            y += size.item_spacing;
        }
        runs
    }

    /// Link under a screen point, for touch input where the browser's own
    /// link activation is suppressed.
    pub fn link_at(&self, (x, y): (f64, f64)) -> Option<String> {
        let rect = self.placement.rect;
        if x < rect.x + self.size.padding / 2.0 || x > rect.right() - self.size.padding / 2.0 {
            return None;
        }
        let line_height = self.size.line_height;
        self.text_runs()
            .into_iter()
            .filter(|run| run.role == TextRole::Item)
            .find(|run| y >= run.y - line_height * 0.8 && y <= run.y + line_height * 0.2)
            .and_then(|run| run.href)
    }
}

/// Size and place the annotation for a region.
///
/// Returns `None` when the region's screen geometry is unresolved.
#[allow(clippy::too_many_arguments)]
pub fn layout_annotation<M: TextMeasure + ?Sized>(
    title: &str,
    items: &[ContentItem],
    centroid: Option<(f64, f64)>,
    bbox: Option<Rect>,
    profile: &DeviceProfile,
    popup_scale: f64,
    viewport: &Rect,
    measure: &M,
) -> Option<AnnotationLayout> {
    let centroid = centroid.filter(|(x, y)| x.is_finite() && y.is_finite())?;
    let bbox = bbox?;
    let anchor = AnnotationAnchor { centroid, bbox };

    let size = size_annotation(title, items, profile, popup_scale, viewport, measure);
    let gap = profile.popup.gap * popup_scale;
    let placement = place_annotation(&anchor, size.width, size.height, gap, viewport);
    let pointer = placement
        .pointer
        .map(|dir| pointer_triangle(&placement.rect, dir, centroid, POINTER_SIZE * popup_scale));

    Some(AnnotationLayout {
        title: title.to_string(),
        size,
        placement,
        pointer,
    })
}
