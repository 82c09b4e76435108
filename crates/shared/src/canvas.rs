use std::fmt::Write;

use crate::layout::Rect;
use crate::placement::{AnnotationLayout, Font, TextMeasure, TextRole, CORNER_RADIUS};
use crate::viewport::ViewportTransform;

pub const REGION_FILL: &str = "#e2e8f0";
pub const REGION_HOVER_FILL: &str = "#cbd5e1";
pub const REGION_STROKE: &str = "#ffffff";
pub const ANNOTATION_BORDER: &str = "#e2e8f0";
pub const TITLE_COLOR: &str = "#1a1a1a";
pub const LINK_COLOR: &str = "#2563eb";
pub const PLACEHOLDER_COLOR: &str = "#64748b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Region shapes, drawn in base projection space under the pan/zoom transform.
    Regions,
    /// The annotation, drawn in screen space.
    Annotation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Path {
        id: Option<String>,
        rings: Vec<Vec<(f64, f64)>>,
    },
    Rect {
        rect: Rect,
        radius: f64,
    },
    Polygon(Vec<(f64, f64)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    pub fill: String,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub opacity: f64,
    pub shadow: bool,
}

impl ShapeStyle {
    pub fn filled(fill: &str) -> Self {
        ShapeStyle {
            fill: fill.to_string(),
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
            shadow: false,
        }
    }

    pub fn with_stroke(mut self, stroke: &str, width: f64) -> Self {
        self.stroke = Some(stroke.to_string());
        self.stroke_width = width;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_shadow(mut self) -> Self {
        self.shadow = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn as_svg(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font: Font,
    pub anchor: TextAnchor,
    pub fill: String,
    pub underline: bool,
    /// Link target, opened in a new tab.
    pub href: Option<String>,
}

/// Imperative drawing interface used by the map session.
pub trait CanvasAdapter: TextMeasure {
    fn clear_layer(&mut self, layer: Layer);
    fn draw_shape(&mut self, layer: Layer, shape: Shape, style: ShapeStyle);
    fn draw_text(&mut self, layer: Layer, text: TextSpec);
    /// Surface size and the pan/zoom transform applied to [`Layer::Regions`].
    fn set_viewport(&mut self, width: f64, height: f64, transform: ViewportTransform);
}

/// Draw an annotation box, its pointer and text onto [`Layer::Annotation`].
pub fn draw_annotation<C: CanvasAdapter + ?Sized>(canvas: &mut C, layout: &AnnotationLayout) {
    canvas.draw_shape(
        Layer::Annotation,
        Shape::Rect {
            rect: layout.rect(),
            radius: CORNER_RADIUS,
        },
        ShapeStyle::filled("white")
            .with_stroke(ANNOTATION_BORDER, 1.0)
            .with_shadow(),
    );
    if let Some(pointer) = layout.pointer {
        canvas.draw_shape(
            Layer::Annotation,
            Shape::Polygon(pointer.to_vec()),
            ShapeStyle::filled("white").with_stroke(ANNOTATION_BORDER, 1.0),
        );
    }

    for run in layout.text_runs() {
        let (fill, underline) = match run.role {
            TextRole::Title => (TITLE_COLOR, false),
            TextRole::Item => (LINK_COLOR, true),
            TextRole::Placeholder => (PLACEHOLDER_COLOR, false),
        };
        canvas.draw_text(
            Layer::Annotation,
            TextSpec {
                text: run.text,
                x: run.x,
                y: run.y,
                font: run.font,
                anchor: TextAnchor::Middle,
                fill: fill.to_string(),
                underline,
                href: run.href,
            },
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Shape(Shape, ShapeStyle),
    Text(TextSpec),
}

/// Records primitives and renders them as an SVG string.
#[derive(Debug, Clone)]
pub struct SvgCanvas<M> {
    measure: M,
    width: f64,
    height: f64,
    transform: ViewportTransform,
    regions: Vec<Primitive>,
    annotation: Vec<Primitive>,
}

impl<M: TextMeasure> SvgCanvas<M> {
    pub fn new(measure: M) -> Self {
        SvgCanvas {
            measure,
            width: 0.0,
            height: 0.0,
            transform: ViewportTransform::IDENTITY,
            regions: Vec::new(),
            annotation: Vec::new(),
        }
    }

    pub fn primitives(&self, layer: Layer) -> &[Primitive] {
        match layer {
            Layer::Regions => &self.regions,
            Layer::Annotation => &self.annotation,
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut Vec<Primitive> {
        match layer {
            Layer::Regions => &mut self.regions,
            Layer::Annotation => &mut self.annotation,
        }
    }

    /// Concatenated text of a layer, in drawing order.
    pub fn layer_text(&self, layer: Layer) -> Vec<&str> {
        self.primitives(layer)
            .iter()
            .filter_map(|p| match p {
                Primitive::Text(t) => Some(t.text.as_str()),
                Primitive::Shape(..) => None,
            })
            .collect()
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = fmt_num(self.width),
            h = fmt_num(self.height),
        );
        svg.push_str(
            r##"<defs><filter id="drop-shadow" x="-20%" y="-20%" width="140%" height="140%"><feDropShadow dx="0" dy="4" stdDeviation="6" flood-color="#0f172a" flood-opacity="0.15"/></filter></defs>"##,
        );

        let _ = write!(
            svg,
            r#"<g class="regions" transform="{}">"#,
            self.transform.to_svg()
        );
        for primitive in &self.regions {
            write_primitive(&mut svg, primitive);
        }
        svg.push_str("</g>");

        svg.push_str(r#"<g class="annotation">"#);
        for primitive in &self.annotation {
            write_primitive(&mut svg, primitive);
        }
        svg.push_str("</g></svg>");
        svg
    }
}

impl<M: TextMeasure> TextMeasure for SvgCanvas<M> {
    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        self.measure.measure_text(text, font)
    }
}

impl<M: TextMeasure> CanvasAdapter for SvgCanvas<M> {
    fn clear_layer(&mut self, layer: Layer) {
        self.layer_mut(layer).clear();
    }

    fn draw_shape(&mut self, layer: Layer, shape: Shape, style: ShapeStyle) {
        self.layer_mut(layer).push(Primitive::Shape(shape, style));
    }

    fn draw_text(&mut self, layer: Layer, text: TextSpec) {
        self.layer_mut(layer).push(Primitive::Text(text));
    }

    fn set_viewport(&mut self, width: f64, height: f64, transform: ViewportTransform) {
        self.width = width;
        self.height = height;
        self.transform = transform;
    }
}

fn fmt_num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn path_data(rings: &[Vec<(f64, f64)>]) -> String {
    let mut d = String::new();
    for ring in rings {
        for (i, (x, y)) in ring.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{}{},{}", cmd, fmt_num(*x), fmt_num(*y));
        }
        if !ring.is_empty() {
            d.push('Z');
        }
    }
    d
}

fn style_attrs(style: &ShapeStyle) -> String {
    let mut attrs = format!(r#" fill="{}""#, escape_xml(&style.fill));
    if let Some(stroke) = &style.stroke {
        let _ = write!(
            attrs,
            r#" stroke="{}" stroke-width="{}""#,
            escape_xml(stroke),
            fmt_num(style.stroke_width)
        );
    }
    if style.opacity < 1.0 {
        let _ = write!(attrs, r#" opacity="{}""#, fmt_num(style.opacity));
    }
    if style.shadow {
        attrs.push_str(r#" filter="url(#drop-shadow)""#);
    }
    attrs
}

fn write_primitive(svg: &mut String, primitive: &Primitive) {
    match primitive {
        Primitive::Shape(Shape::Path { id, rings }, style) => {
            let data_id = id
                .as_deref()
                .map(|id| format!(r#" data-region="{}""#, escape_xml(id)))
                .unwrap_or_default();
            let _ = write!(
                svg,
                r#"<path class="region"{} d="{}" fill-rule="evenodd" vector-effect="non-scaling-stroke"{}/>"#,
                data_id,
                path_data(rings),
                style_attrs(style)
            );
        }
        Primitive::Shape(Shape::Rect { rect, radius }, style) => {
            let _ = write!(
                svg,
                r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}"{}/>"#,
                fmt_num(rect.x),
                fmt_num(rect.y),
                fmt_num(rect.width),
                fmt_num(rect.height),
                fmt_num(*radius),
                style_attrs(style)
            );
        }
        Primitive::Shape(Shape::Polygon(points), style) => {
            let points = points
                .iter()
                .map(|(x, y)| format!("{},{}", fmt_num(*x), fmt_num(*y)))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(svg, r#"<polygon points="{}"{}/>"#, points, style_attrs(style));
        }
        Primitive::Text(t) => {
            let mut attrs = format!(
                r#"x="{}" y="{}" text-anchor="{}" fill="{}" font-size="{}" font-weight="{}" font-family="{}""#,
                fmt_num(t.x),
                fmt_num(t.y),
                t.anchor.as_svg(),
                escape_xml(&t.fill),
                fmt_num(t.font.size),
                if t.font.bold { 700 } else { 400 },
                t.font.family(),
            );
            if t.font.italic {
                attrs.push_str(r#" font-style="italic""#);
            }
            if t.underline {
                attrs.push_str(r#" text-decoration="underline""#);
            }
            let text = format!("<text {}>{}</text>", attrs, escape_xml(&t.text));
            match &t.href {
                Some(href) => {
                    let _ = write!(
                        svg,
                        r#"<a class="annotation-link" href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                        escape_xml(href),
                        text
                    );
                }
                None => svg.push_str(&text),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DESKTOP;
    use crate::models::ContentItem;
    use crate::placement::{layout_annotation, ApproxTextMeasure};

    fn canvas() -> SvgCanvas<ApproxTextMeasure> {
        let mut c = SvgCanvas::new(ApproxTextMeasure);
        c.set_viewport(800.0, 600.0, ViewportTransform::IDENTITY);
        c
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape_xml("Салат «Лаззат»"), "Салат «Лаззат»");
    }

    #[test]
    fn test_fmt_num_trims() {
        assert_eq!(fmt_num(10.0), "10");
        assert_eq!(fmt_num(1.5), "1.5");
        assert_eq!(fmt_num(1.256), "1.26");
        assert_eq!(fmt_num(-0.001), "0");
    }

    #[test]
    fn test_svg_document_structure() {
        let mut c = canvas();
        c.draw_shape(
            Layer::Regions,
            Shape::Path {
                id: Some("Adygey".into()),
                rings: vec![vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]],
            },
            ShapeStyle::filled(REGION_FILL).with_stroke(REGION_STROKE, 0.5),
        );
        let svg = c.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 800 600""#));
        assert!(svg.contains(r#"data-region="Adygey""#));
        assert!(svg.contains(r#"d="M0,0L10,0L10,10Z""#));
        assert!(svg.contains(r#"transform="translate(0,0) scale(1)""#));
        assert!(svg.ends_with("</g></svg>"));
    }

    #[test]
    fn test_regions_layer_gets_transform() {
        let mut c = canvas();
        c.set_viewport(
            800.0,
            600.0,
            ViewportTransform {
                translate_x: 10.0,
                translate_y: 10.0,
                scale: 2.0,
            },
        );
        assert!(c.to_svg().contains(r#"transform="translate(10,10) scale(2)""#));
    }

    #[test]
    fn test_clear_layer_only_touches_that_layer() {
        let mut c = canvas();
        c.draw_shape(Layer::Regions, Shape::Polygon(vec![(0.0, 0.0)]), ShapeStyle::filled("red"));
        c.draw_shape(Layer::Annotation, Shape::Polygon(vec![(0.0, 0.0)]), ShapeStyle::filled("red"));
        c.clear_layer(Layer::Annotation);
        assert_eq!(c.primitives(Layer::Regions).len(), 1);
        assert!(c.primitives(Layer::Annotation).is_empty());
    }

    #[test]
    fn test_draw_annotation_renders_links() {
        let mut c = canvas();
        let items = vec![ContentItem::new("Плов & <рис>", "https://x/a?b=1&c=2")];
        let bbox = Rect::new(300.0, 300.0, 60.0, 40.0);
        let layout = layout_annotation(
            "Адыгея",
            &items,
            Some(bbox.center()),
            Some(bbox),
            &DESKTOP,
            1.0,
            &Rect::new(0.0, 0.0, 800.0, 600.0),
            &ApproxTextMeasure,
        )
        .unwrap();
        draw_annotation(&mut c, &layout);

        assert_eq!(c.layer_text(Layer::Annotation), vec!["Адыгея", "Плов & <рис>"]);
        let svg = c.to_svg();
        assert!(svg.contains(r#"href="https://x/a?b=1&amp;c=2" target="_blank" rel="noopener noreferrer""#));
        assert!(svg.contains("Плов &amp; &lt;рис&gt;"));
        assert!(svg.contains(r#"filter="url(#drop-shadow)""#));
        assert!(svg.contains("<polygon"));
    }
}
