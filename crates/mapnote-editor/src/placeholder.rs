//! Synthesized preview used when the map surface cannot be read.
//!
//! Flat background, border, a title, one line describing the annotation and
//! a small sketch of its geometry. Rendering has no external dependencies
//! and cannot fail.

use mapnote_core::{BoundingBox, Coordinate, MapAnnotation, PreviewImage, PreviewSource};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::glyphs::{for_each_cell, text_width, GLYPH_HEIGHT};

pub const PLACEHOLDER_TITLE: &str = "Map preview unavailable";

const BACKGROUND: [u8; 4] = [241, 245, 249, 255];

fn background_color() -> Color {
    Color::from_rgba8(BACKGROUND[0], BACKGROUND[1], BACKGROUND[2], BACKGROUND[3])
}

fn border_color() -> Color {
    Color::from_rgba8(148, 163, 184, 255)
}

fn text_color() -> Color {
    Color::from_rgba8(51, 65, 85, 255)
}

fn area_fill_color() -> Color {
    Color::from_rgba8(59, 130, 246, 64)
}

fn area_outline_color() -> Color {
    Color::from_rgba8(29, 78, 216, 255)
}

fn pin_color() -> Color {
    Color::from_rgba8(229, 57, 53, 255)
}

/// Renders the placeholder for `annotation` at the given size. Zero
/// dimensions are raised to one pixel.
pub fn render_placeholder(annotation: &MapAnnotation, width: u32, height: u32) -> PreviewImage {
    let width = width.max(1);
    let height = height.max(1);

    let Some(mut pixmap) = Pixmap::new(width, height) else {
        return flat_image(width, height);
    };
    pixmap.fill(background_color());

    draw_border(&mut pixmap);

    let margin = (height / 16).max(4) as f32;
    let mut cursor_y = margin * 1.5;
    cursor_y += draw_text_line(&mut pixmap, PLACEHOLDER_TITLE, cursor_y, 3) + margin;
    cursor_y += draw_text_line(&mut pixmap, &annotation.describe(), cursor_y, 2) + margin;

    let sketch = Rect::from_ltrb(
        margin * 2.0,
        cursor_y,
        width as f32 - margin * 2.0,
        height as f32 - margin * 1.5,
    );
    if let Some(sketch) = sketch {
        draw_sketch(&mut pixmap, annotation, sketch);
    }

    PreviewImage {
        width,
        height,
        rgba: pixmap.take(),
        source: PreviewSource::Placeholder,
    }
}

fn flat_image(width: u32, height: u32) -> PreviewImage {
    let rgba = BACKGROUND
        .iter()
        .copied()
        .cycle()
        .take(width as usize * height as usize * 4)
        .collect();
    PreviewImage {
        width,
        height,
        rgba,
        source: PreviewSource::Placeholder,
    }
}

fn draw_border(pixmap: &mut Pixmap) {
    let w = pixmap.width() as f32;
    let h = pixmap.height() as f32;
    let Some(rect) = Rect::from_ltrb(1.0, 1.0, w - 1.0, h - 1.0) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(border_color());
    let stroke = Stroke {
        width: 2.0,
        ..Default::default()
    };
    let path = PathBuilder::from_rect(rect);
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

/// Draws centered text, shrinking the scale (and then truncating) to fit.
/// Returns the height used.
fn draw_text_line(pixmap: &mut Pixmap, text: &str, top: f32, max_scale: u32) -> f32 {
    let available = pixmap.width().saturating_sub(16);
    let mut scale = max_scale;
    while scale > 1 && text_width(text, scale) > available {
        scale -= 1;
    }
    let mut line: String = text.to_string();
    while !line.is_empty() && text_width(&line, scale) > available {
        line.pop();
    }
    if line.is_empty() {
        return 0.0;
    }

    let left = (pixmap.width() - text_width(&line, scale)) as f32 / 2.0;
    let cell = scale as f32;
    let mut paint = Paint::default();
    paint.set_color(text_color());
    paint.anti_alias = false;

    let mut pb = PathBuilder::new();
    for_each_cell(&line, |x, y| {
        let (cx, cy) = (left + x as f32 * cell, top + y as f32 * cell);
        if let Some(r) = Rect::from_xywh(cx, cy, cell, cell) {
            pb.push_rect(r);
        }
    });
    if let Some(path) = pb.finish() {
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
    (GLYPH_HEIGHT * scale) as f32
}

/// Maps geographic coordinates into `frame`, preserving aspect ratio and
/// flipping latitude so north is up.
struct SketchTransform {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    bottom: f64,
}

impl SketchTransform {
    fn fit(bounds: &BoundingBox, frame: Rect) -> Self {
        let width = bounds.east - bounds.west;
        let height = bounds.north - bounds.south;
        let frame_w = frame.width() as f64;
        let frame_h = frame.height() as f64;

        let scale = if width <= 0.0 && height <= 0.0 {
            1.0
        } else {
            let zoom_x = if width > 0.0 { frame_w / width } else { f64::MAX };
            let zoom_y = if height > 0.0 { frame_h / height } else { f64::MAX };
            zoom_x.min(zoom_y)
        };

        // Center the content in the frame
        let content_w = width * scale;
        let content_h = height * scale;
        Self {
            scale,
            offset_x: frame.left() as f64 + (frame_w - content_w) / 2.0 - bounds.west * scale,
            offset_y: frame.top() as f64 + (frame_h - content_h) / 2.0,
            bottom: bounds.north,
        }
    }

    fn apply(&self, c: &Coordinate) -> (f32, f32) {
        let x = c.lng * self.scale + self.offset_x;
        let y = (self.bottom - c.lat) * self.scale + self.offset_y;
        (x as f32, y as f32)
    }
}

fn draw_sketch(pixmap: &mut Pixmap, annotation: &MapAnnotation, frame: Rect) {
    let mut bounds = annotation.area_geometry().map(|a| {
        a.polygons()
            .iter()
            .map(|p| p.bounding_box())
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_else(|| a.bounding_box())
    });
    if let Some(point) = annotation.point() {
        match bounds.as_mut() {
            Some(b) => b.extend(&point),
            None => bounds = BoundingBox::from_coordinates([&point]),
        }
    }
    let Some(bounds) = bounds else {
        return;
    };
    let transform = SketchTransform::fit(&bounds, frame);

    if let Some(area) = annotation.area_geometry() {
        let mut pb = PathBuilder::new();
        for polygon in area.polygons() {
            for ring in polygon.rings() {
                for (i, c) in ring.iter().enumerate() {
                    let (x, y) = transform.apply(c);
                    if i == 0 {
                        pb.move_to(x, y);
                    } else {
                        pb.line_to(x, y);
                    }
                }
                pb.close();
            }
        }
        if let Some(path) = pb.finish() {
            let mut paint = Paint::default();
            paint.set_color(area_fill_color());
            pixmap.fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), None);
            paint.set_color(area_outline_color());
            let stroke = Stroke {
                width: 2.0,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    if let Some(point) = annotation.point().filter(|_| annotation.pin_visible()) {
        let (x, y) = transform.apply(&point);
        if let Some(circle) = PathBuilder::from_circle(x, y, 6.0) {
            let mut paint = Paint::default();
            paint.set_color(pin_color());
            pixmap.fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }
}
