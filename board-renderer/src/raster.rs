//! CPU raster surface.

use board_core::{PathOwner, Point, StrokeStyle, Surface};
use image::{Rgba, RgbaImage};

/// Distance between disc stamps along a segment, in pixels.
const STAMP_SPACING: f32 = 0.5;

/// Smallest stamp reach, so a 1px line still covers at least one pixel
/// center wherever it lands.
const MIN_REACH: f32 = 0.75;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// An RGBA raster with separate pen positions for local and remote strokes.
///
/// Segments are stroked as they arrive, with round caps and joins, in the
/// stroke's opaque color. The background is transparent; use
/// [`export_png`](crate::export_png) to flatten it for saving.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
    local: Option<Point>,
    remote: Option<Point>,
}

impl RasterSurface {
    /// Create a blank, fully transparent surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
            local: None,
            remote: None,
        }
    }

    /// The visible content.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// RGBA value at `(x, y)`. Out-of-range coordinates read as transparent.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels
            .get_pixel_checked(x, y)
            .map_or(TRANSPARENT.0, |p| p.0)
    }

    /// Whether nothing has been drawn.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p[3] == 0)
    }

    /// Replace all content with `frame`, anchored at the top-left corner.
    ///
    /// The surface keeps its own size: a larger frame is cropped and a
    /// smaller one leaves the remainder transparent.
    pub(crate) fn replace_with(&mut self, frame: &RgbaImage) {
        if frame.dimensions() == self.pixels.dimensions() {
            self.pixels.clone_from(frame);
            return;
        }
        tracing::debug!(
            frame = ?frame.dimensions(),
            surface = ?self.pixels.dimensions(),
            "Snapshot size differs from surface, anchoring top-left"
        );
        self.fill(TRANSPARENT);
        image::imageops::replace(&mut self.pixels, frame, 0, 0);
    }

    fn fill(&mut self, color: Rgba<u8>) {
        for p in self.pixels.pixels_mut() {
            *p = color;
        }
    }

    fn pen(&mut self, owner: PathOwner) -> &mut Option<Point> {
        match owner {
            PathOwner::Local => &mut self.local,
            PathOwner::Remote => &mut self.remote,
        }
    }

    fn stroke_segment(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        let reach = (style.clamped_thickness() / 2.0).max(MIN_REACH);
        let color = Rgba(style.color.to_rgba());

        let (width, height) = self.pixels.dimensions();
        let Some((start, end)) = clip_segment(from, to, width, height, reach) else {
            return;
        };

        let length = (end.0 - start.0).hypot(end.1 - start.1);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = (length / f64::from(STAMP_SPACING)).ceil().max(1.0) as u32;

        for i in 0..=steps {
            let t = f64::from(i) / f64::from(steps);
            #[allow(clippy::cast_possible_truncation)]
            let center = Point::new(
                (start.0 + (end.0 - start.0) * t) as f32,
                (start.1 + (end.1 - start.1) * t) as f32,
            );
            self.stamp(center, reach, color);
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn stamp(&mut self, center: Point, reach: f32, color: Rgba<u8>) {
        let (width, height) = self.pixels.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        let max_x = width as f32 - 1.0;
        let max_y = height as f32 - 1.0;
        let x0 = (center.x - reach).floor().max(0.0);
        let y0 = (center.y - reach).floor().max(0.0);
        let x1 = (center.x + reach).ceil().min(max_x);
        let y1 = (center.y + reach).ceil().min(max_y);
        if x0 > x1 || y0 > y1 {
            return;
        }

        let reach_sq = reach * reach;
        for y in (y0 as u32)..=(y1 as u32) {
            for x in (x0 as u32)..=(x1 as u32) {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= reach_sq {
                    self.pixels.put_pixel(x, y, color);
                }
            }
        }
    }
}

/// Clip the segment `from`-`to` to a `width` x `height` surface grown by
/// `reach` on every side. Returns `None` when no stamp could touch a pixel.
///
/// Works in `f64` so that distant finite points cannot overflow, and bounds
/// the stamp count by the surface size rather than the segment length.
fn clip_segment(
    from: Point,
    to: Point,
    width: u32,
    height: u32,
    reach: f32,
) -> Option<((f64, f64), (f64, f64))> {
    let reach = f64::from(reach);
    let (x0, y0) = (f64::from(from.x), f64::from(from.y));
    let dx = f64::from(to.x) - x0;
    let dy = f64::from(to.y) - y0;
    let (min_x, max_x) = (-reach, f64::from(width) + reach);
    let (min_y, max_y) = (-reach, f64::from(height) + reach);

    let mut enter = 0.0_f64;
    let mut leave = 1.0_f64;
    for (p, q) in [
        (-dx, x0 - min_x),
        (dx, max_x - x0),
        (-dy, y0 - min_y),
        (dy, max_y - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            enter = enter.max(r);
        } else {
            leave = leave.min(r);
        }
        if enter > leave {
            return None;
        }
    }

    Some((
        (x0 + dx * enter, y0 + dy * enter),
        (x0 + dx * leave, y0 + dy * leave),
    ))
}

impl Surface for RasterSurface {
    fn begin_path(&mut self, owner: PathOwner, point: Point) {
        *self.pen(owner) = point.is_finite().then_some(point);
    }

    fn line_to(&mut self, owner: PathOwner, point: Point, style: &StrokeStyle) {
        if !point.is_finite() {
            return;
        }
        let Some(from) = *self.pen(owner) else {
            return;
        };
        self.stroke_segment(from, point, style);
        *self.pen(owner) = Some(point);
    }

    fn close_path(&mut self, owner: PathOwner) {
        *self.pen(owner) = None;
    }

    fn has_open_path(&self, owner: PathOwner) -> bool {
        match owner {
            PathOwner::Local => self.local.is_some(),
            PathOwner::Remote => self.remote.is_some(),
        }
    }

    fn clear(&mut self) {
        self.fill(TRANSPARENT);
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use board_core::Color;

    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];

    fn red(thickness: f32) -> StrokeStyle {
        StrokeStyle::new(Color::rgb(255, 0, 0), thickness)
    }

    #[test]
    fn test_new_surface_is_blank() {
        let surface = RasterSurface::new(10, 6);
        assert_eq!(surface.width(), 10);
        assert_eq!(surface.height(), 6);
        assert!(surface.is_blank());
        assert!(!surface.has_open_path(PathOwner::Local));
        assert!(!surface.has_open_path(PathOwner::Remote));
    }

    #[test]
    fn test_line_strokes_in_style_color() {
        let mut surface = RasterSurface::new(20, 20);
        surface.begin_path(PathOwner::Local, Point::new(2.0, 10.0));
        surface.line_to(PathOwner::Local, Point::new(18.0, 10.0), &red(4.0));

        assert_eq!(surface.pixel(10, 10), RED);
        assert_eq!(surface.pixel(10, 9), RED);
        assert_eq!(surface.pixel(10, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn test_thickness_controls_width() {
        let mut thin = RasterSurface::new(30, 30);
        thin.begin_path(PathOwner::Local, Point::new(2.0, 15.0));
        thin.line_to(PathOwner::Local, Point::new(28.0, 15.0), &red(1.0));

        let mut thick = RasterSurface::new(30, 30);
        thick.begin_path(PathOwner::Local, Point::new(2.0, 15.0));
        thick.line_to(PathOwner::Local, Point::new(28.0, 15.0), &red(10.0));

        let column = |s: &RasterSurface| (0..30).filter(|&y| s.pixel(15, y) == RED).count();
        assert!(column(&thin) >= 1);
        assert!(column(&thick) >= 9);
        assert!(column(&thick) > column(&thin));
    }

    #[test]
    fn test_line_without_open_path_draws_nothing() {
        let mut surface = RasterSurface::new(10, 10);
        surface.line_to(PathOwner::Remote, Point::new(5.0, 5.0), &red(4.0));
        assert!(surface.is_blank());
    }

    #[test]
    fn test_paths_are_independent() {
        let mut surface = RasterSurface::new(40, 40);
        surface.begin_path(PathOwner::Local, Point::new(5.0, 5.0));
        surface.line_to(PathOwner::Local, Point::new(10.0, 5.0), &red(2.0));

        // A remote stroke starts elsewhere mid-way through the local one.
        surface.begin_path(PathOwner::Remote, Point::new(30.0, 30.0));
        surface.line_to(PathOwner::Remote, Point::new(35.0, 30.0), &red(2.0));

        surface.line_to(PathOwner::Local, Point::new(15.0, 5.0), &red(2.0));

        assert_eq!(surface.pixel(12, 5), RED);
        // No segment bridges the two pens.
        assert_eq!(surface.pixel(20, 17), [0, 0, 0, 0]);
    }

    #[test]
    fn test_close_path_stops_drawing() {
        let mut surface = RasterSurface::new(10, 10);
        surface.begin_path(PathOwner::Local, Point::new(1.0, 1.0));
        surface.close_path(PathOwner::Local);
        assert!(!surface.has_open_path(PathOwner::Local));

        surface.line_to(PathOwner::Local, Point::new(8.0, 8.0), &red(2.0));
        assert!(surface.is_blank());
    }

    #[test]
    fn test_offscreen_points_are_clipped() {
        let mut surface = RasterSurface::new(10, 10);
        surface.begin_path(PathOwner::Local, Point::new(-50.0, 5.0));
        surface.line_to(PathOwner::Local, Point::new(500.0, 5.0), &red(2.0));
        assert_eq!(surface.pixel(0, 5), RED);
        assert_eq!(surface.pixel(9, 5), RED);
    }

    #[test]
    fn test_huge_coordinates_stroke_only_the_visible_part() {
        let mut surface = RasterSurface::new(48, 48);
        let started = Instant::now();
        surface.begin_path(PathOwner::Remote, Point::new(0.0, 24.0));
        surface.line_to(PathOwner::Remote, Point::new(3e38, 24.0), &red(5.0));
        surface.line_to(PathOwner::Remote, Point::new(-3e38, 24.0), &red(5.0));
        assert!(started.elapsed() < Duration::from_secs(2));

        assert_eq!(surface.pixel(0, 24), RED);
        assert_eq!(surface.pixel(47, 24), RED);
        assert_eq!(surface.pixel(24, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_segment_outside_surface_draws_nothing() {
        let mut surface = RasterSurface::new(48, 48);
        let started = Instant::now();
        surface.begin_path(PathOwner::Remote, Point::new(-3e38, -3e38));
        surface.line_to(PathOwner::Remote, Point::new(3e38, -3e38), &red(5.0));
        surface.line_to(PathOwner::Remote, Point::new(3e38, 3e38), &red(5.0));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(surface.is_blank());
    }

    #[test]
    fn test_clip_keeps_inside_segment_whole() {
        let clipped = clip_segment(Point::new(2.0, 3.0), Point::new(9.0, 7.0), 10, 10, 1.0);
        assert_eq!(clipped, Some(((2.0, 3.0), (9.0, 7.0))));
        assert_eq!(
            clip_segment(Point::new(-5.0, 20.0), Point::new(30.0, 20.0), 10, 10, 1.0),
            None
        );
    }

    #[test]
    fn test_non_finite_points_are_skipped() {
        let mut surface = RasterSurface::new(10, 10);
        surface.begin_path(PathOwner::Local, Point::new(f32::NAN, 1.0));
        assert!(!surface.has_open_path(PathOwner::Local));

        surface.begin_path(PathOwner::Local, Point::new(1.0, 1.0));
        surface.line_to(PathOwner::Local, Point::new(f32::INFINITY, 1.0), &red(2.0));
        assert!(surface.is_blank());
        assert!(surface.has_open_path(PathOwner::Local));
    }

    #[test]
    fn test_clear_keeps_open_paths() {
        let mut surface = RasterSurface::new(10, 10);
        surface.begin_path(PathOwner::Local, Point::new(1.0, 1.0));
        surface.line_to(PathOwner::Local, Point::new(8.0, 8.0), &red(2.0));
        surface.clear();

        assert!(surface.is_blank());
        assert!(surface.has_open_path(PathOwner::Local));
    }
}
