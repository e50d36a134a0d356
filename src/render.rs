//! Presentation of extracted signals as PNG plots.
//!
//! Trajectories are drawn with equal units on both axes inside bounds fixed
//! for the whole clip. Time series span the selected times horizontally and
//! the value range vertically. NaN samples break the line. A title, axis
//! labels and tick values are drawn around the plot unless the font size is 0.

use crate::{
    config::RenderConfig,
    pipeline::Analysis,
    signal::{AxisBounds, Selection, Signal},
    time_range::TimeRange,
    utils::{
        nan_min_max, padded_span,
        safe_cast::{f64_to_f32_clamp, f64_to_i32_saturating, f64_to_usize_floor},
    },
    Error, Result,
};
use ab_glyph::{FontRef, PxScale};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut, text_size};
use log::info;
use std::path::{Path, PathBuf};

const FONT_DATA: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const GRID_COLOR: Rgb<u8> = Rgb([220, 220, 220]);
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const TICK_COLOR: Rgb<u8> = Rgb([80, 80, 80]);

/// Pixels between the plot frame and the text next to it
const TEXT_GAP: f64 = 6.0;

const TIME_AXIS_LABEL: &str = "time (s)";
const TRAJECTORY_X_LABEL: &str = "x";
const TRAJECTORY_Y_LABEL: &str = "-y";

/// Sink turning signals into something that can be shown or saved
pub trait Presenter {
    type Output;

    /// Render a 2D path within fixed bounds
    ///
    /// # Errors
    ///
    /// Returns an error if the presenter cannot produce its output
    fn render_trajectory(&mut self, points: &[(f64, f64)], bounds: Option<AxisBounds>) -> Result<Self::Output>;

    /// Render values against time, `label` naming the value axis
    ///
    /// # Errors
    ///
    /// Returns an error if the presenter cannot produce its output
    fn render_time_series(&mut self, label: &str, times: &[f64], values: &[f64]) -> Result<Self::Output>;
}

/// Dispatch a signal to the matching presenter operation
///
/// # Errors
///
/// Propagates the presenter's error
pub fn present<P: Presenter>(presenter: &mut P, signal: &Signal) -> Result<P::Output> {
    match signal {
        Signal::Trajectory(t) => presenter.render_trajectory(&t.points, t.bounds),
        Signal::TimeSeries(s) => presenter.render_time_series(s.kind.axis_label(), &s.times, &s.values),
    }
}

/// Maps data coordinates onto a pixel rectangle
#[derive(Debug, Clone, Copy)]
struct Viewport {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    /// Fill the whole plot area
    fn stretched((x_min, x_max): (f64, f64), (y_min, y_max): (f64, f64), area: PlotArea) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            left: area.left,
            top: area.top,
            width: area.width,
            height: area.height,
        }
    }

    /// Largest centred rectangle with one data unit equal on both axes
    fn equal_aspect((x_min, x_max): (f64, f64), (y_min, y_max): (f64, f64), area: PlotArea) -> Self {
        let scale = (area.width / (x_max - x_min)).min(area.height / (y_max - y_min));
        let width = (x_max - x_min) * scale;
        let height = (y_max - y_min) * scale;
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            left: area.left + (area.width - width) / 2.0,
            top: area.top + (area.height - height) / 2.0,
            width,
            height,
        }
    }

    fn to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        let px = self.left + (x - self.x_min) / (self.x_max - self.x_min) * self.width;
        let py = self.top + (self.y_max - y) / (self.y_max - self.y_min) * self.height;
        (
            f64_to_f32_clamp(px, self.left as f32, (self.left + self.width) as f32),
            f64_to_f32_clamp(py, self.top as f32, (self.top + self.height) as f32),
        )
    }

    fn corners(&self) -> [(f32, f32); 4] {
        let (l, t) = (self.left as f32, self.top as f32);
        let (r, b) = ((self.left + self.width) as f32, (self.top + self.height) as f32);
        [(l, t), (r, t), (r, b), (l, b)]
    }
}

/// Space kept free on each side of the canvas
#[derive(Debug, Clone, Copy)]
struct Insets {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

/// Canvas region inside the margins
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl PlotArea {
    fn new(canvas_width: u32, canvas_height: u32, margin: u32) -> Self {
        let margin = f64::from(margin);
        Self::inset(
            canvas_width,
            canvas_height,
            Insets {
                left: margin,
                top: margin,
                right: margin,
                bottom: margin,
            },
        )
    }

    fn inset(canvas_width: u32, canvas_height: u32, insets: Insets) -> Self {
        Self {
            left: insets.left,
            top: insets.top,
            width: (f64::from(canvas_width) - insets.left - insets.right).max(1.0),
            height: (f64::from(canvas_height) - insets.top - insets.bottom).max(1.0),
        }
    }
}

/// Font and pixel size for plot text
struct Typeface {
    font: FontRef<'static>,
    scale: PxScale,
}

impl Typeface {
    /// `None` when text is disabled
    fn load(size: f32) -> Result<Option<Self>> {
        if size <= 0.0 {
            return Ok(None);
        }
        let font = FontRef::try_from_slice(FONT_DATA)
            .map_err(|e| Error::Render(format!("Failed to load plot font: {e}")))?;
        Ok(Some(Self {
            font,
            scale: PxScale::from(size),
        }))
    }

    fn measure(&self, text: &str) -> (f64, f64) {
        let (width, height) = text_size(self.scale, &self.font, text);
        (f64::from(width), f64::from(height))
    }

    fn line_height(&self) -> f64 {
        f64::from(self.scale.y) * 1.25
    }

    fn draw(&self, image: &mut RgbImage, text: &str, (x, y): (f64, f64), color: Rgb<u8>) {
        draw_text_mut(
            image,
            color,
            f64_to_i32_saturating(x),
            f64_to_i32_saturating(y),
            self.scale,
            &self.font,
            text,
        );
    }

    fn draw_centered(&self, image: &mut RgbImage, text: &str, (center_x, y): (f64, f64), color: Rgb<u8>) {
        let (width, _) = self.measure(text);
        self.draw(image, text, (center_x - width / 2.0, y), color);
    }
}

/// Evenly spaced ticks over a span, both ends included
fn ticks((lo, hi): (f64, f64), divisions: u32) -> Vec<(f64, String)> {
    let steps = divisions.max(1);
    (0..=steps)
        .map(|i| {
            let value = lo + (hi - lo) * f64::from(i) / f64::from(steps);
            (value, format_tick(value, hi - lo))
        })
        .collect()
}

/// Fixed-point tick text with about three significant digits of the span
fn format_tick(value: f64, span: f64) -> String {
    let decimals = if span.is_finite() && span > 0.0 {
        f64_to_usize_floor((2.0 - span.log10().floor()).clamp(0.0, 4.0)).unwrap_or(2)
    } else {
        2
    };
    let text = format!("{value:.decimals$}");
    match text.strip_prefix('-') {
        Some(magnitude) if magnitude.chars().all(|c| c == '0' || c == '.') => magnitude.to_string(),
        _ => text,
    }
}

/// Text drawn around a plot
struct Annotations<'a> {
    title: Option<&'a str>,
    x_label: &'a str,
    y_label: &'a str,
    x_ticks: Vec<(f64, String)>,
    y_ticks: Vec<(f64, String)>,
}

impl Annotations<'_> {
    /// Plot area leaving room for the title, labels and ticks
    fn plot_area(&self, typeface: &Typeface, width: u32, height: u32, margin: u32) -> PlotArea {
        let margin = f64::from(margin);
        let line = typeface.line_height();
        let widest = |ticks: &[(f64, String)]| {
            ticks
                .iter()
                .map(|(_, text)| typeface.measure(text).0)
                .fold(0.0, f64::max)
        };
        let header_lines = if self.title.is_some() { 2.0 } else { 1.0 };

        PlotArea::inset(
            width,
            height,
            Insets {
                left: margin + widest(&self.y_ticks) + TEXT_GAP,
                top: margin + line * header_lines,
                right: margin + widest(&self.x_ticks) / 2.0,
                bottom: margin + 2.0 * line + TEXT_GAP,
            },
        )
    }

    fn draw(&self, image: &mut RgbImage, typeface: &Typeface, view: &Viewport, margin: u32) {
        let line = typeface.line_height();
        let bottom = view.top + view.height;

        if let Some(title) = self.title {
            let center = f64::from(image.width()) / 2.0;
            typeface.draw_centered(image, title, (center, f64::from(margin)), TEXT_COLOR);
        }
        typeface.draw(image, self.y_label, (view.left, view.top - line), TEXT_COLOR);

        for (value, text) in &self.y_ticks {
            let (width, height) = typeface.measure(text);
            let (_, y) = view.to_pixel(view.x_min, *value);
            let position = (view.left - TEXT_GAP - width, f64::from(y) - height / 2.0);
            typeface.draw(image, text, position, TICK_COLOR);
        }
        for (value, text) in &self.x_ticks {
            let (x, _) = view.to_pixel(*value, view.y_min);
            typeface.draw_centered(image, text, (f64::from(x), bottom + TEXT_GAP / 2.0), TICK_COLOR);
        }

        let center = view.left + view.width / 2.0;
        typeface.draw_centered(image, self.x_label, (center, bottom + TEXT_GAP + line), TEXT_COLOR);
    }
}

/// Draws plots into RGB images
#[derive(Debug, Clone, Default)]
pub struct PlotRenderer {
    style: RenderConfig,
    title: Option<String>,
}

impl PlotRenderer {
    #[must_use]
    pub fn new(style: RenderConfig) -> Self {
        Self { style, title: None }
    }

    /// Title drawn above every following plot
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.set_title(title);
        self
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    fn annotations<'a>(
        &'a self,
        (x_label, x_span): (&'a str, (f64, f64)),
        (y_label, y_span): (&'a str, (f64, f64)),
    ) -> Annotations<'a> {
        Annotations {
            title: self.title.as_deref(),
            x_label,
            y_label,
            x_ticks: ticks(x_span, self.style.grid_divisions),
            y_ticks: ticks(y_span, self.style.grid_divisions),
        }
    }

    fn layout(&self, typeface: Option<&Typeface>, annotations: &Annotations<'_>, width: u32, height: u32) -> PlotArea {
        match typeface {
            Some(typeface) => annotations.plot_area(typeface, width, height, self.style.margin),
            None => PlotArea::new(width, height, self.style.margin),
        }
    }

    fn line_color(&self) -> Rgb<u8> {
        Rgb(self.style.line_color)
    }

    fn draw_grid(&self, image: &mut RgbImage, view: &Viewport) {
        let divisions = self.style.grid_divisions;
        for i in 1..divisions {
            let fraction = f64::from(i) / f64::from(divisions);
            let x = (view.left + view.width * fraction) as f32;
            let y = (view.top + view.height * fraction) as f32;
            let [top_left, _, bottom_right, _] = view.corners();
            draw_line_segment_mut(image, (x, top_left.1), (x, bottom_right.1), GRID_COLOR);
            draw_line_segment_mut(image, (top_left.0, y), (bottom_right.0, y), GRID_COLOR);
        }
    }

    fn draw_frame(image: &mut RgbImage, view: &Viewport) {
        let corners = view.corners();
        for (i, &start) in corners.iter().enumerate() {
            draw_line_segment_mut(image, start, corners[(i + 1) % corners.len()], FRAME_COLOR);
        }
    }

    /// Polyline through consecutive defined points
    fn draw_path(&self, image: &mut RgbImage, view: &Viewport, points: impl Iterator<Item = (f64, f64)>) {
        let color = self.line_color();
        let mut previous: Option<(f32, f32)> = None;
        for (x, y) in points {
            if x.is_nan() || y.is_nan() {
                previous = None;
                continue;
            }
            let pixel = view.to_pixel(x, y);
            if let Some(start) = previous {
                draw_line_segment_mut(image, start, pixel, color);
            }
            previous = Some(pixel);
        }
    }
}

impl Presenter for PlotRenderer {
    type Output = RgbImage;

    fn render_trajectory(&mut self, points: &[(f64, f64)], bounds: Option<AxisBounds>) -> Result<RgbImage> {
        let size = self.style.trajectory_size;
        let mut image = RgbImage::from_pixel(size, size, BACKGROUND);

        let (x_span, y_span) = bounds.map_or(((0.0, 1.0), (0.0, 1.0)), |b| {
            (padded_span(b.x_min, b.x_max), padded_span(b.y_min, b.y_max))
        });
        let annotations = self.annotations((TRAJECTORY_X_LABEL, x_span), (TRAJECTORY_Y_LABEL, y_span));
        let typeface = Typeface::load(self.style.font_size)?;
        let area = self.layout(typeface.as_ref(), &annotations, size, size);
        let view = Viewport::equal_aspect(x_span, y_span, area);

        self.draw_grid(&mut image, &view);
        self.draw_path(&mut image, &view, points.iter().copied());
        Self::draw_frame(&mut image, &view);
        if let Some(typeface) = &typeface {
            annotations.draw(&mut image, typeface, &view, self.style.margin);
        }

        Ok(image)
    }

    fn render_time_series(&mut self, label: &str, times: &[f64], values: &[f64]) -> Result<RgbImage> {
        let (width, height) = (self.style.series_width, self.style.series_height);
        let mut image = RgbImage::from_pixel(width, height, BACKGROUND);

        let t_span = nan_min_max(times.iter().copied()).map_or((0.0, 1.0), |(lo, hi)| padded_span(lo, hi));
        let v_span = nan_min_max(values.iter().copied()).map_or((0.0, 1.0), |(lo, hi)| padded_span(lo, hi));
        let annotations = self.annotations((TIME_AXIS_LABEL, t_span), (label, v_span));
        let typeface = Typeface::load(self.style.font_size)?;
        let area = self.layout(typeface.as_ref(), &annotations, width, height);
        let view = Viewport::stretched(t_span, v_span, area);

        self.draw_grid(&mut image, &view);
        self.draw_path(&mut image, &view, times.iter().copied().zip(values.iter().copied()));
        Self::draw_frame(&mut image, &view);
        if let Some(typeface) = &typeface {
            annotations.draw(&mut image, typeface, &view, self.style.margin);
        }

        Ok(image)
    }
}

/// Render an analysis with its caption as the plot title
///
/// # Errors
///
/// Returns an error if the plot text cannot be drawn
pub fn render_analysis(renderer: &mut PlotRenderer, analysis: &Analysis) -> Result<RgbImage> {
    renderer.set_title(caption(analysis));
    present(renderer, &analysis.signal)
}

/// Plot title in the form `Distance (sync_1, 1m25s-1m35s, keypoint4-20)`
#[must_use]
pub fn caption(analysis: &Analysis) -> String {
    let method = analysis.selection.method().name();
    let mut title = method[..1].to_uppercase() + &method[1..];
    title.push_str(&format!(
        " ({}, {}, keypoint{})",
        analysis.clip.clip_id,
        analysis.range,
        keypoint_ids(&analysis.selection)
    ));
    title
}

fn keypoint_ids(selection: &Selection) -> String {
    selection
        .keypoints()
        .iter()
        .map(|k| k.index().to_string())
        .collect::<Vec<_>>()
        .join("-")
}

/// `<output_dir>/<method>/<clip>_<start>-<end>_keypoint<ids>.png`
#[must_use]
pub fn output_path(output_dir: &Path, clip_id: &str, range: &TimeRange, selection: &Selection) -> PathBuf {
    output_dir
        .join(selection.method().name())
        .join(format!("{clip_id}_{range}_keypoint{}.png", keypoint_ids(selection)))
}

/// Write an image as PNG, creating parent directories
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the image cannot be written
pub fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image.save_with_format(path, ImageFormat::Png)?;
    info!("Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoints::KeypointId;

    fn count_color(image: &RgbImage, color: Rgb<u8>) -> usize {
        image.pixels().filter(|&&p| p == color).count()
    }

    fn small_style() -> RenderConfig {
        RenderConfig {
            trajectory_size: 100,
            series_width: 150,
            series_height: 60,
            margin: 10,
            font_size: 0.0,
            ..RenderConfig::default()
        }
    }

    fn labelled_style() -> RenderConfig {
        RenderConfig {
            series_width: 320,
            series_height: 180,
            margin: 8,
            font_size: 14.0,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_trajectory_canvas_and_line() {
        let mut renderer = PlotRenderer::new(small_style());
        let bounds = AxisBounds {
            x_min: 0.0,
            x_max: 2.0,
            y_min: -1.0,
            y_max: 0.0,
        };
        let image = renderer
            .render_trajectory(&[(0.0, 0.0), (2.0, -1.0)], Some(bounds))
            .unwrap();

        assert_eq!(image.dimensions(), (100, 100));
        assert!(count_color(&image, renderer.line_color()) > 0);
    }

    #[test]
    fn test_equal_aspect_viewport() {
        let area = PlotArea::new(100, 100, 10);
        let view = Viewport::equal_aspect((0.0, 2.0), (0.0, 1.0), area);

        assert!((view.width - 80.0).abs() < 1e-9);
        assert!((view.height - 40.0).abs() < 1e-9);
        assert!((view.top - 30.0).abs() < 1e-9);
        // One data unit spans the same number of pixels on both axes
        assert!((view.width / 2.0 - view.height / 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_nan_series_draws_no_line() {
        let mut renderer = PlotRenderer::new(small_style());
        let image = renderer
            .render_time_series("angle", &[0.0, 0.1, 0.2], &[f64::NAN; 3])
            .unwrap();

        assert_eq!(image.dimensions(), (150, 60));
        assert_eq!(count_color(&image, renderer.line_color()), 0);
    }

    #[test]
    fn test_empty_signal_renders_blank_plot() {
        let mut renderer = PlotRenderer::new(small_style());
        let image = renderer.render_trajectory(&[], None).unwrap();
        assert_eq!(count_color(&image, renderer.line_color()), 0);
        assert!(count_color(&image, FRAME_COLOR) > 0);
    }

    #[test]
    fn test_value_axis_label_is_drawn() {
        let times = [0.0, 0.5, 1.0];
        let values = [1.0, 3.0, 2.0];
        let mut renderer = PlotRenderer::new(labelled_style());

        let distance = renderer.render_time_series("distance", &times, &values).unwrap();
        let angle = renderer.render_time_series("angle (°)", &times, &values).unwrap();
        assert!(distance != angle, "axis label should change the image");
    }

    #[test]
    fn test_tick_values_follow_value_range() {
        let times = [0.0, 0.5, 1.0];
        let mut renderer = PlotRenderer::new(labelled_style());

        let small = renderer.render_time_series("distance", &times, &[1.0, 3.0, 2.0]).unwrap();
        let large = renderer
            .render_time_series("distance", &times, &[100.0, 300.0, 200.0])
            .unwrap();
        assert!(small != large, "tick values should change the image");
        assert!(count_color(&small, renderer.line_color()) > 0);
        assert!(count_color(&large, renderer.line_color()) > 0);
    }

    #[test]
    fn test_title_is_drawn() {
        let times = [0.0, 1.0];
        let values = [0.0, 1.0];
        let untitled = PlotRenderer::new(labelled_style())
            .render_time_series("angle (°)", &times, &values)
            .unwrap();
        let titled = PlotRenderer::new(labelled_style())
            .with_title("Angle (sync_1, 0m0s-0m1s, keypoint2-3-4)")
            .render_time_series("angle (°)", &times, &values)
            .unwrap();
        assert!(untitled != titled);
    }

    #[test]
    fn test_zero_font_size_draws_no_text() {
        let times = [0.0, 0.5, 1.0];
        let values = [1.0, 3.0, 2.0];
        let mut renderer = PlotRenderer::new(small_style()).with_title("Distance");

        let distance = renderer.render_time_series("distance", &times, &values).unwrap();
        let angle = renderer.render_time_series("angle (°)", &times, &values).unwrap();
        assert!(distance == angle);
    }

    #[test]
    fn test_text_never_uses_line_color() {
        let mut renderer = PlotRenderer::new(labelled_style()).with_title("Track (hand_1, 0m0s-0m3s, keypoint10)");
        let image = renderer.render_trajectory(&[], None).unwrap();
        assert_eq!(count_color(&image, renderer.line_color()), 0);
    }

    #[test]
    fn test_tick_text() {
        assert_eq!(format_tick(0.0, 1.0), "0.00");
        assert_eq!(format_tick(-0.0001, 1.0), "0.00");
        assert_eq!(format_tick(1.25, 2.0), "1.25");
        assert_eq!(format_tick(250.0, 200.0), "250");
        assert_eq!(format_tick(0.0123, 0.05), "0.0123");
        assert_eq!(format_tick(-12.5, 30.0), "-12.5");

        let values = ticks((0.0, 1.0), 5);
        assert_eq!(values.len(), 6);
        assert_eq!(values[0].1, "0.00");
        assert_eq!(values[5].1, "1.00");
        assert_eq!(ticks((2.0, 4.0), 0).len(), 2);
    }

    #[test]
    fn test_output_path() {
        let range = TimeRange::parse("1m25s", "1m35s").unwrap();
        let selection = Selection::Distance(KeypointId::THUMB_TIP, KeypointId::PINKY_TIP);
        let path = output_path(Path::new("out"), "sync_1", &range, &selection);
        assert_eq!(path, PathBuf::from("out/distance/sync_1_1m25s-1m35s_keypoint4-20.png"));

        let selection = Selection::Track(KeypointId::WRIST);
        let path = output_path(Path::new("out"), "hand_1", &range, &selection);
        assert_eq!(path, PathBuf::from("out/track/hand_1_1m25s-1m35s_keypoint0.png"));
    }

    #[test]
    fn test_output_path_uses_normalised_range() {
        let range = TimeRange::parse("01m5s", "1m010s").unwrap();
        let selection = Selection::Track(KeypointId::WRIST);
        let path = output_path(Path::new("out"), "hand_1", &range, &selection);
        assert_eq!(path, PathBuf::from("out/track/hand_1_1m5s-1m10s_keypoint0.png"));
    }

    #[test]
    fn test_save_png_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("angle").join("plot.png");
        let image = RgbImage::from_pixel(4, 4, BACKGROUND);

        save_png(&image, &path).unwrap();
        assert!(path.exists());
    }
}
