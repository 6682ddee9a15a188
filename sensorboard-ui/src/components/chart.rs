//! Chart Component
//!
//! Temperature/humidity line chart drawn on an HTML5 canvas.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::*;
use sensorboard::{display_number, ChartError, ChartModel, ChartSurface, Dataset, CHART_CANVAS_ID};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 60.0;

const BACKGROUND: &str = "#ffffff";
const TEXT_COLOR: &str = "#4b5563";
const FALLBACK_GRID: &str = "#e5e7eb";

/// Chart canvas
#[component]
pub fn Chart(
    /// Set once the canvas is in the DOM
    canvas_ref: NodeRef<html::Canvas>,
) -> impl IntoView {
    view! {
        <div class="relative h-96">
            <canvas
                id=CHART_CANVAS_ID
                node_ref=canvas_ref
                width="960"
                height="400"
                class="w-full h-full"
            />
        </div>
    }
}

/// Canvas the renderer draws on.
///
/// Keeps the last drawn model so hovering can redraw with a tooltip.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    hover: Rc<RefCell<Hover>>,
}

#[derive(Default)]
struct Hover {
    model: Option<ChartModel>,
    index: Option<usize>,
}

impl CanvasSurface {
    /// Bind to the canvas with the given id
    pub fn bind(id: &str) -> Result<Self, ChartError> {
        let canvas = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
            .ok_or_else(|| ChartError::Surface(format!("missing canvas #{}", id)))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| ChartError::Surface(format!("#{} is not a canvas", id)))?;

        let ctx = match canvas.get_context("2d") {
            Ok(Some(ctx)) => ctx
                .dyn_into::<CanvasRenderingContext2d>()
                .map_err(|_| ChartError::Surface("unexpected 2d context type".to_string()))?,
            _ => return Err(ChartError::Surface("2d context unavailable".to_string())),
        };

        let surface = Self {
            canvas,
            ctx,
            hover: Rc::new(RefCell::new(Hover::default())),
        };
        surface.install_tooltip();
        Ok(surface)
    }

    fn install_tooltip(&self) {
        let canvas = self.canvas.clone();
        let ctx = self.ctx.clone();
        let hover = Rc::clone(&self.hover);
        let on_move = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let mut state = hover.borrow_mut();
            let hover = &mut *state;
            let Some(model) = hover.model.as_ref() else {
                return;
            };
            if !model.options.tooltip.enabled {
                return;
            }

            let width = canvas.width() as f64;
            let scale = width / (canvas.client_width().max(1) as f64);
            let x = event.offset_x() as f64 * scale;

            let index = Plot::new(width, canvas.height() as f64, model)
                .and_then(|plot| plot.nearest_index(x));
            if index != hover.index {
                hover.index = index;
                draw_chart(&canvas, &ctx, model, index);
            }
        });
        self.canvas
            .set_onmousemove(Some(on_move.as_ref().unchecked_ref()));
        on_move.forget();

        let canvas = self.canvas.clone();
        let ctx = self.ctx.clone();
        let hover = Rc::clone(&self.hover);
        let on_leave = Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
            let mut hover = hover.borrow_mut();
            hover.index = None;
            if let Some(model) = hover.model.as_ref() {
                draw_chart(&canvas, &ctx, model, None);
            }
        });
        self.canvas
            .set_onmouseleave(Some(on_leave.as_ref().unchecked_ref()));
        on_leave.forget();
    }
}

impl ChartSurface for CanvasSurface {
    fn redraw(&mut self, model: &ChartModel) -> Result<(), ChartError> {
        let mut hover = self.hover.borrow_mut();

        // The hovered point may no longer exist
        let count = point_count(model);
        let index = hover.index.filter(|i| *i < count);
        hover.index = index;

        draw_chart(&self.canvas, &self.ctx, model, index);
        hover.model = Some(model.clone());
        Ok(())
    }
}

/// Plot area geometry for one model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plot {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl Plot {
    /// Layout for a canvas of the given size, or `None` if nothing is plottable
    pub fn new(canvas_width: f64, canvas_height: f64, model: &ChartModel) -> Option<Self> {
        let (min, max) = model.value_range()?;

        // 10% headroom, or one unit either side of a flat line
        let span = max - min;
        let pad = if span > 0.0 { span * 0.1 } else { 1.0 };

        Some(Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            width: (canvas_width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
            height: (canvas_height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
            min: min - pad,
            max: max + pad,
            count: point_count(model),
        })
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Horizontal position of the point at `index`
    pub fn x(&self, index: usize) -> f64 {
        if self.count <= 1 {
            self.left + self.width / 2.0
        } else {
            self.left + index as f64 / (self.count - 1) as f64 * self.width
        }
    }

    /// Vertical position of `value`
    pub fn y(&self, value: f64) -> f64 {
        self.top + (self.max - value) / (self.max - self.min) * self.height
    }

    /// Index of the point closest to horizontal position `x`
    pub fn nearest_index(&self, x: f64) -> Option<usize> {
        match self.count {
            0 => None,
            1 => Some(0),
            n => {
                let fraction = ((x - self.left) / self.width).clamp(0.0, 1.0);
                Some((fraction * (n - 1) as f64).round() as usize)
            }
        }
    }
}

/// Number of x positions: the longest of the labels and every series
fn point_count(model: &ChartModel) -> usize {
    model
        .datasets
        .iter()
        .map(|ds| ds.data.len())
        .chain(std::iter::once(model.labels.len()))
        .max()
        .unwrap_or(0)
}

/// Runs of consecutive finite values; anything else is a gap
pub fn finite_runs(data: &[f64]) -> Vec<Vec<usize>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();

    for (i, value) in data.iter().enumerate() {
        if value.is_finite() {
            current.push(i);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

/// Draw the chart on canvas
fn draw_chart(
    canvas: &HtmlCanvasElement,
    ctx: &CanvasRenderingContext2d,
    model: &ChartModel,
    hover: Option<usize>,
) {
    let width = canvas.width() as f64;
    let height = canvas.height() as f64;

    ctx.set_fill_style(&BACKGROUND.into());
    ctx.fill_rect(0.0, 0.0, width, height);

    if model.options.legend.display {
        draw_legend(ctx, model);
    }

    let Some(plot) = Plot::new(width, height, model) else {
        ctx.set_fill_style(&"#9ca3af".into());
        ctx.set_font("16px sans-serif");
        ctx.set_text_align("center");
        let _ = ctx.fill_text("Waiting for sensor data", width / 2.0, height / 2.0);
        ctx.set_text_align("start");
        return;
    };

    draw_grid(ctx, model, &plot);

    for dataset in &model.datasets {
        draw_series(ctx, dataset, &plot);
    }

    draw_axes(ctx, model, &plot, height);

    if let Some(index) = hover.filter(|_| model.options.tooltip.enabled) {
        draw_tooltip(ctx, model, &plot, index, width);
    }
}

fn draw_legend(ctx: &CanvasRenderingContext2d, model: &ChartModel) {
    let font_size = model.options.legend.font_size as f64;
    ctx.set_font(&format!("{}px sans-serif", font_size));
    ctx.set_text_baseline("middle");

    let mut x = MARGIN_LEFT;
    let y = MARGIN_TOP / 2.0;
    for dataset in &model.datasets {
        ctx.set_fill_style(&dataset.style.background_color.css().into());
        ctx.fill_rect(x, y - 7.0, 28.0, 14.0);
        ctx.set_stroke_style(&dataset.style.border_color.css().into());
        ctx.set_line_width(dataset.style.border_width);
        ctx.stroke_rect(x, y - 7.0, 28.0, 14.0);

        ctx.set_fill_style(&TEXT_COLOR.into());
        let _ = ctx.fill_text(&dataset.label, x + 36.0, y);

        let label_width = ctx
            .measure_text(&dataset.label)
            .map(|m| m.width())
            .unwrap_or(dataset.label.len() as f64 * font_size * 0.6);
        x += 36.0 + label_width + 24.0;
    }

    ctx.set_text_baseline("alphabetic");
}

fn draw_grid(ctx: &CanvasRenderingContext2d, model: &ChartModel, plot: &Plot) {
    let grid = model
        .options
        .y_axis
        .grid_color
        .map(|c| c.css())
        .unwrap_or_else(|| FALLBACK_GRID.to_string());

    ctx.set_stroke_style(&grid.into());
    ctx.set_line_width(1.0);
    ctx.set_font("12px sans-serif");

    // Horizontal grid lines (5 lines)
    for i in 0..=5 {
        let y = plot.top + (i as f64 / 5.0) * plot.height;
        ctx.begin_path();
        ctx.move_to(plot.left, y);
        ctx.line_to(plot.left + plot.width, y);
        ctx.stroke();

        let value = plot.max - (i as f64 / 5.0) * (plot.max - plot.min);
        ctx.set_fill_style(&TEXT_COLOR.into());
        let _ = ctx.fill_text(&format!("{:.1}", value), 22.0, y + 4.0);
    }
}

fn draw_series(ctx: &CanvasRenderingContext2d, dataset: &Dataset, plot: &Plot) {
    let style = &dataset.style;

    for run in finite_runs(&dataset.data) {
        let points: Vec<(f64, f64)> = run
            .iter()
            .map(|&i| (plot.x(i), plot.y(dataset.data[i])))
            .collect();

        if style.fill && points.len() > 1 {
            ctx.begin_path();
            trace_line(ctx, &points, style.tension);
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                ctx.line_to(last.0, plot.bottom());
                ctx.line_to(first.0, plot.bottom());
            }
            ctx.close_path();
            ctx.set_fill_style(&style.background_color.css().into());
            ctx.fill();
        }

        ctx.begin_path();
        trace_line(ctx, &points, style.tension);
        ctx.set_stroke_style(&style.border_color.css().into());
        ctx.set_line_width(style.border_width);
        ctx.stroke();

        ctx.set_fill_style(&style.border_color.css().into());
        for (x, y) in &points {
            ctx.begin_path();
            let _ = ctx.arc(*x, *y, style.point_radius, 0.0, std::f64::consts::PI * 2.0);
            ctx.fill();
        }
    }
}

/// Path through `points`, smoothed with cubic segments when `tension > 0`
fn trace_line(ctx: &CanvasRenderingContext2d, points: &[(f64, f64)], tension: f64) {
    let Some(first) = points.first() else {
        return;
    };
    ctx.move_to(first.0, first.1);

    for k in 0..points.len().saturating_sub(1) {
        let prev = points[k.saturating_sub(1)];
        let p0 = points[k];
        let p1 = points[k + 1];
        let next = points[(k + 2).min(points.len() - 1)];

        if tension <= 0.0 {
            ctx.line_to(p1.0, p1.1);
            continue;
        }

        let t = tension / 2.0;
        let cp1 = (p0.0 + (p1.0 - prev.0) * t, p0.1 + (p1.1 - prev.1) * t);
        let cp2 = (p1.0 - (next.0 - p0.0) * t, p1.1 - (next.1 - p0.1) * t);
        ctx.bezier_curve_to(cp1.0, cp1.1, cp2.0, cp2.1, p1.0, p1.1);
    }
}

fn draw_axes(
    ctx: &CanvasRenderingContext2d,
    model: &ChartModel,
    plot: &Plot,
    height: f64,
) {
    let x_axis = &model.options.x_axis;
    let y_axis = &model.options.y_axis;

    // Tick labels
    ctx.set_fill_style(&TEXT_COLOR.into());
    ctx.set_font("12px sans-serif");
    ctx.set_text_align("center");
    for i in model.tick_indices() {
        if let Some(label) = model.labels.get(i) {
            let _ = ctx.fill_text(label, plot.x(i), plot.bottom() + 18.0);
        }
    }

    // Axis titles
    ctx.set_font(&format!("{}px sans-serif", x_axis.title_font_size));
    let _ = ctx.fill_text(&x_axis.title, plot.left + plot.width / 2.0, height - 12.0);

    ctx.set_font(&format!("{}px sans-serif", y_axis.title_font_size));
    ctx.save();
    if ctx.translate(14.0, plot.top + plot.height / 2.0).is_ok()
        && ctx.rotate(-std::f64::consts::FRAC_PI_2).is_ok()
    {
        let _ = ctx.fill_text(&y_axis.title, 0.0, 0.0);
    }
    ctx.restore();

    ctx.set_text_align("start");
}

fn draw_tooltip(
    ctx: &CanvasRenderingContext2d,
    model: &ChartModel,
    plot: &Plot,
    index: usize,
    width: f64,
) {
    let x = plot.x(index);

    ctx.set_stroke_style(&"rgba(0, 0, 0, 0.2)".into());
    ctx.set_line_width(1.0);
    ctx.begin_path();
    ctx.move_to(x, plot.top);
    ctx.line_to(x, plot.bottom());
    ctx.stroke();

    let mut lines = vec![model.labels.get(index).cloned().unwrap_or_default()];
    lines.extend(model.datasets.iter().map(|ds| {
        let value = ds.data.get(index).copied().unwrap_or(f64::NAN);
        format!("{}: {}", ds.label, display_number(value))
    }));

    let box_width = 190.0;
    let box_height = 12.0 + lines.len() as f64 * 18.0;
    let box_x = if x + 12.0 + box_width > width {
        x - 12.0 - box_width
    } else {
        x + 12.0
    };
    let box_y = plot.top + 8.0;

    ctx.set_fill_style(&"rgba(17, 24, 39, 0.85)".into());
    ctx.fill_rect(box_x, box_y, box_width, box_height);

    ctx.set_font("13px sans-serif");
    for (row, line) in lines.iter().enumerate() {
        let y = box_y + 20.0 + row as f64 * 18.0;
        let mut text_x = box_x + 10.0;

        // Colour swatch for series rows
        if let Some(ds) = row.checked_sub(1).and_then(|i| model.datasets.get(i)) {
            ctx.set_fill_style(&ds.style.border_color.css().into());
            ctx.fill_rect(text_x, y - 10.0, 10.0, 10.0);
            text_x += 16.0;
        }

        ctx.set_fill_style(&"#f9fafb".into());
        let _ = ctx.fill_text(line, text_x, y);
    }

    // Hovered points
    for ds in &model.datasets {
        if let Some(value) = ds.data.get(index).filter(|v| v.is_finite()) {
            ctx.begin_path();
            let _ = ctx.arc(x, plot.y(*value), ds.style.point_radius + 2.0, 0.0, std::f64::consts::PI * 2.0);
            ctx.set_fill_style(&ds.style.border_color.css().into());
            ctx.fill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(labels: usize, temps: Vec<f64>, hums: Vec<f64>) -> ChartModel {
        let mut model = ChartModel::temperature_humidity();
        model.replace((0..labels).map(|i| format!("10:00:{:02}", i)).collect(), temps, hums);
        model
    }

    #[test]
    fn test_finite_runs_split_on_gaps() {
        assert_eq!(
            finite_runs(&[1.0, f64::NAN, 2.0, 3.0, f64::INFINITY]),
            vec![vec![0], vec![2, 3]]
        );
        assert!(finite_runs(&[f64::NAN]).is_empty());
        assert!(finite_runs(&[]).is_empty());
    }

    #[test]
    fn test_plot_geometry() {
        let plot = Plot::new(960.0, 400.0, &model(3, vec![20.0, 25.0, 30.0], vec![20.0, 20.0, 20.0]))
            .unwrap();

        assert_eq!(plot.count, 3);
        assert_eq!(plot.min, 19.0);
        assert_eq!(plot.max, 31.0);
        assert_eq!(plot.x(0), MARGIN_LEFT);
        assert_eq!(plot.x(2), MARGIN_LEFT + plot.width);
        assert_eq!(plot.y(31.0), plot.top);
        assert_eq!(plot.y(19.0), plot.bottom());
    }

    #[test]
    fn test_plot_single_point_is_centered() {
        let plot = Plot::new(960.0, 400.0, &model(1, vec![21.0], vec![41.0])).unwrap();
        assert_eq!(plot.x(0), plot.left + plot.width / 2.0);
        assert_eq!(plot.nearest_index(0.0), Some(0));
    }

    #[test]
    fn test_plot_none_without_finite_values() {
        assert!(Plot::new(960.0, 400.0, &ChartModel::temperature_humidity()).is_none());
        assert!(Plot::new(960.0, 400.0, &model(1, vec![f64::NAN], vec![f64::NAN])).is_none());
    }

    #[test]
    fn test_nearest_index() {
        let plot = Plot::new(960.0, 400.0, &model(5, vec![1.0; 5], vec![2.0; 5])).unwrap();
        assert_eq!(plot.nearest_index(0.0), Some(0));
        assert_eq!(plot.nearest_index(plot.x(2) + 10.0), Some(2));
        assert_eq!(plot.nearest_index(10_000.0), Some(4));
    }

    #[test]
    fn test_point_count_uses_longest_sequence() {
        assert_eq!(point_count(&model(2, vec![1.0, 2.0, 3.0], vec![])), 3);
        assert_eq!(point_count(&model(4, vec![1.0], vec![1.0])), 4);
    }
}

#[cfg(test)]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> web_sys::Document {
        web_sys::window().unwrap().document().unwrap()
    }

    fn mount(tag: &str, id: &str) -> web_sys::Element {
        let element = document().create_element(tag).unwrap();
        element.set_id(id);
        document().body().unwrap().append_child(&element).unwrap();
        element
    }

    fn model(points: usize) -> ChartModel {
        let mut model = ChartModel::temperature_humidity();
        model.replace(
            (0..points).map(|i| format!("10:00:{:02}", i * 2)).collect(),
            (0..points).map(|i| 20.0 + i as f64).collect(),
            (0..points).map(|i| 40.0 + i as f64).collect(),
        );
        model
    }

    #[wasm_bindgen_test]
    fn test_bind_chart_canvas() {
        let canvas = mount("canvas", CHART_CANVAS_ID);

        let mut surface = CanvasSurface::bind(CHART_CANVAS_ID).unwrap();
        surface.redraw(&model(3)).unwrap();
        assert_eq!(surface.hover.borrow().model, Some(model(3)));

        canvas.remove();
    }

    #[wasm_bindgen_test]
    fn test_bind_missing_canvas() {
        let err = CanvasSurface::bind("no-such-canvas").err();
        assert!(matches!(err, Some(ChartError::Surface(_))));
    }

    #[wasm_bindgen_test]
    fn test_bind_non_canvas_element() {
        let div = mount("div", "chart-placeholder");

        let err = CanvasSurface::bind("chart-placeholder").err();
        assert!(matches!(err, Some(ChartError::Surface(_))));

        div.remove();
    }

    #[wasm_bindgen_test]
    fn test_redraw_drops_hover_past_shorter_model() {
        let canvas = mount("canvas", "hover-canvas");
        let mut surface = CanvasSurface::bind("hover-canvas").unwrap();

        surface.redraw(&model(5)).unwrap();
        surface.hover.borrow_mut().index = Some(4);

        // Still in range
        surface.redraw(&model(5)).unwrap();
        assert_eq!(surface.hover.borrow().index, Some(4));

        surface.redraw(&model(2)).unwrap();
        assert_eq!(surface.hover.borrow().index, None);
        assert_eq!(surface.hover.borrow().model, Some(model(2)));

        canvas.remove();
    }
}
