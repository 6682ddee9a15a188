//! Terminal display
//!
//! Native stand-in for the dashboard page: the text elements are kept in
//! memory and every chart redraw prints a full frame (latest values, date
//! title, an ASCII plot of both series and the legend).

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crate::chart::{ChartModel, ChartSurface};
use crate::error::{ChartError, PageError};
use crate::page::{MemoryPage, Page, DATE_TITLE_ID, HUMIDITY_ID, TEMPERATURE_ID};

/// Plot height in rows
pub const PLOT_HEIGHT: usize = 10;
/// Columns per reading
const COLUMN_WIDTH: usize = 2;
/// Series markers, by dataset index
const MARKERS: [char; 2] = ['T', 'H'];
/// Marker for cells where series coincide
const OVERLAP_MARKER: char = '#';

/// Page half of the terminal display
#[derive(Debug, Clone)]
pub struct TerminalPage {
    elements: Rc<RefCell<MemoryPage>>,
}

impl Page for TerminalPage {
    fn contains(&self, id: &str) -> bool {
        self.elements.borrow().contains(id)
    }

    fn set_text(&mut self, id: &str, text: &str) -> Result<(), PageError> {
        self.elements.borrow_mut().set_text(id, text)
    }
}

/// Chart half of the terminal display
pub struct TerminalSurface<W: Write> {
    elements: Rc<RefCell<MemoryPage>>,
    out: W,
    clear_screen: bool,
    height: usize,
}

impl<W: Write> TerminalSurface<W> {
    /// Clear the screen before each frame (for `watch`)
    pub fn clear_screen(mut self, clear: bool) -> Self {
        self.clear_screen = clear;
        self
    }

    pub fn height(mut self, rows: usize) -> Self {
        self.height = rows.max(2);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl<W: Write> ChartSurface for TerminalSurface<W> {
    fn redraw(&mut self, model: &ChartModel) -> Result<(), ChartError> {
        let frame = {
            let page = self.elements.borrow();
            render_frame(
                model,
                page.text(DATE_TITLE_ID).unwrap_or_default(),
                page.text(TEMPERATURE_ID).unwrap_or_default(),
                page.text(HUMIDITY_ID).unwrap_or_default(),
                self.height,
            )
        };

        let io = |e: std::io::Error| ChartError::Surface(e.to_string());
        if self.clear_screen {
            write!(self.out, "\x1b[2J\x1b[H").map_err(io)?;
        }
        self.out.write_all(frame.as_bytes()).map_err(io)?;
        self.out.flush().map_err(io)
    }
}

/// Create a linked page and surface writing to `out`
pub fn terminal<W: Write>(out: W) -> (TerminalPage, TerminalSurface<W>) {
    let elements = Rc::new(RefCell::new(MemoryPage::dashboard()));
    (
        TerminalPage {
            elements: Rc::clone(&elements),
        },
        TerminalSurface {
            elements,
            out,
            clear_screen: false,
            height: PLOT_HEIGHT,
        },
    )
}

/// Render one full frame as text
pub fn render_frame(
    model: &ChartModel,
    date_title: &str,
    temperature: &str,
    humidity: &str,
    height: usize,
) -> String {
    let mut out = String::new();

    let updated = chrono::Local::now().format("%H:%M:%S");
    out.push_str(&format!("Sensor data {}  (updated {})\n", date_title, updated));

    let (temp_label, hum_label) = match model.datasets.as_slice() {
        [t, h, ..] => (t.label.as_str(), h.label.as_str()),
        _ => ("Temperature", "Humidity"),
    };
    out.push_str(&format!(
        "{}: {}   {}: {}\n\n",
        temp_label,
        if temperature.is_empty() { "-" } else { temperature },
        hum_label,
        if humidity.is_empty() { "-" } else { humidity },
    ));

    out.push_str(&render_plot(model, height));
    out
}

/// ASCII plot of every series, a time axis line and the legend
pub fn render_plot(model: &ChartModel, height: usize) -> String {
    let mut out = String::new();
    let height = height.max(2);

    let Some((min, max)) = padded_range(model) else {
        out.push_str("  No data\n");
        return out;
    };

    let columns = model
        .datasets
        .iter()
        .map(|ds| ds.data.len())
        .chain(std::iter::once(model.labels.len()))
        .max()
        .unwrap_or(0);

    let mut grid = vec![vec![' '; columns * COLUMN_WIDTH]; height];

    for (series, dataset) in model.datasets.iter().enumerate() {
        let marker = MARKERS.get(series).copied().unwrap_or('*');
        for (i, value) in dataset.data.iter().enumerate() {
            // Non-finite values leave a gap
            if !value.is_finite() {
                continue;
            }
            let row = ((max - value) / (max - min) * (height - 1) as f64).round() as usize;
            let cell = &mut grid[row.min(height - 1)][i * COLUMN_WIDTH];
            *cell = if *cell == ' ' { marker } else { OVERLAP_MARKER };
        }
    }

    for (row, cells) in grid.iter().enumerate() {
        let value = max - (row as f64 / (height - 1) as f64) * (max - min);
        let line: String = cells.iter().collect();
        out.push_str(&format!("{:>8.1} |{}\n", value, line.trim_end()));
    }
    out.push_str(&format!("{:>8} +{}\n", "", "-".repeat(columns * COLUMN_WIDTH)));

    let x_axis = &model.options.x_axis;
    let ticks: Vec<&str> = model
        .tick_indices()
        .into_iter()
        .filter_map(|i| model.labels.get(i).map(String::as_str))
        .collect();
    if !ticks.is_empty() {
        out.push_str(&format!("{:>8}  {}: {}\n", "", x_axis.title, ticks.join("  ")));
    }

    if model.options.legend.display {
        let legend: Vec<String> = model
            .datasets
            .iter()
            .enumerate()
            .map(|(i, ds)| format!("{} {}", MARKERS.get(i).copied().unwrap_or('*'), ds.label))
            .collect();
        out.push_str(&format!("{:>8}  {}\n", "", legend.join("   ")));
    }

    out
}

/// Value range with 10% headroom, or one unit either side of a flat line
fn padded_range(model: &ChartModel) -> Option<(f64, f64)> {
    let (min, max) = model.value_range()?;
    let span = max - min;
    let pad = if span > 0.0 { span * 0.1 } else { 1.0 };
    Some((min - pad, max + pad))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Renderer;

    fn model(labels: &[&str], temps: Vec<f64>, hums: Vec<f64>) -> ChartModel {
        let mut model = ChartModel::temperature_humidity();
        model.replace(labels.iter().map(|s| s.to_string()).collect(), temps, hums);
        model
    }

    #[test]
    fn test_plot_empty_model() {
        let plot = render_plot(&ChartModel::temperature_humidity(), PLOT_HEIGHT);
        assert_eq!(plot, "  No data\n");
    }

    #[test]
    fn test_plot_places_series() {
        let plot = render_plot(
            &model(&["10:00:00", "10:00:02"], vec![20.0, 30.0], vec![30.0, 20.0]),
            3,
        );
        let lines: Vec<&str> = plot.lines().collect();

        // Padded range is 19..31, rows at 31, 25, 19
        assert_eq!(lines[0], "    31.0 |");
        assert_eq!(lines[1], "    25.0 |H T");
        assert_eq!(lines[2], "    19.0 |T H");
        assert!(lines[3].ends_with("+----"));
        assert!(lines[4].contains("Time: 10:00:00  10:00:02"));
        assert!(lines[5].contains("T Temperature (°C)   H Humidity (%)"));
    }

    #[test]
    fn test_plot_nan_leaves_gap_and_overlap_marker() {
        let plot = render_plot(&model(&["a", "b"], vec![f64::NAN, 5.0], vec![1.0, 5.0]), 5);
        assert!(plot.contains('#'));
        assert!(!plot.contains("|T"));
    }

    #[test]
    fn test_terminal_redraw_includes_page_text() {
        let (mut page, surface) = terminal(Vec::new());
        page.set_text(TEMPERATURE_ID, "21").unwrap();
        page.set_text(HUMIDITY_ID, "41").unwrap();
        page.set_text(DATE_TITLE_ID, "2024-01-02").unwrap();

        let mut renderer = Renderer::new();
        renderer.initialize(surface).unwrap();
        renderer
            .update(vec!["10:00:00".into()], vec![21.0], vec![41.0])
            .unwrap();

        let written = String::from_utf8(renderer.surface().unwrap().get_ref().clone()).unwrap();
        assert!(written.contains("Sensor data 2024-01-02"));
        assert!(written.contains("Temperature (°C): 21   Humidity (%): 41"));
        assert!(written.contains("Time: 10:00:00"));
    }

    #[test]
    fn test_terminal_page_rejects_unknown_element() {
        let (mut page, _surface) = terminal(Vec::new());
        assert!(page.set_text("pressure", "1013").is_err());
        assert!(page.contains(DATE_TITLE_ID));
    }
}
