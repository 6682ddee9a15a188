//! Renderer
//!
//! Owns the single chart instance and its drawing surface.

use crate::error::ChartError;

use super::model::ChartModel;

/// Something a [`ChartModel`] can be drawn on
pub trait ChartSurface {
    /// Draw the model, replacing whatever was drawn before
    fn redraw(&mut self, model: &ChartModel) -> Result<(), ChartError>;
}

impl<S: ChartSurface + ?Sized> ChartSurface for Box<S> {
    fn redraw(&mut self, model: &ChartModel) -> Result<(), ChartError> {
        (**self).redraw(model)
    }
}

struct BoundChart<S> {
    model: ChartModel,
    surface: S,
}

/// The temperature/humidity chart.
///
/// Starts uninitialized; [`Renderer::initialize`] binds it to a surface
/// exactly once, after which it accepts any number of updates.
pub struct Renderer<S: ChartSurface> {
    chart: Option<BoundChart<S>>,
    redraws: u64,
}

impl<S: ChartSurface> Renderer<S> {
    pub fn new() -> Self {
        Self {
            chart: None,
            redraws: 0,
        }
    }

    /// Bind the chart to `surface` and draw it empty
    pub fn initialize(&mut self, surface: S) -> Result<(), ChartError> {
        if self.chart.is_some() {
            return Err(ChartError::AlreadyInitialized);
        }

        let mut chart = BoundChart {
            model: ChartModel::temperature_humidity(),
            surface,
        };
        chart.surface.redraw(&chart.model)?;

        self.chart = Some(chart);
        self.redraws += 1;
        tracing::debug!("Chart initialized");
        Ok(())
    }

    /// Replace labels and both series, then redraw
    pub fn update(
        &mut self,
        labels: Vec<String>,
        temperatures: Vec<f64>,
        humidities: Vec<f64>,
    ) -> Result<(), ChartError> {
        let chart = self.chart.as_mut().ok_or(ChartError::NotInitialized)?;

        if labels.len() != temperatures.len() || labels.len() != humidities.len() {
            tracing::debug!(
                labels = labels.len(),
                temperatures = temperatures.len(),
                humidities = humidities.len(),
                "Series lengths differ, missing points render as gaps"
            );
        }

        chart.model.replace(labels, temperatures, humidities);
        chart.surface.redraw(&chart.model)?;
        self.redraws += 1;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.chart.is_some()
    }

    /// Current chart model, if initialized
    pub fn model(&self) -> Option<&ChartModel> {
        self.chart.as_ref().map(|c| &c.model)
    }

    /// Bound surface, if initialized
    pub fn surface(&self) -> Option<&S> {
        self.chart.as_ref().map(|c| &c.surface)
    }

    /// Number of successful draws, including the initial one
    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}

impl<S: ChartSurface> Default for Renderer<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Surface that keeps the last drawn model in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    pub last_drawn: Option<ChartModel>,
    pub draw_count: usize,
}

impl ChartSurface for MemorySurface {
    fn redraw(&mut self, model: &ChartModel) -> Result<(), ChartError> {
        self.last_drawn = Some(model.clone());
        self.draw_count += 1;
        Ok(())
    }
}
