use std::sync::{Arc, Mutex};
use serde::{Deserialize, Serialize};
use crate::drivers::grid::{AggregatePoint, GridGeometry, SampleGrid};
use crate::drivers::PipelineError;
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);
impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba(r, g, b, 255)
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaletteStep {
    pub value: f64,
    pub color: Rgba,
}
/// Ordered (threshold, color) breakpoints. Value-to-color lookup is the surface's business.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub interpolate: bool,
    pub steps: Vec<PaletteStep>,
}
impl Palette {
    pub fn new(interpolate: bool, steps: Vec<PaletteStep>) -> Self {
        Self { interpolate, steps }
    }
    /// Waterfall palette: cornflower at 200 through red at 50000.
    pub fn waterfall() -> Self {
        let step = |value, color| PaletteStep { value, color };
        Self::new(
            true,
            vec![
                step(200.0, Rgba::rgb(96, 146, 237)),
                step(300.0, Rgba::rgb(0, 0, 255)),
                step(400.0, Rgba::rgb(255, 215, 0)),
                step(500.0, Rgba::rgb(255, 164, 0)),
                step(600.0, Rgba::rgb(255, 64, 0)),
                step(50000.0, Rgba::rgb(255, 0, 0)),
            ],
        )
    }
    /// Fibre heatmap palette over the 0..100 magnitude scale.
    pub fn fibre() -> Self {
        let step = |value, color| PaletteStep { value, color };
        Self::new(
            true,
            vec![
                step(0.0, Rgba::rgb(0, 0, 0)),
                step(25.0, Rgba::rgb(0, 0, 255)),
                step(50.0, Rgba::rgb(0, 255, 0)),
                step(75.0, Rgba::rgb(255, 255, 0)),
                step(100.0, Rgba::rgb(255, 0, 0)),
            ],
        )
    }
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.steps.is_empty() {
            return Err(PipelineError::InvalidConfig("palette has no steps".into()));
        }
        if self.steps.iter().any(|s| !s.value.is_finite()) {
            return Err(PipelineError::InvalidConfig(
                "palette threshold is not finite".into(),
            ));
        }
        if self.steps.windows(2).any(|w| w[1].value <= w[0].value) {
            return Err(PipelineError::InvalidConfig(
                "palette thresholds must be strictly ascending".into(),
            ));
        }
        Ok(())
    }
}
/// What kind of intensity series the surface should create.
#[derive(Clone, Debug, PartialEq)]
pub enum HeatmapLayout {
    /// Fixed resolution per update; columns arrive one tick at a time.
    Scrolling {
        resolution: usize,
        time_domain: f64,
        palette: Palette,
    },
    /// Full matrix loaded once, with real-world axis geometry.
    Static {
        rows: usize,
        cols: usize,
        geometry: GridGeometry,
        palette: Palette,
    },
}
/// The external chart component. Drawing, scaling and interaction all live behind this.
pub trait RenderSurface: Send {
    fn create_heatmap(&mut self, layout: &HeatmapLayout) -> Result<(), PipelineError>;
    fn append_intensity_column(&mut self, values: &[f64]) -> Result<(), PipelineError>;
    fn load_intensity_grid(&mut self, grid: &SampleGrid) -> Result<(), PipelineError>;
    fn append_point(&mut self, point: AggregatePoint) -> Result<(), PipelineError>;
}
impl<S: RenderSurface + ?Sized> RenderSurface for Box<S> {
    fn create_heatmap(&mut self, layout: &HeatmapLayout) -> Result<(), PipelineError> {
        (**self).create_heatmap(layout)
    }
    fn append_intensity_column(&mut self, values: &[f64]) -> Result<(), PipelineError> {
        (**self).append_intensity_column(values)
    }
    fn load_intensity_grid(&mut self, grid: &SampleGrid) -> Result<(), PipelineError> {
        (**self).load_intensity_grid(grid)
    }
    fn append_point(&mut self, point: AggregatePoint) -> Result<(), PipelineError> {
        (**self).append_point(point)
    }
}
/// Forwards every update to each surface in order; the first failure stops the fan-out.
impl RenderSurface for Vec<Box<dyn RenderSurface>> {
    fn create_heatmap(&mut self, layout: &HeatmapLayout) -> Result<(), PipelineError> {
        self.iter_mut().try_for_each(|s| s.create_heatmap(layout))
    }
    fn append_intensity_column(&mut self, values: &[f64]) -> Result<(), PipelineError> {
        self.iter_mut()
            .try_for_each(|s| s.append_intensity_column(values))
    }
    fn load_intensity_grid(&mut self, grid: &SampleGrid) -> Result<(), PipelineError> {
        self.iter_mut().try_for_each(|s| s.load_intensity_grid(grid))
    }
    fn append_point(&mut self, point: AggregatePoint) -> Result<(), PipelineError> {
        self.iter_mut().try_for_each(|s| s.append_point(point))
    }
}
/// Surface shared between the scheduler thread and its owner.
pub struct SharedSurface<S: RenderSurface>(Arc<Mutex<S>>);
impl<S: RenderSurface> SharedSurface<S> {
    pub fn new(surface: S) -> Self {
        Self(Arc::new(Mutex::new(surface)))
    }
    /// Takes the surface back once every other handle is gone.
    pub fn into_inner(self) -> Result<S, PipelineError> {
        let mutex = Arc::try_unwrap(self.0)
            .map_err(|_| PipelineError::Surface("surface is still shared".into()))?;
        mutex
            .into_inner()
            .map_err(|_| PipelineError::Surface("surface lock poisoned".into()))
    }
    fn with<T>(&self, f: impl FnOnce(&mut S) -> Result<T, PipelineError>) -> Result<T, PipelineError> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| PipelineError::Surface("surface lock poisoned".into()))?;
        f(&mut *guard)
    }
}
impl<S: RenderSurface> Clone for SharedSurface<S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}
impl<S: RenderSurface> RenderSurface for SharedSurface<S> {
    fn create_heatmap(&mut self, layout: &HeatmapLayout) -> Result<(), PipelineError> {
        self.with(|s| s.create_heatmap(layout))
    }
    fn append_intensity_column(&mut self, values: &[f64]) -> Result<(), PipelineError> {
        self.with(|s| s.append_intensity_column(values))
    }
    fn load_intensity_grid(&mut self, grid: &SampleGrid) -> Result<(), PipelineError> {
        self.with(|s| s.load_intensity_grid(grid))
    }
    fn append_point(&mut self, point: AggregatePoint) -> Result<(), PipelineError> {
        self.with(|s| s.append_point(point))
    }
}
/// Keeps every update in memory.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    pub layout: Option<HeatmapLayout>,
    pub columns: Vec<Vec<f64>>,
    pub grid: Option<SampleGrid>,
    pub points: Vec<AggregatePoint>,
}
impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }
    fn expect_layout(&self) -> Result<&HeatmapLayout, PipelineError> {
        self.layout
            .as_ref()
            .ok_or_else(|| PipelineError::Surface("heatmap not created".into()))
    }
}
impl RenderSurface for RecordingSurface {
    fn create_heatmap(&mut self, layout: &HeatmapLayout) -> Result<(), PipelineError> {
        self.layout = Some(layout.clone());
        Ok(())
    }
    fn append_intensity_column(&mut self, values: &[f64]) -> Result<(), PipelineError> {
        let resolution = match self.expect_layout()? {
            HeatmapLayout::Scrolling { resolution, .. } => *resolution,
            HeatmapLayout::Static { .. } => {
                return Err(PipelineError::Surface(
                    "static heatmap does not accept columns".into(),
                ))
            }
        };
        if resolution != values.len() {
            return Err(PipelineError::Surface(format!(
                "column of {} values on a heatmap of resolution {resolution}",
                values.len()
            )));
        }
        self.columns.push(values.to_vec());
        Ok(())
    }
    fn load_intensity_grid(&mut self, grid: &SampleGrid) -> Result<(), PipelineError> {
        let fits = matches!(
            self.expect_layout()?,
            HeatmapLayout::Static { rows, cols, .. } if *rows == grid.rows() && *cols == grid.cols()
        );
        if !fits {
            return Err(PipelineError::Surface(format!(
                "grid of {}x{} does not match heatmap layout",
                grid.rows(),
                grid.cols()
            )));
        }
        self.grid = Some(grid.clone());
        Ok(())
    }
    fn append_point(&mut self, point: AggregatePoint) -> Result<(), PipelineError> {
        self.points.push(point);
        Ok(())
    }
}
/// Headless surface that reports every update through `log`.
#[derive(Debug, Default)]
pub struct LogSurface {
    columns: u64,
}
impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }
}
impl RenderSurface for LogSurface {
    fn create_heatmap(&mut self, layout: &HeatmapLayout) -> Result<(), PipelineError> {
        match layout {
            HeatmapLayout::Scrolling {
                resolution,
                time_domain,
                palette,
            } => log::info!(
                "waterfall heatmap: resolution {resolution}, time domain {time_domain}, {} palette steps",
                palette.steps.len()
            ),
            HeatmapLayout::Static {
                rows,
                cols,
                geometry,
                palette,
            } => log::info!(
                "fibre heatmap: {rows} time rows x {cols} distance columns, distance {}..{} step {}, time {}..{} step {}, {} palette steps",
                geometry.distance.start,
                geometry.distance.end(),
                geometry.distance.step,
                geometry.time.start,
                geometry.time.end(),
                geometry.time.step,
                palette.steps.len()
            ),
        }
        Ok(())
    }
    fn append_intensity_column(&mut self, values: &[f64]) -> Result<(), PipelineError> {
        self.columns += 1;
        log::debug!("column #{}: {:?}", self.columns, values);
        Ok(())
    }
    fn load_intensity_grid(&mut self, grid: &SampleGrid) -> Result<(), PipelineError> {
        let (min, max) = grid
            .as_array()
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        log::info!(
            "loaded {}x{} intensity grid, values {min:.2}..{max:.2}",
            grid.rows(),
            grid.cols()
        );
        Ok(())
    }
    fn append_point(&mut self, point: AggregatePoint) -> Result<(), PipelineError> {
        log::info!("x = {}, total = {:.2}", point.position, point.value);
        Ok(())
    }
}
