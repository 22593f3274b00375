use crate::config::{FibreConfig, ScrollingConfig};
use crate::drivers::emitter::ScrollingEmitter;
use crate::drivers::error::PipelineError;
use crate::drivers::grid::{assemble, AggregatePoint, GridGeometry, PositionMode, SampleGrid};
use crate::drivers::source::{generate_channels, ChannelGenerator};
use crate::drivers::surface::{HeatmapLayout, Palette, RenderSurface};
/// Everything the scrolling demo needs once generation has succeeded.
#[derive(Debug)]
pub struct ScrollingSession {
    pub layout: HeatmapLayout,
    pub emitter: ScrollingEmitter,
}
impl ScrollingSession {
    /// Creates the waterfall on `surface` and anchors the line series at zero
    /// one position before the first tick. Emissions follow via the emitter.
    pub fn attach<S: RenderSurface + ?Sized>(&self, surface: &mut S) -> Result<(), PipelineError> {
        surface.create_heatmap(&self.layout)?;
        surface.append_point(self.seed_point())
    }
    pub fn seed_point(&self) -> AggregatePoint {
        AggregatePoint {
            position: self.emitter.first_position() as f64 - 1.0,
            value: 0.0,
        }
    }
}
/// Generates `channels x samples_per_channel` values and seeds an emitter with them.
pub fn build_scrolling<G: ChannelGenerator + ?Sized>(
    config: &ScrollingConfig,
    generator: &G,
) -> Result<ScrollingSession, PipelineError> {
    config.validate()?;
    let sequences = generate_channels(generator, config.channels, config.samples_per_channel)?;
    let assembly = assemble(
        &sequences,
        PositionMode::Index {
            first: config.first_position as f64,
        },
    )?;
    let emitter = ScrollingEmitter::new(assembly, config.first_position)?;
    log::info!(
        "scrolling session ready: {} channels, cycle of {} columns",
        emitter.resolution(),
        emitter.cycle_len()
    );
    Ok(ScrollingSession {
        layout: HeatmapLayout::Scrolling {
            resolution: config.channels,
            time_domain: config.time_domain,
            palette: config.palette.clone(),
        },
        emitter,
    })
}
/// Static distance/time heatmap plus its summed-intensity series.
#[derive(Clone, Debug)]
pub struct FibreSnapshot {
    pub geometry: GridGeometry,
    /// Rows are time steps, columns are distance steps.
    pub grid: SampleGrid,
    pub aggregate: Vec<AggregatePoint>,
    pub palette: Palette,
}
impl FibreSnapshot {
    pub fn layout(&self) -> HeatmapLayout {
        HeatmapLayout::Static {
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            geometry: self.geometry,
            palette: self.palette.clone(),
        }
    }
    /// Creates the heatmap, loads the whole matrix once, then the line series.
    pub fn present<S: RenderSurface + ?Sized>(&self, surface: &mut S) -> Result<(), PipelineError> {
        surface.create_heatmap(&self.layout())?;
        surface.load_intensity_grid(&self.grid)?;
        for point in &self.aggregate {
            surface.append_point(*point)?;
        }
        Ok(())
    }
}
/// One sequence per time step, each `distance_steps` long.
pub fn build_fibre<G: ChannelGenerator + ?Sized>(
    config: &FibreConfig,
    generator: &G,
) -> Result<FibreSnapshot, PipelineError> {
    config.validate()?;
    let geometry = config.geometry()?;
    let sequences = generate_channels(generator, geometry.time.count, geometry.distance.count)?;
    let assembly = assemble(&sequences, PositionMode::Geometry(geometry.distance))?;
    log::info!(
        "fibre snapshot ready: {} time rows x {} distance columns",
        assembly.grid.rows(),
        assembly.grid.cols()
    );
    Ok(FibreSnapshot {
        geometry,
        grid: assembly.grid,
        aggregate: assembly.aggregate,
        palette: config.palette.clone(),
    })
}
