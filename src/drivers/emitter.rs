use crate::drivers::grid::{AggregatePoint, Assembly};
use crate::drivers::surface::RenderSurface;
use crate::drivers::PipelineError;
/// What one tick hands to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Emission {
    pub tick: u64,
    pub column: Vec<f64>,
    pub point: AggregatePoint,
}
/// Largest position that still converts to `f64` without losing integer precision.
pub const MAX_EXACT_POSITION: u64 = 1 << 53;
/// Replays the columns of an assembled grid, one per tick, forever.
#[derive(Debug)]
pub struct ScrollingEmitter {
    columns: Vec<Vec<f64>>,
    totals: Vec<f64>,
    first_position: u64,
    ticks: u64,
}
impl ScrollingEmitter {
    /// Takes the grid columns and their precomputed sums as the replay cycle.
    pub fn new(assembly: Assembly, first_position: u64) -> Result<Self, PipelineError> {
        let Assembly { grid, aggregate } = assembly;
        if grid.cols() == 0 || grid.rows() == 0 {
            return Err(PipelineError::EmptyCycle);
        }
        if aggregate.len() != grid.cols() {
            return Err(PipelineError::ShapeMismatch {
                channel: 0,
                expected: grid.cols(),
                actual: aggregate.len(),
            });
        }
        let columns: Vec<Vec<f64>> = (0..grid.cols()).filter_map(|c| grid.column(c)).collect();
        let totals = aggregate.iter().map(|p| p.value).collect();
        Ok(Self {
            columns,
            totals,
            first_position,
            ticks: 0,
        })
    }
    pub fn cycle_len(&self) -> usize {
        self.columns.len()
    }
    /// Values per emitted column.
    pub fn resolution(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }
    pub fn first_position(&self) -> u64 {
        self.first_position
    }
    pub fn ticks_emitted(&self) -> u64 {
        self.ticks
    }
    /// `None` once the counter has left the exactly representable range.
    pub fn next_position(&self) -> Option<u64> {
        self.first_position
            .checked_add(self.ticks)
            .filter(|p| *p <= MAX_EXACT_POSITION)
    }
    pub fn advance(&mut self) -> Result<Emission, PipelineError> {
        let tick = self.ticks;
        let overflow = PipelineError::PositionOverflow {
            first: self.first_position,
            ticks: tick,
        };
        let position = self.next_position().ok_or(overflow)?;
        let index = (tick % self.columns.len() as u64) as usize;
        self.ticks += 1;
        Ok(Emission {
            tick,
            column: self.columns[index].clone(),
            point: AggregatePoint {
                position: position as f64,
                value: self.totals[index],
            },
        })
    }
    /// Advances one tick and pushes the result to `surface`.
    pub fn present<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<Emission, PipelineError> {
        let emission = self.advance()?;
        surface.append_intensity_column(&emission.column)?;
        surface.append_point(emission.point)?;
        log::debug!(
            "tick {} at x = {} (total {:.2})",
            emission.tick,
            emission.point.position,
            emission.point.value
        );
        Ok(emission)
    }
}
