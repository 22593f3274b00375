use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use crate::drivers::source::ChannelSequence;
use crate::drivers::PipelineError;
/// Start/step/count along one grid axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisGeometry {
    pub start: f64,
    pub step: f64,
    pub count: usize,
}
impl AxisGeometry {
    pub fn new(start: f64, step: f64, count: usize) -> Self {
        Self { start, step, count }
    }
    /// Number of whole steps that fit in `[start, end)`.
    pub fn from_range(start: f64, end: f64, step: f64) -> Result<Self, PipelineError> {
        if !(step > 0.0) || !start.is_finite() || !end.is_finite() {
            return Err(PipelineError::InvalidConfig(format!(
                "axis range {start}..{end} with step {step}"
            )));
        }
        let span = (end - start) / step;
        // Tolerate float noise such as 8999.999999 / 1000.
        let count = (span + 1e-9).floor().max(0.0) as usize;
        Ok(Self { start, step, count })
    }
    pub fn coordinate(&self, index: usize) -> f64 {
        self.start + index as f64 * self.step
    }
    /// Coordinate one step past the last cell.
    pub fn end(&self) -> f64 {
        self.coordinate(self.count)
    }
}
/// Geometry Descriptor of the static fibre heatmap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub distance: AxisGeometry,
    pub time: AxisGeometry,
}
/// One point of the summed line series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AggregatePoint {
    pub position: f64,
    pub value: f64,
}
/// How aggregate positions are derived from column indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PositionMode {
    Index { first: f64 },
    Geometry(AxisGeometry),
}
impl PositionMode {
    fn position(&self, column: usize) -> f64 {
        match self {
            PositionMode::Index { first } => first + column as f64,
            PositionMode::Geometry(axis) => axis.coordinate(column),
        }
    }
}
/// Row-major intensity matrix; every row has the same length.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleGrid {
    values: Array2<f64>,
}
impl SampleGrid {
    /// One row per sequence, in the order given. Sequences of unequal length are rejected.
    pub fn from_sequences(sequences: &[ChannelSequence]) -> Result<Self, PipelineError> {
        let first = sequences.first().ok_or(PipelineError::EmptyGrid)?;
        let cols = first.len();
        for (row, seq) in sequences.iter().enumerate() {
            if seq.len() != cols {
                return Err(PipelineError::ShapeMismatch {
                    channel: row,
                    expected: cols,
                    actual: seq.len(),
                });
            }
        }
        let mut values = Array2::<f64>::zeros((sequences.len(), cols));
        for (mut dst, seq) in values.rows_mut().into_iter().zip(sequences) {
            for (cell, sample) in dst.iter_mut().zip(&seq.samples) {
                *cell = *sample;
            }
        }
        Ok(Self { values })
    }
    pub fn from_array(values: Array2<f64>) -> Self {
        Self { values }
    }
    pub fn rows(&self) -> usize {
        self.values.nrows()
    }
    pub fn cols(&self) -> usize {
        self.values.ncols()
    }
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get((row, col)).copied()
    }
    pub fn row(&self, row: usize) -> Option<Vec<f64>> {
        (row < self.rows()).then(|| self.values.row(row).to_vec())
    }
    pub fn column(&self, col: usize) -> Option<Vec<f64>> {
        (col < self.cols()).then(|| self.values.column(col).to_vec())
    }
    /// Swaps row and column semantics for renderers that want the other orientation.
    pub fn transposed(&self) -> SampleGrid {
        Self {
            values: self.values.t().to_owned(),
        }
    }
    pub fn as_array(&self) -> &Array2<f64> {
        &self.values
    }
    /// Sums each column across all rows.
    pub fn column_totals(&self) -> Vec<f64> {
        self.values.sum_axis(Axis(0)).to_vec()
    }
    pub fn aggregate(&self, mode: PositionMode) -> Vec<AggregatePoint> {
        self.column_totals()
            .into_iter()
            .enumerate()
            .map(|(col, value)| AggregatePoint {
                position: mode.position(col),
                value,
            })
            .collect()
    }
}
/// Grid plus its column-sum series.
#[derive(Clone, Debug)]
pub struct Assembly {
    pub grid: SampleGrid,
    pub aggregate: Vec<AggregatePoint>,
}
pub fn assemble(
    sequences: &[ChannelSequence],
    mode: PositionMode,
) -> Result<Assembly, PipelineError> {
    let grid = SampleGrid::from_sequences(sequences)?;
    let aggregate = grid.aggregate(mode);
    log::debug!(
        "assembled {}x{} grid with {} aggregate points",
        grid.rows(),
        grid.cols(),
        aggregate.len()
    );
    Ok(Assembly { grid, aggregate })
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::source::{generate_channels, NoiseProcess, Rescale, SyntheticGenerator};
    fn seqs(data: Vec<Vec<f64>>) -> Vec<ChannelSequence> {
        data.into_iter()
            .enumerate()
            .map(|(c, s)| ChannelSequence::new(c, s))
            .collect()
    }
    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }
    #[test]
    fn grid_keeps_values_in_place() {
        let sequences = seqs(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let grid = SampleGrid::from_sequences(&sequences).unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        for (c, seq) in sequences.iter().enumerate() {
            for (i, v) in seq.samples.iter().enumerate() {
                assert_eq!(grid.get(c, i), Some(*v));
            }
        }
        assert_eq!(grid.column(1), Some(vec![2.0, 5.0]));
        assert_eq!(grid.row(1), Some(vec![4.0, 5.0, 6.0]));
        assert_eq!(grid.column(3), None);
    }
    #[test]
    fn transposed_swaps_orientation() {
        let grid = SampleGrid::from_sequences(&seqs(vec![vec![1.0, 2.0], vec![3.0, 4.0]])).unwrap();
        let t = grid.transposed();
        assert_eq!(t.get(0, 1), Some(3.0));
        assert_eq!(t.get(1, 0), Some(2.0));
    }
    #[test]
    fn unequal_lengths_are_rejected() {
        let err = SampleGrid::from_sequences(&seqs(vec![vec![1.0, 2.0], vec![3.0]])).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ShapeMismatch {
                channel: 1,
                expected: 2,
                actual: 1
            }
        ));
        assert!(matches!(
            SampleGrid::from_sequences(&[]),
            Err(PipelineError::EmptyGrid)
        ));
    }
    #[test]
    fn eight_by_thousand_aggregate_matches_column_sums() {
        let generator = SyntheticGenerator::new(
            NoiseProcess::WhiteNoise,
            Rescale::Affine {
                min: 200.0,
                max: 1000.0,
            },
            Some(11),
        );
        let sequences = generate_channels(&generator, 8, 1000).unwrap();
        let assembly = assemble(&sequences, PositionMode::Index { first: 0.0 }).unwrap();
        assert_eq!(assembly.grid.rows(), 8);
        assert_eq!(assembly.grid.cols(), 1000);
        assert_eq!(assembly.aggregate.len(), 1000);
        let first: f64 = sequences.iter().map(|s| s.samples[0]).sum();
        assert!(close(assembly.aggregate[0].value, first));
        for (i, point) in assembly.aggregate.iter().enumerate() {
            let expected: f64 = (0..8).map(|c| assembly.grid.get(c, i).unwrap()).sum();
            assert!(close(point.value, expected));
            assert_eq!(point.position, i as f64);
        }
    }
    #[test]
    fn geometry_positions_follow_distance_axis() {
        let distance = AxisGeometry::new(0.0, 10.0, 320);
        let rows: Vec<Vec<f64>> = (0..9).map(|r| vec![r as f64; 320]).collect();
        let assembly = assemble(&seqs(rows), PositionMode::Geometry(distance)).unwrap();
        assert_eq!(assembly.aggregate.len(), 320);
        assert_eq!(assembly.aggregate[0].position, 0.0);
        assert_eq!(assembly.aggregate[1].position, 10.0);
        assert_eq!(assembly.aggregate[319].position, 3190.0);
        assert!(assembly
            .aggregate
            .windows(2)
            .all(|w| w[1].position > w[0].position));
        assert_eq!(assembly.aggregate[5].value, 36.0);
    }
    #[test]
    fn axis_from_range_counts_whole_steps() {
        let time = AxisGeometry::from_range(0.0, 9000.0, 1000.0).unwrap();
        assert_eq!(time.count, 9);
        assert_eq!(time.end(), 9000.0);
        let odd = AxisGeometry::from_range(0.0, 0.3, 0.1).unwrap();
        assert_eq!(odd.count, 3);
        assert!(AxisGeometry::from_range(0.0, 10.0, 0.0).is_err());
    }
}
