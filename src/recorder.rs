use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use crate::drivers::{AggregatePoint, HeatmapLayout, PipelineError, RenderSurface, SampleGrid};

/// Render surface that captures updates as CSV instead of drawing them.
///
/// Scrolling runs write one `Position,Total,Ch0..ChN` row per tick. Static runs write
/// the aggregate series as `Position,Total`; `finish` then appends a blank line and
/// the intensity matrix, one time row per line.
pub struct CsvSurface<W: Write + Send> {
    writer: W,
    resolution: usize,
    pending_column: Option<Vec<f64>>,
    matrix: Option<SampleGrid>,
    rows_written: u64,
}

impl CsvSurface<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self, PipelineError> {
        let file = File::create(path)?;
        log::info!("💾 recording to {}", path.display());
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> CsvSurface<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            resolution: 0,
            pending_column: None,
            matrix: None,
            rows_written: 0,
        }
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Writes any held matrix, flushes and hands the writer back.
    pub fn finish(mut self) -> Result<W, PipelineError> {
        if let Some(grid) = self.matrix.take() {
            writeln!(self.writer)?;
            for row in 0..grid.rows() {
                if let Some(values) = grid.row(row) {
                    self.write_values(&values)?;
                }
            }
        }
        self.writer.flush()?;
        log::info!("💾 recording saved ({} series rows)", self.rows_written);
        Ok(self.writer)
    }

    fn write_values(&mut self, values: &[f64]) -> Result<(), PipelineError> {
        let line: Vec<String> = values.iter().map(|v| format!("{v:.4}")).collect();
        writeln!(self.writer, "{}", line.join(","))?;
        Ok(())
    }
}

impl<W: Write + Send> RenderSurface for CsvSurface<W> {
    fn create_heatmap(&mut self, layout: &HeatmapLayout) -> Result<(), PipelineError> {
        match layout {
            HeatmapLayout::Scrolling { resolution, .. } => {
                self.resolution = *resolution;
                write!(self.writer, "Position,Total")?;
                for ch in 0..*resolution {
                    write!(self.writer, ",Ch{ch}")?;
                }
                writeln!(self.writer)?;
            }
            HeatmapLayout::Static { .. } => {
                writeln!(self.writer, "Position,Total")?;
            }
        }
        Ok(())
    }

    fn append_intensity_column(&mut self, values: &[f64]) -> Result<(), PipelineError> {
        if values.len() != self.resolution {
            return Err(PipelineError::Surface(format!(
                "expected {} values per column, got {}",
                self.resolution,
                values.len()
            )));
        }
        // Held until the matching aggregate point so both land on one row.
        self.pending_column = Some(values.to_vec());
        Ok(())
    }

    fn load_intensity_grid(&mut self, grid: &SampleGrid) -> Result<(), PipelineError> {
        self.matrix = Some(grid.clone());
        Ok(())
    }

    fn append_point(&mut self, point: AggregatePoint) -> Result<(), PipelineError> {
        write!(self.writer, "{:.4},{:.4}", point.position, point.value)?;
        if let Some(column) = self.pending_column.take() {
            for val in &column {
                write!(self.writer, ",{val:.4}")?;
            }
        }
        writeln!(self.writer)?;
        self.rows_written += 1;
        Ok(())
    }
}
