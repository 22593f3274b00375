use thiserror::Error;
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("requested {channels} channels of {samples} samples; both must be greater than zero")]
    EmptyRequest { channels: usize, samples: usize },
    #[error("channel {channel} failed to generate: {reason}")]
    Generation { channel: usize, reason: String },
    #[error("generator task for channel {channel} panicked")]
    GeneratorPanicked { channel: usize },
    #[error("could not start generator worker: {0}")]
    WorkerSpawn(String),
    #[error("channel {channel} has {actual} samples, expected {expected}")]
    ShapeMismatch {
        channel: usize,
        expected: usize,
        actual: usize,
    },
    #[error("cannot assemble a grid from zero sequences")]
    EmptyGrid,
    #[error("emission cycle is empty; assemble at least one column first")]
    EmptyCycle,
    #[error("emission position overflowed after {ticks} ticks from {first}")]
    PositionOverflow { first: u64, ticks: u64 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("render surface rejected update: {0}")]
    Surface(String),
    #[error("scheduler thread panicked")]
    SchedulerPanicked,
    #[error("scheduler already stopped")]
    SchedulerStopped,
}
impl From<std::io::Error> for PipelineError {
    fn from(value: std::io::Error) -> Self {
        PipelineError::Surface(value.to_string())
    }
}
