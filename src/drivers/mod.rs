// src/drivers/mod.rs
pub mod emitter;
pub mod error;
pub mod grid;
pub mod pipeline;
pub mod scheduler;
pub mod source;
pub mod surface;
pub use emitter::{Emission, ScrollingEmitter, MAX_EXACT_POSITION};
pub use error::PipelineError;
pub use grid::{assemble, AggregatePoint, Assembly, AxisGeometry, GridGeometry, PositionMode, SampleGrid};
pub use pipeline::{build_fibre, build_scrolling, FibreSnapshot, ScrollingSession};
pub use scheduler::{SchedulerHandle, TickScheduler};
pub use source::{
    generate_channels, ChannelGenerator, ChannelSequence, ManualGenerator, NoiseProcess, Rescale,
    SyntheticGenerator,
};
pub use surface::{
    HeatmapLayout, LogSurface, Palette, PaletteStep, RecordingSurface, RenderSurface, Rgba,
    SharedSurface,
};
