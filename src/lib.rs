//! Synthetic sensor channels shaped into intensity grids for waterfall and
//! distance/time heatmap charts. Drawing is left to a [`drivers::RenderSurface`].
pub mod config;
pub mod drivers;
pub mod recorder;
