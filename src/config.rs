// src/config.rs
use std::fs;
use std::path::Path;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use crate::drivers::{
    AxisGeometry, GridGeometry, NoiseProcess, Palette, PipelineError, Rescale, SyntheticGenerator,
    MAX_EXACT_POSITION,
};
/// Source settings shared by both demos.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub process: NoiseProcess,
    /// Channel `c` is seeded with `seed + c`. `None` draws from OS entropy.
    pub seed: Option<u64>,
}
impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            process: NoiseProcess::WhiteNoise,
            seed: None,
        }
    }
}
impl GeneratorConfig {
    fn validate(&self) -> Result<(), PipelineError> {
        if let NoiseProcess::RandomWalk { step } = self.process {
            if !step.is_finite() || step <= 0.0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "random walk step must be positive, got {step}"
                )));
            }
        }
        Ok(())
    }
}
/// Scrolling distance-intensity + waterfall demo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollingConfig {
    pub channels: usize,
    pub samples_per_channel: usize,
    /// Visible X interval handed to the renderer.
    pub time_domain: f64,
    pub tick_interval_ms: u64,
    pub first_position: u64,
    pub intensity_min: f64,
    pub intensity_max: f64,
    pub generator: GeneratorConfig,
    pub palette: Palette,
}
impl Default for ScrollingConfig {
    fn default() -> Self {
        Self {
            channels: 8,
            samples_per_channel: 1000,
            time_domain: 20.0,
            tick_interval_ms: 1000,
            first_position: 1,
            intensity_min: 200.0,
            intensity_max: 1000.0,
            generator: GeneratorConfig::default(),
            palette: Palette::waterfall(),
        }
    }
}
impl ScrollingConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.channels == 0 || self.samples_per_channel == 0 {
            return Err(PipelineError::InvalidConfig(
                "channels and samples_per_channel must be non-zero".into(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(PipelineError::InvalidConfig(
                "tick_interval_ms must be non-zero".into(),
            ));
        }
        if !(self.intensity_min.is_finite() && self.intensity_max.is_finite())
            || self.intensity_min >= self.intensity_max
        {
            return Err(PipelineError::InvalidConfig(format!(
                "intensity range {}..{} is empty",
                self.intensity_min, self.intensity_max
            )));
        }
        if self.first_position >= MAX_EXACT_POSITION {
            return Err(PipelineError::InvalidConfig(format!(
                "first_position must be below {MAX_EXACT_POSITION}, got {}",
                self.first_position
            )));
        }
        if !(self.time_domain > 0.0) {
            return Err(PipelineError::InvalidConfig(
                "time_domain must be positive".into(),
            ));
        }
        self.generator.validate()?;
        self.palette.validate()
    }
    pub fn generator(&self) -> SyntheticGenerator {
        SyntheticGenerator::new(
            self.generator.process,
            Rescale::Affine {
                min: self.intensity_min,
                max: self.intensity_max,
            },
            self.generator.seed,
        )
    }
}
/// Static optical-fibre distance/time heatmap demo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FibreConfig {
    pub distance_start: f64,
    pub distance_step: f64,
    pub distance_steps: usize,
    pub time_start_ms: f64,
    pub time_end_ms: f64,
    pub time_step_ms: f64,
    pub magnitude_scale: f64,
    pub generator: GeneratorConfig,
    pub palette: Palette,
}
impl Default for FibreConfig {
    fn default() -> Self {
        Self {
            distance_start: 0.0,
            distance_step: 10.0,
            distance_steps: 320,
            time_start_ms: 0.0,
            time_end_ms: 9000.0,
            time_step_ms: 1000.0,
            magnitude_scale: 100.0,
            generator: GeneratorConfig {
                process: NoiseProcess::RandomWalk { step: 0.2 },
                seed: None,
            },
            palette: Palette::fibre(),
        }
    }
}
impl FibreConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.distance_steps == 0 {
            return Err(PipelineError::InvalidConfig(
                "distance_steps must be non-zero".into(),
            ));
        }
        if !(self.distance_step > 0.0 && self.distance_step.is_finite())
            || !self.distance_start.is_finite()
        {
            return Err(PipelineError::InvalidConfig(format!(
                "distance axis start {} step {}",
                self.distance_start, self.distance_step
            )));
        }
        if !self.magnitude_scale.is_finite() {
            return Err(PipelineError::InvalidConfig(
                "magnitude_scale must be finite".into(),
            ));
        }
        if self.geometry()?.time.count == 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "time window {}..{} ms holds no {} ms step",
                self.time_start_ms, self.time_end_ms, self.time_step_ms
            )));
        }
        self.generator.validate()?;
        self.palette.validate()
    }
    pub fn geometry(&self) -> Result<GridGeometry, PipelineError> {
        Ok(GridGeometry {
            distance: AxisGeometry::new(
                self.distance_start,
                self.distance_step,
                self.distance_steps,
            ),
            time: AxisGeometry::from_range(self.time_start_ms, self.time_end_ms, self.time_step_ms)?,
        })
    }
    pub fn generator(&self) -> SyntheticGenerator {
        SyntheticGenerator::new(
            self.generator.process,
            Rescale::Magnitude {
                scale: self.magnitude_scale,
            },
            self.generator.seed,
        )
    }
}
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub scrolling: ScrollingConfig,
    pub fibre: FibreConfig,
}
impl DemoConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.scrolling.validate()?;
        self.fibre.validate()
    }
}
/// Reads a JSON config. Missing fields keep their defaults.
pub fn load(path: &Path) -> Result<DemoConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: DemoConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
