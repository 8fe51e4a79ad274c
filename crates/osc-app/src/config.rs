//! Run configuration: loading, saving and validation.

use std::path::Path;

use osc_sim::{FramePacing, IntegratorKind, SimulationParameters, pacing_from_millis};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OscConfig {
    #[serde(default)]
    pub oscillator: OscillatorDef,
    #[serde(default)]
    pub run: RunDef,
    #[serde(default)]
    pub pacing: PacingDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OscillatorDef {
    #[serde(default = "default_natural_frequency")]
    pub natural_frequency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunDef {
    #[serde(default)]
    pub integrator: IntegratorKind,
    #[serde(default = "default_step_size")]
    pub step_size: f64,
    #[serde(default = "default_step_count")]
    pub step_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PacingDef {
    /// Real-time delay after each frame; 0 runs at full speed.
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u64,
}

fn default_natural_frequency() -> f64 {
    1.0
}

fn default_step_size() -> f64 {
    0.05
}

fn default_step_count() -> usize {
    1000
}

fn default_frame_delay_ms() -> u64 {
    10
}

impl Default for OscillatorDef {
    fn default() -> Self {
        Self {
            natural_frequency: default_natural_frequency(),
        }
    }
}

impl Default for RunDef {
    fn default() -> Self {
        Self {
            integrator: IntegratorKind::default(),
            step_size: default_step_size(),
            step_count: default_step_count(),
        }
    }
}

impl Default for PacingDef {
    fn default() -> Self {
        Self {
            frame_delay_ms: default_frame_delay_ms(),
        }
    }
}

impl OscConfig {
    pub fn params(&self) -> SimulationParameters {
        SimulationParameters::new(
            self.oscillator.natural_frequency,
            self.run.step_size,
            self.run.step_count,
        )
    }

    pub fn pacing(&self) -> Box<dyn FramePacing + Send> {
        pacing_from_millis(self.pacing.frame_delay_ms)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.params()
            .validate()
            .map_err(|e| AppError::Config(format!("Invalid run parameters: {}", e)))
    }
}

/// Parse and validate a YAML config.
pub fn parse_config(content: &str) -> AppResult<OscConfig> {
    let config: OscConfig = serde_yaml::from_str(content)
        .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))?;
    config.validate()?;
    Ok(config)
}

/// Load config from a YAML file.
pub fn load_config(path: &Path) -> AppResult<OscConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config(&content)
}

/// Save config to a YAML file.
pub fn save_config(path: &Path, config: &OscConfig) -> AppResult<()> {
    config.validate()?;
    let content = serde_yaml::to_string(config)?;
    std::fs::write(path, content).map_err(|e| AppError::ConfigFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
