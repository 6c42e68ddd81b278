//! Weighted combination of segmental, tone and stress distances.

use crate::distance::{SegmentalConfig, check_weight, segmental_distance};
use crate::error::ConfigError;
use crate::prosody::{Axis, ProsodyConfig, prosody_distance};
use crate::types::{DistanceBreakdown, PhoneticSequence};
use serde::{Deserialize, Serialize};

/// Component weights. They need not sum to 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentWeights {
    pub segmental: f64,
    pub tone: f64,
    pub stress: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            segmental: 0.75,
            tone: 0.15,
            stress: 0.10,
        }
    }
}

impl ComponentWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_weight("weights.segmental", self.segmental)?;
        check_weight("weights.tone", self.tone)?;
        check_weight("weights.stress", self.stress)
    }

    /// Combine already-normalized components.
    pub fn combine(&self, segmental: f64, tone: f64, stress: f64) -> DistanceBreakdown {
        DistanceBreakdown {
            segmental,
            tone,
            stress,
            total: self.segmental * segmental + self.tone * tone + self.stress * stress,
        }
    }
}

/// Combine already-normalized components with `weights`.
pub fn combine(segmental: f64, tone: f64, stress: f64, weights: &ComponentWeights) -> DistanceBreakdown {
    weights.combine(segmental, tone, stress)
}

/// Full distance model: segmental metrics, prosody tables and weights.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DistanceModel {
    pub segmental: SegmentalConfig,
    pub prosody: ProsodyConfig,
    pub weights: ComponentWeights,
}

impl DistanceModel {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.segmental.validate()?;
        self.prosody.validate()?;
        self.weights.validate()
    }

    /// Score two phone sequences.
    pub fn breakdown(&self, a: &PhoneticSequence, b: &PhoneticSequence) -> DistanceBreakdown {
        let segmental = segmental_distance(a, b, &self.segmental);
        let tone = prosody_distance(a, b, Axis::Tone, &self.prosody);
        let stress = prosody_distance(a, b, Axis::Stress, &self.prosody);

        self.weights.combine(segmental, tone, stress)
    }
}
