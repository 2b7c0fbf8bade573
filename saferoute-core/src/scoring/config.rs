use serde::{Deserialize, Serialize};

use crate::Error;

/// Contribution of each danger component, in danger points at full strength
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentWeights {
    pub darkness: f64,
    pub sidewalk: f64,
    pub business: f64,
    pub land: f64,
    pub speed: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            darkness: 40.0,
            sidewalk: 30.0,
            business: 15.0,
            land: 10.0,
            speed: 5.0,
        }
    }
}

impl ComponentWeights {
    /// Upper bound of the danger score
    pub fn total(&self) -> f64 {
        self.darkness + self.sidewalk + self.business + self.land + self.speed
    }

    fn all(&self) -> [(&'static str, f64); 5] {
        [
            ("darkness", self.darkness),
            ("sidewalk", self.sidewalk),
            ("business", self.business),
            ("land", self.land),
            ("speed", self.speed),
        ]
    }
}

/// How danger and length map to the safest-route edge cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SafestWeightShape {
    /// `danger * length * penalty`
    DangerExposure,
    /// `length * penalty / max(1, 100 - danger)^exponent`
    InverseSafetyPower { exponent: f64 },
    /// `length * penalty * (danger + 1) / 100`
    OffsetDanger,
}

impl Default for SafestWeightShape {
    fn default() -> Self {
        Self::DangerExposure
    }
}

impl SafestWeightShape {
    pub fn weight(self, danger: f64, length: f64, penalty: f64) -> f64 {
        match self {
            Self::DangerExposure => danger * length * penalty,
            Self::InverseSafetyPower { exponent } => {
                let safety = (100.0 - danger).max(1.0);
                length * penalty / safety.powf(exponent)
            }
            Self::OffsetDanger => length * penalty * (danger + 1.0) / 100.0,
        }
    }
}

/// Tunable constants of the danger model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ComponentWeights,
    /// Lights-per-meter scale of the darkness curve
    pub density_scale: f64,
    /// Multiplier applied to both routing weights on footpaths
    pub footpath_penalty: f64,
    /// Multiplier applied to both routing weights on roads
    pub road_penalty: f64,
    /// Keeps the fastest weight finite at maximal danger
    pub fastest_epsilon: f64,
    /// Radius around an edge midpoint in which a business counts as nearby
    pub business_radius_m: f64,
    /// Used to derive travel time when the source data has none
    pub walking_speed_kph: f64,
    pub safest_shape: SafestWeightShape,
    /// IANA zone opening hours are expressed in
    pub business_timezone: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ComponentWeights::default(),
            density_scale: 50.0,
            footpath_penalty: 1.0,
            road_penalty: 10.0,
            fastest_epsilon: 0.01,
            business_radius_m: 100.0,
            walking_speed_kph: 5.0,
            safest_shape: SafestWeightShape::default(),
            business_timezone: "America/New_York".to_string(),
        }
    }
}

impl ScoringConfig {
    pub fn penalty(&self, is_footpath: bool) -> f64 {
        if is_footpath {
            self.footpath_penalty
        } else {
            self.road_penalty
        }
    }

    /// Checks that the configuration keeps every routing weight finite and
    /// non-negative for in-range components.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidData` naming the offending parameter
    pub fn validate(&self) -> Result<(), Error> {
        for (name, weight) in self.weights.all() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidData(format!(
                    "component weight '{name}' must be finite and non-negative, got {weight}"
                )));
            }
        }
        if self.weights.total() > 100.0 {
            return Err(Error::InvalidData(format!(
                "component weights sum to {}, danger must stay within 0..=100",
                self.weights.total()
            )));
        }

        let positive = [
            ("density_scale", self.density_scale),
            ("footpath_penalty", self.footpath_penalty),
            ("road_penalty", self.road_penalty),
            ("fastest_epsilon", self.fastest_epsilon),
            ("business_radius_m", self.business_radius_m),
            ("walking_speed_kph", self.walking_speed_kph),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidData(format!(
                    "'{name}' must be finite and positive, got {value}"
                )));
            }
        }

        if let SafestWeightShape::InverseSafetyPower { exponent } = self.safest_shape
            && (!exponent.is_finite() || exponent < 0.0)
        {
            return Err(Error::InvalidData(format!(
                "safest weight exponent must be finite and non-negative, got {exponent}"
            )));
        }

        chrono_tz::Tz::from_str_insensitive(&self.business_timezone)
            .map_err(|_| Error::UnknownTimeZone(self.business_timezone.clone()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ScoringConfig::default();
        config.validate().unwrap();
        assert_eq!(config.weights.total(), 100.0);
    }

    #[test]
    fn rejects_broken_configs() {
        let mut config = ScoringConfig::default();
        config.weights.darkness = 80.0;
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::default();
        config.fastest_epsilon = 0.0;
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::default();
        config.business_timezone = "Mars/Olympus_Mons".to_string();
        assert!(matches!(config.validate(), Err(Error::UnknownTimeZone(_))));
    }

    #[test]
    fn deserializes_partial_config() {
        let config: ScoringConfig = serde_json::from_str(
            r#"{"road_penalty": 5.0, "safest_shape": {"kind": "inverse_safety_power", "exponent": 1.5}}"#,
        )
        .unwrap();
        assert_eq!(config.road_penalty, 5.0);
        assert_eq!(config.density_scale, 50.0);
        assert_eq!(
            config.safest_shape,
            SafestWeightShape::InverseSafetyPower { exponent: 1.5 }
        );
    }
}
