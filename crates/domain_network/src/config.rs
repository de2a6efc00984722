//! Ring detection configuration

use serde::{Deserialize, Serialize};

use core_kernel::CoreError;

/// Weights of the ring suspicion features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingWeights {
    /// Per distinct claimant beyond the first
    pub claimants: f64,
    /// Per claim beyond one per provider
    pub provider_concentration: f64,
    /// Per unit of reinforced edge weight
    pub reinforced_edges: f64,
    /// Share of claims inside the densest incident window
    pub temporal_clustering: f64,
}

impl Default for RingWeights {
    fn default() -> Self {
        Self {
            claimants: 0.5,
            provider_concentration: 0.3,
            reinforced_edges: 0.1,
            temporal_clustering: 1.0,
        }
    }
}

/// Entity graph and ring detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Traversal depth from the focus claim's entities
    pub radius: usize,
    /// Distinct claimants required to flag a ring
    pub min_claimants: usize,
    /// Network score required to flag a ring
    pub ring_score_threshold: f64,
    /// Minimum incident edge weight for an entity to count as a ring member
    pub min_member_weight: f64,
    /// Days within which incidents at one provider count as coordinated
    pub coordinated_window_days: i64,
    /// Saturation constant of the network score
    pub normalizer: f64,
    pub weights: RingWeights,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            radius: 2,
            min_claimants: 3,
            ring_score_threshold: 50.0,
            min_member_weight: 2.0,
            coordinated_window_days: 14,
            normalizer: 3.0,
            weights: RingWeights::default(),
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.radius == 0 {
            return Err(CoreError::configuration("network.radius must be at least 1"));
        }
        if self.min_claimants == 0 {
            return Err(CoreError::configuration("network.min_claimants must be at least 1"));
        }
        if !self.ring_score_threshold.is_finite()
            || !(0.0..=100.0).contains(&self.ring_score_threshold)
        {
            return Err(CoreError::configuration(format!(
                "network.ring_score_threshold must be within [0, 100], got {}",
                self.ring_score_threshold
            )));
        }
        if !self.min_member_weight.is_finite() || self.min_member_weight < 0.0 {
            return Err(CoreError::configuration(
                "network.min_member_weight must be a finite non-negative number",
            ));
        }
        if self.coordinated_window_days < 0 {
            return Err(CoreError::configuration(
                "network.coordinated_window_days must not be negative",
            ));
        }
        if !self.normalizer.is_finite() || self.normalizer <= 0.0 {
            return Err(CoreError::configuration(format!(
                "network.normalizer must be a finite positive number, got {}",
                self.normalizer
            )));
        }
        let w = &self.weights;
        for (name, value) in [
            ("network.weights.claimants", w.claimants),
            ("network.weights.provider_concentration", w.provider_concentration),
            ("network.weights.reinforced_edges", w.reinforced_edges),
            ("network.weights.temporal_clustering", w.temporal_clustering),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::configuration(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(NetworkConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_radius_rejected() {
        let config = NetworkConfig {
            radius: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().is_configuration());
    }
}
