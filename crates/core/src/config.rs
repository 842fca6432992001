//! Generation parameters and their fail-fast validation.

use serde::{Deserialize, Serialize};

use crate::constraints::Constraint;
use crate::error::ConfigurationError;
use crate::graph::GraphParams;

/// Hallway routing costs, expressed in cell widths.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingCosts {
    pub step: f32,
    /// Cost of stepping into a cell an earlier hallway already uses.
    pub reuse_step: f32,
    pub turn_penalty: f32,
    /// Extra cost for cells in the clearance band around rooms.
    pub clearance_penalty: f32,
}

impl Default for RoutingCosts {
    fn default() -> Self {
        Self { step: 1.5, reuse_step: 0.5, turn_penalty: 1.0, clearance_penalty: 0.5 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub seed: u64,
    pub room_count: usize,
    pub critical_path_length: usize,
    pub max_doors: usize,
    /// 1.0 spreads side rooms evenly over the critical path, lower values cluster them.
    pub distribution: f32,
    /// World units per layout unit.
    pub room_distance: f32,
    /// Spacing between consecutive rings of the radial tree layout, in layout units.
    pub ring_distance: f32,
    /// Hallway width; also the routing grid cell size.
    pub door_width: f32,
    /// Gap kept between room rects during separation. Never below `door_width`, and raised at
    /// separation time to fit one hallway lane between two clearance bands.
    pub room_padding: f32,
    pub grid_margin: usize,
    pub wall_clearance: f32,
    pub max_separation_iterations: usize,
    pub hallway_height: f32,
    pub routing: RoutingCosts,
    pub constraints: Vec<Constraint>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            room_count: 12,
            critical_path_length: 5,
            max_doors: 4,
            distribution: 0.7,
            room_distance: 18.0,
            ring_distance: 1.0,
            door_width: 2.0,
            room_padding: 6.0,
            grid_margin: 4,
            wall_clearance: 1.0,
            max_separation_iterations: 10_000,
            hallway_height: 3.0,
            routing: RoutingCosts::default(),
            constraints: Vec::new(),
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        GraphParams::from_config(self).validate()?;
        for (field, value) in [
            ("room_distance", self.room_distance),
            ("ring_distance", self.ring_distance),
            ("door_width", self.door_width),
            ("hallway_height", self.hallway_height),
            ("routing.step", self.routing.step),
            ("routing.reuse_step", self.routing.reuse_step),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigurationError::NonPositive { field, value });
            }
        }
        for (field, value) in [
            ("room_padding", self.room_padding),
            ("wall_clearance", self.wall_clearance),
            ("routing.turn_penalty", self.routing.turn_penalty),
            ("routing.clearance_penalty", self.routing.clearance_penalty),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigurationError::NonPositive { field, value });
            }
        }
        if self.room_padding < self.door_width {
            return Err(ConfigurationError::PaddingBelowDoorWidth {
                room_padding: self.room_padding,
                door_width: self.door_width,
            });
        }
        if self.max_separation_iterations == 0 {
            return Err(ConfigurationError::ZeroSeparationIterations);
        }
        self.constraints.iter().try_for_each(Constraint::validate)
    }

    /// Padding used by separation: a full door-width lane plus the wall clearance of both
    /// neighbours, or `room_padding` when that is larger.
    pub fn separation_padding(&self) -> f32 {
        self.room_padding.max(2.0 * (self.door_width + self.wall_clearance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(GenerationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn critical_path_must_fit_inside_room_count() {
        let config =
            GenerationConfig { room_count: 4, critical_path_length: 5, ..Default::default() };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::CriticalPathTooLong { critical_path_length: 5, room_count: 4 })
        );
        let config = GenerationConfig { critical_path_length: 1, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigurationError::CriticalPathTooShort { .. })));
    }

    #[test]
    fn rejects_too_few_doors_and_bad_distribution() {
        let config = GenerationConfig { max_doors: 2, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigurationError::MaxDoorsTooSmall { max_doors: 2 }));
        for distribution in [1.5, -0.1, f32::NAN] {
            let config = GenerationConfig { distribution, ..Default::default() };
            assert!(matches!(
                config.validate(),
                Err(ConfigurationError::DistributionOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn rejects_non_positive_spacing() {
        let config = GenerationConfig { door_width: 0.0, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::NonPositive { field: "door_width", .. })
        ));
    }

    #[test]
    fn padding_narrower_than_a_door_is_rejected() {
        let config = GenerationConfig { room_padding: 0.0, ..Default::default() };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::PaddingBelowDoorWidth { room_padding: 0.0, door_width: 2.0 })
        );
        let config = GenerationConfig { room_padding: 2.0, ..Default::default() };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn separation_padding_leaves_a_walkable_lane() {
        let config = GenerationConfig { room_padding: 2.0, ..Default::default() };
        assert_eq!(config.separation_padding(), 6.0);
        let config = GenerationConfig { room_padding: 9.0, ..Default::default() };
        assert_eq!(config.separation_padding(), 9.0);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: GenerationConfig =
            serde_json::from_str(r#"{ "seed": 42, "room_count": 5, "critical_path_length": 3 }"#)
                .expect("partial config should parse");
        assert_eq!(config.seed, 42);
        assert_eq!(config.max_doors, GenerationConfig::default().max_doors);
        assert_eq!(config.routing, RoutingCosts::default());
    }
}
