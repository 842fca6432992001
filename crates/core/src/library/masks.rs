//! Pre-authored hallway pieces described by which of their four sides are open.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::GeometryRef;
use crate::constraints::ConstraintSubject;
use crate::types::{Direction, DirectionSet};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskSpec {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub openings: Vec<Direction>,
    #[serde(default)]
    pub geometry: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HallwayMask {
    pub name: String,
    pub tags: BTreeSet<String>,
    /// Open sides in the unrotated pose.
    pub openings: DirectionSet,
    pub geometry: GeometryRef,
}

impl HallwayMask {
    pub fn from_spec(spec: MaskSpec) -> Self {
        Self {
            geometry: GeometryRef(spec.geometry.unwrap_or_else(|| spec.name.clone())),
            name: spec.name,
            tags: spec.tags.into_iter().collect(),
            openings: DirectionSet::from_directions(&spec.openings),
        }
    }

    /// Smallest number of counter-clockwise quarter turns that makes this mask's openings equal
    /// `open_sides`.
    pub fn rotation_for(&self, open_sides: DirectionSet) -> Option<u8> {
        (0..4).find(|&turns| self.openings.rotated(turns) == open_sides)
    }
}

impl ConstraintSubject for HallwayMask {
    fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    fn attribute(&self, name: &str) -> Option<f32> {
        (name == "openness").then(|| self.openings.len() as f32 / 4.0)
    }
}
