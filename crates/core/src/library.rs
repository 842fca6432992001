//! Room template and hallway mask libraries.
//!
//! Templates are stored in a slot map keyed by `TemplateId`; insertion-only use keeps iteration
//! in registration order, which selection relies on for reproducible candidate lists.
//! Attributes are derived from the template on first use and cached for the library's lifetime.

mod attributes;
mod masks;
mod starter;

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::constraints::ConstraintSubject;
use crate::error::ConfigurationError;
use crate::types::{Direction, Vec2};

pub use attributes::{AttributeFn, AttributeRegistry, FuzzyLabel};
pub use masks::{HallwayMask, MaskSpec};
pub use starter::starter_library;

new_key_type! {
    pub struct TemplateId;
    pub struct MaskId;
}

/// Door attachment point relative to the room center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoorSlot {
    pub offset: Vec2,
    pub direction: Direction,
}

impl DoorSlot {
    /// One slot in the middle of each wall.
    pub fn one_per_side(size: Vec2) -> Vec<Self> {
        let (half_x, half_z) = (size.x * 0.5, size.z * 0.5);
        vec![
            Self { offset: Vec2::new(half_x, 0.0), direction: Direction::PosX },
            Self { offset: Vec2::new(0.0, half_z), direction: Direction::PosZ },
            Self { offset: Vec2::new(-half_x, 0.0), direction: Direction::NegX },
            Self { offset: Vec2::new(0.0, -half_z), direction: Direction::NegZ },
        ]
    }

    /// Two slots on each wall, at a third and two thirds of its length.
    pub fn two_per_side(size: Vec2) -> Vec<Self> {
        let (half_x, half_z) = (size.x * 0.5, size.z * 0.5);
        let (third_x, third_z) = (size.x / 6.0, size.z / 6.0);
        let mut slots = Vec::with_capacity(8);
        for sign in [-1.0, 1.0] {
            let (along_x, along_z) = (sign * third_x, sign * third_z);
            slots.extend([
                Self { offset: Vec2::new(half_x, along_z), direction: Direction::PosX },
                Self { offset: Vec2::new(along_x, half_z), direction: Direction::PosZ },
                Self { offset: Vec2::new(-half_x, along_z), direction: Direction::NegX },
                Self { offset: Vec2::new(along_x, -half_z), direction: Direction::NegZ },
            ]);
        }
        slots
    }
}

/// Opaque handle the host uses to instantiate a room's geometry.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GeometryRef(pub String);

/// Serializable description of a template, as stored in preset files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub name: String,
    pub size: Vec2,
    pub min_doors: usize,
    pub max_doors: usize,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Defaults to one slot per wall.
    #[serde(default)]
    pub door_slots: Vec<DoorSlot>,
    #[serde(default)]
    pub geometry: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RoomTemplate {
    pub name: String,
    pub size: Vec2,
    pub min_doors: usize,
    pub max_doors: usize,
    pub tags: BTreeSet<String>,
    pub door_slots: Vec<DoorSlot>,
    pub geometry: GeometryRef,
    attributes: OnceCell<BTreeMap<String, f32>>,
    resolved_tags: OnceCell<BTreeSet<String>>,
}

impl RoomTemplate {
    pub fn from_spec(spec: TemplateSpec) -> Self {
        let door_slots = if spec.door_slots.is_empty() {
            DoorSlot::one_per_side(spec.size)
        } else {
            spec.door_slots
        };
        Self {
            geometry: GeometryRef(spec.geometry.unwrap_or_else(|| spec.name.clone())),
            name: spec.name,
            size: spec.size,
            min_doors: spec.min_doors,
            max_doors: spec.max_doors,
            tags: spec.tags.into_iter().collect(),
            door_slots,
            attributes: OnceCell::new(),
            resolved_tags: OnceCell::new(),
        }
    }

    pub fn accepts_door_count(&self, door_count: usize) -> bool {
        (self.min_doors..=self.max_doors).contains(&door_count)
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.min_doors > self.max_doors {
            return Err(ConfigurationError::InvertedDoorRange {
                template: self.name.clone(),
                min_doors: self.min_doors,
                max_doors: self.max_doors,
            });
        }
        if self.door_slots.len() < self.max_doors {
            return Err(ConfigurationError::NotEnoughDoorSlots {
                template: self.name.clone(),
                slots: self.door_slots.len(),
                max_doors: self.max_doors,
            });
        }
        if !(self.size.x > 0.0 && self.size.z > 0.0) {
            return Err(ConfigurationError::EmptyFootprint { template: self.name.clone() });
        }
        Ok(())
    }
}

/// Resolved tags and attributes of one template, as seen by constraint predicates.
#[derive(Clone, Copy, Debug)]
pub struct TemplateSubject<'a> {
    pub tags: &'a BTreeSet<String>,
    pub attributes: &'a BTreeMap<String, f32>,
}

impl ConstraintSubject for TemplateSubject<'_> {
    fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    fn attribute(&self, name: &str) -> Option<f32> {
        self.attributes.get(name).copied()
    }
}

#[derive(Debug)]
pub struct TemplateLibrary {
    templates: SlotMap<TemplateId, RoomTemplate>,
    masks: SlotMap<MaskId, HallwayMask>,
    registry: AttributeRegistry,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::new(AttributeRegistry::builtin())
    }
}

impl TemplateLibrary {
    pub fn new(registry: AttributeRegistry) -> Self {
        Self { templates: SlotMap::with_key(), masks: SlotMap::with_key(), registry }
    }

    pub fn from_specs(templates: Vec<TemplateSpec>, masks: Vec<MaskSpec>) -> Self {
        let mut library = Self::default();
        for spec in templates {
            library.insert(RoomTemplate::from_spec(spec));
        }
        for spec in masks {
            library.insert_mask(HallwayMask::from_spec(spec));
        }
        library
    }

    pub fn insert(&mut self, template: RoomTemplate) -> TemplateId {
        self.templates.insert(template)
    }

    pub fn insert_mask(&mut self, mask: HallwayMask) -> MaskId {
        self.masks.insert(mask)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn template(&self, id: TemplateId) -> &RoomTemplate {
        &self.templates[id]
    }

    pub fn templates(&self) -> impl Iterator<Item = (TemplateId, &RoomTemplate)> {
        self.templates.iter()
    }

    pub fn mask(&self, id: MaskId) -> &HallwayMask {
        &self.masks[id]
    }

    pub fn masks(&self) -> impl Iterator<Item = (MaskId, &HallwayMask)> {
        self.masks.iter()
    }

    /// Derived attributes of a template, computed on first request.
    pub fn attributes(&self, id: TemplateId) -> &BTreeMap<String, f32> {
        let template = &self.templates[id];
        template.attributes.get_or_init(|| self.registry.evaluate(template))
    }

    /// Explicit tags plus the fuzzy labels of every attribute.
    pub fn resolved_tags(&self, id: TemplateId) -> &BTreeSet<String> {
        let template = &self.templates[id];
        template.resolved_tags.get_or_init(|| {
            let mut tags = template.tags.clone();
            tags.extend(self.registry.fuzzy_tags(self.attributes(id)));
            tags
        })
    }

    pub fn subject(&self, id: TemplateId) -> TemplateSubject<'_> {
        TemplateSubject { tags: self.resolved_tags(id), attributes: self.attributes(id) }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.templates.is_empty() {
            return Err(ConfigurationError::EmptyLibrary);
        }
        self.templates.values().try_for_each(RoomTemplate::validate)
    }
}
