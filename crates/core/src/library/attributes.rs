//! Registered attribute table: named functions deriving a 0..1 value from a template, each with
//! a threshold table that buckets the value into a fuzzy tag such as `size:large`.

use std::collections::BTreeMap;

use super::RoomTemplate;
use crate::types::Direction;

pub type AttributeFn = fn(&RoomTemplate) -> f32;

/// Values up to and including `upper` receive `label`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FuzzyLabel {
    pub upper: f32,
    pub label: &'static str,
}

#[derive(Clone, Debug)]
struct AttributeDef {
    name: String,
    eval: AttributeFn,
    labels: Vec<FuzzyLabel>,
}

#[derive(Clone, Debug, Default)]
pub struct AttributeRegistry {
    defs: Vec<AttributeDef>,
}

/// Footprint area that maps to a `size` of 0.5.
const REFERENCE_AREA: f32 = 256.0;

const SIZE_LABELS: &[FuzzyLabel] = &[
    FuzzyLabel { upper: 0.2, label: "tiny" },
    FuzzyLabel { upper: 0.4, label: "small" },
    FuzzyLabel { upper: 0.6, label: "medium" },
    FuzzyLabel { upper: 0.8, label: "large" },
    FuzzyLabel { upper: 1.0, label: "huge" },
];

const ELONGATION_LABELS: &[FuzzyLabel] = &[
    FuzzyLabel { upper: 0.2, label: "square" },
    FuzzyLabel { upper: 0.5, label: "oblong" },
    FuzzyLabel { upper: 1.0, label: "narrow" },
];

const CONNECTIVITY_LABELS: &[FuzzyLabel] = &[
    FuzzyLabel { upper: 0.3, label: "secluded" },
    FuzzyLabel { upper: 0.6, label: "connected" },
    FuzzyLabel { upper: 1.0, label: "hub" },
];

const OPENNESS_LABELS: &[FuzzyLabel] = &[
    FuzzyLabel { upper: 0.25, label: "closed" },
    FuzzyLabel { upper: 0.75, label: "partial" },
    FuzzyLabel { upper: 1.0, label: "open" },
];

fn size(template: &RoomTemplate) -> f32 {
    let area = template.size.x * template.size.z;
    area / (area + REFERENCE_AREA)
}

fn elongation(template: &RoomTemplate) -> f32 {
    let long = template.size.x.max(template.size.z);
    let short = template.size.x.min(template.size.z);
    if long <= 0.0 { 0.0 } else { 1.0 - short / long }
}

fn connectivity(template: &RoomTemplate) -> f32 {
    let slots = template.door_slots.len() as f32;
    slots / (slots + 4.0)
}

fn openness(template: &RoomTemplate) -> f32 {
    let covered = Direction::ALL
        .iter()
        .filter(|&&direction| template.door_slots.iter().any(|slot| slot.direction == direction))
        .count();
    covered as f32 / 4.0
}

impl AttributeRegistry {
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register("size", size, SIZE_LABELS);
        registry.register("elongation", elongation, ELONGATION_LABELS);
        registry.register("connectivity", connectivity, CONNECTIVITY_LABELS);
        registry.register("openness", openness, OPENNESS_LABELS);
        registry
    }

    /// Adds or replaces an attribute. Labels must be sorted by `upper`.
    pub fn register(&mut self, name: &str, eval: AttributeFn, labels: &[FuzzyLabel]) {
        self.defs.retain(|def| def.name != name);
        self.defs.push(AttributeDef { name: name.to_string(), eval, labels: labels.to_vec() });
    }

    pub fn evaluate(&self, template: &RoomTemplate) -> BTreeMap<String, f32> {
        self.defs
            .iter()
            .map(|def| (def.name.clone(), (def.eval)(template).clamp(0.0, 1.0)))
            .collect()
    }

    pub fn fuzzy_tags(&self, attributes: &BTreeMap<String, f32>) -> Vec<String> {
        self.defs
            .iter()
            .filter_map(|def| {
                let value = *attributes.get(&def.name)?;
                let label = def.labels.iter().find(|label| value <= label.upper)?;
                Some(format!("{}:{}", def.name, label.label))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::TemplateSpec;
    use crate::types::Vec2;

    fn template(width: f32, depth: f32) -> RoomTemplate {
        RoomTemplate::from_spec(TemplateSpec {
            name: "probe".to_string(),
            size: Vec2::new(width, depth),
            min_doors: 1,
            max_doors: 4,
            tags: Vec::new(),
            door_slots: Vec::new(),
            geometry: None,
        })
    }

    #[test]
    fn size_grows_with_area_and_buckets_into_labels() {
        let registry = AttributeRegistry::builtin();
        let small = registry.evaluate(&template(10.0, 10.0));
        let large = registry.evaluate(&template(30.0, 30.0));
        assert!(small["size"] < large["size"]);
        assert!(registry.fuzzy_tags(&small).contains(&"size:small".to_string()));
        assert!(registry.fuzzy_tags(&large).contains(&"size:large".to_string()));
    }

    #[test]
    fn narrow_rooms_are_labelled_narrow() {
        let registry = AttributeRegistry::builtin();
        let attributes = registry.evaluate(&template(24.0, 6.0));
        assert!((attributes["elongation"] - 0.75).abs() < 1e-6);
        assert!(registry.fuzzy_tags(&attributes).contains(&"elongation:narrow".to_string()));
    }

    #[test]
    fn registering_an_existing_name_replaces_it() {
        let mut registry = AttributeRegistry::builtin();
        registry.register("size", |_| 0.9, SIZE_LABELS);
        let attributes = registry.evaluate(&template(2.0, 2.0));
        assert_eq!(attributes["size"], 0.9);
        let builtin = AttributeRegistry::builtin().evaluate(&template(2.0, 2.0));
        assert_eq!(attributes.len(), builtin.len());
    }
}
