//! TOML presets: generation settings plus an optional template and hallway mask library.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use levelgen::library::{MaskSpec, TemplateSpec};
use levelgen::{GenerationConfig, TemplateLibrary, starter_library};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub generation: GenerationConfig,
    /// Empty means the built-in starter library.
    pub templates: Vec<TemplateSpec>,
    pub hallway_masks: Vec<MaskSpec>,
}

impl Preset {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read preset {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("failed to parse preset {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Command-line values win over the preset.
    pub fn with_overrides(
        mut self,
        seed: Option<u64>,
        room_count: Option<usize>,
        critical_path_length: Option<usize>,
    ) -> Self {
        if let Some(seed) = seed {
            self.generation.seed = seed;
        }
        if let Some(room_count) = room_count {
            self.generation.room_count = room_count;
        }
        if let Some(critical_path_length) = critical_path_length {
            self.generation.critical_path_length = critical_path_length;
        }
        self
    }

    pub fn library(&self) -> TemplateLibrary {
        if self.templates.is_empty() {
            return starter_library();
        }
        TemplateLibrary::from_specs(self.templates.clone(), self.hallway_masks.clone())
    }
}

#[cfg(test)]
mod tests {
    use levelgen::graph::NodeType;
    use levelgen::{Cardinality, ConstraintTarget, generate};

    use super::*;

    const CRYPT: &str = include_str!("../../../presets/crypt.toml");

    #[test]
    fn bundled_crypt_preset_parses() {
        let preset = Preset::from_toml(CRYPT).expect("crypt preset parses");
        assert_eq!(preset.generation.seed, 1931);
        assert_eq!(preset.generation.room_count, 10);
        assert_eq!(preset.templates.len(), 4);
        assert_eq!(preset.hallway_masks.len(), 2);
        let constraints = &preset.generation.constraints;
        assert_eq!(constraints[0].target, ConstraintTarget::SideRooms);
        assert_eq!(constraints[0].cardinality, Cardinality::All);
        assert!(matches!(constraints[1].cardinality, Cardinality::AtMost(_)));
        assert_eq!(preset.library().len(), 4);
    }

    #[test]
    fn bundled_crypt_preset_generates_lit_side_rooms() {
        let preset = Preset::from_toml(CRYPT).expect("crypt preset parses");
        let level = generate(&preset.generation, &preset.library()).expect("crypt generates");
        assert_eq!(level.rooms.len(), 10);
        let ossuaries = level.rooms.iter().filter(|room| room.template_name == "ossuary").count();
        assert!(ossuaries <= 2);
        for room in &level.rooms {
            if room.node_type == NodeType::Side {
                assert_ne!(room.template_name, "ossuary", "ossuaries are not lit");
            }
        }
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let preset = Preset::from_toml("[generation]\nseed = 3\n").expect("partial preset parses");
        assert_eq!(preset.generation.seed, 3);
        assert_eq!(preset.generation.room_count, GenerationConfig::default().room_count);
        assert_eq!(preset.library().len(), starter_library().len());
    }

    #[test]
    fn overrides_replace_preset_values() {
        let preset = Preset::default().with_overrides(Some(99), Some(20), None);
        assert_eq!(preset.generation.seed, 99);
        assert_eq!(preset.generation.room_count, 20);
        assert_eq!(
            preset.generation.critical_path_length,
            GenerationConfig::default().critical_path_length
        );
    }

    #[test]
    fn load_reads_a_preset_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tiny.toml");
        fs::write(
            &path,
            r#"
[generation]
seed = 11
room_count = 4
critical_path_length = 2

[[templates]]
name = "box"
size = { x = 8.0, z = 8.0 }
min_doors = 1
max_doors = 4
"#,
        )
        .expect("write preset");

        let preset = Preset::load(&path).expect("preset loads");
        assert_eq!(preset.generation.room_count, 4);
        assert_eq!(preset.library().len(), 1);
        let level = generate(&preset.generation, &preset.library()).expect("tiny level");
        assert!(level.rooms.iter().all(|room| room.template_name == "box"));
    }

    #[test]
    fn load_reports_the_failing_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[generation]\nroom_count = \"many\"\n").expect("write preset");

        let error = Preset::load(&path).expect_err("room_count must be an integer");
        assert!(format!("{error:#}").contains("broken.toml"));
        assert!(Preset::load(&dir.path().join("absent.toml")).is_err());
    }
}
