pub mod logger;
pub mod preset;

pub use levelgen::invariants::check_level;
pub use preset::Preset;
