pub mod config;
pub mod package;
pub mod preset;

pub use config::*;
pub use package::{find_missing_paths, Package};
pub use preset::{FavoritesFile, Preset, PresetListing, PresetsFile, PresetsMetadata};
