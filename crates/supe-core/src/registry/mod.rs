//! Static registries, built-in presets and external preset packs

pub mod catalog;
pub mod external;
pub mod presets;

pub use catalog::{catalog, install_hints, Catalog, Ecosystem};
pub use external::{load_external_presets, LoadOptions, PresetSource};
pub use presets::{
    builtin_presets, find_preset, list_presets, query_presets, validate_preset, Maturity,
    PresetMap, PresetQuery, PresetTrust, StarterPreset,
};
