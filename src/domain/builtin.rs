use std::sync::LazyLock;

use serde_json::Value;

use super::registry::TypeRegistry;

macro_rules! builtin_types_source {
    () => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/assets/types/builtin.types.json"
        ))
    };
}

macro_rules! fstab_sample_source {
    () => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/fstab.tyml.json"))
    };
}

/// Path under which the bundled sample document is advertised.
pub const SAMPLE_SOURCE: &str = "data/fstab.tyml.json";

static BUILTIN: LazyLock<TypeRegistry> = LazyLock::new(|| {
    TypeRegistry::from_json_str(builtin_types_source!())
        .expect("invalid assets/types/builtin.types.json")
});

impl TypeRegistry {
    /// The fstab schema plus the showcase types for the specialized editors.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }
}

/// The fstab document shipped with the crate.
pub fn sample_document() -> Value {
    serde_json::from_str(fstab_sample_source!()).expect("invalid data/fstab.tyml.json")
}
