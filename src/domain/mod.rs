mod builtin;
mod error;
mod instantiate;
mod loader;
mod registry;
mod types;

pub use builtin::{SAMPLE_SOURCE, sample_document};
pub use error::TypeError;
pub use instantiate::{ArrayDefault, InstantiateOptions};
pub use registry::TypeRegistry;
pub use types::{
    ArrayType, AttributeDef, ObjectType, ResolvedType, StringType, TYPE_TAG, Type, UnionType,
    type_to_string,
};
