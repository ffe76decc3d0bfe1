pub mod bind;
pub mod partial_update;

pub use bind::bind_value;
pub use partial_update::{compile, CompiledPatch, FieldNameMap, PatchError};
