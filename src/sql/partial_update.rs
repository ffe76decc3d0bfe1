use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;

/// External field name -> storage column name. Fields absent from the map
/// pass through with their original name.
pub type FieldNameMap = HashMap<&'static str, &'static str>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("no data")]
    NoData,
}

/// Output of [`compile`]: a `SET` clause fragment plus the bind values it
/// references, positionally aligned with its `$N` placeholders (1-indexed).
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPatch {
    pub set_clause: String,
    pub values: Vec<Value>,
}

impl CompiledPatch {
    /// Placeholder index for the first bind parameter appended after the
    /// patch values, e.g. the `WHERE` key.
    pub fn next_param_index(&self) -> usize {
        self.values.len() + 1
    }
}

/// Compile a partial-update patch into a parameterized `SET` clause.
///
/// Each patch key is emitted as `"<column>"=$<n>` in the patch's insertion
/// order, `$n` starting at 1. The column name comes from `field_map` when
/// present, otherwise the key is used unchanged. Values are carried over
/// untouched, in key order.
///
/// This is a pure string/array transformation. It executes no SQL and
/// performs no validation of value content; the caller splices `set_clause`
/// into a full statement and numbers any additional bind parameters from
/// [`CompiledPatch::next_param_index`].
pub fn compile(patch: &Map<String, Value>, field_map: &FieldNameMap) -> Result<CompiledPatch, PatchError> {
    if patch.is_empty() {
        return Err(PatchError::NoData);
    }

    let mut fragments = Vec::with_capacity(patch.len());
    let mut values = Vec::with_capacity(patch.len());

    for (index, (field, value)) in patch.iter().enumerate() {
        let column = field_map.get(field.as_str()).copied().unwrap_or(field.as_str());
        fragments.push(format!("\"{}\"=${}", column, index + 1));
        values.push(value.clone());
    }

    Ok(CompiledPatch {
        set_clause: fragments.join(", "),
        values,
    })
}
