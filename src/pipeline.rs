//! The pipeline-checker field-mapping interface.
//!
//! The pipeline checker runs before lowering. It validates that decoders,
//! tables, and flows are reachable and consistent, and assigns every
//! extraction a stable integer id — the shared key between compiled code and
//! the runtime environment of bound fields. Lowering consumes that
//! assignment through [`FieldMap`].

use hashbrown::HashMap;

use crate::ast::DeclRef;

/// The binding the pipeline checker computed for one extraction: the
/// environment id, the alias id for rebinds, and the field's position
/// within its layout. Offset and length are in the unit the layout
/// declares, which the runtime ABI expects to be bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBinding {
    pub id: i32,
    /// The id the field would receive under its alias name; set for rebind
    /// extractions only.
    pub alias: Option<i32>,
    pub offset: i32,
    pub length: i32,
}

impl FieldBinding {
    pub fn new(id: i32, offset: i32, length: i32) -> Self {
        FieldBinding {
            id,
            alias: None,
            offset,
            length,
        }
    }

    pub fn with_alias(id: i32, alias: i32, offset: i32, length: i32) -> Self {
        FieldBinding {
            id,
            alias: Some(alias),
            offset,
            length,
        }
    }
}

/// Field mappings keyed by extraction declaration.
#[derive(Debug, Default)]
pub struct FieldMap {
    map: HashMap<DeclRef, FieldBinding>,
}

impl FieldMap {
    pub fn new() -> Self {
        FieldMap { map: HashMap::new() }
    }

    /// Record the binding for an extraction declaration.
    pub fn insert(&mut self, extract: DeclRef, binding: FieldBinding) {
        self.map.insert(extract, binding);
    }

    /// The stable integer id and geometry assigned to an extraction.
    pub fn field_mapping(&self, extract: DeclRef) -> Option<&FieldBinding> {
        self.map.get(&extract)
    }
}
