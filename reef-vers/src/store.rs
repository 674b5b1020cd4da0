use std::collections::BTreeMap;

use tracing::debug;

use reef_base::{err, LocalPartReference, PartId, Result, TagId, TypeId};
use reef_eval::{DefSource, PartView};
use reef_lang::{Expr, PartDefinition, TagReference, TypeBody, TypeDefinition};

/// The content-addressed definition tables. Insertion mints the id from the
/// definition's canonical bytes, so inserting the same content twice is a
/// no-op returning the same id, and no id is ever reassigned.
///
/// Local parts get a derived table: when a part body goes in, its lambda
/// branches are walked and every branch-part definition is indexed under the
/// composite (part, local) reference the evaluator resolves by.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SnapshotStore {
    parts: BTreeMap<PartId, PartDefinition>,
    types: BTreeMap<TypeId, TypeDefinition>,
    locals: BTreeMap<LocalPartReference, Expr>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        SnapshotStore::default()
    }

    pub fn insert_part(&mut self, definition: PartDefinition) -> Result<PartId> {
        let bytes = rmp_serde::to_vec(&definition)?;
        let id = PartId::of_bytes(&bytes);
        if self.parts.contains_key(&id) {
            return Ok(id);
        }
        debug!(target: "reef", part = %id, name = %definition.name, "inserting part");
        if let Some(expr) = &definition.expr {
            index_locals(&id, expr, &mut self.locals);
        }
        self.parts.insert(id.clone(), definition);
        Ok(id)
    }

    pub fn insert_type(&mut self, definition: TypeDefinition) -> Result<TypeId> {
        let bytes = rmp_serde::to_vec(&definition)?;
        let id = TypeId::of_bytes(&bytes);
        if self.types.contains_key(&id) {
            return Ok(id);
        }
        debug!(target: "reef", ty = %id, name = %definition.name, "inserting type");
        self.types.insert(id.clone(), definition);
        Ok(id)
    }

    pub fn part(&self, id: &PartId) -> Option<&PartDefinition> {
        self.parts.get(id)
    }

    pub fn type_definition(&self, id: &TypeId) -> Option<&TypeDefinition> {
        self.types.get(id)
    }

    /// Build the reference for one tag of a stored sum type. Tag ids are
    /// minted from the owning type id plus the tag name, so equal tags of
    /// equal types compare equal everywhere.
    pub fn tag_reference(&self, type_id: &TypeId, tag_name: &str) -> Result<TagReference> {
        let definition = self
            .types
            .get(type_id)
            .ok_or_else(|| err(format!("unknown type {}", type_id)))?;
        let TypeBody::Sum(patterns) = &definition.body else {
            return Err(err(format!("type {} is not a sum type", definition.name)));
        };
        if !patterns.iter().any(|pattern| pattern.name == tag_name) {
            return Err(err(format!(
                "type {} has no tag named {}",
                definition.name, tag_name
            )));
        }
        Ok(TagReference {
            type_id: type_id.clone(),
            tag: tag_id(type_id, tag_name),
        })
    }
}

pub(crate) fn tag_id(type_id: &TypeId, tag_name: &str) -> TagId {
    let mut bytes = type_id.as_hex().as_bytes().to_vec();
    bytes.push(b'/');
    bytes.extend_from_slice(tag_name.as_bytes());
    TagId::of_bytes(&bytes)
}

// Walk a part body and index every local binding its lambdas introduce.
// Branch-part bodies can themselves contain lambdas, so this recurses
// through them as well as through call trees.
fn index_locals(part: &PartId, expr: &Expr, locals: &mut BTreeMap<LocalPartReference, Expr>) {
    match expr {
        Expr::FunctionCall(call) => {
            index_locals(part, &call.function, locals);
            index_locals(part, &call.parameter, locals);
        }
        Expr::Lambda(branches) => {
            for branch in branches {
                for local in &branch.local_parts {
                    locals.insert(
                        LocalPartReference {
                            part: part.clone(),
                            local: local.local_part_id.clone(),
                        },
                        local.expr.clone(),
                    );
                    index_locals(part, &local.expr, locals);
                }
                if let Some(body) = &branch.expr {
                    index_locals(part, body, locals);
                }
            }
        }
        Expr::Kernel(_)
        | Expr::Int32Literal(_)
        | Expr::PartReference(_)
        | Expr::LocalPartReference(_)
        | Expr::TagReference(_) => {}
    }
}

impl DefSource for SnapshotStore {
    fn lookup_part(&self, id: &PartId) -> Option<PartView> {
        self.parts.get(id).map(|definition| PartView {
            body: definition.expr.clone(),
        })
    }

    fn lookup_local_part(&self, reference: &LocalPartReference) -> Option<Expr> {
        self.locals.get(reference).cloned()
    }
}
