use reef_base::{LocalPartReference, PartId};
use reef_lang::Expr;

/// What the evaluator needs to see of one stored part: the body, if it has
/// been written. A part can exist (name, type, docs) before anyone writes
/// its expression; the two absences are reported differently.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PartView {
    pub body: Option<Expr>,
}

/// Read access to the definition store. The store is owned elsewhere (see
/// reef-vers); evaluation only observes it, synchronously and by id, and the
/// memo caches are what keep those observations cheap. No write interface
/// exists on purpose.
pub trait DefSource {
    fn lookup_part(&self, id: &PartId) -> Option<PartView>;
    fn lookup_local_part(&self, reference: &LocalPartReference) -> Option<Expr>;
}
