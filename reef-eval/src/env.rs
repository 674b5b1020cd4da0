// Memo state threaded through evaluation. Because every id is a content
// hash, a key can only ever be assigned one value; caches therefore grow
// monotonically and merging deltas is insert-if-absent, never replace.
// Ownership stays with the caller: an evaluation borrows the environment
// read-only and returns the entries it discovered as a delta.

use std::collections::BTreeMap;

use reef_base::{LocalPartReference, PartId};
use reef_lang::{EvaluatedExpr, SuggestionExpr, SuggestionIndex};

use crate::store::DefSource;

/// The base memo tables: one keyed by part id, one by the composite
/// (part, local) reference so unrelated parts can reuse local id values.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Caches {
    pub parts: BTreeMap<PartId, EvaluatedExpr>,
    pub locals: BTreeMap<LocalPartReference, EvaluatedExpr>,
}

impl Caches {
    pub fn new() -> Self {
        Caches::default()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty() && self.locals.is_empty()
    }

    /// Fold a delta in. Existing entries win: a key already present keeps
    /// its value, which referential transparency guarantees is equal anyway.
    pub fn merge(&mut self, delta: Caches) {
        for (id, value) in delta.parts {
            self.parts.entry(id).or_insert(value);
        }
        for (reference, value) in delta.locals {
            self.locals.entry(reference).or_insert(value);
        }
    }
}

/// One pending edit inside a suggestion: a replacement expression for an
/// existing part, or the body of a brand-new part that has no id yet.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SuggestionEdit {
    pub part: Option<PartId>,
    pub expr: SuggestionExpr,
}

/// The index-addressed definition table of a suggestion, layered in front of
/// the base store during suggestion evaluation. Never consulted by plain
/// [`crate::evaluate`].
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Overlay {
    pub edits: Vec<SuggestionEdit>,
}

impl Overlay {
    pub fn new(edits: Vec<SuggestionEdit>) -> Self {
        Overlay { edits }
    }

    pub fn edit(&self, index: SuggestionIndex) -> Option<&SuggestionEdit> {
        self.edits.get(index.0 as usize)
    }

    /// Is this part's own definition being edited by the suggestion?
    pub fn edit_of_part(&self, id: &PartId) -> Option<SuggestionIndex> {
        self.edits
            .iter()
            .position(|edit| edit.part.as_ref() == Some(id))
            .map(|position| SuggestionIndex(position as u32))
    }
}

/// Memo entries discovered while evaluating under an overlay. Kept disjoint
/// from [`Caches`]: anything computed while the overlay was visible may
/// depend on it, so it lives and dies with the suggestion. Discarding a
/// suggestion is dropping one of these.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct OverlayCaches {
    /// Values of pending edits, keyed by their index in the suggestion.
    pub edits: BTreeMap<SuggestionIndex, EvaluatedExpr>,
    /// Shadow values for committed parts evaluated under the overlay.
    pub parts: BTreeMap<PartId, EvaluatedExpr>,
    /// Shadow values for local parts evaluated under the overlay.
    pub locals: BTreeMap<LocalPartReference, EvaluatedExpr>,
}

impl OverlayCaches {
    pub fn new() -> Self {
        OverlayCaches::default()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && self.parts.is_empty() && self.locals.is_empty()
    }

    pub fn merge(&mut self, delta: OverlayCaches) {
        for (index, value) in delta.edits {
            self.edits.entry(index).or_insert(value);
        }
        for (id, value) in delta.parts {
            self.parts.entry(id).or_insert(value);
        }
        for (reference, value) in delta.locals {
            self.locals.entry(reference).or_insert(value);
        }
    }
}

/// The overlay half of an environment: the suggestion's definition table
/// plus whatever its previous evaluations memoized.
#[derive(Clone, Copy, Debug)]
pub struct OverlayEnv<'a> {
    pub overlay: &'a Overlay,
    pub caches: &'a OverlayCaches,
}

/// Everything one evaluation call reads: the store, the base memo tables,
/// and optionally a suggestion overlay. All borrowed; evaluation writes
/// nothing here.
#[derive(Clone, Copy, Debug)]
pub struct Env<'a, S: DefSource> {
    pub store: &'a S,
    pub caches: &'a Caches,
    pub overlay: Option<OverlayEnv<'a>>,
}

impl<'a, S: DefSource> Env<'a, S> {
    pub fn new(store: &'a S, caches: &'a Caches) -> Self {
        Env {
            store,
            caches,
            overlay: None,
        }
    }

    pub fn with_overlay(
        store: &'a S,
        caches: &'a Caches,
        overlay: &'a Overlay,
        overlay_caches: &'a OverlayCaches,
    ) -> Self {
        Env {
            store,
            caches,
            overlay: Some(OverlayEnv {
                overlay,
                caches: overlay_caches,
            }),
        }
    }
}
