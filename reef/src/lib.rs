// A node collects together the resources needed to work on a project: the
// committed definition store and the memo tables the evaluator fills in as
// definitions get looked at.
//
// Inserting new definitions never invalidates anything already cached —
// content addressing means existing ids keep their meaning forever — so one
// System can live as long as the process and only get warmer.

use reef_eval::{
    evaluate, evaluate_suggestion, Caches, Env, EvalResult, Overlay, OverlayCaches,
};
use reef_lang::{Expr, SuggestionExpr};
use reef_vers::SnapshotStore;

#[derive(Clone, Debug, Default)]
pub struct System {
    store: SnapshotStore,
    caches: Caches,
}

impl System {
    pub fn new() -> Self {
        System::default()
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SnapshotStore {
        &mut self.store
    }

    /// Evaluate a committed expression, keeping whatever the pass memoized.
    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        let outcome = evaluate(&Env::new(&self.store, &self.caches), expr);
        self.caches.merge(outcome.delta);
        outcome.result
    }

    /// Evaluate a speculative edit. The suggestion's own memo table is the
    /// caller's to keep or discard; the base caches only ever get read.
    pub fn evaluate_suggestion(
        &self,
        overlay: &Overlay,
        overlay_caches: &mut OverlayCaches,
        expr: &SuggestionExpr,
    ) -> EvalResult {
        let env = Env::with_overlay(&self.store, &self.caches, overlay, overlay_caches);
        let outcome = evaluate_suggestion(&env, expr);
        overlay_caches.merge(outcome.delta);
        outcome.result
    }
}
