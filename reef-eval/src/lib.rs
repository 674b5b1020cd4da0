// Eval is responsible for reducing Lang expressions incrementally.
//
// Everything evaluated here is pure and content-addressed: a part id names
// one definition forever, so once a reference reduces to a value that value
// is final. Evaluation therefore memoizes aggressively — two tables, one
// keyed by part id and one by the composite (part, local-part) reference —
// and re-evaluating an unchanged sub-expression is a map lookup.
//
// The caches are threaded as values rather than held as process state: an
// evaluation borrows its environment read-only and returns the entries it
// discovered as a delta for the caller to fold in. That keeps a single call
// pure and synchronous, and gives the compute-at-most-once property for
// free if several sessions share a table behind a lock: no key can ever be
// assigned two different values, so merges commute.
//
// Reduction is strict and depth-first. Diagnostics accumulate across the
// two sides of a function call instead of stopping at the first failure, so
// one pass reports every locatable problem. Lambda reduction (branch
// selection + capture substitution) is not implemented in this version;
// the selection half lives in cond.rs.
//
// Suggestions — speculative edits that exist only as an index-addressed
// overlay in front of the store — evaluate through the same algorithm with
// overlay-first resolution, and everything they discover stays on the
// overlay side so discarding a suggestion cannot disturb base results.

mod cond;
mod env;
mod eval;
mod store;

pub use cond::{match_condition, select_branch, Bindings};
pub use env::{Caches, Env, Overlay, OverlayCaches, OverlayEnv, SuggestionEdit};
pub use eval::{evaluate, evaluate_suggestion, EvalResult, Outcome, SuggestionOutcome};
pub use store::{DefSource, PartView};

#[cfg(test)]
mod test;
