// Vers holds the committed world: definitions addressed by content hash,
// snapshots grouping them into modules, commits chaining snapshots into
// history, and branches naming commits. Everything is append-only — a
// definition, once inserted, is never altered or removed, which is exactly
// what lets the evaluator memoize forever.
//
// Canonical bytes for hashing are the msgpack encoding of the definition;
// the id types themselves live in reef-base so nothing else ever sees the
// hash function. Only the read side is modeled here: replication and the
// editing front end live elsewhere.

mod history;
mod store;

pub use history::{Branch, Commit, History, ModuleSnapshot};
pub use store::SnapshotStore;
