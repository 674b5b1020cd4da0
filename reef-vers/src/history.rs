use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use reef_base::{err, CommitHash, PartId, Result, SnapshotHash, TypeId};

/// One module's committed surface: the definitions it exposes plus its child
/// modules, all by id. The definitions themselves live in the SnapshotStore;
/// a snapshot only names them.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    pub name: String,
    pub description: String,
    pub children: Vec<SnapshotHash>,
    pub type_defs: Vec<TypeId>,
    pub part_defs: Vec<PartId>,
}

/// A point in history: a module snapshot plus the commits it grew out of.
/// Multiple parents mean a merge.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Commit {
    pub parents: Vec<CommitHash>,
    pub module: SnapshotHash,
    pub description: String,
}

/// A mutable name for an immutable commit. The only thing in the whole
/// system that is updated in place.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub head: CommitHash,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct History {
    modules: BTreeMap<SnapshotHash, ModuleSnapshot>,
    commits: BTreeMap<CommitHash, Commit>,
    branches: BTreeMap<String, Branch>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    pub fn insert_module(&mut self, snapshot: ModuleSnapshot) -> Result<SnapshotHash> {
        let bytes = rmp_serde::to_vec(&snapshot)?;
        let hash = SnapshotHash::of_bytes(&bytes);
        self.modules.entry(hash.clone()).or_insert(snapshot);
        Ok(hash)
    }

    pub fn commit(
        &mut self,
        parents: Vec<CommitHash>,
        module: SnapshotHash,
        description: impl Into<String>,
    ) -> Result<CommitHash> {
        for parent in &parents {
            if !self.commits.contains_key(parent) {
                return Err(err(format!("unknown parent commit {}", parent)));
            }
        }
        if !self.modules.contains_key(&module) {
            return Err(err(format!("unknown module snapshot {}", module)));
        }
        let commit = Commit {
            parents,
            module,
            description: description.into(),
        };
        let bytes = rmp_serde::to_vec(&commit)?;
        let hash = CommitHash::of_bytes(&bytes);
        debug!(target: "reef", commit = %hash, "committing");
        self.commits.entry(hash.clone()).or_insert(commit);
        Ok(hash)
    }

    pub fn commit_of(&self, hash: &CommitHash) -> Option<&Commit> {
        self.commits.get(hash)
    }

    pub fn module(&self, hash: &SnapshotHash) -> Option<&ModuleSnapshot> {
        self.modules.get(hash)
    }

    /// Point a branch at a commit, creating the branch if needed.
    pub fn update_branch(&mut self, name: impl Into<String>, head: CommitHash) -> Result<()> {
        if !self.commits.contains_key(&head) {
            return Err(err(format!("unknown commit {}", head)));
        }
        let name = name.into();
        self.branches.insert(
            name.clone(),
            Branch {
                name,
                head,
            },
        );
        Ok(())
    }

    pub fn head(&self, branch: &str) -> Option<&Commit> {
        self.branches
            .get(branch)
            .and_then(|branch| self.commits.get(&branch.head))
    }

    /// All commits reachable from `from`, newest-first by discovery order.
    /// History is a DAG, so merged-in lines appear once.
    pub fn log(&self, from: &CommitHash) -> Vec<&Commit> {
        let mut seen = BTreeSet::new();
        let mut queue = vec![from.clone()];
        let mut commits = Vec::new();
        while let Some(hash) = queue.pop() {
            if !seen.insert(hash.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&hash) {
                queue.extend(commit.parents.iter().cloned());
                commits.push(commit);
            }
        }
        commits
    }
}
