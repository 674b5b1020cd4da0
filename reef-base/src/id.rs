// Identity in reef is content identity: every committed definition is named
// by a hash of its canonical encoding, so equal ids mean equal meaning and
// nothing is ever renamed or mutated in place. The id types here are opaque
// fixed-width lowercase-hex strings; minting them from bytes lives here so
// the rest of the system never sees the hash function.

use serde::{Deserialize, Serialize};

#[cfg(test)]
use test_log::test;

const SEED_LO: u64 = 0x9e3779b97f4a7c15;
const SEED_HI: u64 = 0xd1b54a32d192ed03;

// 128 bits rendered as 32 hex chars. Wide enough that an accidental collision
// inside one project is not a practical concern.
fn content_hex(bytes: &[u8]) -> String {
    let lo = rapidhash::rapidhash_seeded(bytes, SEED_LO);
    let hi = rapidhash::rapidhash_seeded(bytes, SEED_HI);
    format!("{:016x}{:016x}", hi, lo)
}

macro_rules! content_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Wrap an id that already exists elsewhere (a peer, a snapshot
            /// file). No validation: ids are opaque and only compared.
            pub fn from_hex(hex: impl Into<String>) -> Self {
                $name(hex.into())
            }
            /// Mint the id of a definition from its canonical bytes.
            pub fn of_bytes(bytes: &[u8]) -> Self {
                $name(content_hex(bytes))
            }
            pub fn as_hex(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

content_id!(
    /// A globally defined part (function or value).
    PartId
);
content_id!(
    /// A binding introduced inside one lambda branch. Only meaningful next
    /// to the PartId of the part whose lambda introduced it; see
    /// [`LocalPartReference`].
    LocalPartId
);
content_id!(
    /// A type definition.
    TypeId
);
content_id!(
    /// One tag of a sum type.
    TagId
);
content_id!(
    /// A commit.
    CommitHash
);
content_id!(
    /// A module/part/type snapshot body.
    SnapshotHash
);

/// The composite key for a local binding. Two different parts may reuse the
/// same LocalPartId value without collision because resolution and caching
/// always go through this pair.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct LocalPartReference {
    pub part: PartId,
    pub local: LocalPartId,
}

impl std::fmt::Display for LocalPartReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.part, self.local)
    }
}

#[test]
fn test_content_ids_stable_and_distinct() {
    let a = PartId::of_bytes(b"add two numbers");
    let b = PartId::of_bytes(b"add two numbers");
    let c = PartId::of_bytes(b"multiply two numbers");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.as_hex().len(), 32);
}

#[test]
fn test_local_reference_disambiguates() {
    // Same raw local id under two parts must compare unequal as references.
    let local = LocalPartId::of_bytes(b"x");
    let ra = LocalPartReference {
        part: PartId::of_bytes(b"part a"),
        local: local.clone(),
    };
    let rb = LocalPartReference {
        part: PartId::of_bytes(b"part b"),
        local,
    };
    assert_ne!(ra, rb);
}
