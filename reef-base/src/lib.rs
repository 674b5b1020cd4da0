mod error;
mod id;

pub use error::{err, Error, Result};
pub use id::{
    CommitHash, LocalPartId, LocalPartReference, PartId, SnapshotHash, TagId, TypeId,
};
