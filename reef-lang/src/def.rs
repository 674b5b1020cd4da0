use reef_base::TypeId;
use serde::{Deserialize, Serialize};

use crate::expr::Expr;

/// The definition of a part: a named, typed, content-addressed function or
/// value. `expr` is None while the part is declared but not yet written;
/// evaluating a reference to such a part reports it rather than failing the
/// whole pass.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct PartDefinition {
    pub name: String,
    pub description: String,
    pub ty: Type,
    pub expr: Option<Expr>,
}

/// A type expression: a reference to a type definition, applied to zero or
/// more type parameters. Checking these is the type checker's business; the
/// evaluator assumes checked input.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Type {
    pub reference: TypeId,
    pub parameter: Vec<Type>,
}

impl Type {
    pub fn plain(reference: TypeId) -> Self {
        Type {
            reference,
            parameter: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub name: String,
    pub description: String,
    pub body: TypeBody,
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum TypeBody {
    Product(Vec<TypeBodyProductMember>),
    Sum(Vec<TypeBodySumPattern>),
    Kernel(TypeBodyKernel),
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TypeBodyProductMember {
    pub name: String,
    pub description: String,
    pub member_type: TypeId,
}

/// One tag of a sum type, optionally carrying a payload type.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TypeBodySumPattern {
    pub name: String,
    pub description: String,
    pub parameter: Option<TypeId>,
}

/// Types the language cannot define for itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum TypeBodyKernel {
    Function,
    Int32,
    List,
}
