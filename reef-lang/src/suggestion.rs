// A suggestion is a proposed edit to one part's expression, evaluated and
// reviewed before anything is committed. Inside a suggestion, an expression
// may reference a sibling pending edit that has no content id yet; those are
// addressed by a small index into the suggestion instead of a hash.

use reef_base::{LocalPartId, LocalPartReference, PartId};
use serde::{Deserialize, Serialize};

use crate::def::Type;
use crate::expr::{
    BranchPartDefinition, Condition, Expr, FunctionCall, KernelExpr, LambdaBranch, TagReference,
};

/// Position of a pending edit within its suggestion.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct SuggestionIndex(pub u32);

impl std::fmt::Display for SuggestionIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// [`Expr`], extended with references into the enclosing suggestion.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum SuggestionExpr {
    Kernel(KernelExpr),
    Int32Literal(i32),
    PartReference(PartId),
    /// A sibling pending edit, addressed by index because it has no hash yet.
    SuggestionPartReference(SuggestionIndex),
    LocalPartReference(LocalPartReference),
    TagReference(TagReference),
    FunctionCall(SuggestionFunctionCall),
    Lambda(Vec<SuggestionLambdaBranch>),
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct SuggestionFunctionCall {
    pub function: Box<SuggestionExpr>,
    pub parameter: Box<SuggestionExpr>,
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct SuggestionLambdaBranch {
    pub condition: Condition,
    pub description: String,
    pub local_parts: Vec<SuggestionBranchPartDefinition>,
    pub expr: Option<SuggestionExpr>,
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct SuggestionBranchPartDefinition {
    pub local_part_id: LocalPartId,
    pub name: String,
    pub description: String,
    pub ty: Type,
    pub expr: SuggestionExpr,
}

// Lifting a committed expression into suggestion space is total: committed
// code never contains suggestion-index references.

impl From<Expr> for SuggestionExpr {
    fn from(expr: Expr) -> SuggestionExpr {
        match expr {
            Expr::Kernel(kernel) => SuggestionExpr::Kernel(kernel),
            Expr::Int32Literal(int32) => SuggestionExpr::Int32Literal(int32),
            Expr::PartReference(part_id) => SuggestionExpr::PartReference(part_id),
            Expr::LocalPartReference(reference) => SuggestionExpr::LocalPartReference(reference),
            Expr::TagReference(tag) => SuggestionExpr::TagReference(tag),
            Expr::FunctionCall(call) => SuggestionExpr::FunctionCall(SuggestionFunctionCall {
                function: Box::new((*call.function).into()),
                parameter: Box::new((*call.parameter).into()),
            }),
            Expr::Lambda(branches) => {
                SuggestionExpr::Lambda(branches.into_iter().map(Into::into).collect())
            }
        }
    }
}

impl From<LambdaBranch> for SuggestionLambdaBranch {
    fn from(branch: LambdaBranch) -> SuggestionLambdaBranch {
        SuggestionLambdaBranch {
            condition: branch.condition,
            description: branch.description,
            local_parts: branch.local_parts.into_iter().map(Into::into).collect(),
            expr: branch.expr.map(Into::into),
        }
    }
}

impl From<BranchPartDefinition> for SuggestionBranchPartDefinition {
    fn from(part: BranchPartDefinition) -> SuggestionBranchPartDefinition {
        SuggestionBranchPartDefinition {
            local_part_id: part.local_part_id,
            name: part.name,
            description: part.description,
            ty: part.ty,
            expr: part.expr.into(),
        }
    }
}

impl From<FunctionCall> for SuggestionFunctionCall {
    fn from(call: FunctionCall) -> SuggestionFunctionCall {
        SuggestionFunctionCall {
            function: Box::new((*call.function).into()),
            parameter: Box::new((*call.parameter).into()),
        }
    }
}
