use reef_base::{LocalPartId, LocalPartReference, PartId, TagId, TypeId};
use serde::{Deserialize, Serialize};

use crate::def::Type;

/// A built-in operation the language itself cannot express. All kernels are
/// binary and applied one argument at a time, left to right; the intermediate
/// one-argument state is [`KernelCall`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum KernelExpr {
    Int32Add,
    Int32Sub,
    Int32Mul,
}

/// An un-reduced expression. Expressions reference other definitions by
/// content id, so a well-formed store can never contain a cycle: an id cannot
/// depend on itself.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Expr {
    Kernel(KernelExpr),
    Int32Literal(i32),
    PartReference(PartId),
    LocalPartReference(LocalPartReference),
    TagReference(TagReference),
    FunctionCall(FunctionCall),
    Lambda(Vec<LambdaBranch>),
}

/// Reference to one tag of a sum type. Compared only for equality, during
/// condition matching.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TagReference {
    pub type_id: TypeId,
    pub tag: TagId,
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct FunctionCall {
    pub function: Box<Expr>,
    pub parameter: Box<Expr>,
}

/// A fully (or, for KernelCall, partially) reduced value.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum EvaluatedExpr {
    Kernel(KernelExpr),
    Int32(i32),
    TagReference(TagReference),
    Lambda(Vec<LambdaBranch>),
    KernelCall(KernelCall),
}

/// A curried kernel holding exactly one captured operand. Applying it to a
/// second operand completes the operation.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct KernelCall {
    pub kernel: KernelExpr,
    pub expr: Box<EvaluatedExpr>,
}

/// One arm of a pattern match. Branches are tried in declaration order and
/// the first structural match wins. `expr` is None while the arm is still
/// being edited.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct LambdaBranch {
    pub condition: Condition,
    pub description: String,
    pub local_parts: Vec<BranchPartDefinition>,
    pub expr: Option<Expr>,
}

/// A binding usable inside one lambda branch.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct BranchPartDefinition {
    pub local_part_id: LocalPartId,
    pub name: String,
    pub description: String,
    pub ty: Type,
    pub expr: Expr,
}

/// The pattern a branch tests its input against.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Condition {
    ByTag(ConditionTag),
    ByCapture(ConditionCapture),
    Any,
    Int32(i32),
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ConditionTag {
    pub tag: TagId,
    /// Recursively matched against the tag's carried payload, when present.
    pub parameter: Option<Box<Condition>>,
}

/// Matches anything, binding the scrutinee under `local_part_id` (displayed
/// to users as `name`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ConditionCapture {
    pub name: String,
    pub local_part_id: LocalPartId,
}

/// A diagnostic produced by evaluation. These are values, not process errors;
/// one evaluation can produce several of them (see reef-eval) and a UI is
/// expected to show all of them at once.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum EvaluateExprError {
    /// The store has no part with this id at all.
    NeedPartDefinition(PartId),
    /// The part exists but its body has not been written yet.
    PartExprIsNothing(PartId),
    CannotFindLocalPartDefinition(LocalPartReference),
    TypeError(TypeError),
    /// Evaluating a lambda as a value is not supported in this version.
    NotSupported,
}

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TypeError {
    pub message: String,
}

impl TypeError {
    pub fn new(message: impl Into<String>) -> Self {
        TypeError {
            message: message.into(),
        }
    }
}

// Compact one-line renderings, used by diagnostics and the demo binary.
// λ-branches render as `{-description-}condition → body`, with `□` standing
// in for a body that has not been written yet.

impl std::fmt::Display for KernelExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelExpr::Int32Add => write!(f, "+"),
            KernelExpr::Int32Sub => write!(f, "-"),
            KernelExpr::Int32Mul => write!(f, "*"),
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Kernel(kernel) => write!(f, "{}", kernel),
            Expr::Int32Literal(int32) => write!(f, "{}", int32),
            Expr::PartReference(part_id) => write!(f, "[part {}]", part_id),
            Expr::LocalPartReference(reference) => write!(f, "[local {}]", reference),
            Expr::TagReference(tag) => write!(f, "[tag {}/{}]", tag.type_id, tag.tag),
            Expr::FunctionCall(call) => write!(f, "({} {})", call.function, call.parameter),
            Expr::Lambda(branches) => {
                write!(f, "λ(")?;
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", branch)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl std::fmt::Display for EvaluatedExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluatedExpr::Kernel(kernel) => write!(f, "{}", kernel),
            EvaluatedExpr::Int32(int32) => write!(f, "{}", int32),
            EvaluatedExpr::TagReference(tag) => write!(f, "[tag {}/{}]", tag.type_id, tag.tag),
            EvaluatedExpr::Lambda(branches) => {
                write!(f, "λ(")?;
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", branch)?;
                }
                write!(f, ")")
            }
            EvaluatedExpr::KernelCall(call) => write!(f, "({} {})", call.kernel, call.expr),
        }
    }
}

impl std::fmt::Display for LambdaBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.description.is_empty() {
            write!(f, "{{-{}-}}", self.description)?;
        }
        write!(f, "{} → ", self.condition)?;
        match &self.expr {
            Some(expr) => write!(f, "{}", expr),
            None => write!(f, "□"),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::ByTag(tag) => {
                write!(f, "#{}", tag.tag)?;
                match &tag.parameter {
                    Some(parameter) => write!(f, "({})", parameter),
                    None => Ok(()),
                }
            }
            Condition::ByCapture(capture) => {
                write!(f, "{}({})", capture.name, capture.local_part_id)
            }
            Condition::Any => write!(f, "_"),
            Condition::Int32(int32) => write!(f, "{}", int32),
        }
    }
}

impl std::fmt::Display for EvaluateExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluateExprError::NeedPartDefinition(part_id) => {
                write!(f, "need definition of part {}", part_id)
            }
            EvaluateExprError::PartExprIsNothing(part_id) => {
                write!(f, "part {} has no expression yet", part_id)
            }
            EvaluateExprError::CannotFindLocalPartDefinition(reference) => {
                write!(f, "cannot find local part {}", reference)
            }
            EvaluateExprError::TypeError(type_error) => {
                write!(f, "type error: {}", type_error.message)
            }
            EvaluateExprError::NotSupported => write!(f, "not supported"),
        }
    }
}
