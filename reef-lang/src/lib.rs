// The reef language is a pure, strict, content-addressed expression language.
// Nothing here executes anything: this crate is the data model shared by the
// editor front end, the versioning store and the evaluator.
//
// Everything is a tree and every committed tree is immutable once its id is
// minted, so all types derive the full comparison set plus serde; canonical
// bytes of these types are what ids are hashes of.

mod def;
mod expr;
mod suggestion;

pub use def::{
    PartDefinition, Type, TypeBody, TypeBodyKernel, TypeBodyProductMember, TypeBodySumPattern,
    TypeDefinition,
};
pub use expr::{
    BranchPartDefinition, Condition, ConditionCapture, ConditionTag, EvaluateExprError,
    EvaluatedExpr, Expr, FunctionCall, KernelCall, KernelExpr, LambdaBranch, TagReference,
    TypeError,
};
pub use suggestion::{
    SuggestionBranchPartDefinition, SuggestionExpr, SuggestionFunctionCall, SuggestionIndex,
    SuggestionLambdaBranch,
};
