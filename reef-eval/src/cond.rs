// Branch-condition matching. This is the selection half of lambda
// reduction: given a reduced scrutinee, find the first branch whose
// condition structurally matches and collect the bindings it introduces.
// The substitution half (reducing the selected body under those bindings)
// is what Expr::Lambda evaluation is still missing.

use reef_base::LocalPartId;
use reef_lang::{Condition, EvaluateExprError, EvaluatedExpr, LambdaBranch, TypeError};

/// Bindings introduced by a successful match, in condition order.
pub type Bindings = Vec<(LocalPartId, EvaluatedExpr)>;

/// Test one condition against a reduced value. None means no match; Some
/// carries the captured bindings (empty for Any/Int32/ByTag).
pub fn match_condition(condition: &Condition, scrutinee: &EvaluatedExpr) -> Option<Bindings> {
    match condition {
        Condition::Any => Some(Vec::new()),
        Condition::ByCapture(capture) => Some(vec![(
            capture.local_part_id.clone(),
            scrutinee.clone(),
        )]),
        Condition::Int32(expected) => match scrutinee {
            EvaluatedExpr::Int32(actual) if actual == expected => Some(Vec::new()),
            _ => None,
        },
        Condition::ByTag(condition_tag) => match scrutinee {
            EvaluatedExpr::TagReference(tag) if tag.tag == condition_tag.tag => {
                match &condition_tag.parameter {
                    None => Some(Vec::new()),
                    // The parameter condition recursively matches the tag's
                    // carried payload. A reduced TagReference carries no
                    // payload in this version, so there is nothing for the
                    // sub-condition to match against.
                    Some(_) => None,
                }
            }
            _ => None,
        },
    }
}

/// Try branches in declaration order; first structural match wins. No match
/// is a type error: the type checker is expected to have proven coverage,
/// so arriving here with an unmatched value means the input was not checked.
pub fn select_branch<'b>(
    branches: &'b [LambdaBranch],
    scrutinee: &EvaluatedExpr,
) -> Result<(&'b LambdaBranch, Bindings), EvaluateExprError> {
    for branch in branches {
        if let Some(bindings) = match_condition(&branch.condition, scrutinee) {
            return Ok((branch, bindings));
        }
    }
    Err(EvaluateExprError::TypeError(TypeError::new(
        "non-exhaustive match",
    )))
}
