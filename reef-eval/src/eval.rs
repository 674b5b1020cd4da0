// The reduction algorithm. Strict, depth-first, call-by-value: leaves are
// self-valued, references resolve through the caches then the store, and a
// function call evaluates its function first so the parameter evaluation can
// reuse whatever that memoized. Failures accumulate instead of short-
// circuiting across the two sides of a call; single-operand positions return
// the first failure alone.

use tracing::trace;

use reef_base::{LocalPartReference, PartId};
use reef_lang::{
    EvaluateExprError, EvaluatedExpr, Expr, FunctionCall, KernelCall, KernelExpr, SuggestionExpr,
    SuggestionFunctionCall, SuggestionIndex, TypeError,
};

use crate::env::{Caches, Env, OverlayCaches};
use crate::store::{DefSource, PartView};

/// Either a reduced value or every diagnostic the pass could locate. The
/// error list is nonempty by construction: every failing path starts from a
/// singleton and lists only ever concatenate.
pub type EvalResult = Result<EvaluatedExpr, Vec<EvaluateExprError>>;

/// Result of one [`evaluate`] call: the reduction outcome plus the cache
/// entries discovered on the way. Callers merge the delta into their
/// environment so the next call starts warmer.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Outcome {
    pub result: EvalResult,
    pub delta: Caches,
}

/// Result of one [`evaluate_suggestion`] call. The delta is overlay-side
/// only: nothing computed while the overlay was visible may touch the base
/// caches, so discarding the suggestion discards exactly this.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SuggestionOutcome {
    pub result: EvalResult,
    pub delta: OverlayCaches,
}

/// Reduce a committed expression against the environment. Any overlay in the
/// environment is ignored: committed code never sees pending edits.
pub fn evaluate<S: DefSource>(env: &Env<'_, S>, expr: &Expr) -> Outcome {
    let mut session = Session::new(env);
    let result = session.eval(expr);
    Outcome {
        result,
        delta: session.delta,
    }
}

/// Reduce a suggestion expression. Part resolution is overlay-first: a part
/// whose definition the suggestion edits resolves to the pending edit, and
/// everything else falls through to the base caches and store, read-only.
pub fn evaluate_suggestion<S: DefSource>(
    env: &Env<'_, S>,
    expr: &SuggestionExpr,
) -> SuggestionOutcome {
    let mut session = Session::new(env);
    let result = session.eval_suggestion(expr);
    SuggestionOutcome {
        result,
        delta: session.overlay_delta,
    }
}

struct Session<'a, 's, S: DefSource> {
    env: &'a Env<'s, S>,
    /// Base entries discovered by this call. Only [`Session::eval`] paths
    /// write here.
    delta: Caches,
    /// Overlay entries discovered by this call. Only suggestion paths write
    /// here.
    overlay_delta: OverlayCaches,
}

impl<'a, 's, S: DefSource> Session<'a, 's, S> {
    fn new(env: &'a Env<'s, S>) -> Self {
        Session {
            env,
            delta: Caches::new(),
            overlay_delta: OverlayCaches::new(),
        }
    }

    // Base context.

    fn eval(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Kernel(kernel) => Ok(EvaluatedExpr::Kernel(*kernel)),
            Expr::Int32Literal(int32) => Ok(EvaluatedExpr::Int32(*int32)),
            Expr::TagReference(tag) => Ok(EvaluatedExpr::TagReference(tag.clone())),
            Expr::PartReference(id) => self.eval_part_reference(id),
            Expr::LocalPartReference(reference) => self.eval_local_reference(reference),
            Expr::FunctionCall(call) => self.eval_function_call(call),
            // Evaluating a lambda as a value needs branch selection plus
            // substitution of captured bindings; see select_branch for the
            // matching half. Not implemented in this version.
            Expr::Lambda(_) => Err(vec![EvaluateExprError::NotSupported]),
        }
    }

    fn eval_part_reference(&mut self, id: &PartId) -> EvalResult {
        if let Some(value) = self
            .delta
            .parts
            .get(id)
            .or_else(|| self.env.caches.parts.get(id))
        {
            trace!(target: "reef", part = %id, "part cache hit");
            return Ok(value.clone());
        }
        trace!(target: "reef", part = %id, "part cache miss, consulting store");
        match self.env.store.lookup_part(id) {
            Some(PartView { body: Some(expr) }) => {
                let result = self.eval(&expr);
                // Success only: a failed reduction must be retried once the
                // store or environment changes, so it is never memoized.
                if let Ok(value) = &result {
                    self.delta.parts.insert(id.clone(), value.clone());
                }
                result
            }
            Some(PartView { body: None }) => {
                Err(vec![EvaluateExprError::PartExprIsNothing(id.clone())])
            }
            None => Err(vec![EvaluateExprError::NeedPartDefinition(id.clone())]),
        }
    }

    fn eval_local_reference(&mut self, reference: &LocalPartReference) -> EvalResult {
        if let Some(value) = self
            .delta
            .locals
            .get(reference)
            .or_else(|| self.env.caches.locals.get(reference))
        {
            trace!(target: "reef", local = %reference, "local cache hit");
            return Ok(value.clone());
        }
        match self.env.store.lookup_local_part(reference) {
            Some(expr) => {
                let result = self.eval(&expr);
                if let Ok(value) = &result {
                    self.delta.locals.insert(reference.clone(), value.clone());
                }
                result
            }
            None => Err(vec![EvaluateExprError::CannotFindLocalPartDefinition(
                reference.clone(),
            )]),
        }
    }

    fn eval_function_call(&mut self, call: &FunctionCall) -> EvalResult {
        // Function first; its discoveries are already in self.delta when the
        // parameter runs, so shared references reduce once.
        let function = self.eval(&call.function);
        let parameter = self.eval(&call.parameter);
        match (function, parameter) {
            (Ok(function), Ok(parameter)) => apply(function, parameter),
            (function, parameter) => Err(concat_errors(function, parameter)),
        }
    }

    // Suggestion context. Mirrors the base context but resolves parts
    // overlay-first and records every discovery on the overlay side.

    fn eval_suggestion(&mut self, expr: &SuggestionExpr) -> EvalResult {
        match expr {
            SuggestionExpr::Kernel(kernel) => Ok(EvaluatedExpr::Kernel(*kernel)),
            SuggestionExpr::Int32Literal(int32) => Ok(EvaluatedExpr::Int32(*int32)),
            SuggestionExpr::TagReference(tag) => Ok(EvaluatedExpr::TagReference(tag.clone())),
            SuggestionExpr::PartReference(id) => self.suggestion_part_reference(id),
            SuggestionExpr::SuggestionPartReference(index) => {
                self.suggestion_index_reference(*index)
            }
            SuggestionExpr::LocalPartReference(reference) => {
                self.suggestion_local_reference(reference)
            }
            SuggestionExpr::FunctionCall(call) => self.suggestion_function_call(call),
            SuggestionExpr::Lambda(_) => Err(vec![EvaluateExprError::NotSupported]),
        }
    }

    fn suggestion_part_reference(&mut self, id: &PartId) -> EvalResult {
        // Overlay wins: is this part's own definition being edited?
        if let Some(index) = self
            .env
            .overlay
            .and_then(|overlay_env| overlay_env.overlay.edit_of_part(id))
        {
            trace!(target: "reef", part = %id, index = index.0, "part is edited by suggestion");
            return self.suggestion_index_reference(index);
        }
        if let Some(value) = self.overlay_cached_part(id) {
            return Ok(value);
        }
        // Unedited part: read the base caches, fall through to the store.
        // The body still reduces in suggestion context (it may reference
        // edited parts), so the result lands in the overlay delta, never in
        // the base caches.
        if let Some(value) = self.env.caches.parts.get(id) {
            trace!(target: "reef", part = %id, "base cache hit under overlay");
            return Ok(value.clone());
        }
        match self.env.store.lookup_part(id) {
            Some(PartView { body: Some(expr) }) => {
                let result = self.eval_suggestion(&SuggestionExpr::from(expr));
                if let Ok(value) = &result {
                    self.overlay_delta.parts.insert(id.clone(), value.clone());
                }
                result
            }
            Some(PartView { body: None }) => {
                Err(vec![EvaluateExprError::PartExprIsNothing(id.clone())])
            }
            None => Err(vec![EvaluateExprError::NeedPartDefinition(id.clone())]),
        }
    }

    fn suggestion_index_reference(&mut self, index: SuggestionIndex) -> EvalResult {
        if let Some(value) = self
            .overlay_delta
            .edits
            .get(&index)
            .cloned()
            .or_else(|| self.overlay_env_cached_edit(index))
        {
            trace!(target: "reef", index = index.0, "suggestion cache hit");
            return Ok(value);
        }
        let edit = self
            .env
            .overlay
            .and_then(|overlay_env| overlay_env.overlay.edit(index).cloned());
        match edit {
            Some(edit) => {
                let result = self.eval_suggestion(&edit.expr);
                if let Ok(value) = &result {
                    self.overlay_delta.edits.insert(index, value.clone());
                    // An edit of an existing part also shadows that part for
                    // the rest of the suggestion evaluation.
                    if let Some(id) = &edit.part {
                        self.overlay_delta.parts.insert(id.clone(), value.clone());
                    }
                }
                result
            }
            None => Err(vec![EvaluateExprError::TypeError(TypeError::new(format!(
                "suggestion has no pending edit {}",
                index
            )))]),
        }
    }

    fn suggestion_local_reference(&mut self, reference: &LocalPartReference) -> EvalResult {
        if let Some(value) = self
            .overlay_delta
            .locals
            .get(reference)
            .cloned()
            .or_else(|| {
                self.env
                    .overlay
                    .and_then(|overlay_env| overlay_env.caches.locals.get(reference).cloned())
            })
        {
            return Ok(value);
        }
        if let Some(value) = self.env.caches.locals.get(reference) {
            return Ok(value.clone());
        }
        match self.env.store.lookup_local_part(reference) {
            Some(expr) => {
                let result = self.eval_suggestion(&SuggestionExpr::from(expr));
                if let Ok(value) = &result {
                    self.overlay_delta
                        .locals
                        .insert(reference.clone(), value.clone());
                }
                result
            }
            None => Err(vec![EvaluateExprError::CannotFindLocalPartDefinition(
                reference.clone(),
            )]),
        }
    }

    fn suggestion_function_call(&mut self, call: &SuggestionFunctionCall) -> EvalResult {
        let function = self.eval_suggestion(&call.function);
        let parameter = self.eval_suggestion(&call.parameter);
        match (function, parameter) {
            (Ok(function), Ok(parameter)) => apply(function, parameter),
            (function, parameter) => Err(concat_errors(function, parameter)),
        }
    }

    fn overlay_cached_part(&self, id: &PartId) -> Option<EvaluatedExpr> {
        self.overlay_delta.parts.get(id).cloned().or_else(|| {
            self.env
                .overlay
                .and_then(|overlay_env| overlay_env.caches.parts.get(id).cloned())
        })
    }

    fn overlay_env_cached_edit(&self, index: SuggestionIndex) -> Option<EvaluatedExpr> {
        self.env
            .overlay
            .and_then(|overlay_env| overlay_env.caches.edits.get(&index).cloned())
    }
}

/// Apply a reduced value to a reduced argument. Only kernels are callable:
/// a bare kernel captures its first operand, a one-operand kernel call
/// completes. Lambdas never reach here (they fail reduction earlier) and
/// every other value kind is a type error.
fn apply(function: EvaluatedExpr, parameter: EvaluatedExpr) -> EvalResult {
    match function {
        EvaluatedExpr::Kernel(kernel) => Ok(EvaluatedExpr::KernelCall(KernelCall {
            kernel,
            expr: Box::new(parameter),
        })),
        EvaluatedExpr::KernelCall(call) => kernel_binary(call.kernel, *call.expr, parameter),
        _ => Err(vec![EvaluateExprError::TypeError(TypeError::new(
            "only kernels and partial kernel calls can be applied",
        ))]),
    }
}

fn kernel_binary(kernel: KernelExpr, first: EvaluatedExpr, second: EvaluatedExpr) -> EvalResult {
    match (first, second) {
        (EvaluatedExpr::Int32(first), EvaluatedExpr::Int32(second)) => {
            // Native 32-bit signed semantics: overflow wraps.
            let value = match kernel {
                KernelExpr::Int32Add => first.wrapping_add(second),
                KernelExpr::Int32Sub => first.wrapping_sub(second),
                KernelExpr::Int32Mul => first.wrapping_mul(second),
            };
            Ok(EvaluatedExpr::Int32(value))
        }
        _ => Err(vec![EvaluateExprError::TypeError(TypeError::new(format!(
            "{:?} requires integer operands",
            kernel
        )))]),
    }
}

fn concat_errors(function: EvalResult, parameter: EvalResult) -> Vec<EvaluateExprError> {
    let mut errors = Vec::new();
    if let Err(mut function_errors) = function {
        errors.append(&mut function_errors);
    }
    if let Err(mut parameter_errors) = parameter {
        errors.append(&mut parameter_errors);
    }
    errors
}
