use std::cell::RefCell;
use std::collections::BTreeMap;

use reef_base::{LocalPartId, LocalPartReference, PartId, TagId, TypeId};
use reef_lang::{
    EvaluateExprError, EvaluatedExpr, Expr, FunctionCall, KernelExpr, TagReference,
};
use test_log::test;

use crate::{evaluate, Caches, DefSource, Env, PartView};

pub(crate) mod overlay;

/// In-memory definition source with a query counter, so tests can observe
/// whether the memo layer actually short-circuits store traffic.
pub(crate) struct TestSource {
    parts: BTreeMap<PartId, Option<Expr>>,
    locals: BTreeMap<LocalPartReference, Expr>,
    part_queries: RefCell<BTreeMap<PartId, usize>>,
}

impl TestSource {
    pub(crate) fn new() -> Self {
        TestSource {
            parts: BTreeMap::new(),
            locals: BTreeMap::new(),
            part_queries: RefCell::new(BTreeMap::new()),
        }
    }

    pub(crate) fn define(&mut self, name: &str, body: Option<Expr>) -> PartId {
        let id = PartId::of_bytes(name.as_bytes());
        self.parts.insert(id.clone(), body);
        id
    }

    pub(crate) fn define_local(&mut self, reference: LocalPartReference, body: Expr) {
        self.locals.insert(reference, body);
    }

    pub(crate) fn queries(&self, id: &PartId) -> usize {
        self.part_queries.borrow().get(id).copied().unwrap_or(0)
    }
}

impl DefSource for TestSource {
    fn lookup_part(&self, id: &PartId) -> Option<PartView> {
        *self
            .part_queries
            .borrow_mut()
            .entry(id.clone())
            .or_insert(0) += 1;
        self.parts.get(id).map(|body| PartView { body: body.clone() })
    }

    fn lookup_local_part(&self, reference: &LocalPartReference) -> Option<Expr> {
        self.locals.get(reference).cloned()
    }
}

pub(crate) fn call(function: Expr, parameter: Expr) -> Expr {
    Expr::FunctionCall(FunctionCall {
        function: Box::new(function),
        parameter: Box::new(parameter),
    })
}

pub(crate) fn add(first: Expr, second: Expr) -> Expr {
    call(call(Expr::Kernel(KernelExpr::Int32Add), first), second)
}

pub(crate) fn bool_true_tag() -> TagReference {
    TagReference {
        type_id: TypeId::of_bytes(b"bool"),
        tag: TagId::of_bytes(b"true"),
    }
}

#[test]
fn test_leaves_are_self_valued() {
    let source = TestSource::new();
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let outcome = evaluate(&env, &Expr::Int32Literal(12));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(12)));
    assert!(outcome.delta.is_empty());

    let outcome = evaluate(&env, &Expr::Kernel(KernelExpr::Int32Mul));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Kernel(KernelExpr::Int32Mul)));
    assert!(outcome.delta.is_empty());

    let tag = bool_true_tag();
    let outcome = evaluate(&env, &Expr::TagReference(tag.clone()));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::TagReference(tag)));
}

#[test]
fn test_curried_kernel_application() {
    let source = TestSource::new();
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let outcome = evaluate(&env, &add(Expr::Int32Literal(2), Expr::Int32Literal(3)));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(5)));

    // A single application is a partial application, not an error.
    let outcome = evaluate(
        &env,
        &call(Expr::Kernel(KernelExpr::Int32Sub), Expr::Int32Literal(7)),
    );
    match outcome.result {
        Ok(EvaluatedExpr::KernelCall(kernel_call)) => {
            assert_eq!(kernel_call.kernel, KernelExpr::Int32Sub);
            assert_eq!(*kernel_call.expr, EvaluatedExpr::Int32(7));
        }
        other => panic!("expected partial application, got {:?}", other),
    }
}

#[test]
fn test_kernel_arithmetic_wraps() {
    let source = TestSource::new();
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let outcome = evaluate(
        &env,
        &add(Expr::Int32Literal(i32::MAX), Expr::Int32Literal(1)),
    );
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(i32::MIN)));

    let outcome = evaluate(
        &env,
        &call(
            call(Expr::Kernel(KernelExpr::Int32Mul), Expr::Int32Literal(i32::MIN)),
            Expr::Int32Literal(-1),
        ),
    );
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(i32::MIN)));
}

#[test]
fn test_kernel_requires_integer_operands() {
    let source = TestSource::new();
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let outcome = evaluate(
        &env,
        &add(Expr::Int32Literal(1), Expr::TagReference(bool_true_tag())),
    );
    match outcome.result {
        Err(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(matches!(errors[0], EvaluateExprError::TypeError(_)));
        }
        ok => panic!("expected type error, got {:?}", ok),
    }
}

#[test]
fn test_only_kernels_are_callable() {
    let source = TestSource::new();
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let outcome = evaluate(&env, &call(Expr::Int32Literal(1), Expr::Int32Literal(2)));
    match outcome.result {
        Err(errors) => assert!(matches!(errors[0], EvaluateExprError::TypeError(_))),
        ok => panic!("expected type error, got {:?}", ok),
    }
}

#[test]
fn test_bare_lambda_is_not_supported() {
    let source = TestSource::new();
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let outcome = evaluate(&env, &Expr::Lambda(vec![]));
    assert_eq!(outcome.result, Err(vec![EvaluateExprError::NotSupported]));
}

#[test]
fn test_missing_part_reference() {
    let source = TestSource::new();
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let unknown = PartId::of_bytes(b"never defined");
    let outcome = evaluate(&env, &Expr::PartReference(unknown.clone()));
    assert_eq!(
        outcome.result,
        Err(vec![EvaluateExprError::NeedPartDefinition(unknown)])
    );
    assert!(outcome.delta.is_empty());
}

#[test]
fn test_declared_part_without_body() {
    let mut source = TestSource::new();
    let id = source.define("declared only", None);
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let outcome = evaluate(&env, &Expr::PartReference(id.clone()));
    assert_eq!(
        outcome.result,
        Err(vec![EvaluateExprError::PartExprIsNothing(id)])
    );
}

#[test]
fn test_multi_error_accumulation_in_call_order() {
    let source = TestSource::new();
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let missing_function = PartId::of_bytes(b"missing function");
    let missing_parameter = PartId::of_bytes(b"missing parameter");
    let outcome = evaluate(
        &env,
        &call(
            Expr::PartReference(missing_function.clone()),
            Expr::PartReference(missing_parameter.clone()),
        ),
    );
    assert_eq!(
        outcome.result,
        Err(vec![
            EvaluateExprError::NeedPartDefinition(missing_function),
            EvaluateExprError::NeedPartDefinition(missing_parameter),
        ])
    );
}

#[test]
fn test_part_resolution_memoizes_transitively() {
    let mut source = TestSource::new();
    let two = source.define("two", Some(Expr::Int32Literal(2)));
    let three_more = source.define(
        "three more",
        Some(add(Expr::PartReference(two.clone()), Expr::Int32Literal(3))),
    );
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let outcome = evaluate(&env, &Expr::PartReference(three_more.clone()));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(5)));
    assert_eq!(outcome.delta.parts.get(&two), Some(&EvaluatedExpr::Int32(2)));
    assert_eq!(
        outcome.delta.parts.get(&three_more),
        Some(&EvaluatedExpr::Int32(5))
    );
}

#[test]
fn test_cache_hit_skips_the_store() {
    let mut source = TestSource::new();
    let id = source.define("answer", Some(Expr::Int32Literal(42)));
    let mut caches = Caches::new();

    let env = Env::new(&source, &caches);
    let outcome = evaluate(&env, &Expr::PartReference(id.clone()));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(42)));
    assert_eq!(source.queries(&id), 1);

    caches.merge(outcome.delta);
    let env = Env::new(&source, &caches);
    let outcome = evaluate(&env, &Expr::PartReference(id.clone()));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(42)));
    assert!(outcome.delta.is_empty());
    assert_eq!(source.queries(&id), 1);
}

#[test]
fn test_parameter_reuses_function_side_discoveries() {
    let mut source = TestSource::new();
    let id = source.define("shared", Some(Expr::Int32Literal(21)));
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    // The same part appears on both sides of the call; the function side
    // resolves it and the parameter side must hit the in-flight delta.
    let outcome = evaluate(
        &env,
        &add(
            Expr::PartReference(id.clone()),
            Expr::PartReference(id.clone()),
        ),
    );
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(42)));
    assert_eq!(source.queries(&id), 1);
}

#[test]
fn test_evaluation_is_deterministic() {
    let mut source = TestSource::new();
    let two = source.define("two", Some(Expr::Int32Literal(2)));
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let expr = add(Expr::PartReference(two), Expr::Int32Literal(40));
    let first = evaluate(&env, &expr);
    let second = evaluate(&env, &expr);
    assert_eq!(first, second);
}

#[test]
fn test_merge_is_monotone() {
    let id = PartId::of_bytes(b"fixed");
    let mut caches = Caches::new();
    caches.parts.insert(id.clone(), EvaluatedExpr::Int32(1));

    let mut delta = Caches::new();
    delta.parts.insert(id.clone(), EvaluatedExpr::Int32(2));
    caches.merge(delta);

    // An existing entry is never replaced.
    assert_eq!(caches.parts.get(&id), Some(&EvaluatedExpr::Int32(1)));
}

#[test]
fn test_local_and_global_tiers_do_not_collide() {
    let mut source = TestSource::new();
    let enclosing = source.define("enclosing", Some(Expr::Int32Literal(0)));
    // A local id sharing its raw hex with an (absent) global part id.
    let shared_hex = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    let reference = LocalPartReference {
        part: enclosing,
        local: LocalPartId::from_hex(shared_hex),
    };
    source.define_local(reference.clone(), Expr::Int32Literal(7));

    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let outcome = evaluate(&env, &Expr::LocalPartReference(reference.clone()));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(7)));
    assert_eq!(
        outcome.delta.locals.get(&reference),
        Some(&EvaluatedExpr::Int32(7))
    );
    // The local tier fills in; the global tier stays empty.
    assert!(outcome.delta.parts.is_empty());

    // And the same raw hex as a global part id still resolves nowhere.
    let global = PartId::from_hex(shared_hex);
    let outcome = evaluate(&env, &Expr::PartReference(global.clone()));
    assert_eq!(
        outcome.result,
        Err(vec![EvaluateExprError::NeedPartDefinition(global)])
    );
}

#[test]
fn test_missing_local_reference() {
    let source = TestSource::new();
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let reference = LocalPartReference {
        part: PartId::of_bytes(b"some part"),
        local: LocalPartId::of_bytes(b"x"),
    };
    let outcome = evaluate(&env, &Expr::LocalPartReference(reference.clone()));
    assert_eq!(
        outcome.result,
        Err(vec![EvaluateExprError::CannotFindLocalPartDefinition(
            reference
        )])
    );
}

#[test]
fn test_failed_reductions_are_not_memoized() {
    let mut source = TestSource::new();
    let missing = PartId::of_bytes(b"hole");
    let id = source.define(
        "depends on hole",
        Some(add(
            Expr::PartReference(missing.clone()),
            Expr::Int32Literal(1),
        )),
    );
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let outcome = evaluate(&env, &Expr::PartReference(id.clone()));
    assert_eq!(
        outcome.result,
        Err(vec![EvaluateExprError::NeedPartDefinition(missing)])
    );
    // Neither the failing part nor anything else was cached.
    assert!(outcome.delta.is_empty());
}
