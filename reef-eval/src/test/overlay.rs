use reef_lang::{
    EvaluateExprError, EvaluatedExpr, Expr, SuggestionExpr, SuggestionIndex,
};
use test_log::test;

use crate::test::{add, TestSource};
use crate::{
    evaluate, evaluate_suggestion, Caches, Env, Overlay, OverlayCaches, SuggestionEdit,
};

#[test]
fn test_pending_edit_resolves_by_index() {
    let source = TestSource::new();
    let caches = Caches::new();
    let overlay = Overlay::new(vec![SuggestionEdit {
        part: None,
        expr: SuggestionExpr::Int32Literal(7),
    }]);
    let overlay_caches = OverlayCaches::new();
    let env = Env::with_overlay(&source, &caches, &overlay, &overlay_caches);

    let outcome = evaluate_suggestion(
        &env,
        &SuggestionExpr::SuggestionPartReference(SuggestionIndex(0)),
    );
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(7)));
    assert_eq!(
        outcome.delta.edits.get(&SuggestionIndex(0)),
        Some(&EvaluatedExpr::Int32(7))
    );
    // A new part has no id, so the part shadow stays empty.
    assert!(outcome.delta.parts.is_empty());
}

#[test]
fn test_unknown_index_is_a_type_error() {
    let source = TestSource::new();
    let caches = Caches::new();
    let overlay = Overlay::new(vec![]);
    let overlay_caches = OverlayCaches::new();
    let env = Env::with_overlay(&source, &caches, &overlay, &overlay_caches);

    let outcome = evaluate_suggestion(
        &env,
        &SuggestionExpr::SuggestionPartReference(SuggestionIndex(3)),
    );
    match outcome.result {
        Err(errors) => assert!(matches!(errors[0], EvaluateExprError::TypeError(_))),
        ok => panic!("expected type error, got {:?}", ok),
    }
}

#[test]
fn test_edited_part_resolves_overlay_first() {
    let mut source = TestSource::new();
    let id = source.define("speed limit", Some(Expr::Int32Literal(10)));
    let caches = Caches::new();
    let overlay = Overlay::new(vec![SuggestionEdit {
        part: Some(id.clone()),
        expr: SuggestionExpr::Int32Literal(99),
    }]);
    let overlay_caches = OverlayCaches::new();
    let env = Env::with_overlay(&source, &caches, &overlay, &overlay_caches);

    // In suggestion context the pending edit wins over the stored body.
    let outcome = evaluate_suggestion(&env, &SuggestionExpr::PartReference(id.clone()));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(99)));
    assert_eq!(outcome.delta.parts.get(&id), Some(&EvaluatedExpr::Int32(99)));
    // The store was never consulted for the edited part.
    assert_eq!(source.queries(&id), 0);

    // Base evaluation of the same reference is untouched by the overlay.
    let outcome = evaluate(&env, &Expr::PartReference(id.clone()));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(10)));
}

#[test]
fn test_unedited_part_under_overlay_lands_in_the_shadow_cache() {
    let mut source = TestSource::new();
    let base = source.define("base rate", Some(Expr::Int32Literal(10)));
    let derived = source.define(
        "derived rate",
        Some(add(Expr::PartReference(base.clone()), Expr::Int32Literal(1))),
    );
    let caches = Caches::new();
    let overlay = Overlay::new(vec![SuggestionEdit {
        part: Some(base.clone()),
        expr: SuggestionExpr::Int32Literal(99),
    }]);
    let overlay_caches = OverlayCaches::new();
    let env = Env::with_overlay(&source, &caches, &overlay, &overlay_caches);

    // `derived` is not itself edited, but under the overlay it sees the
    // edited `base`, so its value is suggestion-local and must not be
    // recorded as a base result.
    let outcome = evaluate_suggestion(&env, &SuggestionExpr::PartReference(derived.clone()));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(100)));
    assert_eq!(
        outcome.delta.parts.get(&derived),
        Some(&EvaluatedExpr::Int32(100))
    );

    // Discarding the suggestion: plain evaluation still sees the base store.
    let outcome = evaluate(&env, &Expr::PartReference(derived));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(11)));
}

#[test]
fn test_base_cache_is_readable_under_overlay() {
    let mut source = TestSource::new();
    let id = source.define("cached", Some(Expr::Int32Literal(11)));
    let mut caches = Caches::new();
    caches.parts.insert(id.clone(), EvaluatedExpr::Int32(11));
    let overlay = Overlay::new(vec![]);
    let overlay_caches = OverlayCaches::new();
    let env = Env::with_overlay(&source, &caches, &overlay, &overlay_caches);

    let outcome = evaluate_suggestion(&env, &SuggestionExpr::PartReference(id.clone()));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(11)));
    // Served from the base cache: no store traffic, no new entries.
    assert_eq!(source.queries(&id), 0);
    assert!(outcome.delta.is_empty());
}

#[test]
fn test_overlay_memoization_is_progressive() {
    let mut source = TestSource::new();
    let id = source.define("expensive", Some(Expr::Int32Literal(5)));
    let caches = Caches::new();
    let overlay = Overlay::new(vec![SuggestionEdit {
        part: Some(id.clone()),
        expr: SuggestionExpr::from(add(
            Expr::Int32Literal(2),
            Expr::Int32Literal(3),
        )),
    }]);
    let mut overlay_caches = OverlayCaches::new();

    let env = Env::with_overlay(&source, &caches, &overlay, &overlay_caches);
    let outcome = evaluate_suggestion(&env, &SuggestionExpr::PartReference(id.clone()));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(5)));
    overlay_caches.merge(outcome.delta);

    let env = Env::with_overlay(&source, &caches, &overlay, &overlay_caches);
    let outcome = evaluate_suggestion(&env, &SuggestionExpr::PartReference(id));
    assert_eq!(outcome.result, Ok(EvaluatedExpr::Int32(5)));
    assert!(outcome.delta.is_empty());
}

#[test]
fn test_lifted_expression_evaluates_like_the_original() {
    let mut source = TestSource::new();
    let two = source.define("two", Some(Expr::Int32Literal(2)));
    let expr = add(Expr::PartReference(two), Expr::Int32Literal(40));
    let caches = Caches::new();
    let env = Env::new(&source, &caches);

    let base = evaluate(&env, &expr);
    let suggestion = evaluate_suggestion(&env, &SuggestionExpr::from(expr));
    assert_eq!(base.result, suggestion.result);
}

#[test]
fn test_suggestion_errors_accumulate_like_base_errors() {
    let source = TestSource::new();
    let caches = Caches::new();
    let overlay = Overlay::new(vec![]);
    let overlay_caches = OverlayCaches::new();
    let env = Env::with_overlay(&source, &caches, &overlay, &overlay_caches);

    // Both sides of the call fail: one unknown index, one bare lambda.
    let expr = SuggestionExpr::from(add(Expr::Lambda(vec![]), Expr::Int32Literal(1)));
    let outcome = evaluate_suggestion(&env, &expr);
    match outcome.result {
        Err(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0], EvaluateExprError::NotSupported);
        }
        ok => panic!("expected errors, got {:?}", ok),
    }

    let expr = SuggestionExpr::FunctionCall(reef_lang::SuggestionFunctionCall {
        function: Box::new(SuggestionExpr::SuggestionPartReference(SuggestionIndex(9))),
        parameter: Box::new(SuggestionExpr::SuggestionPartReference(SuggestionIndex(8))),
    });
    let outcome = evaluate_suggestion(&env, &expr);
    match outcome.result {
        Err(errors) => assert_eq!(errors.len(), 2),
        ok => panic!("expected two errors, got {:?}", ok),
    }
}
