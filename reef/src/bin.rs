// Stand up a tiny project in memory, evaluate something through the store,
// then evaluate a speculative edit of one of its parts. Illustrative only.

use reef::System;
use reef_base::Result;
use reef_base::TypeId;
use reef_eval::{Overlay, OverlayCaches, SuggestionEdit};
use reef_lang::{
    Expr, FunctionCall, KernelExpr, PartDefinition, SuggestionExpr, Type,
};

fn call(function: Expr, parameter: Expr) -> Expr {
    Expr::FunctionCall(FunctionCall {
        function: Box::new(function),
        parameter: Box::new(parameter),
    })
}

fn main() -> Result<()> {
    let mut system = System::new();
    let int32 = Type::plain(TypeId::of_bytes(b"int32"));

    let six = system.store_mut().insert_part(PartDefinition {
        name: "six".to_string(),
        description: "half the answer, roughly".to_string(),
        ty: int32.clone(),
        expr: Some(Expr::Int32Literal(6)),
    })?;
    let seven = system.store_mut().insert_part(PartDefinition {
        name: "seven".to_string(),
        description: String::new(),
        ty: int32.clone(),
        expr: Some(Expr::Int32Literal(7)),
    })?;
    let answer = system.store_mut().insert_part(PartDefinition {
        name: "answer".to_string(),
        description: String::new(),
        ty: int32,
        expr: Some(call(
            call(
                Expr::Kernel(KernelExpr::Int32Mul),
                Expr::PartReference(six),
            ),
            Expr::PartReference(seven.clone()),
        )),
    })?;

    // Propose changing `seven` to 8 and evaluate `answer` under the
    // overlay, without touching anything committed.
    let overlay = Overlay::new(vec![SuggestionEdit {
        part: Some(seven),
        expr: SuggestionExpr::Int32Literal(8),
    }]);
    let mut overlay_caches = OverlayCaches::new();
    let suggested = system.evaluate_suggestion(
        &overlay,
        &mut overlay_caches,
        &SuggestionExpr::PartReference(answer.clone()),
    );
    println!("suggested: {:?}", suggested);

    // The committed world never saw the overlay.
    let expr = Expr::PartReference(answer);
    println!("{} = {:?}", expr, system.evaluate(&expr));
    Ok(())
}
