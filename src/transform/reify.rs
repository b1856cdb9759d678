//! Inserts boxing at generic boundaries: `Erase` around arguments passed
//! at type-variable parameters, `Reify` around calls whose raw result
//! position is a type variable but whose instantiated type is concrete.

use crate::infer::ty::Ty;
use crate::source::HasLoc;
use crate::transform::Transform;
use crate::typed::{ResolvedFile, TypedExpr};

pub fn reify(file: ResolvedFile) -> ResolvedFile {
    Reify.fold_file(file)
}

struct Reify;

impl<'a> Transform<'a> for Reify {
    fn transform_expr(&mut self, expr: TypedExpr<'a>) -> TypedExpr<'a> {
        let TypedExpr::Call { callee, arguments, ty, subst, loc } = expr else {
            return expr;
        };
        let callee_ty = callee.ty();
        let parameters: Vec<Ty> = callee_ty.chain_parameters().into_iter().cloned().collect();

        let arguments: Vec<TypedExpr<'a>> = arguments
            .into_iter()
            .enumerate()
            .map(|(i, arg)| match parameters.get(i) {
                Some(expected @ Ty::Var(_))
                    if !matches!(arg.ty(), Ty::Var(_)) && !arg.ty().is_undef() =>
                {
                    let at = arg.loc();
                    TypedExpr::Erase { value: Box::new(arg), ty: expected.clone(), loc: at }
                }
                _ => arg
            })
            .collect();

        let applied = arguments.len().min(parameters.len());
        let raw = callee_ty.nest(applied.saturating_sub(1));
        let call = TypedExpr::Call { callee, arguments, ty: ty.clone(), subst, loc };
        if matches!(raw, Ty::Var(_)) && !matches!(ty, Ty::Var(_)) && !ty.is_undef() {
            TypedExpr::Reify { value: Box::new(call), ty, loc }
        } else {
            call
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infer::infer::analyze_file;
    use crate::source::Location;
    use crate::syntax::ast::{Constant, Decl, Expr, FunctionBody, Parameter, SourceFile, TypeRef};
    use crate::typed::ResolvedDecl;

    const L: Location<'static> = Location::Generated;

    fn generic_id() -> Decl<'static> {
        Decl::Fun {
            name: "id".into(),
            attributes: vec!["native".into()],
            parameters: vec![Parameter {
                name: "x".into(),
                ty: TypeRef::Access { name: "a".into(), loc: L },
                loc: L
            }],
            return_ty: TypeRef::Access { name: "a".into(), loc: L },
            body: FunctionBody::None { loc: L },
            loc: L
        }
    }

    fn call_id_with_int() -> SourceFile<'static> {
        SourceFile {
            module: "main".into(),
            program: vec![
                generic_id(),
                Decl::Let {
                    name: "n".into(),
                    mutable: false,
                    ty: None,
                    value: Expr::Call {
                        callee: Box::new(Expr::Access { name: "id".into(), loc: L }),
                        arguments: vec![Expr::Const { value: Constant::I32(1), loc: L }],
                        loc: L
                    },
                    loc: L
                },
            ],
            syntax_violations: vec![],
            loc: L
        }
    }

    #[test]
    fn test_generic_call_is_erased_and_reified() {
        let resolved = analyze_file(&call_id_with_int());
        assert!(resolved.violations.is_empty(), "{:?}", resolved.violations);
        let lowered = reify(resolved);

        let ResolvedDecl::Let { value, .. } = &lowered.program[1] else { panic!() };
        let TypedExpr::Reify { value: call, ty, .. } = value else {
            panic!("expected a reified call, got {value:?}")
        };
        assert_eq!(*ty, Ty::int32());
        let TypedExpr::Call { arguments, .. } = call.as_ref() else { panic!() };
        let TypedExpr::Erase { value: inner, ty: erased_to, .. } = &arguments[0] else {
            panic!("expected an erased argument, got {:?}", arguments[0])
        };
        assert_eq!(*erased_to, Ty::Var("a".into()));
        assert_eq!(inner.ty(), Ty::int32());
    }

    #[test]
    fn test_monomorphic_calls_are_untouched() {
        let source = SourceFile {
            module: "main".into(),
            program: vec![
                Decl::Fun {
                    name: "twice".into(),
                    attributes: vec!["native".into()],
                    parameters: vec![Parameter {
                        name: "x".into(),
                        ty: TypeRef::Access { name: "Int32".into(), loc: L },
                        loc: L
                    }],
                    return_ty: TypeRef::Access { name: "Int32".into(), loc: L },
                    body: FunctionBody::None { loc: L },
                    loc: L
                },
                Decl::Let {
                    name: "n".into(),
                    mutable: false,
                    ty: None,
                    value: Expr::Call {
                        callee: Box::new(Expr::Access { name: "twice".into(), loc: L }),
                        arguments: vec![Expr::Const { value: Constant::I32(1), loc: L }],
                        loc: L
                    },
                    loc: L
                },
            ],
            syntax_violations: vec![],
            loc: L
        };
        let resolved = analyze_file(&source);
        let before = resolved.clone();
        let lowered = reify(resolved);
        assert_eq!(lowered, before);
    }
}
