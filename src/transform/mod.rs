pub mod mangle;
pub mod reify;

use crate::typed::{ResolvedBody, ResolvedDecl, ResolvedFile, ResolvedStmt, TypedExpr, TypedPattern};

/// `fold_*` rebuilds every child first and then hands the reconstructed
/// node to the matching `transform_*` hook; the default hooks are the
/// identity.
pub trait Transform<'a> {
    fn transform_expr(&mut self, expr: TypedExpr<'a>) -> TypedExpr<'a> {
        expr
    }

    fn transform_pattern(&mut self, pattern: TypedPattern<'a>) -> TypedPattern<'a> {
        pattern
    }

    fn transform_stmt(&mut self, stmt: ResolvedStmt<'a>) -> ResolvedStmt<'a> {
        stmt
    }

    fn transform_decl(&mut self, decl: ResolvedDecl<'a>) -> ResolvedDecl<'a> {
        decl
    }

    fn fold_file(&mut self, file: ResolvedFile<'a>) -> ResolvedFile<'a> {
        let ResolvedFile { module, program, violations, syntax_violations, dependencies } = file;
        ResolvedFile {
            module,
            program: program.into_iter().map(|d| self.fold_decl(d)).collect(),
            violations,
            syntax_violations,
            dependencies: dependencies.into_iter().map(|d| self.fold_file(d)).collect()
        }
    }

    fn fold_decl(&mut self, decl: ResolvedDecl<'a>) -> ResolvedDecl<'a> {
        let decl = match decl {
            ResolvedDecl::Use { .. } | ResolvedDecl::Struct { .. } | ResolvedDecl::Enum { .. } => {
                decl
            }
            ResolvedDecl::Module { module, name, content, loc } => ResolvedDecl::Module {
                module,
                name,
                content: content.into_iter().map(|d| self.fold_decl(d)).collect(),
                loc
            },
            ResolvedDecl::Fun { info, references, body, native, loc } => ResolvedDecl::Fun {
                info,
                references,
                body: self.fold_body(body),
                native,
                loc
            },
            ResolvedDecl::Let { name, mutable, ty, value, loc } => ResolvedDecl::Let {
                name,
                mutable,
                ty,
                value: self.fold_expr(value),
                loc
            }
        };
        self.transform_decl(decl)
    }

    fn fold_body(&mut self, body: ResolvedBody<'a>) -> ResolvedBody<'a> {
        match body {
            ResolvedBody::None => ResolvedBody::None,
            ResolvedBody::Expr(expr) => ResolvedBody::Expr(Box::new(self.fold_expr(*expr))),
            ResolvedBody::Code { stmts, value } => ResolvedBody::Code {
                stmts: stmts.into_iter().map(|s| self.fold_stmt(s)).collect(),
                value: value.map(|v| Box::new(self.fold_expr(*v)))
            }
        }
    }

    fn fold_stmt(&mut self, stmt: ResolvedStmt<'a>) -> ResolvedStmt<'a> {
        let stmt = match stmt {
            ResolvedStmt::Expr { expr, loc } => {
                ResolvedStmt::Expr { expr: self.fold_expr(expr), loc }
            }
            ResolvedStmt::Return { value, loc } => {
                ResolvedStmt::Return { value: value.map(|v| self.fold_expr(v)), loc }
            }
            ResolvedStmt::Decl(decl) => ResolvedStmt::Decl(self.fold_decl(decl))
        };
        self.transform_stmt(stmt)
    }

    fn fold_pattern(&mut self, pattern: TypedPattern<'a>) -> TypedPattern<'a> {
        let pattern = match pattern {
            TypedPattern::Ident { .. } => pattern,
            TypedPattern::NamedTuple { member, properties, loc } => TypedPattern::NamedTuple {
                member,
                properties: properties.into_iter().map(|p| self.fold_pattern(p)).collect(),
                loc
            }
        };
        self.transform_pattern(pattern)
    }

    fn fold_expr(&mut self, expr: TypedExpr<'a>) -> TypedExpr<'a> {
        let expr = match expr {
            TypedExpr::Const { .. }
            | TypedExpr::Access { .. }
            | TypedExpr::Sizeof { .. }
            | TypedExpr::Errored { .. } => expr,
            TypedExpr::Group { value, loc } => {
                TypedExpr::Group { value: Box::new(self.fold_expr(*value)), loc }
            }
            TypedExpr::Call { callee, arguments, ty, subst, loc } => TypedExpr::Call {
                callee: Box::new(self.fold_expr(*callee)),
                arguments: arguments.into_iter().map(|a| self.fold_expr(a)).collect(),
                ty,
                subst,
                loc
            },
            TypedExpr::IntOp { op, lhs, rhs, ty, loc } => TypedExpr::IntOp {
                op,
                lhs: Box::new(self.fold_expr(*lhs)),
                rhs: Box::new(self.fold_expr(*rhs)),
                ty,
                loc
            },
            TypedExpr::Logical { op, lhs, rhs, loc } => TypedExpr::Logical {
                op,
                lhs: Box::new(self.fold_expr(*lhs)),
                rhs: Box::new(self.fold_expr(*rhs)),
                loc
            },
            TypedExpr::Assign { module, name, value, loc } => TypedExpr::Assign {
                module,
                name,
                value: Box::new(self.fold_expr(*value)),
                loc
            },
            TypedExpr::Get { receiver, property, ty, loc } => TypedExpr::Get {
                receiver: Box::new(self.fold_expr(*receiver)),
                property,
                ty,
                loc
            },
            TypedExpr::Set { receiver, property, value, loc } => TypedExpr::Set {
                receiver: Box::new(self.fold_expr(*receiver)),
                property,
                value: Box::new(self.fold_expr(*value)),
                loc
            },
            TypedExpr::Instance { ty, arguments, subst, loc } => TypedExpr::Instance {
                ty,
                arguments: arguments
                    .into_iter()
                    .map(|(n, e)| (n, self.fold_expr(e)))
                    .collect(),
                subst,
                loc
            },
            TypedExpr::Ref { value, loc } => {
                TypedExpr::Ref { value: Box::new(self.fold_expr(*value)), loc }
            }
            TypedExpr::Deref { value, ty, loc } => {
                TypedExpr::Deref { value: Box::new(self.fold_expr(*value)), ty, loc }
            }
            TypedExpr::If { cond, then_branch, else_branch, ty, loc } => TypedExpr::If {
                cond: Box::new(self.fold_expr(*cond)),
                then_branch: Box::new(self.fold_expr(*then_branch)),
                else_branch: else_branch.map(|e| Box::new(self.fold_expr(*e))),
                ty,
                loc
            },
            TypedExpr::Match { subject, arms, ty, subst, loc } => TypedExpr::Match {
                subject: Box::new(self.fold_expr(*subject)),
                arms: arms
                    .into_iter()
                    .map(|(p, e)| (self.fold_pattern(p), self.fold_expr(e)))
                    .collect(),
                ty,
                subst,
                loc
            },
            TypedExpr::Block { stmts, value, loc } => TypedExpr::Block {
                stmts: stmts.into_iter().map(|s| self.fold_stmt(s)).collect(),
                value: value.map(|v| Box::new(self.fold_expr(*v))),
                loc
            },
            TypedExpr::Erase { value, ty, loc } => {
                TypedExpr::Erase { value: Box::new(self.fold_expr(*value)), ty, loc }
            }
            TypedExpr::Reify { value, ty, loc } => {
                TypedExpr::Reify { value: Box::new(self.fold_expr(*value)), ty, loc }
            }
        };
        self.transform_expr(expr)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infer::ty::Ty;
    use crate::source::Location;
    use crate::syntax::ast::Constant;

    struct Identity;

    impl<'a> Transform<'a> for Identity {}

    #[test]
    fn test_default_fold_is_the_identity() {
        let expr = TypedExpr::If {
            cond: Box::new(TypedExpr::Const {
                value: Constant::Bool(true),
                ty: Ty::bool(),
                loc: Location::Generated
            }),
            then_branch: Box::new(TypedExpr::Const {
                value: Constant::I32(1),
                ty: Ty::int32(),
                loc: Location::Generated
            }),
            else_branch: Some(Box::new(TypedExpr::Const {
                value: Constant::I32(2),
                ty: Ty::int32(),
                loc: Location::Generated
            })),
            ty: Ty::int32(),
            loc: Location::Generated
        };
        assert_eq!(Identity.fold_expr(expr.clone()), expr);
    }

    struct CountConsts(usize);

    impl<'a> Transform<'a> for CountConsts {
        fn transform_expr(&mut self, expr: TypedExpr<'a>) -> TypedExpr<'a> {
            if matches!(expr, TypedExpr::Const { .. }) {
                self.0 += 1;
            }
            expr
        }
    }

    #[test]
    fn test_hooks_see_every_node_bottom_up() {
        let expr = TypedExpr::IntOp {
            op: crate::syntax::ast::BinOp::Add,
            lhs: Box::new(TypedExpr::Const {
                value: Constant::I32(1),
                ty: Ty::int32(),
                loc: Location::Generated
            }),
            rhs: Box::new(TypedExpr::Group {
                value: Box::new(TypedExpr::Const {
                    value: Constant::I32(2),
                    ty: Ty::int32(),
                    loc: Location::Generated
                }),
                loc: Location::Generated
            }),
            ty: Ty::int32(),
            loc: Location::Generated
        };
        let mut pass = CountConsts(0);
        pass.fold_expr(expr);
        assert_eq!(pass.0, 2);
    }
}
