use indexmap::IndexMap;
use smol_str::SmolStr;
use crate::error::Violation;
use crate::infer::info::{EnumInfo, EnumMemberInfo, FunctionInfo, StructInfo};
use crate::infer::module_graph::ModuleKey;
use crate::infer::subst::{Ap, Subst};
use crate::infer::ty::Ty;
use crate::source::{HasLoc, Location};
use crate::syntax::ast::{BinOp, Constant, LogicalOp};

#[derive(Debug, Clone, PartialEq)]
pub enum TypedExpr<'a> {
    Const { value: Constant, ty: Ty, loc: Location<'a> },
    // `module` is set when the access was qualified through a module name
    Access { module: Option<ModuleKey>, name: SmolStr, ty: Ty, loc: Location<'a> },
    Group { value: Box<TypedExpr<'a>>, loc: Location<'a> },
    Call {
        callee: Box<TypedExpr<'a>>,
        arguments: Vec<TypedExpr<'a>>,
        ty: Ty,
        subst: Subst,
        loc: Location<'a>
    },
    IntOp { op: BinOp, lhs: Box<TypedExpr<'a>>, rhs: Box<TypedExpr<'a>>, ty: Ty, loc: Location<'a> },
    Logical { op: LogicalOp, lhs: Box<TypedExpr<'a>>, rhs: Box<TypedExpr<'a>>, loc: Location<'a> },
    Assign {
        module: Option<ModuleKey>,
        name: SmolStr,
        value: Box<TypedExpr<'a>>,
        loc: Location<'a>
    },
    Get { receiver: Box<TypedExpr<'a>>, property: SmolStr, ty: Ty, loc: Location<'a> },
    Set {
        receiver: Box<TypedExpr<'a>>,
        property: SmolStr,
        value: Box<TypedExpr<'a>>,
        loc: Location<'a>
    },
    Instance {
        ty: Ty,
        arguments: Vec<(SmolStr, TypedExpr<'a>)>,
        subst: Subst,
        loc: Location<'a>
    },
    // types as Int32; the measured type is kept for codegen
    Sizeof { measured: Ty, loc: Location<'a> },
    Ref { value: Box<TypedExpr<'a>>, loc: Location<'a> },
    Deref { value: Box<TypedExpr<'a>>, ty: Ty, loc: Location<'a> },
    If {
        cond: Box<TypedExpr<'a>>,
        then_branch: Box<TypedExpr<'a>>,
        else_branch: Option<Box<TypedExpr<'a>>>,
        ty: Ty,
        loc: Location<'a>
    },
    Match {
        subject: Box<TypedExpr<'a>>,
        arms: Vec<(TypedPattern<'a>, TypedExpr<'a>)>,
        ty: Ty,
        subst: Subst,
        loc: Location<'a>
    },
    Block {
        stmts: Vec<ResolvedStmt<'a>>,
        value: Option<Box<TypedExpr<'a>>>,
        loc: Location<'a>
    },
    // boxes a concrete value crossing into a type-variable position
    Erase { value: Box<TypedExpr<'a>>, ty: Ty, loc: Location<'a> },
    // unboxes a type-variable-typed value back to a concrete type
    Reify { value: Box<TypedExpr<'a>>, ty: Ty, loc: Location<'a> },
    // placeholder after a recorded violation
    Errored { loc: Location<'a> }
}

impl<'a> TypedExpr<'a> {
    pub fn ty(&self) -> Ty {
        match self {
            TypedExpr::Const { ty, .. } => ty.clone(),
            TypedExpr::Access { ty, .. } => ty.clone(),
            TypedExpr::Group { value, .. } => value.ty(),
            TypedExpr::Call { ty, .. } => ty.clone(),
            TypedExpr::IntOp { ty, .. } => ty.clone(),
            TypedExpr::Logical { .. } => Ty::bool(),
            TypedExpr::Assign { value, .. } => value.ty(),
            TypedExpr::Get { ty, .. } => ty.clone(),
            TypedExpr::Set { value, .. } => value.ty(),
            TypedExpr::Instance { ty, .. } => ty.clone(),
            TypedExpr::Sizeof { .. } => Ty::int32(),
            TypedExpr::Ref { value, .. } => Ty::ptr(value.ty()),
            TypedExpr::Deref { ty, .. } => ty.clone(),
            TypedExpr::If { ty, .. } => ty.clone(),
            TypedExpr::Match { ty, .. } => ty.clone(),
            TypedExpr::Block { value, .. } => value.as_ref().map_or(Ty::void(), |v| v.ty()),
            TypedExpr::Erase { ty, .. } => ty.clone(),
            TypedExpr::Reify { ty, .. } => ty.clone(),
            TypedExpr::Errored { .. } => Ty::undef(),
        }
    }

    pub fn stmt(self) -> ResolvedStmt<'a> {
        let loc = self.loc();
        ResolvedStmt::Expr { expr: self, loc }
    }

    pub fn body(self) -> ResolvedBody<'a> {
        ResolvedBody::Expr(Box::new(self))
    }
}

impl<'a> HasLoc<'a> for TypedExpr<'a> {
    fn loc(&self) -> Location<'a> {
        match self {
            TypedExpr::Const { loc, .. } => *loc,
            TypedExpr::Access { loc, .. } => *loc,
            TypedExpr::Group { loc, .. } => *loc,
            TypedExpr::Call { loc, .. } => *loc,
            TypedExpr::IntOp { loc, .. } => *loc,
            TypedExpr::Logical { loc, .. } => *loc,
            TypedExpr::Assign { loc, .. } => *loc,
            TypedExpr::Get { loc, .. } => *loc,
            TypedExpr::Set { loc, .. } => *loc,
            TypedExpr::Instance { loc, .. } => *loc,
            TypedExpr::Sizeof { loc, .. } => *loc,
            TypedExpr::Ref { loc, .. } => *loc,
            TypedExpr::Deref { loc, .. } => *loc,
            TypedExpr::If { loc, .. } => *loc,
            TypedExpr::Match { loc, .. } => *loc,
            TypedExpr::Block { loc, .. } => *loc,
            TypedExpr::Erase { loc, .. } => *loc,
            TypedExpr::Reify { loc, .. } => *loc,
            TypedExpr::Errored { loc } => *loc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedPattern<'a> {
    Ident { name: SmolStr, ty: Ty, loc: Location<'a> },
    NamedTuple { member: EnumMemberInfo, properties: Vec<TypedPattern<'a>>, loc: Location<'a> }
}

impl TypedPattern<'_> {
    pub fn ty(&self) -> Ty {
        match self {
            TypedPattern::Ident { ty, .. } => ty.clone(),
            TypedPattern::NamedTuple { member, .. } => Ty::Const(member.enum_name.clone()),
        }
    }
}

impl<'a> HasLoc<'a> for TypedPattern<'a> {
    fn loc(&self) -> Location<'a> {
        match self {
            TypedPattern::Ident { loc, .. } => *loc,
            TypedPattern::NamedTuple { loc, .. } => *loc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedStmt<'a> {
    Expr { expr: TypedExpr<'a>, loc: Location<'a> },
    Return { value: Option<TypedExpr<'a>>, loc: Location<'a> },
    Decl(ResolvedDecl<'a>)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedDecl<'a> {
    Use { module: Option<ModuleKey>, name: SmolStr, loc: Location<'a> },
    Module { module: ModuleKey, name: SmolStr, content: Vec<ResolvedDecl<'a>>, loc: Location<'a> },
    Struct { info: StructInfo, loc: Location<'a> },
    Enum { info: EnumInfo, loc: Location<'a> },
    Fun {
        info: FunctionInfo,
        references: IndexMap<SmolStr, Ty>,
        body: ResolvedBody<'a>,
        native: bool,
        loc: Location<'a>
    },
    Let {
        name: SmolStr,
        mutable: bool,
        ty: Ty,
        value: TypedExpr<'a>,
        loc: Location<'a>
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedBody<'a> {
    None,
    Expr(Box<TypedExpr<'a>>),
    Code { stmts: Vec<ResolvedStmt<'a>>, value: Option<Box<TypedExpr<'a>>> }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFile<'a> {
    pub module: SmolStr,
    pub program: Vec<ResolvedDecl<'a>>,
    // violations recorded while analyzing this file only
    pub violations: Vec<Violation<'a>>,
    pub syntax_violations: Vec<Violation<'a>>,
    pub dependencies: Vec<ResolvedFile<'a>>
}

impl ResolvedFile<'_> {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
            && self.syntax_violations.is_empty()
            && self.dependencies.iter().all(|d| d.is_clean())
    }
}

fn ap_references(references: &IndexMap<SmolStr, Ty>, subst: &Subst) -> IndexMap<SmolStr, Ty> {
    references.iter().map(|(name, ty)| (name.clone(), ty.ap(subst))).collect()
}

impl Ap for EnumMemberInfo {
    fn ap(&self, subst: &Subst) -> EnumMemberInfo {
        EnumMemberInfo {
            name: self.name.clone(),
            enum_name: self.enum_name.clone(),
            parameters: self.parameters.ap(subst),
            constructor_ty: self.constructor_ty.ap(subst)
        }
    }
}

impl Ap for Subst {
    fn ap(&self, _subst: &Subst) -> Subst {
        self.clone()
    }
}

impl<'a> Ap for TypedExpr<'a> {
    fn ap(&self, subst: &Subst) -> TypedExpr<'a> {
        match self {
            TypedExpr::Const { value, ty, loc } => {
                TypedExpr::Const { value: value.clone(), ty: ty.ap(subst), loc: *loc }
            }
            TypedExpr::Access { module, name, ty, loc } => {
                TypedExpr::Access { module: *module, name: name.clone(), ty: ty.ap(subst), loc: *loc }
            }
            TypedExpr::Group { value, loc } => {
                TypedExpr::Group { value: value.ap(subst), loc: *loc }
            }
            TypedExpr::Call { callee, arguments, ty, subst: own, loc } => TypedExpr::Call {
                callee: callee.ap(subst),
                arguments: arguments.ap(subst),
                ty: ty.ap(subst),
                subst: own.clone(),
                loc: *loc
            },
            TypedExpr::IntOp { op, lhs, rhs, ty, loc } => TypedExpr::IntOp {
                op: *op,
                lhs: lhs.ap(subst),
                rhs: rhs.ap(subst),
                ty: ty.ap(subst),
                loc: *loc
            },
            TypedExpr::Logical { op, lhs, rhs, loc } => TypedExpr::Logical {
                op: *op,
                lhs: lhs.ap(subst),
                rhs: rhs.ap(subst),
                loc: *loc
            },
            TypedExpr::Assign { module, name, value, loc } => TypedExpr::Assign {
                module: *module,
                name: name.clone(),
                value: value.ap(subst),
                loc: *loc
            },
            TypedExpr::Get { receiver, property, ty, loc } => TypedExpr::Get {
                receiver: receiver.ap(subst),
                property: property.clone(),
                ty: ty.ap(subst),
                loc: *loc
            },
            TypedExpr::Set { receiver, property, value, loc } => TypedExpr::Set {
                receiver: receiver.ap(subst),
                property: property.clone(),
                value: value.ap(subst),
                loc: *loc
            },
            TypedExpr::Instance { ty, arguments, subst: own, loc } => TypedExpr::Instance {
                ty: ty.ap(subst),
                arguments: arguments.iter().map(|(n, e)| (n.clone(), e.ap(subst))).collect(),
                subst: own.clone(),
                loc: *loc
            },
            TypedExpr::Sizeof { measured, loc } => {
                TypedExpr::Sizeof { measured: measured.ap(subst), loc: *loc }
            }
            TypedExpr::Ref { value, loc } => {
                TypedExpr::Ref { value: value.ap(subst), loc: *loc }
            }
            TypedExpr::Deref { value, ty, loc } => {
                TypedExpr::Deref { value: value.ap(subst), ty: ty.ap(subst), loc: *loc }
            }
            TypedExpr::If { cond, then_branch, else_branch, ty, loc } => TypedExpr::If {
                cond: cond.ap(subst),
                then_branch: then_branch.ap(subst),
                else_branch: else_branch.ap(subst),
                ty: ty.ap(subst),
                loc: *loc
            },
            TypedExpr::Match { subject, arms, ty, subst: own, loc } => TypedExpr::Match {
                subject: subject.ap(subst),
                arms: arms.iter().map(|(p, e)| (p.ap(subst), e.ap(subst))).collect(),
                ty: ty.ap(subst),
                subst: own.clone(),
                loc: *loc
            },
            TypedExpr::Block { stmts, value, loc } => TypedExpr::Block {
                stmts: stmts.ap(subst),
                value: value.ap(subst),
                loc: *loc
            },
            TypedExpr::Erase { value, ty, loc } => {
                TypedExpr::Erase { value: value.ap(subst), ty: ty.ap(subst), loc: *loc }
            }
            TypedExpr::Reify { value, ty, loc } => {
                TypedExpr::Reify { value: value.ap(subst), ty: ty.ap(subst), loc: *loc }
            }
            TypedExpr::Errored { loc } => TypedExpr::Errored { loc: *loc },
        }
    }
}

impl<'a> Ap for TypedPattern<'a> {
    fn ap(&self, subst: &Subst) -> TypedPattern<'a> {
        match self {
            TypedPattern::Ident { name, ty, loc } => {
                TypedPattern::Ident { name: name.clone(), ty: ty.ap(subst), loc: *loc }
            }
            TypedPattern::NamedTuple { member, properties, loc } => TypedPattern::NamedTuple {
                member: member.ap(subst),
                properties: properties.ap(subst),
                loc: *loc
            },
        }
    }
}

impl<'a> Ap for ResolvedStmt<'a> {
    fn ap(&self, subst: &Subst) -> ResolvedStmt<'a> {
        match self {
            ResolvedStmt::Expr { expr, loc } => {
                ResolvedStmt::Expr { expr: expr.ap(subst), loc: *loc }
            }
            ResolvedStmt::Return { value, loc } => {
                ResolvedStmt::Return { value: value.ap(subst), loc: *loc }
            }
            ResolvedStmt::Decl(decl) => ResolvedStmt::Decl(decl.ap(subst)),
        }
    }
}

impl<'a> Ap for ResolvedDecl<'a> {
    fn ap(&self, subst: &Subst) -> ResolvedDecl<'a> {
        match self {
            ResolvedDecl::Use { .. } | ResolvedDecl::Struct { .. } | ResolvedDecl::Enum { .. } => {
                self.clone()
            }
            ResolvedDecl::Module { module, name, content, loc } => ResolvedDecl::Module {
                module: *module,
                name: name.clone(),
                content: content.ap(subst),
                loc: *loc
            },
            ResolvedDecl::Fun { info, references, body, native, loc } => ResolvedDecl::Fun {
                info: info.clone(),
                references: ap_references(references, subst),
                body: body.ap(subst),
                native: *native,
                loc: *loc
            },
            ResolvedDecl::Let { name, mutable, ty, value, loc } => ResolvedDecl::Let {
                name: name.clone(),
                mutable: *mutable,
                ty: ty.ap(subst),
                value: value.ap(subst),
                loc: *loc
            },
        }
    }
}

impl<'a> Ap for ResolvedBody<'a> {
    fn ap(&self, subst: &Subst) -> ResolvedBody<'a> {
        match self {
            ResolvedBody::None => ResolvedBody::None,
            ResolvedBody::Expr(expr) => ResolvedBody::Expr(expr.ap(subst)),
            ResolvedBody::Code { stmts, value } => ResolvedBody::Code {
                stmts: stmts.ap(subst),
                value: value.ap(subst)
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_block_type_is_trailing_value_or_void() {
        let block = TypedExpr::Block { stmts: vec![], value: None, loc: Location::Generated };
        assert_eq!(block.ty(), Ty::void());
        let block = TypedExpr::Block {
            stmts: vec![],
            value: Some(Box::new(TypedExpr::Const {
                value: Constant::I32(1),
                ty: Ty::int32(),
                loc: Location::Generated
            })),
            loc: Location::Generated
        };
        assert_eq!(block.ty(), Ty::int32());
    }

    #[test]
    fn test_sizeof_types_as_int32() {
        let node = TypedExpr::Sizeof { measured: Ty::double(), loc: Location::Generated };
        assert_eq!(node.ty(), Ty::int32());
    }

    #[test]
    fn test_ref_wraps_in_a_pointer() {
        let node = TypedExpr::Ref {
            value: Box::new(TypedExpr::Const {
                value: Constant::I32(7),
                ty: Ty::int32(),
                loc: Location::Generated
            }),
            loc: Location::Generated
        };
        assert_eq!(node.ty(), Ty::ptr(Ty::int32()));
    }

    #[test]
    fn test_ap_refreshes_nested_types() {
        let subst = Subst::singleton("a", Ty::int32());
        let node = TypedExpr::Call {
            callee: Box::new(TypedExpr::Access {
                module: None,
                name: "id".into(),
                ty: Ty::fun([Ty::Var("a".into())], Ty::Var("a".into())),
                loc: Location::Generated
            }),
            arguments: vec![],
            ty: Ty::Var("a".into()),
            subst: Subst::empty(),
            loc: Location::Generated
        };
        let refreshed = node.ap(&subst);
        assert_eq!(refreshed.ty(), Ty::int32());
        match refreshed {
            TypedExpr::Call { callee, .. } => {
                assert_eq!(callee.ty(), Ty::fun([Ty::int32()], Ty::int32()))
            }
            _ => unreachable!()
        }
    }

    #[test]
    fn test_pattern_ty_is_the_enum() {
        let member = EnumMemberInfo::new("Maybe", "Just", vec![Ty::int32()]);
        let pattern = TypedPattern::NamedTuple {
            member,
            properties: vec![TypedPattern::Ident {
                name: "x".into(),
                ty: Ty::int32(),
                loc: Location::Generated
            }],
            loc: Location::Generated
        };
        assert_eq!(pattern.ty(), Ty::Const("Maybe".into()));
    }
}
