use smol_str::SmolStr;
use crate::error::Violation;
use crate::source::{HasLoc, Location};

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile<'a> {
    pub module: SmolStr,
    pub program: Vec<Decl<'a>>,
    pub syntax_violations: Vec<Violation<'a>>,
    pub loc: Location<'a>
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModulePath(pub Vec<SmolStr>);

impl ModulePath {
    pub fn of(name: &str) -> ModulePath {
        ModulePath(name.split('.').map(SmolStr::from).collect())
    }

    // the flattened form the module registry and dependency graph key on
    pub fn to_name(&self) -> SmolStr {
        let parts: Vec<&str> = self.0.iter().map(|p| p.as_str()).collect();
        SmolStr::from(parts.join("."))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl<'a> {
    Use { path: ModulePath, loc: Location<'a> },
    Module { path: ModulePath, content: Vec<Decl<'a>>, loc: Location<'a> },
    Struct { name: SmolStr, properties: Vec<StructProperty<'a>>, loc: Location<'a> },
    Enum { name: SmolStr, members: Vec<EnumVariant<'a>>, loc: Location<'a> },
    Fun {
        name: SmolStr,
        attributes: Vec<SmolStr>,
        parameters: Vec<Parameter<'a>>,
        return_ty: TypeRef<'a>,
        body: FunctionBody<'a>,
        loc: Location<'a>
    },
    Let {
        name: SmolStr,
        mutable: bool,
        ty: Option<TypeRef<'a>>,
        value: Expr<'a>,
        loc: Location<'a>
    }
}

impl Decl<'_> {
    pub fn is_native(attributes: &[SmolStr]) -> bool {
        attributes.iter().any(|a| a == "native")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructProperty<'a> {
    pub mutable: bool,
    pub name: SmolStr,
    pub ty: TypeRef<'a>,
    pub loc: Location<'a>
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant<'a> {
    pub name: SmolStr,
    pub parameters: Vec<TypeRef<'a>>,
    pub loc: Location<'a>
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter<'a> {
    pub name: SmolStr,
    pub ty: TypeRef<'a>,
    pub loc: Location<'a>
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody<'a> {
    None { loc: Location<'a> },
    Expr { expr: Box<Expr<'a>>, loc: Location<'a> },
    Code { stmts: Vec<Stmt<'a>>, value: Option<Box<Expr<'a>>>, loc: Location<'a> }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'a> {
    Expr { expr: Expr<'a>, loc: Location<'a> },
    Return { value: Option<Expr<'a>>, loc: Location<'a> },
    Decl(Decl<'a>)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Concat
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Bool(bool),
    Unit,
    I8(i8),
    I16(i16),
    I32(i32),
    F32(f32),
    F64(f64),
    Str(SmolStr)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Const { value: Constant, loc: Location<'a> },
    Access { name: SmolStr, loc: Location<'a> },
    Group { value: Box<Expr<'a>>, loc: Location<'a> },
    Call { callee: Box<Expr<'a>>, arguments: Vec<Expr<'a>>, loc: Location<'a> },
    Binary { lhs: Box<Expr<'a>>, op: BinOp, rhs: Box<Expr<'a>>, loc: Location<'a> },
    Logical { lhs: Box<Expr<'a>>, op: LogicalOp, rhs: Box<Expr<'a>>, loc: Location<'a> },
    Assign { name: SmolStr, value: Box<Expr<'a>>, loc: Location<'a> },
    Get { receiver: Box<Expr<'a>>, property: SmolStr, loc: Location<'a> },
    Set { receiver: Box<Expr<'a>>, property: SmolStr, value: Box<Expr<'a>>, loc: Location<'a> },
    Instance { ty: TypeRef<'a>, arguments: Vec<(SmolStr, Expr<'a>)>, loc: Location<'a> },
    Sizeof { ty: TypeRef<'a>, loc: Location<'a> },
    Ref { value: Box<Expr<'a>>, loc: Location<'a> },
    Deref { value: Box<Expr<'a>>, loc: Location<'a> },
    If {
        cond: Box<Expr<'a>>,
        then_branch: Box<Expr<'a>>,
        else_branch: Option<Box<Expr<'a>>>,
        loc: Location<'a>
    },
    Match { subject: Box<Expr<'a>>, arms: Vec<(Pattern<'a>, Expr<'a>)>, loc: Location<'a> },
    Block { stmts: Vec<Stmt<'a>>, value: Option<Box<Expr<'a>>>, loc: Location<'a> }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern<'a> {
    Ident { name: SmolStr, loc: Location<'a> },
    NamedTuple { ty: SmolStr, properties: Vec<Pattern<'a>>, loc: Location<'a> }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef<'a> {
    Access { name: SmolStr, loc: Location<'a> },
    Ptr { inner: Box<TypeRef<'a>>, loc: Location<'a> },
    Arr { element: Box<TypeRef<'a>>, loc: Location<'a> },
    Fun { parameters: Vec<TypeRef<'a>>, ret: Box<TypeRef<'a>>, loc: Location<'a> },
    App { name: SmolStr, args: Vec<TypeRef<'a>>, loc: Location<'a> },
    Unit { loc: Location<'a> }
}

impl<'a> HasLoc<'a> for Expr<'a> {
    fn loc(&self) -> Location<'a> {
        match self {
            Expr::Const { loc, .. } => *loc,
            Expr::Access { loc, .. } => *loc,
            Expr::Group { loc, .. } => *loc,
            Expr::Call { loc, .. } => *loc,
            Expr::Binary { loc, .. } => *loc,
            Expr::Logical { loc, .. } => *loc,
            Expr::Assign { loc, .. } => *loc,
            Expr::Get { loc, .. } => *loc,
            Expr::Set { loc, .. } => *loc,
            Expr::Instance { loc, .. } => *loc,
            Expr::Sizeof { loc, .. } => *loc,
            Expr::Ref { loc, .. } => *loc,
            Expr::Deref { loc, .. } => *loc,
            Expr::If { loc, .. } => *loc,
            Expr::Match { loc, .. } => *loc,
            Expr::Block { loc, .. } => *loc,
        }
    }
}

impl<'a> HasLoc<'a> for Stmt<'a> {
    fn loc(&self) -> Location<'a> {
        match self {
            Stmt::Expr { loc, .. } => *loc,
            Stmt::Return { loc, .. } => *loc,
            Stmt::Decl(decl) => decl.loc(),
        }
    }
}

impl<'a> HasLoc<'a> for Decl<'a> {
    fn loc(&self) -> Location<'a> {
        match self {
            Decl::Use { loc, .. } => *loc,
            Decl::Module { loc, .. } => *loc,
            Decl::Struct { loc, .. } => *loc,
            Decl::Enum { loc, .. } => *loc,
            Decl::Fun { loc, .. } => *loc,
            Decl::Let { loc, .. } => *loc,
        }
    }
}

impl<'a> HasLoc<'a> for Pattern<'a> {
    fn loc(&self) -> Location<'a> {
        match self {
            Pattern::Ident { loc, .. } => *loc,
            Pattern::NamedTuple { loc, .. } => *loc,
        }
    }
}

impl<'a> HasLoc<'a> for TypeRef<'a> {
    fn loc(&self) -> Location<'a> {
        match self {
            TypeRef::Access { loc, .. } => *loc,
            TypeRef::Ptr { loc, .. } => *loc,
            TypeRef::Arr { loc, .. } => *loc,
            TypeRef::Fun { loc, .. } => *loc,
            TypeRef::App { loc, .. } => *loc,
            TypeRef::Unit { loc } => *loc,
        }
    }
}

impl<'a> HasLoc<'a> for FunctionBody<'a> {
    fn loc(&self) -> Location<'a> {
        match self {
            FunctionBody::None { loc } => *loc,
            FunctionBody::Expr { loc, .. } => *loc,
            FunctionBody::Code { loc, .. } => *loc,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_module_path_round_trip() {
        let path = ModulePath::of("Std.IO");
        assert_eq!(path.0, vec![SmolStr::from("Std"), SmolStr::from("IO")]);
        assert_eq!(path.to_name(), "Std.IO");
    }

    #[test]
    fn test_native_attribute() {
        assert!(Decl::is_native(&[SmolStr::from("native")]));
        assert!(!Decl::is_native(&[SmolStr::from("inline")]));
    }
}
