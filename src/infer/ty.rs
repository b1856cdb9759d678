use std::fmt;
use smol_str::SmolStr;
use crate::util::map_join;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    Const(SmolStr),
    Var(SmolStr),
    // one parameter arrow of a curried function type
    Fun(Box<Ty>, Box<Ty>),
    Ptr(Box<Ty>),
    Arr(Box<Ty>),
    App(Box<Ty>, Vec<Ty>),
}

pub const UNDEF_NAME: &str = "<undef>";

impl Ty {
    pub fn void() -> Ty { Ty::Const("Void".into()) }
    pub fn bool() -> Ty { Ty::Const("Bool".into()) }
    pub fn char() -> Ty { Ty::Const("Char".into()) }
    pub fn int8() -> Ty { Ty::Const("Int8".into()) }
    pub fn int16() -> Ty { Ty::Const("Int16".into()) }
    pub fn int32() -> Ty { Ty::Const("Int32".into()) }
    pub fn float() -> Ty { Ty::Const("Float".into()) }
    pub fn double() -> Ty { Ty::Const("Double".into()) }

    /// The placeholder a check site degrades to after recording a
    /// violation; it unifies with anything so failures do not cascade.
    pub fn undef() -> Ty {
        Ty::Const(UNDEF_NAME.into())
    }

    pub fn is_undef(&self) -> bool {
        matches!(self, Ty::Const(name) if name == UNDEF_NAME)
    }

    pub fn str() -> Ty {
        Ty::ptr(Ty::char())
    }

    pub fn ptr(inner: Ty) -> Ty {
        Ty::Ptr(Box::new(inner))
    }

    pub fn arr(element: Ty) -> Ty {
        Ty::Arr(Box::new(element))
    }

    // a function of no parameters takes a single unit parameter
    pub fn fun(parameters: impl IntoIterator<Item = Ty>, ret: Ty) -> Ty {
        let mut parameters: Vec<Ty> = parameters.into_iter().collect();
        if parameters.is_empty() {
            parameters.push(Ty::void());
        }
        parameters.into_iter().rev().fold(ret, |acc, p| Ty::Fun(Box::new(p), Box::new(acc)))
    }

    pub fn chain_parameters(&self) -> Vec<&Ty> {
        let mut parameters = Vec::new();
        let mut curr = self;
        while let Ty::Fun(param, ret) = curr {
            parameters.push(param.as_ref());
            curr = ret;
        }
        parameters
    }

    /// The type remaining after applying `applied + 1` arguments. Partial
    /// application leaves a function type for the remainder.
    pub fn nest(&self, applied: usize) -> Ty {
        let mut curr = self;
        for _ in 0..=applied {
            match curr {
                Ty::Fun(_, ret) => curr = ret,
                _ => break
            }
        }
        curr.clone()
    }

    pub fn unapply(&self) -> Option<Ty> {
        match self {
            Ty::Ptr(inner) => Some(inner.as_ref().clone()),
            _ => None
        }
    }

    pub fn info_name(&self) -> Option<&SmolStr> {
        match self {
            Ty::Const(name) | Ty::Var(name) => Some(name),
            _ => None
        }
    }
}

pub fn builtin_ty(name: &str) -> Option<Ty> {
    match name {
        "Void" | "Bool" | "Char" | "Int8" | "Int16" | "Int32" | "Float" | "Double" => {
            Some(Ty::Const(name.into()))
        }
        _ => None
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Const(name) => write!(f, "{name}"),
            Ty::Var(name) => write!(f, "'{name}"),
            Ty::Fun(param, ret) => {
                let mut ret = ret;
                write!(f, "({param}")?;
                while let Ty::Fun(next, rest) = ret.as_ref() {
                    write!(f, ", {next}")?;
                    ret = rest;
                }
                write!(f, ") -> {ret}")
            }
            Ty::Ptr(inner) => write!(f, "*{inner}"),
            Ty::Arr(element) => write!(f, "[{element}]"),
            Ty::App(ctor, args) => write!(f, "{ctor}<{}>", map_join(args, |a| a)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_const_equality_is_by_name() {
        assert_eq!(Ty::int32(), Ty::Const("Int32".into()));
        assert_ne!(Ty::int32(), Ty::int16());
    }

    #[test]
    fn test_fun_folds_right() {
        let ty = Ty::fun([Ty::int32(), Ty::bool()], Ty::void());
        assert_eq!(
            ty,
            Ty::Fun(
                Box::new(Ty::int32()),
                Box::new(Ty::Fun(Box::new(Ty::bool()), Box::new(Ty::void())))
            )
        );
    }

    #[test]
    fn test_fun_of_no_parameters_takes_unit() {
        let ty = Ty::fun([], Ty::int32());
        assert_eq!(ty.chain_parameters(), vec![&Ty::void()]);
    }

    #[test]
    fn test_chain_parameters() {
        let ty = Ty::fun([Ty::int32(), Ty::bool(), Ty::str()], Ty::void());
        assert_eq!(ty.chain_parameters(), vec![&Ty::int32(), &Ty::bool(), &Ty::str()]);
    }

    #[test]
    fn test_nest_peels_one_parameter_per_application() {
        let ty = Ty::fun([Ty::int32(), Ty::bool()], Ty::char());
        assert_eq!(ty.nest(0), Ty::fun([Ty::bool()], Ty::char()));
        assert_eq!(ty.nest(1), Ty::char());
    }

    #[test]
    fn test_unapply() {
        assert_eq!(Ty::str().unapply(), Some(Ty::char()));
        assert_eq!(Ty::int32().unapply(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Ty::fun([Ty::int32(), Ty::bool()], Ty::void()).to_string(), "(Int32, Bool) -> Void");
        assert_eq!(Ty::str().to_string(), "*Char");
        assert_eq!(Ty::arr(Ty::int8()).to_string(), "[Int8]");
        assert_eq!(Ty::Var("a".into()).to_string(), "'a");
        assert_eq!(
            Ty::App(Box::new(Ty::Const("Pair".into())), vec![Ty::int32(), Ty::bool()]).to_string(),
            "Pair<Int32, Bool>"
        );
    }

    #[test]
    fn test_builtins_resolve() {
        assert_eq!(builtin_ty("Int32"), Some(Ty::int32()));
        assert_eq!(builtin_ty("Pair"), None);
    }
}
