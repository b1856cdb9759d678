use std::collections::HashMap;
use smol_str::SmolStr;
use crate::infer::ty::Ty;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subst(HashMap<SmolStr, Ty>);

impl Subst {
    pub fn empty() -> Subst {
        Subst(HashMap::new())
    }

    pub fn singleton(var: impl Into<SmolStr>, ty: Ty) -> Subst {
        let mut map = HashMap::new();
        map.insert(var.into(), ty);
        Subst(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, var: &str) -> Option<&Ty> {
        self.0.get(var)
    }

    pub fn insert(&mut self, var: impl Into<SmolStr>, ty: Ty) {
        self.0.insert(var.into(), ty);
    }

    // applies `self` then `other`; the right side wins on collision
    pub fn compose(&self, other: &Subst) -> Subst {
        let mut result = HashMap::new();
        for (var, ty) in &self.0 {
            result.insert(var.clone(), ty.ap(other));
        }
        for (var, ty) in &other.0 {
            result.insert(var.clone(), ty.clone());
        }
        Subst(result)
    }
}

/// Structurally copies a value with a substitution applied to every type
/// in it.
pub trait Ap: Sized {
    fn ap(&self, subst: &Subst) -> Self;
}

impl Ap for Ty {
    fn ap(&self, subst: &Subst) -> Ty {
        match self {
            Ty::Const(_) => self.clone(),
            Ty::Var(name) => subst.get(name).cloned().unwrap_or_else(|| self.clone()),
            Ty::Fun(param, ret) => Ty::Fun(param.ap(subst), ret.ap(subst)),
            Ty::Ptr(inner) => Ty::Ptr(inner.ap(subst)),
            Ty::Arr(element) => Ty::Arr(element.ap(subst)),
            Ty::App(ctor, args) => Ty::App(ctor.ap(subst), args.ap(subst))
        }
    }
}

impl<T: Ap> Ap for Option<T> {
    fn ap(&self, subst: &Subst) -> Option<T> {
        self.as_ref().map(|v| v.ap(subst))
    }
}

impl<T: Ap> Ap for Vec<T> {
    fn ap(&self, subst: &Subst) -> Vec<T> {
        self.iter().map(|v| v.ap(subst)).collect()
    }
}

impl<T: Ap> Ap for Box<T> {
    fn ap(&self, subst: &Subst) -> Box<T> {
        Box::new(self.as_ref().ap(subst))
    }
}
