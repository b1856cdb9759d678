use std::collections::HashMap;
use indexmap::IndexMap;
use smol_str::SmolStr;
use crate::infer::info::TyInfo;
use crate::infer::ty::Ty;
use crate::util::{declare_key_type, KeyMap};

declare_key_type! {
    pub struct ScopeKey;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScopeKind {
    Global,
    File { module: SmolStr },
    Module { name: SmolStr },
    Function { name: SmolStr, return_ty: Ty },
    // a block or match arm, transparent to returns and captures
    Block
}

impl ScopeKind {
    fn is_function(&self) -> bool {
        matches!(self, ScopeKind::Function { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: SmolStr,
    pub mutable: bool,
    pub ty: Ty,
    pub declared_in: ScopeKey
}

pub struct Scope {
    pub parent: Option<ScopeKey>,
    pub kind: ScopeKind,
    variables: IndexMap<SmolStr, Variable>,
    ty_infos: IndexMap<SmolStr, TyInfo>,
    modules: HashMap<SmolStr, ScopeKey>,
    // scopes whose declarations a `use` made visible here
    imported: Vec<ScopeKey>,
    // variables a function's body uses from enclosing function scopes
    pub references: IndexMap<SmolStr, Ty>
}

impl Scope {
    fn new(parent: Option<ScopeKey>, kind: ScopeKind) -> Scope {
        Scope {
            parent,
            kind,
            variables: IndexMap::new(),
            ty_infos: IndexMap::new(),
            modules: HashMap::new(),
            imported: Vec::new(),
            references: IndexMap::new()
        }
    }
}

pub struct ScopeArena {
    scopes: KeyMap<ScopeKey, Scope>
}

impl ScopeArena {
    pub fn new() -> (ScopeArena, ScopeKey) {
        let mut scopes = KeyMap::new();
        let global = scopes.add(Scope::new(None, ScopeKind::Global));
        (ScopeArena { scopes }, global)
    }

    pub fn push(&mut self, parent: ScopeKey, kind: ScopeKind) -> ScopeKey {
        self.scopes.add(Scope::new(Some(parent), kind))
    }

    pub fn kind(&self, scope: ScopeKey) -> &ScopeKind {
        &self.scopes[scope].kind
    }

    pub fn parent(&self, scope: ScopeKey) -> Option<ScopeKey> {
        self.scopes[scope].parent
    }

    pub fn declare(&mut self, scope: ScopeKey, variable: Variable) {
        self.scopes[scope].variables.insert(variable.name.clone(), variable);
    }

    pub fn declare_info(&mut self, scope: ScopeKey, info: TyInfo) {
        self.scopes[scope].ty_infos.insert(info.name().clone(), info);
    }

    pub fn declare_module(&mut self, scope: ScopeKey, name: SmolStr, module_scope: ScopeKey) {
        self.scopes[scope].modules.insert(name, module_scope);
    }

    pub fn expand(&mut self, scope: ScopeKey, other: ScopeKey) {
        if !self.scopes[scope].imported.contains(&other) {
            self.scopes[scope].imported.push(other);
        }
    }

    // own and imported declarations only, for module-qualified access
    pub fn local_variable(&self, scope: ScopeKey, name: &str) -> Option<&Variable> {
        let s = &self.scopes[scope];
        s.variables.get(name).or_else(|| {
            s.imported.iter().find_map(|&i| self.scopes[i].variables.get(name))
        })
    }

    pub fn find_variable(&self, scope: ScopeKey, name: &str) -> Option<&Variable> {
        self.walk(scope, |s| {
            s.variables.get(name).or_else(|| {
                s.imported.iter().find_map(|&i| self.scopes[i].variables.get(name))
            })
        })
    }

    pub fn find_ty_info(&self, scope: ScopeKey, name: &str) -> Option<&TyInfo> {
        self.walk(scope, |s| {
            s.ty_infos.get(name).or_else(|| {
                s.imported.iter().find_map(|&i| self.scopes[i].ty_infos.get(name))
            })
        })
    }

    pub fn find_module(&self, scope: ScopeKey, name: &str) -> Option<ScopeKey> {
        self.walk(scope, |s| {
            s.modules.get(name).copied().or_else(|| {
                s.imported.iter().find_map(|&i| self.scopes[i].modules.get(name).copied())
            })
        })
    }

    pub fn enclosing_function(&self, scope: ScopeKey) -> Option<ScopeKey> {
        let mut curr = Some(scope);
        while let Some(key) = curr {
            if self.scopes[key].kind.is_function() {
                return Some(key);
            }
            curr = self.scopes[key].parent;
        }
        None
    }

    /// Records `variable` as a capture in every function scope between the
    /// use site and the scope that declared it. Globals and module-level
    /// bindings are reachable directly and never captured.
    pub fn record_capture(&mut self, from: ScopeKey, variable: &Variable) {
        match self.scopes[variable.declared_in].kind {
            ScopeKind::Global | ScopeKind::File { .. } | ScopeKind::Module { .. } => return,
            _ => {}
        }
        let mut curr = from;
        while curr != variable.declared_in {
            if self.scopes[curr].kind.is_function() {
                self.scopes[curr].references.insert(variable.name.clone(), variable.ty.clone());
            }
            match self.scopes[curr].parent {
                Some(parent) => curr = parent,
                None => return
            }
        }
    }

    pub fn references(&self, scope: ScopeKey) -> &IndexMap<SmolStr, Ty> {
        &self.scopes[scope].references
    }

    fn walk<'s, T, F: Fn(&'s Scope) -> Option<T>>(&'s self, scope: ScopeKey, look: F) -> Option<T> {
        let mut curr = Some(scope);
        while let Some(key) = curr {
            let s = &self.scopes[key];
            if let Some(found) = look(s) {
                return Some(found);
            }
            curr = s.parent;
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::infer::info::StructInfo;

    fn variable(name: &str, ty: Ty, mutable: bool, declared_in: ScopeKey) -> Variable {
        Variable { name: name.into(), mutable, ty, declared_in }
    }

    #[test]
    fn test_lookup_walks_the_parent_chain() {
        let (mut scopes, global) = ScopeArena::new();
        let file = scopes.push(global, ScopeKind::File { module: "main".into() });
        let inner = scopes.push(file, ScopeKind::Block);
        scopes.declare(file, variable("x", Ty::int32(), false, file));
        assert_eq!(scopes.find_variable(inner, "x").map(|v| &v.ty), Some(&Ty::int32()));
        assert!(scopes.find_variable(inner, "y").is_none());
    }

    #[test]
    fn test_inner_declaration_shadows_outer() {
        let (mut scopes, global) = ScopeArena::new();
        let inner = scopes.push(global, ScopeKind::Block);
        scopes.declare(global, variable("x", Ty::int32(), false, global));
        scopes.declare(inner, variable("x", Ty::bool(), false, inner));
        assert_eq!(scopes.find_variable(inner, "x").map(|v| &v.ty), Some(&Ty::bool()));
        assert_eq!(scopes.find_variable(global, "x").map(|v| &v.ty), Some(&Ty::int32()));
    }

    #[test]
    fn test_expand_makes_imports_visible() {
        let (mut scopes, global) = ScopeArena::new();
        let lib = scopes.push(global, ScopeKind::File { module: "lib".into() });
        let main = scopes.push(global, ScopeKind::File { module: "main".into() });
        scopes.declare(lib, variable("helper", Ty::fun([], Ty::void()), false, lib));
        scopes.declare_info(lib, TyInfo::Struct(StructInfo::prototype("Point")));
        assert!(scopes.find_variable(main, "helper").is_none());
        scopes.expand(main, lib);
        assert!(scopes.find_variable(main, "helper").is_some());
        assert!(scopes.find_ty_info(main, "Point").is_some());
    }

    #[test]
    fn test_module_lookup() {
        let (mut scopes, global) = ScopeArena::new();
        let file = scopes.push(global, ScopeKind::File { module: "main".into() });
        let module = scopes.push(file, ScopeKind::Module { name: "Inner".into() });
        scopes.declare_module(file, "Inner".into(), module);
        let body = scopes.push(file, ScopeKind::Block);
        assert_eq!(scopes.find_module(body, "Inner"), Some(module));
    }

    #[test]
    fn test_enclosing_function() {
        let (mut scopes, global) = ScopeArena::new();
        let func = scopes.push(global, ScopeKind::Function { name: "f".into(), return_ty: Ty::void() });
        let block = scopes.push(func, ScopeKind::Block);
        assert_eq!(scopes.enclosing_function(block), Some(func));
        assert_eq!(scopes.enclosing_function(global), None);
    }

    #[test]
    fn test_capture_records_into_each_enclosing_function() {
        let (mut scopes, global) = ScopeArena::new();
        let outer = scopes.push(global, ScopeKind::Function { name: "outer".into(), return_ty: Ty::void() });
        scopes.declare(outer, variable("local", Ty::int32(), false, outer));
        let inner = scopes.push(outer, ScopeKind::Function { name: "inner".into(), return_ty: Ty::void() });
        let body = scopes.push(inner, ScopeKind::Block);

        let found = scopes.find_variable(body, "local").cloned().unwrap();
        scopes.record_capture(body, &found);
        assert_eq!(scopes.references(inner).get("local"), Some(&Ty::int32()));
        assert!(scopes.references(outer).get("local").is_none());
    }

    #[test]
    fn test_globals_are_not_captured() {
        let (mut scopes, global) = ScopeArena::new();
        let file = scopes.push(global, ScopeKind::File { module: "main".into() });
        scopes.declare(file, variable("g", Ty::int32(), false, file));
        let func = scopes.push(file, ScopeKind::Function { name: "f".into(), return_ty: Ty::void() });

        let found = scopes.find_variable(func, "g").cloned().unwrap();
        scopes.record_capture(func, &found);
        assert!(scopes.references(func).is_empty());
    }
}
