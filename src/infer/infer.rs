use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;
use crate::error::Violation;
use crate::infer::info::{EnumInfo, EnumMemberInfo, FunctionInfo, PropertyInfo, StructInfo, TyInfo};
use crate::infer::module_graph::{DepGraph, ModuleTree};
use crate::infer::scope::{ScopeArena, ScopeKey, ScopeKind, Variable};
use crate::infer::subst::{Ap, Subst};
use crate::infer::ty::{builtin_ty, Ty};
use crate::source::{HasLoc, Location};
use crate::syntax::ast::{
    BinOp, Constant, Decl, Expr, FunctionBody, Pattern, SourceFile, Stmt, TypeRef
};
use crate::typed::{
    ResolvedBody, ResolvedDecl, ResolvedFile, ResolvedStmt, TypedExpr, TypedPattern
};

/// Resolves `root` and everything it transitively imports, dependencies
/// first; each resolved file carries only its own violations.
pub fn analyze<'a>(files: &[SourceFile<'a>], root: &str) -> ResolvedFile<'a> {
    let by_name: IndexMap<SmolStr, &SourceFile<'a>> =
        files.iter().map(|f| (f.module.clone(), f)).collect();

    let mut graph = DepGraph::new();
    for file in files {
        graph.add_vertex(file.module.clone());
        collect_edges(&file.module, &file.program, &mut graph);
    }
    let traversal = graph.depth_first_search(root);

    let mut infer = Infer::new();
    for file in files {
        let scope = infer.scopes.push(infer.global, ScopeKind::File { module: file.module.clone() });
        infer.tree.register(file.module.clone(), scope);
    }

    let mut resolved: Vec<ResolvedFile<'a>> = Vec::new();
    for module in &traversal.order {
        for cycle in &traversal.cycles {
            if cycle.len() >= 2 && &cycle[cycle.len() - 2] == module {
                let loc = by_name
                    .get(module)
                    .map_or(Location::Generated, |f| use_loc(f, &cycle[cycle.len() - 1]));
                infer.violate(Violation::CyclicImport { cycle: cycle.clone(), loc });
            }
        }
        let Some(file) = by_name.get(module) else { continue };
        let mut result = infer.infer_file(file);
        result.violations = infer.drain_violations();
        resolved.push(result);
    }

    let mut result = match resolved.pop() {
        Some(last) if last.module == root => last,
        Some(last) => {
            resolved.push(last);
            empty_file(root)
        }
        None => empty_file(root)
    };
    result.dependencies = resolved;
    result
}

pub fn analyze_file<'a>(file: &SourceFile<'a>) -> ResolvedFile<'a> {
    analyze(std::slice::from_ref(file), &file.module)
}

fn empty_file<'a>(module: &str) -> ResolvedFile<'a> {
    ResolvedFile {
        module: module.into(),
        program: Vec::new(),
        violations: Vec::new(),
        syntax_violations: Vec::new(),
        dependencies: Vec::new()
    }
}

fn collect_edges(module: &SmolStr, decls: &[Decl], graph: &mut DepGraph) {
    for decl in decls {
        match decl {
            Decl::Use { path, .. } => graph.add_edge(module.clone(), path.to_name()),
            Decl::Module { content, .. } => collect_edges(module, content, graph),
            _ => {}
        }
    }
}

fn use_loc<'a>(file: &SourceFile<'a>, target: &str) -> Location<'a> {
    fn search<'a>(decls: &[Decl<'a>], target: &str) -> Option<Location<'a>> {
        for decl in decls {
            match decl {
                Decl::Use { path, loc } if path.to_name() == target => return Some(*loc),
                Decl::Module { content, .. } => {
                    if let Some(loc) = search(content, target) {
                        return Some(loc);
                    }
                }
                _ => {}
            }
        }
        None
    }
    search(&file.program, target).unwrap_or(Location::Generated)
}

// `undef` unifies with anything so one violation does not cascade
pub fn unify(expected: &Ty, found: &Ty) -> Option<Subst> {
    match (expected, found) {
        _ if expected.is_undef() || found.is_undef() => Some(Subst::empty()),
        (Ty::Var(a), Ty::Var(b)) if a == b => Some(Subst::empty()),
        (Ty::Var(v), t) | (t, Ty::Var(v)) => Some(Subst::singleton(v.clone(), t.clone())),
        (Ty::Fun(p1, r1), Ty::Fun(p2, r2)) => {
            let s1 = unify(p1, p2)?;
            let s2 = unify(&r1.ap(&s1), &r2.ap(&s1))?;
            Some(s1.compose(&s2))
        }
        (Ty::Ptr(a), Ty::Ptr(b)) | (Ty::Arr(a), Ty::Arr(b)) => unify(a, b),
        (Ty::App(c1, a1), Ty::App(c2, a2)) if a1.len() == a2.len() => {
            let mut subst = unify(c1, c2)?;
            for (x, y) in a1.iter().zip(a2) {
                let s = unify(&x.ap(&subst), &y.ap(&subst))?;
                subst = subst.compose(&s);
            }
            Some(subst)
        }
        _ if expected == found => Some(Subst::empty()),
        _ => None
    }
}

pub struct Infer<'a> {
    scopes: ScopeArena,
    tree: ModuleTree,
    global: ScopeKey,
    violations: IndexSet<Violation<'a>>
}

impl<'a> Infer<'a> {
    pub fn new() -> Infer<'a> {
        let (scopes, global) = ScopeArena::new();
        Infer { scopes, tree: ModuleTree::new(), global, violations: IndexSet::new() }
    }

    fn violate(&mut self, violation: Violation<'a>) {
        self.violations.insert(violation);
    }

    fn drain_violations(&mut self) -> Vec<Violation<'a>> {
        self.violations.drain(..).collect()
    }

    fn check(&mut self, expected: &Ty, found: &Ty, loc: Location<'a>) -> Subst {
        match unify(expected, found) {
            Some(subst) => subst,
            None => {
                self.violate(Violation::TypeMismatch {
                    expected: expected.clone(),
                    found: found.clone(),
                    loc
                });
                Subst::empty()
            }
        }
    }

    fn infer_file(&mut self, file: &SourceFile<'a>) -> ResolvedFile<'a> {
        let scope = match self.tree.find(&file.module) {
            Some(key) => self.tree.get(key).scope,
            None => {
                let scope = self.scopes.push(self.global, ScopeKind::File { module: file.module.clone() });
                self.tree.register(file.module.clone(), scope);
                scope
            }
        };
        let program = file.program.iter().map(|d| self.infer_decl(scope, d)).collect();
        ResolvedFile {
            module: file.module.clone(),
            program,
            violations: Vec::new(),
            syntax_violations: file.syntax_violations.clone(),
            dependencies: Vec::new()
        }
    }

    fn qualify(&self, scope: ScopeKey, name: &str) -> SmolStr {
        let mut parts = vec![name.to_owned()];
        let mut curr = Some(scope);
        while let Some(key) = curr {
            match self.scopes.kind(key) {
                ScopeKind::File { module } => {
                    parts.push(module.to_string());
                    break;
                }
                ScopeKind::Module { name } => parts.push(name.to_string()),
                _ => {}
            }
            curr = self.scopes.parent(key);
        }
        parts.reverse();
        SmolStr::from(parts.join("."))
    }

    fn infer_decl(&mut self, scope: ScopeKey, decl: &Decl<'a>) -> ResolvedDecl<'a> {
        match decl {
            Decl::Use { path, loc } => {
                let name = path.to_name();
                match self.tree.find(&name) {
                    Some(key) => {
                        let mscope = self.tree.get(key).scope;
                        self.scopes.expand(scope, mscope);
                        self.scopes.declare_module(scope, name.clone(), mscope);
                        if let Some(last) = path.0.last() {
                            self.scopes.declare_module(scope, last.clone(), mscope);
                        }
                        ResolvedDecl::Use { module: Some(key), name, loc: *loc }
                    }
                    None => {
                        self.violate(Violation::UnresolvedModule { name: name.clone(), loc: *loc });
                        ResolvedDecl::Use { module: None, name, loc: *loc }
                    }
                }
            }
            Decl::Module { path, content, loc } => {
                let name = path.to_name();
                let mscope = self.scopes.push(scope, ScopeKind::Module { name: name.clone() });
                self.scopes.declare_module(scope, name.clone(), mscope);
                let qualified = self.qualify(scope, &name);
                let key = self.tree.register(qualified, mscope);
                let content = content.iter().map(|d| self.infer_decl(mscope, d)).collect();
                ResolvedDecl::Module { module: key, name, content, loc: *loc }
            }
            Decl::Struct { name, properties, loc } => {
                self.scopes.declare_info(scope, TyInfo::Struct(StructInfo::prototype(name.clone())));
                let mut members = IndexMap::new();
                for property in properties {
                    let ty = self.resolve_type_ref(scope, &property.ty);
                    members.insert(
                        property.name.clone(),
                        PropertyInfo { name: property.name.clone(), ty, mutable: property.mutable }
                    );
                }
                let info = StructInfo::prototype(name.clone()).completed(members);
                self.scopes.declare_info(scope, TyInfo::Struct(info.clone()));
                ResolvedDecl::Struct { info, loc: *loc }
            }
            Decl::Enum { name, members, loc } => {
                self.scopes.declare_info(scope, TyInfo::Enum(EnumInfo::prototype(name.clone())));
                let mut infos = IndexMap::new();
                for variant in members {
                    let parameters: Vec<Ty> = variant
                        .parameters
                        .iter()
                        .map(|t| self.resolve_type_ref(scope, t))
                        .collect();
                    let member = EnumMemberInfo::new(name.clone(), variant.name.clone(), parameters);
                    self.scopes.declare_info(scope, TyInfo::EnumMember(member.clone()));
                    self.scopes.declare(scope, Variable {
                        name: variant.name.clone(),
                        mutable: false,
                        ty: member.constructor_ty.clone(),
                        declared_in: scope
                    });
                    infos.insert(variant.name.clone(), member);
                }
                let info = EnumInfo::prototype(name.clone()).completed(infos);
                self.scopes.declare_info(scope, TyInfo::Enum(info.clone()));
                ResolvedDecl::Enum { info, loc: *loc }
            }
            Decl::Fun { name, attributes, parameters, return_ty, body, loc } => {
                let parameters: Vec<(SmolStr, Ty)> = parameters
                    .iter()
                    .map(|p| (p.name.clone(), self.resolve_type_ref(scope, &p.ty)))
                    .collect();
                let return_ty = self.resolve_type_ref(scope, return_ty);
                let info = FunctionInfo::new(name.clone(), parameters, return_ty.clone());

                // Declared before the body so direct recursion resolves.
                self.scopes.declare(scope, Variable {
                    name: name.clone(),
                    mutable: false,
                    ty: info.ty.clone(),
                    declared_in: scope
                });
                self.scopes.declare_info(scope, TyInfo::Function(info.clone()));

                let native = Decl::is_native(attributes);
                let fscope = self.scopes.push(scope, ScopeKind::Function {
                    name: name.clone(),
                    return_ty: return_ty.clone()
                });
                for (pname, pty) in &info.parameters {
                    self.scopes.declare(fscope, Variable {
                        name: pname.clone(),
                        mutable: false,
                        ty: pty.clone(),
                        declared_in: fscope
                    });
                }

                let body = match body {
                    FunctionBody::None { .. } => ResolvedBody::None,
                    FunctionBody::Expr { expr, .. } => {
                        let typed = self.infer_expr(fscope, expr);
                        if !native {
                            self.check(&return_ty, &typed.ty(), typed.loc());
                        }
                        ResolvedBody::Expr(Box::new(typed))
                    }
                    FunctionBody::Code { stmts, value, .. } => {
                        let stmts = stmts.iter().map(|s| self.infer_stmt(fscope, s)).collect();
                        let value = value.as_ref().map(|v| {
                            let typed = self.infer_expr(fscope, v);
                            if !native {
                                self.check(&return_ty, &typed.ty(), typed.loc());
                            }
                            Box::new(typed)
                        });
                        ResolvedBody::Code { stmts, value }
                    }
                };

                let references = self.scopes.references(fscope).clone();
                ResolvedDecl::Fun { info, references, body, native, loc: *loc }
            }
            Decl::Let { name, mutable, ty, value, loc } => {
                let typed = self.infer_expr(scope, value);
                let ty = match ty {
                    Some(annotation) => {
                        let annotated = self.resolve_type_ref(scope, annotation);
                        self.check(&annotated, &typed.ty(), typed.loc());
                        annotated
                    }
                    None => typed.ty()
                };
                self.scopes.declare(scope, Variable {
                    name: name.clone(),
                    mutable: *mutable,
                    ty: ty.clone(),
                    declared_in: scope
                });
                ResolvedDecl::Let { name: name.clone(), mutable: *mutable, ty, value: typed, loc: *loc }
            }
        }
    }

    fn infer_stmt(&mut self, scope: ScopeKey, stmt: &Stmt<'a>) -> ResolvedStmt<'a> {
        match stmt {
            Stmt::Expr { expr, loc } => {
                ResolvedStmt::Expr { expr: self.infer_expr(scope, expr), loc: *loc }
            }
            Stmt::Return { value, loc } => {
                let typed = value.as_ref().map(|v| self.infer_expr(scope, v));
                match self.scopes.enclosing_function(scope) {
                    Some(function) => {
                        let kind = self.scopes.kind(function).clone();
                        if let ScopeKind::Function { return_ty, .. } = kind {
                            let found = typed.as_ref().map_or(Ty::void(), |t| t.ty());
                            let at = typed.as_ref().map_or(*loc, |t| t.loc());
                            self.check(&return_ty, &found, at);
                        }
                    }
                    None => self.violate(Violation::ReturnOutsideFunction { loc: *loc })
                }
                ResolvedStmt::Return { value: typed, loc: *loc }
            }
            Stmt::Decl(decl) => ResolvedStmt::Decl(self.infer_decl(scope, decl))
        }
    }

    fn infer_expr(&mut self, scope: ScopeKey, expr: &Expr<'a>) -> TypedExpr<'a> {
        match expr {
            Expr::Const { value, loc } => {
                TypedExpr::Const { value: value.clone(), ty: constant_ty(value), loc: *loc }
            }
            Expr::Access { name, loc } => match self.scopes.find_variable(scope, name).cloned() {
                Some(variable) => {
                    self.scopes.record_capture(scope, &variable);
                    TypedExpr::Access { module: None, name: name.clone(), ty: variable.ty, loc: *loc }
                }
                None => {
                    self.violate(Violation::UnresolvedVariable { name: name.clone(), loc: *loc });
                    TypedExpr::Errored { loc: *loc }
                }
            },
            Expr::Group { value, loc } => {
                TypedExpr::Group { value: Box::new(self.infer_expr(scope, value)), loc: *loc }
            }
            Expr::Call { callee, arguments, loc } => {
                let callee = self.infer_expr(scope, callee);
                let callee_ty = callee.ty();
                let typed_args: Vec<TypedExpr<'a>> = if arguments.is_empty() {
                    vec![TypedExpr::Const { value: Constant::Unit, ty: Ty::void(), loc: *loc }]
                } else {
                    arguments.iter().map(|a| self.infer_expr(scope, a)).collect()
                };
                if callee_ty.is_undef() {
                    return TypedExpr::Errored { loc: *loc };
                }
                if !matches!(callee_ty, Ty::Fun(..)) {
                    self.violate(Violation::NotCallable { found: callee_ty, loc: *loc });
                    return TypedExpr::Errored { loc: *loc };
                }
                let parameters: Vec<Ty> =
                    callee_ty.chain_parameters().into_iter().cloned().collect();
                if typed_args.len() > parameters.len() {
                    self.violate(Violation::ArityMismatch {
                        expected: parameters.len(),
                        found: typed_args.len(),
                        loc: *loc
                    });
                }
                let mut subst = Subst::empty();
                for (arg, parameter) in typed_args.iter().zip(&parameters) {
                    let s = self.check(&parameter.ap(&subst), &arg.ty(), arg.loc());
                    subst = subst.compose(&s);
                }
                let applied = typed_args.len().min(parameters.len());
                let ty = callee_ty.nest(applied - 1).ap(&subst);
                TypedExpr::Call {
                    callee: Box::new(callee),
                    arguments: typed_args,
                    ty,
                    subst,
                    loc: *loc
                }
            }
            Expr::Binary { lhs, op, rhs, loc } => {
                let lhs = self.infer_expr(scope, lhs);
                let rhs = self.infer_expr(scope, rhs);
                let ty = match op {
                    BinOp::Concat => {
                        self.check(&Ty::str(), &lhs.ty(), lhs.loc());
                        self.check(&Ty::str(), &rhs.ty(), rhs.loc());
                        Ty::str()
                    }
                    _ => self.integer_operands(&lhs, &rhs)
                };
                TypedExpr::IntOp { op: *op, lhs: Box::new(lhs), rhs: Box::new(rhs), ty, loc: *loc }
            }
            Expr::Logical { lhs, op, rhs, loc } => {
                let lhs = self.infer_expr(scope, lhs);
                let rhs = self.infer_expr(scope, rhs);
                self.integer_operands(&lhs, &rhs);
                TypedExpr::Logical { op: *op, lhs: Box::new(lhs), rhs: Box::new(rhs), loc: *loc }
            }
            Expr::Assign { name, value, loc } => {
                let value = self.infer_expr(scope, value);
                match self.scopes.find_variable(scope, name).cloned() {
                    Some(variable) => {
                        self.scopes.record_capture(scope, &variable);
                        if !variable.mutable {
                            self.violate(Violation::ImmutableAssign { name: name.clone(), loc: *loc });
                        }
                        self.check(&variable.ty, &value.ty(), value.loc());
                        TypedExpr::Assign {
                            module: None,
                            name: name.clone(),
                            value: Box::new(value),
                            loc: *loc
                        }
                    }
                    None => {
                        self.violate(Violation::UnresolvedVariable { name: name.clone(), loc: *loc });
                        TypedExpr::Errored { loc: *loc }
                    }
                }
            }
            Expr::Get { receiver, property, loc } => {
                if let Some(mscope) = self.module_receiver(scope, receiver) {
                    return match self.scopes.local_variable(mscope, property).cloned() {
                        Some(variable) => TypedExpr::Access {
                            module: self.tree.find_by_scope(mscope),
                            name: property.clone(),
                            ty: variable.ty,
                            loc: *loc
                        },
                        None => {
                            self.violate(Violation::UnresolvedVariable {
                                name: property.clone(),
                                loc: *loc
                            });
                            TypedExpr::Errored { loc: *loc }
                        }
                    };
                }
                let receiver = self.infer_expr(scope, receiver);
                let rty = receiver.ty();
                if rty.is_undef() {
                    return TypedExpr::Errored { loc: *loc };
                }
                match self.find_struct(scope, &rty) {
                    Some(info) => match info.property(property) {
                        Some(found) => TypedExpr::Get {
                            receiver: Box::new(receiver),
                            property: property.clone(),
                            ty: found.ty.clone(),
                            loc: *loc
                        },
                        None => {
                            self.violate(Violation::UnresolvedProperty {
                                property: property.clone(),
                                owner: info.name.clone(),
                                loc: *loc
                            });
                            TypedExpr::Errored { loc: *loc }
                        }
                    },
                    None => {
                        self.violate(Violation::NotAStruct { found: rty, loc: *loc });
                        TypedExpr::Errored { loc: *loc }
                    }
                }
            }
            Expr::Set { receiver, property, value, loc } => {
                let value = self.infer_expr(scope, value);
                if let Some(mscope) = self.module_receiver(scope, receiver) {
                    return match self.scopes.local_variable(mscope, property).cloned() {
                        Some(variable) => {
                            if !variable.mutable {
                                self.violate(Violation::ImmutableAssign {
                                    name: property.clone(),
                                    loc: *loc
                                });
                            }
                            self.check(&variable.ty, &value.ty(), value.loc());
                            TypedExpr::Assign {
                                module: self.tree.find_by_scope(mscope),
                                name: property.clone(),
                                value: Box::new(value),
                                loc: *loc
                            }
                        }
                        None => {
                            self.violate(Violation::UnresolvedVariable {
                                name: property.clone(),
                                loc: *loc
                            });
                            TypedExpr::Errored { loc: *loc }
                        }
                    };
                }
                let receiver = self.infer_expr(scope, receiver);
                let rty = receiver.ty();
                if rty.is_undef() {
                    return TypedExpr::Errored { loc: *loc };
                }
                match self.find_struct(scope, &rty) {
                    Some(info) => match info.property(property) {
                        Some(found) => {
                            if !found.mutable {
                                self.violate(Violation::ImmutableProperty {
                                    property: property.clone(),
                                    struct_name: info.name.clone(),
                                    loc: *loc
                                });
                            }
                            self.check(&found.ty.clone(), &value.ty(), value.loc());
                            TypedExpr::Set {
                                receiver: Box::new(receiver),
                                property: property.clone(),
                                value: Box::new(value),
                                loc: *loc
                            }
                        }
                        None => {
                            self.violate(Violation::UnresolvedProperty {
                                property: property.clone(),
                                owner: info.name.clone(),
                                loc: *loc
                            });
                            TypedExpr::Errored { loc: *loc }
                        }
                    },
                    None => {
                        self.violate(Violation::NotAStruct { found: rty, loc: *loc });
                        TypedExpr::Errored { loc: *loc }
                    }
                }
            }
            Expr::Instance { ty, arguments, loc } => {
                let resolved = self.resolve_type_ref(scope, ty);
                let typed_args: Vec<(SmolStr, TypedExpr<'a>)> = arguments
                    .iter()
                    .map(|(n, e)| (n.clone(), self.infer_expr(scope, e)))
                    .collect();
                if resolved.is_undef() {
                    return TypedExpr::Errored { loc: *loc };
                }
                match self.find_struct(scope, &resolved) {
                    Some(info) => {
                        for (name, value) in &typed_args {
                            match info.property(name) {
                                Some(found) => {
                                    let expected = found.ty.clone();
                                    self.check(&expected, &value.ty(), value.loc());
                                }
                                None => self.violate(Violation::UnresolvedProperty {
                                    property: name.clone(),
                                    owner: info.name.clone(),
                                    loc: value.loc()
                                })
                            }
                        }
                        TypedExpr::Instance {
                            ty: resolved,
                            arguments: typed_args,
                            subst: Subst::empty(),
                            loc: *loc
                        }
                    }
                    None => {
                        self.violate(Violation::NotAStruct { found: resolved, loc: *loc });
                        TypedExpr::Errored { loc: *loc }
                    }
                }
            }
            Expr::Sizeof { ty, loc } => {
                let measured = self.resolve_type_ref(scope, ty);
                TypedExpr::Sizeof { measured, loc: *loc }
            }
            Expr::Ref { value, loc } => {
                TypedExpr::Ref { value: Box::new(self.infer_expr(scope, value)), loc: *loc }
            }
            Expr::Deref { value, loc } => {
                let value = self.infer_expr(scope, value);
                let vty = value.ty();
                match vty.unapply() {
                    Some(inner) => {
                        TypedExpr::Deref { value: Box::new(value), ty: inner, loc: *loc }
                    }
                    None => {
                        if !vty.is_undef() {
                            self.violate(Violation::NotAPointer { found: vty, loc: *loc });
                        }
                        TypedExpr::Errored { loc: *loc }
                    }
                }
            }
            Expr::If { cond, then_branch, else_branch, loc } => {
                let cond = self.infer_expr(scope, cond);
                self.check(&Ty::bool(), &cond.ty(), cond.loc());
                let then_branch = self.infer_expr(scope, then_branch);
                let (else_branch, ty) = match else_branch {
                    Some(other) => {
                        let other = self.infer_expr(scope, other);
                        let ty = other.ty();
                        let then_ty = then_branch.ty();
                        if then_ty != ty && !then_ty.is_undef() && !ty.is_undef() {
                            self.violate(Violation::TypeMismatch {
                                expected: then_ty,
                                found: ty.clone(),
                                loc: other.loc()
                            });
                        }
                        (Some(Box::new(other)), ty)
                    }
                    None => (None, Ty::void())
                };
                TypedExpr::If {
                    cond: Box::new(cond),
                    then_branch: Box::new(then_branch),
                    else_branch,
                    ty,
                    loc: *loc
                }
            }
            Expr::Match { subject, arms, loc } => {
                let subject = self.infer_expr(scope, subject);
                let subject_ty = subject.ty();
                let mut ty: Option<Ty> = None;
                let mut typed_arms = Vec::with_capacity(arms.len());
                for (pattern, body) in arms {
                    let arm_scope = self.scopes.push(scope, ScopeKind::Block);
                    let pattern = self.infer_pattern(arm_scope, pattern, &subject_ty);
                    let body = self.infer_expr(arm_scope, body);
                    let found = body.ty();
                    match &ty {
                        Some(acc) => {
                            if *acc != found && !acc.is_undef() && !found.is_undef() {
                                self.violate(Violation::TypeMismatch {
                                    expected: acc.clone(),
                                    found,
                                    loc: body.loc()
                                });
                            }
                        }
                        None => ty = Some(found)
                    }
                    typed_arms.push((pattern, body));
                }
                TypedExpr::Match {
                    subject: Box::new(subject),
                    arms: typed_arms,
                    ty: ty.unwrap_or_else(Ty::void),
                    subst: Subst::empty(),
                    loc: *loc
                }
            }
            Expr::Block { stmts, value, loc } => {
                let block_scope = self.scopes.push(scope, ScopeKind::Block);
                let stmts = stmts.iter().map(|s| self.infer_stmt(block_scope, s)).collect();
                let value = value.as_ref().map(|v| Box::new(self.infer_expr(block_scope, v)));
                TypedExpr::Block { stmts, value, loc: *loc }
            }
        }
    }

    fn integer_operands(&mut self, lhs: &TypedExpr<'a>, rhs: &TypedExpr<'a>) -> Ty {
        let lty = lhs.ty();
        self.check(&lty, &rhs.ty(), rhs.loc());
        if is_integer(&lty) {
            lty
        } else {
            if !lty.is_undef() {
                self.violate(Violation::TypeMismatch {
                    expected: Ty::int32(),
                    found: lty,
                    loc: lhs.loc()
                });
            }
            Ty::undef()
        }
    }

    fn infer_pattern(
        &mut self,
        scope: ScopeKey,
        pattern: &Pattern<'a>,
        subject: &Ty
    ) -> TypedPattern<'a> {
        match pattern {
            Pattern::Ident { name, loc } => {
                let member = subject
                    .info_name()
                    .and_then(|n| self.scopes.find_ty_info(scope, n))
                    .and_then(|info| match info {
                        TyInfo::Enum(e) => e.member(name).cloned(),
                        _ => None
                    });
                match member {
                    Some(member) => {
                        if !member.parameters.is_empty() {
                            self.violate(Violation::ArityMismatch {
                                expected: member.parameters.len(),
                                found: 0,
                                loc: *loc
                            });
                        }
                        TypedPattern::NamedTuple { member, properties: Vec::new(), loc: *loc }
                    }
                    None => {
                        self.scopes.declare(scope, Variable {
                            name: name.clone(),
                            mutable: false,
                            ty: subject.clone(),
                            declared_in: scope
                        });
                        TypedPattern::Ident { name: name.clone(), ty: subject.clone(), loc: *loc }
                    }
                }
            }
            Pattern::NamedTuple { ty: variant, properties, loc } => {
                let info = subject
                    .info_name()
                    .and_then(|n| self.scopes.find_ty_info(scope, n))
                    .cloned();
                let Some(TyInfo::Enum(e)) = info else {
                    if !subject.is_undef() {
                        self.violate(Violation::NotAnEnum { found: subject.clone(), loc: *loc });
                    }
                    for p in properties {
                        self.infer_pattern(scope, p, &Ty::undef());
                    }
                    return TypedPattern::Ident { name: variant.clone(), ty: Ty::undef(), loc: *loc };
                };
                match e.member(variant).cloned() {
                    Some(member) => {
                        if properties.len() != member.parameters.len() {
                            self.violate(Violation::ArityMismatch {
                                expected: member.parameters.len(),
                                found: properties.len(),
                                loc: *loc
                            });
                        }
                        let typed = properties
                            .iter()
                            .enumerate()
                            .map(|(i, p)| {
                                let pty = member.parameters.get(i).cloned().unwrap_or_else(Ty::undef);
                                self.infer_pattern(scope, p, &pty)
                            })
                            .collect();
                        TypedPattern::NamedTuple { member, properties: typed, loc: *loc }
                    }
                    None => {
                        self.violate(Violation::UnresolvedVariant {
                            name: variant.clone(),
                            enum_name: e.name.clone(),
                            loc: *loc
                        });
                        for p in properties {
                            self.infer_pattern(scope, p, &Ty::undef());
                        }
                        TypedPattern::Ident { name: variant.clone(), ty: Ty::undef(), loc: *loc }
                    }
                }
            }
        }
    }

    // a receiver name that resolves as a variable shadows a same-named
    // module
    fn module_receiver(&self, scope: ScopeKey, receiver: &Expr<'a>) -> Option<ScopeKey> {
        let Expr::Access { name, .. } = receiver else { return None };
        if self.scopes.find_variable(scope, name).is_some() {
            return None;
        }
        self.scopes.find_module(scope, name)
    }

    fn find_struct(&self, scope: ScopeKey, ty: &Ty) -> Option<StructInfo> {
        match ty.info_name().and_then(|n| self.scopes.find_ty_info(scope, n)) {
            Some(TyInfo::Struct(info)) => Some(info.clone()),
            _ => None
        }
    }

    fn resolve_type_ref(&mut self, scope: ScopeKey, type_ref: &TypeRef<'a>) -> Ty {
        match type_ref {
            TypeRef::Access { name, loc } => self.resolve_type_name(scope, name, *loc),
            TypeRef::Ptr { inner, .. } => Ty::ptr(self.resolve_type_ref(scope, inner)),
            TypeRef::Arr { element, .. } => Ty::arr(self.resolve_type_ref(scope, element)),
            TypeRef::Fun { parameters, ret, .. } => {
                let parameters: Vec<Ty> =
                    parameters.iter().map(|p| self.resolve_type_ref(scope, p)).collect();
                Ty::fun(parameters, self.resolve_type_ref(scope, ret))
            }
            TypeRef::App { name, args, loc } => {
                let ctor = self.resolve_type_name(scope, name, *loc);
                if ctor.is_undef() {
                    return Ty::undef();
                }
                let args = args.iter().map(|a| self.resolve_type_ref(scope, a)).collect();
                Ty::App(Box::new(ctor), args)
            }
            TypeRef::Unit { .. } => Ty::void()
        }
    }

    // an unresolved lowercase name reads as a type variable
    fn resolve_type_name(&mut self, scope: ScopeKey, name: &SmolStr, loc: Location<'a>) -> Ty {
        if let Some(ty) = builtin_ty(name) {
            return ty;
        }
        if let Some(info) = self.scopes.find_ty_info(scope, name) {
            return info.ty();
        }
        if name.chars().next().is_some_and(|c| c.is_lowercase()) {
            return Ty::Var(name.clone());
        }
        self.violate(Violation::UnresolvedType { name: name.clone(), loc });
        Ty::undef()
    }
}

impl Default for Infer<'_> {
    fn default() -> Self {
        Infer::new()
    }
}

fn constant_ty(constant: &Constant) -> Ty {
    match constant {
        Constant::Bool(_) => Ty::bool(),
        Constant::Unit => Ty::void(),
        Constant::I8(_) => Ty::int8(),
        Constant::I16(_) => Ty::int16(),
        Constant::I32(_) => Ty::int32(),
        Constant::F32(_) => Ty::float(),
        Constant::F64(_) => Ty::double(),
        Constant::Str(_) => Ty::str()
    }
}

fn is_integer(ty: &Ty) -> bool {
    matches!(ty, Ty::Const(name) if name == "Int8" || name == "Int16" || name == "Int32")
}
