//! Rewrites every top-level binding to a module-qualified unique name so
//! codegen can emit one flat symbol table.

use std::collections::HashMap;
use smol_str::SmolStr;
use crate::infer::module_graph::ModuleKey;
use crate::transform::Transform;
use crate::typed::{ResolvedDecl, ResolvedFile, TypedExpr, TypedPattern};

pub fn mangle(file: ResolvedFile) -> ResolvedFile {
    let mut exports = HashMap::new();
    let mut module_names = HashMap::new();
    for dep in &file.dependencies {
        collect_exports(&dep.module, &dep.program, &mut exports, &mut module_names);
    }
    collect_exports(&file.module, &file.program, &mut exports, &mut module_names);

    let mut file = file;
    let dependencies = std::mem::take(&mut file.dependencies);
    let mut result = mangle_one(file, &exports, &module_names);
    result.dependencies = dependencies
        .into_iter()
        .map(|d| mangle_one(d, &exports, &module_names))
        .collect();
    result
}

fn mangle_one<'a>(
    file: ResolvedFile<'a>,
    exports: &HashMap<SmolStr, SmolStr>,
    module_names: &HashMap<ModuleKey, SmolStr>
) -> ResolvedFile<'a> {
    let mut pass = Mangle {
        prefix: file.module.clone(),
        top_level: exports.clone(),
        module_names: module_names.clone(),
        locals: Vec::new(),
        depth: 0
    };
    pass.fold_file(file)
}

// a file's own declarations are collected last so they win over
// same-named imports
fn collect_exports(
    module: &SmolStr,
    decls: &[ResolvedDecl],
    exports: &mut HashMap<SmolStr, SmolStr>,
    module_names: &mut HashMap<ModuleKey, SmolStr>
) {
    for decl in decls {
        match decl {
            ResolvedDecl::Fun { info, .. } => {
                exports.insert(info.name.clone(), qualified(module, &info.name));
            }
            ResolvedDecl::Let { name, .. } => {
                exports.insert(name.clone(), qualified(module, name));
            }
            ResolvedDecl::Module { module: key, name, content, .. } => {
                let nested = qualified(module, name);
                module_names.insert(*key, nested.clone());
                collect_exports(&nested, content, exports, module_names);
            }
            ResolvedDecl::Use { module: Some(key), name, .. } => {
                module_names.entry(*key).or_insert_with(|| name.clone());
            }
            _ => {}
        }
    }
}

fn qualified(prefix: &str, name: &str) -> SmolStr {
    SmolStr::from(format!("{prefix}.{name}"))
}

struct Mangle {
    prefix: SmolStr,
    top_level: HashMap<SmolStr, SmolStr>,
    module_names: HashMap<ModuleKey, SmolStr>,
    // names bound inside the function being folded; these shadow
    // top-level names and are never rewritten
    locals: Vec<SmolStr>,
    depth: usize
}

impl Mangle {
    fn rename(&self, module: Option<ModuleKey>, name: SmolStr) -> SmolStr {
        if let Some(key) = module {
            return match self.module_names.get(&key) {
                Some(owner) => qualified(owner, &name),
                None => name
            };
        }
        if self.locals.iter().any(|local| *local == name) {
            return name;
        }
        self.top_level.get(&name).cloned().unwrap_or(name)
    }
}

impl<'a> Transform<'a> for Mangle {
    fn transform_expr(&mut self, expr: TypedExpr<'a>) -> TypedExpr<'a> {
        match expr {
            TypedExpr::Access { module, name, ty, loc } => {
                let name = self.rename(module, name);
                TypedExpr::Access { module, name, ty, loc }
            }
            TypedExpr::Assign { module, name, value, loc } => {
                let name = self.rename(module, name);
                TypedExpr::Assign { module, name, value, loc }
            }
            other => other
        }
    }

    fn transform_pattern(&mut self, pattern: TypedPattern<'a>) -> TypedPattern<'a> {
        if let TypedPattern::Ident { name, .. } = &pattern {
            self.locals.push(name.clone());
        }
        pattern
    }

    fn fold_decl(&mut self, decl: ResolvedDecl<'a>) -> ResolvedDecl<'a> {
        match decl {
            ResolvedDecl::Fun { mut info, references, body, native, loc } => {
                if self.depth > 0 {
                    self.locals.push(info.name.clone());
                }
                let mark = self.locals.len();
                self.locals.extend(info.parameters.iter().map(|(name, _)| name.clone()));
                self.depth += 1;
                let body = self.fold_body(body);
                self.depth -= 1;
                self.locals.truncate(mark);
                if self.depth == 0 {
                    info.name = qualified(&self.prefix, &info.name);
                }
                ResolvedDecl::Fun { info, references, body, native, loc }
            }
            ResolvedDecl::Let { name, mutable, ty, value, loc } => {
                let value = self.fold_expr(value);
                if self.depth == 0 {
                    ResolvedDecl::Let { name: qualified(&self.prefix, &name), mutable, ty, value, loc }
                } else {
                    self.locals.push(name.clone());
                    ResolvedDecl::Let { name, mutable, ty, value, loc }
                }
            }
            ResolvedDecl::Module { module, name, content, loc } => {
                let saved = self.prefix.clone();
                self.prefix = qualified(&self.prefix, &name);
                let content = content.into_iter().map(|d| self.fold_decl(d)).collect();
                self.prefix = saved;
                ResolvedDecl::Module { module, name, content, loc }
            }
            other => other
        }
    }
}
