use indexmap::{IndexMap, IndexSet};
use smol_str::SmolStr;
use crate::infer::scope::ScopeKey;
use crate::util::{declare_key_type, KeyMap};

declare_key_type! {
    pub struct ModuleKey;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: SmolStr,
    pub scope: ScopeKey
}

pub struct ModuleTree {
    modules: KeyMap<ModuleKey, Module>,
    by_name: IndexMap<SmolStr, ModuleKey>
}

impl ModuleTree {
    pub fn new() -> ModuleTree {
        ModuleTree { modules: KeyMap::new(), by_name: IndexMap::new() }
    }

    pub fn register(&mut self, name: SmolStr, scope: ScopeKey) -> ModuleKey {
        if let Some(&key) = self.by_name.get(&name) {
            return key;
        }
        let key = self.modules.add(Module { name: name.clone(), scope });
        self.by_name.insert(name, key);
        key
    }

    pub fn find(&self, name: &str) -> Option<ModuleKey> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, key: ModuleKey) -> &Module {
        &self.modules[key]
    }

    pub fn find_by_scope(&self, scope: ScopeKey) -> Option<ModuleKey> {
        self.modules.iter().find(|(_, m)| m.scope == scope).map(|(key, _)| key)
    }
}

impl Default for ModuleTree {
    fn default() -> Self {
        ModuleTree::new()
    }
}

/// `order` lists dependencies before dependents and ends with the root;
/// every vertex appears exactly once. A back edge is recorded as a cycle
/// and not followed.
pub struct Traversal {
    pub order: Vec<SmolStr>,
    pub cycles: Vec<Vec<SmolStr>>
}

pub struct DepGraph {
    edges: IndexMap<SmolStr, IndexSet<SmolStr>>
}

impl DepGraph {
    pub fn new() -> DepGraph {
        DepGraph { edges: IndexMap::new() }
    }

    pub fn add_vertex(&mut self, name: SmolStr) {
        self.edges.entry(name).or_default();
    }

    pub fn add_edge(&mut self, from: SmolStr, to: SmolStr) {
        self.add_vertex(to.clone());
        self.edges.entry(from).or_default().insert(to);
    }

    pub fn dependencies_of(&self, name: &str) -> impl Iterator<Item = &SmolStr> {
        self.edges.get(name).into_iter().flatten()
    }

    pub fn depth_first_search(&self, root: &str) -> Traversal {
        let mut traversal = Traversal { order: Vec::new(), cycles: Vec::new() };
        let mut finished: IndexSet<SmolStr> = IndexSet::new();
        let mut stack: Vec<SmolStr> = Vec::new();
        self.visit(&SmolStr::from(root), &mut finished, &mut stack, &mut traversal);
        traversal
    }

    fn visit(
        &self,
        node: &SmolStr,
        finished: &mut IndexSet<SmolStr>,
        stack: &mut Vec<SmolStr>,
        traversal: &mut Traversal
    ) {
        stack.push(node.clone());
        for dep in self.dependencies_of(node) {
            if let Some(at) = stack.iter().position(|n| n == dep) {
                let mut cycle: Vec<SmolStr> = stack[at..].to_vec();
                cycle.push(dep.clone());
                traversal.cycles.push(cycle);
            } else if !finished.contains(dep) {
                self.visit(dep, finished, stack, traversal);
            }
        }
        stack.pop();
        if finished.insert(node.clone()) {
            traversal.order.push(node.clone());
        }
    }
}

impl Default for DepGraph {
    fn default() -> Self {
        DepGraph::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn names(order: &[SmolStr]) -> Vec<&str> {
        order.iter().map(|n| n.as_str()).collect()
    }

    #[test]
    fn test_dependencies_come_before_dependents() {
        let mut graph = DepGraph::new();
        graph.add_vertex("main".into());
        graph.add_edge("main".into(), "lib".into());
        graph.add_edge("lib".into(), "core".into());
        let traversal = graph.depth_first_search("main");
        assert_eq!(names(&traversal.order), vec!["core", "lib", "main"]);
        assert!(traversal.cycles.is_empty());
    }

    #[test]
    fn test_shared_dependency_appears_once() {
        let mut graph = DepGraph::new();
        graph.add_edge("main".into(), "a".into());
        graph.add_edge("main".into(), "b".into());
        graph.add_edge("a".into(), "core".into());
        graph.add_edge("b".into(), "core".into());
        let traversal = graph.depth_first_search("main");
        assert_eq!(names(&traversal.order), vec!["core", "a", "b", "main"]);
    }

    #[test]
    fn test_cycle_is_reported_and_not_followed() {
        let mut graph = DepGraph::new();
        graph.add_edge("a".into(), "b".into());
        graph.add_edge("b".into(), "a".into());
        let traversal = graph.depth_first_search("a");
        assert_eq!(names(&traversal.order), vec!["b", "a"]);
        assert_eq!(traversal.cycles.len(), 1);
        assert_eq!(names(&traversal.cycles[0]), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_self_import() {
        let mut graph = DepGraph::new();
        graph.add_edge("a".into(), "a".into());
        let traversal = graph.depth_first_search("a");
        assert_eq!(names(&traversal.order), vec!["a"]);
        assert_eq!(names(&traversal.cycles[0]), vec!["a", "a"]);
    }

    #[test]
    fn test_unknown_root_still_terminates() {
        let graph = DepGraph::new();
        let traversal = graph.depth_first_search("main");
        assert_eq!(names(&traversal.order), vec!["main"]);
    }

    #[test]
    fn test_module_registry_is_idempotent() {
        let mut tree = ModuleTree::new();
        let (mut scopes, global) = crate::infer::scope::ScopeArena::new();
        let scope = scopes.push(global, crate::infer::scope::ScopeKind::File { module: "m".into() });
        let a = tree.register("m".into(), scope);
        let b = tree.register("m".into(), scope);
        assert_eq!(a, b);
        assert_eq!(tree.find("m"), Some(a));
        assert_eq!(tree.get(a).name, "m");
    }
}
