pub mod ty;
pub mod subst;
pub mod info;
pub mod scope;
pub mod module_graph;
pub mod infer;

pub use self::infer::{analyze, analyze_file, unify, Infer};
