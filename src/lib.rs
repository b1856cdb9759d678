pub mod util;
pub mod source;
pub mod error;
pub mod syntax;
pub mod infer;
pub mod typed;
pub mod transform;
