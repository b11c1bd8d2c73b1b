//! Grammar-level passes over the token sequence.
//!
//! Everything here operates on an already-built `TokenStream`:
//! - structural pattern matchers (pure queries, no mutation)
//! - type-normalization passes (in-place, idempotent rewrites)
//! - the expression AST builder and its consistency validator

mod ast;
mod matchers;
mod simplify;
mod validate;

pub use ast::create_ast;
pub use matchers::{find_lambda_end, function_head, lambda_capture_list};
pub use simplify::{simplify_platform_types, simplify_std_type};
pub use validate::{validate_ast, AstViolation};
