//! argus IR - core token-stream types
//!
//! This crate contains the data structures every other part of the engine
//! works against:
//! - `Token` and its classification flags
//! - `TokenStream`, the arena-backed doubly-linked sequence owning all tokens
//!   of one translation unit
//! - `FileRegistry`, the ordered file table tokens reference by index
//! - `Settings`, the read-only configuration supplied by the embedding engine
//!
//! # Design Philosophy
//!
//! - **Handles, not pointers**: every cross-reference between tokens (list
//!   links, AST links, positions held by analysis passes) is a `TokenId`
//!   index into the owning stream's arena. Moving the stream invalidates
//!   nothing.
//! - **One owner**: the stream owns all tokens; the AST is a rebuildable
//!   annotation over the same storage, never a second owner.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod flags;
mod keywords;
mod location;
pub mod numlit;
mod registry;
mod settings;
mod stream;
mod token;

pub use flags::TokenFlags;
pub use keywords::is_keyword;
pub use location::{FileId, SourceLocation};
pub use registry::FileRegistry;
pub use settings::{Language, Platform, Settings, WordSize};
pub use stream::{PreToken, PreprocessedTokens, TokenStream, Tokens};
pub use token::{Token, TokenId};
