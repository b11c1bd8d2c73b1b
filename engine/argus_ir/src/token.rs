//! The atomic node of the sequence: one lexical unit.

use std::fmt;

use crate::{SourceLocation, TokenFlags};

/// Typed index into a [`TokenStream`](crate::TokenStream) arena.
///
/// Provides type safety over raw `u32` indices when referring to tokens.
/// Uses `u32::MAX` as a sentinel for "no token". Ids are stable for the
/// lifetime of the owning stream: slots are tombstoned on deletion, never
/// reused, so a live id can only ever name the token it was created for.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct TokenId(u32);

impl TokenId {
    /// Sentinel value indicating no token.
    pub const NONE: TokenId = TokenId(u32::MAX);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TokenId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check if this is a valid index (not the `NONE` sentinel).
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }

    /// Convert the sentinel encoding to an `Option`.
    #[inline]
    pub fn as_option(self) -> Option<TokenId> {
        if self.is_valid() {
            Some(self)
        } else {
            None
        }
    }
}

crate::static_assert_size!(TokenId, 4);

/// One lexical unit: text, source coordinates, classification flags,
/// intrusive sequence links, and intrusive AST links.
///
/// Tokens are only ever created and linked by their owning
/// [`TokenStream`](crate::TokenStream); the link fields are ids into the same
/// arena and carry no ownership. AST links are annotations rebuilt after
/// structural edits, never patched.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    text: Box<str>,
    /// Spelling before a normalization pass rewrote this token, if any.
    original_name: Option<Box<str>>,
    location: SourceLocation,
    flags: TokenFlags,
    pub(crate) next: TokenId,
    pub(crate) prev: TokenId,
    pub(crate) ast_parent: TokenId,
    pub(crate) ast_op1: TokenId,
    pub(crate) ast_op2: TokenId,
}

impl Token {
    pub(crate) fn new(text: Box<str>, location: SourceLocation, flags: TokenFlags) -> Self {
        Token {
            text,
            original_name: None,
            location,
            flags,
            next: TokenId::NONE,
            prev: TokenId::NONE,
            ast_parent: TokenId::NONE,
            ast_op1: TokenId::NONE,
            ast_op2: TokenId::NONE,
        }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the token text. The caller is responsible for updating flags
    /// that depend on the spelling (the normalization passes do).
    pub fn set_text(&mut self, text: &str) {
        self.text = text.into();
    }

    #[inline]
    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    pub fn set_original_name(&mut self, name: &str) {
        self.original_name = Some(name.into());
    }

    pub(crate) fn set_original_name_opt(&mut self, name: Option<Box<str>>) {
        self.original_name = name;
    }

    #[inline]
    pub fn location(&self) -> SourceLocation {
        self.location
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.location.line
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.location.column
    }

    #[inline]
    pub fn file(&self) -> crate::FileId {
        self.location.file
    }

    #[inline]
    pub fn flags(&self) -> TokenFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: TokenFlags) {
        self.flags = flags;
    }

    pub fn insert_flags(&mut self, flags: TokenFlags) {
        self.flags |= flags;
    }

    /// Next token in the sequence.
    #[inline]
    pub fn next(&self) -> Option<TokenId> {
        self.next.as_option()
    }

    /// Previous token in the sequence.
    #[inline]
    pub fn previous(&self) -> Option<TokenId> {
        self.prev.as_option()
    }

    /// Parent in the expression tree, if this token participates in one.
    #[inline]
    pub fn ast_parent(&self) -> Option<TokenId> {
        self.ast_parent.as_option()
    }

    /// First operand: the sole operand of a unary/postfix operator, or the
    /// left operand of a binary operator.
    #[inline]
    pub fn ast_operand1(&self) -> Option<TokenId> {
        self.ast_op1.as_option()
    }

    /// Second operand: the right operand of a binary operator.
    #[inline]
    pub fn ast_operand2(&self) -> Option<TokenId> {
        self.ast_op2.as_option()
    }

    // Classification queries, derived from the spelling.

    /// Identifier or keyword: starts with a letter or underscore.
    #[inline]
    pub fn is_name(&self) -> bool {
        self.text
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    }

    /// Numeric literal: starts with a digit.
    #[inline]
    pub fn is_number(&self) -> bool {
        self.text
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    }

    /// String literal, quotes included.
    #[inline]
    pub fn is_string(&self) -> bool {
        self.text.starts_with('"')
    }

    /// Character literal, quotes included.
    #[inline]
    pub fn is_char_literal(&self) -> bool {
        self.text.starts_with('\'')
    }

    /// Literal of any kind: number, string, character, or literal keyword.
    pub fn is_literal(&self) -> bool {
        self.is_number()
            || self.is_string()
            || self.is_char_literal()
            || matches!(&*self.text, "true" | "false" | "nullptr")
    }

    /// Operator or punctuation: anything that is neither a name nor a literal.
    pub fn is_op(&self) -> bool {
        !self.text.is_empty() && !self.is_name() && !self.is_literal()
    }

    /// Keyword bit cached at creation from the stream's language.
    #[inline]
    pub fn is_keyword(&self) -> bool {
        self.flags.contains(TokenFlags::KEYWORD)
    }

    /// Survivor of a type-normalization pass.
    #[inline]
    pub fn is_standard_type(&self) -> bool {
        self.flags.contains(TokenFlags::STANDARD_TYPE)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
