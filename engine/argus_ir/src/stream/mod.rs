//! The token sequence: an arena-backed doubly-linked chain owning every
//! token of one translation unit.
//!
//! Tokens are addressed by [`TokenId`] handles into the arena instead of
//! pointers. Slots are tombstoned on deletion and never reused, so ids held
//! by analysis passes stay unambiguous for the stream's lifetime, and moving
//! the stream between owners transfers the arena and the small front/back
//! endpoint record together without invalidating anything.
//!
//! The sequence keeps no token counter: splices and removals must stay O(1)
//! with no bookkeeping to resynchronize, so size queries pay O(n) traversal
//! instead.

use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::{is_keyword, numlit, FileId, FileRegistry, Language, SourceLocation, Token, TokenFlags, TokenId};

/// Multi-character operators that are lexically atomic: never decomposed by
/// `split`, even though grammar rules elsewhere match one character at a time.
const ATOMIC_OPS: &[&str] = &["::", "->", "->*", ".*", "...", "##"];

/// Front and back of the chain. A plain pair of handles; relocating the
/// owning stream moves this record along with the arena it indexes.
#[derive(Copy, Clone, Debug)]
struct Endpoints {
    front: TokenId,
    back: TokenId,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            front: TokenId::NONE,
            back: TokenId::NONE,
        }
    }
}

/// One flat token record produced by an external preprocessor, before
/// adoption.
#[derive(Clone, Debug)]
pub struct PreToken {
    pub text: String,
    pub line: u32,
    pub column: u32,
    /// Index into the producer's own file table.
    pub file_index: u32,
}

/// An externally-tokenized sequence plus its file table, adopted wholesale
/// without re-lexing.
#[derive(Clone, Debug, Default)]
pub struct PreprocessedTokens {
    pub files: Vec<String>,
    pub tokens: Vec<PreToken>,
}

/// The owned, ordered chain of all tokens for one translation unit.
///
/// Move-only: transferring the stream between owners is a plain move of the
/// arena and endpoint record. Concurrent traversal during a move is
/// forbidden by contract; there is no internal locking.
pub struct TokenStream {
    slots: Vec<Option<Token>>,
    ends: Endpoints,
    language: Language,
}

impl TokenStream {
    pub fn new(language: Language) -> Self {
        TokenStream {
            slots: Vec::new(),
            ends: Endpoints::default(),
            language,
        }
    }

    #[inline]
    pub fn language(&self) -> Language {
        self.language
    }

    /// First token of the chain.
    #[inline]
    pub fn front(&self) -> Option<TokenId> {
        self.ends.front.as_option()
    }

    /// Last token of the chain.
    #[inline]
    pub fn back(&self) -> Option<TokenId> {
        self.ends.back.as_option()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.ends.front.is_valid()
    }

    /// Number of live tokens, derived by traversal (no counter is kept).
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Resolve a handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a live token of this stream.
    #[inline]
    pub fn token(&self, id: TokenId) -> &Token {
        match self.slots.get(id.index()).and_then(Option::as_ref) {
            Some(tok) => tok,
            None => panic!("stale or foreign token id {id:?}"),
        }
    }

    /// Resolve a handle for mutation.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a live token of this stream.
    #[inline]
    pub fn token_mut(&mut self, id: TokenId) -> &mut Token {
        match self.slots.get_mut(id.index()).and_then(Option::as_mut) {
            Some(tok) => tok,
            None => panic!("stale or foreign token id {id:?}"),
        }
    }

    /// Tolerant resolution: `None` for freed or foreign ids.
    #[inline]
    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Text of a token, by handle.
    #[inline]
    pub fn text(&self, id: TokenId) -> &str {
        self.token(id).text()
    }

    /// Successor of a token, by handle.
    #[inline]
    pub fn next(&self, id: TokenId) -> Option<TokenId> {
        self.token(id).next()
    }

    /// Predecessor of a token, by handle.
    #[inline]
    pub fn previous(&self, id: TokenId) -> Option<TokenId> {
        self.token(id).previous()
    }

    /// Append tokens for `text` at the back of the chain.
    ///
    /// Empty text is a no-op. With `split`, multi-character operator text is
    /// decomposed into single-character tokens sharing `location` (atomic
    /// operators like `::` and `->` stay whole), and text containing `##` is
    /// first divided at the paste-operator boundaries. Returns the last
    /// token created.
    pub fn append(&mut self, text: &str, location: SourceLocation, split: bool) -> Option<TokenId> {
        self.insert_pieces(self.ends.back, text, location, split)
    }

    /// Insert tokens for `text` directly after `pos`. Same splitting and
    /// normalization rules as [`append`](Self::append).
    pub fn insert_after(
        &mut self,
        pos: TokenId,
        text: &str,
        location: SourceLocation,
        split: bool,
    ) -> Option<TokenId> {
        debug_assert!(self.get(pos).is_some(), "insert position must be live");
        self.insert_pieces(pos, text, location, split)
    }

    fn insert_pieces(
        &mut self,
        mut pos: TokenId,
        text: &str,
        location: SourceLocation,
        split: bool,
    ) -> Option<TokenId> {
        if text.is_empty() {
            return None;
        }
        let mut pieces = Vec::new();
        decompose(text, split, &mut pieces);
        let mut last = None;
        for piece in pieces {
            let id = self.new_token(piece, location);
            self.link_after(id, pos);
            pos = id;
            last = Some(id);
        }
        last
    }

    /// Allocate one token, applying creation-time normalization: hex/oct/bin
    /// integer literals are rewritten to decimal, `_Bool` becomes `bool`,
    /// and the keyword bit is cached from the stream's language.
    fn new_token(&mut self, text: &str, location: SourceLocation) -> TokenId {
        assert!(
            self.slots.len() < u32::MAX as usize,
            "token arena exhausted"
        );
        let normalized: Box<str> = match numlit::to_decimal(text) {
            Some(decimal) => decimal.into(),
            None if text == "_Bool" => "bool".into(),
            None => text.into(),
        };
        let mut flags = TokenFlags::empty();
        if is_keyword(self.language, &normalized) {
            flags |= TokenFlags::KEYWORD;
        }
        let id = TokenId::from_raw(self.slots.len() as u32);
        self.slots.push(Some(Token::new(normalized, location, flags)));
        id
    }

    /// Allocate a verbatim copy of an existing record (no normalization),
    /// links reset.
    fn alloc_copy(&mut self, text: Box<str>, original_name: Option<Box<str>>, location: SourceLocation, flags: TokenFlags) -> TokenId {
        assert!(
            self.slots.len() < u32::MAX as usize,
            "token arena exhausted"
        );
        let mut tok = Token::new(text, location, flags);
        tok.set_original_name_opt(original_name);
        let id = TokenId::from_raw(self.slots.len() as u32);
        self.slots.push(Some(tok));
        id
    }

    /// Link a fresh, unlinked token after `pos`; `pos == NONE` links it as
    /// the new front.
    fn link_after(&mut self, id: TokenId, pos: TokenId) {
        if !pos.is_valid() {
            let old_front = self.ends.front;
            self.token_mut(id).next = old_front;
            self.token_mut(id).prev = TokenId::NONE;
            if old_front.is_valid() {
                self.token_mut(old_front).prev = id;
            } else {
                self.ends.back = id;
            }
            self.ends.front = id;
        } else {
            let next = self.token(pos).next;
            {
                let tok = self.token_mut(id);
                tok.prev = pos;
                tok.next = next;
            }
            self.token_mut(pos).next = id;
            if next.is_valid() {
                self.token_mut(next).prev = id;
            } else {
                self.ends.back = id;
            }
        }
    }

    /// Relink the inclusive chain `[first..=last]` after `dest`, with no
    /// copying. All three handles must be live members of this stream and
    /// `dest` must not lie inside the range.
    pub fn splice_after(&mut self, dest: TokenId, first: TokenId, last: TokenId) {
        // Detach the range.
        let before = self.token(first).prev;
        let after = self.token(last).next;
        if before.is_valid() {
            self.token_mut(before).next = after;
        } else {
            self.ends.front = after;
        }
        if after.is_valid() {
            self.token_mut(after).prev = before;
        } else {
            self.ends.back = before;
        }
        // Relink after dest.
        let dest_next = self.token(dest).next;
        self.token_mut(dest).next = first;
        self.token_mut(first).prev = dest;
        self.token_mut(last).next = dest_next;
        if dest_next.is_valid() {
            self.token_mut(dest_next).prev = last;
        } else {
            self.ends.back = last;
        }
    }

    /// Deep-copy the half-open range `[first, end)` (`end == None` copies
    /// through the back) and link the copies after `dest`.
    ///
    /// With `one_line` every copy is stamped with `dest`'s line number;
    /// otherwise each copy keeps its line *offset* relative to the first
    /// copied token, so relative spacing survives. Copies carry text, flags,
    /// and original names; AST links are never copied. Returns the last
    /// inserted copy, or `dest` when the range is empty.
    pub fn copy_tokens(
        &mut self,
        dest: TokenId,
        first: TokenId,
        end: Option<TokenId>,
        one_line: bool,
    ) -> TokenId {
        let dest_line = self.token(dest).line();
        let mut src = Some(first);
        let mut base_line: Option<u32> = None;
        let mut pos = dest;
        while let Some(cur) = src {
            if end == Some(cur) {
                break;
            }
            let (text, orig, mut location, flags, next) = {
                let tok = self.token(cur);
                (
                    Box::<str>::from(tok.text()),
                    tok.original_name().map(Box::<str>::from),
                    tok.location(),
                    tok.flags(),
                    tok.next(),
                )
            };
            location.line = if one_line {
                dest_line
            } else {
                let base = *base_line.get_or_insert(location.line);
                dest_line.saturating_add(location.line.saturating_sub(base))
            };
            let id = self.alloc_copy(text, orig, location, flags);
            self.link_after(id, pos);
            pos = id;
            src = next;
        }
        pos
    }

    /// Unlink and free one token. AST links held by other tokens are not
    /// patched; the tree must be rebuilt after structural edits.
    pub fn remove(&mut self, id: TokenId) {
        let (prev, next) = {
            let tok = self.token(id);
            (tok.prev, tok.next)
        };
        if prev.is_valid() {
            self.token_mut(prev).next = next;
        } else {
            self.ends.front = next;
        }
        if next.is_valid() {
            self.token_mut(next).prev = prev;
        } else {
            self.ends.back = prev;
        }
        self.slots[id.index()] = None;
    }

    /// Free every token reachable from `start` by `next` links. Intended for
    /// detached sub-chains; the chain's endpoints are not touched.
    pub fn delete_chain(&mut self, start: TokenId) {
        let mut cur = start.as_option();
        while let Some(id) = cur {
            cur = self.token(id).next();
            self.slots[id.index()] = None;
        }
    }

    /// Free the whole sequence (owned chain and any detached remnants) and
    /// reset both endpoints. Idempotent.
    pub fn deallocate(&mut self) {
        self.slots.clear();
        self.ends = Endpoints::default();
    }

    /// Iterate front→back.
    pub fn iter(&self) -> Tokens<'_> {
        Tokens {
            stream: self,
            cur: self.front(),
        }
    }

    /// Iterate from `start` (inclusive) to the back.
    pub fn iter_from(&self, start: TokenId) -> Tokens<'_> {
        Tokens {
            stream: self,
            cur: start.as_option(),
        }
    }

    /// Deterministic hash of every token's text and classification flags in
    /// sequence order. Independent of file paths and of absolute
    /// line/column, so two syntactically identical units hash identically
    /// wherever they came from. Used to deduplicate equivalent analysis
    /// units cheaply.
    pub fn calculate_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        for id in self.iter() {
            let tok = self.token(id);
            tok.text().hash(&mut hasher);
            tok.flags().bits().hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Linear scan confirming `tok` is reachable from the front. `None` is
    /// vacuously valid. A debug aid, not for hot paths.
    pub fn validate_token(&self, tok: Option<TokenId>) -> bool {
        let Some(tok) = tok else {
            return true;
        };
        self.iter().any(|id| id == tok)
    }

    /// Attach `operand` as the first operand of `parent`, updating both
    /// directions of the link.
    pub fn set_ast_operand1(&mut self, parent: TokenId, operand: TokenId) {
        self.token_mut(operand).ast_parent = parent;
        self.token_mut(parent).ast_op1 = operand;
    }

    /// Attach `operand` as the second operand of `parent`, updating both
    /// directions of the link.
    pub fn set_ast_operand2(&mut self, parent: TokenId, operand: TokenId) {
        self.token_mut(operand).ast_parent = parent;
        self.token_mut(parent).ast_op2 = operand;
    }

    /// Clear every AST link in the arena. Run before any rebuild so no
    /// stale link survives a partial pass.
    pub fn clear_ast(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.ast_parent = TokenId::NONE;
            slot.ast_op1 = TokenId::NONE;
            slot.ast_op2 = TokenId::NONE;
        }
    }

    /// Adopt an externally-tokenized sequence, remapping its file table
    /// into `registry` and appending every token without re-lexing.
    /// Creation-time normalization still applies.
    pub fn adopt(&mut self, pre: PreprocessedTokens, registry: &mut FileRegistry) {
        let remap: Vec<FileId> = pre
            .files
            .iter()
            .map(|path| registry.append_if_new(path))
            .collect();
        for tok in pre.tokens {
            let file = remap
                .get(tok.file_index as usize)
                .copied()
                .unwrap_or(FileId::NONE);
            self.append(
                &tok.text,
                SourceLocation::new(file, tok.line, tok.column),
                false,
            );
        }
    }

    /// Token texts joined by single spaces; debugging and test aid.
    pub fn stringify(&self) -> String {
        let mut out = String::new();
        for id in self.iter() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(self.token(id).text());
        }
        out
    }
}

impl fmt::Debug for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenStream({} tokens)", self.count())
    }
}

/// Front→back iterator over token handles.
pub struct Tokens<'a> {
    stream: &'a TokenStream,
    cur: Option<TokenId>,
}

impl Iterator for Tokens<'_> {
    type Item = TokenId;

    fn next(&mut self) -> Option<TokenId> {
        let id = self.cur?;
        self.cur = self.stream.token(id).next();
        Some(id)
    }
}

/// Break `text` into the pieces that become tokens.
fn decompose<'t>(text: &'t str, split: bool, out: &mut Vec<&'t str>) {
    if !split {
        out.push(text);
        return;
    }
    if text.contains("##") && text != "##" {
        let mut rest = text;
        while let Some(i) = rest.find("##") {
            if i > 0 {
                out.push(&rest[..i]);
            }
            out.push("##");
            rest = &rest[i + 2..];
        }
        if !rest.is_empty() {
            out.push(rest);
        }
        return;
    }
    let is_op = text
        .chars()
        .next()
        .is_some_and(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '"' || c == '\''));
    if is_op && text.len() > 1 && text.is_ascii() && !ATOMIC_OPS.contains(&text) {
        for i in 0..text.len() {
            out.push(&text[i..=i]);
        }
        return;
    }
    out.push(text);
}
