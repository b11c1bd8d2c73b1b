//! The token-list façade: one queryable, mutable, location-annotated
//! sequence per translation unit.
//!
//! A `TokenList` owns the token stream and file registry for one unit and
//! borrows the engine-wide read-only [`Settings`]. It is populated either
//! by tokenizing preprocessed source text or by adopting an
//! externally-tokenized sequence, then normalized in place, annotated with
//! an expression AST, and traversed by analysis passes. Dropping the façade
//! releases every token.
//!
//! Mutation is strictly single-threaded; the engine runs one independent
//! `TokenList` per worker with no shared mutable state. The list is
//! move-only, and moving it never invalidates `TokenId` handles already
//! handed out.

use tracing::debug;

pub use argus_ir::{
    FileId, FileRegistry, Language, Platform, PreToken, PreprocessedTokens, Settings,
    SourceLocation, Token, TokenFlags, TokenId, TokenStream, WordSize,
};
pub use argus_lexer::TokenizeError;
pub use argus_parse::{find_lambda_end, function_head, lambda_capture_list, AstViolation};

/// Token sequence, file table, and configuration for one translation unit.
pub struct TokenList<'s> {
    stream: TokenStream,
    files: FileRegistry,
    settings: &'s Settings,
}

impl<'s> TokenList<'s> {
    pub fn new(settings: &'s Settings) -> Self {
        TokenList {
            stream: TokenStream::new(settings.language),
            files: FileRegistry::new(),
            settings,
        }
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        self.settings
    }

    pub fn is_c(&self) -> bool {
        self.settings.language == Language::C
    }

    pub fn is_cpp(&self) -> bool {
        self.settings.language == Language::Cpp
    }

    /// Is `text` a keyword of the configured language?
    pub fn is_keyword(&self, text: &str) -> bool {
        argus_ir::is_keyword(self.settings.language, text)
    }

    /// Create tokens from preprocessed source text tagged with its path.
    ///
    /// On failure the sequence is left empty and must not be used for
    /// anything but disposal.
    pub fn create_tokens(&mut self, code: &str, path: &str) -> Result<(), TokenizeError> {
        argus_lexer::tokenize(code, path, &mut self.stream, &mut self.files)?;
        debug!(tokens = self.stream.count(), path, "translation unit tokenized");
        Ok(())
    }

    /// Adopt a sequence tokenized by the external preprocessor, including
    /// its file table. Skips re-lexing entirely.
    pub fn adopt(&mut self, pre: PreprocessedTokens) {
        self.stream.adopt(pre, &mut self.files);
        debug!(tokens = self.stream.count(), "external sequence adopted");
    }

    /// Read access to the sequence for analysis passes.
    #[inline]
    pub fn stream(&self) -> &TokenStream {
        &self.stream
    }

    /// Mutable access for passes that rewrite tokens in place.
    #[inline]
    pub fn stream_mut(&mut self) -> &mut TokenStream {
        &mut self.stream
    }

    #[inline]
    pub fn front(&self) -> Option<TokenId> {
        self.stream.front()
    }

    #[inline]
    pub fn back(&self) -> Option<TokenId> {
        self.stream.back()
    }

    /// The file table consumed by report generation. The first entry is the
    /// translation unit's source file.
    pub fn get_files(&self) -> &[String] {
        self.files.files()
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.files
    }

    pub fn source_file_path(&self) -> Option<&str> {
        self.files.files().first().map(String::as_str)
    }

    /// Path of the file a token came from.
    pub fn file(&self, tok: TokenId) -> &str {
        self.files.file(self.stream.token(tok).file())
    }

    /// Reportable path of a token, honoring front-end remapping.
    pub fn orig_file(&self, tok: TokenId) -> &str {
        self.files.orig_file(self.stream.token(tok).file())
    }

    /// Stable `path:line` rendering for a token.
    pub fn file_line(&self, tok: TokenId) -> String {
        self.files.file_line(self.stream.token(tok).location())
    }

    /// Record a front-end path remapping for one file index.
    pub fn set_orig_file(&mut self, file: FileId, path: &str) {
        self.files.set_orig_file(file, path);
    }

    /// Content hash for deduplicating equivalent analysis units.
    pub fn calculate_hash(&self) -> u64 {
        self.stream.calculate_hash()
    }

    /// Debug aid: is `tok` an element of this list?
    pub fn validate_token(&self, tok: Option<TokenId>) -> bool {
        self.stream.validate_token(tok)
    }

    /// Resolve platform-dependent types to fixed-width spellings for the
    /// configured word size.
    pub fn simplify_platform_types(&mut self) {
        argus_parse::simplify_platform_types(&mut self.stream, self.settings);
    }

    /// Collapse compound standard-type spellings into single tokens.
    pub fn simplify_std_type(&mut self) {
        argus_parse::simplify_std_type(&mut self.stream);
    }

    /// Build the expression AST over the sequence, clearing any previous
    /// links first.
    pub fn create_ast(&mut self) {
        argus_parse::create_ast(&mut self.stream);
    }

    /// Check AST invariants. Only runs in verification mode; otherwise the
    /// check is skipped and reports success.
    pub fn validate_ast(&self, strict: bool) -> Result<(), AstViolation> {
        if !self.settings.verify_ast {
            return Ok(());
        }
        argus_parse::validate_ast(&self.stream, &self.files, strict)
    }

    /// Is `tok` the parameter list of a function head whose continuation is
    /// one of `ends_with`?
    pub fn is_function_head(&self, tok: TokenId, ends_with: &[&str]) -> Option<TokenId> {
        function_head(&self.stream, tok, ends_with)
    }

    /// Free every token and clear the file table. Idempotent; also happens
    /// implicitly on drop.
    pub fn deallocate_tokens(&mut self) {
        self.stream.deallocate();
        self.files.clear();
    }
}

impl std::fmt::Debug for TokenList<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TokenList({}, {} files)",
            self.source_file_path().unwrap_or("<empty>"),
            self.files.files().len()
        )
    }
}
