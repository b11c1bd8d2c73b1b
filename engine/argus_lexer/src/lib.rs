//! Tokenization of already-preprocessed C/C++ source.
//!
//! The input contract matches what the engine's preprocessor hands over:
//! comments are gone, line continuations are folded, multi-line strings are
//! joined, and file inclusion is marked inline with `#file "name"` /
//! `#endfile` pairs plus `#line N` resets. This module walks the bytes of
//! one such unit, splits them into tokens with file/line/column coordinates,
//! and populates the file registry as include contexts are entered.
//!
//! Creation-time normalization (radix rewriting, `_Bool`, keyword caching)
//! is applied by the stream itself; see `argus_ir::TokenStream::append`.

use argus_ir::{numlit, FileId, FileRegistry, SourceLocation, TokenStream};

/// Characters that terminate an accumulating token.
const SEPARATORS: &[u8] = b"+-*/%&|^?!=<>[](){};:,.~\n \t\r";

/// Characters that pair with themselves into a two-character operator
/// (`++`, `--`, `<<`, `>>`, `==`, `::`, `&&`, `||`).
const SELF_PAIRING: &[u8] = b"+-<>=:&|";

/// Characters that pair with a following `=` into a compound operator.
const EQ_PAIRING: &[u8] = b"<>!=+-*/%&|^";

/// Failure to tokenize input that violates the pre-lexing contract.
///
/// The sequence is deallocated before any of these is returned; the caller
/// must not use it for anything but disposal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    #[error("unterminated {kind} literal starting at line {line}")]
    UnterminatedLiteral { kind: &'static str, line: u32 },
    #[error("'#endfile' without matching '#file' at line {line}")]
    UnbalancedEndFile { line: u32 },
}

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
    file: FileId,
    line_stack: Vec<u32>,
    file_stack: Vec<FileId>,
    /// Accumulating token text and the coordinates of its first character.
    cur: String,
    cur_line: u32,
    cur_column: u32,
}

/// Split `code` into tokens appended to `stream`, registering `path` (and
/// any `#file` includes) in `registry`.
///
/// On error the stream is deallocated and the registry cleared; the partial
/// sequence is never handed to analysis.
pub fn tokenize(
    code: &str,
    path: &str,
    stream: &mut TokenStream,
    registry: &mut FileRegistry,
) -> Result<(), TokenizeError> {
    let file = registry.append_if_new(path);
    let mut lexer = Lexer {
        bytes: code.as_bytes(),
        pos: 0,
        line: 1,
        column: 1,
        file,
        line_stack: Vec::new(),
        file_stack: Vec::new(),
        cur: String::new(),
        cur_line: 1,
        cur_column: 1,
    };
    match lexer.run(code, stream, registry) {
        Ok(()) => Ok(()),
        Err(err) => {
            stream.deallocate();
            registry.clear();
            Err(err)
        }
    }
}

impl Lexer<'_> {
    fn location(&self, line: u32, column: u32) -> SourceLocation {
        SourceLocation::new(self.file, line, column)
    }

    /// Append the accumulated token, if any.
    fn flush(&mut self, stream: &mut TokenStream) {
        if !self.cur.is_empty() {
            let loc = self.location(self.cur_line, self.cur_column);
            stream.append(&self.cur, loc, true);
            self.cur.clear();
        }
    }

    fn push_cur(&mut self, ch: u8) {
        if self.cur.is_empty() {
            self.cur_line = self.line;
            self.cur_column = self.column;
        }
        self.cur.push(char::from(ch));
    }

    fn run(
        &mut self,
        code: &str,
        stream: &mut TokenStream,
        registry: &mut FileRegistry,
    ) -> Result<(), TokenizeError> {
        while self.pos < self.bytes.len() {
            let ch = self.bytes[self.pos];

            if ch == b'\'' || ch == b'"' {
                self.read_literal(code, stream, registry)?;
                continue;
            }

            // Numeric forms that must stay one token.
            if ch == b'.' && self.cur.as_bytes().first().is_some_and(u8::is_ascii_digit) {
                // Don't separate doubles: "5.4"
                self.push_cur(ch);
                self.advance(1);
                continue;
            }
            if (ch == b'+' || ch == b'-')
                && self.cur.as_bytes().first().is_some_and(u8::is_ascii_digit)
                && matches!(self.cur.as_bytes().last().copied(), Some(b'e' | b'E'))
                && !numlit::is_hex(&self.cur)
            {
                // Don't separate doubles: "4.2e+10"
                self.push_cur(ch);
                self.advance(1);
                continue;
            }
            if self.cur.is_empty()
                && ch == b'.'
                && self
                    .bytes
                    .get(self.pos + 1)
                    .is_some_and(u8::is_ascii_digit)
            {
                // Tokenize .125 as 0.125
                self.push_cur(b'0');
                self.push_cur(b'.');
                self.advance(1);
                continue;
            }

            if SEPARATORS.contains(&ch) {
                self.separator(ch, stream)?;
                continue;
            }

            self.push_cur(ch);
            self.advance(1);
        }
        self.flush(stream);
        Ok(())
    }

    /// Consume `n` bytes, none of which is a newline.
    fn advance(&mut self, n: usize) {
        self.pos += n;
        self.column += n as u32;
    }

    fn separator(&mut self, ch: u8, stream: &mut TokenStream) -> Result<(), TokenizeError> {
        if self.cur == "#file" {
            // The quoted name is handled where literals are handled.
            self.advance(1);
            return Ok(());
        }
        if self.cur == "#line" {
            // The rest of the line is the new line number.
            let rest_start = self.pos;
            let rest_end = memchr::memchr(b'\n', &self.bytes[rest_start..])
                .map_or(self.bytes.len(), |off| rest_start + off);
            let rest = std::str::from_utf8(&self.bytes[rest_start..rest_end])
                .ok()
                .map(str::trim)
                .unwrap_or("");
            match rest.parse::<u32>() {
                Ok(row) => self.line = row,
                Err(_) => self.line += 1,
            }
            self.pos = (rest_end + 1).min(self.bytes.len());
            self.column = 1;
            self.cur.clear();
            return Ok(());
        }
        if self.cur == "#endfile" {
            let line = match self.line_stack.pop() {
                Some(line) => line,
                None => {
                    return Err(TokenizeError::UnbalancedEndFile { line: self.line });
                }
            };
            let file = match self.file_stack.pop() {
                Some(file) => file,
                None => {
                    return Err(TokenizeError::UnbalancedEndFile { line: self.line });
                }
            };
            self.line = line;
            self.file = file;
            self.cur.clear();
            // The separator that ended the directive is swallowed; the
            // restored line number already points past the include.
            self.pos += 1;
            self.column = 1;
            return Ok(());
        }

        self.flush(stream);

        match ch {
            b'\n' => {
                self.pos += 1;
                self.line += 1;
                self.column = 1;
            }
            b' ' | b'\t' | b'\r' => {
                self.advance(1);
            }
            _ => self.operator(ch, stream),
        }
        Ok(())
    }

    /// Emit an operator token, pairing multi-character spellings.
    fn operator(&mut self, ch: u8, stream: &mut TokenStream) {
        let two = self.bytes.get(self.pos + 1).copied();
        let three = self.bytes.get(self.pos + 2).copied();
        let len = if ch == b'.' && two == Some(b'.') && three == Some(b'.') {
            3
        } else if SELF_PAIRING.contains(&ch) && two == Some(ch) {
            // <<= and >>= extend the doubled form.
            if (ch == b'<' || ch == b'>') && three == Some(b'=') {
                3
            } else {
                2
            }
        } else if ch == b'-' && two == Some(b'>') {
            2
        } else if EQ_PAIRING.contains(&ch) && two == Some(b'=') {
            2
        } else {
            1
        };
        let start = self.pos;
        let loc = self.location(self.line, self.column);
        let text: String = self.bytes[start..start + len]
            .iter()
            .map(|&b| char::from(b))
            .collect();
        stream.append(&text, loc, false);
        self.advance(len);
    }

    /// Read a string or character literal, or the quoted name of a `#file`
    /// directive.
    fn read_literal(
        &mut self,
        code: &str,
        stream: &mut TokenStream,
        registry: &mut FileRegistry,
    ) -> Result<(), TokenizeError> {
        let quote = self.bytes[self.pos];
        let kind = if quote == b'"' { "string" } else { "character" };
        let start = self.pos;
        let start_line = self.line;
        let start_column = self.column;
        let mut i = self.pos + 1;
        let mut special = false;
        loop {
            let Some(&c) = self.bytes.get(i) else {
                return Err(TokenizeError::UnterminatedLiteral {
                    kind,
                    line: start_line,
                });
            };
            if special {
                special = false;
            } else if c == b'\\' {
                special = true;
            } else if c == quote {
                break;
            }
            i += 1;
        }
        let literal = &code[start..=i];

        if self.cur == "#file" {
            // Enter the include context named by the literal.
            let name = &literal[1..literal.len() - 1];
            self.line += 1;
            self.file_stack.push(self.file);
            self.file = registry.append_if_new(name);
            self.line_stack.push(self.line);
            self.line = 0;
            self.cur.clear();
        } else {
            self.flush(stream);
            let loc = self.location(start_line, start_column);
            stream.append(literal, loc, false);
        }

        self.column += (i + 1 - self.pos) as u32;
        self.pos = i + 1;
        Ok(())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
