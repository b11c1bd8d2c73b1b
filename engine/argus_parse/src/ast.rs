//! Expression AST construction.
//!
//! A state machine over the linear sequence: tokens are shifted onto an
//! operand stack and reduced by a recursive precedence chain
//! (term → `::` → `.` → mul → add → shift → relational → equality → `&` →
//! `^` → `|` → `&&` → `||` → ternary → assignment → comma), attaching
//! `ast_operand1`/`ast_operand2`/`ast_parent` links onto the tokens
//! themselves. One tree is built per statement or top-level construct;
//! tokens outside any expression receive no links.
//!
//! Disambiguation handled here:
//! - unary vs. binary `*`/`&`/`+`/`-`: prefix position compiles as unary,
//!   a completed term to the left compiles as binary
//! - function call / subscript vs. grouping: a name directly before `(`
//!   or `[` makes the bracket the call/index node
//! - pre vs. post increment/decrement
//! - comma in an argument list reduces under the call's bracket, comma at
//!   statement level reduces as the comma operator

use argus_ir::{Token, TokenId, TokenStream};
use tracing::trace;

const ASSIGN_OPS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=",
];

/// Build AST links over the whole sequence.
///
/// All existing links are cleared first, so rebuilding after a structural
/// edit never leaves a stale link behind.
pub fn create_ast(stream: &mut TokenStream) {
    stream.clear_ast();
    let mut cur = stream.front();
    let mut statement_start = true;
    while let Some(id) = cur {
        if is_root_candidate(stream, id, statement_start) {
            trace!(root = stream.token(id).text(), "compiling expression");
            let pos = {
                let mut builder = Builder {
                    stream: &mut *stream,
                    tok: Some(id),
                    ops: Vec::new(),
                };
                builder.compile_expression();
                builder.tok
            };
            if pos == Some(id) {
                // No progress; step over the token.
                statement_start = is_boundary(stream.token(id).text());
                cur = stream.next(id);
            } else {
                statement_start = false;
                cur = pos;
            }
            continue;
        }
        statement_start = is_boundary(stream.token(id).text());
        cur = stream.next(id);
    }
}

fn is_boundary(text: &str) -> bool {
    matches!(text, ";" | "{" | "}")
}

/// Keywords that act as operands rather than statement structure.
fn is_operand_keyword(text: &str) -> bool {
    matches!(text, "true" | "false" | "nullptr" | "this")
}

fn begins_expression(tok: &Token) -> bool {
    tok.is_literal()
        || tok.is_name()
        || matches!(
            tok.text(),
            "(" | "*" | "&" | "+" | "-" | "!" | "~" | "++" | "--"
        )
}

fn is_root_candidate(stream: &TokenStream, id: TokenId, statement_start: bool) -> bool {
    let tok = stream.token(id);
    let text = tok.text();
    if text == "return" {
        return true;
    }
    if tok.is_keyword() && !is_operand_keyword(text) {
        return false;
    }
    if statement_start && begins_expression(tok) {
        return true;
    }
    // Mid-statement: a name directly followed by a call, subscript, member
    // access, or initializer (catches the expression part of declarations).
    if tok.is_name() {
        if let Some(next) = tok.next() {
            return matches!(stream.token(next).text(), "(" | "[" | "." | "=");
        }
    }
    false
}

enum Term {
    Literal,
    Prefix,
    Name,
    IncDec,
    Paren,
    Other,
}

struct Builder<'a> {
    stream: &'a mut TokenStream,
    /// Current position; `None` once the chain is exhausted.
    tok: Option<TokenId>,
    /// Operand stack.
    ops: Vec<TokenId>,
}

impl Builder<'_> {
    fn advance(&mut self) {
        self.tok = self.tok.and_then(|id| self.stream.token(id).next());
    }

    fn text_is(&self, wanted: &str) -> bool {
        self.tok
            .is_some_and(|id| self.stream.token(id).text() == wanted)
    }

    fn text_in(&self, set: &[&str]) -> bool {
        self.tok
            .is_some_and(|id| set.contains(&self.stream.token(id).text()))
    }

    /// Text of the token after the current one.
    fn peek_text(&self) -> Option<&str> {
        let next = self.stream.token(self.tok?).next()?;
        Some(self.stream.token(next).text())
    }

    fn compile_unary(&mut self, f: fn(&mut Self)) {
        let Some(unary) = self.tok else { return };
        self.advance();
        f(self);
        if let Some(op1) = self.ops.pop() {
            self.stream.set_ast_operand1(unary, op1);
        }
        self.ops.push(unary);
    }

    fn compile_bin(&mut self, f: fn(&mut Self)) {
        let Some(binop) = self.tok else { return };
        self.advance();
        if self.tok.is_some() {
            f(self);
        }
        if let Some(op2) = self.ops.pop() {
            self.stream.set_ast_operand2(binop, op2);
        }
        if let Some(op1) = self.ops.pop() {
            self.stream.set_ast_operand1(binop, op1);
        }
        self.ops.push(binop);
    }

    fn compile_term(&mut self) {
        let Some(id) = self.tok else { return };
        let term = {
            let tok = self.stream.token(id);
            let text = tok.text();
            if tok.is_literal() {
                Term::Literal
            } else if matches!(text, "+" | "-" | "~" | "*" | "&" | "!") || text == "return" {
                Term::Prefix
            } else if matches!(text, "++" | "--") {
                Term::IncDec
            } else if text == "(" {
                Term::Paren
            } else if tok.is_name() && (!tok.is_keyword() || text == "this") {
                Term::Name
            } else {
                Term::Other
            }
        };
        match term {
            Term::Literal => {
                self.ops.push(id);
                self.advance();
            }
            Term::Prefix => self.compile_unary(Self::compile_expression),
            Term::Name => self.compile_name(id),
            Term::IncDec => {
                let postfix = self
                    .ops
                    .last()
                    .is_some_and(|&top| self.stream.token(top).is_op());
                if postfix {
                    if let Some(op1) = self.ops.pop() {
                        self.stream.set_ast_operand1(id, op1);
                    }
                    self.ops.push(id);
                    self.advance();
                } else {
                    self.compile_unary(Self::compile_expression);
                }
            }
            Term::Paren => {
                // Parenthesized sub-expression.
                self.advance();
                self.compile_expression();
                self.advance();
            }
            Term::Other => {}
        }
    }

    /// A name term: plain operand, postfix inc/dec, call, or subscript.
    fn compile_name(&mut self, name: TokenId) {
        enum Form {
            PostIncDec,
            CallOrIndex,
            Plain,
        }
        let form = match self.peek_text() {
            Some("++" | "--") => Form::PostIncDec,
            Some("(" | "[") => Form::CallOrIndex,
            _ => Form::Plain,
        };
        match form {
            Form::PostIncDec => {
                self.advance();
                let Some(op) = self.tok else { return };
                self.stream.set_ast_operand1(op, name);
                self.ops.push(op);
                self.advance();
            }
            Form::CallOrIndex => {
                self.advance();
                let Some(open) = self.tok else { return };
                self.advance();
                if self.text_in(&[")", "]"]) {
                    // Empty argument list / subscript.
                    self.stream.set_ast_operand1(open, name);
                    self.advance();
                } else {
                    self.compile_expression();
                    self.advance(); // past the closing bracket
                    if let Some(args) = self.ops.pop() {
                        self.stream.set_ast_operand2(open, args);
                    }
                    self.stream.set_ast_operand1(open, name);
                }
                self.ops.push(open);
            }
            Form::Plain => {
                self.ops.push(name);
                self.advance();
            }
        }
    }

    fn compile_scope(&mut self) {
        self.compile_term();
        while self.text_is("::") {
            self.compile_bin(Self::compile_term);
        }
    }

    fn compile_dot(&mut self) {
        self.compile_scope();
        while self.text_in(&[".", "->"]) {
            self.compile_bin(Self::compile_scope);
        }
    }

    fn compile_mul_div(&mut self) {
        self.compile_dot();
        while self.text_in(&["*", "/", "%"]) {
            // `* ,` and `* )` are pointer declarations, not multiplications.
            if self.text_is("*") && matches!(self.peek_text(), Some("," | ")")) {
                break;
            }
            self.compile_bin(Self::compile_dot);
        }
    }

    fn compile_add_sub(&mut self) {
        self.compile_mul_div();
        while self.text_in(&["+", "-"]) {
            self.compile_bin(Self::compile_mul_div);
        }
    }

    fn compile_shift(&mut self) {
        self.compile_add_sub();
        while self.text_in(&["<<", ">>"]) {
            self.compile_bin(Self::compile_add_sub);
        }
    }

    fn compile_rel_comp(&mut self) {
        self.compile_shift();
        while self.text_in(&["<", "<=", ">", ">="]) {
            self.compile_bin(Self::compile_shift);
        }
    }

    fn compile_eq_comp(&mut self) {
        self.compile_rel_comp();
        while self.text_in(&["==", "!="]) {
            self.compile_bin(Self::compile_rel_comp);
        }
    }

    fn compile_and(&mut self) {
        self.compile_eq_comp();
        while self.text_is("&") {
            self.compile_bin(Self::compile_eq_comp);
        }
    }

    fn compile_xor(&mut self) {
        self.compile_and();
        while self.text_is("^") {
            self.compile_bin(Self::compile_and);
        }
    }

    fn compile_or(&mut self) {
        self.compile_xor();
        while self.text_is("|") {
            self.compile_bin(Self::compile_xor);
        }
    }

    fn compile_logic_and(&mut self) {
        self.compile_or();
        while self.text_is("&&") {
            self.compile_bin(Self::compile_or);
        }
    }

    fn compile_logic_or(&mut self) {
        self.compile_logic_and();
        while self.text_is("||") {
            self.compile_bin(Self::compile_logic_and);
        }
    }

    fn compile_ternary(&mut self) {
        self.compile_logic_or();
        while self.text_in(&["?", ":"]) {
            self.compile_bin(Self::compile_logic_or);
        }
    }

    fn compile_assign(&mut self) {
        self.compile_ternary();
        if self.text_in(ASSIGN_OPS) {
            // Right-associative: the whole right-hand side reduces first.
            self.compile_bin(Self::compile_assign);
        }
    }

    fn compile_comma(&mut self) {
        self.compile_assign();
        while self.text_is(",") {
            self.compile_bin(Self::compile_assign);
        }
    }

    fn compile_expression(&mut self) {
        self.compile_comma();
    }
}
