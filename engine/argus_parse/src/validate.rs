//! AST consistency checking.
//!
//! A violation here is an internal error of the engine, never a finding
//! about the analyzed code. The check is linear in the tree size and is
//! gated behind the verification flag in normal runs; it returns a
//! structured result so callers can either abort on violation or collect
//! and report.

use argus_ir::{FileRegistry, TokenId, TokenStream};
use rustc_hash::FxHashSet;

/// Internal-consistency failure detected in the expression tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AstViolation {
    #[error("cycle in expression tree at '{text}' ({location})")]
    Cycle { text: String, location: String },
    #[error("expression tree link at '{text}' ({location}) points to a freed token")]
    DanglingLink { text: String, location: String },
    #[error("'{child}' ({location}) is an operand of '{parent}' but names a different parent")]
    InconsistentParent {
        child: String,
        parent: String,
        location: String,
    },
    #[error("'{text}' ({location}) participates in more than one expression tree")]
    SharedNode { text: String, location: String },
    #[error("operator '{text}' ({location}) cannot take {operands} operand(s)")]
    ArityMismatch {
        text: String,
        location: String,
        operands: u8,
    },
    #[error("'{text}' ({location}) has a second operand but no first")]
    MissingOperand { text: String, location: String },
}

fn describe(stream: &TokenStream, registry: &FileRegistry, id: TokenId) -> (String, String) {
    let tok = stream.token(id);
    (tok.text().to_string(), registry.file_line(tok.location()))
}

fn unary_capable(text: &str) -> bool {
    matches!(
        text,
        "+" | "-" | "*" | "&" | "!" | "~" | "++" | "--" | "return" | "(" | "["
    )
}

fn binary_capable(stream: &TokenStream, id: TokenId) -> bool {
    let tok = stream.token(id);
    // Calls and subscripts are the bracket node with two operands.
    tok.is_op() || matches!(tok.text(), "(" | "[")
}

fn check_arity(
    stream: &TokenStream,
    registry: &FileRegistry,
    id: TokenId,
) -> Result<(), AstViolation> {
    let tok = stream.token(id);
    let op1 = tok.ast_operand1();
    let op2 = tok.ast_operand2();
    if op2.is_some() && op1.is_none() {
        let (text, location) = describe(stream, registry, id);
        return Err(AstViolation::MissingOperand { text, location });
    }
    match (op1.is_some(), op2.is_some()) {
        (false, _) => Ok(()),
        (true, false) => {
            if unary_capable(tok.text()) {
                Ok(())
            } else {
                let (text, location) = describe(stream, registry, id);
                Err(AstViolation::ArityMismatch {
                    text,
                    location,
                    operands: 1,
                })
            }
        }
        (true, true) => {
            if binary_capable(stream, id) {
                Ok(())
            } else {
                let (text, location) = describe(stream, registry, id);
                Err(AstViolation::ArityMismatch {
                    text,
                    location,
                    operands: 2,
                })
            }
        }
    }
}

enum Visit {
    Enter(TokenId),
    Exit(TokenId),
}

/// Verify every expression tree in the sequence.
///
/// Checks, for every root: no cycles, no link to a freed token, mutual
/// parent/child consistency, and that no token participates in more than
/// one tree. With `strict`, additionally checks that each node's operand
/// count matches what its text can take. The first violation is returned.
pub fn validate_ast(
    stream: &TokenStream,
    registry: &FileRegistry,
    strict: bool,
) -> Result<(), AstViolation> {
    let mut visited: FxHashSet<u32> = FxHashSet::default();

    for root in stream.iter() {
        let tok = stream.token(root);
        let is_root = tok.ast_parent().is_none()
            && (tok.ast_operand1().is_some() || tok.ast_operand2().is_some());
        if !is_root {
            continue;
        }

        let mut path: FxHashSet<u32> = FxHashSet::default();
        let mut stack = vec![Visit::Enter(root)];
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(id) => {
                    if path.contains(&id.raw()) {
                        let (text, location) = describe(stream, registry, id);
                        return Err(AstViolation::Cycle { text, location });
                    }
                    if !visited.insert(id.raw()) {
                        let (text, location) = describe(stream, registry, id);
                        return Err(AstViolation::SharedNode { text, location });
                    }
                    path.insert(id.raw());
                    stack.push(Visit::Exit(id));

                    if strict {
                        check_arity(stream, registry, id)?;
                    }

                    let tok = stream.token(id);
                    for child in [tok.ast_operand2(), tok.ast_operand1()]
                        .into_iter()
                        .flatten()
                    {
                        let Some(child_tok) = stream.get(child) else {
                            let (text, location) = describe(stream, registry, id);
                            return Err(AstViolation::DanglingLink { text, location });
                        };
                        if child_tok.ast_parent() != Some(id) {
                            let (child_text, location) = describe(stream, registry, child);
                            let (parent_text, _) = describe(stream, registry, id);
                            return Err(AstViolation::InconsistentParent {
                                child: child_text,
                                parent: parent_text,
                                location,
                            });
                        }
                        stack.push(Visit::Enter(child));
                    }
                }
                Visit::Exit(id) => {
                    path.remove(&id.raw());
                }
            }
        }
    }

    // Anything carrying links that no root reached is part of a parent
    // cycle or an orphaned fragment.
    for id in stream.iter() {
        let tok = stream.token(id);
        let linked = tok.ast_parent().is_some()
            || tok.ast_operand1().is_some()
            || tok.ast_operand2().is_some();
        if !linked {
            continue;
        }
        if let Some(parent) = tok.ast_parent() {
            let Some(parent_tok) = stream.get(parent) else {
                let (text, location) = describe(stream, registry, id);
                return Err(AstViolation::DanglingLink { text, location });
            };
            if parent_tok.ast_operand1() != Some(id) && parent_tok.ast_operand2() != Some(id) {
                let (text, location) = describe(stream, registry, id);
                let (parent_text, _) = describe(stream, registry, parent);
                return Err(AstViolation::InconsistentParent {
                    child: text,
                    parent: parent_text,
                    location,
                });
            }
        }
        if !visited.contains(&id.raw()) {
            let (text, location) = describe(stream, registry, id);
            return Err(AstViolation::Cycle { text, location });
        }
    }

    Ok(())
}
