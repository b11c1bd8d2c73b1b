//! Structural pattern matchers.
//!
//! Pure queries over the sequence, safe to call at any point after
//! tokenization. Brackets are matched by depth scanning, never through AST
//! links, so every matcher here also works before the tree is built.

use argus_ir::{TokenId, TokenStream};

/// Qualifiers that may trail a function parameter list before the head's
/// continuation token.
const HEAD_QUALIFIERS: &[&str] = &["const", "volatile", "noexcept", "override", "final", "mutable", "&", "&&"];

/// Find the bracket matching `id` by depth scan: forward from an opener,
/// backward from a closer. `None` when `id` is not a bracket or the match
/// is missing.
pub(crate) fn link_of(stream: &TokenStream, id: TokenId) -> Option<TokenId> {
    let (open, close, forward) = match stream.token(id).text() {
        "(" => ("(", ")", true),
        "[" => ("[", "]", true),
        "{" => ("{", "}", true),
        ")" => ("(", ")", false),
        "]" => ("[", "]", false),
        "}" => ("{", "}", false),
        _ => return None,
    };
    let mut depth = 0u32;
    let mut cur = Some(id);
    while let Some(c) = cur {
        let text = stream.token(c).text();
        let (inward, outward) = if forward { (open, close) } else { (close, open) };
        if text == inward {
            depth += 1;
        } else if text == outward {
            depth -= 1;
            if depth == 0 {
                return Some(c);
            }
        }
        cur = if forward {
            stream.token(c).next()
        } else {
            stream.token(c).previous()
        };
    }
    None
}

/// Is `tok` the parameter list of a function head?
///
/// `tok` is a `(` or `)` of a suspected parameter list. From the matching
/// `)` the matcher skips trailing qualifiers (`const`, `noexcept`,
/// `override`, `final`, ref-qualifiers, `throw (...)`, array suffixes) and
/// returns the continuation token iff its text is one of `ends_with`.
/// Function-style casts and parenthesized expressions fail the continuation
/// test and yield `None`.
pub fn function_head(
    stream: &TokenStream,
    tok: TokenId,
    ends_with: &[&str],
) -> Option<TokenId> {
    let mut close = tok;
    if stream.token(close).text() == "(" {
        close = link_of(stream, close)?;
    }
    if stream.token(close).text() != ")" {
        return None;
    }
    let mut cur = stream.token(close).next()?;
    loop {
        let text = stream.token(cur).text();
        if HEAD_QUALIFIERS.contains(&text) {
            cur = stream.token(cur).next()?;
        } else if text == "throw" {
            let open = stream.token(cur).next()?;
            if stream.token(open).text() != "(" {
                return None;
            }
            cur = stream.token(link_of(stream, open)?).next()?;
        } else if text == "[" {
            cur = stream.token(link_of(stream, cur)?).next()?;
        } else {
            break;
        }
    }
    if ends_with.contains(&stream.token(cur).text()) {
        Some(cur)
    } else {
        None
    }
}

/// Does `tok` open a lambda capture list?
///
/// Returns the matching `]` if so. A capture-list `[` sits in expression
/// position (not after a name, closing bracket, or literal, which would
/// make it a subscript or array declarator) and its `]` is followed by a
/// parameter list, template parameter list, body, or lambda specifier.
pub fn lambda_capture_list(stream: &TokenStream, tok: TokenId) -> Option<TokenId> {
    if stream.token(tok).text() != "[" {
        return None;
    }
    if let Some(prev) = stream.token(tok).previous() {
        let p = stream.token(prev);
        if p.is_name() || p.is_number() || p.is_string() || matches!(p.text(), ")" | "]") {
            return None;
        }
    }
    let close = link_of(stream, tok)?;
    let after = stream.token(close).next()?;
    match stream.token(after).text() {
        "(" | "{" | "<" | "mutable" | "constexpr" | "noexcept" | "->" => Some(close),
        _ => None,
    }
}

/// Skip a `< ... >` template parameter list by depth; returns the token
/// after the matching `>`. Bails out at statement boundaries.
fn skip_angle(stream: &TokenStream, open: TokenId) -> Option<TokenId> {
    let mut depth = 0u32;
    let mut cur = Some(open);
    while let Some(c) = cur {
        match stream.token(c).text() {
            "<" => depth += 1,
            ">" => {
                depth -= 1;
                if depth == 0 {
                    return stream.token(c).next();
                }
            }
            ";" | "{" => return None,
            _ => {}
        }
        cur = stream.token(c).next();
    }
    None
}

/// Locate the closing `}` of a lambda whose AST has not been built.
///
/// `tok` must open a capture list. Handles nested brackets and nested
/// lambdas by matching brackets by depth, and skips an optional template
/// parameter list, parameter list, lambda specifiers, and trailing return
/// type on the way to the body.
pub fn find_lambda_end(stream: &TokenStream, tok: TokenId) -> Option<TokenId> {
    let capture_close = lambda_capture_list(stream, tok)?;
    let mut cur = stream.token(capture_close).next()?;
    if stream.token(cur).text() == "<" {
        cur = skip_angle(stream, cur)?;
    }
    if stream.token(cur).text() == "(" {
        cur = stream.token(link_of(stream, cur)?).next()?;
    }
    loop {
        match stream.token(cur).text() {
            "mutable" | "constexpr" | "consteval" => {
                cur = stream.token(cur).next()?;
            }
            "noexcept" => {
                cur = stream.token(cur).next()?;
                if stream.token(cur).text() == "(" {
                    cur = stream.token(link_of(stream, cur)?).next()?;
                }
            }
            _ => break,
        }
    }
    if stream.token(cur).text() == "->" {
        cur = stream.token(cur).next()?;
        loop {
            match stream.token(cur).text() {
                "{" => break,
                ";" | ")" | "=" | "}" => return None,
                _ => cur = stream.token(cur).next()?,
            }
        }
    }
    if stream.token(cur).text() == "{" {
        link_of(stream, cur)
    } else {
        None
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use pretty_assertions::assert_eq;

    use argus_ir::{FileId, Language, SourceLocation, TokenStream};

    use super::*;

    fn stream_of(texts: &[&str]) -> TokenStream {
        let mut stream = TokenStream::new(Language::Cpp);
        for (i, text) in texts.iter().enumerate() {
            stream.append(
                text,
                SourceLocation::new(FileId::from_raw(0), 1, i as u32 + 1),
                false,
            );
        }
        stream
    }

    fn nth(stream: &TokenStream, n: usize) -> TokenId {
        stream.iter().nth(n).unwrap()
    }

    #[test]
    fn link_matches_by_depth() {
        let stream = stream_of(&["(", "a", "(", "b", ")", ")", ";"]);
        assert_eq!(link_of(&stream, nth(&stream, 0)), Some(nth(&stream, 5)));
        assert_eq!(link_of(&stream, nth(&stream, 5)), Some(nth(&stream, 0)));
        assert_eq!(link_of(&stream, nth(&stream, 2)), Some(nth(&stream, 4)));
        assert_eq!(link_of(&stream, nth(&stream, 1)), None);
    }

    #[test]
    fn function_head_with_body() {
        // int foo ( int x ) {
        let stream = stream_of(&["int", "foo", "(", "int", "x", ")", "{"]);
        let open = nth(&stream, 2);
        let head = function_head(&stream, open, &["{"]);
        assert_eq!(head, Some(nth(&stream, 6)));
        // The closing parenthesis works as the query token too.
        assert_eq!(function_head(&stream, nth(&stream, 5), &["{"]), head);
    }

    #[test]
    fn function_head_declaration() {
        let stream = stream_of(&["void", "f", "(", ")", ";"]);
        assert_eq!(
            function_head(&stream, nth(&stream, 2), &[";", "{"]),
            Some(nth(&stream, 4))
        );
    }

    #[test]
    fn function_head_skips_qualifiers() {
        let stream = stream_of(&["int", "get", "(", ")", "const", "noexcept", "{"]);
        assert_eq!(
            function_head(&stream, nth(&stream, 2), &["{"]),
            Some(nth(&stream, 6))
        );

        let stream = stream_of(&["void", "f", "(", ")", "throw", "(", ")", ";"]);
        assert_eq!(
            function_head(&stream, nth(&stream, 2), &[";"]),
            Some(nth(&stream, 7))
        );
    }

    #[test]
    fn cast_is_not_a_function_head() {
        // ( int ) ( x )
        let stream = stream_of(&["(", "int", ")", "(", "x", ")"]);
        assert_eq!(function_head(&stream, nth(&stream, 0), &[";", "{"]), None);
    }

    #[test]
    fn call_is_not_a_function_head_when_continuation_differs() {
        // foo ( x ) + 1
        let stream = stream_of(&["foo", "(", "x", ")", "+", "1"]);
        assert_eq!(function_head(&stream, nth(&stream, 1), &[";", "{"]), None);
    }

    #[test]
    fn capture_list_in_expression_position() {
        // auto f = [ x ] ( ) { } ;
        let stream = stream_of(&["auto", "f", "=", "[", "x", "]", "(", ")", "{", "}", ";"]);
        assert_eq!(
            lambda_capture_list(&stream, nth(&stream, 3)),
            Some(nth(&stream, 5))
        );
    }

    #[test]
    fn subscript_is_not_a_capture_list() {
        // a [ i ] = 0 ;
        let stream = stream_of(&["a", "[", "i", "]", "=", "0", ";"]);
        assert_eq!(lambda_capture_list(&stream, nth(&stream, 1)), None);
    }

    #[test]
    fn array_declarator_is_not_a_capture_list() {
        // int a [ 3 ] ;
        let stream = stream_of(&["int", "a", "[", "3", "]", ";"]);
        assert_eq!(lambda_capture_list(&stream, nth(&stream, 2)), None);
    }

    #[test]
    fn lambda_end_simple() {
        // [ ] ( ) { return 0 ; }
        let stream = stream_of(&["[", "]", "(", ")", "{", "return", "0", ";", "}"]);
        assert_eq!(find_lambda_end(&stream, nth(&stream, 0)), Some(nth(&stream, 8)));
    }

    #[test]
    fn lambda_end_with_specifiers_and_trailing_return() {
        // [ = ] ( int x ) mutable noexcept -> int { return x ; }
        let stream = stream_of(&[
            "[", "=", "]", "(", "int", "x", ")", "mutable", "noexcept", "->", "int", "{",
            "return", "x", ";", "}",
        ]);
        assert_eq!(
            find_lambda_end(&stream, nth(&stream, 0)),
            Some(nth(&stream, 15))
        );
    }

    #[test]
    fn lambda_end_matches_nested_braces() {
        // [ ] ( ) { if ( a ) { b ; } }
        let stream = stream_of(&[
            "[", "]", "(", ")", "{", "if", "(", "a", ")", "{", "b", ";", "}", "}",
        ]);
        assert_eq!(
            find_lambda_end(&stream, nth(&stream, 0)),
            Some(nth(&stream, 13))
        );
    }

    #[test]
    fn lambda_end_nested_lambda() {
        // [ ] ( ) { [ ] ( ) { } ; }
        let stream = stream_of(&[
            "[", "]", "(", ")", "{", "[", "]", "(", ")", "{", "}", ";", "}",
        ]);
        assert_eq!(
            find_lambda_end(&stream, nth(&stream, 0)),
            Some(nth(&stream, 12))
        );
        assert_eq!(
            find_lambda_end(&stream, nth(&stream, 5)),
            Some(nth(&stream, 10))
        );
    }

    #[test]
    fn lambda_end_requires_body() {
        // [ x ] without anything lambda-shaped after it
        let stream = stream_of(&["[", "x", "]", ";"]);
        assert_eq!(find_lambda_end(&stream, nth(&stream, 0)), None);
    }
}
