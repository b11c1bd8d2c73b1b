//! End-to-end exercises of the token-list façade: tokenize, normalize,
//! build the AST, and query — the way an analysis pass drives it.

#![expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use pretty_assertions::assert_eq;

use argus_engine::{
    function_head, PreToken, PreprocessedTokens, Settings, TokenFlags, TokenId, TokenList,
    TokenizeError, WordSize,
};

fn find(list: &TokenList<'_>, text: &str) -> TokenId {
    list.stream()
        .iter()
        .find(|&id| list.stream().token(id).text() == text)
        .unwrap()
}

#[test]
fn tokenize_simplify_and_query() {
    let settings = Settings::cpp(WordSize::Bits64);
    let mut list = TokenList::new(&settings);
    list.create_tokens(
        "size_t len(const char* s) {\n    return strlen(s);\n}\n",
        "len.cpp",
    )
    .unwrap();

    list.simplify_platform_types();
    list.simplify_std_type();

    assert_eq!(list.source_file_path(), Some("len.cpp"));
    assert_eq!(list.get_files(), &["len.cpp".to_string()]);

    let long_tok = find(&list, "long");
    assert!(list.stream().token(long_tok).flags().contains(TokenFlags::UNSIGNED));
    assert_eq!(list.stream().token(long_tok).original_name(), Some("size_t"));
    assert_eq!(list.file_line(long_tok), "len.cpp:1");

    // The parameter list of `len` is a function head with a `{` body.
    let open = list
        .stream()
        .iter()
        .find(|&id| list.stream().token(id).text() == "(")
        .unwrap();
    let head = list.is_function_head(open, &["{"]);
    assert!(head.is_some());
    assert_eq!(list.stream().token(head.unwrap()).text(), "{");
}

#[test]
fn cast_is_not_a_function_head() {
    let settings = Settings::default();
    let mut list = TokenList::new(&settings);
    list.create_tokens("x = (int)(y);\n", "cast.cpp").unwrap();
    let open = find(&list, "(");
    assert_eq!(list.is_function_head(open, &[";", "{"]), None);
}

#[test]
fn ast_shape_of_simple_expression() {
    let settings = Settings::default();
    let mut list = TokenList::new(&settings);
    list.create_tokens("a+b*c;\n", "expr.cpp").unwrap();
    list.create_ast();

    let plus = find(&list, "+");
    let star = find(&list, "*");
    let stream = list.stream();
    assert_eq!(stream.token(plus).ast_parent(), None);
    assert_eq!(
        stream.token(plus).ast_operand1().map(|id| stream.token(id).text()),
        Some("a")
    );
    assert_eq!(stream.token(plus).ast_operand2(), Some(star));
    assert_eq!(
        stream.token(star).ast_operand1().map(|id| stream.token(id).text()),
        Some("b")
    );
    assert_eq!(
        stream.token(star).ast_operand2().map(|id| stream.token(id).text()),
        Some("c")
    );
    let semi = find(&list, ";");
    assert_eq!(stream.token(semi).ast_parent(), None);
    assert_eq!(stream.token(semi).ast_operand1(), None);
}

#[test]
fn validation_is_gated_on_verification_mode() {
    let verified = Settings {
        verify_ast: true,
        ..Settings::default()
    };

    let mut list = TokenList::new(&verified);
    list.create_tokens("x = f(a, b) + 1;\n", "v.cpp").unwrap();
    list.create_ast();
    assert_eq!(list.validate_ast(true), Ok(()));

    // With verification off the check reports success without running.
    let unverified = Settings::default();
    let mut list = TokenList::new(&unverified);
    list.create_tokens("x = 1;\n", "v.cpp").unwrap();
    assert_eq!(list.validate_ast(true), Ok(()));
}

#[test]
fn hash_is_path_independent() {
    let settings = Settings::default();

    let mut one = TokenList::new(&settings);
    one.create_tokens("int a = 1;\n", "first.cpp").unwrap();

    let mut two = TokenList::new(&settings);
    two.create_tokens("int a = 1;\n", "second/other.cpp").unwrap();

    assert_eq!(one.calculate_hash(), two.calculate_hash());

    let mut three = TokenList::new(&settings);
    three.create_tokens("int a = 2;\n", "first.cpp").unwrap();
    assert_ne!(one.calculate_hash(), three.calculate_hash());
}

#[test]
fn adoption_skips_relexing_but_normalizes() {
    let settings = Settings::default();
    let mut list = TokenList::new(&settings);
    list.adopt(PreprocessedTokens {
        files: vec!["pre.cpp".to_string()],
        tokens: vec![
            PreToken {
                text: "x".into(),
                line: 3,
                column: 1,
                file_index: 0,
            },
            PreToken {
                text: "=".into(),
                line: 3,
                column: 3,
                file_index: 0,
            },
            PreToken {
                text: "0x10".into(),
                line: 3,
                column: 5,
                file_index: 0,
            },
            PreToken {
                text: ";".into(),
                line: 3,
                column: 9,
                file_index: 0,
            },
        ],
    });
    assert_eq!(list.stream().stringify(), "x = 16 ;");
    assert_eq!(list.get_files(), &["pre.cpp".to_string()]);
    let x = find(&list, "x");
    assert_eq!(list.file_line(x), "pre.cpp:3");
}

#[test]
fn orig_file_remapping() {
    let settings = Settings::default();
    let mut list = TokenList::new(&settings);
    list.create_tokens("int a;\n", "build/generated.cpp").unwrap();
    let a = find(&list, "a");
    assert_eq!(list.orig_file(a), "build/generated.cpp");

    list.set_orig_file(list.stream().token(a).file(), "src/original.cpp");
    assert_eq!(list.orig_file(a), "src/original.cpp");
    assert_eq!(list.file_line(a), "src/original.cpp:1");
    // The registry path itself is untouched.
    assert_eq!(list.file(a), "build/generated.cpp");
}

#[test]
fn include_contexts_reported_per_token() {
    let settings = Settings::default();
    let mut list = TokenList::new(&settings);
    list.create_tokens(
        "int a;\n#file \"inc.h\"\nint b;\n#endfile\nint c;\n",
        "main.cpp",
    )
    .unwrap();

    let b = find(&list, "b");
    let c = find(&list, "c");
    assert_eq!(list.file_line(b), "inc.h:1");
    assert_eq!(list.file_line(c), "main.cpp:3");
    assert_eq!(
        list.get_files(),
        &["main.cpp".to_string(), "inc.h".to_string()]
    );
}

#[test]
fn malformed_input_reports_failure() {
    let settings = Settings::default();
    let mut list = TokenList::new(&settings);
    let err = list.create_tokens("const char* s = \"oops", "bad.cpp");
    assert!(matches!(
        err,
        Err(TokenizeError::UnterminatedLiteral { .. })
    ));
    assert_eq!(list.front(), None);
}

#[test]
fn deallocation_is_idempotent() {
    let settings = Settings::default();
    let mut list = TokenList::new(&settings);
    list.create_tokens("int a;\n", "a.cpp").unwrap();
    assert!(list.front().is_some());

    list.deallocate_tokens();
    assert_eq!(list.front(), None);
    assert_eq!(list.back(), None);
    assert!(list.get_files().is_empty());

    // Second invocation is a no-op, not a double free.
    list.deallocate_tokens();
    assert_eq!(list.front(), None);
}

#[test]
fn validate_token_membership() {
    let settings = Settings::default();
    let mut list = TokenList::new(&settings);
    list.create_tokens("a + b;\n", "m.cpp").unwrap();
    let a = find(&list, "a");
    assert!(list.validate_token(Some(a)));
    assert!(list.validate_token(None));

    let mut other = TokenList::new(&settings);
    other.create_tokens("c;\n", "n.cpp").unwrap();
    // A handle beyond the other list's arena is not a member of it.
    let semi = find(&list, ";");
    assert!(!other.validate_token(Some(semi)));
}

#[test]
fn matcher_functions_compose_with_facade_streams() {
    let settings = Settings::default();
    let mut list = TokenList::new(&settings);
    list.create_tokens("auto f = [x](int y) { return x + y; };\n", "l.cpp")
        .unwrap();

    let open = find(&list, "[");
    let close = argus_engine::lambda_capture_list(list.stream(), open).unwrap();
    assert_eq!(list.stream().token(close).text(), "]");

    let end = argus_engine::find_lambda_end(list.stream(), open).unwrap();
    assert_eq!(list.stream().token(end).text(), "}");
    // The matched brace is the lambda's own closing brace, before the ';'.
    assert_eq!(
        list.stream().token(end).next().map(|id| list.stream().token(id).text().to_string()),
        Some(";".to_string())
    );

    // A lambda's parameter list is locally shaped like a function head;
    // callers combine the two queries to tell them apart.
    let paren = find(&list, "(");
    let head = function_head(list.stream(), paren, &["{"]).unwrap();
    assert_eq!(list.stream().token(head).text(), "{");
}

#[test]
fn ast_rebuild_after_edit_is_safe() {
    let settings = Settings::default();
    let mut list = TokenList::new(&settings);
    list.create_tokens("a = b + c;\n", "e.cpp").unwrap();
    list.create_ast();

    // Structural edit: drop "+ c", then rebuild rather than patch.
    let plus = find(&list, "+");
    let c = find(&list, "c");
    list.stream_mut().remove(plus);
    list.stream_mut().remove(c);
    list.create_ast();

    let eq = find(&list, "=");
    let stream = list.stream();
    assert_eq!(
        stream.token(eq).ast_operand1().map(|id| stream.token(id).text()),
        Some("a")
    );
    assert_eq!(
        stream.token(eq).ast_operand2().map(|id| stream.token(id).text()),
        Some("b")
    );
}
