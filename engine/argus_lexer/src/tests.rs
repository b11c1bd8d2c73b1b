use pretty_assertions::assert_eq;

use argus_ir::{FileRegistry, Language, TokenStream};

use super::*;

fn lex(code: &str) -> (TokenStream, FileRegistry) {
    let mut stream = TokenStream::new(Language::Cpp);
    let mut registry = FileRegistry::new();
    tokenize(code, "test.cpp", &mut stream, &mut registry).unwrap();
    (stream, registry)
}

fn texts(stream: &TokenStream) -> Vec<String> {
    stream
        .iter()
        .map(|id| stream.token(id).text().to_string())
        .collect()
}

#[test]
fn simple_expression() {
    let (stream, registry) = lex("a+b*c;\n");
    assert_eq!(stream.stringify(), "a + b * c ;");
    assert_eq!(registry.files(), &["test.cpp".to_string()]);

    let cols: Vec<u32> = stream.iter().map(|id| stream.token(id).column()).collect();
    assert_eq!(cols, vec![1, 2, 3, 4, 5, 6]);
    assert!(stream.iter().all(|id| stream.token(id).line() == 1));
}

#[test]
fn line_tracking() {
    let (stream, _) = lex("a\nb\n\nc\n");
    let lines: Vec<u32> = stream.iter().map(|id| stream.token(id).line()).collect();
    assert_eq!(lines, vec![1, 2, 4]);
}

#[test]
fn two_char_operators() {
    let (stream, _) = lex("a++ <<= :: && || -> >= != +=\n");
    assert_eq!(
        texts(&stream),
        ["a", "++", "<<=", "::", "&&", "||", "->", ">=", "!=", "+="]
    );
}

#[test]
fn ellipsis_stays_whole() {
    let (stream, _) = lex("f ( ... ) ;\n");
    assert_eq!(stream.stringify(), "f ( ... ) ;");
}

#[test]
fn string_and_char_literals() {
    let (stream, _) = lex("s = \"a b\" ; c = '\\'' ;\n");
    assert_eq!(
        texts(&stream),
        ["s", "=", "\"a b\"", ";", "c", "=", "'\\''", ";"]
    );
}

#[test]
fn unterminated_string_fails_and_deallocates() {
    let mut stream = TokenStream::new(Language::Cpp);
    let mut registry = FileRegistry::new();
    let err = tokenize("x = \"abc", "test.cpp", &mut stream, &mut registry);
    assert_eq!(
        err,
        Err(TokenizeError::UnterminatedLiteral {
            kind: "string",
            line: 1
        })
    );
    assert!(stream.is_empty());
    assert!(registry.is_empty());
}

#[test]
fn numeric_literals_stay_whole() {
    let (stream, _) = lex("a = 5.4 + 4.2e+10 + .125 ;\n");
    assert_eq!(
        texts(&stream),
        ["a", "=", "5.4", "+", "4.2e+10", "+", "0.125", ";"]
    );
}

#[test]
fn radix_literals_become_decimal() {
    let (stream, _) = lex("x = 0x1F + 010 + 0b11 ;\n");
    assert_eq!(stream.stringify(), "x = 31 + 8 + 3 ;");
}

#[test]
fn bool_keyword_normalization() {
    let (stream, _) = lex("_Bool b ;\n");
    assert_eq!(stream.stringify(), "bool b ;");
}

#[test]
fn file_directives_switch_contexts() {
    let code = "int a;\n#file \"inc.h\"\nint b;\n#endfile\nint c;\n";
    let (stream, registry) = lex(code);
    assert_eq!(stream.stringify(), "int a ; int b ; int c ;");
    assert_eq!(
        registry.files(),
        &["test.cpp".to_string(), "inc.h".to_string()]
    );

    let per_token: Vec<(String, u32, u32)> = stream
        .iter()
        .map(|id| {
            let tok = stream.token(id);
            (tok.text().to_string(), tok.file().raw(), tok.line())
        })
        .collect();
    // "b" is in inc.h at line 1; "c" is back in test.cpp at line 3.
    assert_eq!(per_token[3], ("int".to_string(), 1, 1));
    assert_eq!(per_token[4], ("b".to_string(), 1, 1));
    assert_eq!(per_token[6], ("int".to_string(), 0, 3));
    assert_eq!(per_token[7], ("c".to_string(), 0, 3));
}

#[test]
fn nested_file_directives() {
    let code = "\
#file \"outer.h\"
x;
#file \"inner.h\"
y;
#endfile
z;
#endfile
w;
";
    let (stream, registry) = lex(code);
    assert_eq!(stream.stringify(), "x ; y ; z ; w ;");
    assert_eq!(
        registry.files(),
        &[
            "test.cpp".to_string(),
            "outer.h".to_string(),
            "inner.h".to_string()
        ]
    );
    let files: Vec<u32> = stream.iter().map(|id| stream.token(id).file().raw()).collect();
    assert_eq!(files, vec![1, 1, 2, 2, 1, 1, 0, 0]);
}

#[test]
fn repeated_include_reuses_index() {
    let code = "#file \"a.h\"\nx;\n#endfile\n#file \"a.h\"\ny;\n#endfile\n";
    let (_, registry) = lex(code);
    assert_eq!(registry.files().len(), 2);
}

#[test]
fn unbalanced_endfile_fails() {
    let mut stream = TokenStream::new(Language::Cpp);
    let mut registry = FileRegistry::new();
    let err = tokenize("x;\n#endfile\n", "test.cpp", &mut stream, &mut registry);
    assert_eq!(err, Err(TokenizeError::UnbalancedEndFile { line: 2 }));
    assert!(stream.is_empty());
}

#[test]
fn line_directive_resets_counter() {
    let (stream, _) = lex("a;\n#line 100\nb;\n");
    let lines: Vec<(String, u32)> = stream
        .iter()
        .map(|id| (stream.token(id).text().to_string(), stream.token(id).line()))
        .collect();
    assert_eq!(
        lines,
        vec![
            ("a".to_string(), 1),
            (";".to_string(), 1),
            ("b".to_string(), 100),
            (";".to_string(), 100),
        ]
    );
}

#[test]
fn garbled_line_directive_advances_one() {
    let (stream, _) = lex("a;\n#line ???\nb;\n");
    let last = stream.back().unwrap();
    assert_eq!(stream.token(last).line(), 3);
}

#[test]
fn keywords_are_flagged() {
    let (stream, _) = lex("if ( x ) return ;\n");
    let flags: Vec<bool> = stream.iter().map(|id| stream.token(id).is_keyword()).collect();
    assert_eq!(flags, vec![true, false, false, false, true, false]);
}
