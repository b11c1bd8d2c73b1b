//! In-place type-normalization passes.
//!
//! Both passes preserve meaning while reducing token-level variety, and both
//! are idempotent: running a pass twice leaves the same sequence as running
//! it once. They rewrite tokens in place or remove consumed tokens; they
//! never reorder the sequence, so AST links (if already built) must be
//! rebuilt afterwards like after any structural edit.

use argus_ir::{Settings, TokenFlags, TokenId, TokenStream, WordSize};
use tracing::debug;

/// Replace platform-dependent type spellings with the fixed-width
/// equivalent for the configured word size.
///
/// On a 32-bit profile `size_t` becomes `unsigned long`; on a 64-bit
/// profile it becomes `unsigned long long`. The rewrite is a single-token
/// text/flag substitution with no structural change; the original spelling
/// is kept as the token's original name for reporting.
pub fn simplify_platform_types(stream: &mut TokenStream, settings: &Settings) {
    let long_flag = match settings.platform.word_size {
        WordSize::Bits32 => TokenFlags::empty(),
        WordSize::Bits64 => TokenFlags::LONG,
    };
    let mut rewritten = 0usize;
    let ids: Vec<TokenId> = stream.iter().collect();
    for id in ids {
        let flags = match stream.token(id).text() {
            "size_t" | "uintptr_t" => TokenFlags::UNSIGNED | long_flag,
            "ssize_t" | "ptrdiff_t" | "intptr_t" => long_flag,
            _ => continue,
        };
        // A member named like a platform type is not a type.
        if stream
            .token(id)
            .previous()
            .is_some_and(|prev| matches!(stream.token(prev).text(), "." | "::" | "->"))
        {
            continue;
        }
        let original = stream.token(id).text().to_owned();
        let tok = stream.token_mut(id);
        tok.set_original_name(&original);
        tok.set_text("long");
        tok.insert_flags(flags | TokenFlags::KEYWORD | TokenFlags::STANDARD_TYPE);
        rewritten += 1;
    }
    debug!(rewritten, "platform types resolved");
}

/// Keywords that can take part in a compound fundamental type spelling.
fn is_std_type_keyword(text: &str) -> bool {
    matches!(
        text,
        "char" | "double" | "float" | "int" | "long" | "short" | "signed" | "unsigned"
    )
}

/// Collapse a run of adjacent keywords spelling one compound fundamental
/// type into a single surviving token carrying combined flags.
///
/// `unsigned long long int` collapses to `long` with the UNSIGNED and LONG
/// flags set, whatever legal order the keywords came in. The survivor is
/// the size/base specifier of the run: the last `long` (unless a floating
/// base follows), else `short`, `float`, `double`, or the first `char`/
/// `int`. A lone sign keyword keeps its own text and just gains its flag.
/// Non-type keyword runs are left untouched.
pub fn simplify_std_type(stream: &mut TokenStream) {
    let mut collapsed = 0usize;
    let mut cur = stream.front();
    while let Some(start) = cur {
        if !stream.token(start).is_keyword() || !is_std_type_keyword(stream.token(start).text()) {
            cur = stream.next(start);
            continue;
        }

        let mut count_long = 0u32;
        let mut is_unsigned = false;
        let mut is_signed = false;
        let mut is_float = false;
        let mut type_spec: Option<TokenId> = None;
        let mut run = Vec::new();

        let mut walk = Some(start);
        while let Some(id) = walk {
            match stream.token(id).text() {
                "long" => {
                    count_long += 1;
                    if !is_float {
                        type_spec = Some(id);
                    }
                }
                "short" => type_spec = Some(id),
                "unsigned" => is_unsigned = true,
                "signed" => is_signed = true,
                "float" | "double" => {
                    is_float = true;
                    type_spec = Some(id);
                }
                "char" | "int" => {
                    if type_spec.is_none() {
                        type_spec = Some(id);
                    }
                }
                _ => break,
            }
            run.push(id);
            walk = stream.next(id);
        }
        // Resume after the run; `walk` is the first token that broke it and
        // is never removed below.
        cur = walk;

        let survivor = type_spec.unwrap_or(start);
        for id in run {
            if id != survivor {
                stream.remove(id);
                collapsed += 1;
            }
        }

        let mut flags = TokenFlags::STANDARD_TYPE;
        if is_unsigned {
            flags |= TokenFlags::UNSIGNED;
        }
        if is_signed {
            flags |= TokenFlags::SIGNED;
        }
        if count_long >= 2 || (count_long == 1 && stream.token(survivor).text() == "double") {
            flags |= TokenFlags::LONG;
        }
        stream.token_mut(survivor).insert_flags(flags);
    }
    debug!(collapsed, "compound type keywords collapsed");
}
