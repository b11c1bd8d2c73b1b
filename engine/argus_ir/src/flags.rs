//! Per-token classification flags.

use bitflags::bitflags;

bitflags! {
    /// Classification bits carried by every token.
    ///
    /// `UNSIGNED`/`SIGNED`/`LONG` are combined onto the surviving token when
    /// a compound type spelling is collapsed. `KEYWORD` is cached at token
    /// creation from the stream's language so hot-path queries never consult
    /// the keyword tables. The flag bits participate in the sequence content
    /// hash; source coordinates do not.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u16 {
        /// Token spells (part of) an unsigned fundamental type.
        const UNSIGNED = 1 << 0;
        /// Token spells (part of) an explicitly signed fundamental type.
        const SIGNED = 1 << 1;
        /// `long long` (or `long double`) collapsed onto this token.
        const LONG = 1 << 2;
        /// Token text is a keyword in the stream's language.
        const KEYWORD = 1 << 3;
        /// Token is the survivor of a type-normalization pass.
        const STANDARD_TYPE = 1 << 4;
    }
}

crate::static_assert_size!(TokenFlags, 2);
