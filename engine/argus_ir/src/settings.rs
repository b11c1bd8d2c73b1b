//! Read-only configuration consumed by the core.
//!
//! The embedding engine constructs one `Settings` per run and shares it
//! immutably across all concurrently-processed translation units.

/// Source language variant, affecting keyword recognition and grammar
/// choices during AST construction.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Language {
    C,
    #[default]
    Cpp,
}

/// Target word size, driving platform-type resolution.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum WordSize {
    Bits32,
    #[default]
    Bits64,
}

/// Target platform description.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Platform {
    pub word_size: WordSize,
}

/// Engine configuration surface consumed by this core.
#[derive(Copy, Clone, Debug, Default)]
pub struct Settings {
    pub language: Language,
    pub platform: Platform,
    /// Gate for the expensive AST consistency check.
    pub verify_ast: bool,
}

impl Settings {
    pub fn c(word_size: WordSize) -> Self {
        Settings {
            language: Language::C,
            platform: Platform { word_size },
            verify_ast: false,
        }
    }

    pub fn cpp(word_size: WordSize) -> Self {
        Settings {
            language: Language::Cpp,
            platform: Platform { word_size },
            verify_ast: false,
        }
    }
}
