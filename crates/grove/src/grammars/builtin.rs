//! Grammars compiled into this crate.

use super::GrammarProvider;

/// A grammar whose compiled module is linked into this crate.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinGrammar {
    name: &'static str,
    aliases: &'static [&'static str],
    constructor: fn() -> tree_sitter::Language,
}

impl GrammarProvider for BuiltinGrammar {
    fn name(&self) -> &str {
        self.name
    }

    fn aliases(&self) -> &[&str] {
        self.aliases
    }

    fn language(&self) -> tree_sitter::Language {
        (self.constructor)()
    }
}

/// Every built-in grammar. Names and aliases are lowercase and unique.
static BUILTINS: &[BuiltinGrammar] = &[
    BuiltinGrammar {
        name: "javascript",
        aliases: &["js", "jsx"],
        constructor: || tree_sitter_javascript::LANGUAGE.into(),
    },
    BuiltinGrammar {
        name: "bash",
        aliases: &["sh"],
        constructor: || tree_sitter_bash::LANGUAGE.into(),
    },
    BuiltinGrammar {
        name: "cpp",
        aliases: &["c++", "cxx"],
        constructor: || tree_sitter_cpp::LANGUAGE.into(),
    },
    BuiltinGrammar {
        name: "rust",
        aliases: &["rs"],
        constructor: || tree_sitter_rust::LANGUAGE.into(),
    },
    BuiltinGrammar {
        name: "c_sharp",
        aliases: &["csharp", "cs"],
        constructor: || tree_sitter_c_sharp::LANGUAGE.into(),
    },
];

/// All built-in grammar providers.
#[must_use]
pub fn builtin_providers() -> &'static [BuiltinGrammar] {
    BUILTINS
}

/// Look up a built-in grammar by canonical name.
///
/// Returns `None` if no built-in grammar has this exact name.
#[must_use]
pub fn builtin_provider(name: &str) -> Option<&'static BuiltinGrammar> {
    BUILTINS.iter().find(|grammar| grammar.name == name)
}
