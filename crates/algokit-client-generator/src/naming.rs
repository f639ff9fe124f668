//! Identifier policy for generated Python code.
//!
//! Spec names are arbitrary strings. A [`Sanitizer`] turns them into type,
//! method, variable and property identifiers; a [`SymbolPool`] keeps the
//! identifiers of one scope unique.

use crate::config::NamingPolicy;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

static INVALID_IDENTIFIER_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("identifier pattern is valid"));

/// Python keywords and soft keywords.
pub const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "case", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "match", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "type", "while", "with", "yield",
];

/// Returns true if `name` is a Python keyword or soft keyword.
pub fn is_keyword(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name)
}

/// Returns true if `name` can be used as a bare Python identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name) && !is_keyword(name)
}

/// Splits a name into words at case transitions and non-alphanumeric characters.
///
/// `HTTPServer` yields `["HTTP", "Server"]`, `get_vector2` yields
/// `["get", "vector2"]`.
pub fn split_words(name: &str) -> Vec<&str> {
    let bytes = name.as_bytes();
    let len = bytes.len();
    let run = |from: usize, pred: fn(&u8) -> bool| bytes[from..].iter().take_while(|b| pred(b)).count();

    let mut words = Vec::new();
    let mut i = 0;
    while i < len {
        let c = bytes[i];
        if !c.is_ascii_alphanumeric() {
            i += 1;
            continue;
        }
        let end = if c.is_ascii_uppercase() {
            let tail = run(i + 1, is_lower_or_digit);
            if tail > 0 {
                i + 1 + tail
            } else {
                let upper_end = i + run(i, u8::is_ascii_uppercase);
                // An acronym directly followed by a capitalized word gives up its last letter.
                if upper_end - i >= 2 && upper_end < len && bytes[upper_end].is_ascii_lowercase() {
                    upper_end - 1
                } else {
                    upper_end
                }
            }
        } else {
            i + run(i, is_lower_or_digit)
        };
        words.push(&name[i..end]);
        i = end;
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => std::iter::once(first.to_ascii_uppercase())
            .chain(chars.map(|c| c.to_ascii_lowercase()))
            .collect(),
        None => String::new(),
    }
}

fn is_lower_or_digit(b: &u8) -> bool {
    b.is_ascii_lowercase() || b.is_ascii_digit()
}

/// Applies the escapes every policy shares.
fn escape_identifier(name: String) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    let name = if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    };
    if is_keyword(&name) {
        format!("{name}_")
    } else {
        name
    }
}

/// Renders `value` as a double-quoted Python string literal.
pub fn python_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Converts spec names into Python identifiers.
pub trait Sanitizer: fmt::Debug + Send + Sync {
    /// Name of a class.
    fn type_name(&self, name: &str) -> String;

    /// Name of a method.
    fn method_name(&self, name: &str) -> String;

    /// Name of a parameter or local variable.
    fn variable_name(&self, name: &str) -> String;

    /// Name of a dataclass field or property.
    fn property_name(&self, name: &str) -> String;

    /// A string literal holding `value`.
    fn string_literal(&self, value: &str) -> String {
        python_string_literal(value)
    }

    /// Accesses `name` on `target`, falling back to subscript syntax when
    /// `name` is not a bare identifier.
    fn member_access(&self, target: &str, name: &str) -> String {
        if is_valid_identifier(name) {
            format!("{target}.{name}")
        } else {
            format!("{target}[{}]", self.string_literal(name))
        }
    }
}

/// Case-converting policy: PascalCase types, snake_case members.
#[derive(Debug, Clone, Copy, Default)]
pub struct SanitizingNames;

impl SanitizingNames {
    fn snake_case(name: &str) -> String {
        let words: Vec<String> = split_words(name)
            .into_iter()
            .map(str::to_ascii_lowercase)
            .collect();
        escape_identifier(words.join("_"))
    }
}

impl Sanitizer for SanitizingNames {
    fn type_name(&self, name: &str) -> String {
        escape_identifier(split_words(name).into_iter().map(capitalize).collect())
    }

    fn method_name(&self, name: &str) -> String {
        Self::snake_case(name)
    }

    fn variable_name(&self, name: &str) -> String {
        Self::snake_case(name)
    }

    fn property_name(&self, name: &str) -> String {
        Self::snake_case(name)
    }
}

/// Spelling-preserving policy: only characters Python rejects are replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreservingNames;

impl PreservingNames {
    fn escape(name: &str) -> String {
        escape_identifier(INVALID_IDENTIFIER_CHARS.replace_all(name, "_").into_owned())
    }
}

impl Sanitizer for PreservingNames {
    fn type_name(&self, name: &str) -> String {
        Self::escape(name)
    }

    fn method_name(&self, name: &str) -> String {
        Self::escape(name)
    }

    fn variable_name(&self, name: &str) -> String {
        Self::escape(name)
    }

    fn property_name(&self, name: &str) -> String {
        Self::escape(name)
    }
}

/// Returns the sanitizer implementing `policy`.
pub fn sanitizer_for(policy: NamingPolicy) -> Box<dyn Sanitizer> {
    match policy {
        NamingPolicy::Sanitize => Box::new(SanitizingNames),
        NamingPolicy::Preserve => Box::new(PreservingNames),
    }
}

/// A set of identifiers claimed in one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolPool {
    names: BTreeSet<String>,
}

impl SymbolPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool with `names` already claimed.
    pub fn with_reserved<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if `name` is claimed.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of claimed identifiers.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing is claimed.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Claims `base`, or the first free `base1`, `base2`, ... and returns it.
    pub fn allocate(&mut self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut suffix = 0usize;
        while self.names.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}{suffix}");
        }
        self.names.insert(candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("HTTPServer"), ["HTTP", "Server"]);
        assert_eq!(split_words("getHTTPResponse"), ["get", "HTTP", "Response"]);
        assert_eq!(split_words("add_uint64"), ["add", "uint64"]);
        assert_eq!(split_words("HelloWorld"), ["Hello", "World"]);
        assert_eq!(split_words("ABC"), ["ABC"]);
        assert_eq!(split_words("a-b c"), ["a", "b", "c"]);
        assert!(split_words("__").is_empty());
    }

    #[test]
    fn test_sanitizing_names() {
        let s = SanitizingNames;
        assert_eq!(s.type_name("hello_world"), "HelloWorld");
        assert_eq!(s.type_name("HelloWorld"), "HelloWorld");
        assert_eq!(s.type_name("HTTPServer"), "HttpServer");
        assert_eq!(s.method_name("getVector"), "get_vector");
        assert_eq!(s.method_name("add(uint64,uint64)uint64"), "add_uint64_uint64_uint64");
        assert_eq!(s.variable_name("from"), "from_");
        assert_eq!(s.property_name("2fa"), "_2fa");
        assert_eq!(s.type_name("true"), "True_");
        assert_eq!(s.method_name("???"), "_");
    }

    #[test]
    fn test_preserving_names() {
        let p = PreservingNames;
        assert_eq!(p.type_name("my-contract"), "my_contract");
        assert_eq!(p.method_name("getVector"), "getVector");
        assert_eq!(p.variable_name("class"), "class_");
        assert_eq!(p.property_name("1st"), "_1st");
    }

    #[test]
    fn test_member_access() {
        let s = SanitizingNames;
        assert_eq!(s.member_access("args", "amount"), "args.amount");
        assert_eq!(s.member_access("args", "two words"), "args[\"two words\"]");
        assert_eq!(s.member_access("args", "lambda"), "args[\"lambda\"]");
        assert_eq!(PreservingNames.member_access("state", "myKey"), "state.myKey");
        assert_eq!(PreservingNames.member_access("state", "my-key"), "state[\"my-key\"]");
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(python_string_literal("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    }

    #[test]
    fn test_allocate_suffixes() {
        let mut pool = SymbolPool::new();
        assert_eq!(pool.allocate("foo"), "foo");
        assert_eq!(pool.allocate("foo"), "foo1");
        assert_eq!(pool.allocate("foo"), "foo2");
        assert!(pool.contains("foo") && pool.contains("foo1") && pool.contains("foo2"));

        let mut other = SymbolPool::new();
        assert_eq!(other.allocate("foo"), "foo");
        assert_eq!(pool.len(), 3);
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_allocate_skips_reserved() {
        let mut pool = SymbolPool::with_reserved(["APP_SPEC", "APP_SPEC1"]);
        assert_eq!(pool.allocate("APP_SPEC"), "APP_SPEC2");
    }

    proptest! {
        #[test]
        fn prop_allocate_never_repeats(bases in prop::collection::vec("[a-c]{1,2}[0-9]?", 1..30)) {
            let mut pool = SymbolPool::new();
            let mut seen = BTreeSet::new();
            for base in &bases {
                let name = pool.allocate(base);
                prop_assert!(name.starts_with(base.as_str()));
                prop_assert!(seen.insert(name));
            }
            prop_assert_eq!(pool.len(), bases.len());
        }

        #[test]
        fn prop_sanitized_names_are_identifiers(name in "[A-Za-z0-9_ ()-]{0,24}") {
            let s = SanitizingNames;
            prop_assert!(is_valid_identifier(&s.method_name(&name)));
            prop_assert!(is_valid_identifier(&s.type_name(&name)));
            prop_assert!(is_valid_identifier(&PreservingNames.variable_name(&name)));
        }

        #[test]
        fn prop_type_name_is_stable(name in "[A-Za-z0-9_]{0,24}") {
            let s = SanitizingNames;
            let once = s.type_name(&name);
            prop_assert_eq!(s.type_name(&once), once.clone());
        }
    }
}
