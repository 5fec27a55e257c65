/*!
 * Ignore rules: shell-glob patterns matched against names and paths
 */

use std::collections::BTreeMap;

use glob::{MatchOptions, Pattern};
use once_cell::sync::Lazy;

/// Default patterns to ignore
pub static DEFAULT_IGNORE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version Control
        ".git",
        ".svn",
        ".hg",
        ".bzr",
        // Dependencies
        "node_modules",
        "venv",
        "env",
        ".env",
        "vendor",
        "__pycache__",
        ".pytest_cache",
        ".mypy_cache",
        ".tox",
        "site-packages",
        // Build & Dist
        "build",
        "dist",
        "out",
        "target",
        "bin",
        "obj",
        ".gradle",
        // IDEs & Editors
        ".vscode",
        ".idea",
        ".eclipse",
        "*.swp",
        "*.swo",
        "*~",
        // OS Files
        ".DS_Store",
        "Thumbs.db",
        "desktop.ini",
        // Logs & Temp
        "*.log",
        "*.tmp",
        "*.temp",
        ".cache",
    ]
});

// `*` crosses `/` so a rule can span directories, like fnmatch.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A single rule, compiled once
#[derive(Debug, Clone)]
enum Rule {
    Glob(Pattern),
    /// Pattern that is not valid glob syntax; compared verbatim
    Literal(String),
}

impl Rule {
    fn compile(pattern: &str) -> Self {
        // `glob` only accepts `**` as a whole path component; elsewhere a run
        // of stars means the same as one, since `*` already crosses `/`
        match Pattern::new(pattern).or_else(|_| Pattern::new(&collapse_stars(pattern))) {
            Ok(glob) => Rule::Glob(glob),
            Err(_) => Rule::Literal(pattern.to_string()),
        }
    }

    fn matches(&self, candidate: &str) -> bool {
        match self {
            Rule::Glob(glob) => glob.matches_with(candidate, MATCH_OPTIONS),
            Rule::Literal(text) => text == candidate,
        }
    }
}

fn collapse_stars(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out
}

/// A set of ignore patterns, unique by value
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: BTreeMap<String, Rule>,
}

impl IgnoreRules {
    /// An empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh rule set seeded with [`DEFAULT_IGNORE`]
    pub fn with_defaults() -> Self {
        let mut rules = Self::new();
        rules.extend(DEFAULT_IGNORE.iter().copied());
        rules
    }

    /// Add a pattern; duplicates are ignored
    pub fn insert(&mut self, pattern: &str) {
        let pattern = pattern.trim();
        if pattern.is_empty() || self.rules.contains_key(pattern) {
            return;
        }
        self.rules
            .insert(pattern.to_string(), Rule::compile(pattern));
    }

    /// Add every pattern from `patterns`
    pub fn extend<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>) {
        for pattern in patterns {
            self.insert(pattern);
        }
    }

    /// True if any pattern matches either the bare name or the path
    pub fn matches(&self, name: &str, path: &str) -> bool {
        self.rules
            .values()
            .any(|rule| rule.matches(name) || rule.matches(path))
    }

    /// The patterns in this set, in sorted order
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = IgnoreRules::with_defaults();
        assert!(rules.matches(".git", ".git"));
        assert!(rules.matches("node_modules", "web/node_modules"));
        assert!(rules.matches("debug.log", "logs/debug.log"));
        assert!(rules.matches("main.rs~", "src/main.rs~"));
        assert!(!rules.matches("main.rs", "src/main.rs"));
        // `targets` is not `target`
        assert!(!rules.matches("targets", "targets"));
    }

    #[test]
    fn test_extension_does_not_touch_defaults() {
        let mut rules = IgnoreRules::with_defaults();
        rules.extend(["*.test.js", ".git"]);
        assert_eq!(rules.len(), DEFAULT_IGNORE.len() + 1);
        assert!(rules.matches("app.test.js", "src/app.test.js"));

        let fresh = IgnoreRules::with_defaults();
        assert_eq!(fresh.len(), DEFAULT_IGNORE.len());
        assert!(!fresh.matches("app.test.js", "src/app.test.js"));
    }

    #[test]
    fn test_glob_syntax() {
        let mut rules = IgnoreRules::new();
        rules.extend(["gen_?.py", "[ab]*.rs", "[!x]y.go"]);

        assert!(rules.matches("gen_1.py", "gen_1.py"));
        assert!(!rules.matches("gen_10.py", "gen_10.py"));
        assert!(rules.matches("alpha.rs", "src/alpha.rs"));
        assert!(!rules.matches("core.rs", "src/core.rs"));
        assert!(rules.matches("zy.go", "zy.go"));
        assert!(!rules.matches("xy.go", "xy.go"));
    }

    #[test]
    fn test_star_spans_separators_in_paths() {
        let mut rules = IgnoreRules::new();
        rules.insert("src/*_test.go");
        assert!(rules.matches("a_test.go", "src/pkg/a_test.go"));
        assert!(!rules.matches("a_test.go", "lib/a_test.go"));
    }

    #[test]
    fn test_repeated_stars_stay_wildcards() {
        let mut rules = IgnoreRules::new();
        rules.insert("gen**");
        rules.insert("**tmp");
        rules.insert("a***b.py");
        assert_eq!(rules.len(), 3);

        assert!(rules.matches("generated.py", "generated.py"));
        assert!(rules.matches("gen", "src/gen"));
        assert!(rules.matches("x.tmp", "x.tmp"));
        assert!(rules.matches("ab.py", "ab.py"));
        assert!(rules.matches("a_to_b.py", "a_to_b.py"));
        assert!(!rules.matches("regen.py", "src/regen.py"));

        // Valid recursive wildcards are compiled unchanged
        let mut rules = IgnoreRules::new();
        rules.insert("**/fixtures");
        assert!(rules.matches("fixtures", "fixtures"));
        assert!(rules.matches("fixtures", "tests/data/fixtures"));
    }

    #[test]
    fn test_degenerate_pattern_is_literal() {
        let mut rules = IgnoreRules::new();
        rules.insert("[abc");
        assert!(!rules.matches("a", "a"));
        assert!(!rules.matches("abc", "abc"));
        assert!(rules.matches("[abc", "[abc"));
    }

    #[test]
    fn test_blank_patterns_are_ignored() {
        let mut rules = IgnoreRules::new();
        rules.extend(["", "   "]);
        assert!(rules.is_empty());
    }
}
