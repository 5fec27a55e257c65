/*!
 * Code file classification and language detection by file name
 */

use std::collections::HashSet;
use std::path::Path;

use once_cell::sync::Lazy;

/// Extensions recognized as code when no custom list is given
pub static DEFAULT_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        ".py", ".js", ".jsx", ".ts", ".tsx", ".java", ".cpp", ".c", ".h", ".hpp", ".cs", ".php",
        ".rb", ".go", ".rs", ".swift", ".kt", ".scala", ".r", ".m", ".mm", ".pl", ".sh", ".bash",
        ".zsh", ".fish", ".ps1", ".bat", ".html", ".htm", ".css", ".scss", ".sass", ".less",
        ".vue", ".svelte", ".sql", ".graphql", ".gql", ".yaml", ".yml", ".json", ".xml", ".toml",
        ".ini", ".cfg", ".conf", ".env", ".dockerfile", ".makefile", ".cmake", ".gradle",
        ".maven", ".sbt", ".clj", ".cljs", ".elm", ".hs", ".ml", ".fs", ".ex", ".exs", ".erl",
        ".hrl", ".lua", ".dart", ".nim",
    ]
    .into_iter()
    .collect()
});

/// Build files that count as code regardless of extension
const SPECIAL_NAMES: [&str; 3] = ["makefile", "dockerfile", "rakefile"];

/// Set of extensions (lower case, with leading dot) accepted as code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet(HashSet<String>);

impl ExtensionSet {
    /// Build a set from user input; `py`, `.py` and `.PY` are the same entry
    pub fn from_list<'a>(extensions: impl IntoIterator<Item = &'a str>) -> Self {
        let set = extensions
            .into_iter()
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                let ext = ext.to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{}", ext)
                }
            })
            .collect();
        Self(set)
    }

    pub fn contains(&self, ext: &str) -> bool {
        self.0.contains(ext)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::from_list(DEFAULT_EXTENSIONS.iter().copied())
    }
}

/// Lower-cased suffix of the file name including the dot, or "" if none
fn suffix(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn lower_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_lowercase()
}

/// Check whether a path names a code file
pub fn is_code_file(path: &Path, extensions: &ExtensionSet) -> bool {
    extensions.contains(&suffix(path)) || SPECIAL_NAMES.contains(&lower_name(path).as_str())
}

/// Detect the language tag of a file from its name
pub fn detect_language(path: &Path) -> &'static str {
    match lower_name(path).as_str() {
        "makefile" | "rakefile" => return "makefile",
        "dockerfile" => return "dockerfile",
        _ => {}
    }

    match suffix(path).as_str() {
        ".py" => "python",
        ".js" | ".jsx" => "javascript",
        ".ts" | ".tsx" => "typescript",
        ".java" => "java",
        ".cpp" | ".hpp" => "cpp",
        ".c" | ".h" => "c",
        ".cs" => "csharp",
        ".php" => "php",
        ".rb" => "ruby",
        ".go" => "go",
        ".rs" => "rust",
        ".swift" => "swift",
        ".kt" => "kotlin",
        ".scala" => "scala",
        ".r" => "r",
        ".m" | ".mm" => "objective-c",
        ".pl" => "perl",
        ".sh" | ".bash" => "bash",
        ".zsh" => "zsh",
        ".fish" => "fish",
        ".ps1" => "powershell",
        ".bat" => "batch",
        ".html" | ".htm" => "html",
        ".css" => "css",
        ".scss" => "scss",
        ".sass" => "sass",
        ".less" => "less",
        ".vue" => "vue",
        ".svelte" => "svelte",
        ".sql" => "sql",
        ".graphql" | ".gql" => "graphql",
        ".yaml" | ".yml" => "yaml",
        ".json" => "json",
        ".xml" => "xml",
        ".toml" => "toml",
        ".dockerfile" => "dockerfile",
        _ => "text",
    }
}
