use std::path::Path;

pub const OTHER: &str = "Other";

const EXTENSIONS: &[(&str, &str)] = &[
    ("py", "Python"),
    ("ts", "TypeScript"),
    ("js", "JavaScript"),
    ("tsx", "TypeScript"),
    ("jsx", "JavaScript"),
    ("java", "Java"),
    ("rb", "Ruby"),
    ("go", "Go"),
    ("rs", "Rust"),
    ("cpp", "C++"),
    ("c", "C"),
    ("cs", "C#"),
    ("php", "PHP"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("json", "JSON"),
    ("txt", "Plain Text"),
    ("md", "Markdown"),
];

/// Language of `path`, by exact (case sensitive) match on its extension.
pub fn classify(path: &str) -> &'static str {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            EXTENSIONS
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, lang)| *lang)
        })
        .unwrap_or(OTHER)
}
