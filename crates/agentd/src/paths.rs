//! Path-prefix filtering (§9 Open Questions) and markup-extension rules
//! (§4.11) shared by the File-Change Generator (C8) and the test
//! post-processing laws (C11/C12).

const MARKUP_EXTENSIONS: &[&str] = &["jsx", "tsx"];

/// Whether `path` is allowed to be written, given the configured allow-list.
/// An empty allow-list means "no restriction" (the default).
pub fn is_path_allowed(path: &str, allowed_prefixes: &[String]) -> bool {
    if allowed_prefixes.is_empty() {
        return true;
    }
    allowed_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

/// The file extension, lowercased, without the leading dot.
pub fn extension_of(path: &str) -> Option<String> {
    path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

pub fn is_markup_extension(ext: &str) -> bool {
    MARKUP_EXTENSIONS.contains(&ext)
}

/// Whether `path` is itself a markup file, or its contents import one
/// (a crude but effective heuristic over raw source text).
pub fn touches_markup(path: &str, content: &str) -> bool {
    if extension_of(path).is_some_and(|ext| is_markup_extension(&ext)) {
        return true;
    }
    MARKUP_EXTENSIONS
        .iter()
        .any(|ext| content.contains(&format!(".{ext}\"")) || content.contains(&format!(".{ext}'")))
}

/// The base name of a test-proposal path with its `.test.<ext>` suffix
/// stripped, used to group proposals by subject for deduplication (§4.11).
/// Proposal paths are always `*.test.<ext>` by construction; a path without
/// that suffix is returned unchanged.
pub fn base_name(path: &str) -> String {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let without_test_suffix = file_name
        .strip_suffix(".test.tsx")
        .or_else(|| file_name.strip_suffix(".test.jsx"))
        .or_else(|| file_name.strip_suffix(".test.ts"))
        .or_else(|| file_name.strip_suffix(".test.js"))
        .unwrap_or(file_name);
    without_test_suffix.to_string()
}

/// The file stem (final path segment, extension stripped) of a source path.
pub fn file_stem(path: &str) -> &str {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file_name)
}

/// Whether `ext` belongs to the TypeScript family (`ts`/`tsx`) as opposed to
/// the plain-JavaScript family (`js`/`jsx`); used to pick the matching test
/// extension without flipping a TS proposal to `.test.js`.
pub fn is_typescript_family(ext: &str) -> bool {
    matches!(ext, "ts" | "tsx")
}

/// The correct test extension for a subject, given whether it touches
/// markup and which language family its current proposal extension is in.
pub fn desired_test_extension(is_markup: bool, current_ext: &str) -> &'static str {
    let typescript = is_typescript_family(current_ext);
    match (is_markup, typescript) {
        (true, true) => "tsx",
        (true, false) => "jsx",
        (false, true) => "ts",
        (false, false) => "js",
    }
}

/// Replace a path's extension, preserving everything before the final dot.
pub fn with_extension(path: &str, new_ext: &str) -> String {
    match path.rsplit_once('.') {
        Some((stem, _)) => format!("{stem}.{new_ext}"),
        None => format!("{path}.{new_ext}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allow_list_permits_everything() {
        assert!(is_path_allowed("backend/db/migrate.rs", &[]));
    }

    #[test]
    fn nonempty_allow_list_restricts_to_prefixes() {
        let allowed = vec!["src/frontend/".to_string()];
        assert!(is_path_allowed("src/frontend/App.tsx", &allowed));
        assert!(!is_path_allowed("src/backend/server.rs", &allowed));
    }

    #[test]
    fn detects_markup_extensions_directly() {
        assert!(touches_markup("src/Foo.tsx", ""));
        assert!(touches_markup("src/Foo.jsx", ""));
        assert!(!touches_markup("src/foo.ts", "plain typescript"));
    }

    #[test]
    fn detects_markup_import_in_plain_file_content() {
        let content = "import Foo from './Foo.tsx'";
        assert!(touches_markup("src/useFoo.ts", content));
    }

    #[test]
    fn base_name_strips_test_suffixes() {
        assert_eq!(base_name("__tests__/unit/Foo.test.tsx"), "Foo");
        assert_eq!(base_name("__tests__/unit/Foo.test.ts"), "Foo");
        assert_eq!(base_name("src/Foo.tsx"), "Foo.tsx");
    }

    #[test]
    fn file_stem_strips_directory_and_extension() {
        assert_eq!(file_stem("src/frontend/Foo.tsx"), "Foo");
        assert_eq!(file_stem("Foo.ts"), "Foo");
    }

    #[test]
    fn desired_test_extension_matches_family_and_markup() {
        assert_eq!(desired_test_extension(true, "ts"), "tsx");
        assert_eq!(desired_test_extension(true, "js"), "jsx");
        assert_eq!(desired_test_extension(false, "tsx"), "ts");
        assert_eq!(desired_test_extension(false, "jsx"), "js");
    }

    #[test]
    fn with_extension_replaces_final_segment() {
        assert_eq!(with_extension("__tests__/Foo.test.ts", "tsx"), "__tests__/Foo.test.tsx");
    }
}
