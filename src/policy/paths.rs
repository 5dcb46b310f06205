use tracing::debug;

const CHANGELOG_FILE: &str = "CHANGES.md";

/// True when `path` is the top-level changelog.
///
/// Anchored at the start of the path and case-sensitive, so nested copies
/// (`docs/CHANGES.md`) and lookalikes (`CHANGES.txt`) do not count.
pub fn is_changelog_file(path: &str) -> bool {
    path.starts_with(CHANGELOG_FILE)
}

/// True when any changed path starts with any restricted folder prefix.
///
/// This is a plain string-prefix test, so configuration may list either
/// folders (`"ThirdParty/"`) or individual files. An empty folder list never
/// matches.
pub fn matches_any_restricted_folder<P, F>(paths: &[P], folders: &[F]) -> bool
where
    P: AsRef<str>,
    F: AsRef<str>,
{
    if folders.is_empty() {
        return false;
    }

    for path in paths {
        let path: &str = path.as_ref();
        for folder in folders {
            let folder: &str = folder.as_ref();
            if path.starts_with(folder) {
                debug!(path, folder, "file matched restricted folder");
                return true;
            }
        }
    }

    debug!("no files matched restricted folders");
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_FOLDERS: &[&str] = &[];

    #[test]
    fn test_changelog_file_matches() {
        assert!(is_changelog_file("CHANGES.md"));
    }

    #[test]
    fn test_changelog_lookalikes_do_not_match() {
        for path in [
            "CHANGES.txt",
            "CHANGES.old.md",
            ".CHANGES.md",
            "/CHANGES",
            "/CHANGES.md",
            "a/CHANGES.md",
            "changes.md",
            "Changes.md",
            "",
        ] {
            assert!(!is_changelog_file(path), "{path:?} should not match");
        }
    }

    #[test]
    fn test_empty_folders_never_match() {
        assert!(!matches_any_restricted_folder(&["vendor/lib.js"], NO_FOLDERS));
        assert!(!matches_any_restricted_folder(NO_FOLDERS, NO_FOLDERS));
    }

    #[test]
    fn test_prefix_match() {
        let folders = ["ThirdParty/", "Source/ThirdParty/"];
        assert!(matches_any_restricted_folder(
            &["Source/Core/Math.js", "Source/ThirdParty/when.js"],
            &folders
        ));
        assert!(!matches_any_restricted_folder(
            &["Source/Core/Math.js", "Specs/ThirdParty/x.js"],
            &folders
        ));
    }

    #[test]
    fn test_prefix_is_not_segment_aware() {
        assert!(matches_any_restricted_folder(&["vendored/x.js"], &["vendor"]));
        assert!(!matches_any_restricted_folder(&["vendored/x.js"], &["vendor/"]));
        assert!(matches_any_restricted_folder(&["LICENSE.md"], &["LICENSE.md"]));
    }

    #[test]
    fn test_match_is_order_independent() {
        let paths = ["a.js", "lib/b.js", "vendor/c.js"];
        let folders = ["docs/", "vendor/"];
        let mut reversed_paths = paths;
        reversed_paths.reverse();
        let mut reversed_folders = folders;
        reversed_folders.reverse();

        let expected = matches_any_restricted_folder(&paths, &folders);
        assert!(expected);
        assert_eq!(matches_any_restricted_folder(&reversed_paths, &folders), expected);
        assert_eq!(matches_any_restricted_folder(&paths, &reversed_folders), expected);
        assert_eq!(
            matches_any_restricted_folder(&reversed_paths, &reversed_folders),
            expected
        );
    }
}
