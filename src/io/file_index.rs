use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::issue::{FileRef, LineRange};
use crate::provider::runner::{CommandRunner, os_args};

/// Maximum number of paths returned by one lookup
pub const MAX_FILE_RESULTS: usize = 20;

static LINE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)#(\d+)(?:-(\d+))?$").expect("valid regex"));
static AT_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([\w./-]+(?:#\d+(?:-\d+)?)?)").expect("valid regex"));

#[derive(Debug, thiserror::Error)]
pub enum FileIndexError {
    #[error("could not run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git ls-files failed: {0}")]
    Failed(String),
}

/// Tracked and untracked-but-not-ignored files whose path contains `query`
/// (case-insensitive), in `git ls-files` order. An empty query matches nothing.
pub fn find_files(
    runner: &dyn CommandRunner,
    root: &Path,
    query: &str,
) -> Result<Vec<String>, FileIndexError> {
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let output = runner.run(
        "git",
        &os_args(["ls-files", "--cached", "--others", "--exclude-standard"]),
        Some(root),
    )?;
    if !output.status.success() {
        return Err(FileIndexError::Failed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(filter_paths(&String::from_utf8_lossy(&output.stdout), query))
}

fn filter_paths(listing: &str, query: &str) -> Vec<String> {
    let query = query.to_lowercase();
    listing
        .lines()
        .map(str::trim)
        .filter(|p| !p.is_empty() && p.to_lowercase().contains(&query))
        .take(MAX_FILE_RESULTS)
        .map(String::from)
        .collect()
}

/// Parse `@path`, `@path#10` or `@path#10-25` (the `@` is optional)
pub fn parse_at_ref(reference: &str) -> Option<FileRef> {
    let raw = reference.strip_prefix('@').unwrap_or(reference);
    if raw.is_empty() {
        return None;
    }
    if let Some(caps) = LINE_SUFFIX.captures(raw)
        && let Ok(start) = caps[2].parse::<usize>()
    {
        return Some(FileRef {
            path: caps[1].to_string(),
            lines: Some(LineRange {
                start,
                end: caps.get(3).and_then(|m| m.as_str().parse().ok()),
            }),
        });
    }
    Some(FileRef::new(raw))
}

/// Every `@reference` in `text` that looks like a path (contains `.` or `/`),
/// without duplicates, in order of appearance
pub fn extract_file_refs(text: &str) -> Vec<FileRef> {
    let mut refs: Vec<FileRef> = Vec::new();
    for caps in AT_REF.captures_iter(text) {
        let raw = &caps[1];
        let path_part = raw.split('#').next().unwrap_or(raw);
        if !(path_part.contains('.') || path_part.contains('/')) {
            continue;
        }
        if let Some(file_ref) = parse_at_ref(raw)
            && !refs.contains(&file_ref)
        {
            refs.push(file_ref);
        }
    }
    refs
}

/// The referenced file, or only its line range (1-based, inclusive).
/// None when the file cannot be read.
pub fn read_file_content(root: &Path, file_ref: &FileRef) -> Option<String> {
    let content = std::fs::read_to_string(root.join(&file_ref.path)).ok()?;
    let Some(range) = file_ref.lines else {
        return Some(content);
    };
    let start = range.start.saturating_sub(1);
    let end = range.end.unwrap_or(range.start).max(start);
    Some(
        content
            .split('\n')
            .skip(start)
            .take(end - start)
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::runner::testing::{StubRunner, failure, success};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn empty_query_skips_git() {
        let runner = StubRunner::with_results(vec![]);
        assert!(find_files(&runner, Path::new("."), "").unwrap().is_empty());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn find_filters_case_insensitively() {
        let runner = StubRunner::with_results(vec![success(
            "src/main.rs\nsrc/App.rs\nREADME.md\n\ndocs/app-guide.md\n",
        )]);
        let found = find_files(&runner, Path::new("/repo"), "APP").unwrap();
        assert_eq!(found, vec!["src/App.rs", "docs/app-guide.md"]);
        assert_eq!(
            runner.args(0),
            vec!["ls-files", "--cached", "--others", "--exclude-standard"]
        );
    }

    #[test]
    fn find_caps_results() {
        let listing: String = (0..50).map(|i| format!("src/mod{}.rs\n", i)).collect();
        assert_eq!(filter_paths(&listing, "mod").len(), MAX_FILE_RESULTS);
    }

    #[test]
    fn find_outside_git_is_an_error() {
        let runner = StubRunner::with_results(vec![failure("fatal: not a git repository")]);
        assert!(matches!(
            find_files(&runner, Path::new("/tmp"), "a"),
            Err(FileIndexError::Failed(_))
        ));
    }

    #[test]
    fn at_ref_forms() {
        assert_eq!(parse_at_ref("@src/app.ts"), Some(FileRef::new("src/app.ts")));
        assert_eq!(
            parse_at_ref("@src/app.ts#10-25"),
            Some(FileRef {
                path: "src/app.ts".into(),
                lines: Some(LineRange {
                    start: 10,
                    end: Some(25)
                }),
            })
        );
        assert_eq!(
            parse_at_ref("lib.rs#7").unwrap().lines,
            Some(LineRange {
                start: 7,
                end: None
            })
        );
        assert_eq!(parse_at_ref("@"), None);
    }

    #[test]
    fn extract_only_path_like_refs() {
        let refs = extract_file_refs(
            "see @src/app.ts#10-25 and @README.md, ping @alice, again @src/app.ts#10-25",
        );
        let rendered: Vec<String> = refs.iter().map(|r| r.to_string()).collect();
        assert_eq!(rendered, vec!["src/app.ts#10-25", "README.md"]);
    }

    #[test]
    fn read_line_ranges() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("f.txt"), "one\ntwo\nthree\nfour").unwrap();

        let whole = read_file_content(tmp.path(), &FileRef::new("f.txt")).unwrap();
        assert_eq!(whole, "one\ntwo\nthree\nfour");

        let range = parse_at_ref("f.txt#2-3").unwrap();
        assert_eq!(read_file_content(tmp.path(), &range).unwrap(), "two\nthree");

        let single = parse_at_ref("f.txt#4").unwrap();
        assert_eq!(read_file_content(tmp.path(), &single).unwrap(), "four");

        assert!(read_file_content(tmp.path(), &FileRef::new("missing.txt")).is_none());
    }
}
