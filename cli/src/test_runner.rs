use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use adoc::{AssemblyWarning, DraftDocument};

use crate::outline::render_outline;

const TEST_SUFFIX: &str = ".test.toml";

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// If set, the warning must carry this code (`unresolved-reference`,
    /// `malformed-attribute`).
    #[serde(default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// The draft document to assemble.
    #[serde(default)]
    pub draft: DraftDocument,

    /// Expected outline of the assembled document (trimmed comparison).
    #[serde(default)]
    pub expect_outline: Option<String>,

    /// Expected assembly error; its Display string must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// Expected warnings. If present (even empty), warning count and content are checked.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .map(|name| name.trim_end_matches(TEST_SUFFIX))
                .unwrap_or("?")
        })
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };
    let config: TestConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => return fail(None, format!("TOML parse error: {}", e.message())),
    };

    let description = config.description.clone();
    let outcome = match check_expectations(config) {
        None => TestOutcome::Pass,
        Some(reason) => TestOutcome::Fail(reason),
    };
    TestResult {
        path: path.to_path_buf(),
        description,
        outcome,
    }
}

/// Assemble the draft and compare against every expectation. Returns
/// `Some(reason)` on the first mismatch.
fn check_expectations(config: TestConfig) -> Option<String> {
    let assembled = match (adoc::assemble(config.draft), &config.expect_error) {
        (Err(err), Some(expected)) => {
            let message = err.to_string();
            return (!message.contains(expected.as_str())).then(|| {
                format!("expected error containing \"{}\", got: {}", expected, message)
            });
        }
        (Err(err), None) => return Some(format!("unexpected assembly error: {}", err)),
        (Ok(_), Some(expected)) => {
            return Some(format!(
                "expected error containing \"{}\", but assembly succeeded",
                expected
            ));
        }
        (Ok(assembled), None) => assembled,
    };

    if let Some(expected) = &config.expect_outline {
        let actual = render_outline(&assembled.document);
        let actual = normalize_outline(&actual);
        let expected = normalize_outline(expected);
        if actual != expected {
            return Some(format!(
                "outline mismatch\n  expected:\n{}\n  actual:\n{}",
                indent(&expected),
                indent(&actual)
            ));
        }
    }

    if let Some(expected) = &config.expect_warnings {
        return check_warnings(&assembled.warnings, expected);
    }
    None
}

fn normalize_outline(outline: &str) -> String {
    outline
        .trim()
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check that actual warnings match expectations. Returns `Some(reason)` on mismatch.
fn check_warnings(actual: &[AssemblyWarning], expected: &[ExpectedWarning]) -> Option<String> {
    if actual.len() != expected.len() {
        let actual_msgs: Vec<String> = actual.iter().map(|w| format!("  - {}", w)).collect();
        return Some(format!(
            "expected {} warning(s), got {}\n  actual warnings:\n{}",
            expected.len(),
            actual.len(),
            if actual_msgs.is_empty() {
                "    (none)".to_string()
            } else {
                actual_msgs.join("\n")
            }
        ));
    }

    for (i, (actual, expected)) in actual.iter().zip(expected.iter()).enumerate() {
        if !actual.message.contains(&expected.contains) {
            return Some(format!(
                "warning[{}]: expected message containing \"{}\", got: {}",
                i, expected.contains, actual.message
            ));
        }
        if let Some(kind) = &expected.kind {
            if actual.kind.code() != kind.as_str() {
                return Some(format!(
                    "warning[{}]: expected kind {}, got {}",
                    i, kind, actual.kind
                ));
            }
        }
    }

    None
}

/// Discover test files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with(TEST_SUFFIX))
        {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

fn pass_label(no_color: bool) -> &'static str {
    if no_color { "PASS" } else { "\x1b[32mPASS\x1b[0m" }
}

fn fail_label(no_color: bool) -> &'static str {
    if no_color { "FAIL" } else { "\x1b[31mFAIL\x1b[0m" }
}

fn bold(s: &str, no_color: bool) -> String {
    if no_color {
        s.to_string()
    } else {
        format!("\x1b[1m{}\x1b[0m", s)
    }
}

/// Pick the categories to run. Unknown names are reported and skipped.
fn select_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a [PathBuf]> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v.as_slice())).collect();
    }
    let mut selected = BTreeMap::new();
    for requested in requested {
        let req = requested.trim_matches('/');
        let nested = format!("{}/", req);
        let before = selected.len();
        for (cat, files) in all {
            if cat == req || cat.starts_with(&nested) {
                selected.insert(cat.as_str(), files.as_slice());
            }
        }
        if selected.len() == before {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all.keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    selected
}

/// Run every test file under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let groups: Vec<(String, Vec<PathBuf>)> = if path.is_file() {
        vec![(String::new(), vec![path.to_path_buf()])]
    } else {
        let all = discover_categorized(path);
        if all.is_empty() {
            eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
            return 1;
        }
        let selected = select_categories(&all, categories);
        if selected.is_empty() {
            eprintln!("no matching categories found");
            return 1;
        }
        selected
            .into_iter()
            .map(|(cat, files)| (cat.to_string(), files.to_vec()))
            .collect()
    };

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &groups {
        if !path.is_file() {
            let header = if cat.is_empty() { "(root)" } else { cat.as_str() };
            eprintln!();
            eprintln!("{}", bold(header, no_color));
        }

        for file in files {
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", pass_label(no_color), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", fail_label(no_color), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        let ok = if no_color { "ok" } else { "\x1b[32mok\x1b[0m" };
        eprintln!("test result: {}. {} passed, 0 failed", ok, passed);
        0
    } else {
        let failed_label = if no_color { "FAILED" } else { "\x1b[31mFAILED\x1b[0m" };
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            failed_label,
            passed,
            failed,
            passed + failed
        );
        1
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const PASSING: &str = r#"
description = "two bullets"
expect_outline = """
unordered_list style=one_asterisk
  item "a"
  item "b"
"""
expect_warnings = []

[[draft.blocks]]
type = "list_item"
marker = "*"
text = [[{ type = "text", text = "a" }]]

[[draft.blocks]]
type = "list_item"
marker = "*"
text = [[{ type = "text", text = "b" }]]
"#;

    const EXPECTED_ERROR: &str = r#"
expect_error = "jumps from 1 to 3"

[[draft.blocks]]
type = "section"
level = 1
title = [{ type = "text", text = "A" }]

[[draft.blocks]]
type = "section"
level = 3
title = [{ type = "text", text = "B" }]
"#;

    const WRONG_OUTLINE: &str = r#"
expect_outline = "paragraph \"nope\""

[[draft.blocks]]
type = "paragraph"
lines = [[{ type = "text", text = "yes" }]]
"#;

    #[test]
    fn passing_fixtures_exit_zero() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("lists")).unwrap();
        fs::write(dir.path().join("lists/bullets.test.toml"), PASSING).unwrap();
        fs::write(dir.path().join("skip.test.toml"), EXPECTED_ERROR).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a test").unwrap();

        let categories = discover_categorized(dir.path());
        assert_eq!(
            categories.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["", "lists"]
        );
        assert_eq!(run_tests(dir.path(), true, &[]), 0);
    }

    #[test]
    fn mismatched_outline_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("wrong.test.toml");
        fs::write(&file, WRONG_OUTLINE).unwrap();

        let result = run_single_test(&file);
        let TestOutcome::Fail(reason) = result.outcome else {
            panic!("expected a failure");
        };
        assert!(reason.starts_with("outline mismatch"));
        assert_eq!(run_tests(&file, true, &[]), 1);
    }

    #[test]
    fn category_filter_selects_subtrees() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("lists/nested")).unwrap();
        fs::write(dir.path().join("lists/nested/a.test.toml"), PASSING).unwrap();
        fs::write(dir.path().join("wrong.test.toml"), WRONG_OUTLINE).unwrap();

        assert_eq!(run_tests(dir.path(), true, &["lists".to_string()]), 0);
        assert_eq!(run_tests(dir.path(), true, &["missing".to_string()]), 1);
    }

    #[test]
    fn warning_expectations_are_checked() {
        let warning = AssemblyWarning::unresolved(adoc::Pass::Substitution, "attribute `x` is not defined");
        let expected = vec![ExpectedWarning {
            contains: "`x`".into(),
            kind: Some("unresolved-reference".into()),
        }];
        assert_eq!(check_warnings(&[warning.clone()], &expected), None);
        assert!(check_warnings(&[], &expected).is_some());

        let wrong_kind = vec![ExpectedWarning {
            contains: "`x`".into(),
            kind: Some("malformed-attribute".into()),
        }];
        assert!(check_warnings(&[warning], &wrong_kind).is_some());
    }

    #[test]
    fn bundled_fixtures_pass() {
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures");
        assert_eq!(run_tests(&fixtures, true, &[]), 0);
    }
}
