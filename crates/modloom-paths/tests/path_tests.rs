//! Path normalizer tests: POSIX edge cases and round-trip properties

use modloom_paths::{basename, dirname, extname, join, normalize, relative, resolve};
use proptest::prelude::*;
use rstest::rstest;

// ============================================================================
// Edge Cases
// ============================================================================

#[rstest]
#[case("", ".")]
#[case("/", "/")]
#[case("//", "/")]
#[case(".", ".")]
#[case("..", "..")]
#[case("./", "./")]
#[case("../", "../")]
#[case("a//b", "a/b")]
#[case("/a/./b/../c", "/a/c")]
#[case("/a/b/../../..", "/")]
#[case("a/b/../../..", "..")]
#[case("./../a", "../a")]
#[case("...", "...")]
#[case("a/.../b", "a/.../b")]
#[case("/x/y/", "/x/y/")]
fn test_normalize_cases(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(normalize(input), expected);
}

#[rstest]
#[case("", ".")]
#[case("/", "/")]
#[case("a", ".")]
#[case("a/", ".")]
#[case("/a/b", "/a")]
#[case("a/b//", "a")]
#[case("//a", "//")]
fn test_dirname_cases(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(dirname(input), expected);
}

#[rstest]
#[case("", None, "")]
#[case("/", None, "")]
#[case("a/b.png", None, "b.png")]
#[case("a/b.png", Some(".png"), "b")]
#[case("a/b.png", Some(".jpg"), "b.png")]
#[case("b.png", Some("b.png"), "")]
#[case("a/.png", Some(".png"), ".png")]
#[case("dir/file.tar.gz", Some(".gz"), "file.tar")]
fn test_basename_cases(#[case] input: &str, #[case] ext: Option<&str>, #[case] expected: &str) {
    assert_eq!(basename(input, ext), expected);
}

#[rstest]
#[case("", "")]
#[case("file", "")]
#[case("file.", ".")]
#[case("file.json", ".json")]
#[case("archive.tar.gz", ".gz")]
#[case(".hidden", "")]
#[case("..", "")]
#[case("...", "")]
#[case("a/b.c/", ".c")]
#[case("a.b/c", "")]
fn test_extname_cases(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(extname(input), expected);
}

#[test]
fn test_resolve_is_always_absolute() {
    assert_eq!(resolve(&["data", "../..", "x.json"]), "/x.json");
    assert_eq!(resolve(&["", ""]), "/");
    assert_eq!(resolve(&["/a", "", "b/"]), "/a/b");
}

#[test]
fn test_relative_same_location_is_empty() {
    assert_eq!(relative("/a/b", "/a/b"), "");
    assert_eq!(relative("/a/./b", "/a/b/"), "");
}

#[test]
fn test_relative_prefix_must_align_on_separator() {
    assert_eq!(relative("/foo/bar", "/foo/barbaz"), "../barbaz");
    assert_eq!(relative("/foo/barbaz", "/foo/bar"), "../bar");
}

// ============================================================================
// Properties
// ============================================================================

fn segment() -> impl Strategy<Value = String> {
    "[a-z]{1,6}(\\.[a-z]{1,3})?"
}

fn relative_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..5).prop_map(|segments| segments.join("/"))
}

fn absolute_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 0..5).prop_map(|segments| format!("/{}", segments.join("/")))
}

fn any_path() -> impl Strategy<Value = String> {
    prop_oneof![relative_path(), relative_path().prop_map(|p| format!("/{}", p))]
}

proptest! {
    #[test]
    fn prop_parent_join_matches_dirname(a in any_path(), b in relative_path()) {
        prop_assert_eq!(
            normalize(&join(&[a.as_str(), "..", b.as_str()])),
            normalize(&join(&[dirname(&a), b.as_str()]))
        );
    }

    #[test]
    fn prop_relative_round_trips(a in absolute_path(), b in absolute_path()) {
        let rel = relative(&a, &b);
        prop_assert_eq!(normalize(&join(&[a.as_str(), rel.as_str()])), normalize(&b));
    }

    #[test]
    fn prop_normalize_is_idempotent(p in "[a-z./]{0,16}") {
        let once = normalize(&p);
        prop_assert_eq!(normalize(&once), once);
    }
}
