//! Resolver behavior over small package sets

use modloom_package::{
    Dependency, DetailedDependency, ExclusionReason, LoadOrderError, LoaderState, Package,
    PackageManifest,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use semver::Version;

const RUNTIME: &str = "modloom-runtime";

fn simple(range: &str) -> Dependency {
    Dependency::Simple(range.to_string())
}

fn optional(range: &str) -> Dependency {
    Dependency::Detailed(DetailedDependency {
        version: range.to_string(),
        optional: Some(true),
    })
}

fn make_package(id: &str, version: &str, deps: &[(&str, Dependency)]) -> Package {
    let manifest = deps
        .iter()
        .fold(PackageManifest::new(id, version), |manifest, (dep, spec)| {
            manifest.with_dependency(*dep, spec.clone())
        });
    Package::from_manifest(&format!("assets/mods/{}", id), manifest).unwrap()
}

fn make_state(packages: Vec<Package>) -> LoaderState {
    let mut state = LoaderState::new("game", Version::new(1, 3, 0), RUNTIME);
    for package in packages {
        state.install(package).unwrap();
    }
    state
}

fn load_order(state: &LoaderState) -> Vec<String> {
    state.load_set().map(|p| p.id.clone()).collect()
}

fn problems(state: &LoaderState, id: &str) -> Vec<String> {
    state
        .exclusions()
        .iter()
        .find(|e| e.id == id)
        .map(|e| match &e.reason {
            ExclusionReason::UnsatisfiedDependencies(problems) => problems.clone(),
            ExclusionReason::Disabled => vec!["disabled".to_string()],
        })
        .unwrap_or_default()
}

#[test]
fn test_core_then_ui() {
    let mut state = make_state(vec![
        make_package("ui", "1.0.0", &[("core", simple("^1.0.0"))]),
        make_package("core", "1.0.0", &[]),
    ]);

    state.resolve().unwrap();

    assert_eq!(load_order(&state), vec!["core", "ui"]);
    assert!(state.exclusions().is_empty());
}

#[test]
fn test_incompatible_core_excludes_ui() {
    let mut state = make_state(vec![
        make_package("core", "2.0.0", &[]),
        make_package("ui", "1.0.0", &[("core", simple("^1.0.0"))]),
    ]);

    state.resolve().unwrap();

    assert_eq!(load_order(&state), vec!["core"]);
    assert_eq!(
        problems(&state, "ui"),
        vec!["version of package 'core' (2.0.0) is not in range '^1.0.0'"]
    );
    assert!(!state.get("ui").unwrap().is_included());
}

#[test]
fn test_cycle_fails_without_partial_exclusion() {
    let mut state = make_state(vec![
        make_package("a", "1.0.0", &[("b", simple("*"))]),
        make_package("b", "1.0.0", &[("a", simple("*"))]),
    ]);

    let result = state.resolve();

    assert_eq!(
        result,
        Err(LoadOrderError::CircularDependency {
            packages: vec!["a".to_string(), "b".to_string()],
        })
    );
    assert!(!state.is_resolved());
    assert!(state.exclusions().is_empty());
    assert!(state.installed().all(|p| !p.is_included()));
}

#[test]
fn test_cycle_message_names_residual_set() {
    let mut state = make_state(vec![
        make_package("a", "1.0.0", &[("b", simple("*"))]),
        make_package("b", "1.0.0", &[("a", simple("*"))]),
    ]);

    let message = state.resolve().unwrap_err().to_string();
    assert_eq!(
        message,
        "Detected a dependency cycle, most likely in the following packages: a, b"
    );
}

#[test]
fn test_optional_missing_dependency_is_fine() {
    let mut state = make_state(vec![make_package("a", "1.0.0", &[("b", optional("^1.0.0"))])]);

    state.resolve().unwrap();

    assert_eq!(load_order(&state), vec!["a"]);
}

#[test]
fn test_mandatory_missing_dependency_excludes_dependent() {
    let mut state = make_state(vec![make_package("a", "1.0.0", &[("b", simple("^1.0.0"))])]);

    state.resolve().unwrap();

    assert!(load_order(&state).is_empty());
    assert_eq!(problems(&state, "a"), vec!["package 'b' is not installed"]);
}

#[test]
fn test_exclusion_cascades() {
    let mut state = make_state(vec![
        make_package("a", "1.0.0", &[("missing", simple("*"))]),
        make_package("b", "1.0.0", &[("a", simple("*"))]),
        make_package("c", "1.0.0", &[("b", simple("*"))]),
        make_package("d", "1.0.0", &[("b", optional("*"))]),
    ]);

    state.resolve().unwrap();

    assert_eq!(load_order(&state), vec!["d"]);
    assert_eq!(problems(&state, "b"), vec!["package 'a' is not loaded"]);
    assert_eq!(problems(&state, "c"), vec!["package 'b' is not loaded"]);
}

#[test]
fn test_disabled_dependency() {
    let mut state = make_state(vec![
        make_package("lib", "1.0.0", &[]),
        make_package("app", "1.0.0", &[("lib", simple("*"))]),
        make_package("extra", "1.0.0", &[("lib", optional("*"))]),
    ]);
    state.set_enabled("lib", false);

    state.resolve().unwrap();

    assert_eq!(load_order(&state), vec!["extra"]);
    assert_eq!(problems(&state, "lib"), vec!["disabled"]);
    assert_eq!(problems(&state, "app"), vec!["package 'lib' is disabled"]);
}

#[test]
fn test_self_dependency_is_never_optional() {
    let mut state = make_state(vec![
        make_package("narcissus", "1.0.0", &[("narcissus", optional("*"))]),
        make_package("other", "1.0.0", &[]),
    ]);

    state.resolve().unwrap();

    assert_eq!(load_order(&state), vec!["other"]);
    assert_eq!(
        problems(&state, "narcissus"),
        vec!["a package can't depend on itself"]
    );
}

#[test]
fn test_optional_dependency_still_checks_version() {
    let mut state = make_state(vec![
        make_package("lib", "2.0.0", &[]),
        make_package("app", "1.0.0", &[("lib", optional("^1.0.0"))]),
    ]);

    state.resolve().unwrap();

    assert_eq!(load_order(&state), vec!["lib"]);
}

#[rstest]
#[case("game", "^1.0.0", true)]
#[case("game", ">=1.4.0", false)]
#[case("modloom", "^0.1.0", true)]
#[case("modloom", "^1.0.0", false)]
fn test_virtual_package_targets(#[case] target: &str, #[case] range: &str, #[case] loads: bool) {
    let mut state = make_state(vec![make_package("a", "1.0.0", &[(target, simple(range))])]);

    state.resolve().unwrap();

    assert_eq!(state.loaded("a").is_some(), loads);
    if !loads {
        let expected = format!("version of {} (", target);
        assert!(problems(&state, "a")[0].starts_with(&expected));
    }
}

#[test]
fn test_runtime_package_loads_first() {
    let mut state = make_state(vec![
        make_package("aaa", "1.0.0", &[]),
        make_package(RUNTIME, "1.0.0", &[]),
    ]);

    state.resolve().unwrap();

    assert_eq!(load_order(&state), vec![RUNTIME, "aaa"]);
}

#[test]
fn test_order_is_independent_of_input_order() {
    let build = || {
        vec![
            make_package("zeta", "1.0.0", &[("beta", simple("*"))]),
            make_package("beta", "1.0.0", &[]),
            make_package("alpha", "1.0.0", &[("zeta", simple("*"))]),
            make_package("gamma", "1.0.0", &[]),
        ]
    };

    let mut forward = make_state(build());
    forward.resolve().unwrap();

    let mut reversed_input = build();
    reversed_input.reverse();
    let mut backward = make_state(reversed_input);
    backward.resolve().unwrap();

    assert_eq!(load_order(&forward), load_order(&backward));
    assert_eq!(load_order(&forward), vec!["beta", "gamma", "zeta", "alpha"]);
}

#[test]
fn test_exclusion_report() {
    let mut state = make_state(vec![make_package(
        "a",
        "1.0.0",
        &[("game", simple(">=2")), ("b", simple("^1.0.0"))],
    )]);

    state.resolve().unwrap();

    insta::assert_snapshot!(state.exclusions()[0].report(), @r"
    Could not load 'a':
      - package 'b' is not installed
      - version of game (1.3.0) is not in range '>=2'
    ");
}
