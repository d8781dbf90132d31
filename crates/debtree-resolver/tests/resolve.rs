use debtree_archive::testing::{write_deb, write_package};
use debtree_core::reference::{parse_dpkg, ReferenceSet};
use debtree_core::version::{Operator, Version};
use debtree_resolver::report::{render_json, render_text, SortOrder};
use debtree_resolver::{
    resolve_all, DebControlReader, DepTreeBuilder, LocalLocator, ResolveOptions,
};
use debtree_util::errors::DebError;

fn reference(entries: &[(&str, &str)]) -> ReferenceSet {
    entries
        .iter()
        .map(|(name, version)| (name.to_string(), Version::parse(version)))
        .collect()
}

#[test]
fn test_cycle_resolves_each_package_once() {
    let dir = tempfile::tempdir().unwrap();
    write_package(dir.path(), "pkgA", "1.0", Some("pkgB")).unwrap();
    write_package(dir.path(), "pkgB", "1.0", Some("pkgA")).unwrap();

    let locator = LocalLocator::new(dir.path());
    let reader = DebControlReader::default();
    let graph = resolve_all(&["pkgA"], true, Some(&ReferenceSet::new()), &locator, &reader).unwrap();

    assert_eq!(graph.len(), 2);
    assert!(graph.get("pkgA").unwrap().contains_key("pkgB"));
    assert!(graph.get("pkgB").unwrap().contains_key("pkgA"));
}

#[test]
fn test_satisfied_dependency_is_not_fetched() {
    let dir = tempfile::tempdir().unwrap();
    // No pkgX artifact: reaching it would fail the run.
    write_package(dir.path(), "app", "1.0", Some("pkgX (>= 1.0)")).unwrap();

    let locator = LocalLocator::new(dir.path());
    let reader = DebControlReader::default();
    let installed = reference(&[("pkgX", "2.0")]);
    let graph = resolve_all(&["app"], true, Some(&installed), &locator, &reader).unwrap();

    assert_eq!(graph.names().collect::<Vec<_>>(), vec!["app"]);
    let constraints = &graph.get("app").unwrap()["pkgX"];
    assert_eq!(constraints[0].op, Operator::GreaterOrEqual);
}

#[test]
fn test_unsatisfied_dependency_is_followed() {
    let dir = tempfile::tempdir().unwrap();
    write_package(dir.path(), "app", "1.0", Some("pkgX (>= 3.0)")).unwrap();
    write_package(dir.path(), "pkgX", "3.1", None).unwrap();

    let locator = LocalLocator::new(dir.path());
    let reader = DebControlReader::default();
    let installed = reference(&[("pkgX", "2.0")]);
    let graph = resolve_all(&["app"], true, Some(&installed), &locator, &reader).unwrap();

    assert_eq!(graph.names().collect::<Vec<_>>(), vec!["app", "pkgX"]);
}

#[test]
fn test_unfetchable_dependency_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    write_package(dir.path(), "app", "1.0", Some("pkgX (>= 3.0)")).unwrap();

    let locator = LocalLocator::new(dir.path());
    let reader = DebControlReader::default();
    let installed = reference(&[("pkgX", "2.0")]);
    let err = resolve_all(&["app"], true, Some(&installed), &locator, &reader).unwrap_err();
    assert!(
        matches!(err, DebError::ArtifactUnavailable { ref name, .. } if name == "pkgX"),
        "got {err:?}"
    );
}

#[test]
fn test_local_deb_path_uses_package_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_package(dir.path(), "python-debtools", "0.3-1", Some("python-stdeb")).unwrap();

    let locator = LocalLocator::new(dir.path());
    let reader = DebControlReader::default();
    let graph = resolve_all(
        &[path.to_str().unwrap()],
        false,
        None,
        &locator,
        &reader,
    )
    .unwrap();

    assert_eq!(graph.names().collect::<Vec<_>>(), vec!["python-debtools"]);
}

#[test]
fn test_missing_local_deb() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope_1.0_all.deb");
    let locator = LocalLocator::new(dir.path());
    let reader = DebControlReader::default();
    let err = resolve_all(&[missing.to_str().unwrap()], false, None, &locator, &reader).unwrap_err();
    assert!(matches!(err, DebError::ArtifactUnavailable { .. }), "got {err:?}");
}

#[test]
fn test_ambiguous_local_candidates() {
    let dir = tempfile::tempdir().unwrap();
    write_package(dir.path(), "lib", "1.0", None).unwrap();
    write_package(dir.path(), "lib", "2.0", None).unwrap();

    let locator = LocalLocator::new(dir.path());
    let reader = DebControlReader::default();
    let err = resolve_all(&["lib"], false, None, &locator, &reader).unwrap_err();
    match err {
        DebError::ArtifactUnavailable { reason, .. } => assert!(reason.contains("ambiguous"), "{reason}"),
        other => panic!("expected ArtifactUnavailable, got {other:?}"),
    }
}

#[test]
fn test_missing_package_field() {
    let dir = tempfile::tempdir().unwrap();
    write_deb(dir.path(), "anon_1.0_all.deb", "Version: 1.0\n").unwrap();

    let locator = LocalLocator::new(dir.path());
    let reader = DebControlReader::default();
    let err = resolve_all(&["anon"], false, None, &locator, &reader).unwrap_err();
    assert!(matches!(err, DebError::MalformedRecord { .. }), "got {err:?}");
}

#[test]
fn test_pre_depends_merged_after_depends() {
    let dir = tempfile::tempdir().unwrap();
    write_deb(
        dir.path(),
        "app_1.0_all.deb",
        "Package: app\nVersion: 1.0\nDepends: libc6 (>= 2.30)\nPre-Depends: libc6 (<< 3), dpkg\n",
    )
    .unwrap();

    let locator = LocalLocator::new(dir.path());
    let reader = DebControlReader::default();
    let graph = resolve_all(&["app"], false, None, &locator, &reader).unwrap();
    let deps = graph.get("app").unwrap();
    let libc: Vec<String> = deps["libc6"].iter().map(ToString::to_string).collect();
    assert_eq!(libc, vec![">= 2.30", "<< 3"]);
    assert!(deps.contains_key("dpkg"));
}

#[test]
fn test_alternatives_follow_reference_set() {
    let dir = tempfile::tempdir().unwrap();
    write_package(dir.path(), "app", "1.0", Some("mawk | gawk (>= 4), base")).unwrap();
    write_package(dir.path(), "base", "1.0", None).unwrap();

    let locator = LocalLocator::new(dir.path());
    let reader = DebControlReader::default();

    let without = resolve_all(&["app"], false, None, &locator, &reader).unwrap();
    assert_eq!(without.get("app").unwrap().keys().collect::<Vec<_>>(), vec!["base"]);

    let installed = parse_dpkg("ii  gawk:amd64  1:5.1.0-1  amd64  GNU awk\n");
    let options = ResolveOptions::default().recursive(true);
    let graph = DepTreeBuilder::new(options, Some(&installed), &locator, &reader)
        .resolve_all(["app"])
        .unwrap();
    let deps = graph.get("app").unwrap();
    assert!(deps["gawk"].is_empty());
    assert!(!deps.contains_key("mawk"));
    // gawk is installed with no constraint, so only base is followed.
    assert_eq!(graph.names().collect::<Vec<_>>(), vec!["app", "base"]);
}

#[test]
fn test_reports_from_resolved_graph() {
    let dir = tempfile::tempdir().unwrap();
    write_package(dir.path(), "python-debtools", "0.3-1", Some("python (>= 2.7), python-stdeb")).unwrap();
    write_package(dir.path(), "python-stdeb", "0.8", None).unwrap();

    let locator = LocalLocator::new(dir.path());
    let reader = DebControlReader::default();
    let installed = reference(&[("python", "2.7.18")]);
    let graph = resolve_all(&["python-debtools"], true, Some(&installed), &locator, &reader).unwrap();

    assert_eq!(
        render_text(&graph, SortOrder::Install),
        "python-stdeb\n============\n\n\npython-debtools\n===============\n\n  * python (>= 2.7)\n  * python-stdeb\n"
    );

    let json: serde_json::Value = serde_json::from_str(&render_json(&graph).unwrap()).unwrap();
    assert_eq!(json["python-debtools"]["python"][0]["op"], ">=");
    assert_eq!(json["python-debtools"]["python"][0]["version"], "2.7");
    assert_eq!(json["python-stdeb"], serde_json::json!({}));
}
