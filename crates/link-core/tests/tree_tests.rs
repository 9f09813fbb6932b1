//! Tests for recursive tree mirroring
#![cfg(unix)]

use link_core::link::reason;
use link_core::{
    ExclusionCompiler, ExclusionMatcher, LinkAction, LinkCreator, LinkOutcome, TreeSynchronizer,
};
use link_core::rules::ExclusionSet;
use link_test_utils::tree::TestTree;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};

async fn mirror(tree: &TestTree, roots: &[&str], matcher: &ExclusionMatcher, dry_run: bool) -> Vec<LinkOutcome> {
    let mut outcomes = TreeSynchronizer::new(tree.source(), tree.target(), matcher, LinkCreator::new(dry_run, false))
        .with_concurrency(4)
        .sync(roots)
        .await;
    outcomes.sort_by(|a, b| a.target.cmp(&b.target));
    outcomes
}

fn rel(tree: &TestTree, outcome: &LinkOutcome) -> PathBuf {
    outcome.target.strip_prefix(tree.target()).unwrap().to_path_buf()
}

#[tokio::test]
async fn mirrors_every_file_as_a_leaf_link() {
    let tree = TestTree::new();
    tree.write_source("conf/a.txt", "a");
    tree.write_source("conf/b.txt", "b");

    let outcomes = mirror(&tree, &["conf"], &ExclusionMatcher::empty(), false).await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.action == LinkAction::Created));
    tree.assert_link("conf/a.txt");
    tree.assert_link("conf/b.txt");
    let conf = std::fs::symlink_metadata(tree.target().join("conf")).unwrap();
    assert!(conf.is_dir(), "conf itself should be a real directory");
}

#[tokio::test]
async fn local_file_inside_mirrored_directory_survives() {
    let tree = TestTree::new();
    tree.write_source("conf/a.txt", "a");
    tree.write_source("conf/b.txt", "b");
    tree.write_target("conf/b.txt", "local");

    let outcomes = mirror(&tree, &["conf"], &ExclusionMatcher::empty(), false).await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].action, LinkAction::Created);
    assert_eq!(outcomes[1].action, LinkAction::Skipped);
    assert_eq!(outcomes[1].reason(), Some(reason::LOCAL_OVERRIDE));
    tree.assert_link("conf/a.txt");
    tree.assert_real_file("conf/b.txt", "local");
}

#[tokio::test]
async fn nested_directories_are_recreated_as_real_directories() {
    let tree = TestTree::new();
    tree.write_source("conf/sub/deeper/c.txt", "c");
    tree.write_source("conf/top.txt", "t");

    let outcomes = mirror(&tree, &["conf"], &ExclusionMatcher::empty(), false).await;

    let created: Vec<_> = outcomes.iter().map(|o| rel(&tree, o)).collect();
    assert_eq!(
        created,
        vec![
            PathBuf::from("conf/sub/deeper/c.txt"),
            PathBuf::from("conf/top.txt")
        ]
    );
    tree.assert_link("conf/sub/deeper/c.txt");
}

#[tokio::test]
async fn existing_directory_link_stops_recursion() {
    let tree = TestTree::new();
    let conf = tree.mkdir_source("conf");
    tree.write_source("conf/a.txt", "a");
    tree.symlink_target("conf", &conf);

    let outcomes = mirror(&tree, &["conf"], &ExclusionMatcher::empty(), false).await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].action, LinkAction::Skipped);
    assert_eq!(outcomes[0].reason(), Some(reason::DIRECTORY_LINK_EXISTS));
}

#[tokio::test]
async fn directory_link_to_elsewhere_is_descended() {
    let tree = TestTree::new();
    tree.write_source("conf/a.txt", "a");
    tree.write_source("conf/b.txt", "b");
    let elsewhere = tempfile::TempDir::new().unwrap();
    std::fs::write(elsewhere.path().join("a.txt"), "theirs").unwrap();
    tree.symlink_target("conf", elsewhere.path());

    let outcomes = mirror(&tree, &["conf"], &ExclusionMatcher::empty(), false).await;

    let summary: Vec<_> = outcomes
        .iter()
        .map(|o| (rel(&tree, o), o.action, o.reason().map(str::to_string)))
        .collect();
    assert_eq!(
        summary,
        vec![
            (PathBuf::from("conf/a.txt"), LinkAction::Skipped, Some(reason::LOCAL_OVERRIDE.to_string())),
            (PathBuf::from("conf/b.txt"), LinkAction::Created, None),
        ]
    );
    assert_eq!(std::fs::read_to_string(elsewhere.path().join("a.txt")).unwrap(), "theirs");
    assert_eq!(
        std::fs::read_link(elsewhere.path().join("b.txt")).unwrap(),
        tree.source().join("conf/b.txt")
    );
}

#[tokio::test]
async fn missing_tree_root_is_a_no_op() {
    let tree = TestTree::new();
    let outcomes = mirror(&tree, &["nothing-here"], &ExclusionMatcher::empty(), false).await;
    assert!(outcomes.is_empty());
}

#[tokio::test]
async fn file_tree_root_links_directly() {
    let tree = TestTree::new();
    tree.write_source(".tool-versions", "node 20");

    let outcomes = mirror(&tree, &[".tool-versions"], &ExclusionMatcher::empty(), false).await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].action, LinkAction::Created);
    tree.assert_link(".tool-versions");
}

#[tokio::test]
async fn excluded_entries_are_skipped_silently() {
    let tree = TestTree::new();
    tree.write_source("web/index.js", "i");
    tree.write_source("web/node_modules/react/index.js", "r");
    let matcher = ExclusionCompiler::default()
        .compile(&[], &ExclusionSet::default())
        .unwrap();

    let outcomes = mirror(&tree, &["web"], &matcher, false).await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(rel(&tree, &outcomes[0]), Path::new("web/index.js"));
    tree.assert_absent("web/node_modules");
}

#[tokio::test]
async fn source_symlinks_are_linked_as_leaves() {
    let tree = TestTree::new();
    let real = tree.mkdir_source("shared");
    tree.write_source("shared/x.txt", "x");
    tree.mkdir_source("conf");
    std::os::unix::fs::symlink(&real, tree.source().join("conf/shared")).unwrap();

    let outcomes = mirror(&tree, &["conf"], &ExclusionMatcher::empty(), false).await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].action, LinkAction::Created);
    tree.assert_link("conf/shared");
}

#[tokio::test]
async fn whole_root_with_dot_rule() {
    let tree = TestTree::new();
    tree.write_source("a.txt", "a");
    tree.write_source("dir/b.txt", "b");

    let outcomes = mirror(&tree, &[""], &ExclusionMatcher::empty(), false).await;

    assert_eq!(outcomes.len(), 2);
    tree.assert_link("a.txt");
    tree.assert_link("dir/b.txt");
}

#[tokio::test]
async fn dry_run_reports_the_same_leaves_without_touching_disk() {
    let tree = TestTree::new();
    tree.write_source("conf/a.txt", "a");
    tree.write_source("conf/sub/b.txt", "b");

    let dry = mirror(&tree, &["conf"], &ExclusionMatcher::empty(), true).await;
    tree.assert_absent("conf");

    let real = mirror(&tree, &["conf"], &ExclusionMatcher::empty(), false).await;
    assert_eq!(dry, real);
}
