use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tempfile::TempDir;
use tokio::fs;

use crate::error::Error;
use crate::find::{find, Find};

/// Builds `a/b.txt`, `a/c.txt` and an empty folder `d` under a fresh
/// temporary root.
async fn sample_tree() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::create_dir(dir.path().join("a")).await.expect("mkdir a");
    fs::write(dir.path().join("a/b.txt"), b"b").await.expect("write b");
    fs::write(dir.path().join("a/c.txt"), b"c").await.expect("write c");
    fs::create_dir(dir.path().join("d")).await.expect("mkdir d");
    dir
}

fn rel(paths: &[&str]) -> Vec<PathBuf> {
    paths.iter().map(PathBuf::from).collect()
}

#[tokio::test]
async fn delivers_parents_before_children_by_default() {
    let dir = sample_tree().await;

    let found = find(dir.path()).await.expect("traversal succeeds");
    assert_eq!(found, rel(&[".", "a", "a/b.txt", "a/c.txt", "d"]));
}

#[tokio::test]
async fn depth_first_delivers_children_before_parents() {
    let dir = sample_tree().await;

    let found = Find::new(dir.path())
        .depth_first(true)
        .collect()
        .await
        .expect("traversal succeeds");
    assert_eq!(found, rel(&["a/b.txt", "a/c.txt", "a", "d", "."]));
}

#[tokio::test]
async fn qualified_output_prefixes_the_root() {
    let dir = sample_tree().await;

    let relative = find(dir.path()).await.expect("relative traversal");
    let qualified = Find::new(dir.path())
        .qualified(true)
        .collect()
        .await
        .expect("qualified traversal");

    assert_eq!(relative.len(), qualified.len());
    for (qualified_path, relative_path) in qualified.iter().zip(&relative) {
        if relative_path == Path::new(".") {
            assert_eq!(qualified_path, dir.path());
        } else {
            assert_eq!(qualified_path, &dir.path().join(relative_path));
        }
    }
}

#[tokio::test]
async fn depth_window_bounds_delivery() {
    let dir = sample_tree().await;

    let found = Find::new(dir.path())
        .min_depth(1)
        .max_depth(1)
        .collect()
        .await
        .expect("traversal succeeds");
    assert_eq!(found, rel(&["a", "d"]));
}

#[tokio::test]
async fn max_depth_zero_yields_nothing() {
    let dir = sample_tree().await;

    let found = Find::new(dir.path())
        .max_depth(0)
        .collect()
        .await
        .expect("traversal succeeds");
    assert!(found.is_empty());
}

#[tokio::test]
async fn rejected_folders_are_not_descended() {
    let dir = sample_tree().await;
    let calls = Arc::new(AtomicUsize::new(0));

    let found = Find::new(dir.path())
        .filter({
            let calls = calls.clone();
            move |entry, _ctx| {
                calls.fetch_add(1, Ordering::SeqCst);
                let keep = entry.local_path != Path::new("a");
                async move { Ok(keep) }
            }
        })
        .collect()
        .await
        .expect("traversal succeeds");

    assert_eq!(found, rel(&[".", "d"]));
    // Only "a" and "d" were offered to the filter; nothing below the
    // rejected folder was ever visited.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rejected_folders_are_descended_on_demand() {
    let dir = sample_tree().await;

    let found = Find::new(dir.path())
        .skip_filtered_folder(false)
        .filter(|entry, _ctx| async move { Ok(entry.local_path != Path::new("a")) })
        .collect()
        .await
        .expect("traversal succeeds");

    assert_eq!(found, rel(&[".", "a/b.txt", "a/c.txt", "d"]));
}

#[tokio::test]
async fn filter_self_subjects_the_root_to_the_filter() {
    let dir = sample_tree().await;

    let exempt = Find::new(dir.path())
        .filter(|entry, _ctx| async move { Ok(!entry.is_root) })
        .collect()
        .await
        .expect("traversal succeeds");
    assert_eq!(exempt, rel(&[".", "a", "a/b.txt", "a/c.txt", "d"]));

    let filtered = Find::new(dir.path())
        .filter_self(true)
        .filter(|entry, _ctx| async move { Ok(!entry.is_root) })
        .collect()
        .await
        .expect("traversal succeeds");
    assert!(filtered.is_empty());
}

#[tokio::test]
async fn min_depth_keeps_the_root_from_the_filter() {
    let dir = sample_tree().await;
    let calls = Arc::new(AtomicUsize::new(0));

    let found = Find::new(dir.path())
        .filter_self(true)
        .min_depth(1)
        .filter({
            let calls = calls.clone();
            move |_entry, _ctx| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(true) }
            }
        })
        .collect()
        .await
        .expect("traversal succeeds");

    assert_eq!(found, rel(&["a", "a/b.txt", "a/c.txt", "d"]));
    // The root sits below the depth window, so even with filter_self the
    // filter never saw it.
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn converter_maps_and_vetoes_delivery() {
    let dir = sample_tree().await;

    let found = Find::new(dir.path())
        .converter(|entry, _ctx| async move {
            if entry.metadata.is_dir() {
                Ok(Some(entry.depth))
            } else {
                Ok(None)
            }
        })
        .collect()
        .await
        .expect("traversal succeeds");

    // ".", "a" and "d" in traversal order; both files vetoed.
    assert_eq!(found, vec![0, 1, 1]);
}

#[tokio::test]
async fn child_depth_is_parent_depth_plus_one() {
    let dir = sample_tree().await;

    let found = Find::new(dir.path())
        .converter(|entry, _ctx| async move { Ok(Some((entry.local_path, entry.depth))) })
        .collect()
        .await
        .expect("traversal succeeds");

    let expected = vec![
        (PathBuf::from("."), 0),
        (PathBuf::from("a"), 1),
        (PathBuf::from("a/b.txt"), 2),
        (PathBuf::from("a/c.txt"), 2),
        (PathBuf::from("d"), 1),
    ];
    assert_eq!(found, expected);
}

#[tokio::test]
async fn context_is_shared_between_filter_and_converter() {
    let dir = sample_tree().await;

    let found = Find::new(dir.path())
        .filter(|entry, ctx| async move {
            ctx.set("depth-at-filter", entry.depth);
            Ok(true)
        })
        .converter(|entry, ctx| async move {
            let seen = ctx.take::<usize>("depth-at-filter");
            Ok(Some((entry.local_path, entry.depth, seen)))
        })
        .collect()
        .await
        .expect("traversal succeeds");

    for (local_path, depth, seen) in found {
        if local_path == Path::new(".") {
            // The root is exempt from the filter, so its context is empty.
            assert_eq!(seen, None);
        } else {
            assert_eq!(seen, Some(depth), "context mismatch for {local_path:?}");
        }
    }
}

#[tokio::test]
async fn cancellation_stops_all_later_delivery() {
    let dir = sample_tree().await;

    let found = Find::new(dir.path())
        .filter(|entry, ctx| async move {
            if entry.local_path == Path::new("a/b.txt") {
                ctx.cancel();
            }
            Ok(true)
        })
        .collect()
        .await
        .expect("cancellation is not an error");

    // The entry that requested cancellation still completes; nothing after
    // it is visited or delivered.
    assert_eq!(found, rel(&[".", "a", "a/b.txt"]));
}

#[tokio::test]
async fn filter_errors_abort_the_traversal() {
    let dir = sample_tree().await;

    let result = Find::new(dir.path())
        .filter(|entry, _ctx| async move {
            if entry.local_path == Path::new("a/c.txt") {
                Err(Error::callback("filter blew up"))
            } else {
                Ok(true)
            }
        })
        .collect()
        .await;

    assert!(matches!(result, Err(Error::Callback(_))));
}

#[tokio::test]
async fn missing_root_is_an_error() {
    let dir = tempfile::tempdir().expect("create temp dir");

    let result = find(dir.path().join("missing")).await;
    assert!(matches!(result, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn vanished_siblings_are_skipped_silently() {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::write(dir.path().join("x1.txt"), b"1").await.expect("write x1");
    fs::write(dir.path().join("x2.txt"), b"2").await.expect("write x2");
    fs::write(dir.path().join("x3.txt"), b"3").await.expect("write x3");

    let doomed = dir.path().join("x3.txt");
    let found = Find::new(dir.path())
        .filter(move |entry, _ctx| {
            let doomed = doomed.clone();
            async move {
                if entry.local_path == Path::new("x1.txt") {
                    // x3 was already listed; it disappears before its visit.
                    std::fs::remove_file(&doomed).expect("remove x3");
                }
                Ok(true)
            }
        })
        .collect()
        .await
        .expect("traversal succeeds");

    assert_eq!(found, rel(&[".", "x1.txt", "x2.txt"]));
}

#[tokio::test]
async fn identical_runs_deliver_identical_sequences() {
    let dir = sample_tree().await;

    let first = find(dir.path()).await.expect("first run");
    let second = find(dir.path()).await.expect("second run");
    assert_eq!(first, second);
}

#[tokio::test]
async fn deferred_conversions_all_arrive() {
    let dir = sample_tree().await;

    let found = Find::new(dir.path())
        .converter(|entry, _ctx| async move {
            // Earlier entries resolve later, scrambling completion order.
            let delay = if entry.depth == 0 { 30 } else { 5 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(Some(entry.local_path))
        })
        .collect()
        .await
        .expect("traversal succeeds");

    let mut found = found;
    found.sort();
    let mut expected = rel(&[".", "a", "a/b.txt", "a/c.txt", "d"]);
    expected.sort();
    assert_eq!(found, expected);
}

#[tokio::test]
async fn gated_conversions_preserve_traversal_order() {
    let dir = sample_tree().await;

    let found = Find::new(dir.path())
        .wait_for_converter(true)
        .converter(|entry, _ctx| async move {
            let delay = if entry.depth == 0 { 30 } else { 5 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(Some(entry.local_path))
        })
        .collect()
        .await
        .expect("traversal succeeds");

    assert_eq!(found, rel(&[".", "a", "a/b.txt", "a/c.txt", "d"]));
}

#[tokio::test]
async fn stream_matches_collection() {
    let dir = sample_tree().await;

    let collected = find(dir.path()).await.expect("collection run");

    let mut stream = Find::new(dir.path()).buffer(2).stream();
    let mut streamed = Vec::new();
    while let Some(item) = stream.next().await {
        streamed.push(item.expect("stream item"));
    }
    assert_eq!(streamed, collected);
}

#[tokio::test]
async fn slow_consumers_see_the_same_sequence() {
    let dir = sample_tree().await;

    let collected = find(dir.path()).await.expect("collection run");

    let mut stream = Find::new(dir.path()).buffer(1).stream();
    let mut streamed = Vec::new();
    while let Some(item) = stream.next().await {
        streamed.push(item.expect("stream item"));
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    assert_eq!(streamed, collected);
}

#[tokio::test]
async fn stream_surfaces_errors_as_the_final_item() {
    let dir = sample_tree().await;

    let mut stream = Find::new(dir.path())
        .filter(|entry, _ctx| async move {
            if entry.local_path == Path::new("d") {
                Err(Error::callback("filter blew up"))
            } else {
                Ok(true)
            }
        })
        .stream();

    let mut values = Vec::new();
    let mut failure = None;
    while let Some(item) = stream.next().await {
        match item {
            Ok(value) => values.push(value),
            Err(error) => failure = Some(error),
        }
    }

    assert_eq!(values, rel(&[".", "a", "a/b.txt", "a/c.txt"]));
    assert!(matches!(failure, Some(Error::Callback(_))));
}

#[tokio::test]
async fn consumer_cancellation_halts_production() {
    let dir = sample_tree().await;

    let mut stream = Find::new(dir.path()).buffer(1).stream();
    let first = stream
        .next()
        .await
        .expect("one item")
        .expect("first item is a value");
    assert_eq!(first, PathBuf::from("."));

    stream.cancel();
    assert!(stream.is_cancelled());

    // At most what was already buffered can still drain, and none of it is
    // an error.
    let leftovers: Vec<_> = stream.collect().await;
    assert!(leftovers.len() <= 1);
    assert!(leftovers.into_iter().all(|item| item.is_ok()));
}
