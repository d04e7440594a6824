//! Recommendation, reload and live-swap behavior of the serving side.

mod support;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use mixtape::error::{RequestError, ServeError, SnapshotError};
use mixtape::persistence::save_snapshot;
use mixtape::serving::{
    FileSnapshot, ManualFreshness, ModelStore, RecommendRequest, RecommendService, ReloadOutcome,
    Reloader,
};
use mixtape::testkit::domain::{rule, scenario_snapshot, snapshot};
use mixtape::testkit::serving::{reloader, ScriptedLoader};
use support::files::{workspace, write};

fn songs(service: &RecommendService, input: &[&str]) -> Vec<String> {
    service
        .recommend(&RecommendRequest::new(input.iter().copied()))
        .unwrap()
        .songs
}

#[test]
fn recommends_from_scenario_model() {
    let version = Arc::new(ManualFreshness::new(1));
    let loader = ScriptedLoader::new(scenario_snapshot());
    let service = RecommendService::new(reloader(&version, &loader)).with_version("1.0.1");

    let response = service
        .recommend(&RecommendRequest::new(["A"]))
        .unwrap();
    assert_eq!(response.songs, vec!["B"]);
    assert_eq!(response.version, "1.0.1");
    assert_eq!(response.model_date, "2024-01-01T00:00:00+00:00");

    // C => B is the only rule that applies
    assert_eq!(songs(&service, &["C"]), vec!["B"]);
    assert!(songs(&service, &["A", "B", "C"]).is_empty());
    assert!(songs(&service, &["unknown"]).is_empty());
}

#[test]
fn unchanged_resource_is_not_reloaded() {
    let version = Arc::new(ManualFreshness::new(1));
    let loader = ScriptedLoader::new(scenario_snapshot());
    let reloader = reloader(&version, &loader);

    assert!(matches!(reloader.maybe_reload(), Ok(ReloadOutcome::Reloaded(_))));
    for _ in 0..3 {
        assert!(matches!(reloader.maybe_reload(), Ok(ReloadOutcome::Unchanged)));
    }
    assert_eq!(loader.loads(), 1);
    assert_eq!(reloader.rebuild_count(), 1);
}

#[test]
fn failed_reload_keeps_previous_model() {
    let version = Arc::new(ManualFreshness::new(1));
    let loader = ScriptedLoader::new(scenario_snapshot());
    let reloader = reloader(&version, &loader);
    let service = RecommendService::new(reloader.clone());
    assert_eq!(songs(&service, &["A"]), vec!["B"]);

    loader.set_failure("truncated file");
    version.bump();

    assert!(matches!(
        reloader.maybe_reload(),
        Err(SnapshotError::Corrupt(_))
    ));
    assert_eq!(songs(&service, &["A"]), vec!["B"]);
    // The rejected version is not read again.
    assert!(matches!(
        reloader.maybe_reload(),
        Err(SnapshotError::Rejected { .. })
    ));
    assert_eq!(loader.loads(), 2);

    loader.set_snapshot(snapshot(vec![rule(&["A"], &["Z"], 0.9, 2.0)]));
    version.bump();
    assert_eq!(songs(&service, &["A"]), vec!["Z"]);
    assert_eq!(reloader.rebuild_count(), 2);
}

#[test]
fn no_model_is_unavailable_before_validation() {
    let dir = workspace();
    let reloader = Reloader::from_file(
        Arc::new(ModelStore::new()),
        FileSnapshot::new(dir.path().join("absent.json")),
    );
    let service = RecommendService::new(Arc::new(reloader));

    assert!(matches!(
        service.recommend(&RecommendRequest::new(["A"])),
        Err(ServeError::Unavailable { .. })
    ));
    assert!(matches!(
        service.recommend(&RecommendRequest::default()),
        Err(ServeError::Unavailable { .. })
    ));
    assert!(!service.health().model_loaded);
}

#[test]
fn invalid_requests_are_rejected_once_a_model_is_live() {
    let version = Arc::new(ManualFreshness::new(1));
    let loader = ScriptedLoader::new(scenario_snapshot());
    let service = RecommendService::new(reloader(&version, &loader));

    assert_eq!(
        service.recommend(&RecommendRequest::default()),
        Err(ServeError::Request(RequestError::MissingSongs))
    );
    assert_eq!(
        service.recommend(&RecommendRequest::new(Vec::<String>::new())),
        Err(ServeError::Request(RequestError::EmptySongs))
    );
    assert!(matches!(
        service.recommend_json(b"{"),
        Err(ServeError::Request(RequestError::Malformed { .. }))
    ));
}

#[test]
fn max_results_caps_the_answer() {
    let version = Arc::new(ManualFreshness::new(1));
    let loader = ScriptedLoader::new(snapshot(vec![
        rule(&["A"], &["B"], 0.9, 1.0),
        rule(&["A"], &["C"], 0.8, 1.0),
        rule(&["A"], &["D"], 0.7, 1.0),
    ]));
    let service = RecommendService::new(reloader(&version, &loader)).with_max_results(2);
    assert_eq!(songs(&service, &["A"]), vec!["B", "C"]);
}

#[test]
fn file_snapshot_hot_reload() {
    let dir = workspace();
    let path = dir.path().join("rules.json");
    save_snapshot(&scenario_snapshot(), &path).unwrap();

    let reloader = Arc::new(Reloader::from_file(
        Arc::new(ModelStore::new()),
        FileSnapshot::new(&path),
    ));
    let service = RecommendService::new(reloader.clone());
    assert_eq!(songs(&service, &["A"]), vec!["B"]);

    write(dir.path(), "rules.json", "{ not a snapshot");
    assert_eq!(songs(&service, &["A"]), vec!["B"]);

    save_snapshot(
        &snapshot(vec![
            rule(&["A"], &["Q"], 0.95, 3.0),
            rule(&["A"], &["R"], 0.5, 1.0),
        ]),
        &path,
    )
    .unwrap();
    assert_eq!(songs(&service, &["A"]), vec!["Q", "R"]);
    assert_eq!(reloader.rebuild_count(), 2);
}

#[test]
fn deleted_snapshot_keeps_serving_and_is_reported_once() {
    let dir = workspace();
    let path = dir.path().join("rules.json");
    save_snapshot(&scenario_snapshot(), &path).unwrap();

    let reloader = Arc::new(Reloader::from_file(
        Arc::new(ModelStore::new()),
        FileSnapshot::new(&path),
    ));
    let service = RecommendService::new(reloader.clone());
    assert_eq!(songs(&service, &["A"]), vec!["B"]);

    std::fs::remove_file(&path).unwrap();
    assert!(matches!(
        reloader.maybe_reload(),
        Err(SnapshotError::Missing { .. })
    ));
    assert!(matches!(
        reloader.maybe_reload(),
        Err(SnapshotError::Rejected { .. })
    ));
    assert_eq!(songs(&service, &["A"]), vec!["B"]);
    assert_eq!(reloader.rebuild_count(), 1);
}

#[test]
fn readers_see_whole_models_during_swaps() {
    let version = Arc::new(ManualFreshness::new(1));
    let first = snapshot(vec![rule(&["A"], &["B"], 0.9, 1.0)]);
    let second = snapshot(vec![
        rule(&["A"], &["C"], 0.9, 1.0),
        rule(&["A"], &["D"], 0.8, 1.0),
    ]);
    let loader = ScriptedLoader::new(first.clone());
    let service = Arc::new(RecommendService::new(reloader(&version, &loader)));
    assert_eq!(songs(&service, &["A"]), vec!["B"]);

    let stop = Arc::new(AtomicBool::new(false));
    thread::scope(|scope| {
        for _ in 0..4 {
            let service = service.clone();
            let stop = stop.clone();
            scope.spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    let answer = songs(&service, &["A"]);
                    assert!(
                        answer == ["B"] || answer == ["C", "D"],
                        "torn answer {answer:?}"
                    );
                }
            });
        }

        for round in 0..50 {
            loader.set_snapshot(if round % 2 == 0 { second.clone() } else { first.clone() });
            version.bump();
            service.reloader().maybe_reload().unwrap();
        }
        stop.store(true, Ordering::Relaxed);
    });

    assert!(service.reloader().rebuild_count() >= 51);
}
