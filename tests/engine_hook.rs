use tilecity::{
    engine::{Command, EngineBuilder, EngineSettings},
    scenario::ScenarioLoader,
    Coord,
};
use tempfile::tempdir;

fn loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn engine_runs_hook_each_tick() {
    let scenario = loader()
        .load("scenarios/starter_town.yaml")
        .expect("scenario should load");
    let city = scenario.build_city().expect("placements valid");
    let temp = tempdir().expect("tempdir");
    let settings = EngineSettings {
        snapshot_interval_ticks: 0,
        snapshot_dir: temp.path().to_path_buf(),
    };
    let mut engine = EngineBuilder::new(settings).build(city);

    let mut ticks = Vec::new();
    let mut dates = Vec::new();
    engine.run_with_hook(6, |summary| {
        ticks.push(summary.tick);
        dates.push(summary.date);
    });

    assert_eq!(ticks, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(dates.first().map(ToString::to_string), Some("2023-01-02".into()));
    assert_eq!(dates.last().map(ToString::to_string), Some("2023-01-07".into()));
    assert!(std::fs::read_dir(temp.path()).unwrap().next().is_none());
}

#[test]
fn snapshots_written_on_interval() {
    let scenario = loader().load("scenarios/starter_town.yaml").unwrap();
    let temp = tempdir().unwrap();
    let settings = EngineSettings {
        snapshot_interval_ticks: 5,
        snapshot_dir: temp.path().to_path_buf(),
    };
    let mut engine = EngineBuilder::new(settings).build(scenario.build_city().unwrap());

    let mut written = Vec::new();
    engine.run_with_hook(12, |summary| {
        assert!(summary.snapshot_error.is_none());
        if let Some(path) = &summary.snapshot_path {
            written.push((summary.tick, path.clone()));
        }
    });

    let ticks: Vec<u64> = written.iter().map(|(tick, _)| *tick).collect();
    assert_eq!(ticks, vec![5, 10]);
    for (_, path) in &written {
        assert!(path.starts_with(temp.path().join("starter_town")));
        let data = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(value["name"], "starter_town");
        assert_eq!(value["buildings"].as_array().map(Vec::len), Some(8));
    }
}

#[test]
fn queued_commands_apply_between_ticks() {
    let scenario = loader().load("scenarios/starter_town.yaml").unwrap();
    let mut engine =
        EngineBuilder::new(EngineSettings::default()).build(scenario.build_city().unwrap());
    engine.run(10);
    let before = engine.city().population();
    assert!(before > 0);

    let home = Coord::new(6, 6);
    engine.queue(Command::Remove { coord: home });
    engine.queue(Command::Place {
        coord: Coord::new(0, 0),
        building: "residential".into(),
    });
    assert!(engine.city().building(home).is_some());

    let summary = engine.step();
    assert_eq!(summary.command_results.len(), 2);
    assert!(summary.command_results.iter().all(|outcome| outcome.result.is_ok()));
    assert!(engine.city().building(home).is_none());
    assert_eq!(engine.city().building_count(), 8);
    assert_eq!(engine.into_city().tick(), 11);
}
