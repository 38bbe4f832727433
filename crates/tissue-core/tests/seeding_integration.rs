//! Integration tests: setup from a layout file through the step schedule.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::fs;
use uuid::Uuid;

use tissue_core::events::EventLogger;
use tissue_core::output::{generate_snapshot, SnapshotGenerator};
use tissue_core::setup::{MalformedPolicy, ENVELOP_TYPE};
use tissue_core::systems::{
    scale_proliferation_by_oncoprotein, switch_cell_types, PendingSwitches,
};
use tissue_core::{
    setup_tissue, AgentRuntime, CellTypeId, EcsRuntime, Phenotype, SeedError, SimClock,
    TissueConfig,
};
use tissue_events::{Event, EventType};

const LAYOUT: &str = "\
0 0 0 0
16 0 0 0
-16 0 0 0
0 16 0 1
0 -16 0 1
";

fn config_with_layout(dir: &std::path::Path, rows: &str) -> TissueConfig {
    let path = dir.join("cells.dat");
    fs::write(&path, rows).unwrap();
    let mut config = TissueConfig::default();
    config.layout.cell_file = path;
    config.output.directory = dir.join("output");
    config
}

fn build_world(config: &TissueConfig) -> (World, Schedule) {
    let mut runtime = EcsRuntime::new(config.simulation.dt);
    let setup = setup_tissue(config, &mut runtime, &mut SmallRng::seed_from_u64(1)).unwrap();

    let mut world = runtime.into_world();
    world.insert_resource(setup.registry);
    world.insert_resource(setup.indices);
    world.insert_resource(PendingSwitches::new());
    world.insert_resource(SnapshotGenerator::new(Uuid::nil(), 0));
    world.insert_resource(setup.switch_rule.unwrap());

    let mut schedule = Schedule::default();
    schedule.add_systems((switch_cell_types, scale_proliferation_by_oncoprotein).chain());
    (world, schedule)
}

#[test]
fn test_embedded_cells_switch_once_at_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_layout(dir.path(), LAYOUT);
    let (mut world, mut schedule) = build_world(&config);

    let mut switched = Vec::new();
    for step in 1190..=1210u64 {
        world.resource_mut::<SimClock>().set_step(step);
        schedule.run(&mut world);
        switched.extend(world.resource_mut::<PendingSwitches>().drain());
    }

    assert_eq!(switched.len(), 3, "every embedded cell switches exactly once");
    assert!(switched.iter().all(|s| s.time >= 120.0 && s.time < 120.1));

    let mut types = world.query::<&CellTypeId>();
    assert!(types.iter(&world).all(|t| *t == ENVELOP_TYPE));

    // Converted cells take the enveloping phenotype: no proliferation
    let mut phenotypes = world.query::<&Phenotype>();
    assert!(phenotypes
        .iter(&world)
        .all(|p| p.cycle.transition_rate == 0.0));
}

#[test]
fn test_snapshot_after_switch_uses_envelop_colors() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_layout(dir.path(), LAYOUT);
    let (mut world, mut schedule) = build_world(&config);

    let before = generate_snapshot(&mut world, "simulation_start");
    assert_eq!(before.count_of_type(0), 3);
    assert!(before.cells.iter().filter(|c| c.type_id == 0).all(|c| c.colors.fill == "cyan"));

    world.resource_mut::<SimClock>().set_step(1200);
    schedule.run(&mut world);

    let after = generate_snapshot(&mut world, "periodic");
    assert_eq!(after.count_of_type(1), 5);
    assert!(after.cells.iter().all(|c| c.colors.fill == "red"));
    assert_eq!(after.cells.iter().filter(|c| c.switched).count(), 3);
}

#[test]
fn test_truncated_layout_seeds_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_layout(dir.path(), "0 0 0 0\n1 1 0 1\nnot a row\n5 5 0 0\n");

    let mut runtime = EcsRuntime::new(config.simulation.dt);
    let setup = setup_tissue(&config, &mut runtime, &mut SmallRng::seed_from_u64(1)).unwrap();

    assert_eq!(setup.report.cells_created, 2);
    assert_eq!(runtime.agent_count(), 2);
    assert_eq!(setup.report.truncated_at.unwrap().line, 3);
}

#[test]
fn test_rejecting_policy_leaves_runtime_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_with_layout(dir.path(), "0 0 0 0\n1 1 0 1\nnot a row\n");
    config.layout.on_malformed = MalformedPolicy::Reject;

    let mut runtime = EcsRuntime::new(config.simulation.dt);
    let result = setup_tissue(&config, &mut runtime, &mut SmallRng::seed_from_u64(1));

    assert!(matches!(result, Err(SeedError::MalformedRecord { line: 3, .. })));
    assert_eq!(runtime.agent_count(), 0);
}

#[test]
fn test_unknown_tag_leaves_runtime_empty() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_layout(dir.path(), "0 0 0 0\n1 1 0 4\n");

    let mut runtime = EcsRuntime::new(config.simulation.dt);
    let result = setup_tissue(&config, &mut runtime, &mut SmallRng::seed_from_u64(1));

    assert!(matches!(result, Err(SeedError::TypeResolution { tag: 4, record: 1 })));
    assert_eq!(runtime.agent_count(), 0);
}

#[test]
fn test_event_log_records_seeding_and_switches() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_with_layout(dir.path(), LAYOUT);
    let path = dir.path().join("events.jsonl");

    let mut runtime = EcsRuntime::new(config.simulation.dt);
    let setup = setup_tissue(&config, &mut runtime, &mut SmallRng::seed_from_u64(1)).unwrap();
    {
        let mut logger = EventLogger::new(&path, Uuid::nil()).unwrap();
        logger.log_seeding(0.0, &setup.report).unwrap();

        let mut world = runtime.into_world();
        world.insert_resource(PendingSwitches::new());
        world.insert_resource(setup.switch_rule.unwrap());
        let mut schedule = Schedule::default();
        schedule.add_systems(switch_cell_types);

        world.resource_mut::<SimClock>().set_step(1200);
        schedule.run(&mut world);
        let switches = world.resource_mut::<PendingSwitches>().drain();
        logger.log_switches(&switches).unwrap();
    }

    let events: Vec<Event> = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].event_type, EventType::SeedingCompleted);
    assert!(events[1..]
        .iter()
        .all(|e| e.event_type == EventType::CellTypeSwitched));
}
