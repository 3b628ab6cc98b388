use std::fs::File;

use quackdom::model::{Task, TaskKind};
use quackdom::store::{JsonStore, WorldStore};
use quackdom::testutil::test_catalogs;

mod common;

#[test]
fn the_world_survives_a_save_load_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());

    let mut world = common::skirmish_world();
    world.config.task_queue.push(
        Task::new(1, TaskKind::Build, "Palisade", 1).with_time(3),
    );
    world.config.day_counter = 41;

    store.save_users(&world.users).unwrap();
    store.save_lands(&world.lands).unwrap();
    store.save_global_config(&world.config).unwrap();

    assert_eq!(store.load_users().unwrap(), world.users);
    assert_eq!(store.load_lands().unwrap(), world.lands);
    assert_eq!(store.load_global_config().unwrap(), world.config);
}

#[test]
fn an_unwritten_store_reads_as_an_empty_world() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());

    assert!(store.load_users().unwrap().is_empty());
    assert!(store.load_lands().unwrap().is_empty());
    let config = store.load_global_config().unwrap();
    assert_eq!(config.day_counter, 0);
    assert!(config.task_queue.is_empty());
}

#[test]
fn catalogs_load_from_their_three_documents() {
    let dir = tempfile::tempdir().unwrap();
    let catalogs = test_catalogs();
    serde_json::to_writer(
        File::create(dir.path().join("troops.json")).unwrap(),
        &catalogs.troops,
    )
    .unwrap();
    serde_json::to_writer(
        File::create(dir.path().join("buildings.json")).unwrap(),
        &catalogs.buildings,
    )
    .unwrap();
    serde_json::to_writer(
        File::create(dir.path().join("species.json")).unwrap(),
        &catalogs.species,
    )
    .unwrap();

    let store = JsonStore::new(dir.path());
    assert_eq!(store.load_catalogs().unwrap(), catalogs);
}

#[test]
fn malformed_documents_are_reported_not_swallowed() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("users.json"), b"{not json").unwrap();
    let store = JsonStore::new(dir.path());
    let err = store.load_users().unwrap_err();
    assert!(err.to_string().contains("users"));
}

#[test]
fn saves_replace_rather_than_append() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());
    let mut world = common::skirmish_world();

    store.save_users(&world.users).unwrap();
    world.users.remove(&2);
    store.save_users(&world.users).unwrap();

    let loaded = store.load_users().unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded.contains_key(&1));
}
