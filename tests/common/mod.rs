#![allow(dead_code)] // each test binary uses its own slice of these helpers

use quackdom::model::World;
use quackdom::notify::BufferNotifier;
use quackdom::store::MemStore;
use quackdom::testutil::{add_land, add_user, test_catalogs, test_world};
use quackdom::Engine;

/// Two players, one land each, garrisons stocked, money in the bank.
pub fn skirmish_world() -> World {
    let mut world = test_world();
    add_user(&mut world, 1, 1_000);
    add_user(&mut world, 2, 1_000);
    add_land(&mut world, 1, 1, "Askeep");
    add_land(&mut world, 2, 2, "Bulwark");
    world
        .land_mut(1)
        .unwrap()
        .garrison
        .add("Archer", 1, 20);
    world
        .land_mut(2)
        .unwrap()
        .garrison
        .add("Footman", 2, 10);
    world
}

pub fn engine_for(world: World, notifier: &BufferNotifier) -> Engine<MemStore, &BufferNotifier> {
    Engine::new(MemStore::new(world, test_catalogs()), notifier, 7)
}
