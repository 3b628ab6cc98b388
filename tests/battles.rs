use quackdom::model::{Task, TaskKind};
use quackdom::testutil::{run_single_tick, test_catalogs};

mod common;

#[test]
fn wiping_the_defense_transfers_the_land() {
    let catalogs = test_catalogs();
    let mut world = common::skirmish_world();
    world.config.max_casualties_attackers = 1.0;
    world.config.max_casualties_defenders = 1.0;
    world.config.task_queue.push(
        Task::new(1, TaskKind::Attack, "Archer", 1)
            .with_amount(20)
            .with_target(2),
    );

    let notices = run_single_tick(&mut world, &catalogs, 11);

    // Twenty archers against ten footmen behind no walls: the garrison
    // falls, and the land changes hands.
    let land = world.land(2).unwrap();
    assert_eq!(land.owner_id, 1);
    assert!(world.user(1).unwrap().land_ids.contains(&2));
    assert!(!world.user(2).unwrap().land_ids.contains(&2));
    assert!(land.siege_camp.is_empty(), "camp moved into the garrison");
    assert!(world.ownership_consistent());
    assert!(
        notices
            .iter()
            .any(|n| n.user_id == 2 && n.text.contains("Battle Report")),
        "the loser hears about it too"
    );
}

#[test]
fn ownership_never_moves_while_defenders_stand() {
    let catalogs = test_catalogs();
    let mut world = common::skirmish_world();
    // Two archers roll at most six dice a round; ten footmen carry DEF 10
    // and an HP pool of 50, so a defender casualty is arithmetically
    // impossible and the attack must burn out against the wall.
    world.config.task_queue.push(
        Task::new(1, TaskKind::Attack, "Archer", 1)
            .with_amount(2)
            .with_target(2),
    );

    run_single_tick(&mut world, &catalogs, 11);

    let land = world.land(2).unwrap();
    assert_eq!(land.owner_id, 2, "defenders held");
    assert_eq!(land.garrison.total(), 10, "not a single casualty");
    assert!(world.ownership_consistent());
}

#[test]
fn attack_casualties_land_on_the_remote_source_garrison() {
    let catalogs = test_catalogs();
    let mut world = common::skirmish_world();
    // Footmen behind a palisade grind the archers down.
    world.land_mut(2).unwrap().buildings.push("Palisade".to_string());
    world.land_mut(2).unwrap().garrison.add("Footman", 2, 30);
    world.config.max_casualties_attackers = 0.5;
    world.config.max_casualties_defenders = 1.0;
    world.config.task_queue.push(
        Task::new(1, TaskKind::Attack, "Archer", 1)
            .with_amount(20)
            .with_target(2),
    );

    run_single_tick(&mut world, &catalogs, 5);

    let remaining = world
        .land(1)
        .unwrap()
        .garrison
        .get("Archer", 1)
        .map_or(0, |u| u.amount);
    assert!(
        remaining < 20,
        "losses come off the garrison the attack was launched from"
    );
}

#[test]
fn sallying_out_bleeds_the_siege_camp() {
    let catalogs = test_catalogs();
    let mut world = common::skirmish_world();
    world.land_mut(1).unwrap().siege_camp.add("Footman", 2, 10);
    world.config.task_queue.push(
        Task::new(1, TaskKind::SallyOut, "Archer", 1)
            .with_amount(15)
            .with_target(1),
    );

    run_single_tick(&mut world, &catalogs, 21);

    let land = world.land(1).unwrap();
    assert!(land.siege_camp.total() < 10, "the camp took casualties");
    assert_eq!(land.owner_id, 1, "sallies never move ownership");
    assert!(world.config.task_queue.is_empty());
}

#[test]
fn safety_period_blocks_battle_tasks_in_phase() {
    let catalogs = test_catalogs();
    let mut world = common::skirmish_world();
    world.user_mut(2).unwrap().safety_count = 5;
    world.config.task_queue.push(
        Task::new(1, TaskKind::Attack, "Archer", 1)
            .with_amount(10)
            .with_target(2),
    );

    let notices = run_single_tick(&mut world, &catalogs, 1);

    assert_eq!(world.land(2).unwrap().garrison.total(), 10, "untouched");
    assert!(
        notices
            .iter()
            .any(|n| n.user_id == 1 && n.text.contains("safety period"))
    );
}
