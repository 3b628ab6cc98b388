use quackdom::model::TaskKind;
use quackdom::notify::BufferNotifier;
use quackdom::testutil::{add_user, test_world};
use quackdom::{CommandError, command};

mod common;

#[test]
fn a_submitted_attack_resolves_on_the_next_tick() {
    let notifier = BufferNotifier::new();
    let mut engine = common::engine_for(common::skirmish_world(), &notifier);

    let ack = engine
        .submit_command(
            command(TaskKind::Attack, 1, "Archer", 1)
                .with_target(2)
                .with_amount(20),
        )
        .unwrap();
    assert!(ack.contains("sent to attack Bulwark"));
    assert_eq!(engine.peek_queue().unwrap().len(), 1);

    engine.run_tick().unwrap();

    assert!(engine.peek_queue().unwrap().is_empty());
    let world = engine.store().snapshot();
    assert!(
        world.land(2).unwrap().garrison.total() < 10,
        "twenty archers against ten unwalled footmen always draw blood"
    );
    assert!(
        notifier
            .messages_for(1)
            .iter()
            .any(|m| m.contains("Battle Report"))
    );
    assert_eq!(notifier.broadcasts().len(), 1, "one new-day broadcast");
}

#[test]
fn illegal_submissions_never_reach_the_queue() {
    let notifier = BufferNotifier::new();
    let mut engine = common::engine_for(common::skirmish_world(), &notifier);

    let err = engine
        .submit_command(
            command(TaskKind::Siege, 1, "Archer", 1)
                .with_target(1)
                .with_amount(5),
        )
        .unwrap_err();
    assert!(matches!(err, CommandError::Rejected(ref text) if text.contains("yourself")));

    let err = engine
        .submit_command(
            command(TaskKind::Attack, 1, "Archer", 1)
                .with_target(2)
                .with_amount(0),
        )
        .unwrap_err();
    assert!(matches!(err, CommandError::Rejected(ref text) if text == "Nice try."));

    assert!(engine.peek_queue().unwrap().is_empty());
}

#[test]
fn quacking_builds_streaks_and_pays_rewards() {
    let notifier = BufferNotifier::new();
    let mut world = test_world();
    world.config.max_quack_streak_length = 3;
    world.config.quack_streak_reward = 10;
    let mut engine = common::engine_for(world, &notifier);

    let first = engine.record_quack(99).unwrap();
    assert!(first.contains("first time"));

    let again = engine.record_quack(99).unwrap();
    assert!(again.contains("sore"));
    assert_eq!(engine.store().snapshot().user(99).unwrap().quacks, 1);

    // Two more days of quacking completes the streak of three.
    for _ in 0..2 {
        engine.run_tick().unwrap();
        engine.record_quack(99).unwrap();
    }
    let user = engine.store().snapshot().user(99).unwrap().clone();
    assert_eq!(user.quacks, 3 + 10, "streak reward landed");
    assert_eq!(user.quack_streak, 0, "streak counter wrapped");
}

#[test]
fn the_exchange_turns_quacks_into_quackerinos() {
    let notifier = BufferNotifier::new();
    let mut world = test_world();
    world.config.qq_exchange_rate = 10;
    add_user(&mut world, 1, 0);
    world.user_mut(1).unwrap().quacks = 5;
    let mut engine = common::engine_for(world, &notifier);

    let message = engine.buy_quackerinos(1, 3).unwrap();
    assert!(message.contains("30 quackerinos"));
    let user = engine.store().snapshot().user(1).unwrap().clone();
    assert_eq!(user.quackerinos, 30);
    assert_eq!(user.spent_quacks, 3);

    let err = engine.buy_quackerinos(1, 3).unwrap_err();
    assert!(matches!(err, CommandError::Rejected(ref text) if text.contains("enough quacks")));
}

#[test]
fn payments_move_quackerinos_between_players() {
    let notifier = BufferNotifier::new();
    let mut world = test_world();
    add_user(&mut world, 1, 100);
    add_user(&mut world, 2, 0);
    let mut engine = common::engine_for(world, &notifier);

    engine.transfer_quackerinos(1, 2, 40).unwrap();
    let world = engine.store().snapshot();
    assert_eq!(world.user(1).unwrap().quackerinos, 60);
    assert_eq!(world.user(2).unwrap().quackerinos, 40);

    assert!(engine.transfer_quackerinos(1, 1, 10).is_err());
    assert!(engine.transfer_quackerinos(1, 2, 0).is_err());
    assert!(engine.transfer_quackerinos(1, 2, 1_000).is_err());
}

#[test]
fn homelands_are_founded_once_and_open_a_safety_period() {
    let notifier = BufferNotifier::new();
    let mut world = common::skirmish_world();
    world.config.safety_period_days = 14;
    add_user(&mut world, 3, 0);
    let mut engine = common::engine_for(world, &notifier);

    let message = engine.establish_homeland(3, "Newpond", "duck").unwrap();
    assert!(message.contains("Newpond"));
    let world = engine.store().snapshot();
    let user = world.user(3).unwrap();
    let homeland = user.homeland_id.unwrap();
    assert!(user.land_ids.contains(&homeland));
    assert_eq!(user.safety_count, 14);
    assert_eq!(world.land(homeland).unwrap().species, "duck");
    assert!(world.ownership_consistent());

    assert!(engine.establish_homeland(3, "Second", "duck").is_err());
    assert!(engine.establish_homeland(1, "Elsewhere", "kraken").is_err());

    // The grace period shields the newcomer from submission-time hostility.
    let err = engine
        .submit_command(
            command(TaskKind::Attack, 1, "Archer", 1)
                .with_target(homeland)
                .with_amount(5),
        )
        .unwrap_err();
    assert!(matches!(err, CommandError::Rejected(ref text) if text.contains("safety period")));
}

#[test]
fn demolition_refunds_and_steps_down_the_chain() {
    let notifier = BufferNotifier::new();
    let mut world = common::skirmish_world();
    world.land_mut(1).unwrap().buildings.push("Keep".to_string());
    let mut engine = common::engine_for(world, &notifier);

    let message = engine.demolish(1, 1, "Keep").unwrap();
    assert!(message.contains("demolished into a Palisade"));
    let world = engine.store().snapshot();
    assert_eq!(world.land(1).unwrap().buildings, vec!["Palisade".to_string()]);
    // Keep costs 400 at 50% refund.
    assert_eq!(world.user(1).unwrap().quackerinos, 1_000 + 200);

    assert!(engine.demolish(1, 1, "Keep").is_err(), "already gone");
    assert!(engine.demolish(2, 1, "Palisade").is_err(), "not the owner");
}

#[test]
fn disbanding_returns_part_of_the_hire_cost() {
    let notifier = BufferNotifier::new();
    let mut engine = common::engine_for(common::skirmish_world(), &notifier);

    let message = engine.disband(1, 1, "Archer", 4).unwrap();
    assert!(message.contains("4 Archers were disbanded"));
    let world = engine.store().snapshot();
    assert_eq!(world.land(1).unwrap().garrison.total(), 16);
    // Tier-1 cost 10 at 50% refund, four troops.
    assert_eq!(world.user(1).unwrap().quackerinos, 1_000 + 20);

    assert!(engine.disband(1, 1, "Archer", 100).is_err());
}

#[test]
fn oaths_bind_courts_and_shield_them_from_each_other() {
    let notifier = BufferNotifier::new();
    let mut engine = common::engine_for(common::skirmish_world(), &notifier);

    engine.swear_fealty(2, 1).unwrap();
    assert!(
        engine
            .submit_command(
                command(TaskKind::Attack, 2, "Footman", 2)
                    .with_target(1)
                    .with_amount(5)
            )
            .is_ok(),
        "an offered oath does not bind yet"
    );
    engine.run_tick().unwrap();

    engine.accept_vassal(1, 2).unwrap();
    let err = engine
        .submit_command(
            command(TaskKind::Attack, 2, "Footman", 2)
                .with_target(1)
                .with_amount(2),
        )
        .unwrap_err();
    assert!(matches!(err, CommandError::Rejected(ref text) if text.contains("liege")));

    // The other direction: the liege has no liege, so no court immunity.
    assert!(
        engine
            .submit_command(
                command(TaskKind::Attack, 1, "Archer", 1)
                    .with_target(2)
                    .with_amount(5)
            )
            .is_ok()
    );
}

#[test]
fn circular_oaths_are_refused_at_acceptance() {
    let notifier = BufferNotifier::new();
    let mut engine = common::engine_for(common::skirmish_world(), &notifier);

    engine.swear_fealty(2, 1).unwrap();
    engine.accept_vassal(1, 2).unwrap();

    // 1 now tries to swear to their own vassal.
    engine.swear_fealty(1, 2).unwrap();
    let err = engine.accept_vassal(2, 1).unwrap_err();
    assert!(matches!(err, CommandError::Rejected(ref text) if text.contains("circular")));
    assert_eq!(engine.store().snapshot().user(1).unwrap().liege_id, None);
}

#[test]
fn oathbreakers_lose_troops_to_desertion() {
    let notifier = BufferNotifier::new();
    let mut world = common::skirmish_world();
    world.user_mut(2).unwrap().liege_id = Some(1);
    let mut engine = {
        use quackdom::store::MemStore;
        use quackdom::Engine;
        let mut catalogs = quackdom::testutil::test_catalogs();
        catalogs
            .species
            .get_mut("duck")
            .unwrap()
            .all_season
            .percent_deserts_on_oathbreaker = Some(0.5);
        Engine::new(MemStore::new(world, catalogs), &notifier, 7)
    };

    let message = engine.break_oath(2).unwrap();
    assert!(message.contains("5 of your troops deserted"));
    let world = engine.store().snapshot();
    assert_eq!(world.user(2).unwrap().liege_id, None);
    assert_eq!(world.land(2).unwrap().garrison.total(), 5);
}

#[test]
fn support_banks_today_and_pays_tomorrow() {
    let notifier = BufferNotifier::new();
    let mut engine = common::engine_for(common::skirmish_world(), &notifier);

    engine.support(2, 1).unwrap();
    assert!(engine.support(2, 1).is_err(), "one support per day");

    engine.run_tick().unwrap();
    let world = engine.store().snapshot();
    // Base income 7 plus one support point; then 20 archers' upkeep.
    assert_eq!(world.user(1).unwrap().quackerinos, 1_000 + 7 + 1 - 20);
    assert_eq!(world.user(1).unwrap().support, 0);
}

#[test]
fn leaderboard_orders_by_quacks() {
    let notifier = BufferNotifier::new();
    let mut world = test_world();
    for (id, quacks) in [(1, 5), (2, 50), (3, 20)] {
        add_user(&mut world, id, 0);
        world.user_mut(id).unwrap().quacks = quacks;
    }
    let engine = common::engine_for(world, &notifier);
    let board = engine.leaderboard(2).unwrap();
    assert_eq!(board, vec![(2, 50), (3, 20)]);
}
