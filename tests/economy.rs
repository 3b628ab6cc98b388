use quackdom::model::QuackRank;
use quackdom::testutil::{add_land, add_user, run_single_tick, test_catalogs, test_world};

#[test]
fn income_is_quality_plus_seasonal_bonus() {
    let catalogs = test_catalogs();
    let mut world = test_world();
    add_user(&mut world, 1, 0);
    add_land(&mut world, 1, 1, "Askeep");
    // quality 5, duck bonus 0.5: 5 + floor(2.5) = 7.
    run_single_tick(&mut world, &catalogs, 1);
    assert_eq!(world.user(1).unwrap().quackerinos, 7);
}

#[test]
fn support_pays_out_and_resets() {
    let catalogs = test_catalogs();
    let mut world = test_world();
    add_user(&mut world, 1, 0);
    add_user(&mut world, 2, 0);
    add_land(&mut world, 1, 1, "Askeep");
    world.user_mut(1).unwrap().support = 3;
    world.user_mut(2).unwrap().supportee_id = Some(1);

    run_single_tick(&mut world, &catalogs, 1);

    // 7 base + 3 support points × 1 bonus.
    assert_eq!(world.user(1).unwrap().quackerinos, 10);
    assert_eq!(world.user(1).unwrap().support, 0);
    assert_eq!(world.user(2).unwrap().supportee_id, None);
}

#[test]
fn holding_past_the_land_limit_taxes_income() {
    let catalogs = test_catalogs();
    let mut world = test_world();
    add_user(&mut world, 1, 0);
    for id in 1..=4 {
        add_land(&mut world, id, 1, "Holding");
    }
    // limit 3, one land over: each land pays 7 − trunc(7 × 0.25 × 1) = 6.
    run_single_tick(&mut world, &catalogs, 1);
    assert_eq!(world.user(1).unwrap().quackerinos, 24);
}

#[test]
fn encircled_lands_earn_less_when_the_species_minds() {
    let mut catalogs = test_catalogs();
    catalogs
        .species
        .get_mut("duck")
        .unwrap()
        .all_season
        .income_penalty_percent_in_siege = Some(0.5);
    let mut world = test_world();
    add_user(&mut world, 1, 0);
    add_user(&mut world, 2, 1_000);
    add_land(&mut world, 1, 1, "Askeep");
    world.land_mut(1).unwrap().siege_camp.add("Footman", 2, 5);

    run_single_tick(&mut world, &catalogs, 1);

    // Empty garrison, five besiegers: surrounded. 7 − trunc(3.5) = 4.
    assert_eq!(world.user(1).unwrap().quackerinos, 4);
}

#[test]
fn unpayable_units_disband_whole() {
    let catalogs = test_catalogs();
    let mut world = test_world();
    add_user(&mut world, 1, 5);
    add_land(&mut world, 1, 1, "Askeep");
    world.land_mut(1).unwrap().quality = 0;
    world.land_mut(1).unwrap().garrison.add("Footman", 1, 10);

    let notices = run_single_tick(&mut world, &catalogs, 1);

    // Ten footmen want 10 qq; the treasury holds 5. No partial pay: the
    // whole company walks.
    assert!(world.land(1).unwrap().garrison.is_empty());
    assert_eq!(world.user(1).unwrap().quackerinos, 5);
    assert!(
        notices
            .iter()
            .any(|n| n.user_id == 1 && n.text.contains("disbanded"))
    );
}

#[test]
fn affordable_units_are_paid_for() {
    let catalogs = test_catalogs();
    let mut world = test_world();
    add_user(&mut world, 1, 100);
    add_land(&mut world, 1, 1, "Askeep");
    world.land_mut(1).unwrap().quality = 0;
    world.land_mut(1).unwrap().garrison.add("Footman", 1, 10);

    run_single_tick(&mut world, &catalogs, 1);

    assert_eq!(world.land(1).unwrap().garrison.total(), 10);
    assert_eq!(world.user(1).unwrap().quackerinos, 90);
}

#[test]
fn liege_tax_is_capped_by_the_vassal_purse() {
    let catalogs = test_catalogs();
    let mut world = test_world();
    add_user(&mut world, 1, 0);
    add_user(&mut world, 2, 0);
    add_land(&mut world, 1, 2, "Vassalholm");
    world.user_mut(2).unwrap().liege_id = Some(1);
    world.user_mut(1).unwrap().tax_per_vassal_land = 100;

    run_single_tick(&mut world, &catalogs, 1);

    // The vassal earned 7 this day; the 100-per-land levy takes all of it
    // and no more.
    assert_eq!(world.user(2).unwrap().quackerinos, 0);
    assert_eq!(world.user(1).unwrap().quackerinos, 7);
}

#[test]
fn ranks_follow_the_configured_thresholds() {
    let catalogs = test_catalogs();
    let mut world = test_world();
    world.config.quack_ranks = vec![
        QuackRank {
            name: "duckling".to_string(),
            quacks_required: 0,
        },
        QuackRank {
            name: "drake".to_string(),
            quacks_required: 50,
        },
    ];
    add_user(&mut world, 1, 0);
    world.user_mut(1).unwrap().quacks = 60;

    run_single_tick(&mut world, &catalogs, 1);

    assert_eq!(world.user(1).unwrap().quack_rank, "drake");
}

#[test]
fn an_empty_tick_only_moves_the_calendar() {
    let catalogs = test_catalogs();
    let mut world = test_world();
    let before = world.clone();

    let notices = run_single_tick(&mut world, &catalogs, 1);

    assert!(notices.is_empty());
    let mut expected = before;
    expected.config.day_counter = world.config.day_counter;
    expected.config.current_season = world.config.current_season;
    expected.config.qq_exchange_rate = world.config.qq_exchange_rate;
    assert_eq!(world, expected);
    assert_eq!(world.config.day_counter, 1);
}
