use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tilecity::{
    buildings::modules::DevelopmentState, citizen::Citizen, spatial::TileGrid, City, Coord,
    SimConfig,
};

fn city_with(config: SimConfig) -> City {
    City::new("zoning", TileGrid::new(8, 8), 21, config)
}

#[test]
fn new_home_fills_to_first_level_capacity() {
    let mut city = city_with(SimConfig::default());
    let home = Coord::new(2, 2);
    city.place_building(home, "residential").unwrap();

    let building = city.building(home).unwrap();
    assert_eq!(building.status().state, DevelopmentState::UnderConstruction);
    assert_eq!(building.status().level, 0);
    assert_eq!(building.population(), 0);

    for _ in 0..4 {
        city.step();
    }
    assert_eq!(city.building(home).unwrap().population(), 0);

    // Construction finishes on tick 5, then one citizen per tick until full.
    let mut counts = Vec::new();
    for _ in 0..3 {
        city.step();
        let building = city.building(home).unwrap();
        assert_eq!(building.status().state, DevelopmentState::Developed);
        assert_eq!(building.status().level, 1);
        assert_eq!(building.max_residents(), 2);
        counts.push(building.population());
    }
    assert_eq!(counts, vec![1, 2, 2]);
    assert_eq!(city.population(), 2);
}

#[test]
fn abandonment_evicts_all_residents() {
    let mut config = SimConfig::default();
    config.development.construction_ticks = 1;
    config.development.abandonment_ticks = 3;
    config.development.max_level.residential = 1;
    config.residents.base_capacity_per_level = 5;
    // Residential demand turns negative once five people live in town.
    config.demand.base_residential = 0.045;
    let mut city = city_with(config);
    let home = Coord::new(4, 4);
    city.place_building(home, "residential").unwrap();

    for _ in 0..7 {
        city.step();
    }
    let building = city.building(home).unwrap();
    assert_eq!(building.status().state, DevelopmentState::Developed);
    assert_eq!(building.population(), 5);

    city.step();
    let building = city.building(home).unwrap();
    assert_eq!(building.status().state, DevelopmentState::Abandoned);
    assert_eq!(building.population(), 0);
    let residents = building.residents().unwrap();
    assert_eq!(residents.evicted(), 5);
    assert_eq!(residents.admitted(), 5);
    assert_eq!(city.population(), 0);

    for _ in 0..10 {
        city.step();
    }
    let building = city.building(home).unwrap();
    assert_eq!(building.status().state, DevelopmentState::Abandoned);
    assert_eq!(building.population(), 0);
}

#[test]
fn removal_disposes_every_resident_first() {
    let mut config = SimConfig::default();
    config.development.construction_ticks = 1;
    config.development.max_level.residential = 1;
    config.residents.base_capacity_per_level = 3;
    let mut city = city_with(config);
    let home = Coord::new(1, 6);
    city.place_building(home, "residential").unwrap();
    for _ in 0..3 {
        city.step();
    }
    assert_eq!(city.building(home).unwrap().population(), 3);

    let removed = city.remove_building(home).unwrap().expect("building existed");
    let residents = removed.residents().unwrap();
    assert_eq!(residents.count(), 0);
    assert_eq!(residents.evicted(), 3);
    assert!(city.building(home).is_none());
    assert_eq!(city.population(), 0);
}

#[test]
fn jobs_raise_residential_demand() {
    let mut config = SimConfig::default();
    config.development.construction_ticks = 1;
    let mut city = city_with(config);
    city.place_building(Coord::new(0, 0), "industrial").unwrap();
    city.place_building(Coord::new(1, 0), "commercial").unwrap();
    let before = city.stats().demand.residential;

    city.step();
    let stats = city.stats();
    assert_eq!(stats.jobs, 8);
    assert_eq!(stats.industrial_jobs, 4);
    assert!(stats.demand.residential > before);
}

#[test]
fn commercial_zones_never_house_anyone() {
    let mut config = SimConfig::default();
    config.development.construction_ticks = 1;
    let mut city = city_with(config);
    let shop = Coord::new(5, 5);
    city.place_building(shop, "commercial").unwrap();
    for _ in 0..20 {
        city.step();
    }
    let building = city.building(shop).unwrap();
    assert!(building.residents().is_none());
    assert_eq!(building.population(), 0);
    assert_eq!(building.max_residents(), 0);
}

#[test]
fn same_tick_aggregates_are_not_visible_to_siblings() {
    let mut config = SimConfig::default();
    config.development.construction_ticks = 1;
    config.development.level_up_progress = 0.5;
    let mut a = city_with(config.clone());
    let mut b = city_with(config);

    // Identical homes; in `b` a neighbour that completes on the same tick
    // must not change what the first home sees until the next tick.
    a.place_building(Coord::new(3, 3), "residential").unwrap();
    b.place_building(Coord::new(3, 3), "residential").unwrap();
    b.place_building(Coord::new(0, 0), "industrial").unwrap();

    a.step();
    b.step();
    let first_a = a.building(Coord::new(3, 3)).unwrap().development().unwrap().progress();
    let first_b = b.building(Coord::new(3, 3)).unwrap().development().unwrap().progress();
    assert_eq!(first_a, first_b);

    a.step();
    b.step();
    let second_a = a.building(Coord::new(3, 3)).unwrap().development().unwrap().progress();
    let second_b = b.building(Coord::new(3, 3)).unwrap().development().unwrap().progress();
    assert!(second_b.progress > second_a.progress || second_b.level > second_a.level);
}

#[test]
fn external_placement_never_exceeds_capacity() {
    let mut config = SimConfig::default();
    config.development.construction_ticks = 1;
    let mut city = city_with(config);
    let home = Coord::new(2, 5);
    city.place_building(home, "residential").unwrap();
    city.step();

    let mut rng = ChaCha8Rng::seed_from_u64(77);
    let building = city.building_mut(home).unwrap();
    let mut refused = 0;
    for _ in 0..10 {
        let citizen = Citizen::generate(&mut rng, home, 1);
        if building.try_move_in(citizen).is_err() {
            refused += 1;
        }
    }
    assert_eq!(building.status().level, 1);
    assert_eq!(building.population(), 2);
    assert_eq!(refused, 9);

    for _ in 0..3 {
        city.step();
        let building = city.building(home).unwrap();
        assert!(building.population() <= building.max_residents());
    }
}

#[test]
fn tools_can_boost_construction_and_place_residents() {
    let mut city = city_with(SimConfig::default());
    let home = Coord::new(6, 1);
    city.place_building(home, "residential").unwrap();

    let construction_ticks = city.config().development.construction_ticks;
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let building = city.building_mut(home).unwrap();
    let development = building.development_mut().unwrap();
    assert_eq!(development.rules().construction_ticks, construction_ticks);
    development.add_progress(f64::from(construction_ticks - 1));

    let settler = Citizen::generate(&mut rng, home, 0);
    let settler_id = settler.id();
    assert!(building.try_move_in(settler).is_ok());
    assert_eq!(building.population(), 1);

    city.step();
    let building = city.building(home).unwrap();
    assert_eq!(building.status().state, DevelopmentState::Developed);
    assert_eq!(building.status().level, 1);
    assert_eq!(building.population(), 2);
    assert_eq!(building.residents().unwrap().residents()[0].id(), settler_id);
    assert_eq!(city.population(), 2);

    let commercial = Coord::new(7, 1);
    city.place_building(commercial, "commercial").unwrap();
    let stranger = Citizen::generate(&mut rng, commercial, 1);
    assert!(city.building_mut(commercial).unwrap().try_move_in(stranger).is_err());
}
