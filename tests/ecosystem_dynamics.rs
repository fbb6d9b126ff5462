use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use telluria_core::ecosystem::behavior::{herbivore_tree, Node, Status};
use telluria_core::ecosystem::disease::{DiseaseParams, DiseaseSystem, SpeciesPool};
use telluria_core::ecosystem::goap::{plan, state_of, GoapAction, WorldState};
use telluria_core::ecosystem::island::{apply_island_rule, isolation_modifier};
use telluria_core::ecosystem::needs::{update_needs, NeedRates};
use telluria_core::ecosystem::Ecosystem;
use telluria_data::{Diet, LivingEntity, Position, Region, SpeciesTraits};
use uuid::Uuid;

#[test]
fn needs_stay_bounded_over_a_long_life() {
    let mut entity = LivingEntity::new("elk", Uuid::new_v4(), Position::default());
    let rates = NeedRates::default();
    for _ in 0..100_000 {
        update_needs(&mut entity, &rates);
        let needs = &entity.needs;
        for value in [
            needs.hunger(),
            needs.thirst(),
            needs.energy(),
            needs.reproduction_urge(),
        ] {
            assert!((0.0..=100.0).contains(&value));
        }
    }
}

#[test]
fn herbivores_prioritise_eating_over_sleeping() {
    let tree = herbivore_tree();
    let mut entity = LivingEntity::new("elk", Uuid::new_v4(), Position::default());
    entity.needs.set_hunger(90.0);
    entity.needs.set_energy(5.0);
    assert_eq!(tree.tick(&mut entity), Status::Success);
    // Food first: hunger fell, energy was not restored by sleep.
    assert!(entity.needs.hunger() < 90.0);
    assert!(entity.needs.energy() < 10.0);
}

#[test]
fn goap_plans_hunt_before_feast() {
    let actions = vec![
        GoapAction::new(
            "track-prey",
            3.0,
            WorldState::new(),
            state_of([("prey_located", true.into())]),
        ),
        GoapAction::new(
            "hunt",
            5.0,
            state_of([("prey_located", true.into())]),
            state_of([("has_meat", true.into())]),
        ),
        GoapAction::new(
            "feast",
            1.0,
            state_of([("has_meat", true.into())]),
            state_of([("fed", true.into())]),
        ),
    ];
    let start = WorldState::new();
    let goal = state_of([("fed", true.into())]);
    let sequence = plan(&start, &goal, &actions);
    let names: Vec<&str> = sequence.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["track-prey", "hunt", "feast"]);
}

#[test]
fn outbreak_lifecycle_runs_to_the_archive() {
    let mut system = DiseaseSystem::new(DiseaseParams {
        spontaneous_base: 1.0,
        ..DiseaseParams::default()
    });
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let pool = SpeciesPool {
        species: "hare".into(),
        population: 5_000,
        density: 0.5,
        diet: Diet::Herbivore,
        biome: None,
    };
    let outbreak = system.try_spontaneous_outbreak(&pool, 0, &mut rng);
    assert!(outbreak.is_some());
    assert_eq!(system.pathogens.len(), 1);

    let pools = [pool];
    let mut year = 0;
    while !system.outbreaks.is_empty() && year < 2_000 {
        year += 1;
        system.tick_outbreaks(year, &pools);
    }
    assert!(system.outbreaks.is_empty(), "outbreak never burned out");
    assert_eq!(system.archive.len(), 1);
    let archived = &system.archive[0];
    assert!(archived.total_infected >= 1);
    assert!(archived.end_year.is_some());
}

#[test]
fn zoonotic_jump_reaches_a_second_species() {
    let mut system = DiseaseSystem::new(DiseaseParams {
        spontaneous_base: 1.0,
        zoonotic_base: 1.0,
        ..DiseaseParams::default()
    });
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let hares = SpeciesPool {
        species: "hare".into(),
        population: 50_000,
        density: 0.9,
        diet: Diet::Herbivore,
        biome: None,
    };
    let wolves = SpeciesPool {
        species: "wolf".into(),
        population: 3_000,
        density: 0.2,
        diet: Diet::Carnivore,
        biome: None,
    };
    system.try_spontaneous_outbreak(&hares, 0, &mut rng).unwrap();
    let pathogen_id = system.pathogens[0].id;
    // Drive specificity to zero so the jump roll is pure contact.
    system.pathogens[0].host_specificity = 0.0;

    let mut jumped = None;
    for _ in 0..200 {
        jumped = system
            .try_zoonotic_jump(pathogen_id, &hares, &wolves, 1.0, 1, &mut rng)
            .unwrap();
        if jumped.is_some() {
            break;
        }
    }
    assert!(jumped.is_some(), "jump never landed");
    assert!(system.pathogens[0].susceptible_diets.contains(&Diet::Carnivore));
}

#[test]
fn island_rule_reshapes_a_stranded_species() {
    let region = Region {
        id: 1,
        name: "Gildshore".into(),
        world_id: Uuid::new_v4(),
        cells: vec![],
        connections: vec![],
        isolation_years: 10_000_000.0,
        is_island: true,
        area: 120,
        perimeter: 50,
    };
    let modifier = isolation_modifier(&region).expect("long isolation must register");
    assert_eq!(modifier.strength, 1.0);

    let mut dwarf = SpeciesTraits {
        base_size: 1.0,
        ..SpeciesTraits::default()
    };
    let mut giant = SpeciesTraits {
        base_size: 9.0,
        aggression: 0.9,
        ..SpeciesTraits::default()
    };
    apply_island_rule(&mut dwarf, &modifier);
    apply_island_rule(&mut giant, &modifier);
    assert!(dwarf.base_size > 1.0);
    assert!(giant.base_size < 9.0);
    assert!(giant.aggression < 0.9);
}

#[test]
fn ecosystem_long_tick_drives_disease() {
    let mut ecosystem = Ecosystem::new(Uuid::new_v4());
    ecosystem.disease.params.spontaneous_base = 1.0;
    for _ in 0..200 {
        ecosystem.entities.push(LivingEntity::new(
            "hare",
            ecosystem.world_id,
            Position::default(),
        ));
    }
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    ecosystem.long_tick(1, &mut rng);
    assert!(!ecosystem.disease.pathogens.is_empty());
}
