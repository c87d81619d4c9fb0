use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use gameplay_content::{ContentDatabase, ContentFactory};
use gameplay_core::{ActivationError, AppliedEffect, GameplayEvent, GrantError, MovementRequest};
use gameplay_runtime::{
    BehaviorRegistry, RecordingMovementHost, RuntimeError, Simulation, SimulationConfig, Topic,
};

// ============================================================================
// Fixtures
// ============================================================================

fn content() -> Arc<ContentDatabase> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../game/content/data");
    let db = ContentFactory::new(dir)
        .load_database()
        .expect("bundled content should resolve");
    Arc::new(db)
}

fn simulation() -> Simulation {
    Simulation::builder(content()).build()
}

fn movement_of(host: &Arc<Mutex<RecordingMovementHost>>) -> Vec<MovementRequest> {
    host.lock()
        .expect("host lock")
        .take()
        .into_iter()
        .map(|(_, _, request)| request)
        .collect()
}

// ============================================================================
// Abilities
// ============================================================================

#[test]
fn fireball_costs_mana_and_damages_target() {
    let mut sim = simulation();
    let mage = sim.spawn("Mage").expect("Mage profile");
    let warrior = sim.spawn("Warrior").expect("Warrior profile");

    sim.grant_ability(mage, "Fireball").expect("grant Fireball");
    sim.activate(mage, "Fireball").expect("first cast");
    assert_eq!(sim.final_value(mage, "Mana").expect("Mana"), 110.0);
    assert!(sim.has_tag(mage, "State.Casting").expect("tag"));

    let outcome = sim
        .apply_effect(mage, warrior, "FireballHit")
        .expect("known effect");
    assert_eq!(outcome, Some(AppliedEffect::Executed));
    assert_eq!(sim.final_value(warrior, "Health").expect("Health"), 125.0);

    sim.advance(1.25);
    assert!(!sim.has_tag(mage, "State.Casting").expect("tag"));

    let err = sim.activate(mage, "Fireball").expect_err("still cooling down");
    assert!(matches!(
        err.as_activation(),
        Some(ActivationError::OnCooldown { .. })
    ));
    assert_eq!(sim.final_value(mage, "Mana").expect("Mana"), 110.0);
}

#[test]
fn dash_routes_movement_to_host() {
    let host = Arc::new(Mutex::new(RecordingMovementHost::new()));
    let mut sim = Simulation::builder(content())
        .movement_host(Arc::clone(&host))
        .build();
    let hero = sim.spawn("Warrior").expect("Warrior profile");

    sim.grant_ability(hero, "Dash").expect("grant Dash");
    sim.activate(hero, "Dash").expect("dash");
    assert_eq!(movement_of(&host), vec![MovementRequest::Dash { speed: 20.0 }]);

    sim.step(0.25);
    assert_eq!(movement_of(&host), vec![MovementRequest::Stop]);
    assert!(sim.has_tag(hero, "Cooldown.Dash").expect("tag"));
}

#[test]
fn stunned_owner_cannot_dash() {
    let mut sim = simulation();
    let hero = sim.spawn("Warrior").expect("Warrior profile");
    let enemy = sim.spawn_bare();
    sim.grant_ability(hero, "Dash").expect("grant Dash");

    sim.apply_effect(enemy, hero, "Stun").expect("known effect");
    let err = sim.activate(hero, "Dash").expect_err("stunned");
    assert!(matches!(err.as_activation(), Some(ActivationError::Blocked(_))));

    sim.advance(2.0);
    assert!(!sim.has_tag(hero, "State.Stunned").expect("tag"));
    sim.activate(hero, "Dash").expect("stun expired");
}

#[test]
fn grapple_uses_registered_behavior() {
    let host = Arc::new(Mutex::new(RecordingMovementHost::new()));
    let mut sim = Simulation::builder(content())
        .movement_host(Arc::clone(&host))
        .build();
    let hero = sim.spawn("Base").expect("Base profile");

    sim.grant_ability(hero, "Grapple").expect("grapple factory is registered");
    sim.activate(hero, "Grapple").expect("grapple");
    sim.advance(0.75);

    assert_eq!(
        movement_of(&host),
        vec![
            MovementRequest::SetVelocity {
                velocity: [0.0, 0.0, 15.0]
            },
            MovementRequest::Stop,
        ]
    );
}

#[test]
fn grapple_without_factory_fails_to_grant() {
    let mut sim = Simulation::builder(content())
        .behaviors(BehaviorRegistry::empty())
        .build();
    let hero = sim.spawn("Base").expect("Base profile");

    let err = sim.grant_ability(hero, "Grapple").expect_err("no factory");
    assert_eq!(
        err,
        RuntimeError::Grant(GrantError::MissingBehavior {
            ability: "Grapple".into(),
            behavior: "grapple".into(),
        })
    );
    // Built-in kinds never need the registry.
    sim.grant_ability(hero, "Dash").expect("built-in kind");
}

#[test]
fn shield_grants_ward_and_blocks_mana_burn() {
    let mut sim = simulation();
    let mage = sim.spawn("Mage").expect("Mage profile");
    let enemy = sim.spawn_bare();
    sim.grant_ability(mage, "Shield").expect("grant Shield");

    sim.activate(mage, "Shield").expect("channel");
    sim.advance(1.0);
    sim.cancel(mage, "Shield").expect("cancel channel");

    assert!(sim.has_tag(mage, "State.Shielded").expect("tag"));
    let outcome = sim
        .apply_effect(enemy, mage, "ManaBurn")
        .expect("known effect");
    assert_eq!(outcome, None);
    assert_eq!(sim.final_value(mage, "Mana").expect("Mana"), 120.0);

    sim.advance(3.0);
    sim.apply_effect(enemy, mage, "ManaBurn").expect("known effect");
    assert_eq!(sim.final_value(mage, "Mana").expect("Mana"), 60.0);
}

// ============================================================================
// Effects over time
// ============================================================================

#[test]
fn poison_ticks_each_second() {
    let config = SimulationConfig {
        max_step: 1.0,
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::builder(content()).config(config).build();
    let hero = sim.spawn("Warrior").expect("Warrior profile");
    let enemy = sim.spawn_bare();

    let stored = |sim: &Simulation| {
        sim.owner(hero)
            .expect("hero")
            .attributes()
            .get_named("Health")
    };

    sim.apply_effect(enemy, hero, "Poison").expect("known effect");
    sim.step(1.0);
    assert_eq!(stored(&sim), 146.0);
    // The running poison's -4 still folds into the final value.
    assert_eq!(sim.final_value(hero, "Health").expect("Health"), 142.0);

    sim.apply_effect(enemy, hero, "Heal").expect("known effect");
    assert_eq!(stored(&sim), 150.0);
    assert!(!sim.has_tag(hero, "State.Poisoned").expect("tag"));
}

#[test]
fn unknown_names_are_reported() {
    let mut sim = simulation();
    let hero = sim.spawn("Warrior").expect("Warrior profile");

    assert_eq!(
        sim.spawn("Necromancer"),
        Err(RuntimeError::UnknownProfile("Necromancer".into()))
    );
    assert_eq!(
        sim.apply_effect(hero, hero, "Meteor"),
        Err(RuntimeError::UnknownEffect("Meteor".into()))
    );
    assert!(matches!(
        sim.activate(hero, "Fireball"),
        Err(RuntimeError::Activation(ActivationError::NotGranted(_)))
    ));
    let ghost = sim.despawn(hero).expect("despawn").id();
    assert_eq!(
        sim.final_value(ghost, "Health"),
        Err(RuntimeError::UnknownEntity(ghost))
    );
    assert_eq!(
        sim.snapshot_json(ghost),
        Err(RuntimeError::UnknownEntity(ghost))
    );
}

// ============================================================================
// Events & presentation
// ============================================================================

#[test]
fn listeners_receive_effect_events() {
    let mut sim = simulation();
    let hero = sim.spawn("Warrior").expect("Warrior profile");
    let enemy = sim.spawn_bare();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    sim.subscribe(Topic::Effects, move |event: &GameplayEvent| {
        sink.borrow_mut().push(event.clone());
    });

    sim.apply_effect(enemy, hero, "Rage").expect("known effect");
    sim.apply_effect(enemy, hero, "Rage").expect("known effect");

    let seen = seen.borrow();
    assert!(matches!(seen[0], GameplayEvent::EffectApplied { .. }));
    assert!(matches!(
        seen[1],
        GameplayEvent::EffectRefreshed { stacks: 2, .. }
    ));
    assert!(seen.iter().all(|event| event.entity() == hero));
    assert_eq!(sim.final_value(hero, "Strength").expect("Strength"), 19.0);
}

#[test]
fn event_log_keeps_newest_events() {
    let config = SimulationConfig {
        event_log_capacity: 2,
        ..SimulationConfig::default()
    };
    let mut sim = Simulation::builder(content()).config(config).build();
    let hero = sim.spawn("Warrior").expect("Warrior profile");

    sim.add_tag(hero, "State.Casting").expect("known tag");
    sim.add_tag(hero, "State.Shielded").expect("known tag");
    sim.add_tag(hero, "State.Immune").expect("known tag");

    let events = sim.take_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[1], GameplayEvent::TagAdded { .. }));
    assert!(sim.take_events().is_empty());
}

#[test]
fn snapshot_serializes_to_json() {
    let mut sim = simulation();
    let hero = sim.spawn("Warrior").expect("Warrior profile");
    let enemy = sim.spawn_bare();
    sim.apply_effect(enemy, hero, "Poison").expect("known effect");

    let json = sim.snapshot_json(hero).expect("snapshot");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");

    assert_eq!(value["entity"], 1);
    assert_eq!(value["tags"], serde_json::json!(["State.Poisoned"]));
    assert_eq!(value["effects"][0]["name"], "Poison");
    let health = value["attributes"]
        .as_array()
        .expect("attributes array")
        .iter()
        .find(|attr| attr["id"] == "Health")
        .expect("Health attribute");
    assert_eq!(health["current"], 150.0);
}
