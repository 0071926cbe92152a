#[cfg(test)]
mod tests {
    use crate::battle::ai::PersonalityAI;
    use crate::battle::engine::{determine_turn_order, resolve_turn};
    use crate::battle::runner::{BattleOutcome, BattleRunner};
    use crate::battle::skill_effects::{apply_skill, calculate_damage};
    use crate::battle::state::{ActiveWeather, BattleEvent, EffectOutcome, EventBus, GameState, TurnRng};
    use crate::battle::tests::common::{
        create_test_battle, predictable_rng, skill, test_ruleset, TestCombatantBuilder,
    };
    use crate::combatant::ActiveStatus;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::Element;

    fn skill_lines_by<'a>(bus: &'a EventBus, name: &str) -> Vec<&'a BattleEvent> {
        bus.events()
            .iter()
            .filter(|event| matches!(event, BattleEvent::SkillUsed { combatant, .. } if combatant == name))
            .collect()
    }

    #[test]
    fn test_fire_against_wood_and_water() {
        let ruleset = test_ruleset();
        let ember = skill("Ember");
        let attacker = TestCombatantBuilder::new("a", "Emberfox")
            .with_attack(50)
            .with_elements(vec![Element::Fire])
            .build();
        let wood = TestCombatantBuilder::new("w", "Mossling")
            .with_defense(25)
            .with_elements(vec![Element::Wood])
            .build();
        let water = TestCombatantBuilder::new("s", "Puddlefin")
            .with_defense(25)
            .with_elements(vec![Element::Water])
            .build();

        // raw = 40 * (50 / 25) * 0.5 + 50 * 0.2 = 50
        let against_wood = calculate_damage(&attacker, &wood, &ember, 40, false, &ruleset);
        let against_water = calculate_damage(&attacker, &water, &ember, 40, false, &ruleset);
        assert_eq!(against_wood.amount, 75);
        assert_eq!(against_water.amount, 25);
        assert_eq!(against_wood.amount, against_water.amount * 3);

        // Same numbers through a full skill use.
        let mut state = create_test_battle(attacker, wood);
        let mut bus = EventBus::new();
        apply_skill(&mut state, 0, &ember, 1, &ruleset, &mut predictable_rng(), &mut bus);
        bus.print_debug_with_message("Ember vs Mossling:");
        assert_eq!(state.combatants[1].hp, 25);
        assert!(bus.lines()[0].contains("It's super effective!"));
    }

    #[test]
    fn test_fire_against_wood_and_water_at_forty_defense() {
        let ruleset = test_ruleset();
        let ember = skill("Ember");
        let attacker = TestCombatantBuilder::new("a", "Emberfox")
            .with_attack(50)
            .with_elements(vec![Element::Fire])
            .build();
        let wood = TestCombatantBuilder::new("w", "Mossling")
            .with_defense(40)
            .with_max_hp(120)
            .with_elements(vec![Element::Wood])
            .build();
        let water = TestCombatantBuilder::new("s", "Puddlefin")
            .with_defense(40)
            .with_max_hp(120)
            .with_elements(vec![Element::Water])
            .build();

        // raw = 40 * (50 / 40) * 0.5 + 50 * 0.2 = 35
        let against_wood = calculate_damage(&attacker, &wood, &ember, 40, false, &ruleset);
        let against_water = calculate_damage(&attacker, &water, &ember, 40, false, &ruleset);
        assert_eq!(against_wood.amount, 52);
        assert_eq!(against_water.amount, 17);
        assert!(against_wood.amount > against_water.amount * 2);

        let mut state = create_test_battle(attacker, wood);
        let mut bus = EventBus::new();
        apply_skill(&mut state, 0, &ember, 1, &ruleset, &mut predictable_rng(), &mut bus);
        assert_eq!(state.combatants[1].hp, 68);
        assert_eq!(state.combatants[0].mp, 40);
    }

    #[rstest]
    #[case(0, GameState::Victory { winner: 1, loser: 0 })]
    #[case(1, GameState::Victory { winner: 0, loser: 1 })]
    fn test_status_knockout_ends_turn_before_actions(#[case] poisoned: usize, #[case] expected: GameState) {
        let ruleset = test_ruleset();
        let mut challenger = TestCombatantBuilder::new("a", "Alpha").with_speed(30).build();
        let mut defender = TestCombatantBuilder::new("b", "Beta").build();
        let victim = if poisoned == 0 { &mut challenger } else { &mut defender };
        victim.hp = 1;
        victim.statuses.push(ActiveStatus {
            id: "poison".to_string(),
            remaining: 3,
        });
        let mut state = create_test_battle(challenger, defender);

        let bus = resolve_turn(&mut state, &ruleset, &PersonalityAI::new(), &mut predictable_rng());
        bus.print_debug_with_message("Poison knockout:");

        assert_eq!(state.game_state, expected);
        assert!(skill_lines_by(&bus, "Alpha").is_empty());
        assert!(skill_lines_by(&bus, "Beta").is_empty());
        assert!(bus
            .events()
            .iter()
            .any(|event| matches!(event, BattleEvent::StatusHpChanged { delta: -1, .. })));
        assert!(!bus.events().iter().any(|event| matches!(event, BattleEvent::TurnEnded)));
    }

    #[test]
    fn test_weather_knockout_ends_battle_at_turn_end() {
        let ruleset = test_ruleset();
        let mut state = create_test_battle(
            TestCombatantBuilder::new("a", "Alpha")
                .with_speed(30)
                .with_elements(vec![Element::Fire])
                .build(),
            TestCombatantBuilder::new("b", "Beta")
                .with_hp(3)
                .with_elements(vec![Element::Water])
                .build(),
        );
        state.weather = Some(ActiveWeather {
            id: "sandstorm".to_string(),
            remaining: 3,
        });

        // Every draw is 100: both basic attacks miss, only the sandstorm lands.
        let mut rng = TurnRng::new_for_test(vec![100]);
        let bus = resolve_turn(&mut state, &ruleset, &PersonalityAI::new(), &mut rng);
        bus.print_debug_with_message("Sandstorm knockout:");

        assert_eq!(skill_lines_by(&bus, "Alpha").len(), 1);
        assert_eq!(skill_lines_by(&bus, "Beta").len(), 1);
        assert_eq!(state.combatants[0].hp, 94);
        assert_eq!(state.combatants[1].hp, 0);
        assert_eq!(state.game_state, GameState::Victory { winner: 0, loser: 1 });
        assert!(bus
            .events()
            .iter()
            .any(|event| matches!(event, BattleEvent::BattleEnded { winner: Some(name) } if name == "Alpha")));
        assert!(!bus.events().iter().any(|event| matches!(event, BattleEvent::TurnEnded)));
    }

    #[test]
    fn test_full_stun_never_acts_and_counts_down() {
        let ruleset = test_ruleset();
        let mut state = create_test_battle(
            TestCombatantBuilder::new("a", "Alpha").with_speed(30).build(),
            TestCombatantBuilder::new("b", "Beta")
                .with_max_hp(1000)
                .with_skill(skill("Ember"), 1)
                .with_status("stun", 3)
                .build(),
        );
        // Every draw is 100: Alpha's basic attacks always miss.
        let mut rng = TurnRng::new_for_test(vec![100]);
        let ai = PersonalityAI::new();

        let mut remaining = vec![];
        for turn in 1..=3 {
            state.turn_number = turn;
            let bus = resolve_turn(&mut state, &ruleset, &ai, &mut rng);
            assert!(skill_lines_by(&bus, "Beta").is_empty(), "Beta acted on turn {}", turn);
            assert!(bus
                .events()
                .iter()
                .any(|event| matches!(event, BattleEvent::StatusSkippedTurn { .. })));
            remaining.push(
                state.combatants[1]
                    .statuses
                    .iter()
                    .find(|s| s.id == "stun")
                    .map(|s| s.remaining),
            );
        }
        assert_eq!(remaining, vec![Some(2), Some(1), None]);

        state.turn_number = 4;
        let bus = resolve_turn(&mut state, &ruleset, &ai, &mut rng);
        assert_eq!(skill_lines_by(&bus, "Beta").len(), 1);
    }

    #[rstest]
    #[case(95, 1, 100)]
    #[case(50, 1, 80)]
    #[case(99, 9, 100)]
    fn test_self_heal_never_overheals(#[case] hp: u32, #[case] level: u32, #[case] expected: u32) {
        let ruleset = test_ruleset();
        let mut state = create_test_battle(
            TestCombatantBuilder::new("a", "Alpha").with_max_hp(100).with_hp(hp).build(),
            TestCombatantBuilder::new("b", "Beta").build(),
        );
        let mut bus = EventBus::new();
        apply_skill(&mut state, 0, &skill("Mend"), level, &ruleset, &mut predictable_rng(), &mut bus);

        assert_eq!(state.combatants[0].hp, expected);
        assert!(matches!(
            &bus.events()[0],
            BattleEvent::SkillUsed { outcomes, .. }
                if outcomes == &vec![EffectOutcome::Healed { target: "Alpha".to_string(), amount: expected - hp }]
        ));
    }

    #[test]
    fn test_recoil_is_a_quarter_of_damage_dealt() {
        let ruleset = test_ruleset();
        let mut state = create_test_battle(
            TestCombatantBuilder::new("a", "Alpha").with_attack(50).build(),
            TestCombatantBuilder::new("b", "Beta").with_defense(50).build(),
        );
        let mut bus = EventBus::new();
        apply_skill(&mut state, 0, &skill("Reckless Charge"), 1, &ruleset, &mut predictable_rng(), &mut bus);

        // 60 * (50 / 50) * 0.5 + 50 * 0.2 = 40, recoil floor(40 * 0.25) = 10
        assert_eq!(state.combatants[1].hp, 60);
        assert_eq!(state.combatants[0].hp, 90);
    }

    #[test]
    fn test_recoil_knockout_hands_target_the_win() {
        let ruleset = test_ruleset();
        let runner = BattleRunner::new(&ruleset).unwrap();
        let report = runner.simulate_combatants(
            TestCombatantBuilder::new("a", "Alpha")
                .with_attack(50)
                .with_speed(30)
                .with_hp(5)
                .with_skill(skill("Reckless Charge"), 1)
                .build(),
            TestCombatantBuilder::new("b", "Beta")
                .with_defense(50)
                .with_max_hp(200)
                .build(),
            TurnRng::new_for_test(vec![1]),
        );

        assert_eq!(
            report.outcome,
            BattleOutcome::Victory {
                winner_id: "b".to_string(),
                loser_id: "a".to_string(),
            }
        );
        assert_eq!(report.combatants[1].hp, 160);
        assert_eq!(report.turns, 1);
    }

    #[rstest]
    #[case(1)]
    #[case(50)]
    #[case(999)]
    fn test_equal_speed_favours_challenger(#[case] speed: i32) {
        let ruleset = test_ruleset();
        let mut state = create_test_battle(
            TestCombatantBuilder::new("z", "Zephyr").with_speed(speed).build(),
            TestCombatantBuilder::new("a", "Aster").with_speed(speed).build(),
        );
        assert_eq!(determine_turn_order(&state, &ruleset), [0, 1]);

        let mut rng = TurnRng::new_for_test(vec![100]);
        let bus = resolve_turn(&mut state, &ruleset, &PersonalityAI::new(), &mut rng);
        let first_actor = bus.events().iter().find_map(|event| match event {
            BattleEvent::SkillUsed { combatant, .. } => Some(combatant.clone()),
            _ => None,
        });
        assert_eq!(first_actor.as_deref(), Some("Zephyr"));
    }
}
