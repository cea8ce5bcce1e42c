use microagents::{AgentRegistry, AgentSpec};
use proptest::prelude::*;

fn word() -> impl Strategy<Value = String> {
    "[a-z]{2,8}"
}

fn registry_from(triggers: &[Vec<String>]) -> AgentRegistry {
    AgentRegistry::from_specs(
        triggers
            .iter()
            .enumerate()
            .map(|(i, t)| AgentSpec::new(format!("agent-{}", i), t.clone(), "")),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn dispatch_is_deterministic(
        triggers in prop::collection::vec(prop::collection::vec(word(), 1..4), 1..6),
        prompt in "[a-zA-Z ,.]{1,80}",
    ) {
        prop_assume!(!prompt.trim().is_empty());
        let registry = registry_from(&triggers);
        let first = registry.dispatch(&prompt).unwrap();
        let second = registry.dispatch(&prompt).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn embedded_trigger_always_selects_its_agent(
        triggers in prop::collection::vec(prop::collection::vec(word(), 1..4), 1..6),
        pick in any::<prop::sample::Index>(),
        before in "[a-z ]{0,20}",
        after in "[a-z ]{0,20}",
    ) {
        let registry = registry_from(&triggers);
        let agent = pick.index(triggers.len());
        let trigger = &triggers[agent][0];
        let prompt = format!("{} {} {}", before, trigger.to_uppercase(), after);

        let results = registry.dispatch(&prompt).unwrap();
        let hit = results
            .iter()
            .find(|r| r.agent_id == format!("agent-{}", agent))
            .expect("agent owning the embedded trigger should be selected");
        prop_assert!(hit.matched_triggers.contains(trigger));
    }

    #[test]
    fn results_are_in_registry_order_with_nonempty_triggers(
        triggers in prop::collection::vec(prop::collection::vec(word(), 1..4), 1..8),
        prompt in "[a-z ]{1,120}",
    ) {
        prop_assume!(!prompt.trim().is_empty());
        let registry = registry_from(&triggers);
        let results = registry.dispatch(&prompt).unwrap();

        let positions: Vec<usize> = results
            .iter()
            .map(|r| r.agent_id.trim_start_matches("agent-").parse().unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(results.iter().all(|r| !r.matched_triggers.is_empty()));
    }
}
