use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use microagents::{AgentRegistry, AgentSpec, MicroagentError};

fn generation(tag: &str, count: usize) -> Vec<AgentSpec> {
    (0..count)
        .map(|i| AgentSpec::new(format!("{}-{}", tag, i), ["shared"], tag))
        .collect()
}

#[test]
fn readers_see_whole_generations_during_replace() {
    let registry = Arc::new(AgentRegistry::from_specs(generation("old", 8)).unwrap());
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut observed = 0usize;
                while !done.load(Ordering::SeqCst) {
                    let snapshot = registry.snapshot();
                    let tags: Vec<&str> = snapshot.iter().map(|a| a.payload()).collect();
                    let first = tags[0];
                    assert!(tags.iter().all(|t| *t == first), "mixed snapshot: {:?}", tags);
                    let expected = if first == "old" { 8 } else { 5 };
                    assert_eq!(snapshot.len(), expected);
                    observed += 1;
                }
                observed
            })
        })
        .collect();

    for round in 0..200 {
        let specs = if round % 2 == 0 {
            generation("new", 5)
        } else {
            generation("old", 8)
        };
        registry.replace(specs).unwrap();
    }
    done.store(true, Ordering::SeqCst);

    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
}

#[test]
fn rejected_replace_leaves_registry_intact() {
    let registry = AgentRegistry::from_specs(generation("old", 3)).unwrap();
    let before = registry.snapshot();

    let mut specs = generation("new", 2);
    specs.push(AgentSpec::new("broken", Vec::<String>::new(), "x"));
    assert!(matches!(
        registry.replace(specs),
        Err(MicroagentError::InvalidAgent(_))
    ));

    let after = registry.snapshot();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.ids().collect::<Vec<_>>(), vec!["old-0", "old-1", "old-2"]);
}

#[test]
fn concurrent_registration_keeps_every_agent_once() {
    let registry = Arc::new(AgentRegistry::new());
    let writers: Vec<_> = (0..4)
        .map(|w| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..25 {
                    registry
                        .register(AgentSpec::new(format!("agent-{}-{}", w, i), ["kw"], ""))
                        .unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(registry.len(), 100);
    assert!(matches!(
        registry.register(AgentSpec::new("agent-0-0", ["kw"], "")),
        Err(MicroagentError::DuplicateAgent(_))
    ));
    assert_eq!(registry.dispatch("kw").unwrap().len(), 100);
}
