//! Property-based tests for tree assembly and dispatch.
//!
//! These tests use proptest to generate command names and argument vectors
//! and verify that composition and resolution invariants hold for all of
//! them.

#[cfg(test)]
mod proptest_tests {
    use crate::command::{compose, CommandNode};
    use crate::dispatch::{dispatch, Outcome};
    use crate::error::Error;
    use crate::options::{OptionRegistry, OptionSpec};
    use proptest::collection::{btree_set, vec};
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Command names: lowercase words that never look like flags.
    fn name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9]{0,7}"
            .prop_filter("reserved by the dispatcher", |n| n != "help" && n != "version")
    }

    /// Build a chain root -> names[0] -> names[1] -> ... whose last node
    /// counts its invocations.
    fn chain(names: &[String], calls: &Rc<Cell<usize>>) -> CommandNode {
        let counter = Rc::clone(calls);
        let mut node = CommandNode::new(names[names.len() - 1].clone()).action(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        for name in names[..names.len() - 1].iter().rev() {
            node = CommandNode::new(name.clone()).with_child(node).unwrap();
        }
        node
    }

    // ============================================================================
    // compose property tests
    // ============================================================================

    proptest! {
        /// Property: distinct sibling names never collide
        #[test]
        fn compose_distinct_names_never_fails(names in btree_set(name(), 1..12)) {
            let mut root = CommandNode::new("root");
            let children = names.iter().map(|n| CommandNode::new(n.clone()));

            prop_assert!(compose(&mut root, children).is_ok());
            prop_assert_eq!(root.children().len(), names.len());
        }

        /// Property: a repeated name always collides, naming the repeated child
        #[test]
        fn compose_duplicate_name_always_fails(
            names in btree_set(name(), 1..8),
            pick in any::<prop::sample::Index>(),
        ) {
            let names: Vec<String> = names.into_iter().collect();
            let duplicate = pick.get(&names).clone();
            let mut children: Vec<CommandNode> =
                names.iter().map(|n| CommandNode::new(n.clone())).collect();
            children.push(CommandNode::new(duplicate.clone()));

            let mut root = CommandNode::new("root");
            match compose(&mut root, children) {
                Err(Error::DuplicateCommand { name, parent }) => {
                    prop_assert_eq!(name, duplicate);
                    prop_assert_eq!(parent, "root");
                }
                other => prop_assert!(false, "expected DuplicateCommand, got {:?}", other),
            }
        }

        /// Property: composition preserves insertion order
        #[test]
        fn compose_preserves_order(names in btree_set(name(), 1..12)) {
            let names: Vec<String> = names.into_iter().rev().collect();
            let mut root = CommandNode::new("root");
            compose(&mut root, names.iter().map(|n| CommandNode::new(n.clone()))).unwrap();

            let composed: Vec<String> =
                root.children().iter().map(|c| c.name().to_string()).collect();
            prop_assert_eq!(composed, names);
        }
    }

    // ============================================================================
    // dispatch property tests
    // ============================================================================

    proptest! {
        /// Property: argv naming a chain that ends at an action invokes it exactly once
        #[test]
        fn dispatch_chain_invokes_action_once(names in vec(name(), 1..6)) {
            let calls = Rc::new(Cell::new(0));
            let mut root = CommandNode::new("root");
            root.add_child(chain(&names, &calls)).unwrap();

            prop_assert_eq!(dispatch(&root, &names).unwrap(), Outcome::Completed);
            prop_assert_eq!(calls.get(), 1);
        }

        /// Property: an unknown first token is unresolved and runs nothing
        #[test]
        fn dispatch_unknown_token_never_invokes(
            names in vec(name(), 1..4),
            token in name(),
        ) {
            prop_assume!(token != names[0]);
            let calls = Rc::new(Cell::new(0));
            let mut root = CommandNode::new("root");
            root.add_child(chain(&names, &calls)).unwrap();

            match dispatch(&root, [token.clone()]) {
                Err(Error::UnresolvedCommand { token: reported, .. }) => {
                    prop_assert_eq!(reported, token);
                }
                other => prop_assert!(false, "expected UnresolvedCommand, got {:?}", other),
            }
            prop_assert_eq!(calls.get(), 0);
        }

        /// Property: empty arguments never invoke a leaf
        #[test]
        fn dispatch_empty_argv_has_no_action(names in vec(name(), 1..4)) {
            let calls = Rc::new(Cell::new(0));
            let mut root = CommandNode::new("root");
            root.add_child(chain(&names, &calls)).unwrap();

            let result = dispatch(&root, Vec::<String>::new());
            prop_assert!(
                matches!(result, Err(Error::NoAction { .. })),
                "expected NoAction, got {:?}",
                result
            );
            prop_assert_eq!(calls.get(), 0);
        }

        /// Property: binding once succeeds, binding twice always fails
        #[test]
        fn bind_twice_always_fails(names in btree_set(name(), 1..6)) {
            let mut registry = OptionRegistry::new();
            for n in &names {
                registry.register(OptionSpec::value(n.clone())).unwrap();
            }
            let mut root = CommandNode::new("root");

            prop_assert!(registry.bind(&mut root).is_ok());
            prop_assert!(
                matches!(registry.bind(&mut root), Err(Error::DuplicateOption { .. })),
                "second bind should fail"
            );
        }
    }
}
