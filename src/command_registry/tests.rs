//! Property-based tests for the command registry and prefix trie

#[cfg(test)]
mod tests {
    use crate::command_registry::{Command, CommandRegistry, PrefixTrie, RegistryError};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    /// Generate command-like names from a restricted alphabet
    fn arb_command_name() -> impl Strategy<Value = String> {
        "[a-m][a-m0-9-]{0,11}"
    }

    /// Generate a set of unique command names
    fn arb_command_set() -> impl Strategy<Value = BTreeSet<String>> {
        prop::collection::btree_set(arb_command_name(), 1..20)
    }

    fn noop(name: &str) -> Command {
        Command::new(name, "generated", |_| Ok(()))
    }

    fn trie_of(names: &BTreeSet<String>) -> PrefixTrie {
        let mut trie = PrefixTrie::new();
        for name in names {
            trie.insert(name, name.as_str());
        }
        trie
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// An empty prefix returns exactly the inserted set
        #[test]
        fn prop_empty_prefix_returns_everything(names in arb_command_set()) {
            let trie = trie_of(&names);
            let matched: BTreeSet<String> = trie.prefix_match("").into_iter().collect();

            prop_assert_eq!(&matched, &names);
            prop_assert_eq!(trie.prefix_match("").len(), names.len());
        }

        /// A prefix outside the alphabet never matches
        #[test]
        fn prop_foreign_prefix_matches_nothing(
            names in arb_command_set(),
            suffix in "[a-z]{0,4}",
        ) {
            let trie = trie_of(&names);
            let prefix = format!("z{}", suffix);
            prop_assert!(trie.prefix_match(&prefix).is_empty());
        }

        /// Querying a full name yields that name plus its extensions only
        #[test]
        fn prop_full_name_matches_itself(names in arb_command_set()) {
            let trie = trie_of(&names);
            for name in &names {
                let matched = trie.prefix_match(name);
                prop_assert_eq!(matched.iter().filter(|m| *m == name).count(), 1);
                prop_assert!(matched.iter().all(|m| m.starts_with(name.as_str())));

                let expected = names.iter().filter(|n| n.starts_with(name.as_str())).count();
                prop_assert_eq!(matched.len(), expected);
            }
        }

        /// Suggestions come back in lexicographic order and repeat identically
        #[test]
        fn prop_suggestions_are_sorted_and_stable(
            names in arb_command_set(),
            prefix in "[a-m]{0,2}",
        ) {
            let mut registry = CommandRegistry::new();
            for name in &names {
                registry.register(noop(name)).unwrap();
            }

            let first = registry.closest_commands(&prefix);
            let mut sorted = first.clone();
            sorted.sort();
            prop_assert_eq!(&first, &sorted);
            prop_assert_eq!(registry.closest_commands(&prefix), first);
        }

        /// A rejected duplicate leaves the registry exactly as it was
        #[test]
        fn prop_duplicate_registration_has_no_effect(
            names in arb_command_set(),
            pick in any::<prop::sample::Index>(),
        ) {
            let mut registry = CommandRegistry::new();
            for name in &names {
                registry.register(noop(name)).unwrap();
            }
            let before_names: Vec<String> = registry.names().into_iter().map(String::from).collect();
            let before_matches = registry.closest_commands("");

            let duplicate = pick.get(&before_names[..]).clone();
            let result = registry.register(noop(&duplicate).with_description("replacement"));

            prop_assert_eq!(result, Err(RegistryError::DuplicateCommand(duplicate.clone())));
            let after_names: Vec<String> = registry.names().into_iter().map(String::from).collect();
            prop_assert_eq!(after_names, before_names);
            prop_assert_eq!(registry.closest_commands(""), before_matches);
            prop_assert_eq!(registry.get(&duplicate).unwrap().description.as_str(), "");
        }
    }
}
