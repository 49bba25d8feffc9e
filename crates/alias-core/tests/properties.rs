//! Property tests for translation and resolution laws

use alias_convert::Value;
use alias_core::{Aliases, Location};
use alias_test_utils::{named_location, offline, shutdown_trigger_location};
use proptest::prelude::*;
use std::sync::OnceLock;

fn shared() -> &'static Aliases {
    static ALIASES: OnceLock<Aliases> = OnceLock::new();
    ALIASES.get_or_init(offline)
}

fn pool() -> Location {
    named_location("Pool", "POOL", "pool-1")
}

fn distinct_words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,6}", 0..6).prop_map(|mut words| {
        let mut seen = std::collections::HashSet::new();
        words.retain(|w| seen.insert(w.clone()));
        words
    })
}

proptest! {
    #[test]
    fn non_default_scalar_survives_round_trip(size in any::<i32>().prop_filter("non-default", |v| *v != 0)) {
        let aliases = shared();
        let read = aliases
            .provider_to_model(&pool(), "Size", Some(&Value::Integer(size)))
            .unwrap()
            .unwrap();
        let model_value = read.value.clone().unwrap();

        let written = aliases
            .model_to_provider(&pool(), &read.name, &model_value, None)
            .unwrap()
            .unwrap();
        prop_assert_eq!(written.value, Value::Integer(size));
    }

    #[test]
    fn default_is_always_elided(text in prop::sample::select(vec!["0", "00", " 0 "])) {
        let read = shared()
            .provider_to_model(&pool(), "Size", Some(&Value::from(text)))
            .unwrap()
            .unwrap();
        prop_assert_eq!(read.value, None);
    }

    #[test]
    fn merging_a_list_with_itself_is_identity(words in distinct_words()) {
        let list = Value::string_list(words.iter().cloned());
        let merged = shared()
            .model_to_provider(&pool(), "Members", &list, Some(&list))
            .unwrap()
            .unwrap();
        prop_assert_eq!(merged.value, list);
    }

    #[test]
    fn merge_keeps_existing_order_and_appends_new(existing in distinct_words(), incoming in distinct_words()) {
        let merged = shared()
            .model_to_provider(
                &pool(),
                "Members",
                &Value::string_list(incoming.iter().cloned()),
                Some(&Value::string_list(existing.iter().cloned())),
            )
            .unwrap()
            .unwrap();

        let mut expected = existing.clone();
        expected.extend(incoming.iter().filter(|w| !existing.contains(w)).cloned());
        prop_assert_eq!(merged.value, Value::string_list(expected));
    }

    #[test]
    fn offline_placeholders_are_deterministic(work_manager in "[A-Za-z][A-Za-z0-9_-]{0,10}") {
        let aliases = shared();
        let first = aliases.attributes_path(&shutdown_trigger_location(None, &work_manager)).unwrap();
        let second = aliases.attributes_path(&shutdown_trigger_location(None, &work_manager)).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert!(first.starts_with("/SelfTuning/NO_NAME_0/WorkManager/"));
        prop_assert!(first.ends_with("/WorkManagerShutdownTrigger/NO_NAME_0"));
    }

    #[test]
    fn bound_name_appears_in_path(name in "[A-Za-z][A-Za-z0-9_.-]{0,12}") {
        let location = named_location("Server", "SERVER", &name);
        prop_assert_eq!(shared().attributes_path(&location).unwrap(), format!("/Server/{name}"));
        prop_assert_eq!(shared().instance_name(&location).unwrap(), name);
    }
}
