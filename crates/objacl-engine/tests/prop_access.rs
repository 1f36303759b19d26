//! Property tests for the access decision laws.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use objacl_core::{AccessPolicy, AccessRule, GroupRef, Permission, Visibility};
use objacl_engine::acl::{evaluate, GroupRegistry};
use proptest::prelude::*;

mod common;
use common::TeamResolver;

fn arb_permission() -> impl Strategy<Value = Permission> {
    prop_oneof![Just(Permission::Read), Just(Permission::Write)]
}

fn arb_policy() -> impl Strategy<Value = AccessPolicy> {
    (
        "u[0-9]{1,2}",
        prop_oneof![Just(Visibility::Public), Just(Visibility::Private)],
        prop::collection::vec(("t[0-3]", arb_permission()), 0..5),
    )
        .prop_map(|(owner, visibility, rules)| AccessPolicy {
            owner,
            visibility,
            acl_rules: rules
                .into_iter()
                .map(|(t, p)| AccessRule::new(GroupRef::new("team", t), p))
                .collect(),
        })
}

fn registry() -> GroupRegistry {
    let reg = GroupRegistry::new();
    reg.register(std::sync::Arc::new(
        TeamResolver::default()
            .with_team("t0", &["u10", "u11"])
            .with_team("t1", &["u11", "u12"])
            .with_team("t2", &["u13"]),
    ));
    reg
}

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(f)
}

proptest! {
    #[test]
    fn prop_owner_always_allowed(policy in arb_policy(), perm in arb_permission()) {
        let reg = registry();
        let d = block_on(evaluate(Some(&policy), Some(&policy.owner), perm, &reg)).unwrap();
        prop_assert!(d.is_allowed());
    }

    #[test]
    fn prop_public_read_for_anyone(policy in arb_policy(), user in proptest::option::of("u[0-9]{1,2}")) {
        let mut policy = policy;
        policy.visibility = Visibility::Public;
        let reg = registry();
        let d = block_on(evaluate(Some(&policy), user.as_deref(), Permission::Read, &reg)).unwrap();
        prop_assert!(d.is_allowed());
    }

    #[test]
    fn prop_no_policy_denies(user in proptest::option::of("u[0-9]{1,2}"), perm in arb_permission()) {
        let reg = registry();
        let d = block_on(evaluate(None, user.as_deref(), perm, &reg)).unwrap();
        prop_assert!(!d.is_allowed());
    }

    #[test]
    fn prop_write_access_implies_read_access(policy in arb_policy(), user in "u[0-9]{1,2}") {
        let reg = registry();
        let w = block_on(evaluate(Some(&policy), Some(&user), Permission::Write, &reg)).unwrap();
        let r = block_on(evaluate(Some(&policy), Some(&user), Permission::Read, &reg)).unwrap();
        prop_assert!(!w.is_allowed() || r.is_allowed());
    }

    #[test]
    fn prop_rule_order_irrelevant(policy in arb_policy(), user in "u[0-9]{1,2}", perm in arb_permission()) {
        let reg = registry();
        let mut reversed = policy.clone();
        reversed.acl_rules.reverse();
        let a = block_on(evaluate(Some(&policy), Some(&user), perm, &reg)).unwrap();
        let b = block_on(evaluate(Some(&reversed), Some(&user), perm, &reg)).unwrap();
        prop_assert_eq!(a.is_allowed(), b.is_allowed());
    }
}
