//! Property tests for the planner and the position allocator.

use pieces_core::store::MemoryStore;
use pieces_core::{
    between, plan_distribution, reorder, AvailableCounts, OrderedItem, PiecesError, PositionKey,
    SkillProfile,
};
use proptest::prelude::*;

fn any_profile() -> impl Strategy<Value = SkillProfile> {
    prop_oneof![
        Just(SkillProfile::HighTarget),
        Just(SkillProfile::MidTarget),
        Just(SkillProfile::LowTarget),
    ]
}

fn any_counts() -> impl Strategy<Value = AvailableCounts> {
    (0u64..200, 0u64..200, 0u64..200).prop_map(|(low, mid, high)| AvailableCounts {
        low,
        mid,
        high,
    })
}

fn any_key() -> impl Strategy<Value = f64> {
    1e-3f64..1e6
}

proptest! {
    #[test]
    fn quota_never_exceeds_request(
        profile in any_profile(),
        total in 0u64..500,
        available in any_counts(),
    ) {
        let q = plan_distribution(profile, total, available);
        prop_assert!(q.total() <= total);
        prop_assert_eq!(q.low() + q.mid() + q.high(), q.total());
        prop_assert!(q.low() <= available.low);
        prop_assert!(q.mid() <= available.mid);
        prop_assert!(q.high() <= available.high);
    }

    #[test]
    fn sufficient_supply_meets_request(
        profile in any_profile(),
        total in 0u64..500,
        available in any_counts(),
    ) {
        prop_assume!(available.sum() >= total);
        let q = plan_distribution(profile, total, available);
        prop_assert_eq!(q.total(), total);
    }

    #[test]
    fn zero_supply_is_empty(profile in any_profile(), total in 0u64..500) {
        let q = plan_distribution(profile, total, AvailableCounts::default());
        prop_assert_eq!((q.low(), q.mid(), q.high(), q.total()), (0, 0, 0, 0));
    }

    #[test]
    fn between_is_strictly_interior(a in any_key(), b in any_key()) {
        prop_assume!(a != b);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let lo = PositionKey::new(lo).unwrap();
        let hi = PositionKey::new(hi).unwrap();
        match between(Some(lo), Some(hi)) {
            Ok(k) => prop_assert!(lo < k && k < hi),
            Err(e) => prop_assert!(matches!(e, PiecesError::PositionExhausted { .. }), "unexpected error: {:?}", e),
        }
        prop_assert!(matches!(
            between(Some(hi), Some(lo)),
            Err(PiecesError::OrderingViolation { .. })
        ), "expected OrderingViolation");
    }

    #[test]
    fn open_ends_stay_outside(a in any_key()) {
        let k = PositionKey::new(a).unwrap();
        prop_assert!(between(None, Some(k)).unwrap() < k);
        prop_assert!(between(Some(k), None).unwrap() > k);
    }

    #[test]
    fn repeated_move_is_noop(len in 3usize..20, from in 0usize..20, to in 0usize..20) {
        let from = from % len;
        // `others` holds len - 1 ids, so `to + 1` must stay below that.
        let to = to % (len - 2);
        let mut store = MemoryStore::new();
        for i in 0..len {
            store.insert(OrderedItem::new(
                format!("r{i}"),
                "g",
                format!("p{i}"),
                PositionKey::new((i + 1) as f64).unwrap(),
            ));
        }

        // Neighbours: the pair (to, to + 1) among the other items.
        let others: Vec<String> = store
            .order("g")
            .into_iter()
            .filter(|id| *id != format!("r{from}"))
            .collect();
        let before = others[to].clone();
        let after = others[to + 1].clone();
        let moving = format!("r{from}");

        reorder(&mut store, "g", &moving, Some(before.as_str()), Some(after.as_str())).unwrap();
        let again = reorder(&mut store, "g", &moving, Some(before.as_str()), Some(after.as_str())).unwrap();
        prop_assert!(!again.moved);

        let order = store.order("g");
        let pos = |id: &str| order.iter().position(|x| x == id).unwrap();
        prop_assert_eq!(pos(before.as_str()) + 1, pos(moving.as_str()));
        prop_assert_eq!(pos(moving.as_str()) + 1, pos(after.as_str()));
        prop_assert!(store.writes() <= 1);
    }
}
