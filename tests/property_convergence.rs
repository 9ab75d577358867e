use itersearch::domain::models::{RoundResult, SequenceIdSet, StopReason};
use itersearch::StopPolicy;
use proptest::prelude::*;
use std::collections::HashSet;
use std::path::PathBuf;

fn id_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,3}[0-9]{0,2}", 0..40)
}

fn round_result(round: u32, new_hits: Option<usize>, all_hits: usize) -> RoundResult {
    RoundResult {
        round,
        new_queries: new_hits.map(|_| PathBuf::from("q.faa")),
        new_subjects: PathBuf::from("s.faa"),
        new_hit_count: new_hits,
        all_hits_count: all_hits,
        raw_hit_count: new_hits.unwrap_or(0),
        remaining_subjects: 0,
        report: PathBuf::from("r.btab.txt"),
    }
}

proptest! {
    /// Property: adding an id twice never changes the size
    #[test]
    fn prop_add_is_idempotent(ids in id_list()) {
        let mut set: SequenceIdSet = ids.iter().map(String::as_str).collect();
        let before = set.size();
        for id in &ids {
            prop_assert!(!set.add(id.as_str()));
        }
        prop_assert_eq!(set.size(), before);
    }

    /// Property: the difference never contains an id already in the set
    #[test]
    fn prop_difference_excludes_known(known in id_list(), candidates in id_list()) {
        let known: SequenceIdSet = known.into_iter().collect();
        let candidates: SequenceIdSet = candidates.into_iter().collect();

        let new = known.difference(&candidates);

        for id in new.iter() {
            prop_assert!(!known.contains(id));
            prop_assert!(candidates.contains(id));
        }
        let expected = candidates.iter().filter(|id| !known.contains(id)).count();
        prop_assert_eq!(new.size(), expected);
    }

    /// Property: extend reports exactly how much the set grew
    #[test]
    fn prop_extend_counts_growth(start in id_list(), more in id_list()) {
        let mut set: SequenceIdSet = start.into_iter().collect();
        let before = set.size();
        let added = set.extend(more.iter().map(String::as_str));

        prop_assert_eq!(set.size(), before + added);
        let distinct: HashSet<&String> = more.iter().collect();
        prop_assert!(added <= distinct.len());
    }

    /// Property: the cumulative set is monotonic across simulated rounds and
    /// a round never reports more new hits than hits in total
    #[test]
    fn prop_rounds_are_monotonic(rounds in prop::collection::vec(id_list(), 1..6)) {
        let mut all = SequenceIdSet::new();
        for raw in rounds {
            let before = all.size();
            let raw: SequenceIdSet = raw.into_iter().collect();
            let new = all.difference(&raw);
            let added = all.extend(new.iter());

            prop_assert_eq!(added, new.size());
            prop_assert!(all.size() >= before);
            prop_assert!(new.size() <= all.size());
        }
    }

    /// Property: before the round limit, the policy stops exactly when the
    /// increase is at most the stop fraction
    #[test]
    fn prop_policy_matches_threshold(
        all_hits in 1usize..10_000,
        new_fraction in 0.0f64..=1.0,
        percent in 0.0f64..100.0,
    ) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let new_hits = ((all_hits as f64) * new_fraction).round() as usize;
        let policy = StopPolicy { max_rounds: 10, stop_fraction: percent / 100.0 };

        let decision = policy.evaluate(&round_result(1, Some(new_hits), all_hits));

        #[allow(clippy::cast_precision_loss)]
        let increase = new_hits as f64 / all_hits as f64;
        let expected = if new_hits == 0 {
            Some(StopReason::NoNewHits)
        } else if increase <= percent / 100.0 {
            Some(StopReason::Converged)
        } else {
            None
        };
        prop_assert_eq!(decision, expected);
    }

    /// Property: the loop never runs past the round limit
    #[test]
    fn prop_round_limit_is_final(max_rounds in 1u32..20, round in 1u32..40) {
        let policy = StopPolicy { max_rounds, stop_fraction: 0.0 };
        let decision = policy.evaluate(&round_result(round, Some(10), 10));

        if round >= max_rounds {
            prop_assert_eq!(decision, Some(StopReason::MaxRoundsReached));
        } else {
            prop_assert_eq!(decision, None);
        }
    }
}
