//! Property tests over random operation sequences.

mod common;

use proptest::prelude::*;
use std::collections::HashSet;

use common::{att, who, Harness};
use vouch_ledger::{BatchVerifyRequest, Ledger};

const VERIFIERS: [&str; 3] = ["v0", "v1", "v2"];
const ATTESTATIONS: [&str; 3] = ["A0", "A1", "A2"];

#[derive(Clone, Debug)]
enum Op {
    Grant(usize),
    Revoke(usize),
    Verify { verifier: usize, attestation: usize, confidence: u32 },
    Batch { verifier: usize, attestations: Vec<usize> },
    Params { min: u32, pct: u32 },
    Pause(bool),
    Tick,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize).prop_map(Op::Grant),
        (0..3usize).prop_map(Op::Revoke),
        (0..3usize, 0..3usize, 0..=120u32).prop_map(|(verifier, attestation, confidence)| {
            Op::Verify {
                verifier,
                attestation,
                confidence,
            }
        }),
        (0..3usize, prop::collection::vec(0..3usize, 0..5)).prop_map(
            |(verifier, attestations)| Op::Batch {
                verifier,
                attestations,
            }
        ),
        (0..6u32, 45..=105u32).prop_map(|(min, pct)| Op::Params { min, pct }),
        any::<bool>().prop_map(Op::Pause),
        Just(Op::Tick),
    ]
}

fn apply(h: &mut Harness, op: &Op) {
    let admin = h.admin();
    // Rejections are expected; only the invariants matter.
    let _ = match op {
        Op::Grant(i) => h.ledger.grant_verifier(&admin, &who(VERIFIERS[*i])).map(drop),
        Op::Revoke(i) => h.ledger.revoke_verifier(&admin, &who(VERIFIERS[*i])).map(drop),
        Op::Verify {
            verifier,
            attestation,
            confidence,
        } => h
            .ledger
            .record_verification(
                &who(VERIFIERS[*verifier]),
                &att(ATTESTATIONS[*attestation]),
                *confidence,
                String::new(),
            )
            .map(drop),
        Op::Batch {
            verifier,
            attestations,
        } => {
            let request = BatchVerifyRequest {
                attestation_ids: attestations.iter().map(|&a| att(ATTESTATIONS[a])).collect(),
                confidences: vec![60; attestations.len()],
                notes: vec![String::new(); attestations.len()],
            };
            h.ledger
                .batch_verify(&who(VERIFIERS[*verifier]), &request)
                .map(drop)
        }
        Op::Params { min, pct } => h
            .ledger
            .update_consensus_parameters(&admin, *min, *pct)
            .map(drop),
        Op::Pause(p) => h.ledger.set_paused(&admin, *p),
        Op::Tick => {
            h.clock.advance(1);
            Ok(())
        }
    };
}

fn check_invariants(ledger: &Ledger) {
    let snapshot = ledger.snapshot();
    for v in &snapshot.verifiers {
        assert!(v.is_consistent(), "verifier invariant broken: {v:?}");
    }
    for a in &snapshot.attestations {
        assert!(a.is_consistent(), "attestation invariant broken: {a:?}");
        assert!(a.average_confidence <= 100);
    }
    let ids: HashSet<_> = snapshot.records.iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), snapshot.records.len(), "duplicate verification id");
    assert_eq!(
        snapshot.records.len() as u64,
        snapshot.counters.total_verifications
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_after_any_sequence(ops in prop::collection::vec(op(), 1..40)) {
        let mut h = Harness::new();
        for name in ATTESTATIONS.iter().take(2) {
            h.valid(name);
        }
        let mut latched: HashSet<String> = HashSet::new();
        for op in &ops {
            apply(&mut h, op);
            check_invariants(&h.ledger);
            for name in ATTESTATIONS {
                let status = h.ledger.consensus_status(&att(name));
                if latched.contains(name) {
                    prop_assert!(status.has_consensus, "consensus on {} was cleared", name);
                }
                if status.has_consensus {
                    latched.insert(name.to_string());
                }
            }
        }
    }

    #[test]
    fn pagination_returns_the_expected_window(
        n in 0usize..12,
        offset in 0usize..15,
        limit in 0usize..15,
    ) {
        let mut h = Harness::new();
        let v = h.verifier("v");
        for _ in 0..n {
            h.ledger
                .record_verification(&v, &att("A0"), 50, String::new())
                .unwrap();
        }
        let all = h.ledger.verifications_for_attestation(&att("A0"), 0, 0);
        let page = h.ledger.verifications_for_attestation(&att("A0"), offset, limit);
        prop_assert_eq!(page.total, n as u64);

        let start = offset.min(n);
        let expected = if limit == 0 { n - start } else { limit.min(n - start) };
        prop_assert_eq!(page.items.len(), expected);
        prop_assert_eq!(&page.items[..], &all.items[start..start + expected]);

        let history = h.ledger.verifier_history(&v, offset, limit);
        prop_assert_eq!(history.items, page.items);
    }

    #[test]
    fn same_instant_duplicates_never_collide(copies in 1usize..20) {
        let mut h = Harness::new();
        let v = h.verifier("v");
        let request = BatchVerifyRequest {
            attestation_ids: vec![att("A0"); copies],
            confidences: vec![50; copies],
            notes: vec![String::new(); copies],
        };
        let first = h.ledger.batch_verify(&v, &request).unwrap();
        let second = h.ledger.batch_verify(&v, &request).unwrap();
        let ids: HashSet<_> = first
            .verification_ids
            .iter()
            .chain(second.verification_ids.iter())
            .collect();
        prop_assert_eq!(ids.len(), copies * 2);
    }
}
