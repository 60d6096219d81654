//! Every rejected write must leave the ledger untouched.

mod common;

use common::{att, who, Harness};
use vouch_ledger::{BatchVerifyRequest, ErrorKind, LedgerError};
use vouch_types::VerificationId;

fn batch(n: usize) -> BatchVerifyRequest {
    BatchVerifyRequest {
        attestation_ids: (0..n).map(|i| att(&format!("A{i}"))).collect(),
        confidences: vec![50; n],
        notes: vec![String::new(); n],
    }
}

/// Seeds one record so notes and revocation paths have a target.
fn seeded() -> (Harness, VerificationId) {
    let mut h = Harness::new();
    let v = h.verifier("v");
    h.valid("A0");
    let id = h
        .ledger
        .record_verification(&v, &att("A0"), 50, String::new())
        .unwrap()
        .id;
    h.ledger.drain_events();
    (h, id)
}

fn assert_rejected_without_change(
    h: &mut Harness,
    kind: ErrorKind,
    op: impl FnOnce(&mut Harness) -> Result<(), LedgerError>,
) -> LedgerError {
    let before = h.ledger.snapshot();
    let commits = h.store.commit_count();
    let err = op(h).unwrap_err();
    assert_eq!(err.kind(), kind, "unexpected error: {err}");
    assert_eq!(h.ledger.snapshot(), before);
    assert_eq!(h.store.commit_count(), commits);
    assert!(h.ledger.drain_events().is_empty());
    err
}

#[test]
fn non_verifier_cannot_write() {
    let (mut h, _) = seeded();
    let err = assert_rejected_without_change(&mut h, ErrorKind::Authorization, |h| {
        h.ledger
            .record_verification(&who("stranger"), &att("A0"), 50, String::new())
            .map(drop)
    });
    assert!(matches!(err, LedgerError::NotVerifier(_)));

    assert_rejected_without_change(&mut h, ErrorKind::Authorization, |h| {
        h.ledger.batch_verify(&who("stranger"), &batch(2)).map(drop)
    });
}

#[test]
fn revoked_verifier_cannot_write() {
    let (mut h, _) = seeded();
    let admin = h.admin();
    h.ledger.revoke_verifier(&admin, &who("v")).unwrap();
    h.ledger.drain_events();
    assert_rejected_without_change(&mut h, ErrorKind::Authorization, |h| {
        h.ledger
            .record_verification(&who("v"), &att("A0"), 50, String::new())
            .map(drop)
    });
}

#[test]
fn revoked_verifier_cannot_edit_own_notes() {
    let (mut h, id) = seeded();
    let admin = h.admin();
    h.ledger.revoke_verifier(&admin, &who("v")).unwrap();
    h.ledger.drain_events();

    let err = assert_rejected_without_change(&mut h, ErrorKind::Authorization, |h| {
        h.ledger.update_notes(&who("v"), &id, "edited after revoke".into())
    });
    assert!(matches!(err, LedgerError::NotVerifier(_)));
    assert_eq!(h.ledger.verification(&id).unwrap().notes, "");

    // Admins keep their override.
    h.ledger
        .update_notes(&admin, &id, "annotated".into())
        .unwrap();
    assert_eq!(h.ledger.verification(&id).unwrap().notes, "annotated");
}

#[test]
fn pause_blocks_every_write_path() {
    let (mut h, id) = seeded();
    let admin = h.admin();
    h.ledger.set_paused(&admin, true).unwrap();
    h.ledger.drain_events();

    let err = assert_rejected_without_change(&mut h, ErrorKind::Availability, |h| {
        h.ledger
            .record_verification(&who("v"), &att("A0"), 50, String::new())
            .map(drop)
    });
    assert!(err.is_retryable());
    assert_rejected_without_change(&mut h, ErrorKind::Availability, |h| {
        h.ledger.batch_verify(&who("v"), &batch(1)).map(drop)
    });
    assert_rejected_without_change(&mut h, ErrorKind::Availability, |h| {
        h.ledger.update_notes(&who("v"), &id, "x".into())
    });
    assert_rejected_without_change(&mut h, ErrorKind::Availability, |h| {
        h.ledger.revoke_verification(&who("admin"), &id)
    });

    // Reads stay available.
    assert_eq!(h.ledger.verifications_for_attestation(&att("A0"), 0, 0).total, 1);
}

#[test]
fn circuit_breaker_blocks_and_is_not_retryable() {
    let (mut h, _) = seeded();
    let admin = h.admin();
    h.ledger.set_circuit_breaker(&admin, true).unwrap();
    h.ledger.drain_events();

    let err = assert_rejected_without_change(&mut h, ErrorKind::Availability, |h| {
        h.ledger
            .record_verification(&who("v"), &att("A0"), 50, String::new())
            .map(drop)
    });
    assert!(matches!(err, LedgerError::CircuitBroken));
    assert!(!err.is_retryable());

    h.ledger.set_circuit_breaker(&admin, false).unwrap();
    h.ledger
        .record_verification(&who("v"), &att("A0"), 50, String::new())
        .unwrap();
}

#[test]
fn out_of_range_confidence_is_rejected() {
    let (mut h, _) = seeded();
    let err = assert_rejected_without_change(&mut h, ErrorKind::Validation, |h| {
        h.ledger
            .record_verification(&who("v"), &att("A0"), 101, String::new())
            .map(drop)
    });
    assert!(matches!(err, LedgerError::ConfidenceOutOfRange(101)));

    let mut request = batch(3);
    request.confidences[2] = 150;
    let lookups = h.registry.lookups();
    assert_rejected_without_change(&mut h, ErrorKind::Validation, |h| {
        h.ledger.batch_verify(&who("v"), &request).map(drop)
    });
    assert_eq!(h.registry.lookups(), lookups);
}

#[test]
fn registry_failure_rejects_the_whole_batch() {
    let (mut h, _) = seeded();
    h.registry.set_unavailable(true);
    let err = assert_rejected_without_change(&mut h, ErrorKind::Registry, |h| {
        h.ledger.batch_verify(&who("v"), &batch(3)).map(drop)
    });
    assert!(err.is_retryable());
}

#[test]
fn failed_commit_leaves_memory_untouched() {
    let (mut h, id) = seeded();
    let admin = h.admin();

    h.store.fail_next_commit();
    assert_rejected_without_change(&mut h, ErrorKind::Storage, |h| {
        h.ledger.batch_verify(&who("v"), &batch(2)).map(drop)
    });
    h.store.fail_next_commit();
    assert_rejected_without_change(&mut h, ErrorKind::Storage, |h| {
        h.ledger.grant_verifier(&who("admin"), &who("w")).map(drop)
    });
    h.store.fail_next_commit();
    assert_rejected_without_change(&mut h, ErrorKind::Storage, |h| {
        h.ledger.update_notes(&who("admin"), &id, "lost".into())
    });
    h.store.fail_next_commit();
    assert_rejected_without_change(&mut h, ErrorKind::Storage, |h| {
        h.ledger.set_paused(&who("admin"), true)
    });

    // The ledger keeps working afterwards.
    assert!(h.ledger.grant_verifier(&admin, &who("w")).unwrap());
}

#[test]
fn non_admin_cannot_administer() {
    let (mut h, id) = seeded();
    let v = who("v");
    assert_rejected_without_change(&mut h, ErrorKind::Authorization, |h| {
        h.ledger.grant_verifier(&v, &who("x")).map(drop)
    });
    assert_rejected_without_change(&mut h, ErrorKind::Authorization, |h| {
        h.ledger.set_paused(&v, true)
    });
    assert_rejected_without_change(&mut h, ErrorKind::Authorization, |h| {
        h.ledger.set_circuit_breaker(&v, true)
    });
    assert_rejected_without_change(&mut h, ErrorKind::Authorization, |h| {
        h.ledger.update_consensus_parameters(&v, 3, 60).map(drop)
    });
    assert_rejected_without_change(&mut h, ErrorKind::Authorization, |h| {
        h.ledger.revoke_verification(&v, &id)
    });
}
