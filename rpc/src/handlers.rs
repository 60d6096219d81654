//! RPC request types and their dispatch onto the ledger.

use serde::Deserialize;
use serde_json::{json, Value};

use vouch_ledger::{BatchVerifyRequest, Ledger, LedgerError};
use vouch_types::{AttestationId, Identity, RegistryRef, VerificationId};

use crate::pagination::PageResponse;

/// One RPC call, tagged by `action`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RpcRequest {
    // ── Verification writes ─────────────────────────────────────────────
    RecordVerification {
        attestation_id: AttestationId,
        confidence: u32,
        #[serde(default)]
        notes: String,
    },
    BatchVerify(BatchVerifyRequest),
    UpdateNotes {
        verification_id: VerificationId,
        notes: String,
    },
    RevokeVerification {
        verification_id: VerificationId,
    },

    // ── Reads ───────────────────────────────────────────────────────────
    Verification {
        verification_id: VerificationId,
    },
    AttestationVerifications {
        attestation_id: AttestationId,
        #[serde(default)]
        offset: usize,
        #[serde(default)]
        limit: usize,
    },
    VerifierHistory {
        verifier: Identity,
        #[serde(default)]
        offset: usize,
        #[serde(default)]
        limit: usize,
    },
    VerifierReputation {
        verifier: Identity,
    },
    AttestationReputation {
        attestation_id: AttestationId,
    },
    ConsensusStatus {
        attestation_id: AttestationId,
    },
    GlobalStatistics,
    ConsensusParameters,
    SafetyState,

    // ── Administration ──────────────────────────────────────────────────
    GrantVerifier {
        identity: Identity,
    },
    RevokeVerifier {
        identity: Identity,
    },
    GrantAdmin {
        identity: Identity,
    },
    RevokeAdmin {
        identity: Identity,
    },
    SetPaused {
        paused: bool,
    },
    SetCircuitBreaker {
        engaged: bool,
    },
    UpdateRegistry {
        registry: RegistryRef,
    },
    UpdateConsensusParameters {
        min_verifications: u32,
        threshold_percent: u32,
    },
}

impl RpcRequest {
    /// The `action` tag, used as a metrics label.
    pub fn action(&self) -> &'static str {
        match self {
            Self::RecordVerification { .. } => "record_verification",
            Self::BatchVerify(_) => "batch_verify",
            Self::UpdateNotes { .. } => "update_notes",
            Self::RevokeVerification { .. } => "revoke_verification",
            Self::Verification { .. } => "verification",
            Self::AttestationVerifications { .. } => "attestation_verifications",
            Self::VerifierHistory { .. } => "verifier_history",
            Self::VerifierReputation { .. } => "verifier_reputation",
            Self::AttestationReputation { .. } => "attestation_reputation",
            Self::ConsensusStatus { .. } => "consensus_status",
            Self::GlobalStatistics => "global_statistics",
            Self::ConsensusParameters => "consensus_parameters",
            Self::SafetyState => "safety_state",
            Self::GrantVerifier { .. } => "grant_verifier",
            Self::RevokeVerifier { .. } => "revoke_verifier",
            Self::GrantAdmin { .. } => "grant_admin",
            Self::RevokeAdmin { .. } => "revoke_admin",
            Self::SetPaused { .. } => "set_paused",
            Self::SetCircuitBreaker { .. } => "set_circuit_breaker",
            Self::UpdateRegistry { .. } => "update_registry",
            Self::UpdateConsensusParameters { .. } => "update_consensus_parameters",
        }
    }

    /// Whether the action can change ledger state.
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Self::Verification { .. }
                | Self::AttestationVerifications { .. }
                | Self::VerifierHistory { .. }
                | Self::VerifierReputation { .. }
                | Self::AttestationReputation { .. }
                | Self::ConsensusStatus { .. }
                | Self::GlobalStatistics
                | Self::ConsensusParameters
                | Self::SafetyState
        )
    }
}

/// Run `request` against `ledger` on behalf of `caller`.
pub fn dispatch(
    ledger: &mut Ledger,
    caller: &Identity,
    request: RpcRequest,
) -> Result<Value, LedgerError> {
    let value = match request {
        RpcRequest::RecordVerification {
            attestation_id,
            confidence,
            notes,
        } => json!(ledger.record_verification(caller, &attestation_id, confidence, notes)?),
        RpcRequest::BatchVerify(batch) => json!(ledger.batch_verify(caller, &batch)?),
        RpcRequest::UpdateNotes {
            verification_id,
            notes,
        } => {
            ledger.update_notes(caller, &verification_id, notes)?;
            json!({ "updated": true })
        }
        RpcRequest::RevokeVerification { verification_id } => {
            ledger.revoke_verification(caller, &verification_id)?;
            json!({ "revoked": true })
        }

        RpcRequest::Verification { verification_id } => {
            let record = ledger.verification(&verification_id)?;
            json!({
                "record": record,
                "effective_validity": record.effective_validity(),
            })
        }
        RpcRequest::AttestationVerifications {
            attestation_id,
            offset,
            limit,
        } => json!(PageResponse::new(
            ledger.verifications_for_attestation(&attestation_id, offset, limit),
            offset,
        )),
        RpcRequest::VerifierHistory {
            verifier,
            offset,
            limit,
        } => json!(PageResponse::new(
            ledger.verifier_history(&verifier, offset, limit),
            offset,
        )),
        RpcRequest::VerifierReputation { verifier } => json!(ledger.verifier_reputation(&verifier)?),
        RpcRequest::AttestationReputation { attestation_id } => {
            json!(ledger.attestation_reputation(&attestation_id)?)
        }
        RpcRequest::ConsensusStatus { attestation_id } => {
            json!(ledger.consensus_status(&attestation_id))
        }
        RpcRequest::GlobalStatistics => json!(ledger.global_statistics()),
        RpcRequest::ConsensusParameters => json!(ledger.consensus_parameters()),
        RpcRequest::SafetyState => json!(ledger.safety_state()),

        RpcRequest::GrantVerifier { identity } => {
            json!({ "changed": ledger.grant_verifier(caller, &identity)? })
        }
        RpcRequest::RevokeVerifier { identity } => {
            json!({ "changed": ledger.revoke_verifier(caller, &identity)? })
        }
        RpcRequest::GrantAdmin { identity } => {
            json!({ "changed": ledger.grant_admin(caller, &identity)? })
        }
        RpcRequest::RevokeAdmin { identity } => {
            json!({ "changed": ledger.revoke_admin(caller, &identity)? })
        }
        RpcRequest::SetPaused { paused } => {
            ledger.set_paused(caller, paused)?;
            json!({ "paused": paused })
        }
        RpcRequest::SetCircuitBreaker { engaged } => {
            ledger.set_circuit_breaker(caller, engaged)?;
            json!({ "circuit_broken": engaged })
        }
        RpcRequest::UpdateRegistry { registry } => {
            let old = ledger.update_registry(caller, registry.clone())?;
            json!({ "old": old, "new": registry })
        }
        RpcRequest::UpdateConsensusParameters {
            min_verifications,
            threshold_percent,
        } => {
            let old = ledger.update_consensus_parameters(caller, min_verifications, threshold_percent)?;
            json!({ "old": old, "new": ledger.consensus_parameters() })
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_requests() {
        let request: RpcRequest = serde_json::from_str(
            r#"{"action":"record_verification","attestation_id":"A1","confidence":80}"#,
        )
        .unwrap();
        assert_eq!(request.action(), "record_verification");
        assert!(request.is_write());

        let request: RpcRequest =
            serde_json::from_str(r#"{"action":"attestation_verifications","attestation_id":"A1"}"#)
                .unwrap();
        assert!(matches!(
            request,
            RpcRequest::AttestationVerifications {
                offset: 0,
                limit: 0,
                ..
            }
        ));
        assert!(!request.is_write());
    }

    #[test]
    fn parses_batch_and_unit_actions() {
        let request: RpcRequest = serde_json::from_str(
            r#"{"action":"batch_verify","attestation_ids":["a","b"],"confidences":[1,2],"notes":["",""]}"#,
        )
        .unwrap();
        match request {
            RpcRequest::BatchVerify(batch) => assert_eq!(batch.len(), 2),
            other => panic!("unexpected request: {other:?}"),
        }
        let request: RpcRequest = serde_json::from_str(r#"{"action":"safety_state"}"#).unwrap();
        assert_eq!(request.action(), "safety_state");
    }

    #[test]
    fn blank_identifiers_are_rejected_at_parse_time() {
        let result: Result<RpcRequest, _> =
            serde_json::from_str(r#"{"action":"grant_verifier","identity":"  "}"#);
        assert!(result.is_err());
    }
}
