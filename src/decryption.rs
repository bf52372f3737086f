//! Decryption: match a ciphertext component to the caller's resolved
//! update, verify, and recover the message.
//!
//! Every way a ciphertext can fail to line up with the caller's current
//! state — missing update, no component at the resolved level, a level
//! match with different block membership — is reported as [`NeedUpdate`],
//! never a panic and never a silently wrong message. On `NeedUpdate` the
//! caller re-runs update resolution and retries once; a second `NeedUpdate`
//! after a fresh resolution means a registration raced the decrypt attempt
//! or state is genuinely inconsistent, and should be surfaced rather than
//! retried forever.
//!
//! [`NeedUpdate`]: DecryptOutcome::NeedUpdate

use crate::block;
use crate::encryption::Ciphertext;
use crate::error::RbeError;
use crate::setup::{Crs, SecretKey};
use crate::update::UpdateInfo;
use ark_ec::pairing::{Pairing, PairingOutput};
use ark_ff::Field;

/// Result of a decryption attempt.
#[derive(Debug, Clone)]
pub enum DecryptOutcome<E: Pairing> {
    /// Verification passed; the recovered message.
    Success { message: PairingOutput<E> },
    /// The ciphertext could not be matched against the caller's current
    /// update; re-resolve and retry.
    NeedUpdate,
}

impl<E: Pairing> DecryptOutcome<E> {
    pub fn needs_update(&self) -> bool {
        matches!(self, DecryptOutcome::NeedUpdate)
    }
}

/// Attempts to decrypt `ct` for `id` using a previously resolved update.
///
/// Pass `None` when update resolution returned the missing-update sentinel;
/// it is reported as `NeedUpdate` like every other staleness case.
///
/// # Errors
/// Only configuration faults (`IdentityOutOfRange`, a zero secret scalar)
/// reach the error channel; staleness never does.
pub fn decrypt<E: Pairing>(
    crs: &Crs<E>,
    id: usize,
    sk: &SecretKey<E>,
    update: Option<&UpdateInfo<E>>,
    ct: &Ciphertext<E>,
) -> Result<DecryptOutcome<E>, RbeError> {
    if id >= crs.max_users {
        return Err(RbeError::IdentityOutOfRange {
            id,
            max_users: crs.max_users,
        });
    }

    let Some(update) = update else {
        return Ok(DecryptOutcome::NeedUpdate);
    };
    let Some(component) = ct.component_for_level(update.level) else {
        // The cached level and the ciphertext's view of the block disagree.
        return Ok(DecryptOutcome::NeedUpdate);
    };

    let n = crs.block_size;
    let pos = block::locate(id, n);
    let aux_basis = crs.ladder_g2[block::aux_basis_index(n, pos.offset)];
    let scalar = sk.scalar();
    let pk = crs.ladder_g1[block::key_basis_index(pos.offset)] * *scalar;

    // e(ct0, aux) must decompose into the update's share and our own:
    // e(ct0, aux) = e(update, g2) * e(pk, aux). A coincidental level match
    // with different membership fails here.
    let lhs = E::pairing(component.ct0, aux_basis);
    let rhs = E::pairing(update.update, crs.g2) + E::pairing(pk, aux_basis);
    if lhs != rhs {
        return Ok(DecryptOutcome::NeedUpdate);
    }

    let sk_inv = scalar
        .inverse()
        .ok_or_else(|| RbeError::InvalidParameter("secret key scalar is zero".to_string()))?;

    // Strip the other registrants' share from ct1, unblind with sk^-1 and
    // peel the mask off ct3.
    let own_share = component.ct1 - E::pairing(update.update, component.ct2);
    let mask = own_share * sk_inv;
    let message = component.ct3 - mask;

    Ok(DecryptOutcome::Success { message })
}
