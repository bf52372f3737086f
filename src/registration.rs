//! Registration: the per-block level-merge engine.
//!
//! Each block keeps a binary counter of occupied levels. A new registrant
//! starts as a pending entry at level 0 and carry-propagates upward: every
//! occupied level it meets is folded into the pending entry (group addition
//! of the commitment and of all `n` update-vector positions) and cleared,
//! until an empty level absorbs the whole entry. Registering the m-th user
//! of a block therefore costs one merge pass per carry — amortized
//! `O(log n)` group operations, worst case `O(n)` when the counter rolls
//! over from `2^k - 1` to `2^k`.

use crate::block;
use crate::error::RbeError;
use crate::setup::Crs;
use crate::storage::Storage;
use ark_ec::pairing::Pairing;
use ark_serialize::CanonicalSerialize;
use ark_std::Zero;
use tracing::debug;

/// What a registration attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The identity's aggregate settled at this level.
    Settled { level: usize },
    /// The identity was already registered; nothing changed.
    AlreadyRegistered,
}

/// Registers `id` with its public key and helping values.
///
/// Re-registering an already-registered identity is a reported no-op, not
/// an error. The cascade only ever touches rows of `id`'s own block.
///
/// Concurrency contract: a registration is a multi-step read-modify-write
/// over several storage rows. Concurrent registrations into the same block
/// must be serialized by the caller (per-block mutual exclusion or a
/// transaction), or carries can be lost; distinct blocks need no
/// coordination. Readers must not observe a block mid-cascade. A storage
/// failure mid-cascade propagates without retry; wrap the call
/// transactionally if the backend can fail partway.
///
/// # Errors
/// `IdentityOutOfRange` for an id beyond the reference string's capacity,
/// `InvalidParameter` for a helping-value vector of the wrong length, and
/// any storage failure.
pub fn register<E: Pairing, S: Storage<E>>(
    crs: &Crs<E>,
    storage: &mut S,
    id: usize,
    pk: &E::G1,
    helping_values: &[E::G1],
) -> Result<RegistrationOutcome, RbeError> {
    if id >= crs.max_users {
        return Err(RbeError::IdentityOutOfRange {
            id,
            max_users: crs.max_users,
        });
    }
    let n = crs.block_size;
    if helping_values.len() != n {
        return Err(RbeError::InvalidParameter(format!(
            "helping-value vector has length {}, block size is {}",
            helping_values.len(),
            n
        )));
    }

    if storage.is_registered(id)? {
        debug!(id, "identity already registered, skipping");
        return Ok(RegistrationOutcome::AlreadyRegistered);
    }
    storage.save_public_key(id, pk)?;

    let pos = block::locate(id, n);

    let mut pending_com = *pk;
    let mut pending_aux = helping_values.to_vec();
    // The submitter never contributes to their own row, whatever they sent.
    pending_aux[pos.offset] = E::G1::zero();
    let mut pending_count: u64 = 1;

    let mut level = 0;
    loop {
        if storage.occupancy(pos.block, level)? == 0 {
            // Empty slot: settle here. Every position gets its update row,
            // occupied or not — positions that register later at this level
            // consume the vector symmetrically.
            storage.save_commitment(pos.block, level, &pending_com)?;
            for (offset, aux) in pending_aux.iter().enumerate() {
                storage.save_update(block::row(pos.block, n, offset), level, aux)?;
            }
            storage.set_occupancy(pos.block, level, pending_count)?;
            debug!(
                id,
                block = pos.block,
                level,
                aggregated = pending_count,
                commitment = %fingerprint(&pending_com),
                "registration settled"
            );
            return Ok(RegistrationOutcome::Settled { level });
        }

        // Collision: fold the occupied slot into the pending entry and
        // clear it, then carry one level up.
        debug!(id, block = pos.block, level, "level collision, merging");
        pending_com += storage.commitment(pos.block, level)?;
        pending_count += storage.occupancy(pos.block, level)?;
        for offset in 0..n {
            let row = block::row(pos.block, n, offset);
            pending_aux[offset] += storage.update(row, level)?;
            storage.delete_update(row, level)?;
        }
        storage.delete_commitment(pos.block, level)?;
        storage.set_occupancy(pos.block, level, 0)?;

        level += 1;
    }
}

/// Short hex digest of a group element for log output.
fn fingerprint<T: CanonicalSerialize>(value: &T) -> String {
    let mut bytes = Vec::new();
    match value.serialize_compressed(&mut bytes) {
        Ok(()) => hex::encode(&bytes[..bytes.len().min(8)]),
        Err(_) => "<unserializable>".to_string(),
    }
}
