//! Update resolution: find where an identity's update currently lives.
//!
//! Merges move a registrant's update between levels, so the level a user
//! cached yesterday may hold nothing today. Resolution scans the same level
//! range encryption does and returns the first level with a stored update
//! for the identity's row.

use crate::error::RbeError;
use crate::setup::Crs;
use crate::storage::Storage;
use ark_ec::pairing::Pairing;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

/// A transient snapshot of one identity's update: the level it was found at
/// and the aggregated update point stored there.
#[derive(CanonicalSerialize, CanonicalDeserialize, Clone, Debug)]
pub struct UpdateInfo<E: Pairing> {
    pub level: usize,
    pub update: E::G1,
}

/// Resolves the current update for `id`, or `None` if no level holds one.
///
/// `None` for a registered identity is a fatal inconsistency — a registered
/// user always has an update somewhere — and must not be silently
/// swallowed; decryption surfaces it as a staleness failure.
///
/// # Errors
/// `IdentityOutOfRange` if `id` exceeds the reference string's capacity,
/// plus any storage failure.
pub fn resolve_update<E: Pairing, S: Storage<E>>(
    crs: &Crs<E>,
    storage: &S,
    id: usize,
) -> Result<Option<UpdateInfo<E>>, RbeError> {
    if id >= crs.max_users {
        return Err(RbeError::IdentityOutOfRange {
            id,
            max_users: crs.max_users,
        });
    }

    // The identity's own row id is the identity itself.
    for level in 0..=crs.max_level() {
        if storage.has_update(id, level)? {
            return Ok(Some(UpdateInfo {
                level,
                update: storage.update(id, level)?,
            }));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::register;
    use crate::setup::{setup, SecretKey};
    use crate::storage::MemoryStorage;
    use ark_std::Zero;

    type E = ark_bls12_381::Bls12_381;

    #[test]
    fn test_unregistered_block_resolves_to_none() {
        let mut rng = ark_std::test_rng();
        let crs = setup::<E, _>(100, &mut rng).unwrap();
        let store = MemoryStorage::<E>::new();
        assert!(resolve_update(&crs, &store, 0).unwrap().is_none());
    }

    #[test]
    fn test_resolution_tracks_merges() {
        let mut rng = ark_std::test_rng();
        let crs = setup::<E, _>(100, &mut rng).unwrap();
        let mut store = MemoryStorage::<E>::new();

        let keys0 = SecretKey::<E>::new(&mut rng).derive_keys(&crs, 0).unwrap();
        register(&crs, &mut store, 0, &keys0.pk, &keys0.helping_values).unwrap();

        // Sole registrant: level 0, and the update is the identity element
        // because nobody else has contributed to this row yet.
        let info = resolve_update(&crs, &store, 0).unwrap().unwrap();
        assert_eq!(info.level, 0);
        assert!(info.update.is_zero());

        let keys1 = SecretKey::<E>::new(&mut rng).derive_keys(&crs, 1).unwrap();
        register(&crs, &mut store, 1, &keys1.pk, &keys1.helping_values).unwrap();

        let info = resolve_update(&crs, &store, 0).unwrap().unwrap();
        assert_eq!(info.level, 1);
        assert_eq!(info.update, keys1.helping_values[0]);
    }
}
