//! Encryption to a registered (or future) identity.
//!
//! The encryptor cannot know which level the recipient's cached update
//! currently matches, so the ciphertext carries one component per occupied
//! level of the recipient's block; exactly one of them will line up with
//! the recipient's resolved update.

use crate::block;
use crate::error::RbeError;
use crate::setup::Crs;
use crate::storage::Storage;
use ark_ec::pairing::{Pairing, PairingOutput};
use ark_serialize::*;
use ark_std::{rand::RngCore, UniformRand, Zero};
use tracing::debug;

/// One per-level slice of a ciphertext, produced under its own randomness.
#[derive(CanonicalSerialize, CanonicalDeserialize, Clone, Debug)]
pub struct CiphertextComponent<E: Pairing> {
    /// Level of the block commitment this component was built against.
    pub level: usize,
    /// Copy of that commitment.
    pub ct0: E::G1,
    /// `e(ct0, aux-basis)^rho`
    pub ct1: PairingOutput<E>,
    /// `g2^rho`
    pub ct2: E::G2,
    /// `e(key-basis, aux-basis)^rho * m`
    pub ct3: PairingOutput<E>,
}

/// A ciphertext: one component per level occupied at encryption time.
#[derive(CanonicalSerialize, CanonicalDeserialize, Clone, Debug)]
pub struct Ciphertext<E: Pairing> {
    pub components: Vec<CiphertextComponent<E>>,
}

impl<E: Pairing> Ciphertext<E> {
    /// The component built against the given level, if any.
    pub fn component_for_level(&self, level: usize) -> Option<&CiphertextComponent<E>> {
        self.components.iter().find(|c| c.level == level)
    }
}

/// Encrypts `message` to `id` using only the public block state.
///
/// Levels whose commitment is absent are skipped; a block nobody has
/// registered into yields an empty component list (such a ciphertext can
/// never decrypt, only report staleness).
///
/// # Errors
/// `IdentityOutOfRange` if `id` exceeds the reference string's capacity,
/// plus any storage failure.
pub fn encrypt<E: Pairing, S: Storage<E>, R: RngCore>(
    crs: &Crs<E>,
    storage: &S,
    id: usize,
    message: &PairingOutput<E>,
    rng: &mut R,
) -> Result<Ciphertext<E>, RbeError> {
    if id >= crs.max_users {
        return Err(RbeError::IdentityOutOfRange {
            id,
            max_users: crs.max_users,
        });
    }

    let n = crs.block_size;
    let pos = block::locate(id, n);
    let key_basis = crs.ladder_g1[block::key_basis_index(pos.offset)];
    let aux_basis = crs.ladder_g2[block::aux_basis_index(n, pos.offset)];

    let mut components = Vec::new();
    for level in 0..=crs.max_level() {
        let com = storage.commitment(pos.block, level)?;
        if com.is_zero() {
            continue;
        }

        // Fresh randomness per component; reuse across levels would link
        // the blinded pairing values.
        let rho = E::ScalarField::rand(rng);
        components.push(CiphertextComponent {
            level,
            ct0: com,
            ct1: E::pairing(com, aux_basis) * rho,
            ct2: crs.g2 * rho,
            ct3: E::pairing(key_basis, aux_basis) * rho + *message,
        });
    }

    debug!(id, components = components.len(), "ciphertext assembled");
    Ok(Ciphertext { components })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::register;
    use crate::setup::{setup, SecretKey};
    use crate::storage::MemoryStorage;

    type E = ark_bls12_381::Bls12_381;

    fn populate(crs: &Crs<E>, store: &mut MemoryStorage<E>, users: usize) {
        let mut rng = ark_std::test_rng();
        for id in 0..users {
            let keys = SecretKey::<E>::new(&mut rng).derive_keys(crs, id).unwrap();
            register(crs, store, id, &keys.pk, &keys.helping_values).unwrap();
        }
    }

    #[test]
    fn test_one_component_per_occupied_level() {
        let mut rng = ark_std::test_rng();
        let crs = setup::<E, _>(100, &mut rng).unwrap();
        let mut store = MemoryStorage::<E>::new();
        let msg = crs.random_message(&mut rng);

        // Four users collapse into a single level-2 slot.
        populate(&crs, &mut store, 4);
        let ct = encrypt(&crs, &store, 0, &msg, &mut rng).unwrap();
        assert_eq!(ct.components.len(), 1);
        assert_eq!(ct.components[0].level, 2);

        // A fifth user reopens level 0: five = 0b101.
        populate(&crs, &mut store, 5);
        let ct = encrypt(&crs, &store, 0, &msg, &mut rng).unwrap();
        let levels: Vec<usize> = ct.components.iter().map(|c| c.level).collect();
        assert_eq!(levels, vec![0, 2]);
    }

    #[test]
    fn test_components_use_independent_randomness() {
        let mut rng = ark_std::test_rng();
        let crs = setup::<E, _>(100, &mut rng).unwrap();
        let mut store = MemoryStorage::<E>::new();
        populate(&crs, &mut store, 5);

        let msg = crs.random_message(&mut rng);
        let ct = encrypt(&crs, &store, 0, &msg, &mut rng).unwrap();
        assert_eq!(ct.components.len(), 2);
        assert_ne!(ct.components[0].ct2, ct.components[1].ct2);
    }

    #[test]
    fn test_empty_block_yields_empty_ciphertext() {
        let mut rng = ark_std::test_rng();
        let crs = setup::<E, _>(100, &mut rng).unwrap();
        let store = MemoryStorage::<E>::new();
        let msg = crs.random_message(&mut rng);

        let ct = encrypt(&crs, &store, 0, &msg, &mut rng).unwrap();
        assert!(ct.components.is_empty());
    }
}
