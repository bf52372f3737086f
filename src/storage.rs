//! Storage abstraction for the public registration state.
//!
//! The core consumes exactly this capability set; swapping the in-memory
//! implementation for a durable table store changes nothing above this seam.
//! Group elements are persisted in their compact serialized form. Reads of
//! absent commitment or update rows return the identity element, while
//! occupancy of absent slots reads as zero — the same conventions a keyed
//! table gives naturally.

use crate::error::RbeError;
use ark_ec::pairing::Pairing;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::Zero;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Capability set the registration, encryption and update-resolution
/// engines require from a backend. All operations are fallible; failures
/// propagate to the caller without internal retry.
pub trait Storage<E: Pairing> {
    fn is_registered(&self, id: usize) -> Result<bool, RbeError>;
    fn save_public_key(&mut self, id: usize, pk: &E::G1) -> Result<(), RbeError>;

    /// Commitment of `(block, level)`; identity element if absent.
    fn commitment(&self, block: usize, level: usize) -> Result<E::G1, RbeError>;
    fn save_commitment(&mut self, block: usize, level: usize, com: &E::G1) -> Result<(), RbeError>;
    fn delete_commitment(&mut self, block: usize, level: usize) -> Result<(), RbeError>;

    /// Update point of `(row, level)`; identity element if absent.
    fn update(&self, row: usize, level: usize) -> Result<E::G1, RbeError>;
    fn save_update(&mut self, row: usize, level: usize, upd: &E::G1) -> Result<(), RbeError>;
    fn delete_update(&mut self, row: usize, level: usize) -> Result<(), RbeError>;

    /// Whether `(row, level)` holds a stored update. This is a presence
    /// check, not a non-identity check: a sole registrant's update is
    /// legitimately the identity element.
    fn has_update(&self, row: usize, level: usize) -> Result<bool, RbeError>;

    /// Number of registrants aggregated at `(block, level)`; zero if the
    /// slot is unoccupied.
    fn occupancy(&self, block: usize, level: usize) -> Result<u64, RbeError>;
    fn set_occupancy(&mut self, block: usize, level: usize, count: u64) -> Result<(), RbeError>;
}

/// Map-backed storage mirroring the persisted table layout: one table keyed
/// by id for public keys, two keyed by `(block-or-row, level)` for
/// commitments and updates, and one occupancy table.
#[derive(Debug, Clone)]
pub struct MemoryStorage<E: Pairing> {
    public_keys: BTreeMap<usize, Vec<u8>>,
    commitments: BTreeMap<(usize, usize), Vec<u8>>,
    updates: BTreeMap<(usize, usize), Vec<u8>>,
    occupancy: BTreeMap<(usize, usize), u64>,
    _pairing: PhantomData<E>,
}

impl<E: Pairing> MemoryStorage<E> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: Pairing> Default for MemoryStorage<E> {
    fn default() -> Self {
        Self {
            public_keys: BTreeMap::new(),
            commitments: BTreeMap::new(),
            updates: BTreeMap::new(),
            occupancy: BTreeMap::new(),
            _pairing: PhantomData,
        }
    }
}

impl<E: Pairing> PartialEq for MemoryStorage<E> {
    fn eq(&self, other: &Self) -> bool {
        self.public_keys == other.public_keys
            && self.commitments == other.commitments
            && self.updates == other.updates
            && self.occupancy == other.occupancy
    }
}

impl<E: Pairing> Eq for MemoryStorage<E> {}

fn encode<T: CanonicalSerialize>(value: &T) -> Result<Vec<u8>, RbeError> {
    let mut bytes = Vec::new();
    value.serialize_compressed(&mut bytes)?;
    Ok(bytes)
}

fn decode<T: CanonicalDeserialize>(bytes: &[u8]) -> Result<T, RbeError> {
    Ok(T::deserialize_compressed(bytes)?)
}

impl<E: Pairing> Storage<E> for MemoryStorage<E> {
    fn is_registered(&self, id: usize) -> Result<bool, RbeError> {
        Ok(self.public_keys.contains_key(&id))
    }

    fn save_public_key(&mut self, id: usize, pk: &E::G1) -> Result<(), RbeError> {
        self.public_keys.insert(id, encode(pk)?);
        Ok(())
    }

    fn commitment(&self, block: usize, level: usize) -> Result<E::G1, RbeError> {
        match self.commitments.get(&(block, level)) {
            Some(bytes) => decode(bytes),
            None => Ok(E::G1::zero()),
        }
    }

    fn save_commitment(&mut self, block: usize, level: usize, com: &E::G1) -> Result<(), RbeError> {
        self.commitments.insert((block, level), encode(com)?);
        Ok(())
    }

    fn delete_commitment(&mut self, block: usize, level: usize) -> Result<(), RbeError> {
        self.commitments.remove(&(block, level));
        Ok(())
    }

    fn update(&self, row: usize, level: usize) -> Result<E::G1, RbeError> {
        match self.updates.get(&(row, level)) {
            Some(bytes) => decode(bytes),
            None => Ok(E::G1::zero()),
        }
    }

    fn save_update(&mut self, row: usize, level: usize, upd: &E::G1) -> Result<(), RbeError> {
        self.updates.insert((row, level), encode(upd)?);
        Ok(())
    }

    fn delete_update(&mut self, row: usize, level: usize) -> Result<(), RbeError> {
        self.updates.remove(&(row, level));
        Ok(())
    }

    fn has_update(&self, row: usize, level: usize) -> Result<bool, RbeError> {
        Ok(self.updates.contains_key(&(row, level)))
    }

    fn occupancy(&self, block: usize, level: usize) -> Result<u64, RbeError> {
        Ok(self.occupancy.get(&(block, level)).copied().unwrap_or(0))
    }

    fn set_occupancy(&mut self, block: usize, level: usize, count: u64) -> Result<(), RbeError> {
        if count == 0 {
            self.occupancy.remove(&(block, level));
        } else {
            self.occupancy.insert((block, level), count);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ec::PrimeGroup;
    use ark_std::UniformRand;

    type E = ark_bls12_381::Bls12_381;
    type G1 = <E as Pairing>::G1;
    type Fr = <E as Pairing>::ScalarField;

    #[test]
    fn test_absent_rows_read_as_identity() {
        let store = MemoryStorage::<E>::new();
        assert!(store.commitment(3, 1).unwrap().is_zero());
        assert!(store.update(42, 0).unwrap().is_zero());
        assert!(!store.has_update(42, 0).unwrap());
        assert_eq!(store.occupancy(3, 1).unwrap(), 0);
        assert!(!store.is_registered(7).unwrap());
    }

    #[test]
    fn test_commitment_round_trip_and_delete() {
        let mut rng = ark_std::test_rng();
        let mut store = MemoryStorage::<E>::new();
        let point = G1::generator() * Fr::rand(&mut rng);

        store.save_commitment(0, 2, &point).unwrap();
        assert_eq!(store.commitment(0, 2).unwrap(), point);

        store.delete_commitment(0, 2).unwrap();
        assert!(store.commitment(0, 2).unwrap().is_zero());
    }

    #[test]
    fn test_identity_update_is_present_after_save() {
        // The identity element is a legitimate stored update; presence must
        // be distinguishable from absence.
        let mut store = MemoryStorage::<E>::new();
        store.save_update(5, 1, &G1::zero()).unwrap();
        assert!(store.has_update(5, 1).unwrap());
        assert!(store.update(5, 1).unwrap().is_zero());

        store.delete_update(5, 1).unwrap();
        assert!(!store.has_update(5, 1).unwrap());
    }

    #[test]
    fn test_occupancy_zero_clears_slot() {
        let mut store = MemoryStorage::<E>::new();
        store.set_occupancy(1, 3, 4).unwrap();
        assert_eq!(store.occupancy(1, 3).unwrap(), 4);

        store.set_occupancy(1, 3, 0).unwrap();
        assert_eq!(store.occupancy(1, 3).unwrap(), 0);

        let empty = MemoryStorage::<E>::new();
        assert_eq!(store, empty);
    }

    #[test]
    fn test_registration_flag() {
        let mut rng = ark_std::test_rng();
        let mut store = MemoryStorage::<E>::new();
        let pk = G1::generator() * Fr::rand(&mut rng);
        store.save_public_key(9, &pk).unwrap();
        assert!(store.is_registered(9).unwrap());
    }
}
