//! Reference-string setup and user key generation.
//!
//! `setup` builds the global public reference string: two deterministically
//! derived generators and a scalar-power "ladder" over both source groups,
//! with the index `n + 1` slot intentionally left as the identity element.
//! The trapdoor behind the ladder is destroyed before `setup` returns.
//!
//! `SecretKey::derive_keys` is the per-user half: it produces the public key
//! and the vector of helping values a user submits when registering.

use crate::block;
use crate::error::RbeError;
use crate::security::SensitiveScalar;
use ark_ec::pairing::{Pairing, PairingOutput};
use ark_ec::PrimeGroup;
use ark_ff::PrimeField;
use ark_serialize::*;
use ark_std::{rand::RngCore, One, UniformRand, Zero};
use blake2::{Blake2b512, Digest};
use rayon::prelude::*;

/// Domain-separation strings for generator derivation. Any two setups using
/// the same strings agree on the generators; only the ladder differs.
const GENERATOR_G1_DOMAIN: &[u8] = b"rbe-crs-v1:generator-g1";
const GENERATOR_G2_DOMAIN: &[u8] = b"rbe-crs-v1:generator-g2";

/// The common reference string: capacity, generators and both ladders.
///
/// Ladders are 1-based: `ladder[i] = g^(z^i)` for `i in 1..=2n`, where `z`
/// is the setup trapdoor. Index `0` and index `n + 1` hold the identity
/// element; the `n + 1` gap is the self-contribution basis and prevents two
/// block positions from combining their key material into a third's key.
#[derive(CanonicalSerialize, CanonicalDeserialize, Clone, Debug)]
pub struct Crs<E: Pairing> {
    /// Maximum number of identities `N`.
    pub max_users: usize,
    /// Block size `n = ceil(sqrt(N))`.
    pub block_size: usize,
    /// G1 generator, derived by hashing a fixed domain string.
    pub g1: E::G1,
    /// G2 generator, derived by hashing a fixed domain string.
    pub g2: E::G2,
    /// `2n + 1` entries, `ladder_g1[i] = g1^(z^i)`, gaps at `0` and `n + 1`.
    pub ladder_g1: Vec<E::G1>,
    /// `2n + 1` entries, `ladder_g2[i] = g2^(z^i)`, gaps at `0` and `n + 1`.
    pub ladder_g2: Vec<E::G2>,
}

/// Builds the reference string for up to `max_users` identities.
///
/// The trapdoor scalar and its powers exist only inside this function; both
/// are zeroized before it returns.
///
/// # Errors
/// Returns `InvalidParameter` if `max_users` is zero.
pub fn setup<E: Pairing, R: RngCore>(max_users: usize, rng: &mut R) -> Result<Crs<E>, RbeError> {
    let n = block::block_size_for(max_users);
    if n == 0 {
        return Err(RbeError::InvalidParameter(
            "max identity count must be at least 1".to_string(),
        ));
    }

    let g1 = E::G1::generator() * hash_to_scalar::<E::ScalarField>(GENERATOR_G1_DOMAIN);
    let g2 = E::G2::generator() * hash_to_scalar::<E::ScalarField>(GENERATOR_G2_DOMAIN);

    let trapdoor = SensitiveScalar::<E::ScalarField>::rand(rng);
    let z = trapdoor.expose_secret();

    let limit = 2 * n;
    let mut z_pows = vec![E::ScalarField::zero(); limit + 1];
    let mut cur = E::ScalarField::one();
    for i in 1..=limit {
        cur *= z;
        if i != block::gap_index(n) {
            z_pows[i] = cur;
        }
    }

    // z_pows[0] and z_pows[n + 1] are zero, so both gap slots come out as
    // the identity element.
    let mut ladder_g1 = vec![E::G1::zero(); limit + 1];
    ladder_g1.par_iter_mut().enumerate().for_each(|(i, slot)| {
        *slot = g1 * z_pows[i];
    });

    let mut ladder_g2 = vec![E::G2::zero(); limit + 1];
    ladder_g2.par_iter_mut().enumerate().for_each(|(i, slot)| {
        *slot = g2 * z_pows[i];
    });

    // The ladder exponents are toxic waste once committed to the group.
    cur = E::ScalarField::zero();
    z_pows.iter_mut().for_each(|p| *p = cur);

    Ok(Crs {
        max_users,
        block_size: n,
        g1,
        g2,
        ladder_g1,
        ladder_g2,
    })
}

impl<E: Pairing> Crs<E> {
    /// Samples a random element of the message space `GT`.
    pub fn random_message<R: RngCore>(&self, rng: &mut R) -> PairingOutput<E> {
        E::pairing(self.g1, self.g2) * E::ScalarField::rand(rng)
    }

    /// Highest level encryption and update resolution will scan.
    pub fn max_level(&self) -> usize {
        block::max_level(self.block_size)
    }
}

/// A user's secret scalar. Zeroized on drop.
#[derive(CanonicalSerialize, CanonicalDeserialize, Clone, Debug)]
pub struct SecretKey<E: Pairing> {
    sk: SensitiveScalar<E::ScalarField>,
}

/// Public key material a user submits when registering: the key point and
/// one helping value per position of the user's block, with the user's own
/// position forced to the identity element.
#[derive(CanonicalSerialize, CanonicalDeserialize, Clone, Debug)]
pub struct UserKeys<E: Pairing> {
    pub id: usize,
    pub pk: E::G1,
    pub helping_values: Vec<E::G1>,
}

impl<E: Pairing> SecretKey<E> {
    /// Samples a fresh secret key.
    pub fn new<R: RngCore>(rng: &mut R) -> Self {
        SecretKey {
            sk: SensitiveScalar::rand(rng),
        }
    }

    pub(crate) fn scalar(&self) -> &E::ScalarField {
        self.sk.expose_secret()
    }

    /// Derives the registration material for `id`.
    ///
    /// The public key is `ladder_g1[r + 1]^sk` for relative offset `r`, and
    /// the helping value for every other position `p` of the block is
    /// `ladder_g1[n + 1 + r - p]^sk`. Position `r` itself stays the identity
    /// element (self-exclusion).
    ///
    /// # Errors
    /// Returns `IdentityOutOfRange` if `id` exceeds the reference string's
    /// capacity, and `LadderIndex` if a derived index falls outside the
    /// ladder — the latter signals a misconfigured `(N, n)` pair and is not
    /// a runtime condition to recover from.
    pub fn derive_keys(&self, crs: &Crs<E>, id: usize) -> Result<UserKeys<E>, RbeError> {
        if id >= crs.max_users {
            return Err(RbeError::IdentityOutOfRange {
                id,
                max_users: crs.max_users,
            });
        }

        let n = crs.block_size;
        let pos = block::locate(id, n);
        let sk = self.sk.expose_secret();

        let pk = checked_ladder_entry(&crs.ladder_g1, block::key_basis_index(pos.offset))? * *sk;

        let mut helping_values = vec![E::G1::zero(); n];
        for target in 0..n {
            if target == pos.offset {
                continue;
            }
            let index = block::helping_index(n, pos.offset, target);
            helping_values[target] = checked_ladder_entry(&crs.ladder_g1, index)? * *sk;
        }

        Ok(UserKeys {
            id,
            pk,
            helping_values,
        })
    }
}

fn checked_ladder_entry<G: Copy>(ladder: &[G], index: usize) -> Result<G, RbeError> {
    ladder.get(index).copied().ok_or(RbeError::LadderIndex {
        index,
        len: ladder.len(),
    })
}

fn hash_to_scalar<F: PrimeField>(domain: &[u8]) -> F {
    let mut hasher = Blake2b512::new();
    hasher.update(domain);
    F::from_le_bytes_mod_order(hasher.finalize().as_slice())
}
