//! Memory hygiene for secret scalars.
//!
//! Two scalars in this scheme must never outlive their use: the setup
//! trapdoor (the "toxic waste" that builds the ladder) and each user's
//! secret key. Arkworks field elements do not implement [`Zeroize`]
//! themselves, so this wrapper overwrites the value with zero on drop and
//! keeps it out of `Debug` output.

use ark_ff::Field;
use ark_serialize::{
    CanonicalDeserialize, CanonicalSerialize, Compress, Read, SerializationError, Valid, Validate,
    Write,
};
use ark_std::rand::RngCore;
use ark_std::{UniformRand, Zero};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A scalar field element that is zeroized when dropped.
#[derive(Clone)]
pub struct SensitiveScalar<F: Field> {
    value: F,
}

impl<F: Field> SensitiveScalar<F> {
    pub fn new(value: F) -> Self {
        Self { value }
    }

    /// Samples a fresh non-zero scalar.
    pub fn rand<R: RngCore>(rng: &mut R) -> Self {
        let mut value = F::rand(rng);
        while value.is_zero() {
            value = F::rand(rng);
        }
        Self { value }
    }

    /// Grants read access to the wrapped scalar. The caller must not copy it
    /// anywhere that outlives the wrapper.
    pub fn expose_secret(&self) -> &F {
        &self.value
    }
}

impl<F: Field> Zeroize for SensitiveScalar<F> {
    fn zeroize(&mut self) {
        // Field elements carry no raw-byte access, overwriting with the
        // additive identity is the strongest erase available.
        self.value = F::zero();
    }
}

impl<F: Field> ZeroizeOnDrop for SensitiveScalar<F> {}

impl<F: Field> Drop for SensitiveScalar<F> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<F: Field> fmt::Debug for SensitiveScalar<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SensitiveScalar(<redacted>)")
    }
}

impl<F: Field> CanonicalSerialize for SensitiveScalar<F> {
    fn serialize_with_mode<W: Write>(
        &self,
        mut writer: W,
        compress: Compress,
    ) -> Result<(), SerializationError> {
        self.value.serialize_with_mode(&mut writer, compress)
    }

    fn serialized_size(&self, compress: Compress) -> usize {
        self.value.serialized_size(compress)
    }
}

impl<F: Field> CanonicalDeserialize for SensitiveScalar<F> {
    fn deserialize_with_mode<R: Read>(
        mut reader: R,
        compress: Compress,
        validate: Validate,
    ) -> Result<Self, SerializationError> {
        let value = F::deserialize_with_mode(&mut reader, compress, validate)?;
        Ok(SensitiveScalar::new(value))
    }
}

impl<F: Field> Valid for SensitiveScalar<F> {
    fn check(&self) -> Result<(), SerializationError> {
        self.value.check()
    }
}
