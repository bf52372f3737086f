//! Registration-Based Encryption
//!
//! This library implements registration-based encryption (RBE) in the style
//! of [ePrint:2018/919](https://eprint.iacr.org/2018/919): public-key
//! encryption with no trusted key-issuing authority. Users generate their
//! own keys and register them through a public, non-interactive process;
//! anyone can encrypt to an identity from public state alone; a registered
//! user periodically fetches a small update value to keep decrypting as
//! other identities register.
//!
//! ## Overview
//!
//! The identity space of size `N` is partitioned into blocks of
//! `n = ceil(sqrt(N))` identities. Each block maintains a binary counter of
//! "levels": registering into a block merges key material upward, carry by
//! carry, so a block with `m` registrants occupies exactly the levels of
//! `m`'s set bits and each registration costs `O(log n)` group operations
//! amortized. Ciphertexts carry one component per occupied level, and a
//! recipient whose cached update went stale always detects it — decryption
//! either verifies and returns the message or reports `NeedUpdate`.
//!
//! ## Key Components
//!
//! - **Setup**: build the common reference string (hashed generators plus a
//!   trapdoor ladder with an intentional gap at index `n + 1`)
//! - **Key Generation**: derive a secret key, public key and helping values
//! - **Registration**: the per-block level-merge engine
//! - **Encryption / Update Resolution / Decryption**: the multi-level
//!   protocol over the public block state
//!
//! ## Example
//!
//! ```rust,no_run
//! use ark_bls12_381::Bls12_381;
//! use registration_based_encryption::{
//!     decryption::{decrypt, DecryptOutcome},
//!     encryption::encrypt,
//!     registration::register,
//!     setup::{setup, SecretKey},
//!     storage::MemoryStorage,
//!     update::resolve_update,
//! };
//!
//! type E = Bls12_381;
//!
//! let mut rng = ark_std::test_rng();
//! let crs = setup::<E, _>(100, &mut rng).unwrap();
//! let mut store = MemoryStorage::<E>::new();
//!
//! // A user self-generates keys and registers.
//! let sk = SecretKey::<E>::new(&mut rng);
//! let keys = sk.derive_keys(&crs, 0).unwrap();
//! register(&crs, &mut store, 0, &keys.pk, &keys.helping_values).unwrap();
//!
//! // Anyone encrypts to the identity from public state.
//! let msg = crs.random_message(&mut rng);
//! let ct = encrypt(&crs, &store, 0, &msg, &mut rng).unwrap();
//!
//! // The user resolves their current update and decrypts.
//! let info = resolve_update(&crs, &store, 0).unwrap();
//! match decrypt(&crs, 0, &sk, info.as_ref(), &ct).unwrap() {
//!     DecryptOutcome::Success { message } => assert_eq!(message, msg),
//!     DecryptOutcome::NeedUpdate => unreachable!("freshly resolved"),
//! }
//! ```

pub mod block;
pub mod decryption;
pub mod encryption;
pub mod error;
pub mod registration;
pub mod security;
pub mod setup;
pub mod storage;
pub mod update;

pub use error::RbeError;
