//! Plaintext evaluator for tests
//!
//! Keeps the cleartext behind every handle it hands out so tests can
//! decrypt results. Arithmetic mirrors the ciphertext semantics: `add`,
//! `sub` and `mul_scalar` wrap modulo 2^64.

use std::collections::HashMap;

use anchor_lang::prelude::*;

use super::{stamp, AclKind, Ebool, Euint64, ExternalEuint64, FheBackend, FheType};
use crate::error::LendingError;

struct PendingInput {
    value: u64,
    owner: Pubkey,
    proof: Vec<u8>,
}

#[derive(Default)]
pub struct MockFhe {
    next_id: u64,
    values: HashMap<[u8; 32], u64>,
    inputs: HashMap<[u8; 32], PendingInput>,
    grants: Vec<([u8; 32], Pubkey, AclKind)>,
}

impl MockFhe {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(&mut self, fhe_type: FheType) -> [u8; 32] {
        self.next_id += 1;
        let mut digest = [0u8; 32];
        digest[0] = 0xfe;
        digest[1..9].copy_from_slice(&self.next_id.to_le_bytes());
        stamp(digest, fhe_type)
    }

    fn bind(&mut self, value: u64, fhe_type: FheType) -> [u8; 32] {
        let handle = self.fresh(fhe_type);
        self.values.insert(handle, value);
        handle
    }

    fn value(&self, handle: &[u8; 32]) -> u64 {
        if *handle == [0u8; 32] {
            return 0;
        }
        match self.values.get(handle) {
            Some(value) => *value,
            None => panic!("unknown handle {:?}", &handle[0..9]),
        }
    }

    /// Client-side encryption: returns the input handle and its proof
    pub fn encrypt_input(&mut self, value: u64, owner: &Pubkey) -> (ExternalEuint64, Vec<u8>) {
        let handle = self.fresh(FheType::Uint64);
        let mut proof = owner.to_bytes().to_vec();
        proof.extend_from_slice(&handle[1..9]);
        self.inputs.insert(
            handle,
            PendingInput {
                value,
                owner: *owner,
                proof: proof.clone(),
            },
        );
        (ExternalEuint64(handle), proof)
    }

    pub fn decrypt(&self, handle: Euint64) -> u64 {
        self.value(&handle.0)
    }

    pub fn decrypt_bool(&self, handle: Ebool) -> bool {
        self.value(&handle.0) != 0
    }

    pub fn is_allowed(&self, handle: Euint64, account: &Pubkey) -> bool {
        self.has_grant(handle, account, AclKind::Persistent)
    }

    pub fn is_transiently_allowed(&self, handle: Euint64, account: &Pubkey) -> bool {
        self.has_grant(handle, account, AclKind::Transient)
    }

    pub fn is_public(&self, handle: Euint64) -> bool {
        self.grants
            .iter()
            .any(|(h, _, kind)| *h == handle.0 && *kind == AclKind::PublicDecrypt)
    }

    fn has_grant(&self, handle: Euint64, account: &Pubkey, kind: AclKind) -> bool {
        self.grants
            .iter()
            .any(|(h, a, k)| *h == handle.0 && a == account && *k == kind)
    }
}

impl FheBackend for MockFhe {
    fn trivial_encrypt(&mut self, value: u64) -> Euint64 {
        Euint64(self.bind(value, FheType::Uint64))
    }

    fn trivial_encrypt_bool(&mut self, value: bool) -> Ebool {
        Ebool(self.bind(value as u64, FheType::Bool))
    }

    fn add(&mut self, lhs: Euint64, rhs: Euint64) -> Euint64 {
        let value = self.value(&lhs.0).wrapping_add(self.value(&rhs.0));
        Euint64(self.bind(value, FheType::Uint64))
    }

    fn sub(&mut self, lhs: Euint64, rhs: Euint64) -> Euint64 {
        let value = self.value(&lhs.0).wrapping_sub(self.value(&rhs.0));
        Euint64(self.bind(value, FheType::Uint64))
    }

    fn mul_scalar(&mut self, lhs: Euint64, scalar: u64) -> Euint64 {
        let value = self.value(&lhs.0).wrapping_mul(scalar);
        Euint64(self.bind(value, FheType::Uint64))
    }

    fn min(&mut self, lhs: Euint64, rhs: Euint64) -> Euint64 {
        let value = self.value(&lhs.0).min(self.value(&rhs.0));
        Euint64(self.bind(value, FheType::Uint64))
    }

    fn lt(&mut self, lhs: Euint64, rhs: Euint64) -> Ebool {
        let value = self.value(&lhs.0) < self.value(&rhs.0);
        Ebool(self.bind(value as u64, FheType::Bool))
    }

    fn le(&mut self, lhs: Euint64, rhs: Euint64) -> Ebool {
        let value = self.value(&lhs.0) <= self.value(&rhs.0);
        Ebool(self.bind(value as u64, FheType::Bool))
    }

    fn and(&mut self, lhs: Ebool, rhs: Ebool) -> Ebool {
        let value = self.value(&lhs.0) != 0 && self.value(&rhs.0) != 0;
        Ebool(self.bind(value as u64, FheType::Bool))
    }

    fn not(&mut self, value: Ebool) -> Ebool {
        let negated = self.value(&value.0) == 0;
        Ebool(self.bind(negated as u64, FheType::Bool))
    }

    fn select(&mut self, condition: Ebool, if_true: Euint64, if_false: Euint64) -> Euint64 {
        let chosen = if self.value(&condition.0) != 0 {
            self.value(&if_true.0)
        } else {
            self.value(&if_false.0)
        };
        Euint64(self.bind(chosen, FheType::Uint64))
    }

    fn verify_input(
        &mut self,
        input: ExternalEuint64,
        proof: &[u8],
        owner: &Pubkey,
    ) -> Result<Euint64> {
        let value = match self.inputs.get(&input.0) {
            Some(pending) if pending.owner == *owner && pending.proof == proof => pending.value,
            _ => return err!(LendingError::InvalidInputProof),
        };
        Ok(Euint64(self.bind(value, FheType::Uint64)))
    }

    fn allow(&mut self, handle: Euint64, account: &Pubkey) {
        self.grants.push((handle.0, *account, AclKind::Persistent));
    }

    fn allow_transient(&mut self, handle: Euint64, account: &Pubkey) {
        self.grants.push((handle.0, *account, AclKind::Transient));
    }

    fn make_publicly_decryptable(&mut self, handle: Euint64) {
        self.grants.push((handle.0, Pubkey::default(), AclKind::PublicDecrypt));
    }
}
