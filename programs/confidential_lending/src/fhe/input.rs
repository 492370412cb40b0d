//! Encrypted user input and input-proof verification
//!
//! Users submit a ciphertext handle together with a proof that they know
//! the plaintext and that the ciphertext is bound to them and this program.
//! The proof is checked by CPI into the input verifier program configured
//! on the lending pool.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program::invoke;

use super::{Euint64, ExternalEuint64, FheBackend, FheType, HANDLE_VERSION};

/// verify_input: sha256("global:verify_input")[0..8]
pub const VERIFY_INPUT_DISCRIMINATOR: [u8; 8] = [0x8e, 0xae, 0xc6, 0xac, 0x46, 0xfe, 0xd6, 0x97];

/// Upper bound on proof size accepted in instruction data
pub const MAX_INPUT_PROOF_LEN: usize = 512;

/// An encrypted amount as received from the caller
#[derive(Clone, Copy, Debug)]
pub struct EncryptedAmount<'a> {
    pub handle: ExternalEuint64,
    pub proof: &'a [u8],
}

impl<'a> EncryptedAmount<'a> {
    pub fn new(handle: ExternalEuint64, proof: &'a [u8]) -> Self {
        Self { handle, proof }
    }

    /// Authenticate the input for `owner` and turn it into a usable handle
    pub fn decode<F: FheBackend + ?Sized>(&self, fhe: &mut F, owner: &Pubkey) -> Result<Euint64> {
        fhe.verify_input(self.handle, self.proof, owner)
    }
}

/// Structural checks that do not need the verifier
pub fn is_well_formed(handle: &ExternalEuint64, proof: &[u8]) -> bool {
    handle.0 != [0u8; 32]
        && handle.fhe_type() == Some(FheType::Uint64)
        && handle.version() == HANDLE_VERSION
        && !proof.is_empty()
        && proof.len() <= MAX_INPUT_PROOF_LEN
}

/// Verify an input proof via the input verifier program
///
/// Instruction data: discriminator, handle, owner, calling program, proof.
/// The verifier fails the CPI on an invalid proof.
///
/// # Returns
/// * `Ok(true)` if the proof is valid
/// * `Ok(false)` if the verifier rejected it
pub fn verify_input_proof(
    verifier_program: &AccountInfo,
    handle: &ExternalEuint64,
    owner: &Pubkey,
    program_id: &Pubkey,
    proof: &[u8],
) -> Result<bool> {
    let mut data = Vec::with_capacity(8 + 32 * 3 + 4 + proof.len());
    data.extend_from_slice(&VERIFY_INPUT_DISCRIMINATOR);
    data.extend_from_slice(&handle.0);
    data.extend_from_slice(owner.as_ref());
    data.extend_from_slice(program_id.as_ref());
    data.extend_from_slice(&(proof.len() as u32).to_le_bytes());
    data.extend_from_slice(proof);

    let verify_ix = Instruction {
        program_id: verifier_program.key(),
        accounts: vec![],
        data,
    };

    match invoke(&verify_ix, &[verifier_program.clone()]) {
        Ok(_) => Ok(true),
        Err(e) => {
            msg!("Input proof rejected: {:?}", e);
            Ok(false)
        }
    }
}
