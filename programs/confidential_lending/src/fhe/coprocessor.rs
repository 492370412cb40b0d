//! On-chain coprocessor backend
//!
//! The program never evaluates ciphertexts itself. Each operation derives
//! its result handle deterministically and is appended to an operation log;
//! ACL grants are logged the same way. At the end of an instruction the log
//! is emitted as a single [`FheComputation`] event, which the off-chain
//! evaluator replays to produce the ciphertexts behind the new handles.

use anchor_lang::prelude::*;

use super::input::{is_well_formed, verify_input_proof};
use super::{derive_handle, Ebool, Euint64, ExternalEuint64, FheBackend, FheOp, FheType};
use crate::error::LendingError;

/// One evaluated homomorphic operation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct FheOpRecord {
    pub op: FheOp,
    pub operands: Vec<[u8; 32]>,
    pub scalar: Option<u64>,
    pub result: [u8; 32],
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AclKind {
    /// Decrypt/compute permission that outlives the instruction
    Persistent,
    /// Permission valid for the current instruction only (settlement CPI)
    Transient,
    /// Anyone may request a decryption
    PublicDecrypt,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AclGrant {
    pub handle: [u8; 32],
    pub account: Pubkey,
    pub kind: AclKind,
}

/// Operation log of one instruction, consumed by the off-chain evaluator
#[event]
pub struct FheComputation {
    pub ops: Vec<FheOpRecord>,
    pub grants: Vec<AclGrant>,
}

pub struct Coprocessor<'a, 'info> {
    program_id: Pubkey,
    input_verifier: Option<&'a AccountInfo<'info>>,
    ops: Vec<FheOpRecord>,
    grants: Vec<AclGrant>,
}

impl<'a, 'info> Coprocessor<'a, 'info> {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            input_verifier: None,
            ops: Vec::new(),
            grants: Vec::new(),
        }
    }

    /// Attach the input verifier program used by [`FheBackend::verify_input`]
    pub fn with_input_verifier(mut self, verifier: &'a AccountInfo<'info>) -> Self {
        self.input_verifier = Some(verifier);
        self
    }

    pub fn ops(&self) -> &[FheOpRecord] {
        &self.ops
    }

    pub fn into_event(self) -> FheComputation {
        FheComputation {
            ops: self.ops,
            grants: self.grants,
        }
    }

    fn record(
        &mut self,
        op: FheOp,
        operands: Vec<[u8; 32]>,
        scalar: Option<u64>,
        result_type: FheType,
    ) -> [u8; 32] {
        let result = derive_handle(op, &operands, scalar, &self.program_id, result_type);
        #[cfg(feature = "debug")]
        msg!("fhe {:?} -> {:?}", op, &result[0..8]);
        self.ops.push(FheOpRecord {
            op,
            operands,
            scalar,
            result,
        });
        result
    }

    fn grant(&mut self, handle: Euint64, account: Pubkey, kind: AclKind) {
        self.grants.push(AclGrant {
            handle: handle.0,
            account,
            kind,
        });
    }

    fn check_input_proof(
        &self,
        input: &ExternalEuint64,
        proof: &[u8],
        owner: &Pubkey,
    ) -> Result<()> {
        if cfg!(feature = "skip-input-verification") {
            msg!("Input proof verification DISABLED");
            return Ok(());
        }

        let verifier = self
            .input_verifier
            .ok_or_else(|| error!(LendingError::InvalidInputProof))?;
        let valid = verify_input_proof(verifier, input, owner, &self.program_id, proof)?;
        require!(valid, LendingError::InvalidInputProof);
        Ok(())
    }
}

impl FheBackend for Coprocessor<'_, '_> {
    fn trivial_encrypt(&mut self, value: u64) -> Euint64 {
        Euint64(self.record(FheOp::TrivialEncrypt, vec![], Some(value), FheType::Uint64))
    }

    fn trivial_encrypt_bool(&mut self, value: bool) -> Ebool {
        Ebool(self.record(FheOp::TrivialEncrypt, vec![], Some(value as u64), FheType::Bool))
    }

    fn add(&mut self, lhs: Euint64, rhs: Euint64) -> Euint64 {
        Euint64(self.record(FheOp::Add, vec![lhs.0, rhs.0], None, FheType::Uint64))
    }

    fn sub(&mut self, lhs: Euint64, rhs: Euint64) -> Euint64 {
        Euint64(self.record(FheOp::Sub, vec![lhs.0, rhs.0], None, FheType::Uint64))
    }

    fn mul_scalar(&mut self, lhs: Euint64, scalar: u64) -> Euint64 {
        Euint64(self.record(FheOp::MulScalar, vec![lhs.0], Some(scalar), FheType::Uint64))
    }

    fn min(&mut self, lhs: Euint64, rhs: Euint64) -> Euint64 {
        Euint64(self.record(FheOp::Min, vec![lhs.0, rhs.0], None, FheType::Uint64))
    }

    fn lt(&mut self, lhs: Euint64, rhs: Euint64) -> Ebool {
        Ebool(self.record(FheOp::Lt, vec![lhs.0, rhs.0], None, FheType::Bool))
    }

    fn le(&mut self, lhs: Euint64, rhs: Euint64) -> Ebool {
        Ebool(self.record(FheOp::Le, vec![lhs.0, rhs.0], None, FheType::Bool))
    }

    fn and(&mut self, lhs: Ebool, rhs: Ebool) -> Ebool {
        Ebool(self.record(FheOp::And, vec![lhs.0, rhs.0], None, FheType::Bool))
    }

    fn not(&mut self, value: Ebool) -> Ebool {
        Ebool(self.record(FheOp::Not, vec![value.0], None, FheType::Bool))
    }

    fn select(&mut self, condition: Ebool, if_true: Euint64, if_false: Euint64) -> Euint64 {
        Euint64(self.record(
            FheOp::Select,
            vec![condition.0, if_true.0, if_false.0],
            None,
            FheType::Uint64,
        ))
    }

    fn verify_input(
        &mut self,
        input: ExternalEuint64,
        proof: &[u8],
        owner: &Pubkey,
    ) -> Result<Euint64> {
        require!(is_well_formed(&input, proof), LendingError::InvalidInputProof);
        self.check_input_proof(&input, proof, owner)?;
        Ok(Euint64(self.record(
            FheOp::VerifyInput,
            vec![input.0, owner.to_bytes()],
            None,
            FheType::Uint64,
        )))
    }

    fn allow(&mut self, handle: Euint64, account: &Pubkey) {
        self.grant(handle, *account, AclKind::Persistent);
    }

    fn allow_transient(&mut self, handle: Euint64, account: &Pubkey) {
        self.grant(handle, *account, AclKind::Transient);
    }

    fn make_publicly_decryptable(&mut self, handle: Euint64) {
        self.grant(handle, Pubkey::default(), AclKind::PublicDecrypt);
    }
}
