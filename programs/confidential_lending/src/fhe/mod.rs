//! Confidential integer primitives
//!
//! Encrypted quantities never appear on-chain as plaintext. Accounts store
//! 32-byte ciphertext handles; the arithmetic on those handles is described
//! by the program and evaluated by the off-chain coprocessor.
//!
//! Layout of a handle:
//! - bytes 0..30: sha256 digest identifying the ciphertext
//! - byte 30: type tag (see [`FheType`])
//! - byte 31: handle version
//!
//! The all-zero handle means "never written" and is read as encrypted zero.
//!
//! Every decision on encrypted data goes through [`FheBackend::select`]:
//! comparisons return an [`Ebool`] handle that host code cannot inspect.

use anchor_lang::prelude::*;
use solana_sha256_hasher::hashv;

pub mod coprocessor;
pub mod input;
#[cfg(test)]
pub mod mock;
pub mod safe_ops;

pub use coprocessor::*;
pub use input::*;
pub use safe_ops::*;

/// Current handle layout version (byte 31)
pub const HANDLE_VERSION: u8 = 0;

/// Domain separator for handle derivation
pub const HANDLE_DOMAIN: &[u8] = b"confidential-lending:fhe:v0";

/// Ciphertext type carried in byte 30 of a handle
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum FheType {
    Bool,
    Uint64,
}

impl FheType {
    pub const fn tag(self) -> u8 {
        match self {
            FheType::Bool => 0,
            FheType::Uint64 => 5,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(FheType::Bool),
            5 => Some(FheType::Uint64),
            _ => None,
        }
    }
}

/// Encrypted 64-bit unsigned integer
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct Euint64(pub [u8; 32]);

/// Encrypted boolean (result of a homomorphic comparison)
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct Ebool(pub [u8; 32]);

/// User-supplied ciphertext handle, not yet authenticated
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct ExternalEuint64(pub [u8; 32]);

impl Euint64 {
    pub const UNINITIALIZED: Self = Self([0u8; 32]);

    pub fn is_initialized(&self) -> bool {
        self.0 != [0u8; 32]
    }
}

impl ExternalEuint64 {
    pub fn fhe_type(&self) -> Option<FheType> {
        FheType::from_tag(self.0[30])
    }

    pub fn version(&self) -> u8 {
        self.0[31]
    }
}

/// Homomorphic operations understood by the coprocessor
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum FheOp {
    TrivialEncrypt,
    VerifyInput,
    Add,
    Sub,
    MulScalar,
    Min,
    Lt,
    Le,
    And,
    Not,
    Select,
}

impl FheOp {
    pub const fn code(self) -> u8 {
        match self {
            FheOp::TrivialEncrypt => 0,
            FheOp::VerifyInput => 1,
            FheOp::Add => 2,
            FheOp::Sub => 3,
            FheOp::MulScalar => 4,
            FheOp::Min => 5,
            FheOp::Lt => 6,
            FheOp::Le => 7,
            FheOp::And => 8,
            FheOp::Not => 9,
            FheOp::Select => 10,
        }
    }
}

/// Stamp type tag and version into a digest
pub fn stamp(mut digest: [u8; 32], fhe_type: FheType) -> [u8; 32] {
    digest[30] = fhe_type.tag();
    digest[31] = HANDLE_VERSION;
    digest
}

/// Derive the result handle of an operation
///
/// Derivation is a pure function of the operation, its operands, the
/// optional plaintext scalar and the program id, so the coprocessor can
/// recompute every handle from the recorded operation graph.
pub fn derive_handle(
    op: FheOp,
    operands: &[[u8; 32]],
    scalar: Option<u64>,
    program_id: &Pubkey,
    result_type: FheType,
) -> [u8; 32] {
    let op_code = [op.code()];
    let scalar_bytes = scalar.map(u64::to_le_bytes);

    let mut parts: Vec<&[u8]> = Vec::with_capacity(operands.len() + 4);
    parts.push(HANDLE_DOMAIN);
    parts.push(&op_code);
    for operand in operands {
        parts.push(operand);
    }
    if let Some(bytes) = scalar_bytes.as_ref() {
        parts.push(bytes);
    }
    parts.push(program_id.as_ref());

    stamp(hashv(&parts).to_bytes(), result_type)
}

/// The confidential integer primitive
///
/// `add`, `sub` and `mul_scalar` are modular (they wrap like the underlying
/// ciphertext arithmetic); the overflow-safe variants live in [`SafeOps`].
pub trait FheBackend {
    fn trivial_encrypt(&mut self, value: u64) -> Euint64;
    fn trivial_encrypt_bool(&mut self, value: bool) -> Ebool;

    fn add(&mut self, lhs: Euint64, rhs: Euint64) -> Euint64;
    fn sub(&mut self, lhs: Euint64, rhs: Euint64) -> Euint64;
    fn mul_scalar(&mut self, lhs: Euint64, scalar: u64) -> Euint64;
    fn min(&mut self, lhs: Euint64, rhs: Euint64) -> Euint64;

    fn lt(&mut self, lhs: Euint64, rhs: Euint64) -> Ebool;
    fn le(&mut self, lhs: Euint64, rhs: Euint64) -> Ebool;
    fn and(&mut self, lhs: Ebool, rhs: Ebool) -> Ebool;
    fn not(&mut self, value: Ebool) -> Ebool;

    /// `condition ? if_true : if_false`, evaluated inside the encrypted domain
    fn select(&mut self, condition: Ebool, if_true: Euint64, if_false: Euint64) -> Euint64;

    /// Authenticate a user-supplied ciphertext against its input proof
    fn verify_input(
        &mut self,
        input: ExternalEuint64,
        proof: &[u8],
        owner: &Pubkey,
    ) -> Result<Euint64>;

    /// Grant persistent decrypt/compute permission on a handle
    fn allow(&mut self, handle: Euint64, account: &Pubkey);

    /// Grant permission scoped to the current instruction only
    fn allow_transient(&mut self, handle: Euint64, account: &Pubkey);

    fn make_publicly_decryptable(&mut self, handle: Euint64);

    /// Read a stored handle, materialising encrypted zero for never-written slots
    fn or_zero(&mut self, handle: Euint64) -> Euint64 {
        if handle.is_initialized() {
            handle
        } else {
            self.trivial_encrypt(0)
        }
    }
}
