use solana_program::pubkey::Pubkey;

/// Program addresses every component derives against.
///
/// Injected at construction time wherever it is needed; nothing in this
/// crate reads a program id from a global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// The deployed vault program.
    pub program_id: Pubkey,
    /// SPL token program referenced by built instructions.
    pub token_program_id: Pubkey,
    /// System program referenced by built instructions.
    pub system_program_id: Pubkey,
}

impl ClientConfig {
    /// Config for a deployed program id, with the standard token and system
    /// programs.
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            token_program_id: spl_token::id(),
            system_program_id: solana_program::system_program::id(),
        }
    }
}
