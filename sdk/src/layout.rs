//! Declarative wire layouts.
//!
//! Every account and instruction layout is a table of [`FieldSpec`]s with
//! const-computed cumulative offsets, and all byte access goes through the
//! generic accessors below. Offsets appear exactly once in this file;
//! everything else names fields instead of re-deriving arithmetic.
//!
//! Multi-byte integers are little-endian. Optional values are a 1-byte
//! presence tag followed by a full-width value region that is zero-filled
//! when the tag is clear, so no encoding ever leaves residual bytes in a
//! region the other side reads at a fixed offset.

use solana_program::pubkey::Pubkey;

/// One field of a fixed-size wire image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
}

impl FieldSpec {
    pub const fn new(name: &'static str, offset: usize, width: usize) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    /// The field immediately after this one.
    pub const fn next(&self, name: &'static str, width: usize) -> Self {
        Self::new(name, self.offset + self.width, width)
    }

    pub const fn end(&self) -> usize {
        self.offset + self.width
    }

    // ------------------- generic accessors -------------------
    // Callers guarantee `buf.len() >= layout LEN` (decode checks once, up
    // front); width agreement with the typed accessors is audited by the
    // layout tests.

    pub fn get<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.offset..self.end()]
    }

    pub fn get_u8(&self, buf: &[u8]) -> u8 {
        buf[self.offset]
    }

    pub fn get_u64(&self, buf: &[u8]) -> u64 {
        let mut le = [0u8; 8];
        le.copy_from_slice(self.get(buf));
        u64::from_le_bytes(le)
    }

    pub fn get_key(&self, buf: &[u8]) -> Pubkey {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(self.get(buf));
        Pubkey::new_from_array(bytes)
    }

    pub fn get_bytes32(&self, buf: &[u8]) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(self.get(buf));
        bytes
    }

    pub fn put(&self, buf: &mut [u8], bytes: &[u8]) {
        buf[self.offset..self.end()].copy_from_slice(bytes);
    }

    pub fn put_u8(&self, buf: &mut [u8], value: u8) {
        buf[self.offset] = value;
    }

    pub fn put_u64(&self, buf: &mut [u8], value: u64) {
        self.put(buf, &value.to_le_bytes());
    }

    pub fn put_key(&self, buf: &mut [u8], key: &Pubkey) {
        self.put(buf, key.as_ref());
    }
}

/// Vault account layout, revision 1 (148 bytes).
///
/// The canonical schema carries no locked-amount field; the balance of the
/// vault token account is the single source of truth for how much is
/// locked.
pub mod vault_layout {
    use super::FieldSpec;

    pub const REVISION: u8 = 1;

    pub const HAS_DISCRIMINATOR: FieldSpec = FieldSpec::new("has_discriminator", 0, 1);
    pub const DISCRIMINATOR: FieldSpec = HAS_DISCRIMINATOR.next("discriminator", 1);
    pub const BUMP: FieldSpec = DISCRIMINATOR.next("bump", 1);
    pub const ADMIN: FieldSpec = BUMP.next("admin", 32);
    pub const MINT: FieldSpec = ADMIN.next("mint", 32);
    pub const MINT_DECIMALS: FieldSpec = MINT.next("mint_decimals", 1);
    pub const VAULT_TOKEN: FieldSpec = MINT_DECIMALS.next("vault_token", 32);
    pub const START_SLOT: FieldSpec = VAULT_TOKEN.next("start_slot", 8);
    pub const SLOTS_LOCKED: FieldSpec = START_SLOT.next("slots_locked", 8);
    pub const RESERVED: FieldSpec = SLOTS_LOCKED.next("reserved", 32);

    pub const FIELDS: &[FieldSpec] = &[
        HAS_DISCRIMINATOR,
        DISCRIMINATOR,
        BUMP,
        ADMIN,
        MINT,
        MINT_DECIMALS,
        VAULT_TOKEN,
        START_SLOT,
        SLOTS_LOCKED,
        RESERVED,
    ];

    pub const LEN: usize = RESERVED.end();
}

/// Lock instruction payload layout, revision 1 (19 bytes, no padding).
///
/// The 8-byte-aligned revision with inner padding was rejected: both ends
/// of the wire read these offsets directly, so alignment padding would only
/// widen the audit surface.
pub mod lock_ix_layout {
    use super::FieldSpec;

    pub const REVISION: u8 = 1;

    pub const OPCODE: FieldSpec = FieldSpec::new("opcode", 0, 1);
    pub const BUMP: FieldSpec = OPCODE.next("bump", 1);
    pub const SLOTS_TO_LOCK: FieldSpec = BUMP.next("slots_to_lock", 8);
    pub const AMOUNT_TAG: FieldSpec = SLOTS_TO_LOCK.next("amount_tag", 1);
    pub const AMOUNT: FieldSpec = AMOUNT_TAG.next("amount", 8);

    pub const FIELDS: &[FieldSpec] = &[OPCODE, BUMP, SLOTS_TO_LOCK, AMOUNT_TAG, AMOUNT];

    pub const LEN: usize = AMOUNT.end();
}

/// Empty instruction payload layout: the opcode byte alone.
pub mod empty_ix_layout {
    use super::FieldSpec;

    pub const OPCODE: FieldSpec = FieldSpec::new("opcode", 0, 1);

    pub const FIELDS: &[FieldSpec] = &[OPCODE];

    pub const LEN: usize = OPCODE.end();
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A layout is sound when its fields start at zero, tile the buffer
    /// with no gaps or overlaps, and sum to the declared length.
    fn audit(fields: &[FieldSpec], len: usize) {
        let mut cursor = 0;
        for field in fields {
            assert_eq!(
                field.offset, cursor,
                "field `{}` does not start where the previous field ends",
                field.name
            );
            assert!(field.width > 0, "field `{}` has zero width", field.name);
            cursor = field.end();
        }
        assert_eq!(cursor, len, "fields do not sum to the layout length");
    }

    #[test]
    fn vault_layout_is_contiguous() {
        audit(vault_layout::FIELDS, vault_layout::LEN);
        assert_eq!(vault_layout::LEN, 148);
    }

    #[test]
    fn lock_ix_layout_is_contiguous() {
        audit(lock_ix_layout::FIELDS, lock_ix_layout::LEN);
        assert_eq!(lock_ix_layout::LEN, 19);
    }

    #[test]
    fn empty_ix_layout_is_contiguous() {
        audit(empty_ix_layout::FIELDS, empty_ix_layout::LEN);
        assert_eq!(empty_ix_layout::LEN, 1);
    }

    #[test]
    fn known_field_offsets() {
        // Spot-check the offsets the rest of the stack depends on: the
        // admin key position drives program-account scans, the slot pair
        // drives unlock math.
        assert_eq!(vault_layout::ADMIN.offset, 3);
        assert_eq!(vault_layout::MINT.offset, 35);
        assert_eq!(vault_layout::VAULT_TOKEN.offset, 68);
        assert_eq!(vault_layout::START_SLOT.offset, 100);
        assert_eq!(vault_layout::SLOTS_LOCKED.offset, 108);
        assert_eq!(vault_layout::RESERVED.offset, 116);
    }

    #[test]
    fn accessors_roundtrip() {
        let mut buf = [0u8; vault_layout::LEN];
        let key = Pubkey::new_unique();

        vault_layout::ADMIN.put_key(&mut buf, &key);
        assert_eq!(vault_layout::ADMIN.get_key(&buf), key);

        vault_layout::START_SLOT.put_u64(&mut buf, u64::MAX - 7);
        assert_eq!(vault_layout::START_SLOT.get_u64(&buf), u64::MAX - 7);

        vault_layout::BUMP.put_u8(&mut buf, 253);
        assert_eq!(vault_layout::BUMP.get_u8(&buf), 253);

        vault_layout::RESERVED.put(&mut buf, &[0xEE; 32]);
        assert_eq!(vault_layout::RESERVED.get_bytes32(&buf), [0xEE; 32]);
    }
}
