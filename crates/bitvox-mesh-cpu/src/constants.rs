//! Shared constants for bitvox-mesh-cpu.

use bitvox_chunk::{CHUNK_SIZE, CHUNK_SIZE_SQ};

pub(crate) const S: usize = CHUNK_SIZE;
pub(crate) const PLANE_WORDS: usize = CHUNK_SIZE_SQ;

/// Bits `1..=S-2`; the halo bits are sampling context only.
pub(crate) const INTERIOR_BITS: u64 = !1u64 & !(1u64 << 63);

// Butterfly masks for the 64x64 transpose, stage j keeps the low half of each 2^(j+1) group
// in TRANSPOSE_MASKS[j] and the high half in TRANSPOSE_MASKS[j + 6].
pub(crate) const TRANSPOSE_MASKS: [u64; 12] = [
    0x5555_5555_5555_5555,
    0x3333_3333_3333_3333,
    0x0F0F_0F0F_0F0F_0F0F,
    0x00FF_00FF_00FF_00FF,
    0x0000_FFFF_0000_FFFF,
    0x0000_0000_FFFF_FFFF,
    0xAAAA_AAAA_AAAA_AAAA,
    0xCCCC_CCCC_CCCC_CCCC,
    0xF0F0_F0F0_F0F0_F0F0,
    0xFF00_FF00_FF00_FF00,
    0xFFFF_0000_FFFF_0000,
    0xFFFF_FFFF_0000_0000,
];

// Packed vertex layout
pub(crate) const POS_BITS: u32 = 6;
pub(crate) const POS_MASK: u32 = (1 << POS_BITS) - 1;
pub(crate) const FACE_SHIFT: u32 = 18;
pub(crate) const FACE_MASK: u32 = 0x7;
pub(crate) const LIGHT_SHIFT: u32 = 21;
pub(crate) const LIGHT_MASK: u32 = 0xF;

pub(crate) const INDICES_PER_QUAD: usize = 6;
pub(crate) const VERTS_PER_QUAD: usize = 4;
