use crate::constants::TRANSPOSE_MASKS;

/// In-place 64x64 bit transpose (word = row, bit = column), six butterfly stages.
///
/// After the call bit `c` of word `r` holds what was bit `r` of word `c`.
pub fn transpose64(m: &mut [u64]) {
    debug_assert_eq!(m.len(), 64);
    for j in (0..6).rev() {
        let s = 1usize << j;
        let lo = TRANSPOSE_MASKS[j];
        let hi = TRANSPOSE_MASKS[j + 6];
        for p in 0..(32 / s) {
            for i in 0..s {
                let i0 = p * 2 * s + i;
                let i1 = i0 + s;
                let (a, b) = (m[i0], m[i1]);
                m[i0] = (a & lo) | ((b & lo) << s);
                m[i1] = ((a & hi) >> s) | (b & hi);
            }
        }
    }
}
