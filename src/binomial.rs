//! Compile-time table of binomial coefficients.

use crate::word::MAX_LEN;

// ============================================================================
// Table
// ============================================================================

/// Pascal's triangle for `0 <= j <= i <= 64`. Every entry fits in a `u64`
/// (the largest is `C(64, 32) < 2^61`).
static BINOMIAL: [[u64; MAX_LEN + 1]; MAX_LEN + 1] = {
    let mut table = [[0u64; MAX_LEN + 1]; MAX_LEN + 1];
    let mut i = 0;
    while i <= MAX_LEN {
        table[i][0] = 1;
        let mut j = 1;
        while j <= i {
            table[i][j] = table[i - 1][j - 1] + table[i - 1][j];
            j += 1;
        }
        i += 1;
    }
    table
};

/// Returns `C(i, j)`, or `0` when `j > i` or `i > 64`.
#[inline(always)]
pub fn binomial(i: usize, j: usize) -> u64 {
    if i > MAX_LEN || j > i {
        return 0;
    }
    BINOMIAL[i][j]
}

/// Signed variant used by inclusion–exclusion sums; negative `i` yields `0`.
#[inline(always)]
pub(crate) fn binomial_signed(i: i64, j: usize) -> i64 {
    if i < 0 {
        return 0;
    }
    binomial(i as usize, j) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_of_the_triangle_are_one() {
        for i in 0..=MAX_LEN {
            assert_eq!(binomial(i, 0), 1);
            assert_eq!(binomial(i, i), 1);
        }
    }

    #[test]
    fn outside_the_triangle_is_zero() {
        assert_eq!(binomial(3, 4), 0);
        assert_eq!(binomial(0, 1), 0);
        assert_eq!(binomial(65, 1), 0);
        assert_eq!(binomial_signed(-2, 0), 0);
    }

    #[test]
    fn known_values() {
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(10, 5), 252);
        assert_eq!(binomial(64, 1), 64);
        assert_eq!(binomial(64, 32), 1_832_624_140_942_590_534);
        assert_eq!(binomial_signed(6, 3), 20);
    }

    #[test]
    fn rows_sum_to_powers_of_two() {
        for i in 0..MAX_LEN {
            let sum: u64 = (0..=i).map(|j| binomial(i, j)).sum();
            assert_eq!(sum, 1u64 << i);
        }
    }

    #[test]
    fn rows_are_symmetric() {
        for i in 0..=MAX_LEN {
            for j in 0..=i {
                assert_eq!(binomial(i, j), binomial(i, i - j));
            }
        }
    }
}
