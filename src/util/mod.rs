pub mod ord_iter;

/// `ceil(a / b)` for `b > 0`.
pub fn div_ceil(a: usize, b: usize) -> usize {
    debug_assert!(b > 0);
    (a + b - 1) / b
}
