//! Fibonacci numbers.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FibonacciError {
    #[error("fib({0}) does not fit in 128 bits")]
    Overflow(u32),
}

/// The `n`th Fibonacci number, with `fib(0) == 0` and `fib(1) == 1`.
pub fn fib(n: u32) -> Result<u128, FibonacciError> {
    if n == 0 {
        return Ok(0);
    }
    let (mut a, mut b) = (0u128, 1u128);
    for _ in 1..n {
        let next = a.checked_add(b).ok_or(FibonacciError::Overflow(n))?;
        a = b;
        b = next;
    }
    Ok(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values() {
        assert_eq!(fib(0), Ok(0));
        assert_eq!(fib(1), Ok(1));
        assert_eq!(fib(2), Ok(1));
        assert_eq!(fib(10), Ok(55));
    }

    #[test]
    fn test_largest_and_overflow() {
        assert_eq!(fib(186), Ok(332_825_110_087_067_562_321_196_029_789_634_457_848));
        assert_eq!(fib(187), Err(FibonacciError::Overflow(187)));
    }
}
