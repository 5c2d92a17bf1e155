//! String helpers.

/// Length in bytes.
pub fn length(s: &str) -> usize {
    s.len()
}

pub fn concatenate(a: &str, b: &str) -> String {
    let mut out = String::with_capacity(a.len() + b.len());
    out.push_str(a);
    out.push_str(b);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length() {
        assert_eq!(length("abc"), 3);
        assert_eq!(length(""), 0);
        // bytes, not chars
        assert_eq!(length("é"), 2);
    }

    #[test]
    fn test_concatenate() {
        assert_eq!(concatenate("abc", "def"), "abcdef");
        assert_eq!(concatenate("", "x"), "x");
    }
}
