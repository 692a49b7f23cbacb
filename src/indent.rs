//! Indentation tracking.
//!
//! Nesting depth is derived from leading whitespace by exact prefix
//! matching: the tracker keeps one whitespace chunk per open level, and a
//! new line's prefix must be built from those chunks byte for byte. A line
//! may extend the stack by one new chunk (indent), reuse a prefix of it
//! (dedent), or match it exactly. Tabs and spaces are not interchangeable;
//! a mismatched byte is an indentation error.

use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub(crate) struct IndentStack {
    levels: Vec<Vec<u8>>,
}

impl IndentStack {
    pub(crate) fn new() -> Self {
        IndentStack::default()
    }

    /// Forgets all open levels (a line with no leading whitespace).
    pub(crate) fn clear(&mut self) {
        self.levels.clear();
    }

    /// Resolves the leading whitespace `ws` of a line to a nesting depth,
    /// updating the stack of open levels.
    pub(crate) fn resolve(&mut self, ws: &[u8]) -> Result<usize> {
        if ws.is_empty() {
            self.clear();
            return Ok(0);
        }
        let mut depth = 0;
        let mut offset = 0;
        for level in 0..self.levels.len() {
            let chunk = &self.levels[level];
            let remaining = &ws[offset..];
            if remaining.len() < chunk.len() || &remaining[..chunk.len()] != chunk.as_slice() {
                return Err(Error::indentation("inconsistent indentation"));
            }
            depth += 1;
            offset += chunk.len();
            if offset == ws.len() {
                // exact match at this level; deeper levels are closed
                self.levels.truncate(level + 1);
                return Ok(depth);
            }
        }
        // one new, deeper level holding the remaining whitespace
        self.levels.push(ws[offset..].to_vec());
        Ok(self.levels.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn indent_and_exact_match() {
        let mut stack = IndentStack::new();
        assert_eq!(stack.resolve(b"  ").unwrap(), 1);
        assert_eq!(stack.resolve(b"    ").unwrap(), 2);
        assert_eq!(stack.resolve(b"    ").unwrap(), 2);
        assert_eq!(stack.resolve(b"  ").unwrap(), 1);
    }

    #[test]
    fn empty_prefix_clears_to_depth_zero() {
        let mut stack = IndentStack::new();
        assert_eq!(stack.resolve(b"  ").unwrap(), 1);
        assert_eq!(stack.resolve(b"").unwrap(), 0);
        // a fresh level can be opened with different whitespace afterwards
        assert_eq!(stack.resolve(b"\t").unwrap(), 1);
    }

    #[test]
    fn shorter_mismatch_is_an_error() {
        let mut stack = IndentStack::new();
        assert_eq!(stack.resolve(b"  ").unwrap(), 1);
        let err = stack.resolve(b" ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Indentation);
    }

    #[test]
    fn tabs_and_spaces_do_not_mix() {
        let mut stack = IndentStack::new();
        assert_eq!(stack.resolve(b"\t").unwrap(), 1);
        assert_eq!(stack.resolve(b"  ").unwrap_err().kind(), ErrorKind::Indentation);
    }

    #[test]
    fn uneven_chunks_are_fine_if_consistent() {
        let mut stack = IndentStack::new();
        assert_eq!(stack.resolve(b" ").unwrap(), 1);
        assert_eq!(stack.resolve(b"    ").unwrap(), 2);
        assert_eq!(stack.resolve(b" ").unwrap(), 1);
        assert_eq!(stack.resolve(b"   ").unwrap(), 2);
    }
}
