//! Configuration options for Strata output.
//!
//! [`WriteOptions`] controls the layout of dumps:
//!
//! - indentation width (spaces per nesting level)
//! - compact composites: nested maps and lists written inline as
//!   `{key: value, ...}` / `(item, ...)` instead of one entry per line
//!
//! ## Examples
//!
//! ```rust
//! use strata::{strata, to_string_with_options, WriteOptions};
//!
//! let value = strata!({
//!     "point": { "x": 1, "y": 2 }
//! });
//!
//! let options = WriteOptions::new().with_compact(true);
//! let text = to_string_with_options(&value, &options).unwrap();
//! assert_eq!(text, "point: {x: 1, y: 2}\n");
//! ```

/// Configuration options for Strata dumps.
///
/// # Examples
///
/// ```rust
/// use strata::WriteOptions;
///
/// // Defaults: 2-space indentation, one entry per line
/// let options = WriteOptions::new();
/// assert_eq!(options.indent, 2);
/// assert!(!options.compact);
///
/// // Wider indentation, inline composites
/// let options = WriteOptions::new().with_indent(4).with_compact(true);
/// # let _ = options;
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct WriteOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Write nested maps and lists inline.
    pub compact: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            indent: 2,
            compact: false,
        }
    }
}

impl WriteOptions {
    /// Creates default options (2-space indentation, one entry per line).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options with inline composites.
    #[must_use]
    pub fn compact() -> Self {
        WriteOptions {
            compact: true,
            ..Default::default()
        }
    }

    /// Sets the indentation width (spaces per nesting level). Default is 2.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets whether nested maps and lists are written inline.
    #[must_use]
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub(crate) fn indent_unit(&self) -> String {
        " ".repeat(self.indent)
    }
}
