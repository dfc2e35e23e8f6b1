use crate::error::{Error, Result};

/// Characters available as subscript symbols, in the order they are issued
///
/// Upper case letters come first so that the most common expressions
/// translate into `A`, `B`, `C`, ...
pub const ALPHABET: &[u8; 52] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Ellipsis token of the positional subscript notation
pub const ELLIPSIS: &str = "...";

/// Arrow token separating inputs and output of the positional notation
pub const ARROW: &str = "->";

/// Issuer of subscript symbols
///
/// This works as a simple cursor on [ALPHABET]: each call of
/// [SymbolTable::issue] returns the next unused character.
/// The table never wraps around; the 53rd symbol is an error.
///
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SymbolTable {
    last: usize,
}

impl SymbolTable {
    /// Create new table
    pub fn init() -> Self {
        SymbolTable { last: 0 }
    }

    /// Number of symbols issued so far
    pub fn len(&self) -> usize {
        self.last
    }

    pub fn is_empty(&self) -> bool {
        self.last == 0
    }

    /// Issue new symbol for `axis`
    pub fn issue(&mut self, axis: &str) -> Result<char> {
        let index = self.last;
        let symbol = *ALPHABET.get(index).ok_or_else(|| Error::TooManyAxes {
            axis: axis.to_string(),
            index,
        })?;
        self.last += 1;
        Ok(symbol as char)
    }
}
