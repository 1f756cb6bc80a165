//! Operation kind and memory-level codes.
//!
//! A node's diagonal cell in the [`GraphStore`](crate::GraphStore) holds a
//! single integer combining what the operation was and how many memory
//! accesses it charged:
//!
//! ```text
//! code = MEM_OFFSET * mem_count + kind
//! ```
//!
//! The kind lives in `code % MEM_OFFSET`, the memory level in the hundreds.
//! User-defined function nodes use `USER_FUNCTION_BASE + registry_index` as
//! their kind, so "is a user function" and "which one" share the same cell.
//! These values are an external contract: exported files must stay readable
//! across versions.

use std::fmt;

/// Spacing between memory levels in a combined code.
pub const MEM_OFFSET: i64 = 100;

/// Kind code of the first user-defined function (registry index 0).
pub const USER_FUNCTION_BASE: i64 = 20;

/// Number of user-function indices that fit below [`MEM_OFFSET`].
pub const MAX_USER_FUNCTIONS: u32 = (MEM_OFFSET - USER_FUNCTION_BASE) as u32;

/// Highest memory level [`decode_mem_level`] distinguishes.
pub const MAX_MEM_LEVEL: u32 = 4;

/// What an operation node computes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpKind {
    /// No operation recorded (a bare memory read).
    Empty,
    /// Addition.
    Add,
    /// Multiplication.
    Multiply,
    /// Division.
    Divide,
    /// Subtraction.
    Subtract,
    /// Remainder.
    Modulo,
    /// Call to a host function, by registry index.
    UserFunction(u32),
}

impl OpKind {
    /// The kind of a call to registry entry `index`, or `None` if its code
    /// would spill into the memory-level digits.
    pub fn user_function(index: u32) -> Option<Self> {
        (index < MAX_USER_FUNCTIONS).then_some(Self::UserFunction(index))
    }

    /// Integer kind code, without any memory-level component.
    pub fn code(self) -> i64 {
        match self {
            Self::Empty => 0,
            Self::Add => 1,
            Self::Multiply => 2,
            Self::Divide => 3,
            Self::Subtract => 4,
            Self::Modulo => 5,
            Self::UserFunction(index) => USER_FUNCTION_BASE + i64::from(index),
        }
    }

    /// Strip the memory level from `code` and match the remaining kind.
    ///
    /// Returns `None` for anything outside the fixed enumeration, including
    /// negative codes, so callers can treat it as a data-quality signal.
    pub fn decode(code: i64) -> Option<Self> {
        if code < 0 {
            return None;
        }
        match code % MEM_OFFSET {
            0 => Some(Self::Empty),
            1 => Some(Self::Add),
            2 => Some(Self::Multiply),
            3 => Some(Self::Divide),
            4 => Some(Self::Subtract),
            5 => Some(Self::Modulo),
            k if k >= USER_FUNCTION_BASE => Some(Self::UserFunction((k - USER_FUNCTION_BASE) as u32)),
            _ => None,
        }
    }

    /// Short operator symbol used by the Graphviz export.
    pub fn symbol(self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Add => "+".to_string(),
            Self::Multiply => "\u{00D7}".to_string(),
            Self::Divide => "\u{00F7}".to_string(),
            Self::Subtract => "-".to_string(),
            Self::Modulo => "%".to_string(),
            Self::UserFunction(index) => format!("f{index}"),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Add => write!(f, "add"),
            Self::Multiply => write!(f, "mul"),
            Self::Divide => write!(f, "div"),
            Self::Subtract => write!(f, "sub"),
            Self::Modulo => write!(f, "mod"),
            Self::UserFunction(index) => write!(f, "user{index}"),
        }
    }
}

/// Memory-level tag for a number of charged memory accesses.
#[inline]
pub fn encode_mem_level(count: u32) -> i64 {
    MEM_OFFSET * i64::from(count)
}

/// Greatest memory level whose threshold is at most `code`.
///
/// Saturates at [`MAX_MEM_LEVEL`]; codes below the first threshold
/// (including negative ones) are level 0.
pub fn decode_mem_level(code: i64) -> u32 {
    (0..=MAX_MEM_LEVEL)
        .rev()
        .find(|&level| code >= encode_mem_level(level))
        .unwrap_or(0)
}

/// A diagonal cell split into its two components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiagonalCode {
    /// Operation kind, `None` if unrecognised.
    pub kind: Option<OpKind>,
    /// Memory level (number of charged accesses, saturating).
    pub mem_level: u32,
}

impl DiagonalCode {
    pub fn decode(code: i64) -> Self {
        Self {
            kind: OpKind::decode(code),
            mem_level: decode_mem_level(code),
        }
    }
}
