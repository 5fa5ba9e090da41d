//! Value and type model for the builtin call contract
//!
//! This module defines the types a builtin parameter or return value can
//! carry, with the sizes and widening rules the compiler front end and the
//! device VM both agree on.

use serde::{Deserialize, Serialize};

/// Type of a value crossing the builtin call boundary.
///
/// Sizes follow the device layout: `Char` is 1 byte, `Int` and `Float` are
/// 4 bytes each. Array types describe caller-owned buffers; the callee never
/// retains a reference past the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueType {
    /// 8-bit character / byte
    Char,
    /// 32-bit signed integer
    Int,
    /// 32-bit IEEE float
    Float,
    /// Text buffer (immutable byte sequence)
    CharArray,
    /// Buffer of 32-bit integers
    IntArray,
    /// Buffer of 32-bit floats (mutable, pre-sized by the caller)
    FloatArray,
}

impl ValueType {
    /// Size in bytes of one element of this type.
    pub const fn element_size(self) -> usize {
        match self {
            ValueType::Char | ValueType::CharArray => 1,
            ValueType::Int | ValueType::Float | ValueType::IntArray | ValueType::FloatArray => 4,
        }
    }

    /// Whether this type is a buffer type.
    pub const fn is_array(self) -> bool {
        matches!(
            self,
            ValueType::CharArray | ValueType::IntArray | ValueType::FloatArray
        )
    }

    /// The scalar type of one element (identity for scalar types).
    pub const fn element_type(self) -> ValueType {
        match self {
            ValueType::CharArray => ValueType::Char,
            ValueType::IntArray => ValueType::Int,
            ValueType::FloatArray => ValueType::Float,
            scalar => scalar,
        }
    }

    /// Whether a value of this type may be passed where `target` is expected.
    ///
    /// Scalars widen along `Char -> Int -> Float`; narrowing is rejected.
    /// Buffer types must match exactly.
    pub const fn widens_to(self, target: ValueType) -> bool {
        match (self, target) {
            (ValueType::Char, ValueType::Char | ValueType::Int | ValueType::Float) => true,
            (ValueType::Int, ValueType::Int | ValueType::Float) => true,
            (ValueType::Float, ValueType::Float) => true,
            (ValueType::CharArray, ValueType::CharArray) => true,
            (ValueType::IntArray, ValueType::IntArray) => true,
            (ValueType::FloatArray, ValueType::FloatArray) => true,
            _ => false,
        }
    }

    /// Get the string representation of this type
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueType::Char => "char",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::CharArray => "char[]",
            ValueType::IntArray => "int[]",
            ValueType::FloatArray => "float[]",
        }
    }
}
