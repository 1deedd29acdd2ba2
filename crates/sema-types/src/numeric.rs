//! Numeric types
//!
//! Numeric types are fixed singletons: every [`crate::TypeContext`] interns
//! each of them at a well-known [`crate::TypeId`], so two numeric handles are
//! equal exactly when they name the same numeric type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which saturating arithmetic members a numeric type provides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SaturatingArithmetic {
    /// `saturatingAdd`
    pub add: bool,
    /// `saturatingSubtract`
    pub subtract: bool,
    /// `saturatingMultiply`
    pub multiply: bool,
    /// `saturatingDivide`
    pub divide: bool,
}

impl SaturatingArithmetic {
    const NONE: Self = Self::new(false, false, false, false);
    const ALL: Self = Self::new(true, true, true, true);

    const fn new(add: bool, subtract: bool, multiply: bool, divide: bool) -> Self {
        Self {
            add,
            subtract,
            multiply,
            divide,
        }
    }

    /// Member names of the supported operations, in declaration order
    pub fn function_names(&self) -> impl Iterator<Item = &'static str> {
        [
            (self.add, "saturatingAdd"),
            (self.subtract, "saturatingSubtract"),
            (self.multiply, "saturatingMultiply"),
            (self.divide, "saturatingDivide"),
        ]
        .into_iter()
        .filter_map(|(supported, name)| supported.then_some(name))
    }
}

/// Integer, word and fixed-point types, and their abstract supertypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NumericType {
    /// Supertype of all numbers
    Number,
    /// Supertype of all signed numbers
    SignedNumber,
    /// Supertype of all integers
    Integer,
    /// Supertype of all signed integers
    SignedInteger,
    /// Supertype of all fixed-point numbers
    FixedPoint,
    /// Supertype of all signed fixed-point numbers
    SignedFixedPoint,
    /// Arbitrary precision signed integer
    Int,
    /// `Int8`
    Int8,
    /// `Int16`
    Int16,
    /// `Int32`
    Int32,
    /// `Int64`
    Int64,
    /// `Int128`
    Int128,
    /// `Int256`
    Int256,
    /// Arbitrary precision unsigned integer
    UInt,
    /// `UInt8`
    UInt8,
    /// `UInt16`
    UInt16,
    /// `UInt32`
    UInt32,
    /// `UInt64`
    UInt64,
    /// `UInt128`
    UInt128,
    /// `UInt256`
    UInt256,
    /// Wrapping 8-bit unsigned integer
    Word8,
    /// Wrapping 16-bit unsigned integer
    Word16,
    /// Wrapping 32-bit unsigned integer
    Word32,
    /// Wrapping 64-bit unsigned integer
    Word64,
    /// Wrapping 128-bit unsigned integer
    Word128,
    /// Wrapping 256-bit unsigned integer
    Word256,
    /// Signed 64-bit fixed point with scale 8
    Fix64,
    /// Unsigned 64-bit fixed point with scale 8
    UFix64,
}

impl NumericType {
    /// All numeric types, in interning order
    pub const ALL: [NumericType; 28] = [
        NumericType::Number,
        NumericType::SignedNumber,
        NumericType::Integer,
        NumericType::SignedInteger,
        NumericType::FixedPoint,
        NumericType::SignedFixedPoint,
        NumericType::Int,
        NumericType::Int8,
        NumericType::Int16,
        NumericType::Int32,
        NumericType::Int64,
        NumericType::Int128,
        NumericType::Int256,
        NumericType::UInt,
        NumericType::UInt8,
        NumericType::UInt16,
        NumericType::UInt32,
        NumericType::UInt64,
        NumericType::UInt128,
        NumericType::UInt256,
        NumericType::Word8,
        NumericType::Word16,
        NumericType::Word32,
        NumericType::Word64,
        NumericType::Word128,
        NumericType::Word256,
        NumericType::Fix64,
        NumericType::UFix64,
    ];

    /// Name of the type as written in programs
    pub fn name(self) -> &'static str {
        match self {
            NumericType::Number => "Number",
            NumericType::SignedNumber => "SignedNumber",
            NumericType::Integer => "Integer",
            NumericType::SignedInteger => "SignedInteger",
            NumericType::FixedPoint => "FixedPoint",
            NumericType::SignedFixedPoint => "SignedFixedPoint",
            NumericType::Int => "Int",
            NumericType::Int8 => "Int8",
            NumericType::Int16 => "Int16",
            NumericType::Int32 => "Int32",
            NumericType::Int64 => "Int64",
            NumericType::Int128 => "Int128",
            NumericType::Int256 => "Int256",
            NumericType::UInt => "UInt",
            NumericType::UInt8 => "UInt8",
            NumericType::UInt16 => "UInt16",
            NumericType::UInt32 => "UInt32",
            NumericType::UInt64 => "UInt64",
            NumericType::UInt128 => "UInt128",
            NumericType::UInt256 => "UInt256",
            NumericType::Word8 => "Word8",
            NumericType::Word16 => "Word16",
            NumericType::Word32 => "Word32",
            NumericType::Word64 => "Word64",
            NumericType::Word128 => "Word128",
            NumericType::Word256 => "Word256",
            NumericType::Fix64 => "Fix64",
            NumericType::UFix64 => "UFix64",
        }
    }

    /// Whether this is one of the abstract supertypes
    pub fn is_abstract(self) -> bool {
        matches!(
            self,
            NumericType::Number
                | NumericType::SignedNumber
                | NumericType::Integer
                | NumericType::SignedInteger
                | NumericType::FixedPoint
                | NumericType::SignedFixedPoint
        )
    }

    /// Whether this is a fixed-point type
    pub fn is_fixed_point(self) -> bool {
        matches!(
            self,
            NumericType::FixedPoint
                | NumericType::SignedFixedPoint
                | NumericType::Fix64
                | NumericType::UFix64
        )
    }

    /// Whether values of this type may be negative
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            NumericType::Number
                | NumericType::SignedNumber
                | NumericType::Integer
                | NumericType::SignedInteger
                | NumericType::FixedPoint
                | NumericType::SignedFixedPoint
                | NumericType::Int
                | NumericType::Int8
                | NumericType::Int16
                | NumericType::Int32
                | NumericType::Int64
                | NumericType::Int128
                | NumericType::Int256
                | NumericType::Fix64
        )
    }

    /// Width in bits, `None` for arbitrary precision and abstract types
    pub fn bit_size(self) -> Option<u16> {
        match self {
            NumericType::Int8 | NumericType::UInt8 | NumericType::Word8 => Some(8),
            NumericType::Int16 | NumericType::UInt16 | NumericType::Word16 => Some(16),
            NumericType::Int32 | NumericType::UInt32 | NumericType::Word32 => Some(32),
            NumericType::Int64
            | NumericType::UInt64
            | NumericType::Word64
            | NumericType::Fix64
            | NumericType::UFix64 => Some(64),
            NumericType::Int128 | NumericType::UInt128 | NumericType::Word128 => Some(128),
            NumericType::Int256 | NumericType::UInt256 | NumericType::Word256 => Some(256),
            _ => None,
        }
    }

    /// Number of decimal fractional digits
    pub fn scale(self) -> u32 {
        match self {
            NumericType::Fix64 | NumericType::UFix64 => 8,
            _ => 0,
        }
    }

    /// Saturating operations supported by this type
    pub fn saturating(self) -> SaturatingArithmetic {
        match self {
            NumericType::Int8
            | NumericType::Int16
            | NumericType::Int32
            | NumericType::Int64
            | NumericType::Int128
            | NumericType::Int256
            | NumericType::Fix64 => SaturatingArithmetic::ALL,
            NumericType::UInt => SaturatingArithmetic::new(false, true, false, false),
            NumericType::UInt8
            | NumericType::UInt16
            | NumericType::UInt32
            | NumericType::UInt64
            | NumericType::UInt128
            | NumericType::UInt256
            | NumericType::UFix64 => SaturatingArithmetic::new(true, true, true, false),
            _ => SaturatingArithmetic::NONE,
        }
    }

    /// Whether the integer `value` lies in the range of this type.
    ///
    /// For fixed-point types the integer part is checked. Arbitrary precision
    /// and abstract types accept every value that is not excluded by sign.
    pub fn contains(self, value: i128) -> bool {
        match self {
            NumericType::Fix64 => (-92_233_720_368..=92_233_720_368).contains(&value),
            NumericType::UFix64 => (0..=184_467_440_737).contains(&value),
            _ => match self.bit_size() {
                // 128 and 256 bit types are wider than any literal we carry
                Some(bits) if bits >= 128 => self.is_signed() || value >= 0,
                Some(bits) if self.is_signed() => {
                    let max = (1i128 << (bits - 1)) - 1;
                    (-max - 1..=max).contains(&value)
                }
                Some(bits) => (0..=(1i128 << bits) - 1).contains(&value),
                None => self.is_signed() || value >= 0,
            },
        }
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert!(NumericType::UInt8.contains(255));
        assert!(!NumericType::UInt8.contains(256));
        assert!(!NumericType::UInt8.contains(-1));
        assert!(NumericType::Int8.contains(-128));
        assert!(!NumericType::Int8.contains(128));
        assert!(NumericType::Int.contains(i128::MIN));
        assert!(!NumericType::UInt.contains(-1));
        assert!(NumericType::UInt256.contains(i128::MAX));
        assert!(NumericType::Fix64.contains(-92_233_720_368));
        assert!(!NumericType::UFix64.contains(184_467_440_738));
    }

    #[test]
    fn test_saturating_table() {
        assert_eq!(NumericType::Int32.saturating().function_names().count(), 4);
        assert_eq!(
            NumericType::UInt.saturating().function_names().collect::<Vec<_>>(),
            vec!["saturatingSubtract"]
        );
        assert!(!NumericType::UFix64.saturating().divide);
        assert_eq!(NumericType::Word64.saturating(), SaturatingArithmetic::default());
    }

    #[test]
    fn test_classification() {
        assert!(NumericType::SignedInteger.is_abstract());
        assert!(!NumericType::Int.is_abstract());
        assert_eq!(NumericType::UFix64.scale(), 8);
        assert_eq!(NumericType::Word128.bit_size(), Some(128));
        assert_eq!(NumericType::Int.bit_size(), None);
        assert!(!NumericType::Word8.is_signed());
    }
}
