//! Builtin symbol table shared by the compiler front end and the device VM
//!
//! This module is the call contract itself: the agreed set of builtin
//! names, ordered parameter types, and return types. The device VM exposes
//! this table for linking; the compiler front end exposes it for
//! type-checking calls. Both sides must agree on it byte for byte, so it
//! compiles in the host and device universes alike.
//!
//! Builtins are linked above user code: the entry at index `i` of
//! [`BUILTINS`] lives at address [`BUILTIN_ADDRESS_BASE`]` + i`. The index
//! in the table IS the dispatch slot.

use serde::{Deserialize, Serialize};

use crate::domain::value::ValueType;

/// First address of the builtin entry-point space.
///
/// Keeping builtins at `0x10000` and up leaves the low address space to
/// user code and data.
pub const BUILTIN_ADDRESS_BASE: u32 = 0x10000;

/// Number of declared builtins.
pub const BUILTIN_COUNT: usize = 21;

/// Return channel of a builtin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReturnType {
    /// No value is left for the caller
    Void,
    /// A single scalar of the given type
    Scalar(ValueType),
}

/// One entry in the builtin symbol table.
#[derive(Clone, Copy, Debug)]
pub struct BuiltinSignature {
    /// Source-level name the compiler resolves
    pub name: &'static str,
    /// Ordered parameter types
    pub params: &'static [ValueType],
    /// Return type
    pub ret: ReturnType,
}

/// Error type for call validation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallError {
    /// No builtin with the given name exists
    UnknownBuiltin,
    /// Wrong number of arguments
    ArityMismatch {
        /// Parameters the signature declares
        expected: u8,
        /// Arguments the call supplied
        found: u8,
    },
    /// An argument cannot widen into its declared parameter type
    TypeMismatch {
        /// Zero-based argument position
        index: u8,
        /// Declared parameter type
        expected: ValueType,
        /// Supplied argument type
        found: ValueType,
    },
}

const FLOAT1: &[ValueType] = &[ValueType::Float];
const INT1: &[ValueType] = &[ValueType::Int];
const INT2: &[ValueType] = &[ValueType::Int, ValueType::Int];
const TEXT1: &[ValueType] = &[ValueType::CharArray];
const MEASURE3: &[ValueType] = &[ValueType::Int, ValueType::FloatArray, ValueType::Int];
const NONE: &[ValueType] = &[];

const RET_FLOAT: ReturnType = ReturnType::Scalar(ValueType::Float);
const RET_INT: ReturnType = ReturnType::Scalar(ValueType::Int);

const fn float_fn(name: &'static str) -> BuiltinSignature {
    BuiltinSignature {
        name,
        params: FLOAT1,
        ret: RET_FLOAT,
    }
}

const fn procedure(name: &'static str, params: &'static [ValueType]) -> BuiltinSignature {
    BuiltinSignature {
        name,
        params,
        ret: ReturnType::Void,
    }
}

/// The builtin symbol table, in link order.
pub static BUILTINS: [BuiltinSignature; BUILTIN_COUNT] = [
    // Trigonometric and hyperbolic intrinsics (radians in, pure)
    float_fn("sin"),
    float_fn("cos"),
    float_fn("tan"),
    float_fn("asin"),
    float_fn("acos"),
    float_fn("atan"),
    float_fn("sinh"),
    float_fn("cosh"),
    float_fn("tanh"),
    float_fn("asinh"),
    float_fn("acosh"),
    float_fn("atanh"),
    // Other math intrinsics
    float_fn("sqrt"),
    float_fn("exp"),
    // I/O and hardware primitives
    procedure("print", TEXT1),
    BuiltinSignature {
        name: "getADC",
        params: INT2,
        ret: RET_INT,
    },
    procedure("setPin", INT2),
    procedure("SDI12SingleMeasurement", MEASURE3),
    // Timing and persistence controls
    procedure("delay", INT1),
    procedure("waitNextMeasure", NONE),
    procedure("saveTable", NONE),
];

/// Look up a builtin by source name.
pub fn lookup(name: &str) -> Option<&'static BuiltinSignature> {
    BUILTINS.iter().find(|sig| sig.name == name)
}

/// Dispatch slot of a builtin (its index in [`BUILTINS`]).
pub fn slot(name: &str) -> Option<usize> {
    BUILTINS.iter().position(|sig| sig.name == name)
}

/// Link address of a dispatch slot.
pub const fn address_of(slot: usize) -> u32 {
    BUILTIN_ADDRESS_BASE + slot as u32
}

/// Reverse-map a link address to its builtin.
///
/// Returns `None` for addresses outside the builtin space.
pub fn builtin_at(address: u32) -> Option<&'static BuiltinSignature> {
    let slot = address.checked_sub(BUILTIN_ADDRESS_BASE)? as usize;
    BUILTINS.get(slot)
}

/// Validate a call site against the builtin table.
///
/// Checks the name, the arity, and each argument type; scalar arguments
/// may widen (`char -> int -> float`), buffers must match exactly. On
/// success, returns the call's result type so the caller can type the
/// surrounding expression.
pub fn check_call(name: &str, args: &[ValueType]) -> Result<ReturnType, CallError> {
    let sig = lookup(name).ok_or(CallError::UnknownBuiltin)?;
    if args.len() != sig.params.len() {
        return Err(CallError::ArityMismatch {
            expected: sig.params.len() as u8,
            found: args.len() as u8,
        });
    }
    for (index, (&found, &expected)) in args.iter().zip(sig.params.iter()).enumerate() {
        if !found.widens_to(expected) {
            return Err(CallError::TypeMismatch {
                index: index as u8,
                expected,
                found,
            });
        }
    }
    Ok(sig.ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_complete() {
        assert_eq!(BUILTINS.len(), BUILTIN_COUNT);
        for name in [
            "sin", "cos", "tan", "asin", "acos", "atan", "sinh", "cosh", "tanh", "asinh", "acosh",
            "atanh", "sqrt", "exp", "print", "getADC", "setPin", "SDI12SingleMeasurement", "delay",
            "waitNextMeasure", "saveTable",
        ] {
            assert!(lookup(name).is_some(), "missing builtin {name}");
        }
    }

    #[test]
    fn test_slot_addressing() {
        assert_eq!(slot("sin"), Some(0));
        assert_eq!(address_of(0), 0x10000);

        let save_slot = slot("saveTable").unwrap();
        assert_eq!(save_slot, BUILTIN_COUNT - 1);

        let sig = builtin_at(address_of(save_slot)).unwrap();
        assert_eq!(sig.name, "saveTable");

        assert!(builtin_at(0x0FFF).is_none());
        assert!(builtin_at(address_of(BUILTIN_COUNT)).is_none());
    }

    #[test]
    fn test_documented_calls_check() {
        // Every declared signature accepts its own parameter list
        for sig in &BUILTINS {
            assert_eq!(check_call(sig.name, sig.params), Ok(sig.ret));
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        assert_eq!(
            check_call("frobnicate", &[]),
            Err(CallError::UnknownBuiltin)
        );
    }

    #[test]
    fn test_arity_rejected() {
        assert_eq!(
            check_call("sin", &[]),
            Err(CallError::ArityMismatch {
                expected: 1,
                found: 0
            })
        );
        assert_eq!(
            check_call("waitNextMeasure", &[ValueType::Int]),
            Err(CallError::ArityMismatch {
                expected: 0,
                found: 1
            })
        );
    }

    #[test]
    fn test_argument_widening() {
        // int and char widen into a float parameter
        assert_eq!(check_call("sqrt", &[ValueType::Int]), Ok(RET_FLOAT));
        assert_eq!(check_call("sqrt", &[ValueType::Char]), Ok(RET_FLOAT));
        // char widens into an int parameter
        assert_eq!(
            check_call("delay", &[ValueType::Char]),
            Ok(ReturnType::Void)
        );
    }

    #[test]
    fn test_narrowing_rejected() {
        assert_eq!(
            check_call("delay", &[ValueType::Float]),
            Err(CallError::TypeMismatch {
                index: 0,
                expected: ValueType::Int,
                found: ValueType::Float
            })
        );
        assert_eq!(
            check_call("setPin", &[ValueType::Int, ValueType::Float]),
            Err(CallError::TypeMismatch {
                index: 1,
                expected: ValueType::Int,
                found: ValueType::Float
            })
        );
    }

    #[test]
    fn test_buffer_parameters_are_exact() {
        assert_eq!(
            check_call(
                "SDI12SingleMeasurement",
                &[ValueType::Int, ValueType::FloatArray, ValueType::Int]
            ),
            Ok(ReturnType::Void)
        );
        assert_eq!(
            check_call(
                "SDI12SingleMeasurement",
                &[ValueType::Int, ValueType::IntArray, ValueType::Int]
            ),
            Err(CallError::TypeMismatch {
                index: 1,
                expected: ValueType::FloatArray,
                found: ValueType::IntArray
            })
        );
        assert_eq!(
            check_call("print", &[ValueType::Char]),
            Err(CallError::TypeMismatch {
                index: 0,
                expected: ValueType::CharArray,
                found: ValueType::Char
            })
        );
    }
}
