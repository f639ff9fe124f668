//! ABI type grammar.
//!
//! Parses ABI type strings such as `(uint64,byte[32],(string,bool)[])` into an
//! [`AbiType`] tree and renders them back in canonical form.
//!
//! Reference types (`account`, `asset`, `application`) and transaction types
//! (`pay`, `axfer`, ...) are only valid as method arguments and are not part of
//! this grammar.

use crate::error::{SpecError, SpecResult};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{all_consuming, map, map_res, opt, value},
    multi::{many0, separated_list0},
    sequence::{delimited, preceded},
    IResult, Parser,
};
use std::fmt::{self, Display};
use std::str::FromStr;

/// A parsed ABI type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// `uint<N>`
    Uint(u16),
    /// `ufixed<N>x<M>`
    Ufixed {
        /// Bit width of the underlying integer
        bits: u16,
        /// Number of decimal places
        precision: u16,
    },
    /// `byte`
    Byte,
    /// `bool`
    Bool,
    /// `address`
    Address,
    /// `string`
    String,
    /// `T[N]`
    StaticArray(Box<AbiType>, usize),
    /// `T[]`
    DynamicArray(Box<AbiType>),
    /// `(T1,T2,...)`
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Returns true for `byte[N]` and `byte[]`.
    pub fn is_byte_array(&self) -> bool {
        match self {
            Self::StaticArray(inner, _) | Self::DynamicArray(inner) => **inner == Self::Byte,
            _ => false,
        }
    }

    fn validate(&self, type_str: &str) -> SpecResult<()> {
        match self {
            Self::Uint(bits) => validate_bits(type_str, *bits),
            Self::Ufixed { bits, precision } => {
                validate_bits(type_str, *bits)?;
                if !(1..=160).contains(precision) {
                    return Err(SpecError::invalid_abi_type(
                        type_str,
                        format!("ufixed precision {precision} is outside 1..=160"),
                    ));
                }
                Ok(())
            }
            Self::StaticArray(inner, _) | Self::DynamicArray(inner) => inner.validate(type_str),
            Self::Tuple(children) => children.iter().try_for_each(|c| c.validate(type_str)),
            Self::Byte | Self::Bool | Self::Address | Self::String => Ok(()),
        }
    }
}

fn validate_bits(type_str: &str, bits: u16) -> SpecResult<()> {
    if bits < 8 || bits > 512 || bits % 8 != 0 {
        return Err(SpecError::invalid_abi_type(
            type_str,
            format!("bit width {bits} must be a multiple of 8 between 8 and 512"),
        ));
    }
    Ok(())
}

impl FromStr for AbiType {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed: IResult<&str, AbiType> = all_consuming(abi_type).parse(s);
        let (_, parsed) = parsed
            .map_err(|e| SpecError::invalid_abi_type(s, format!("not a valid ABI type ({e})")))?;
        parsed.validate(s)?;
        Ok(parsed)
    }
}

impl Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Ufixed { bits, precision } => write!(f, "ufixed{bits}x{precision}"),
            Self::Byte => write!(f, "byte"),
            Self::Bool => write!(f, "bool"),
            Self::Address => write!(f, "address"),
            Self::String => write!(f, "string"),
            Self::StaticArray(inner, len) => write!(f, "{inner}[{len}]"),
            Self::DynamicArray(inner) => write!(f, "{inner}[]"),
            Self::Tuple(children) => {
                write!(f, "(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

fn number<T: FromStr>(input: &str) -> IResult<&str, T> {
    map_res(digit1, |digits: &str| digits.parse::<T>()).parse(input)
}

fn tuple_type(input: &str) -> IResult<&str, AbiType> {
    map(
        delimited(char('('), separated_list0(char(','), abi_type), char(')')),
        AbiType::Tuple,
    )
    .parse(input)
}

fn base_type(input: &str) -> IResult<&str, AbiType> {
    alt((
        tuple_type,
        map(
            (preceded(tag("ufixed"), number::<u16>), preceded(char('x'), number::<u16>)),
            |(bits, precision)| AbiType::Ufixed { bits, precision },
        ),
        map(preceded(tag("uint"), number::<u16>), AbiType::Uint),
        value(AbiType::Byte, tag("byte")),
        value(AbiType::Bool, tag("bool")),
        value(AbiType::Address, tag("address")),
        value(AbiType::String, tag("string")),
    ))
    .parse(input)
}

/// `[N]` yields `Some(N)`, `[]` yields `None`.
fn array_suffix(input: &str) -> IResult<&str, Option<usize>> {
    delimited(char('['), opt(number::<usize>), char(']')).parse(input)
}

fn abi_type(input: &str) -> IResult<&str, AbiType> {
    let (input, base) = base_type(input)?;
    let (input, suffixes) = many0(array_suffix).parse(input)?;
    let ty = suffixes.into_iter().fold(base, |inner, suffix| match suffix {
        Some(len) => AbiType::StaticArray(Box::new(inner), len),
        None => AbiType::DynamicArray(Box::new(inner)),
    });
    Ok((input, ty))
}
