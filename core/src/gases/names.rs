//! Standard gas names.
//!
//! # Supported Names
//!
//! - `Air`
//! - `Oxygen`, `O2`
//! - Nitrox: `EAN32`, `EANx32`, `Nx32`, `Nitrox 32`
//! - Trimix: `Trimix 18/35`, `Tx18/35`
//! - Heliox: `Heliox 10/90`, `Hx10/90`
//!
//! Names are case insensitive; fractions are whole percents.

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, multispace0, u32 as percent},
    combinator::{all_consuming, map, value},
    sequence::{delimited, preceded, separated_pair},
    IResult, Parser,
};

use super::mix::{Gas, AIR_FO2};
use crate::error::DecoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GasName {
    Air,
    Oxygen,
    Nitrox(u32),
    Trimix(u32, u32),
    Heliox(u32, u32),
}

/// Parse a standard gas name into its mixture.
pub fn by_name(name: &str) -> Result<Gas, DecoError> {
    let parsed = all_consuming(delimited(multispace0, parse_name, multispace0))
        .parse(name)
        .map(|(_, parsed)| parsed)
        .map_err(|_| DecoError::invalid(format!("unknown gas name: '{}'", name.trim())))?;

    match parsed {
        GasName::Air => Ok(Gas::air()),
        GasName::Oxygen => Ok(Gas::oxygen()),
        GasName::Nitrox(o2) => Gas::try_new(fraction(o2), 0.0),
        GasName::Trimix(o2, he) => Gas::try_new(fraction(o2), fraction(he)),
        GasName::Heliox(o2, he) => {
            if o2.checked_add(he) != Some(100) {
                return Err(DecoError::invalid(format!(
                    "heliox {o2}/{he} must not contain nitrogen"
                )));
            }
            Gas::try_new(fraction(o2), fraction(he))
        }
    }
}

/// Standard name of a mixture, fractions rounded to whole percents.
pub fn name_for(gas: &Gas) -> String {
    let o2 = (gas.fo2 * 100.0).round() as u32;
    let he = (gas.fhe * 100.0).round() as u32;

    if he == 0 {
        return match o2 {
            100 => "Oxygen".to_string(),
            o2 if o2 == (AIR_FO2 * 100.0) as u32 => "Air".to_string(),
            o2 => format!("EAN{o2}"),
        };
    }

    if o2.saturating_add(he) >= 100 {
        format!("Heliox {o2}/{he}")
    } else {
        format!("Trimix {o2}/{he}")
    }
}

fn fraction(percent: u32) -> f64 {
    percent as f64 / 100.0
}

fn parse_name(input: &str) -> IResult<&str, GasName> {
    alt((parse_oxygen, parse_air, parse_nitrox, parse_trimix, parse_heliox)).parse(input)
}

fn parse_air(input: &str) -> IResult<&str, GasName> {
    value(GasName::Air, tag_no_case("air")).parse(input)
}

fn parse_oxygen(input: &str) -> IResult<&str, GasName> {
    value(
        GasName::Oxygen,
        alt((tag_no_case("oxygen"), tag_no_case("o2"))),
    )
    .parse(input)
}

fn parse_nitrox(input: &str) -> IResult<&str, GasName> {
    let prefix = alt((
        tag_no_case("eanx"),
        tag_no_case("ean"),
        tag_no_case("nitrox"),
        tag_no_case("nx"),
    ));
    map(preceded((prefix, multispace0), percent), GasName::Nitrox).parse(input)
}

fn parse_trimix(input: &str) -> IResult<&str, GasName> {
    let prefix = alt((tag_no_case("trimix"), tag_no_case("tx")));
    map(preceded((prefix, multispace0), parse_fractions), |(o2, he)| {
        GasName::Trimix(o2, he)
    })
    .parse(input)
}

fn parse_heliox(input: &str) -> IResult<&str, GasName> {
    let prefix = alt((tag_no_case("heliox"), tag_no_case("hx")));
    map(preceded((prefix, multispace0), parse_fractions), |(o2, he)| {
        GasName::Heliox(o2, he)
    })
    .parse(input)
}

fn parse_fractions(input: &str) -> IResult<&str, (u32, u32)> {
    separated_pair(
        percent,
        delimited(multispace0, char('/'), multispace0),
        percent,
    )
    .parse(input)
}
