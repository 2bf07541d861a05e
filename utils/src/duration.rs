//! Parser for duration strings such as `1s`, `500ms` or `1m30s`.
//!
//! A duration is `0` or a sequence of decimal numbers, each with an optional fraction and a
//! mandatory unit suffix. Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`.

use std::convert::TryFrom;
use std::time::Duration;

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit0};
use nom::combinator::{all_consuming, opt, value};
use nom::error::{Error, ErrorKind};
use nom::multi::many1;
use nom::sequence::{pair, preceded, tuple};
use nom::{Finish, IResult};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
#[error("invalid duration {0:?}")]
pub struct InvalidDuration(pub String);

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fraction digits beyond this do not change the result at nanosecond precision
const MAX_FRAC_DIGITS: usize = 18;

fn unit(input: &str) -> IResult<&str, u128> {
    alt((
        value(1, tag("ns")),
        value(NANOS_PER_MICRO, tag("us")),
        value(NANOS_PER_MICRO, tag("µs")),
        value(NANOS_PER_MICRO, tag("μs")),
        value(NANOS_PER_MILLI, tag("ms")),
        value(NANOS_PER_SEC, tag("s")),
        value(60 * NANOS_PER_SEC, tag("m")),
        value(3600 * NANOS_PER_SEC, tag("h")),
    ))(input)
}

/// Integer and fraction digits, at least one of them non empty
fn number(input: &str) -> IResult<&str, (&str, &str)> {
    let (rest, (int, frac)) = pair(digit0, opt(preceded(char('.'), digit0)))(input)?;
    let frac = frac.unwrap_or("");
    if int.is_empty() && frac.is_empty() {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Digit)));
    }
    Ok((rest, (int, frac)))
}

fn component(input: &str) -> IResult<&str, ((&str, &str), u128)> {
    tuple((number, unit))(input)
}

fn to_nanos((int, frac): (&str, &str), unit: u128) -> Option<u128> {
    let int = if int.is_empty() {
        0
    } else {
        int.parse::<u128>().ok()?
    };
    let mut nanos = int.checked_mul(unit)?;

    let frac = &frac[..frac.len().min(MAX_FRAC_DIGITS)];
    if !frac.is_empty() {
        let scale = 10u128.pow(frac.len() as u32);
        let frac = frac.parse::<u128>().ok()?;
        nanos = nanos.checked_add(frac.checked_mul(unit)? / scale)?;
    }
    Some(nanos)
}

pub fn parse(s: &str) -> Result<Duration, InvalidDuration> {
    if s == "0" {
        return Ok(Duration::from_secs(0));
    }

    let invalid = || InvalidDuration(String::from(s));
    let (_, components) = all_consuming(many1(component))(s)
        .finish()
        .map_err(|_| invalid())?;

    let mut total: u128 = 0;
    for (number, unit) in components {
        let nanos = to_nanos(number, unit).ok_or_else(invalid)?;
        total = total.checked_add(nanos).ok_or_else(invalid)?;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid())?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}
