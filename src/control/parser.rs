//! # Control Line Parser
//!
//! Parses one text line from a control transport into a [`Command`]. The
//! grammar is a verb followed by whitespace-separated or comma-separated
//! arguments, one command per line, e.g.:
//!
//! ```text
//! PS MyStation
//! RT Now playing: Example Track
//! PI 0x1A2B
//! AF 87.6,98.0,101.2
//! RTPLUS 4,0,5 running=1
//! ```

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, tag_no_case};
use nom::character::complete::{char, digit1, hex_digit1, multispace0, multispace1};
use nom::combinator::{map, map_res, opt, rest, value};
use nom::multi::separated_list1;
use nom::sequence::{preceded, separated_pair, tuple};
use nom::IResult;

use crate::error::RdsError;
use crate::rds::{ErtCharset, ProgramFlags, RtPlusTag};

use super::command::Command;

fn ws_rest(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, rest)(input)
}

fn u16_hex_or_dec(input: &str) -> IResult<&str, u16> {
    alt((
        map_res(preceded(tag_no_case("0x"), hex_digit1), |s| {
            u16::from_str_radix(s, 16)
        }),
        map_res(digit1, |s: &str| s.parse::<u16>()),
    ))(input)
}

fn u8_dec(input: &str) -> IResult<&str, u8> {
    map_res(digit1, |s: &str| s.parse::<u8>())(input)
}

fn bool_flag(input: &str) -> IResult<&str, bool> {
    alt((value(true, char('1')), value(false, char('0'))))(input)
}

fn float(input: &str) -> IResult<&str, f64> {
    map_res(is_not(", \t"), |s: &str| s.parse::<f64>())(input)
}

fn af_list(input: &str) -> IResult<&str, Vec<f64>> {
    separated_list1(char(','), float)(input)
}

fn rtplus_tag(input: &str) -> IResult<&str, RtPlusTag> {
    map(
        tuple((
            u8_dec,
            preceded(char(','), u8_dec),
            preceded(char(','), u8_dec),
        )),
        |(content_type, start, length)| RtPlusTag {
            content_type,
            start,
            length,
        },
    )(input)
}

/// Parses one control line into a [`Command`]. Returns
/// `RdsError::Configuration` on malformed input, naming the offending line.
pub fn parse_line(line: &str) -> Result<Command, RdsError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Err(RdsError::Configuration("empty or comment line".into()));
    }

    let result: IResult<&str, Command> = alt((
        map(preceded(tuple((tag_no_case("PI"), multispace1)), u16_hex_or_dec), Command::SetPi),
        map(preceded(tuple((tag_no_case("PS"), multispace1)), ws_rest), |s: &str| {
            Command::SetPs(s.to_string())
        }),
        map(preceded(tuple((tag_no_case("RT"), multispace1)), ws_rest), |s: &str| {
            Command::SetRt(s.to_string())
        }),
        map(preceded(tuple((tag_no_case("PTYN"), multispace1)), ws_rest), |s: &str| {
            Command::SetPtyn(s.to_string())
        }),
        map(preceded(tuple((tag_no_case("PTY"), multispace1)), u8_dec), Command::SetPty),
        map(preceded(tuple((tag_no_case("LPS"), multispace1)), ws_rest), |s: &str| {
            Command::SetLps(s.to_string())
        }),
        map(
            preceded(
                tuple((tag_no_case("ERT"), multispace1)),
                separated_pair(
                    alt((
                        value(ErtCharset::Utf8, tag_no_case("utf8")),
                        value(ErtCharset::Ucs2, tag_no_case("ucs2")),
                    )),
                    multispace1,
                    rest,
                ),
            ),
            |(charset, text): (ErtCharset, &str)| Command::SetErt(text.to_string(), charset),
        ),
        map(preceded(tuple((tag_no_case("AF"), multispace1)), af_list), Command::SetAf),
        map(
            preceded(
                tuple((tag_no_case("RTPLUS"), multispace1)),
                tuple((
                    rtplus_tag,
                    opt(preceded(tuple((multispace1, char(';'), multispace0)), rtplus_tag)),
                    opt(preceded(
                        tuple((multispace1, tag_no_case("running="))),
                        bool_flag,
                    )),
                )),
            ),
            |(tag1, tag2, running)| Command::SetRtPlus {
                tag1: Some(tag1),
                tag2,
                running: running.unwrap_or(true),
            },
        ),
        value(
            Command::SetRtPlus {
                tag1: None,
                tag2: None,
                running: false,
            },
            tag_no_case("RTPLUS_CLEAR"),
        ),
        map(preceded(tuple((tag_no_case("RFT"), multispace1)), ws_rest), |s: &str| {
            Command::LoadRftFile(s.to_string())
        }),
        value(Command::ClearRft, tag_no_case("RFT_CLEAR")),
        value(Command::ClearAf, tag_no_case("AFC")),
        map(preceded(tuple((tag_no_case("VOL"), multispace1)), u8_dec), Command::SetVolume),
        value(Command::Reset, tag_no_case("RESET")),
        value(Command::Shutdown, tag_no_case("QUIT")),
    ))(line);

    match result {
        Ok((_, command)) => Ok(command),
        Err(_) => Err(RdsError::Configuration(format!("unrecognized command line: {line:?}"))),
    }
}

/// Parses the four boolean flag commands (`TP`, `TA`, `MS`, `DI.*`) which
/// fold into the current `ProgramFlags` rather than producing a `Command`
/// directly, since they must be merged against the existing flag set.
/// Returns `(flag, value)` for the caller to apply.
pub fn parse_flag_line(line: &str) -> Result<(ProgramFlags, bool), RdsError> {
    let line = line.trim();
    let result: IResult<&str, (ProgramFlags, bool)> = alt((
        map(
            preceded(tuple((tag_no_case("TP"), multispace1)), bool_flag),
            |v| (ProgramFlags::TP, v),
        ),
        map(
            preceded(tuple((tag_no_case("TA"), multispace1)), bool_flag),
            |v| (ProgramFlags::TA, v),
        ),
        map(
            preceded(tuple((tag_no_case("MS"), multispace1)), bool_flag),
            |v| (ProgramFlags::MS, v),
        ),
        map(
            preceded(
                tuple((tag_no_case("DI_DYNAMIC_PTY"), multispace1)),
                bool_flag,
            ),
            |v| (ProgramFlags::DI_DYNAMIC_PTY, v),
        ),
        map(
            preceded(tuple((tag_no_case("DI_COMPRESSED"), multispace1)), bool_flag),
            |v| (ProgramFlags::DI_COMPRESSED, v),
        ),
        map(
            preceded(
                tuple((tag_no_case("DI_ARTIFICIAL_HEAD"), multispace1)),
                bool_flag,
            ),
            |v| (ProgramFlags::DI_ARTIFICIAL_HEAD, v),
        ),
        map(
            preceded(tuple((tag_no_case("DI_STEREO"), multispace1)), bool_flag),
            |v| (ProgramFlags::DI_STEREO, v),
        ),
    ))(line);

    result
        .map(|(_, parsed)| parsed)
        .map_err(|_| RdsError::Configuration(format!("unrecognized flag line: {line:?}")))
}

/// Parses one control line, trying the flag grammar first since its verbs
/// (`TP`, `TA`, `MS`, `DI_*`) don't collide with [`parse_line`]'s.
pub fn parse(line: &str, current_flags: ProgramFlags) -> Result<Command, RdsError> {
    if let Ok((flag, value)) = parse_flag_line(line) {
        let mut flags = current_flags;
        flags.set(flag, value);
        return Ok(Command::SetFlags(flags));
    }
    parse_line(line)
}
