//! Primary-HDU FITS image reader and writer.
//!
//! Headers are 80-character cards in 2880-byte blocks terminated by `END`;
//! the data unit that follows is big-endian with `NAXIS1` varying fastest.

use std::io::{ErrorKind, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use ndarray::{Array, IxDyn};

use crate::model::{Card, Cube, CubeF32, FitsHeader, HeaderValue, PixelType};

use super::util::{padding, real_literal};
use super::{IoError, Result};

pub(crate) const BLOCK_SIZE: usize = 2880;
pub(crate) const CARD_SIZE: usize = 80;
const MAX_AXES: i64 = 999;
/// Longest quoted string that fits after `KEYWORD= '`.
const MAX_STRING_SIZE: usize = 68;
const FORMAT: &str = "FITS";

enum Record {
    End,
    Blank,
    Card(Card),
}

pub(crate) fn read_fits<R: Read>(reader: &mut R) -> Result<CubeF32> {
    let header = read_header(reader)?;
    let bitpix = header
        .get_i64("BITPIX")
        .ok_or_else(|| IoError::malformed(FORMAT, "missing BITPIX"))?;
    let pixel_type = PixelType::from_bitpix(bitpix)
        .ok_or_else(|| IoError::malformed(FORMAT, format!("unsupported BITPIX {bitpix}")))?;
    let naxis = header
        .get_i64("NAXIS")
        .ok_or_else(|| IoError::malformed(FORMAT, "missing NAXIS"))?;
    if naxis <= 0 {
        return Err(IoError::UnsupportedLayout(
            "primary HDU carries no image data".into(),
        ));
    }

    if naxis > MAX_AXES {
        return Err(IoError::malformed(
            FORMAT,
            format!("NAXIS {naxis} exceeds the FITS limit of {MAX_AXES}"),
        ));
    }

    let mut shape = Vec::with_capacity(naxis as usize);
    for axis in 1..=naxis {
        let length = header
            .get_i64(&format!("NAXIS{axis}"))
            .filter(|length| *length >= 0)
            .ok_or_else(|| IoError::malformed(FORMAT, format!("missing or negative NAXIS{axis}")))?;
        shape.push(usize::try_from(length).map_err(|_| {
            IoError::malformed(FORMAT, format!("NAXIS{axis} {length} does not fit in memory"))
        })?);
    }
    shape.reverse();

    let sizes = shape
        .iter()
        .try_fold(1usize, |count, length| count.checked_mul(*length))
        .and_then(|count| {
            count
                .checked_mul(pixel_type.byte_width())
                .map(|bytes| (count, bytes))
        })
        .ok_or_else(|| IoError::malformed(FORMAT, "declared data unit size overflows"))?;
    let values = read_samples(reader, pixel_type, sizes, &header)?;
    let data = Array::from_shape_vec(IxDyn(&shape), values)
        .map_err(|error| IoError::malformed(FORMAT, error.to_string()))?;
    Ok(Cube::new(data, header, pixel_type)?)
}

fn read_header<R: Read>(reader: &mut R) -> Result<FitsHeader> {
    let mut header = FitsHeader::new();
    let mut block = [0u8; BLOCK_SIZE];
    let mut first = true;
    loop {
        reader
            .read_exact(&mut block)
            .map_err(|error| truncated(error, "header ends before END card"))?;
        for bytes in block.chunks_exact(CARD_SIZE) {
            if !bytes.is_ascii() {
                return Err(IoError::malformed(FORMAT, "header contains non-ASCII bytes"));
            }
            let record = std::str::from_utf8(bytes)
                .map_err(|error| IoError::malformed(FORMAT, error.to_string()))?;
            if first {
                if !record.starts_with("SIMPLE") {
                    return Err(IoError::malformed(FORMAT, "first card is not SIMPLE"));
                }
                first = false;
            }
            match parse_record(record)? {
                Record::End => return Ok(header),
                Record::Blank => {}
                Record::Card(card) => header.push(card),
            }
        }
    }
}

fn parse_record(record: &str) -> Result<Record> {
    let keyword = record[..8].trim_end();
    if keyword == "END" {
        return Ok(Record::End);
    }
    if record.trim().is_empty() {
        return Ok(Record::Blank);
    }
    let rest = &record[8..];
    let card = match rest.strip_prefix("= ") {
        Some(field) if !matches!(keyword, "COMMENT" | "HISTORY" | "") => {
            let (value, comment) = parse_value(field)?;
            Card {
                keyword: keyword.to_string(),
                value,
                comment,
                has_value: true,
            }
        }
        _ => Card::commentary(keyword, rest.trim_end()),
    };
    Ok(Record::Card(card))
}

fn parse_value(field: &str) -> Result<(HeaderValue, Option<String>)> {
    let trimmed = field.trim_start();
    if let Some(body) = trimmed.strip_prefix('\'') {
        let mut text = String::new();
        let mut chars = body.char_indices().peekable();
        let mut end = None;
        while let Some((index, ch)) = chars.next() {
            if ch != '\'' {
                text.push(ch);
                continue;
            }
            if matches!(chars.peek(), Some((_, '\''))) {
                text.push('\'');
                chars.next();
            } else {
                end = Some(index + 1);
                break;
            }
        }
        let end = end.ok_or_else(|| IoError::malformed(FORMAT, "unterminated string value"))?;
        let text = text.trim_end().to_string();
        return Ok((HeaderValue::Text(text), comment_of(&body[end..])));
    }

    let (raw, comment) = match trimmed.split_once('/') {
        Some((raw, comment)) => (raw.trim(), non_empty(comment)),
        None => (trimmed.trim(), None),
    };
    let value = match raw {
        "" => HeaderValue::Empty,
        "T" => HeaderValue::Logical(true),
        "F" => HeaderValue::Logical(false),
        other => {
            if let Ok(integer) = other.parse::<i64>() {
                HeaderValue::Integer(integer)
            } else if let Ok(real) = other.replace(['D', 'd'], "E").parse::<f64>() {
                HeaderValue::Real(real)
            } else {
                HeaderValue::Text(other.to_string())
            }
        }
    };
    Ok((value, comment))
}

fn comment_of(rest: &str) -> Option<String> {
    rest.trim_start().strip_prefix('/').and_then(non_empty)
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Reads the data unit into memory before decoding, so a header that
/// declares more samples than the stream holds fails without allocating
/// the declared size.
fn read_samples<R: Read>(
    reader: &mut R,
    pixel_type: PixelType,
    (count, byte_count): (usize, usize),
    header: &FitsHeader,
) -> Result<Vec<f32>> {
    let mut bytes = Vec::new();
    reader
        .take(byte_count as u64)
        .read_to_end(&mut bytes)
        .map_err(IoError::Io)?;
    if bytes.len() < byte_count {
        return Err(IoError::malformed(
            FORMAT,
            "data unit is shorter than NAXIS declares",
        ));
    }
    let mut data = bytes.as_slice();

    let bscale = header.get_f64("BSCALE").unwrap_or(1.0);
    let bzero = header.get_f64("BZERO").unwrap_or(0.0);
    let identity = bscale == 1.0 && bzero == 0.0;
    let blank = if pixel_type.is_integer() {
        header.get_i64("BLANK")
    } else {
        None
    };
    let scale = |raw: f64| (raw * bscale + bzero) as f32;
    let integer = |raw: i64| {
        if Some(raw) == blank {
            f32::NAN
        } else {
            scale(raw as f64)
        }
    };

    let values = match pixel_type {
        PixelType::U8 => bytes.iter().map(|raw| integer(i64::from(*raw))).collect(),
        PixelType::I16 => {
            let mut buffer = vec![0i16; count];
            data.read_i16_into::<BigEndian>(&mut buffer)?;
            buffer.into_iter().map(|raw| integer(i64::from(raw))).collect()
        }
        PixelType::I32 => {
            let mut buffer = vec![0i32; count];
            data.read_i32_into::<BigEndian>(&mut buffer)?;
            buffer.into_iter().map(|raw| integer(i64::from(raw))).collect()
        }
        PixelType::I64 => {
            let mut buffer = vec![0i64; count];
            data.read_i64_into::<BigEndian>(&mut buffer)?;
            buffer.into_iter().map(integer).collect()
        }
        PixelType::F32 => {
            let mut buffer = vec![0f32; count];
            data.read_f32_into::<BigEndian>(&mut buffer)?;
            if identity {
                buffer
            } else {
                buffer.into_iter().map(|raw| scale(f64::from(raw))).collect()
            }
        }
        PixelType::F64 => {
            let mut buffer = vec![0f64; count];
            data.read_f64_into::<BigEndian>(&mut buffer)?;
            buffer.into_iter().map(scale).collect()
        }
    };
    Ok(values)
}

fn truncated(error: std::io::Error, message: &str) -> IoError {
    if error.kind() == ErrorKind::UnexpectedEof {
        IoError::malformed(FORMAT, message)
    } else {
        IoError::Io(error)
    }
}

/// Writes the cube as a single primary HDU with `BITPIX = -32`. Structural
/// keywords are regenerated from the data; scaling keywords are dropped
/// because the samples are already physical values.
pub(crate) fn write_fits<W: Write>(writer: &mut W, cube: &CubeF32) -> Result<()> {
    let header = output_header(cube);
    writer.write_all(render_header(&header).as_bytes())?;
    for value in cube.data.iter() {
        writer.write_f32::<BigEndian>(*value)?;
    }
    let data_bytes = cube.data.len() * PixelType::F32.byte_width();
    writer.write_all(&vec![0u8; padding(data_bytes, BLOCK_SIZE)])?;
    writer.flush()?;
    Ok(())
}

fn output_header(cube: &CubeF32) -> FitsHeader {
    let mut header = FitsHeader::new();
    header.set("SIMPLE", HeaderValue::Logical(true));
    header.set("BITPIX", HeaderValue::Integer(PixelType::F32.bitpix()));
    header.set("NAXIS", HeaderValue::Integer(cube.ndim() as i64));
    for (index, length) in cube.shape().iter().rev().enumerate() {
        header.set(
            &format!("NAXIS{}", index + 1),
            HeaderValue::Integer(*length as i64),
        );
    }
    for card in cube.header.cards() {
        if !is_structural(&card.keyword) {
            header.push(card.clone());
        }
    }
    header
}

fn is_structural(keyword: &str) -> bool {
    match keyword {
        "SIMPLE" | "BITPIX" | "NAXIS" | "BSCALE" | "BZERO" | "BLANK" | "END" => true,
        other => other
            .strip_prefix("NAXIS")
            .is_some_and(|suffix| !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit())),
    }
}

/// Renders header cards followed by `END`, space-padded to whole blocks.
pub fn render_header(header: &FitsHeader) -> String {
    let mut text = String::with_capacity(BLOCK_SIZE);
    for card in header.cards() {
        text.push_str(&format_card(card));
    }
    text.push_str(&format!("{:<width$}", "END", width = CARD_SIZE));
    let pad = padding(text.len(), BLOCK_SIZE);
    text.extend(std::iter::repeat_n(' ', pad));
    text
}

fn format_card(card: &Card) -> String {
    let mut record = format!("{:<8}", card.keyword);
    if card.is_commentary() {
        record.push_str(card.comment.as_deref().unwrap_or_default());
    } else {
        record.push_str("= ");
        match &card.value {
            HeaderValue::Text(text) => record.push_str(&quoted(&card.keyword, text)),
            HeaderValue::Logical(value) => {
                record.push_str(&format!("{:>20}", if *value { "T" } else { "F" }))
            }
            HeaderValue::Integer(value) => record.push_str(&format!("{value:>20}")),
            HeaderValue::Real(value) => record.push_str(&format!("{:>20}", real_literal(*value))),
            HeaderValue::Empty => record.push_str(&" ".repeat(20)),
        }
        if let Some(comment) = &card.comment {
            record.push_str(" / ");
            record.push_str(comment);
        }
    }
    let mut end = record.len().min(CARD_SIZE);
    while !record.is_char_boundary(end) {
        end -= 1;
    }
    record.truncate(end);
    format!("{record:<width$}", width = CARD_SIZE)
}

/// Quotes a string value, doubling embedded quotes. Text that cannot fit in
/// one card is cut inside the quotes so the record stays parseable.
fn quoted(keyword: &str, text: &str) -> String {
    let mut escaped = String::with_capacity(MAX_STRING_SIZE);
    let mut width = 0;
    for ch in text.chars() {
        let needed = if ch == '\'' { 2 } else { 1 };
        if width + needed > MAX_STRING_SIZE {
            tracing::warn!(keyword, length = text.len(), "truncating long string value");
            break;
        }
        escaped.push(ch);
        if ch == '\'' {
            escaped.push('\'');
        }
        width += needed;
    }
    format!("'{escaped:<8}'")
}
