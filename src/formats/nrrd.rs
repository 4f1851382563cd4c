use std::collections::BTreeMap;
use std::io::{BufRead, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use ndarray::{Array3, ShapeBuilder};

use crate::model::{Encoding, SpaceFrame, Volume, VolumeMetadata, VoxelKind};

use super::{IoError, Result};

const MAGIC: &str = "NRRD0004";
const FORMAT: &str = "NRRD";

/// Header text (including the blank separator line) for an attached-data
/// NRRD file. Axis 0 of the array is the fastest-varying NRRD axis.
pub fn nrrd_header(volume: &Volume) -> String {
    let metadata = &volume.metadata;
    let shape = volume.shape();
    let mut text = String::new();
    text.push_str(MAGIC);
    text.push('\n');
    text.push_str("# Complete NRRD file format specification at:\n");
    text.push_str("# http://teem.sourceforge.net/nrrd/format.html\n");
    text.push_str("type: float\n");
    text.push_str("dimension: 3\n");
    text.push_str(&format!("space: {}\n", metadata.space.as_str()));
    text.push_str(&format!("sizes: {} {} {}\n", shape[0], shape[1], shape[2]));
    let directions = metadata
        .space_directions
        .iter()
        .map(format_vector)
        .collect::<Vec<_>>()
        .join(" ");
    text.push_str(&format!("space directions: {directions}\n"));
    let kinds = metadata
        .kinds
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    text.push_str(&format!("kinds: {kinds}\n"));
    text.push_str("endian: little\n");
    text.push_str(&format!("encoding: {}\n", metadata.encoding.as_str()));
    text.push_str(&format!(
        "space origin: {}\n",
        format_vector(&metadata.space_origin)
    ));
    text.push('\n');
    text
}

fn format_vector(vector: &[f64; 3]) -> String {
    format!("({},{},{})", vector[0], vector[1], vector[2])
}

pub(crate) fn write_nrrd<W: Write>(writer: &mut W, volume: &Volume) -> Result<()> {
    writer.write_all(nrrd_header(volume).as_bytes())?;
    match volume.metadata.encoding {
        Encoding::Raw => write_samples(writer, volume)?,
        Encoding::Gzip => {
            let mut encoder = GzEncoder::new(&mut *writer, Compression::default());
            write_samples(&mut encoder, volume)?;
            encoder.finish()?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_samples<W: Write>(writer: &mut W, volume: &Volume) -> Result<()> {
    // Reversed-axis iteration walks the array with axis 0 fastest.
    for value in volume.data.t().iter() {
        writer.write_f32::<LittleEndian>(*value)?;
    }
    Ok(())
}

pub(crate) fn read_nrrd<R: BufRead>(reader: &mut R) -> Result<Volume> {
    let fields = read_fields(reader)?;
    let field = |key: &str| {
        fields
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| IoError::malformed(FORMAT, format!("missing `{key}` field")))
    };

    let sample_type = field("type")?;
    if !matches!(sample_type, "float" | "float32") {
        return Err(IoError::UnsupportedLayout(format!(
            "only float NRRD samples are supported, found `{sample_type}`"
        )));
    }
    if field("dimension")? != "3" {
        return Err(IoError::UnsupportedLayout(
            "only 3-dimensional NRRD volumes are supported".into(),
        ));
    }
    if let Some(endian) = fields.get("endian") {
        if endian != "little" {
            return Err(IoError::UnsupportedLayout(format!(
                "unsupported endianness `{endian}`"
            )));
        }
    }

    let sizes = parse_sizes(field("sizes")?)?;
    let encoding = field("encoding")?
        .parse::<Encoding>()
        .map_err(IoError::UnsupportedLayout)?;
    let space_label = field("space")?;
    let space = SpaceFrame::parse(space_label)
        .ok_or_else(|| IoError::UnsupportedLayout(format!("unsupported space `{space_label}`")))?;
    let directions = parse_vectors(field("space directions")?)?;
    let space_directions: [[f64; 3]; 3] = directions
        .try_into()
        .map_err(|_| IoError::malformed(FORMAT, "expected three space direction vectors"))?;
    let space_origin = parse_vectors(field("space origin")?)?
        .into_iter()
        .next()
        .ok_or_else(|| IoError::malformed(FORMAT, "empty space origin"))?;
    let kinds = parse_kinds(field("kinds")?)?;

    let count = sizes.iter().product::<usize>();
    let mut values = vec![0f32; count];
    match encoding {
        Encoding::Raw => reader.read_f32_into::<LittleEndian>(&mut values)?,
        Encoding::Gzip => GzDecoder::new(reader).read_f32_into::<LittleEndian>(&mut values)?,
    }
    let data = Array3::from_shape_vec((sizes[0], sizes[1], sizes[2]).f(), values)
        .map_err(|error| IoError::malformed(FORMAT, error.to_string()))?;

    Ok(Volume::new(
        data,
        VolumeMetadata {
            space,
            space_directions,
            kinds,
            space_origin,
            encoding,
        },
    )?)
}

fn read_fields<R: BufRead>(reader: &mut R) -> Result<BTreeMap<String, String>> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if !line.starts_with("NRRD000") {
        return Err(IoError::malformed(FORMAT, "missing NRRD magic"));
    }
    let mut fields = BTreeMap::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(IoError::malformed(FORMAT, "header ends before data"));
        }
        let entry = line.trim_end_matches(['\n', '\r']);
        if entry.is_empty() {
            return Ok(fields);
        }
        if entry.starts_with('#') || entry.contains(":=") {
            continue;
        }
        let (key, value) = entry
            .split_once(": ")
            .ok_or_else(|| IoError::malformed(FORMAT, format!("bad header line `{entry}`")))?;
        fields.insert(key.trim().to_string(), value.trim().to_string());
    }
}

fn parse_sizes(value: &str) -> Result<[usize; 3]> {
    let sizes = value
        .split_whitespace()
        .map(|size| size.parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|error| IoError::malformed(FORMAT, format!("bad sizes `{value}`: {error}")))?;
    sizes
        .try_into()
        .map_err(|_| IoError::malformed(FORMAT, format!("expected three sizes, found `{value}`")))
}

fn parse_vectors(value: &str) -> Result<Vec<[f64; 3]>> {
    value
        .split_whitespace()
        .map(|token| {
            let inner = token
                .strip_prefix('(')
                .and_then(|rest| rest.strip_suffix(')'))
                .ok_or_else(|| IoError::malformed(FORMAT, format!("bad vector `{token}`")))?;
            let components = inner
                .split(',')
                .map(|component| component.trim().parse::<f64>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|error| {
                    IoError::malformed(FORMAT, format!("bad vector `{token}`: {error}"))
                })?;
            components
                .try_into()
                .map_err(|_| IoError::malformed(FORMAT, format!("vector `{token}` is not 3D")))
        })
        .collect()
}

fn parse_kinds(value: &str) -> Result<[VoxelKind; 3]> {
    let kinds = value
        .split_whitespace()
        .map(|kind| {
            VoxelKind::parse(kind)
                .ok_or_else(|| IoError::UnsupportedLayout(format!("unsupported kind `{kind}`")))
        })
        .collect::<Result<Vec<_>>>()?;
    kinds
        .try_into()
        .map_err(|_| IoError::malformed(FORMAT, format!("expected three kinds, found `{value}`")))
}
