use std::fs;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use ndarray::{Array, Array3, IxDyn};
use tempfile::tempdir;

use super::{
    IoError, nrrd_header, read_cube, read_cube_from_bytes, read_volume, render_header, write_cube,
    write_volume,
};
use crate::model::{
    Card, Cube, Encoding, FitsHeader, HeaderValue, PixelType, SpaceFrame, Volume, VolumeMetadata,
    VoxelKind,
};

fn cube_header(bitpix: i64, lengths: &[i64]) -> FitsHeader {
    let mut header = FitsHeader::new();
    header.set("SIMPLE", HeaderValue::Logical(true));
    header.set("BITPIX", HeaderValue::Integer(bitpix));
    header.set("NAXIS", HeaderValue::Integer(lengths.len() as i64));
    for (index, length) in lengths.iter().enumerate() {
        header.set(&format!("NAXIS{}", index + 1), HeaderValue::Integer(*length));
    }
    header
}

fn test_volume(encoding: Encoding) -> Volume {
    let mut data = Array::from_shape_vec((4, 3, 2), (0..24).map(|v| v as f32).collect())
        .expect("shape");
    // Non-standard strides, as produced by axis reordering.
    data.swap_axes(0, 2);
    Volume::new(
        data,
        VolumeMetadata {
            space: SpaceFrame::LeftPosteriorSuperior,
            space_directions: [[-1.0, 0.0, 0.0], [0.0, 0.625, 0.0], [0.0, 0.0, 1.0]],
            kinds: [VoxelKind::Domain; 3],
            space_origin: [50.0, -25.0, -40.0],
            encoding,
        },
    )
    .expect("volume")
}

#[test]
fn fits_roundtrip_preserves_header_and_storage_order() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cube.fits");
    let mut header = cube_header(-32, &[4, 3, 2]);
    header.set("CTYPE1", HeaderValue::Text("RA---SIN".into()));
    header.set("CDELT1", HeaderValue::Real(-0.01));
    header.set("CRVAL3", HeaderValue::Real(7.8e3));
    header.push(Card::commentary("HISTORY", "synthetic cube"));
    let data = Array::from_shape_vec(IxDyn(&[2, 3, 4]), (0..24).map(|v| v as f32).collect())
        .expect("shape");
    let cube = Cube::new(data.clone(), header, PixelType::F32).expect("cube");

    write_cube(&path, &cube, false).expect("write fits");
    assert_eq!(fs::metadata(&path).expect("stat").len() % 2880, 0);

    let restored = read_cube(&path).expect("read fits");
    assert_eq!(restored.shape(), &[2, 3, 4]);
    assert_eq!(restored.data, data);
    assert_eq!(restored.pixel_type, PixelType::F32);
    assert_eq!(restored.header.get_f64("CDELT1"), Some(-0.01));
    assert_eq!(restored.header.get_f64("CRVAL3"), Some(7800.0));
    assert_eq!(
        restored.header.get("CTYPE1").and_then(HeaderValue::as_str),
        Some("RA---SIN")
    );
    assert!(
        restored
            .header
            .cards()
            .iter()
            .any(|card| card.keyword == "HISTORY")
    );
    assert_eq!(restored.source.as_deref(), Some(path.as_path()));
}

#[test]
fn fits_reader_applies_scaling_and_blank() {
    let mut header = cube_header(16, &[3, 1, 1]);
    header.set("BSCALE", HeaderValue::Real(2.0));
    header.set("BZERO", HeaderValue::Real(10.0));
    header.set("BLANK", HeaderValue::Integer(-1));
    let mut bytes = render_header(&header).into_bytes();
    for raw in [3_i16, -1, 0] {
        bytes.write_i16::<BigEndian>(raw).expect("write");
    }
    bytes.resize(bytes.len() + 2880 - 6, 0);

    let cube = read_cube_from_bytes(&bytes).expect("read");
    assert_eq!(cube.pixel_type, PixelType::I16);
    let values = cube.data.iter().copied().collect::<Vec<_>>();
    assert_eq!(values[0], 16.0);
    assert!(values[1].is_nan());
    assert_eq!(values[2], 10.0);
}

#[test]
fn fits_reader_parses_quoted_strings_and_comments() {
    let mut header = cube_header(-32, &[1, 1, 1]);
    header.push(
        Card::new("OBJECT", HeaderValue::Text("NGC 1333's core".into())).with_comment("target"),
    );
    header.push(Card::new("CDELT3", HeaderValue::Real(1.0e-20)));
    let mut bytes = render_header(&header).into_bytes();
    bytes.write_f32::<BigEndian>(1.5).expect("write");
    bytes.resize(bytes.len() + 2876, 0);

    let cube = read_cube_from_bytes(&bytes).expect("read");
    let object = cube.header.cards().iter().find(|card| card.keyword == "OBJECT");
    let object = object.expect("object card");
    assert_eq!(object.value, HeaderValue::Text("NGC 1333's core".into()));
    assert_eq!(object.comment.as_deref(), Some("target"));
    assert_eq!(cube.header.get_f64("CDELT3"), Some(1.0e-20));
}

#[test]
fn fits_reader_rejects_truncated_data() {
    let header = cube_header(-32, &[10, 10, 10]);
    let mut bytes = render_header(&header).into_bytes();
    bytes.extend_from_slice(&[0u8; 16]);
    let error = read_cube_from_bytes(&bytes).expect_err("truncated");
    assert!(matches!(error, IoError::Malformed { .. }));
}

#[test]
fn fits_reader_rejects_oversized_declarations() {
    let header = cube_header(-32, &[1 << 30, 1 << 30, 1 << 30]);
    let error = read_cube_from_bytes(render_header(&header).as_bytes()).expect_err("overflow");
    assert!(matches!(
        error,
        IoError::Malformed { ref message, .. } if message.contains("overflows")
    ));

    let header = cube_header(-64, &[1 << 20, 1 << 20, 4]);
    let mut bytes = render_header(&header).into_bytes();
    bytes.extend_from_slice(&[0u8; 2880]);
    let error = read_cube_from_bytes(&bytes).expect_err("short stream");
    assert!(matches!(
        error,
        IoError::Malformed { ref message, .. } if message.contains("shorter")
    ));

    let mut header = cube_header(-32, &[1]);
    header.set("NAXIS", HeaderValue::Integer(1000));
    let error = read_cube_from_bytes(render_header(&header).as_bytes()).expect_err("naxis");
    assert!(matches!(
        error,
        IoError::Malformed { ref message, .. } if message.contains("999")
    ));
}

fn single_pixel_bytes(header: &FitsHeader) -> Vec<u8> {
    let mut bytes = render_header(header).into_bytes();
    bytes.write_f32::<BigEndian>(0.0).expect("write");
    bytes.resize(bytes.len() + 2876, 0);
    bytes
}

#[test]
fn long_string_values_are_cut_inside_the_quotes() {
    let mut header = cube_header(-32, &[1, 1, 1]);
    let object = "N".repeat(75);
    header.set("OBJECT", HeaderValue::Text(object.clone()));
    header.set("ORIGIN", HeaderValue::Text("'".repeat(40)));

    let cube = read_cube_from_bytes(&single_pixel_bytes(&header)).expect("read");
    assert_eq!(
        cube.header.get("OBJECT").and_then(HeaderValue::as_str),
        Some(&object[..68])
    );
    assert_eq!(
        cube.header.get("ORIGIN").and_then(HeaderValue::as_str),
        Some("'".repeat(34).as_str())
    );
}

#[test]
fn indicator_less_cards_are_written_back_verbatim() {
    let mut header = cube_header(-32, &[1, 1, 1]);
    header.push(Card::commentary("CONTINUE", "  'tail of long string'"));
    header.push(Card::commentary("HIERARCH", " ESO DET CHIP = 3 / chip"));

    let cube = read_cube_from_bytes(&single_pixel_bytes(&header)).expect("read");
    assert!(cube.header.get("CONTINUE").is_none());
    let continued = cube
        .header
        .cards()
        .iter()
        .find(|card| card.keyword == "CONTINUE")
        .expect("continue card");
    assert!(continued.is_commentary());

    let rendered = render_header(&cube.header);
    for record in ["CONTINUE  'tail of long string'", "HIERARCH ESO DET CHIP = 3 / chip"] {
        assert!(rendered.contains(&format!("{record:<80}")), "{record} rewritten");
    }
}

#[test]
fn write_cube_refuses_to_clobber_without_overwrite() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("exists.fits");
    fs::write(&path, b"keep me").expect("seed");
    let data = Array::<f32, _>::zeros(IxDyn(&[1, 1, 1]));
    let cube = Cube::new(data, cube_header(-32, &[1, 1, 1]), PixelType::F32).expect("cube");

    let error = write_cube(&path, &cube, false).expect_err("exists");
    assert!(matches!(error, IoError::File { .. }));
    assert_eq!(fs::read(&path).expect("read"), b"keep me");
    write_cube(&path, &cube, true).expect("overwrite");
}

#[test]
fn nrrd_header_describes_geometry() {
    let header = nrrd_header(&test_volume(Encoding::Raw));
    assert!(header.starts_with("NRRD0004\n"));
    assert!(header.contains("type: float\n"));
    assert!(header.contains("space: left-posterior-superior\n"));
    assert!(header.contains("sizes: 2 3 4\n"));
    assert!(header.contains("space directions: (-1,0,0) (0,0.625,0) (0,0,1)\n"));
    assert!(header.contains("kinds: domain domain domain\n"));
    assert!(header.contains("encoding: raw\n"));
    assert!(header.contains("space origin: (50,-25,-40)\n"));
    assert!(header.ends_with("\n\n"));
}

#[test]
fn nrrd_raw_data_has_first_axis_fastest() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("volume.nrrd");
    let volume = test_volume(Encoding::Raw);
    write_volume(&path, &volume).expect("write");

    let bytes = fs::read(&path).expect("read");
    let header_len = nrrd_header(&volume).len();
    let mut body = &bytes[header_len..];
    assert_eq!(body.len(), 24 * 4);
    let first = body.read_f32::<LittleEndian>().expect("first");
    let second = body.read_f32::<LittleEndian>().expect("second");
    assert_eq!(first, volume.data[[0, 0, 0]]);
    assert_eq!(second, volume.data[[1, 0, 0]]);
}

#[test]
fn nrrd_roundtrip_raw_and_gzip() {
    let dir = tempdir().expect("tempdir");
    for encoding in [Encoding::Raw, Encoding::Gzip] {
        let path = dir.path().join(format!("volume-{}.nrrd", encoding.as_str()));
        let volume = test_volume(encoding);
        write_volume(&path, &volume).expect("write");
        let restored = read_volume(&path).expect("read");
        assert_eq!(restored.metadata, volume.metadata);
        assert_eq!(restored.shape(), [2, 3, 4]);
        let expected: Array3<f32> = volume.data.to_owned();
        assert_eq!(restored.data, expected);
    }
}

#[test]
fn unsupported_extensions_error() {
    let dir = tempdir().expect("tempdir");
    let error = write_volume(dir.path().join("out.tiff"), &test_volume(Encoding::Raw))
        .expect_err("tiff output");
    assert!(matches!(error, IoError::UnsupportedFormat(ext) if ext == "tiff"));
    let error = read_cube(dir.path().join("in.png")).expect_err("png input");
    assert!(error.to_string().contains("png"));
}
