use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use approx::assert_abs_diff_eq;
use ndarray::{ArrayD, IxDyn};
use tempfile::{TempDir, tempdir};

use super::{AppContext, AppError, ConversionService, ConvertRequest, convert};
use crate::convention::{
    AlignmentConvention, ConventionError, ConventionRegistry, ConventionSource,
};
use crate::formats::{self, DefaultCodec, IoError, VolumeWriter, read_volume, write_cube};
use crate::geometry::{GeometryError, GeometryMode, VelocityScale};
use crate::model::{
    CoreError, Cube, Encoding, FitsHeader, HeaderValue, PixelType, SkyAxis, Volume,
};

/// 100 x 80 x 50 (RA, Dec, Velocity) header used by every scenario.
fn scenario_header() -> FitsHeader {
    let mut header = FitsHeader::new();
    header.set("SIMPLE", HeaderValue::Logical(true));
    header.set("BITPIX", HeaderValue::Integer(-32));
    header.set("NAXIS", HeaderValue::Integer(3));
    for (axis, length, crval, cdelt, crpix) in [
        (1, 100, 52.24, -0.01, 50.0),
        (2, 80, 31.0, 0.01, 40.0),
        (3, 50, 7.0, 0.1, 25.0),
    ] {
        header.set(&format!("NAXIS{axis}"), HeaderValue::Integer(length));
        header.set(&format!("CRVAL{axis}"), HeaderValue::Real(crval));
        header.set(&format!("CDELT{axis}"), HeaderValue::Real(cdelt));
        header.set(&format!("CRPIX{axis}"), HeaderValue::Real(crpix));
    }
    header
}

fn sample(v: usize, d: usize, r: usize) -> f32 {
    (v as f32) * 0.5 + (d as f32) * 0.01 - (r as f32) * 0.001
}

fn write_source(dir: &TempDir, name: &str, header: FitsHeader) -> PathBuf {
    let path = dir.path().join(name);
    let data = ArrayD::from_shape_fn(IxDyn(&[50, 80, 100]), |index| {
        sample(index[0], index[1], index[2])
    });
    let cube = Cube::new(data, header, PixelType::F32).expect("cube");
    write_cube(&path, &cube, false).expect("write source");
    path
}

fn diagonal(volume: &Volume) -> [f64; 3] {
    let directions = volume.metadata.space_directions;
    [directions[0][0], directions[1][1], directions[2][2]]
}

#[derive(Default)]
struct RecordingWriter {
    writes: RefCell<Vec<PathBuf>>,
}

impl VolumeWriter for RecordingWriter {
    fn supports_extension(&self, extension: &str) -> bool {
        extension == "nrrd"
    }

    fn write(&self, path: &Path, _volume: &Volume) -> formats::Result<()> {
        self.writes.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

fn recording_service() -> ConversionService<DefaultCodec, RecordingWriter> {
    ConversionService::new(DefaultCodec, RecordingWriter::default())
}

#[test]
fn centered_conversion_without_velocity_scale() {
    let dir = tempdir().expect("tempdir");
    let input = write_source(&dir, "cube.fits", scenario_header());
    let output = dir.path().join("cube.nrrd");

    let report = convert(&ConvertRequest::new(&input, &output)).expect("convert");
    assert!(!report.resampled);
    assert_eq!(report.source_shape, [50, 80, 100]);
    assert_eq!(report.output_shape, [100, 50, 80]);
    assert_eq!(report.geometry.mode, GeometryMode::Centered);

    let volume = read_volume(&output).expect("read volume");
    assert_eq!(volume.shape(), [100, 50, 80]);
    assert_eq!(diagonal(&volume), [-1.0, 1.0, 1.0]);
    assert_eq!(volume.metadata.space_origin, [50.0, -25.0, -40.0]);
    assert_eq!(volume.metadata.encoding, Encoding::Raw);
    for (r, v, d) in [(0, 0, 0), (99, 49, 79), (12, 34, 56)] {
        assert_eq!(volume.data[[r, v, d]], sample(v, d, r));
    }
}

#[test]
fn auto_velocity_scale_resamples_to_shortest_spatial_axis() {
    let dir = tempdir().expect("tempdir");
    let input = write_source(&dir, "cube.fits", scenario_header());
    let output = dir.path().join("cube.nrrd");
    let request = ConvertRequest::new(&input, &output).with_velocity_scale(VelocityScale::Auto);

    let report = convert(&request).expect("convert");
    assert!(report.resampled);
    assert_eq!(report.geometry.velocity_scale, 1.6);

    let volume = read_volume(&output).expect("read volume");
    assert_eq!(volume.shape(), [100, 80, 80]);
    assert_abs_diff_eq!(diagonal(&volume)[1], 0.625, epsilon = 1e-12);
    assert_abs_diff_eq!(volume.metadata.space_origin[1], -25.0, epsilon = 1e-12);
    // Spectra are linear in velocity, so regridding is exact up to f32.
    assert_abs_diff_eq!(volume.data[[3, 79, 5]], sample(49, 5, 3), epsilon = 1e-4);
    assert_abs_diff_eq!(
        volume.data[[3, 40, 5]],
        sample(0, 5, 3) + 0.5 * 40.0 * 49.0 / 79.0,
        epsilon = 1e-4
    );
}

#[test]
fn convention_conversion_pins_reference_point_without_resampling() {
    let dir = tempdir().expect("tempdir");
    let input = write_source(&dir, "cube.fits", scenario_header());
    let output = dir.path().join("cube.nrrd");
    let request = ConvertRequest::new(&input, &output)
        .with_velocity_scale(VelocityScale::Factor(1000.0))
        .with_convention(ConventionSource::parse("ngc1333"));

    let report = convert(&request).expect("convert");
    assert!(!report.resampled);
    assert_eq!(report.geometry.mode, GeometryMode::Convention);

    let volume = read_volume(&output).expect("read volume");
    assert_eq!(volume.shape(), [100, 50, 80]);
    let spacing = diagonal(&volume);
    let origin = volume.metadata.space_origin;
    for (actual, expected) in spacing.iter().zip([9.0, 10.0, 9.0]) {
        assert_abs_diff_eq!(*actual, expected, epsilon = 1e-9);
    }
    for (actual, expected) in origin.iter().zip([-450.0, -330.0, -720.0]) {
        assert_abs_diff_eq!(*actual, expected, epsilon = 1e-9);
    }
}

#[test]
fn convention_can_come_from_a_preset_file() {
    let dir = tempdir().expect("tempdir");
    let input = write_source(&dir, "cube.fits", scenario_header());
    let preset = dir.path().join("field.yaml");
    fs::write(
        &preset,
        "ra-mm: 900\ndec-mm: 900\nvel-mm: 0.1\nra0: 52.24\ndec0: 31.40\nvel0: 7800\n",
    )
    .expect("preset");
    let output = dir.path().join("cube.nrrd");
    let request = ConvertRequest::new(&input, &output)
        .with_velocity_scale(VelocityScale::Factor(1000.0))
        .with_convention(ConventionSource::parse(&preset.to_string_lossy()));

    let report = convert(&request).expect("convert");
    assert_abs_diff_eq!(report.geometry.origin(SkyAxis::Velocity), -330.0, epsilon = 1e-9);
}

#[test]
fn registered_presets_resolve_by_name() {
    let dir = tempdir().expect("tempdir");
    let input = write_source(&dir, "cube.fits", scenario_header());
    let mut registry = ConventionRegistry::new();
    let field = AlignmentConvention::new(900.0, 900.0, 0.1, 52.24, 31.0, 7000.0).expect("field");
    registry.register("perseus", field).expect("register");
    let service = recording_service().with_registry(registry);

    let request = ConvertRequest::new(&input, dir.path().join("out.nrrd"))
        .with_convention(ConventionSource::parse("Perseus"));
    let report = service.convert(&request).expect("convert");
    assert_eq!(report.geometry.mode, GeometryMode::Convention);
    // The reference point sits on the header's reference pixel.
    assert_abs_diff_eq!(report.geometry.origin(SkyAxis::Dec), -40.0 * 9.0, epsilon = 1e-9);
    assert_eq!(service.writer().writes.borrow().len(), 1);
}

#[test]
fn data_scale_multiplies_samples_once() {
    let dir = tempdir().expect("tempdir");
    let input = write_source(&dir, "cube.fits", scenario_header());
    let unit = dir.path().join("unit.nrrd");
    let doubled = dir.path().join("doubled.nrrd");

    convert(&ConvertRequest::new(&input, &unit).with_data_scale(1.0)).expect("unit");
    convert(&ConvertRequest::new(&input, &doubled).with_data_scale(2.0)).expect("doubled");

    let unit = read_volume(&unit).expect("unit volume");
    let doubled = read_volume(&doubled).expect("doubled volume");
    for ((index, value), twice) in unit.data.indexed_iter().zip(doubled.data.iter()) {
        let (r, v, d) = index;
        assert_eq!(value.to_bits(), sample(v, d, r).to_bits());
        assert_eq!(*twice, value * 2.0);
    }
}

#[test]
fn gzip_output_matches_raw_output() {
    let dir = tempdir().expect("tempdir");
    let input = write_source(&dir, "cube.fits", scenario_header());
    let raw = dir.path().join("raw.nrrd");
    let gzip = dir.path().join("gzip.nrrd");

    convert(&ConvertRequest::new(&input, &raw)).expect("raw");
    convert(&ConvertRequest::new(&input, &gzip).with_encoding(Encoding::Gzip)).expect("gzip");

    let raw_volume = read_volume(&raw).expect("raw volume");
    let gzip_volume = read_volume(&gzip).expect("gzip volume");
    assert_eq!(gzip_volume.metadata.encoding, Encoding::Gzip);
    assert_eq!(raw_volume.data, gzip_volume.data);
    assert_eq!(raw_volume.metadata.space_origin, gzip_volume.metadata.space_origin);
}

#[test]
fn unknown_convention_fails_before_reading_or_writing() {
    let dir = tempdir().expect("tempdir");
    let service = recording_service();
    let request = ConvertRequest::new(dir.path().join("absent.fits"), dir.path().join("out.nrrd"))
        .with_convention(ConventionSource::parse("orion"));

    let error = service.convert(&request).expect_err("unknown preset");
    match error {
        AppError::Convention(ConventionError::UnknownConvention { name, known }) => {
            assert_eq!(name, "orion");
            assert!(known.contains("ngc1333"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.writer().writes.borrow().is_empty());
}

#[test]
fn missing_axis_key_aborts_without_writing() {
    let dir = tempdir().expect("tempdir");
    let mut header = scenario_header();
    header.remove("CDELT2");
    let input = write_source(&dir, "cube.fits", header);
    let service = recording_service();

    let error = service
        .convert(&ConvertRequest::new(&input, dir.path().join("out.nrrd")))
        .expect_err("missing CDELT2");
    match error {
        AppError::Core(CoreError::MissingAxis { axis, key }) => {
            assert_eq!(axis, SkyAxis::Dec);
            assert_eq!(key, "CDELT2");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.writer().writes.borrow().is_empty());
}

#[test]
fn invalid_velocity_scale_fails_before_any_io() {
    let dir = tempdir().expect("tempdir");
    let output = dir.path().join("out.nrrd");
    let request = ConvertRequest::new(dir.path().join("absent.fits"), &output)
        .with_velocity_scale(VelocityScale::Factor(-2.0));

    let error = convert(&request).expect_err("negative scale");
    assert!(matches!(
        error,
        AppError::Geometry(GeometryError::InvalidScale { .. })
    ));
    assert!(!output.exists());
}

#[test]
fn resample_to_a_single_plane_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let input = write_source(&dir, "cube.fits", scenario_header());
    let service = recording_service();
    let request = ConvertRequest::new(&input, dir.path().join("out.nrrd"))
        .with_velocity_scale(VelocityScale::Factor(0.01));

    let error = service.convert(&request).expect_err("one plane");
    assert!(error.to_string().contains("length 50"));
    assert!(service.writer().writes.borrow().is_empty());
}

#[test]
fn unsupported_extensions_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let input = write_source(&dir, "cube.fits", scenario_header());
    let error = convert(&ConvertRequest::new(&input, dir.path().join("out.tif")))
        .expect_err("tif output");
    assert!(matches!(error, AppError::Io(IoError::UnsupportedFormat(ext)) if ext == "tif"));
}

#[test]
fn strip_then_convert_a_stokes_cube() {
    let dir = tempdir().expect("tempdir");
    let mut header = scenario_header();
    header.set("NAXIS", HeaderValue::Integer(4));
    header.set("NAXIS4", HeaderValue::Integer(1));
    header.set("CTYPE4", HeaderValue::Text("STOKES".into()));
    header.set("CRVAL4", HeaderValue::Real(1.0));
    let stokes = dir.path().join("stokes.fits");
    let data = ArrayD::from_shape_fn(IxDyn(&[1, 50, 80, 100]), |index| {
        sample(index[1], index[2], index[3])
    });
    write_cube(
        &stokes,
        &Cube::new(data, header, PixelType::F32).expect("cube"),
        false,
    )
    .expect("write stokes");

    let app = AppContext::new();
    let error = app
        .conversion_service()
        .convert(&ConvertRequest::new(&stokes, dir.path().join("early.nrrd")))
        .expect_err("four axes");
    assert!(matches!(
        error,
        AppError::Core(CoreError::UnsupportedAxes { ndim: 4 })
    ));

    let stripped = dir.path().join("stripped.fits");
    let report = app
        .cube_service()
        .strip_fourth_axis(&stokes, &stripped, false)
        .expect("strip");
    assert_eq!(report.input_shape, vec![1, 50, 80, 100]);
    assert_eq!(report.output_shape, vec![50, 80, 100]);
    assert!(
        app.cube_service()
            .strip_fourth_axis(&stokes, &stripped, false)
            .is_err()
    );
    app.cube_service()
        .strip_fourth_axis(&stokes, &stripped, true)
        .expect("clobber");

    let output = dir.path().join("cube.nrrd");
    app.conversion_service()
        .convert(&ConvertRequest::new(&stripped, &output))
        .expect("convert stripped");
    assert_eq!(read_volume(&output).expect("volume").shape(), [100, 50, 80]);
}

#[test]
fn trim_shifts_reference_pixel() {
    let dir = tempdir().expect("tempdir");
    let input = write_source(&dir, "cube.fits", scenario_header());
    let trimmed = dir.path().join("trimmed.fits");
    let app = AppContext::new();

    let report = app
        .cube_service()
        .trim_velocity(&input, &trimmed, 10, 30)
        .expect("trim");
    assert_eq!(report.velocity_length, 20);
    assert_eq!(report.crpix3, 15.0);

    let cube = app.cube_service().read(&trimmed).expect("read trimmed");
    let view = cube.view().expect("view");
    assert_eq!(view.length(SkyAxis::Velocity), 20);
    assert_eq!(view.ref_pixel(SkyAxis::Velocity), 15.0);
    let (data, _) = cube.into_array3().expect("array");
    assert_eq!(data[[0, 7, 9]], sample(10, 7, 9));

    assert!(
        app.cube_service()
            .trim_velocity(&input, &trimmed, 40, 60)
            .is_err()
    );
}

#[test]
fn inspect_reports_prospective_geometry() {
    let dir = tempdir().expect("tempdir");
    let input = write_source(&dir, "cube.fits", scenario_header());
    let app = AppContext::new();

    let info = app
        .header_service()
        .inspect(&input, &VelocityScale::Auto, None)
        .expect("inspect");
    assert_eq!(info.shape, vec![50, 80, 100]);
    assert_eq!(info.output_shape, [100, 80, 80]);
    assert_eq!(info.velocity_scale, 1.6);
    assert_eq!(info.min, Some(sample(0, 0, 99)));
    assert_eq!(info.max, Some(sample(49, 79, 0)));
    assert!(!dir.path().join("cube.nrrd").exists());

    let names = app
        .header_service()
        .presets()
        .into_iter()
        .map(|entry| entry.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["ngc1333".to_string()]);
}

#[test]
fn report_serializes_to_json() {
    let dir = tempdir().expect("tempdir");
    let input = write_source(&dir, "cube.fits", scenario_header());
    let output = dir.path().join("cube.nrrd");
    let report = convert(&ConvertRequest::new(&input, &output)).expect("convert");

    let json = serde_json::to_value(&report).expect("json");
    assert_eq!(json["output_shape"], serde_json::json!([100, 50, 80]));
    assert_eq!(json["geometry"]["mode"], "centered");
    assert_eq!(json["encoding"], "raw");
}
