use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Cursor};
use std::path::Path;

use crate::model::{CubeF32, Volume};

use super::fits::{read_fits, write_fits};
use super::nrrd::{read_nrrd, write_nrrd};
use super::util::{extension, is_fits_extension, is_nrrd_extension};
use super::{IoError, Result};

pub fn read_cube(path: impl AsRef<Path>) -> Result<CubeF32> {
    let path = path.as_ref();
    let extension = extension(path)?;
    if !is_fits_extension(&extension) {
        return Err(IoError::UnsupportedFormat(extension));
    }
    let file = File::open(path).map_err(|error| IoError::file(path, error))?;
    let cube = read_fits(&mut BufReader::new(file))?;
    Ok(cube.with_source(path))
}

pub fn read_cube_from_bytes(bytes: &[u8]) -> Result<CubeF32> {
    read_fits(&mut Cursor::new(bytes))
}

/// Writes a FITS file. Without `overwrite` an existing file is an error.
pub fn write_cube(path: impl AsRef<Path>, cube: &CubeF32, overwrite: bool) -> Result<()> {
    let path = path.as_ref();
    let extension = extension(path)?;
    if !is_fits_extension(&extension) {
        return Err(IoError::UnsupportedFormat(extension));
    }
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let file = options.open(path).map_err(|error| IoError::file(path, error))?;
    let mut writer = BufWriter::new(file);
    let result = write_fits(&mut writer, cube);
    drop(writer);
    result.inspect_err(|_| discard_partial(path))
}

pub fn write_volume(path: impl AsRef<Path>, volume: &Volume) -> Result<()> {
    let path = path.as_ref();
    let extension = extension(path)?;
    if !is_nrrd_extension(&extension) {
        return Err(IoError::UnsupportedFormat(extension));
    }
    let file = File::create(path).map_err(|error| IoError::file(path, error))?;
    let mut writer = BufWriter::new(file);
    let result = write_nrrd(&mut writer, volume);
    drop(writer);
    result.inspect_err(|_| discard_partial(path))
}

pub fn read_volume(path: impl AsRef<Path>) -> Result<Volume> {
    let path = path.as_ref();
    let extension = extension(path)?;
    if !is_nrrd_extension(&extension) {
        return Err(IoError::UnsupportedFormat(extension));
    }
    let file = File::open(path).map_err(|error| IoError::file(path, error))?;
    read_nrrd(&mut BufReader::new(file))
}

fn discard_partial(path: &Path) {
    if let Err(error) = fs::remove_file(path) {
        tracing::warn!(path = %path.display(), %error, "could not remove partial output");
    }
}
