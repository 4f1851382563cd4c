use ndarray::Array3;

/// Multiplies every sample by `factor` in place. No clamping: overflow and
/// NaN propagate unchanged. A factor of exactly 1 leaves the data untouched.
pub fn apply_data_scale(data: &mut Array3<f32>, factor: f64) {
    if factor == 1.0 {
        return;
    }
    data.par_mapv_inplace(|value| (f64::from(value) * factor) as f32);
}
