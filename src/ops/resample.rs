use std::ops::Range;

use ndarray::{Array3, s};
use rayon::prelude::*;

use crate::geometry::resampled_length;

use super::Result;

/// Regrids axis 0 (velocity, in storage order) of a (Velocity, Dec, RA)
/// array to `round(length * scale)` planes with a natural cubic spline.
/// Output plane `i` samples input coordinate `i * (n_in - 1) / (n_out - 1)`,
/// so the first and last planes are preserved exactly. Spatial axes are
/// untouched.
///
/// Each run of finite channels gets its own spline. Output planes that fall
/// on or between blank (non-finite) channels are NaN; the rest of the
/// spectrum is unaffected.
pub fn resample_velocity(data: &Array3<f32>, scale: f64) -> Result<Array3<f32>> {
    let (length, rows, columns) = data.dim();
    let target = resampled_length(length, scale)?;
    let positions = sample_positions(length, target);

    let lane_results = (0..rows * columns)
        .into_par_iter()
        .map(|lane| {
            let (row, column) = (lane / columns, lane % columns);
            let samples = data
                .slice(s![.., row, column])
                .iter()
                .map(|value| f64::from(*value))
                .collect::<Vec<_>>();
            resample_lane(&samples, &positions)
        })
        .collect::<Vec<_>>();

    let mut output = Array3::<f32>::zeros((target, rows, columns));
    for (lane, values) in lane_results.into_iter().enumerate() {
        let (row, column) = (lane / columns, lane % columns);
        for (plane, value) in values.into_iter().enumerate() {
            output[[plane, row, column]] = value;
        }
    }
    Ok(output)
}

fn resample_lane(samples: &[f64], positions: &[f64]) -> Vec<f32> {
    let splines = finite_runs(samples)
        .into_iter()
        .map(|run| (run.clone(), NaturalSpline::fit(samples[run].to_vec())))
        .collect::<Vec<_>>();
    positions
        .iter()
        .map(|position| {
            splines
                .iter()
                .find(|(run, _)| {
                    *position >= run.start as f64 && *position <= (run.end - 1) as f64
                })
                .map_or(f32::NAN, |(run, spline)| {
                    spline.evaluate(position - run.start as f64) as f32
                })
        })
        .collect()
}

/// Maximal ranges of consecutive finite samples.
fn finite_runs(samples: &[f64]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;
    for (index, value) in samples.iter().enumerate() {
        match (value.is_finite(), start) {
            (true, None) => start = Some(index),
            (false, Some(first)) => {
                runs.push(first..index);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(first) = start {
        runs.push(first..samples.len());
    }
    runs
}

fn sample_positions(length: usize, target: usize) -> Vec<f64> {
    if length < 2 {
        return vec![0.0; target];
    }
    let step = (length - 1) as f64 / (target - 1) as f64;
    (0..target).map(|index| index as f64 * step).collect()
}

/// Natural cubic spline through unit-spaced samples.
struct NaturalSpline {
    values: Vec<f64>,
    second: Vec<f64>,
}

impl NaturalSpline {
    fn fit(values: Vec<f64>) -> Self {
        let count = values.len();
        let mut second = vec![0.0; count];
        if count < 3 {
            return Self { values, second };
        }

        // Interior second derivatives: M[i-1] + 4 M[i] + M[i+1] = 6 (y[i+1] - 2 y[i] + y[i-1]),
        // solved with the Thomas algorithm; M is zero at both ends.
        let interior = count - 2;
        let mut diagonal = vec![4.0; interior];
        let mut rhs = (1..count - 1)
            .map(|i| 6.0 * (values[i + 1] - 2.0 * values[i] + values[i - 1]))
            .collect::<Vec<_>>();
        for i in 1..interior {
            let weight = 1.0 / diagonal[i - 1];
            diagonal[i] -= weight;
            rhs[i] -= weight * rhs[i - 1];
        }
        second[interior] = rhs[interior - 1] / diagonal[interior - 1];
        for i in (0..interior - 1).rev() {
            second[i + 1] = (rhs[i] - second[i + 2]) / diagonal[i];
        }
        Self { values, second }
    }

    fn evaluate(&self, x: f64) -> f64 {
        let last = self.values.len() - 1;
        if last == 0 {
            return self.values[0];
        }
        let x = x.clamp(0.0, last as f64);
        let segment = (x.floor() as usize).min(last - 1);
        let t = x - segment as f64;
        let u = 1.0 - t;
        let (left, right) = (self.values[segment], self.values[segment + 1]);
        let (left_second, right_second) = (self.second[segment], self.second[segment + 1]);
        u * left
            + t * right
            + ((u * u * u - u) * left_second + (t * t * t - t) * right_second) / 6.0
    }
}
