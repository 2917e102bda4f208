/*
 * RefSys Forecast, a threshold-crossing forecaster for calibration drift
 * Copyright (C) 2025 Athaariq A. Ramadhani <foss@athaariq.my.id>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use super::typedef::*;
use crate::error::{ForecastError, Result};

pub fn fit_normal_param(values: &[f64]) -> Result<NormalParam> {
	if values.is_empty() {
		return Err(ForecastError::InvalidInput(String::from(
			"Cannot fit the normalizer on an empty dataset",
		)));
	}

	if let Some(found) = values.iter().find(|each| !each.is_finite()) {
		return Err(ForecastError::InvalidInput(format!(
			"Cannot fit the normalizer on a non-finite value ({})",
			found
		)));
	}

	let (min, max) = values
		.iter()
		.fold((f64::MAX, f64::MIN), |(last_min, last_max), each| {
			(last_min.min(*each), last_max.max(*each))
		});

	tracing::debug!(min, max, count = values.len(), "fitted normalizer");

	Ok(NormalParam { min, max })
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;

	#[test]
	fn extremes_map_to_unit_bounds() {
		let param = fit_normal_param(&[-420f64, -100f64, 0f64, 80f64]).unwrap();

		assert_eq!(param.min(), -420f64);
		assert_eq!(param.max(), 80f64);
		assert_relative_eq!(param.transform(-420f64), 0f64);
		assert_relative_eq!(param.transform(80f64), 1f64);
		assert_relative_eq!(param.transform(-170f64), 0.5);
	}

	#[test]
	fn inverse_undoes_transform_over_the_range() {
		let param = fit_normal_param(&[-420f64, 80f64]).unwrap();

		for step in 0..=100 {
			let x = -420f64 + 5f64 * step as f64;
			assert_relative_eq!(param.inverse(param.transform(x)), x, epsilon = 1e-9);
		}
	}

	#[test]
	fn values_outside_the_fit_range_extrapolate() {
		let param = fit_normal_param(&[0f64, 100f64]).unwrap();

		assert_relative_eq!(param.transform(500f64), 5f64);
		assert_relative_eq!(param.inverse(-1f64), -100f64);
	}

	#[test]
	fn constant_data_uses_unit_scale() {
		let param = fit_normal_param(&[7f64, 7f64, 7f64]).unwrap();

		assert_eq!(param.transform(7f64), 0f64);
		assert_eq!(param.transform(9f64), 2f64);
		assert_eq!(param.inverse(0f64), 7f64);
	}

	#[test]
	fn empty_input_is_rejected() {
		let err = fit_normal_param(&[]).unwrap_err();
		assert!(matches!(err, ForecastError::InvalidInput(_)));
	}

	#[test]
	fn nan_is_rejected() {
		let err = fit_normal_param(&[1f64, f64::NAN]).unwrap_err();
		assert!(matches!(err, ForecastError::InvalidInput(_)));
	}
}
