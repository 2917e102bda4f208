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

use serde::Serialize;

/// Min-max scaler onto [0, 1], fitted once per dataset.
///
/// Only [`super::helper::fit_normal_param`] builds one, so `min <= max` always holds.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NormalParam {
	pub(super) min: f64,
	pub(super) max: f64,
}

impl NormalParam {
	pub fn min(&self) -> f64 {
		self.min
	}

	pub fn max(&self) -> f64 {
		self.max
	}

	/// Constant data gets a unit scale so transforms stay finite
	fn scale(&self) -> f64 {
		let range = self.max - self.min;
		if range == 0f64 {
			1f64
		} else {
			range
		}
	}

	pub fn transform(&self, value: f64) -> f64 {
		(value - self.min) / self.scale()
	}

	pub fn inverse(&self, normalized: f64) -> f64 {
		normalized * self.scale() + self.min
	}
}
