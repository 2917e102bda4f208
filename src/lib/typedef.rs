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

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// What the front end shows when something fails
#[derive(Default, Serialize, Clone, Debug, PartialEq)]
pub struct ErrorInfo {
	pub title: Cow<'static, str>,
	pub message: String,
}

impl std::fmt::Display for ErrorInfo {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}", self.title, self.message)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
	Empty,
	Number(f64),
	DateTime(NaiveDateTime),
	String(String),
}

impl Default for CellValue {
	fn default() -> Self {
		CellValue::Empty
	}
}

/// One calibration measurement: MJD-like time index and REFSYS-like metric
#[derive(Default, Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
	pub time_index: f64,
	pub metric: f64,
}

/// Observations ordered by time index
#[derive(Default, Clone, Debug)]
pub struct Dataset {
	pub name: String,
	pub observations: Vec<Observation>,
	pub skipped_rows: usize,
}

impl Dataset {
	pub fn len(&self) -> usize {
		self.observations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.observations.is_empty()
	}

	pub fn metric_values(&self) -> Vec<f64> {
		self.observations.iter().map(|each| each.metric).collect()
	}

	/// The latest time index, which is where forecasts start counting from
	pub fn last_time_index(&self) -> Option<f64> {
		self.observations
			.iter()
			.map(|each| each.time_index)
			.reduce(f64::max)
	}
}
