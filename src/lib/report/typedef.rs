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

pub const SUMMARY_FILE_NAME: &str = "refsys_forecast_results.csv";

pub(super) const SUMMARY_HEADER: [&str; 4] =
	["Iteration", "Target MJD", "Initial REFSYS", "Days After Reset"];

pub(super) const TRAJECTORY_HEADER: [&str; 2] = ["MJD", "Predicted REFSYS"];

#[derive(Default, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
	pub iteration: usize,
	/// None when the threshold was never met within the budget
	pub target_time_index: Option<f64>,
	pub initial_value: f64,
	pub days_elapsed: usize,
}

#[derive(Default, Serialize, Clone, Debug, PartialEq)]
pub struct ResultSummary {
	pub rows: Vec<SummaryRow>,
}

impl ResultSummary {
	pub fn achieved_count(&self) -> usize {
		self.rows
			.iter()
			.filter(|each| each.target_time_index.is_some())
			.count()
	}
}
