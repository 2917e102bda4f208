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
use strum_macros::{Display, EnumIter, EnumString};

use crate::typedef::Observation;

#[derive(PartialEq, Eq, EnumIter, EnumString, Display, Clone, Copy, Debug)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SourceFormat {
	Csv,
	Xlsx,
	Xls,
	Xlsb,
	Ods,
}

impl SourceFormat {
	pub fn is_spreadsheet(&self) -> bool {
		!matches!(self, SourceFormat::Csv)
	}
}

/// Summary shown before any forecasting happens
#[derive(Default, Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DataInfo {
	pub name: String,
	pub count: usize,
	pub skipped_rows: usize,
	pub time_min: f64,
	pub time_max: f64,
	pub metric_min: f64,
	pub metric_max: f64,
	pub metric_mean: f64,
	pub preview: Vec<Observation>,
}

/// Which parsed cell sits under which required header
pub(super) struct ColumnLookup {
	pub time: usize,
	pub metric: usize,
}
