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

//! Settings file. Every key is optional, missing ones fall back to the defaults below.
//!
//! ```toml
//! [data]
//! time_column = "MJD"
//! metric_column = "REFSYS"
//!
//! [forecast]
//! window_length = 30
//! max_steps = 200
//!
//! [model]
//! default_path = "model_lstm_refsys.mpk"
//! ```

use serde::{Deserialize, Serialize};
use std::{ops::RangeInclusive, path::Path, path::PathBuf};

use crate::error::Result;

#[derive(Default, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
	pub data: DataSettings,
	pub forecast: ForecastSettings,
	pub model: ModelSettings,
	pub report: ReportSettings,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DataSettings {
	pub time_column: String,
	pub metric_column: String,
	pub preview_rows: usize,
}

impl Default for DataSettings {
	fn default() -> Self {
		Self {
			time_column: String::from("MJD"),
			metric_column: String::from("REFSYS"),
			preview_rows: 10,
		}
	}
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ForecastSettings {
	pub window_length: usize,
	pub max_steps: usize,
	pub min_iterations: usize,
	pub max_iterations: usize,
	pub min_threshold: f64,
	pub max_threshold: f64,
	pub default_threshold: f64,
	pub default_initial_value: f64,
	/// Start every reset where the previous one ended instead of at the last observation
	pub chain_resets: bool,
}

impl Default for ForecastSettings {
	fn default() -> Self {
		Self {
			window_length: 30,
			max_steps: 200,
			min_iterations: 1,
			max_iterations: 10,
			min_threshold: 100f64,
			max_threshold: 1000f64,
			default_threshold: 500f64,
			default_initial_value: -400f64,
			chain_resets: true,
		}
	}
}

impl ForecastSettings {
	pub fn iteration_bounds(&self) -> RangeInclusive<usize> {
		self.min_iterations..=self.max_iterations
	}

	pub fn threshold_bounds(&self) -> RangeInclusive<f64> {
		self.min_threshold..=self.max_threshold
	}
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ModelSettings {
	/// Unset means there is no default artifact at all
	pub default_path: Option<PathBuf>,
	pub hidden_size: usize,
}

impl Default for ModelSettings {
	fn default() -> Self {
		Self {
			default_path: Some(PathBuf::from("model_lstm_refsys.mpk")),
			hidden_size: 64,
		}
	}
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ReportSettings {
	pub file_name: String,
}

impl Default for ReportSettings {
	fn default() -> Self {
		Self {
			file_name: String::from(crate::report::typedef::SUMMARY_FILE_NAME),
		}
	}
}

impl Settings {
	pub fn from_toml(text: &str) -> Result<Self> {
		Ok(toml::from_str(text)?)
	}

	pub fn load(path: &Path) -> Result<Self> {
		let text = std::fs::read_to_string(path)?;
		let settings = Self::from_toml(&text)?;
		tracing::debug!(path = %path.display(), "loaded settings");
		Ok(settings)
	}
}
