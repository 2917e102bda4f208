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

use std::borrow::Cow;
use thiserror::Error;

use crate::typedef::ErrorInfo;

pub type Result<T> = std::result::Result<T, ForecastError>;

/// Everything that can go wrong between reading a table and exporting the summary.
#[derive(Error, Debug)]
pub enum ForecastError {
	/// Missing columns, malformed numbers, out-of-range parameters
	#[error("{0}")]
	Validation(String),

	/// Preconditions of the forecast loop itself
	#[error("Invalid input: {0}")]
	InvalidInput(String),

	#[error("No usable model: {0}")]
	ModelUnavailable(String),

	#[error("Model invocation failed: {0}")]
	ModelInvocation(String),

	#[error("Forecast was cancelled")]
	Cancelled,

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Csv(#[from] csv::Error),

	#[error(transparent)]
	Spreadsheet(#[from] calamine::Error),

	#[error("Cannot parse configuration: {0}")]
	Config(#[from] toml::de::Error),
}

impl ForecastError {
	pub fn title(&self) -> &'static str {
		match self {
			ForecastError::Validation(_) => "Invalid Data",
			ForecastError::InvalidInput(_) => "Invalid Forecast Input",
			ForecastError::ModelUnavailable(_) => "Model Unavailable",
			ForecastError::ModelInvocation(_) => "Prediction Failed",
			ForecastError::Cancelled => "Forecast Cancelled",
			ForecastError::Io(_) => "Cannot Access File",
			ForecastError::Csv(_) => "Failed to Read CSV File",
			ForecastError::Spreadsheet(_) => "Failed to Read Spreadsheet",
			ForecastError::Config(_) => "Invalid Configuration",
		}
	}
}

impl From<&ForecastError> for ErrorInfo {
	fn from(err: &ForecastError) -> Self {
		ErrorInfo {
			title: Cow::Borrowed(err.title()),
			message: err.to_string(),
		}
	}
}

impl From<ForecastError> for ErrorInfo {
	fn from(err: ForecastError) -> Self {
		ErrorInfo::from(&err)
	}
}
