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

use calamine::DataType;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use parse_datetime::parse_datetime_at_date;

use super::typedef::*;
use crate::config::DataSettings;
use crate::error::{ForecastError, Result};
use crate::typedef::{CellValue, Dataset, Observation};

/// MJD of the Unix epoch (1970-01-01T00:00Z)
pub const MJD_UNIX_EPOCH: f64 = 40587f64;

const MILLIS_PER_DAY: f64 = 86_400_000f64;

pub fn datetime_to_mjd(datetime: &NaiveDateTime) -> f64 {
	datetime.and_utc().timestamp_millis() as f64 / MILLIS_PER_DAY + MJD_UNIX_EPOCH
}

pub fn mjd_to_datetime(mjd: f64) -> Option<DateTime<Utc>> {
	if !mjd.is_finite() {
		return None;
	}

	let millis = ((mjd - MJD_UNIX_EPOCH) * MILLIS_PER_DAY).round();
	DateTime::from_timestamp_millis(millis as i64)
}

/// Numbers win over dates, so a bare `60000` stays an MJD and never becomes a year
pub fn parse_cell(cell: &str) -> CellValue {
	let cell = cell.trim();

	if cell.is_empty() {
		CellValue::Empty
	} else if let Ok(number_value) = cell.parse::<f64>() {
		// Exports write blanks as NaN
		if number_value.is_nan() {
			CellValue::Empty
		} else {
			CellValue::Number(number_value)
		}
	} else if let Some(datetime_value) = parse_absolute_datetime(cell) {
		CellValue::DateTime(datetime_value)
	} else {
		CellValue::String(cell.to_string())
	}
}

/// Phrases like "yesterday" or "2 days ago" parse too, but they depend on the day the table
/// is read. A cell only counts as a date when it reads the same against two far-apart days.
fn parse_absolute_datetime(cell: &str) -> Option<NaiveDateTime> {
	let first_base = Local.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).single()?;
	let second_base = Local.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).single()?;

	let first = parse_datetime_at_date(first_base, cell).ok()?.naive_local();
	let second = parse_datetime_at_date(second_base, cell).ok()?.naive_local();

	if first == second {
		Some(first)
	} else {
		None
	}
}

pub fn convert_spreadsheet_cell(cell: &calamine::Data) -> CellValue {
	match cell {
		calamine::Data::Empty => CellValue::Empty,
		calamine::Data::Int(value) => CellValue::Number(*value as f64),
		calamine::Data::Float(value) => CellValue::Number(*value),
		calamine::Data::String(text) => parse_cell(text),
		calamine::Data::DateTime(_) | calamine::Data::DateTimeIso(_) => match cell.as_datetime() {
			Some(datetime) => CellValue::DateTime(datetime),
			None => CellValue::String(cell.to_string()),
		},
		other => CellValue::String(other.to_string()),
	}
}

pub(super) fn lookup_columns(header: &[String], columns: &DataSettings) -> Result<ColumnLookup> {
	let find = |name: &str| {
		header
			.iter()
			.position(|each| each.trim().trim_start_matches('\u{feff}') == name)
			.ok_or_else(|| {
				ForecastError::Validation(format!(
					"The table must contain a \"{}\" column, found: {}",
					name,
					header.join(", ")
				))
			})
	};

	Ok(ColumnLookup {
		time: find(&columns.time_column)?,
		metric: find(&columns.metric_column)?,
	})
}

fn cell_to_time_index(cell: &CellValue, row_number: usize, column: &str) -> Result<Option<f64>> {
	match cell {
		CellValue::Empty => Ok(None),
		CellValue::Number(value) if value.is_finite() => Ok(Some(*value)),
		CellValue::DateTime(datetime) => Ok(Some(datetime_to_mjd(datetime))),
		CellValue::Number(value) => Err(ForecastError::Validation(format!(
			"Row {}: \"{}\" value {} is not finite",
			row_number, column, value
		))),
		CellValue::String(text) => Err(ForecastError::Validation(format!(
			"Row {}: \"{}\" value \"{}\" is neither a number nor a date",
			row_number, column, text
		))),
	}
}

fn cell_to_metric(cell: &CellValue, row_number: usize, column: &str) -> Result<Option<f64>> {
	match cell {
		CellValue::Empty => Ok(None),
		CellValue::Number(value) if value.is_finite() => Ok(Some(*value)),
		CellValue::Number(value) => Err(ForecastError::Validation(format!(
			"Row {}: \"{}\" value {} is not finite",
			row_number, column, value
		))),
		CellValue::DateTime(datetime) => Err(ForecastError::Validation(format!(
			"Row {}: \"{}\" value {} is a date, expected a number",
			row_number, column, datetime
		))),
		CellValue::String(text) => Err(ForecastError::Validation(format!(
			"Row {}: \"{}\" value \"{}\" is not a number",
			row_number, column, text
		))),
	}
}

/// Turns parsed rows into a dataset ordered by time index.
///
/// Rows are numbered as a spreadsheet user sees them, so the header is row 1.
pub(super) fn collect_observations<I>(
	name: String,
	header: &[String],
	rows: I,
	columns: &DataSettings,
) -> Result<Dataset>
where
	I: Iterator<Item = Vec<CellValue>>,
{
	let lookup = lookup_columns(header, columns)?;

	let mut observations = Vec::<Observation>::new();
	let mut skipped_rows = 0usize;
	for (index, row) in rows.enumerate() {
		let row_number = index + 2;
		let empty = CellValue::Empty;
		let time_cell = row.get(lookup.time).unwrap_or(&empty);
		let metric_cell = row.get(lookup.metric).unwrap_or(&empty);

		let time_index = cell_to_time_index(time_cell, row_number, &columns.time_column)?;
		let metric = cell_to_metric(metric_cell, row_number, &columns.metric_column)?;

		match (time_index, metric) {
			(Some(time_index), Some(metric)) => observations.push(Observation { time_index, metric }),
			_ => skipped_rows += 1,
		}
	}

	if skipped_rows > 0 {
		tracing::warn!(skipped_rows, "rows with blank cells were skipped");
	}

	if observations.is_empty() {
		return Err(ForecastError::Validation(format!(
			"\"{}\" has no complete \"{}\"/\"{}\" rows",
			name, columns.time_column, columns.metric_column
		)));
	}

	observations.sort_by(|a, b| a.time_index.total_cmp(&b.time_index));

	Ok(Dataset {
		name,
		observations,
		skipped_rows,
	})
}

pub fn describe(dataset: &Dataset, preview_rows: usize) -> DataInfo {
	let count = dataset.len();
	if count == 0 {
		return DataInfo {
			name: dataset.name.clone(),
			skipped_rows: dataset.skipped_rows,
			..Default::default()
		};
	}

	let [time_min, time_max, metric_min, metric_max, metric_sum] = dataset.observations.iter().fold(
		[f64::MAX, f64::MIN, f64::MAX, f64::MIN, 0f64],
		|[time_min, time_max, metric_min, metric_max, sum], each| {
			[
				time_min.min(each.time_index),
				time_max.max(each.time_index),
				metric_min.min(each.metric),
				metric_max.max(each.metric),
				sum + each.metric,
			]
		},
	);

	DataInfo {
		name: dataset.name.clone(),
		count,
		skipped_rows: dataset.skipped_rows,
		time_min,
		time_max,
		metric_min,
		metric_max,
		metric_mean: metric_sum / count as f64,
		preview: dataset.observations.iter().take(preview_rows).cloned().collect(),
	}
}
