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

use calamine::Reader;
use std::{fs::File, io::Read, path::Path, str::FromStr};
use strum::IntoEnumIterator;

use super::helper::*;
use super::typedef::*;
use crate::config::DataSettings;
use crate::error::{ForecastError, Result};
use crate::typedef::{CellValue, Dataset};

pub fn detect_format(path: &Path) -> Result<SourceFormat> {
	let supported = || {
		SourceFormat::iter()
			.map(|each| each.to_string())
			.collect::<Vec<_>>()
			.join(", ")
	};

	let extension = path
		.extension()
		.and_then(|found| found.to_str())
		.ok_or_else(|| {
			ForecastError::Validation(format!(
				"\"{}\" has no file extension, supported: {}",
				path.display(),
				supported()
			))
		})?;

	SourceFormat::from_str(extension).map_err(|_| {
		ForecastError::Validation(format!(
			"Cannot read \".{}\" files, supported: {}",
			extension,
			supported()
		))
	})
}

/// Reads the observation table, picking the reader from the file extension
pub fn load_data(path: &Path, columns: &DataSettings, sheet: Option<&str>) -> Result<Dataset> {
	let format = detect_format(path)?;
	let name = path
		.file_name()
		.and_then(|name| Some(name.to_str()?.to_string()))
		.unwrap_or(String::from("(unknown)"));

	tracing::info!(path = %path.display(), %format, "loading observations");

	let dataset = if format.is_spreadsheet() {
		read_spreadsheet(path, name, columns, sheet)?
	} else {
		// CSV will always ignore this
		if let Some(sheet) = sheet {
			tracing::warn!(sheet, "sheet selection ignored for CSV input");
		}
		read_csv(File::open(path)?, name, columns)?
	};

	tracing::info!(
		observations = dataset.len(),
		skipped = dataset.skipped_rows,
		"observations loaded"
	);

	Ok(dataset)
}

pub fn read_csv<R: Read>(reader: R, name: String, columns: &DataSettings) -> Result<Dataset> {
	let mut reader = csv::ReaderBuilder::new()
		.has_headers(true)
		.flexible(true)
		.trim(csv::Trim::All)
		.from_reader(reader);

	let header = reader
		.headers()?
		.iter()
		.map(|each| each.to_string())
		.collect::<Vec<_>>();

	let rows = reader
		.records()
		.map(|record| Ok(record?.iter().map(parse_cell).collect::<Vec<CellValue>>()))
		.collect::<Result<Vec<_>>>()?;

	collect_observations(name, &header, rows.into_iter(), columns)
}

/// Reads the given sheet, or the first one when no name is given
pub fn read_spreadsheet(
	path: &Path,
	name: String,
	columns: &DataSettings,
	sheet: Option<&str>,
) -> Result<Dataset> {
	let mut sheets = calamine::open_workbook_auto(path)?;

	let tab_name = match sheet {
		Some(found) => found.to_string(),
		None => sheets
			.sheet_names()
			.first()
			.cloned()
			.ok_or_else(|| ForecastError::Validation(format!("\"{}\" has no sheets", name)))?,
	};

	let range = sheets.worksheet_range(&tab_name)?;
	let mut rows = range.rows();

	let header = rows
		.next()
		.map(|cells| cells.iter().map(|each| each.to_string()).collect::<Vec<_>>())
		.unwrap_or_default();

	let cells = rows.map(|cells| cells.iter().map(convert_spreadsheet_cell).collect::<Vec<_>>());

	collect_observations(format!("{} [{}]", name, tab_name), &header, cells, columns)
}

pub fn inspect(dataset: &Dataset, settings: &DataSettings) -> DataInfo {
	describe(dataset, settings.preview_rows)
}
