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

use std::io::{Read, Write};

use super::typedef::*;
use crate::error::{ForecastError, Result};
use crate::forecast::typedef::{ForecastRun, RunOutcome};

/// One row per completed run; failed iterations have nothing to summarize
pub fn summarize(outcomes: &[RunOutcome]) -> ResultSummary {
	ResultSummary {
		rows: outcomes
			.iter()
			.filter_map(|each| each.run())
			.map(|run| SummaryRow {
				iteration: run.iteration,
				target_time_index: run.target_time_index(),
				initial_value: run.initial_value,
				days_elapsed: run.steps_taken,
			})
			.collect(),
	}
}

pub fn write_summary<W: Write>(summary: &ResultSummary, writer: W) -> Result<()> {
	let mut writer = csv::Writer::from_writer(writer);
	writer.write_record(SUMMARY_HEADER)?;

	for each in &summary.rows {
		writer.write_record([
			format!("#{}", each.iteration),
			each.target_time_index
				.map(|found| found.to_string())
				.unwrap_or_default(),
			each.initial_value.to_string(),
			each.days_elapsed.to_string(),
		])?;
	}

	writer.flush()?;
	Ok(())
}

pub fn read_summary<R: Read>(reader: R) -> Result<ResultSummary> {
	let mut reader = csv::ReaderBuilder::new()
		.has_headers(true)
		.trim(csv::Trim::All)
		.from_reader(reader);

	let header = reader.headers()?.iter().collect::<Vec<_>>();
	if header != SUMMARY_HEADER {
		return Err(ForecastError::Validation(format!(
			"Unexpected summary header: {}",
			header.join(", ")
		)));
	}

	let malformed = |row_number: usize, column: &str, cell: &str| {
		ForecastError::Validation(format!(
			"Row {}: \"{}\" value \"{}\" is malformed",
			row_number, column, cell
		))
	};

	let mut rows = Vec::<SummaryRow>::new();
	for (index, record) in reader.records().enumerate() {
		let record = record?;
		let row_number = index + 2;
		let cell = |column: usize| record.get(column).unwrap_or_default();

		let iteration = cell(0)
			.trim_start_matches('#')
			.parse::<usize>()
			.map_err(|_| malformed(row_number, SUMMARY_HEADER[0], cell(0)))?;
		let target_time_index = match cell(1) {
			"" => None,
			found => Some(
				found
					.parse::<f64>()
					.map_err(|_| malformed(row_number, SUMMARY_HEADER[1], found))?,
			),
		};
		let initial_value = cell(2)
			.parse::<f64>()
			.map_err(|_| malformed(row_number, SUMMARY_HEADER[2], cell(2)))?;
		let days_elapsed = cell(3)
			.parse::<usize>()
			.map_err(|_| malformed(row_number, SUMMARY_HEADER[3], cell(3)))?;

		rows.push(SummaryRow {
			iteration,
			target_time_index,
			initial_value,
			days_elapsed,
		});
	}

	Ok(ResultSummary { rows })
}

/// Day-by-day values of one run
pub fn write_trajectory<W: Write>(run: &ForecastRun, writer: W) -> Result<()> {
	let mut writer = csv::Writer::from_writer(writer);
	writer.write_record(TRAJECTORY_HEADER)?;

	for each in &run.points {
		writer.write_record([each.time_index.to_string(), each.value.to_string()])?;
	}

	writer.flush()?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::forecast::typedef::ForecastPoint;
	use crate::typedef::ErrorInfo;

	fn run(iteration: usize, initial_value: f64, achieved: bool, steps: usize) -> ForecastRun {
		ForecastRun {
			iteration,
			initial_value,
			threshold: 500f64,
			points: (1..=steps)
				.map(|day| ForecastPoint {
					time_index: 60100f64 + day as f64,
					value: initial_value + day as f64,
				})
				.collect(),
			achieved,
			steps_taken: steps,
		}
	}

	#[test]
	fn summary_skips_failed_iterations() {
		let outcomes = vec![
			RunOutcome::Completed(run(1, -400f64, true, 37)),
			RunOutcome::Failed {
				iteration: 2,
				initial_value: -380f64,
				error: ErrorInfo::default(),
			},
			RunOutcome::Completed(run(3, -410.25, false, 200)),
		];

		let summary = summarize(&outcomes);
		assert_eq!(summary.rows.len(), 2);
		assert_eq!(summary.rows[0].target_time_index, Some(60137f64));
		assert_eq!(summary.rows[0].days_elapsed, 37);
		assert_eq!(summary.rows[1].iteration, 3);
		assert_eq!(summary.rows[1].target_time_index, None);
		assert_eq!(summary.achieved_count(), 1);
	}

	#[test]
	fn summary_csv_layout() {
		let summary = ResultSummary {
			rows: vec![
				SummaryRow {
					iteration: 1,
					target_time_index: Some(60137f64),
					initial_value: -400f64,
					days_elapsed: 37,
				},
				SummaryRow {
					iteration: 2,
					target_time_index: None,
					initial_value: -410.25,
					days_elapsed: 200,
				},
			],
		};

		let mut buffer = Vec::new();
		write_summary(&summary, &mut buffer).unwrap();

		assert_eq!(
			String::from_utf8(buffer).unwrap(),
			"Iteration,Target MJD,Initial REFSYS,Days After Reset\n#1,60137,-400,37\n#2,,-410.25,200\n"
		);
	}

	#[test]
	fn summary_survives_export_and_reparse() {
		let summary = summarize(&[
			RunOutcome::Completed(run(1, -400f64, true, 37)),
			RunOutcome::Completed(run(2, -123.456, true, 12)),
			RunOutcome::Completed(run(3, -410.25, false, 200)),
		]);

		let mut buffer = Vec::new();
		write_summary(&summary, &mut buffer).unwrap();
		let parsed = read_summary(buffer.as_slice()).unwrap();

		assert_eq!(parsed, summary);
	}

	#[test]
	fn foreign_csv_is_rejected() {
		let err = read_summary("MJD,REFSYS\n60000,1\n".as_bytes()).unwrap_err();
		assert!(matches!(err, ForecastError::Validation(_)));

		let err = read_summary(
			"Iteration,Target MJD,Initial REFSYS,Days After Reset\n#x,1,2,3\n".as_bytes(),
		)
		.unwrap_err();
		assert!(err.to_string().starts_with("Row 2:"));
	}

	#[test]
	fn trajectory_lists_every_day() {
		let mut buffer = Vec::new();
		write_trajectory(&run(1, 0f64, false, 3), &mut buffer).unwrap();

		assert_eq!(
			String::from_utf8(buffer).unwrap(),
			"MJD,Predicted REFSYS\n60101,1\n60102,2\n60103,3\n"
		);
	}
}
