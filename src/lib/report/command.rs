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

use std::{
	fs::File,
	path::{Path, PathBuf},
};

use super::helper::*;
use super::typedef::*;
use crate::config::ReportSettings;
use crate::error::Result;
use crate::forecast::typedef::RunOutcome;

/// Writes the summary under its fixed name inside `output_dir`
pub fn save_summary(
	summary: &ResultSummary,
	output_dir: &Path,
	settings: &ReportSettings,
) -> Result<PathBuf> {
	std::fs::create_dir_all(output_dir)?;
	let path = output_dir.join(&settings.file_name);

	write_summary(summary, File::create(&path)?)?;
	tracing::info!(path = %path.display(), rows = summary.rows.len(), "summary saved");

	Ok(path)
}

pub fn load_summary(path: &Path) -> Result<ResultSummary> {
	read_summary(File::open(path)?)
}

/// One CSV per completed run, named after its iteration
pub fn save_trajectories(outcomes: &[RunOutcome], output_dir: &Path) -> Result<Vec<PathBuf>> {
	std::fs::create_dir_all(output_dir)?;

	outcomes
		.iter()
		.filter_map(|each| each.run())
		.map(|run| {
			let path = output_dir.join(format!("refsys_forecast_run_{}.csv", run.iteration));
			write_trajectory(run, File::create(&path)?)?;
			tracing::debug!(path = %path.display(), points = run.points.len(), "trajectory saved");
			Ok(path)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::forecast::typedef::{ForecastPoint, ForecastRun};

	#[test]
	fn summary_lands_under_the_fixed_name() {
		let dir = tempfile::tempdir().unwrap();
		let summary = ResultSummary {
			rows: vec![SummaryRow {
				iteration: 1,
				target_time_index: Some(60200f64),
				initial_value: -400f64,
				days_elapsed: 100,
			}],
		};

		let path = save_summary(&summary, dir.path(), &ReportSettings::default()).unwrap();

		assert_eq!(path, dir.path().join(SUMMARY_FILE_NAME));
		assert_eq!(load_summary(&path).unwrap(), summary);
	}

	#[test]
	fn trajectories_only_for_completed_runs() {
		let dir = tempfile::tempdir().unwrap();
		let outcomes = vec![
			RunOutcome::Completed(ForecastRun {
				iteration: 1,
				points: vec![ForecastPoint {
					time_index: 60001f64,
					value: 1f64,
				}],
				steps_taken: 1,
				..Default::default()
			}),
			RunOutcome::Failed {
				iteration: 2,
				initial_value: 0f64,
				error: Default::default(),
			},
		];

		let paths = save_trajectories(&outcomes, &dir.path().join("runs")).unwrap();

		assert_eq!(paths.len(), 1);
		assert!(paths[0].ends_with("refsys_forecast_run_1.csv"));
		assert!(paths[0].is_file());
	}
}
