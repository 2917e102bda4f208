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

use super::helper::*;
use super::typedef::*;
use crate::config::ForecastSettings;
use crate::error::{ForecastError, Result};
use crate::event::{EventSink, ForecastEvent};
use crate::model::typedef::SequenceModel;
use crate::preprocess::helper::fit_normal_param;
use crate::report::helper::summarize;
use crate::typedef::{Dataset, ErrorInfo};

/// Checks the user's parameters against the configured bounds.
///
/// Without an explicit count there is one iteration per initial value (at least one).
/// Iterations without an initial value get the configured default.
pub fn plan_iterations(
	iterations: Option<usize>,
	threshold: Option<f64>,
	initial_values: &[f64],
	settings: &ForecastSettings,
) -> Result<IterationParams> {
	let iterations = iterations.unwrap_or(initial_values.len().max(1));
	if !settings.iteration_bounds().contains(&iterations) {
		return Err(ForecastError::Validation(format!(
			"Number of iterations must be between {} and {}, got {}",
			settings.min_iterations, settings.max_iterations, iterations
		)));
	}

	if initial_values.len() > iterations {
		return Err(ForecastError::Validation(format!(
			"Got {} initial values for {} iterations",
			initial_values.len(),
			iterations
		)));
	}

	let threshold = threshold.unwrap_or(settings.default_threshold);
	if !settings.threshold_bounds().contains(&threshold) {
		return Err(ForecastError::Validation(format!(
			"Threshold must be between {} and {}, got {}",
			settings.min_threshold, settings.max_threshold, threshold
		)));
	}

	if let Some(found) = initial_values.iter().find(|each| !each.is_finite()) {
		return Err(ForecastError::Validation(format!(
			"Initial value {} is not a finite number",
			found
		)));
	}

	let mut initial_values = initial_values.to_vec();
	initial_values.resize(iterations, settings.default_initial_value);

	Ok(IterationParams {
		threshold,
		initial_values,
	})
}

/// Runs one forecast per reset, one after another, against a single model.
///
/// A failing iteration is recorded and the rest still run. With `chain_resets` every
/// iteration starts the day after the previous successful one ended.
pub fn run_iterations<M: SequenceModel + ?Sized>(
	dataset: &Dataset,
	model: &M,
	params: &IterationParams,
	settings: &ForecastSettings,
	cancel: &CancelToken,
	sink: &dyn EventSink,
) -> Result<BatchReport> {
	let normal_param = fit_normal_param(&dataset.metric_values())?;
	let mut origin = dataset.last_time_index().ok_or_else(|| {
		ForecastError::InvalidInput(String::from("The dataset has no observations"))
	})?;

	tracing::info!(
		iterations = params.initial_values.len(),
		threshold = params.threshold,
		window_length = settings.window_length,
		max_steps = settings.max_steps,
		origin,
		"starting forecast"
	);

	let mut outcomes = Vec::<RunOutcome>::with_capacity(params.initial_values.len());
	for (index, initial_value) in params.initial_values.iter().enumerate() {
		let request = ForecastRequest {
			iteration: index + 1,
			initial_value: *initial_value,
			threshold: params.threshold,
			max_steps: settings.max_steps,
			window_length: settings.window_length,
			origin,
		};

		match run_forecast_with(&normal_param, model, &request, cancel, sink) {
			Ok(run) => {
				if settings.chain_resets {
					origin = run.last_time_index().unwrap_or(origin);
				}
				outcomes.push(RunOutcome::Completed(run));
			}
			Err(err) => {
				let error = ErrorInfo::from(&err);
				sink.emit(ForecastEvent::RunFailed {
					iteration: request.iteration,
					error: error.clone(),
				});
				outcomes.push(RunOutcome::Failed {
					iteration: request.iteration,
					initial_value: request.initial_value,
					error,
				});
			}
		}
	}

	let summary = summarize(&outcomes);

	Ok(BatchReport {
		normal_param,
		threshold: params.threshold,
		max_steps: settings.max_steps,
		outcomes,
		summary,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::event::Silent;
	use crate::typedef::Observation;

	fn dataset() -> Dataset {
		Dataset {
			name: String::from("refsys.csv"),
			observations: vec![
				Observation {
					time_index: 60000f64,
					metric: 0f64,
				},
				Observation {
					time_index: 60010f64,
					metric: 1000f64,
				},
			],
			skipped_rows: 0,
		}
	}

	fn settings(max_steps: usize) -> ForecastSettings {
		ForecastSettings {
			window_length: 5,
			max_steps,
			..Default::default()
		}
	}

	/// 1/8 of the 1000-wide range per step: +125 every day
	fn climbing(window: &[f64]) -> Result<Vec<f64>> {
		Ok(vec![window.last().unwrap() + 0.125])
	}

	#[test]
	fn defaults_fill_missing_initial_values() {
		let params = plan_iterations(Some(3), None, &[-380f64], &ForecastSettings::default()).unwrap();

		assert_eq!(params.threshold, 500f64);
		assert_eq!(params.initial_values, vec![-380f64, -400f64, -400f64]);
	}

	#[test]
	fn count_follows_initial_values_when_unspecified() {
		let params =
			plan_iterations(None, Some(600f64), &[1f64, 2f64], &ForecastSettings::default()).unwrap();
		assert_eq!(params.initial_values.len(), 2);

		let params = plan_iterations(None, None, &[], &ForecastSettings::default()).unwrap();
		assert_eq!(params.initial_values, vec![-400f64]);
	}

	#[test]
	fn out_of_bounds_parameters_are_rejected() {
		let defaults = ForecastSettings::default();

		assert!(plan_iterations(Some(0), None, &[], &defaults).is_err());
		assert!(plan_iterations(Some(11), None, &[], &defaults).is_err());
		assert!(plan_iterations(Some(1), Some(50f64), &[], &defaults).is_err());
		assert!(plan_iterations(Some(1), Some(1001f64), &[], &defaults).is_err());
		assert!(plan_iterations(Some(1), None, &[1f64, 2f64], &defaults).is_err());
		assert!(plan_iterations(Some(1), None, &[f64::NAN], &defaults).is_err());
	}

	#[test]
	fn resets_chain_one_after_another() {
		let params = IterationParams {
			threshold: 500f64,
			initial_values: vec![0f64, 250f64],
		};

		let report = run_iterations(
			&dataset(),
			&climbing,
			&params,
			&settings(200),
			&CancelToken::new(),
			&Silent,
		)
		.unwrap();

		// 0 -> 125, 250, 375, 500 in 4 days; 250 -> 375, 500 in 2 days
		let first = report.outcomes[0].run().unwrap();
		assert_eq!(first.steps_taken, 4);
		assert_eq!(first.target_time_index(), Some(60014f64));

		let second = report.outcomes[1].run().unwrap();
		assert_eq!(second.steps_taken, 2);
		assert_eq!(second.points[0].time_index, 60015f64);
		assert_eq!(second.target_time_index(), Some(60016f64));

		assert_eq!(report.summary.rows.len(), 2);
	}

	#[test]
	fn independent_resets_share_the_origin() {
		let params = IterationParams {
			threshold: 500f64,
			initial_values: vec![0f64, 250f64],
		};
		let settings = ForecastSettings {
			chain_resets: false,
			..settings(200)
		};

		let report = run_iterations(
			&dataset(),
			&climbing,
			&params,
			&settings,
			&CancelToken::new(),
			&Silent,
		)
		.unwrap();

		assert_eq!(report.outcomes[1].run().unwrap().points[0].time_index, 60011f64);
	}

	#[test]
	fn failed_iteration_does_not_stop_the_rest() {
		let params = IterationParams {
			threshold: 500f64,
			initial_values: vec![0f64, 100f64, 250f64],
		};
		// Any window starting at 0.1 normalized (100) breaks the model
		let fragile = |window: &[f64]| -> Result<Vec<f64>> {
			if window[0] == 0.1 {
				Err(ForecastError::ModelInvocation(String::from("bad window")))
			} else {
				Ok(vec![window.last().unwrap() + 0.125])
			}
		};

		let report = run_iterations(
			&dataset(),
			&fragile,
			&params,
			&settings(200),
			&CancelToken::new(),
			&Silent,
		)
		.unwrap();

		assert!(report.outcomes[0].run().is_some());
		assert!(matches!(
			&report.outcomes[1],
			RunOutcome::Failed { iteration: 2, error, .. } if error.title == "Prediction Failed"
		));
		assert!(report.outcomes[2].run().is_some());
		assert_eq!(report.summary.rows.len(), 2);
		assert_eq!(report.summary.rows[1].iteration, 3);
	}

	#[test]
	fn cancelled_batch_reports_every_iteration_as_cancelled() {
		let cancel = CancelToken::new();
		cancel.cancel();
		let params = IterationParams {
			threshold: 500f64,
			initial_values: vec![0f64, 0f64],
		};

		let report =
			run_iterations(&dataset(), &climbing, &params, &settings(200), &cancel, &Silent).unwrap();

		assert_eq!(report.outcomes.len(), 2);
		assert!(report.outcomes.iter().all(|each| each.run().is_none()));
		assert!(report.summary.rows.is_empty());
	}

	#[test]
	fn empty_dataset_is_invalid_input() {
		let params = IterationParams {
			threshold: 500f64,
			initial_values: vec![0f64],
		};

		let err = run_iterations(
			&Dataset::default(),
			&climbing,
			&params,
			&settings(200),
			&CancelToken::new(),
			&Silent,
		)
		.unwrap_err();

		assert!(matches!(err, ForecastError::InvalidInput(_)));
	}
}
