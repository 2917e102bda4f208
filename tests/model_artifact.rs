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

use burn::backend::{ndarray::NdArrayDevice, NdArray};
use std::path::PathBuf;

use refsys_forecast_lib::config::{ForecastSettings, ModelSettings};
use refsys_forecast_lib::error::ForecastError;
use refsys_forecast_lib::event::Silent;
use refsys_forecast_lib::forecast::command::run_iterations;
use refsys_forecast_lib::forecast::typedef::{CancelToken, IterationParams, RunOutcome};
use refsys_forecast_lib::model::command::resolve_model;
use refsys_forecast_lib::model::network::LstmNetworkConfig;
use refsys_forecast_lib::model::typedef::{LstmPredictor, ModelSource, SequenceModel};
use refsys_forecast_lib::typedef::{Dataset, Observation};

const HIDDEN_SIZE: usize = 8;

fn settings(default_path: Option<PathBuf>) -> ModelSettings {
	ModelSettings {
		default_path,
		hidden_size: HIDDEN_SIZE,
	}
}

fn artifact() -> Vec<u8> {
	let network = LstmNetworkConfig::new()
		.with_hidden_size(HIDDEN_SIZE)
		.init::<NdArray>(&NdArrayDevice::Cpu);

	LstmPredictor::new(network).to_bytes().unwrap()
}

fn dataset() -> Dataset {
	Dataset {
		name: String::from("refsys.csv"),
		observations: (0..40)
			.map(|day| Observation {
				time_index: 60000f64 + day as f64,
				metric: -420f64 + day as f64 * 12.5,
			})
			.collect(),
		skipped_rows: 0,
	}
}

#[test]
fn default_artifact_on_disk_drives_a_forecast() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("model_lstm_refsys.mpk");
	std::fs::write(&path, artifact()).unwrap();

	let source = ModelSource::choose(None, Some(path.clone()));
	assert_eq!(source, ModelSource::DefaultModel(path.clone()));

	let model = resolve_model(source, &settings(Some(path))).unwrap();
	let forecast_settings = ForecastSettings {
		max_steps: 20,
		..Default::default()
	};
	let params = IterationParams {
		threshold: 500f64,
		initial_values: vec![-400f64, -380f64],
	};

	let report = run_iterations(
		&dataset(),
		&model,
		&params,
		&forecast_settings,
		&CancelToken::new(),
		&Silent,
	)
	.unwrap();

	assert_eq!(report.outcomes.len(), 2);
	for outcome in &report.outcomes {
		let RunOutcome::Completed(run) = outcome else {
			panic!("iteration {} failed", outcome.iteration());
		};
		assert!((1..=20).contains(&run.steps_taken));
		assert!(run.points.iter().all(|each| each.value.is_finite()));
	}
}

#[test]
fn uploaded_artifact_wins_over_default() {
	let model = resolve_model(
		ModelSource::choose(Some(artifact()), Some(PathBuf::from("/nonexistent.mpk"))),
		&settings(Some(PathBuf::from("/nonexistent.mpk"))),
	)
	.unwrap();

	let output = model.predict(&[0.5; 30]).unwrap();
	assert_eq!(output.len(), 1);
}

#[test]
fn unreadable_upload_is_reported_not_replaced() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("model_lstm_refsys.mpk");
	std::fs::write(&path, artifact()).unwrap();

	let err = resolve_model(
		ModelSource::UploadedModel(b"not a model".to_vec()),
		&settings(Some(path)),
	)
	.unwrap_err();

	assert!(matches!(err, ForecastError::ModelUnavailable(_)));
}
