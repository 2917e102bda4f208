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
use super::network::LstmNetworkConfig;
use super::typedef::*;
use crate::config::ModelSettings;
use crate::error::{ForecastError, Result};

/// Turns a model source into a usable handle, or says why forecasting cannot proceed.
///
/// There is no fallback between sources: a broken upload never silently becomes the default.
pub fn resolve_model(source: ModelSource, settings: &ModelSettings) -> Result<LstmPredictor> {
	let config = LstmNetworkConfig::new().with_hidden_size(settings.hidden_size);

	match source {
		ModelSource::NoModel => Err(ForecastError::ModelUnavailable(String::from(
			"No model was supplied and no default model is configured",
		))),
		ModelSource::DefaultModel(path) => {
			if !path.is_file() {
				return Err(ForecastError::ModelUnavailable(format!(
					"Default model \"{}\" not found, supply one with --model",
					path.display()
				)));
			}

			let predictor = load_from_file(&path, &config)?;
			check_compatible(&predictor)?;
			tracing::info!(path = %path.display(), "using default model");
			Ok(predictor)
		}
		ModelSource::UploadedModel(bytes) => {
			let size = bytes.len();
			let predictor = load_from_bytes(bytes, &config)?;
			check_compatible(&predictor)?;
			tracing::info!(bytes = size, "using uploaded model");
			Ok(predictor)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::path::PathBuf;

	#[test]
	fn no_model_is_unavailable() {
		let err = resolve_model(ModelSource::NoModel, &ModelSettings::default()).unwrap_err();
		assert!(matches!(err, ForecastError::ModelUnavailable(_)));
	}

	#[test]
	fn missing_default_is_unavailable() {
		let err = resolve_model(
			ModelSource::DefaultModel(PathBuf::from("/nonexistent/model_lstm_refsys.mpk")),
			&ModelSettings::default(),
		)
		.unwrap_err();

		assert!(matches!(err, ForecastError::ModelUnavailable(_)));
		assert!(err.to_string().contains("--model"));
	}

	#[test]
	fn broken_upload_does_not_fall_back() {
		let err = resolve_model(
			ModelSource::UploadedModel(b"not a model".to_vec()),
			&ModelSettings::default(),
		)
		.unwrap_err();

		assert!(matches!(err, ForecastError::ModelUnavailable(_)));
		assert!(err.to_string().contains("uploaded"));
	}

	fn record_with_hidden_size(hidden_size: usize) -> Vec<u8> {
		let network = LstmNetworkConfig::new()
			.with_hidden_size(hidden_size)
			.init::<Inference>(&burn::backend::ndarray::NdArrayDevice::Cpu);

		LstmPredictor::new(network).to_bytes().unwrap()
	}

	#[test]
	fn default_model_without_mpk_extension_resolves() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("refsys_model.bin");
		std::fs::write(&path, record_with_hidden_size(8)).unwrap();

		let settings = ModelSettings {
			default_path: Some(path.clone()),
			hidden_size: 8,
		};
		let predictor = resolve_model(ModelSource::DefaultModel(path), &settings).unwrap();

		assert_eq!(predictor.predict(&[0.5; 30]).unwrap().len(), 1);
	}

	#[test]
	fn hidden_size_mismatch_is_unavailable() {
		let err = resolve_model(
			ModelSource::UploadedModel(record_with_hidden_size(8)),
			&ModelSettings::default(),
		)
		.unwrap_err();

		assert!(matches!(err, ForecastError::ModelUnavailable(_)));
		assert_eq!(err.title(), "Model Unavailable");
	}

	#[test]
	fn upload_wins_over_default() {
		let source = ModelSource::choose(Some(vec![1, 2, 3]), Some(PathBuf::from("default.mpk")));
		assert_eq!(source, ModelSource::UploadedModel(vec![1, 2, 3]));

		let source = ModelSource::choose(None, Some(PathBuf::from("default.mpk")));
		assert_eq!(source, ModelSource::DefaultModel(PathBuf::from("default.mpk")));

		assert_eq!(ModelSource::choose(None, None), ModelSource::NoModel);
	}
}
