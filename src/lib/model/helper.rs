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

use burn::{
	backend::ndarray::NdArrayDevice,
	module::Module,
	record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder, RecorderError},
	tensor::Tensor,
};
use std::{
	panic::{catch_unwind, AssertUnwindSafe},
	path::Path,
};

use super::network::*;
use super::typedef::*;
use crate::error::{ForecastError, Result};

/// Reads the whole file, whatever its extension, then decodes it like an upload
pub(super) fn load_from_file(path: &Path, config: &LstmNetworkConfig) -> Result<LstmPredictor> {
	let bytes = std::fs::read(path).map_err(|err| {
		ForecastError::ModelUnavailable(format!("Cannot read \"{}\": {}", path.display(), err))
	})?;

	decode_record(bytes, config).map_err(|err| {
		ForecastError::ModelUnavailable(format!("Cannot load \"{}\": {}", path.display(), err))
	})
}

pub(super) fn load_from_bytes(bytes: Vec<u8>, config: &LstmNetworkConfig) -> Result<LstmPredictor> {
	decode_record(bytes, config).map_err(|err| {
		ForecastError::ModelUnavailable(format!("Cannot load the uploaded model: {}", err))
	})
}

fn decode_record(
	bytes: Vec<u8>,
	config: &LstmNetworkConfig,
) -> std::result::Result<LstmPredictor, RecorderError> {
	let device = NdArrayDevice::Cpu;

	let record: LstmNetworkRecord<Inference> =
		NamedMpkBytesRecorder::<FullPrecisionSettings>::default().load(bytes, &device)?;

	Ok(LstmPredictor {
		network: config.init::<Inference>(&device).load_record(record),
		device,
	})
}

/// Runs one prediction on a short dummy window.
///
/// Loading never checks tensor shapes, so a record trained with another hidden size only
/// shows up here.
pub(super) fn check_compatible(predictor: &LstmPredictor) -> Result<()> {
	let output = predictor.predict(&[0.5; 4]).map_err(|err| {
		ForecastError::ModelUnavailable(format!(
			"The model does not match the configured network: {}",
			err
		))
	})?;

	if output.len() != 1 {
		return Err(ForecastError::ModelUnavailable(format!(
			"The model produces {} values per call, expected one",
			output.len()
		)));
	}

	Ok(())
}

impl LstmPredictor {
	pub fn new(network: LstmNetwork<Inference>) -> Self {
		Self {
			network,
			device: NdArrayDevice::Cpu,
		}
	}

	/// Serializes in the same format an uploaded model is expected in
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		NamedMpkBytesRecorder::<FullPrecisionSettings>::default()
			.record(self.network.clone().into_record(), ())
			.map_err(|err| ForecastError::ModelUnavailable(err.to_string()))
	}
}

impl SequenceModel for LstmPredictor {
	fn predict(&self, window: &[f64]) -> Result<Vec<f64>> {
		if window.is_empty() {
			return Err(ForecastError::ModelInvocation(String::from(
				"The input window is empty",
			)));
		}

		// Shape it as [1, window_length, 1]
		let tensor =
			Tensor::<Inference, 1>::from_data(window, &self.device).unsqueeze_dims::<3>(&[0, -1]);

		// NdArray panics on a record whose shapes disagree with the configured network.
		// The default hook would dump that panic on stderr, so log it instead.
		let previous_hook = std::panic::take_hook();
		std::panic::set_hook(Box::new(|info| {
			tracing::debug!(%info, "network panicked");
		}));
		let predicted = catch_unwind(AssertUnwindSafe(|| self.network.forward(&tensor)));
		std::panic::set_hook(previous_hook);

		let predicted = predicted.map_err(|_| {
			ForecastError::ModelInvocation(String::from(
				"The network rejected the input, is the hidden size right for this artifact?",
			))
		})?;

		Ok(predicted.into_data().iter::<f64>().collect::<Vec<_>>())
	}
}
