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

use super::network::LstmNetwork;
use crate::error::Result;

/// Matrix operations only ever happen on the CPU backend
pub type Inference = NdArray;

/// Anything that maps a normalized window (oldest first) to its next value.
///
/// A well-behaved model returns exactly one element; the forecast loop rejects anything else.
pub trait SequenceModel {
	fn predict(&self, window: &[f64]) -> Result<Vec<f64>>;
}

impl<F: Fn(&[f64]) -> Result<Vec<f64>>> SequenceModel for F {
	fn predict(&self, window: &[f64]) -> Result<Vec<f64>> {
		self(window)
	}
}

/// Where the model should come from, resolved once before any forecasting
#[derive(Clone, Default, PartialEq)]
pub enum ModelSource {
	#[default]
	NoModel,
	DefaultModel(PathBuf),
	UploadedModel(Vec<u8>),
}

impl std::fmt::Debug for ModelSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ModelSource::NoModel => write!(f, "NoModel"),
			ModelSource::DefaultModel(path) => write!(f, "DefaultModel({})", path.display()),
			ModelSource::UploadedModel(bytes) => write!(f, "UploadedModel({} bytes)", bytes.len()),
		}
	}
}

impl ModelSource {
	/// An upload always wins; the default is only considered when nothing was uploaded
	pub fn choose(uploaded: Option<Vec<u8>>, default_path: Option<PathBuf>) -> Self {
		match (uploaded, default_path) {
			(Some(bytes), _) => ModelSource::UploadedModel(bytes),
			(None, Some(path)) => ModelSource::DefaultModel(path),
			(None, None) => ModelSource::NoModel,
		}
	}
}

/// A loaded network ready for inference
#[derive(Debug)]
pub struct LstmPredictor {
	pub(super) network: LstmNetwork<Inference>,
	pub(super) device: NdArrayDevice,
}
