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

use serde::Serialize;
use std::sync::{
	atomic::{AtomicBool, Ordering},
	Arc,
};

use crate::preprocess::typedef::NormalParam;
use crate::report::typedef::ResultSummary;
use crate::typedef::ErrorInfo;

/// Everything one forecast run needs besides the normalizer and the model
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForecastRequest {
	/// 1-based, only used to label progress
	pub iteration: usize,
	pub initial_value: f64,
	pub threshold: f64,
	pub max_steps: usize,
	pub window_length: usize,
	/// Last known time index; the first forecast lands one unit after it
	pub origin: f64,
}

#[derive(Default, Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
	pub time_index: f64,
	pub value: f64,
}

#[derive(Default, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRun {
	pub iteration: usize,
	pub initial_value: f64,
	pub threshold: f64,
	pub points: Vec<ForecastPoint>,
	pub achieved: bool,
	pub steps_taken: usize,
}

impl ForecastRun {
	/// The time index at which the threshold was first met
	pub fn target_time_index(&self) -> Option<f64> {
		if self.achieved {
			self.points.last().map(|found| found.time_index)
		} else {
			None
		}
	}

	pub fn last_time_index(&self) -> Option<f64> {
		self.points.last().map(|found| found.time_index)
	}

	pub fn peak(&self) -> Option<ForecastPoint> {
		self.points
			.iter()
			.cloned()
			.reduce(|last, each| if each.value > last.value { each } else { last })
	}
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RunOutcome {
	Completed(ForecastRun),
	#[serde(rename_all = "camelCase")]
	Failed {
		iteration: usize,
		initial_value: f64,
		error: ErrorInfo,
	},
}

impl RunOutcome {
	pub fn iteration(&self) -> usize {
		match self {
			RunOutcome::Completed(run) => run.iteration,
			RunOutcome::Failed { iteration, .. } => *iteration,
		}
	}

	pub fn run(&self) -> Option<&ForecastRun> {
		match self {
			RunOutcome::Completed(run) => Some(run),
			RunOutcome::Failed { .. } => None,
		}
	}
}

/// Validated user parameters for a batch of resets
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IterationParams {
	pub threshold: f64,
	pub initial_values: Vec<f64>,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
	pub normal_param: NormalParam,
	pub threshold: f64,
	pub max_steps: usize,
	pub outcomes: Vec<RunOutcome>,
	pub summary: ResultSummary,
}

/// Shared flag checked before every model invocation
#[derive(Clone, Default, Debug)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}
