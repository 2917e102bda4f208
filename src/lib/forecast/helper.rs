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

use std::collections::VecDeque;

use super::typedef::*;
use crate::error::{ForecastError, Result};
use crate::event::{EventSink, ForecastEvent, Silent};
use crate::model::typedef::SequenceModel;
use crate::preprocess::typedef::NormalParam;

pub fn run_forecast<M: SequenceModel + ?Sized>(
	normal_param: &NormalParam,
	model: &M,
	request: &ForecastRequest,
) -> Result<ForecastRun> {
	run_forecast_with(normal_param, model, request, &CancelToken::default(), &Silent)
}

/// Feeds the model its own predictions until the threshold is met or the budget runs out.
///
/// The window starts as `window_length` copies of the normalized initial value, since there is
/// no real history right after a reset.
pub fn run_forecast_with<M: SequenceModel + ?Sized>(
	normal_param: &NormalParam,
	model: &M,
	request: &ForecastRequest,
	cancel: &CancelToken,
	sink: &dyn EventSink,
) -> Result<ForecastRun> {
	if request.window_length < 1 {
		return Err(ForecastError::InvalidInput(String::from(
			"Window length must be at least 1",
		)));
	}

	if request.max_steps < 1 {
		return Err(ForecastError::InvalidInput(String::from(
			"Step budget must be at least 1",
		)));
	}

	if !request.initial_value.is_finite() || !request.threshold.is_finite() {
		return Err(ForecastError::InvalidInput(format!(
			"Initial value {} and threshold {} must be finite",
			request.initial_value, request.threshold
		)));
	}

	sink.emit(ForecastEvent::RunStarted {
		iteration: request.iteration,
		initial_value: request.initial_value,
	});

	let scaled_input = normal_param.transform(request.initial_value);
	let mut window = VecDeque::from(vec![scaled_input; request.window_length]);

	let mut points = Vec::<ForecastPoint>::with_capacity(request.max_steps);
	let mut time_index = request.origin + 1f64;
	let mut achieved = false;

	for step in 1..=request.max_steps {
		if cancel.is_cancelled() {
			return Err(ForecastError::Cancelled);
		}

		let prediction = predict_one(model, window.make_contiguous())?;
		let value = normal_param.inverse(prediction);

		points.push(ForecastPoint { time_index, value });
		time_index += 1f64;

		window.pop_front();
		window.push_back(prediction);

		sink.emit(ForecastEvent::Progress {
			iteration: request.iteration,
			step,
			max_steps: request.max_steps,
			value,
		});

		if value >= request.threshold {
			achieved = true;
			break;
		}
	}

	let steps_taken = points.len();
	sink.emit(ForecastEvent::RunFinished {
		iteration: request.iteration,
		achieved,
		steps_taken,
	});

	Ok(ForecastRun {
		iteration: request.iteration,
		initial_value: request.initial_value,
		threshold: request.threshold,
		points,
		achieved,
		steps_taken,
	})
}

fn predict_one<M: SequenceModel + ?Sized>(model: &M, window: &[f64]) -> Result<f64> {
	let output = model.predict(window).map_err(|err| match err {
		ForecastError::ModelInvocation(_) => err,
		other => ForecastError::ModelInvocation(other.to_string()),
	})?;

	match output.as_slice() {
		[value] if value.is_finite() => Ok(*value),
		[value] => Err(ForecastError::ModelInvocation(format!(
			"The model produced a non-finite value ({})",
			value
		))),
		other => Err(ForecastError::ModelInvocation(format!(
			"Expected one value per call, the model produced {}",
			other.len()
		))),
	}
}
