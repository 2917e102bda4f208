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
	nn::{Linear, LinearConfig, Lstm, LstmConfig},
	prelude::*,
};

/// Sequence-to-one regressor: a single LSTM layer read out by a linear head
#[derive(Module, Debug)]
pub struct LstmNetwork<B: Backend> {
	lstm: Lstm<B>,
	output: Linear<B>,
}

#[derive(Config, Debug)]
pub struct LstmNetworkConfig {
	#[config(default = 1)]
	pub input_size: usize,

	/// Must match the artifact being loaded
	#[config(default = 64)]
	pub hidden_size: usize,
}

impl LstmNetworkConfig {
	pub fn init<B: Backend>(&self, device: &B::Device) -> LstmNetwork<B> {
		LstmNetwork {
			lstm: LstmConfig::new(self.input_size, self.hidden_size, true).init(device),
			output: LinearConfig::new(self.hidden_size, 1).init(device),
		}
	}
}

impl<B: Backend> LstmNetwork<B> {
	/// `input` is `[batch, sequence, feature]`, the result is `[batch, 1]`
	pub fn forward(&self, input: &Tensor<B, 3>) -> Tensor<B, 2> {
		let (sequence, _state) = self.lstm.forward(input.clone(), None);
		let [batch, length, hidden] = sequence.dims();

		// Only the last hidden state feeds the head
		let last = sequence
			.slice([0..batch, (length - 1)..length, 0..hidden])
			.reshape([batch, hidden]);

		self.output.forward(last)
	}
}
