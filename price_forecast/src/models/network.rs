//! Stacked LSTM regressor with a single linear output unit
//!
//! Each window is fed one scalar per time step. Lower layers pass their
//! full hidden-state sequence upward; the top layer's final hidden state
//! feeds the output unit. Training is mini-batch backpropagation through
//! time on mean squared error with the Adam optimiser.

use crate::error::{ForecastError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use trade_math::SequenceWindow;

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-7;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Optimisation settings for [`LstmNetwork::train`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
}

/// One LSTM layer. Gate rows are stacked `[input, forget, cell, output]`,
/// each row spanning `[x_t, h_{t-1}]`.
#[derive(Debug, Clone)]
struct LstmLayer {
    input_size: usize,
    hidden: usize,
    weights: Vec<f64>,
    bias: Vec<f64>,
}

#[derive(Debug)]
struct StepCache {
    concat: Vec<f64>,
    input_gate: Vec<f64>,
    forget_gate: Vec<f64>,
    cell_candidate: Vec<f64>,
    output_gate: Vec<f64>,
    cell_prev: Vec<f64>,
    cell_tanh: Vec<f64>,
}

#[derive(Debug)]
struct LayerTrace {
    steps: Vec<StepCache>,
    outputs: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
struct LayerGrads {
    weights: Vec<f64>,
    bias: Vec<f64>,
}

impl LstmLayer {
    fn new(input_size: usize, hidden: usize, rng: &mut StdRng) -> Self {
        let width = input_size + hidden;
        let rows = 4 * hidden;
        // Glorot-uniform limits for the input kernel and the recurrent kernel
        let input_limit = (6.0 / (input_size + rows) as f64).sqrt();
        let recurrent_limit = (6.0 / (hidden + rows) as f64).sqrt();

        let mut weights = Vec::with_capacity(rows * width);
        for _ in 0..rows {
            for col in 0..width {
                let limit = if col < input_size {
                    input_limit
                } else {
                    recurrent_limit
                };
                weights.push(rng.gen_range(-limit..limit));
            }
        }

        let mut bias = vec![0.0; rows];
        for b in &mut bias[hidden..2 * hidden] {
            *b = 1.0;
        }

        Self {
            input_size,
            hidden,
            weights,
            bias,
        }
    }

    fn width(&self) -> usize {
        self.input_size + self.hidden
    }

    fn zero_grads(&self) -> LayerGrads {
        LayerGrads {
            weights: vec![0.0; self.weights.len()],
            bias: vec![0.0; self.bias.len()],
        }
    }

    fn forward(&self, inputs: &[Vec<f64>]) -> LayerTrace {
        let h = self.hidden;
        let width = self.width();
        let mut hidden_state = vec![0.0; h];
        let mut cell = vec![0.0; h];
        let mut steps = Vec::with_capacity(inputs.len());
        let mut outputs = Vec::with_capacity(inputs.len());

        for x in inputs {
            let mut concat = Vec::with_capacity(width);
            concat.extend_from_slice(x);
            concat.extend_from_slice(&hidden_state);

            let z: Vec<f64> = self
                .weights
                .chunks_exact(width)
                .zip(self.bias.iter())
                .map(|(row, b)| b + row.iter().zip(&concat).map(|(w, v)| w * v).sum::<f64>())
                .collect();

            let input_gate: Vec<f64> = z[..h].iter().map(|&v| sigmoid(v)).collect();
            let forget_gate: Vec<f64> = z[h..2 * h].iter().map(|&v| sigmoid(v)).collect();
            let cell_candidate: Vec<f64> = z[2 * h..3 * h].iter().map(|v| v.tanh()).collect();
            let output_gate: Vec<f64> = z[3 * h..].iter().map(|&v| sigmoid(v)).collect();

            let new_cell: Vec<f64> = (0..h)
                .map(|j| forget_gate[j] * cell[j] + input_gate[j] * cell_candidate[j])
                .collect();
            let cell_tanh: Vec<f64> = new_cell.iter().map(|c| c.tanh()).collect();
            let new_hidden: Vec<f64> = (0..h).map(|j| output_gate[j] * cell_tanh[j]).collect();

            steps.push(StepCache {
                concat,
                input_gate,
                forget_gate,
                cell_candidate,
                output_gate,
                cell_prev: cell,
                cell_tanh,
            });
            outputs.push(new_hidden.clone());
            hidden_state = new_hidden;
            cell = new_cell;
        }

        LayerTrace { steps, outputs }
    }

    /// Backpropagate through time. `d_outputs[t]` is the loss gradient with
    /// respect to this layer's hidden output at step `t`. Returns the
    /// gradient with respect to each step's input.
    fn backward(
        &self,
        trace: &LayerTrace,
        d_outputs: &[Vec<f64>],
        grads: &mut LayerGrads,
    ) -> Vec<Vec<f64>> {
        let h = self.hidden;
        let width = self.width();
        let mut dh_next = vec![0.0; h];
        let mut dc_next = vec![0.0; h];
        let mut d_inputs = vec![Vec::new(); trace.steps.len()];

        for (t, step) in trace.steps.iter().enumerate().rev() {
            let mut dz = vec![0.0; 4 * h];
            for j in 0..h {
                let dh = d_outputs[t][j] + dh_next[j];
                let i = step.input_gate[j];
                let f = step.forget_gate[j];
                let g = step.cell_candidate[j];
                let o = step.output_gate[j];
                let tc = step.cell_tanh[j];

                let dc = dc_next[j] + dh * o * (1.0 - tc * tc);
                dc_next[j] = dc * f;

                dz[j] = dc * g * i * (1.0 - i);
                dz[h + j] = dc * step.cell_prev[j] * f * (1.0 - f);
                dz[2 * h + j] = dc * i * (1.0 - g * g);
                dz[3 * h + j] = dh * tc * o * (1.0 - o);
            }

            let mut d_concat = vec![0.0; width];
            for (r, &g) in dz.iter().enumerate() {
                if g == 0.0 {
                    continue;
                }
                grads.bias[r] += g;
                let row = &self.weights[r * width..(r + 1) * width];
                let grad_row = &mut grads.weights[r * width..(r + 1) * width];
                for k in 0..width {
                    grad_row[k] += g * step.concat[k];
                    d_concat[k] += g * row[k];
                }
            }

            dh_next.copy_from_slice(&d_concat[self.input_size..]);
            d_concat.truncate(self.input_size);
            d_inputs[t] = d_concat;
        }

        d_inputs
    }
}

#[derive(Debug, Clone)]
struct Moments {
    first: Vec<f64>,
    second: Vec<f64>,
}

impl Moments {
    fn new(len: usize) -> Self {
        Self {
            first: vec![0.0; len],
            second: vec![0.0; len],
        }
    }

    fn apply(&mut self, params: &mut [f64], grads: &[f64], step_size: f64) {
        for (k, (p, &g)) in params.iter_mut().zip(grads).enumerate() {
            self.first[k] = BETA1 * self.first[k] + (1.0 - BETA1) * g;
            self.second[k] = BETA2 * self.second[k] + (1.0 - BETA2) * g * g;
            *p -= step_size * self.first[k] / (self.second[k].sqrt() + EPSILON);
        }
    }
}

#[derive(Debug)]
struct Adam {
    learning_rate: f64,
    step: i32,
    layers: Vec<(Moments, Moments)>,
    head_weights: Moments,
    head_bias: Moments,
}

#[derive(Debug)]
struct NetworkGrads {
    layers: Vec<LayerGrads>,
    head_weights: Vec<f64>,
    head_bias: f64,
}

/// Stacked LSTM with a linear output unit
#[derive(Debug, Clone)]
pub struct LstmNetwork {
    layers: Vec<LstmLayer>,
    head_weights: Vec<f64>,
    head_bias: f64,
}

impl LstmNetwork {
    /// Build a network of `layers` LSTM layers of `hidden` units over
    /// scalar inputs, drawing initial weights from `rng`
    pub fn new(layers: usize, hidden: usize, rng: &mut StdRng) -> Self {
        let mut stack = Vec::with_capacity(layers);
        let mut input_size = 1;
        for _ in 0..layers {
            stack.push(LstmLayer::new(input_size, hidden, rng));
            input_size = hidden;
        }

        let limit = (6.0 / (hidden + 1) as f64).sqrt();
        let head_weights = (0..hidden).map(|_| rng.gen_range(-limit..limit)).collect();

        Self {
            layers: stack,
            head_weights,
            head_bias: 0.0,
        }
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn hidden_width(&self) -> usize {
        self.head_weights.len()
    }

    /// Predict the value that follows `window`
    pub fn predict(&self, window: &[f64]) -> f64 {
        self.forward(window).1
    }

    fn forward(&self, window: &[f64]) -> (Vec<LayerTrace>, f64) {
        let mut inputs: Vec<Vec<f64>> = window.iter().map(|&v| vec![v]).collect();
        let mut traces = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let trace = layer.forward(&inputs);
            inputs = trace.outputs.clone();
            traces.push(trace);
        }

        let last_hidden = inputs.last().map(Vec::as_slice).unwrap_or(&[]);
        let output = self.head_bias
            + self
                .head_weights
                .iter()
                .zip(last_hidden)
                .map(|(w, h)| w * h)
                .sum::<f64>();
        (traces, output)
    }

    fn zero_grads(&self) -> NetworkGrads {
        NetworkGrads {
            layers: self.layers.iter().map(LstmLayer::zero_grads).collect(),
            head_weights: vec![0.0; self.head_weights.len()],
            head_bias: 0.0,
        }
    }

    /// Accumulate gradients for one window; returns its squared error
    fn accumulate(&self, window: &SequenceWindow, scale: f64, grads: &mut NetworkGrads) -> f64 {
        let (traces, output) = self.forward(&window.input);
        let error = output - window.target;
        let d_output = 2.0 * error * scale;

        let steps = window.input.len();
        if let Some(top) = traces.last() {
            if let Some(last_hidden) = top.outputs.last() {
                for (g, h) in grads.head_weights.iter_mut().zip(last_hidden) {
                    *g += d_output * h;
                }
            }
        }
        grads.head_bias += d_output;

        let hidden = self.hidden_width();
        let mut d_outputs = vec![vec![0.0; hidden]; steps];
        if let Some(last) = d_outputs.last_mut() {
            for (d, w) in last.iter_mut().zip(&self.head_weights) {
                *d = d_output * w;
            }
        }

        for ((layer, trace), layer_grads) in self
            .layers
            .iter()
            .zip(&traces)
            .zip(grads.layers.iter_mut())
            .rev()
        {
            d_outputs = layer.backward(trace, &d_outputs, layer_grads);
        }

        error * error
    }

    fn optimizer(&self, learning_rate: f64) -> Adam {
        Adam {
            learning_rate,
            step: 0,
            layers: self
                .layers
                .iter()
                .map(|l| (Moments::new(l.weights.len()), Moments::new(l.bias.len())))
                .collect(),
            head_weights: Moments::new(self.head_weights.len()),
            head_bias: Moments::new(1),
        }
    }

    fn apply(&mut self, adam: &mut Adam, grads: &NetworkGrads) {
        adam.step += 1;
        let step_size = adam.learning_rate * (1.0 - BETA2.powi(adam.step)).sqrt()
            / (1.0 - BETA1.powi(adam.step));

        for ((layer, (w_moments, b_moments)), layer_grads) in self
            .layers
            .iter_mut()
            .zip(adam.layers.iter_mut())
            .zip(&grads.layers)
        {
            w_moments.apply(&mut layer.weights, &layer_grads.weights, step_size);
            b_moments.apply(&mut layer.bias, &layer_grads.bias, step_size);
        }
        adam.head_weights
            .apply(&mut self.head_weights, &grads.head_weights, step_size);
        adam.head_bias.apply(
            std::slice::from_mut(&mut self.head_bias),
            std::slice::from_ref(&grads.head_bias),
            step_size,
        );
    }

    /// Train on `windows`, shuffling them every epoch with `rng`.
    ///
    /// Returns the mean squared error of each epoch. A non-finite loss stops
    /// training with [`ForecastError::ModelFit`].
    pub fn train(
        &mut self,
        windows: &[SequenceWindow],
        options: &TrainOptions,
        rng: &mut StdRng,
    ) -> Result<Vec<f64>> {
        if windows.is_empty() {
            return Err(ForecastError::InsufficientData(
                "No training windows".to_string(),
            ));
        }
        if options.batch_size == 0 {
            return Err(ForecastError::InvalidRequest(
                "Batch size must be greater than zero".to_string(),
            ));
        }

        let mut adam = self.optimizer(options.learning_rate);
        let mut order: Vec<usize> = (0..windows.len()).collect();
        let mut losses = Vec::with_capacity(options.epochs);

        for epoch in 0..options.epochs {
            order.shuffle(rng);
            let mut total = 0.0;

            for batch in order.chunks(options.batch_size) {
                let mut grads = self.zero_grads();
                let scale = 1.0 / batch.len() as f64;
                let mut batch_loss = 0.0;
                for &idx in batch {
                    batch_loss += self.accumulate(&windows[idx], scale, &mut grads);
                }
                if !batch_loss.is_finite() {
                    return Err(ForecastError::ModelFit(format!(
                        "Training diverged in epoch {}: loss is not finite",
                        epoch + 1
                    )));
                }
                self.apply(&mut adam, &grads);
                total += batch_loss;
            }

            let loss = total / windows.len() as f64;
            log::debug!("epoch {}/{} loss={:.6}", epoch + 1, options.epochs, loss);
            losses.push(loss);
        }

        Ok(losses)
    }
}
