// ============================================================
// Layer 5 - LSTM Question Encoder
// ============================================================
// A hand-written LSTM, unrolled over the fixed question length.
// Each gate owns an input projection W (with bias b) and a
// recurrent projection U (no bias):
//
//   f_t  = σ(x_t W_f + h_{t-1} U_f + b_f)      forget gate
//   i_t  = σ(x_t W_i + h_{t-1} U_i + b_i)      input gate
//   C̃_t  = tanh(x_t W_c + h_{t-1} U_c + b_c)   candidate cell
//   C_t  = f_t ⊙ C_{t-1} + i_t ⊙ C̃_t
//   o_t  = σ(x_t W_o + h_{t-1} U_o + b_o)      output gate
//   h_t  = o_t ⊙ tanh(C_t)
//
// h_0 = C_0 = 0. The same parameters are used at every step and
// the encoder returns h_T, the state after the last token.
//
// Reference: Hochreiter & Schmidhuber (1997)
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::activation::{sigmoid, tanh},
};

#[derive(Config, Debug)]
pub struct LstmEncoderConfig {
    pub embed_size:  usize,
    pub hidden_size: usize,
}

impl LstmEncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> LstmEncoder<B> {
        LstmEncoder {
            forget:      self.init_gate(device),
            input:       self.init_gate(device),
            cell:        self.init_gate(device),
            output:      self.init_gate(device),
            hidden_size: self.hidden_size,
        }
    }

    fn init_gate<B: Backend>(&self, device: &B::Device) -> Gate<B> {
        Gate {
            input:  LinearConfig::new(self.embed_size, self.hidden_size).init(device),
            hidden: LinearConfig::new(self.hidden_size, self.hidden_size)
                .with_bias(false)
                .init(device),
        }
    }
}

/// Pre-activation of one gate: x W + h U + b
#[derive(Module, Debug)]
pub struct Gate<B: Backend> {
    pub input:  Linear<B>,
    pub hidden: Linear<B>,
}

impl<B: Backend> Gate<B> {
    pub fn forward(&self, x: Tensor<B, 2>, h: Tensor<B, 2>) -> Tensor<B, 2> {
        self.input.forward(x) + self.hidden.forward(h)
    }
}

#[derive(Module, Debug)]
pub struct LstmEncoder<B: Backend> {
    pub forget:      Gate<B>,
    pub input:       Gate<B>,
    pub cell:        Gate<B>,
    pub output:      Gate<B>,
    pub hidden_size: usize,
}

/// Recurrent state carried between steps, both [batch, hidden].
#[derive(Debug, Clone)]
pub struct LstmState<B: Backend> {
    pub hidden: Tensor<B, 2>,
    pub cell:   Tensor<B, 2>,
}

impl<B: Backend> LstmState<B> {
    pub fn zeros(batch_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        Self {
            hidden: Tensor::zeros([batch_size, hidden_size], device),
            cell:   Tensor::zeros([batch_size, hidden_size], device),
        }
    }
}

impl<B: Backend> LstmEncoder<B> {
    /// Advance one time step. x: [batch, embed]
    pub fn step(&self, x: Tensor<B, 2>, state: LstmState<B>) -> LstmState<B> {
        let LstmState { hidden, cell } = state;

        let f = sigmoid(self.forget.forward(x.clone(), hidden.clone()));
        let i = sigmoid(self.input.forward(x.clone(), hidden.clone()));
        let candidate = tanh(self.cell.forward(x.clone(), hidden.clone()));
        let cell = f * cell + i * candidate;

        let o = sigmoid(self.output.forward(x, hidden));
        let hidden = o * tanh(cell.clone());

        LstmState { hidden, cell }
    }

    /// inputs: [batch, steps, embed] → final hidden state [batch, hidden]
    pub fn forward(&self, inputs: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch_size, steps, embed_size] = inputs.dims();
        let mut state = LstmState::zeros(batch_size, self.hidden_size, &inputs.device());

        for t in 0..steps {
            let x_t = inputs
                .clone()
                .slice([0..batch_size, t..t + 1, 0..embed_size])
                .reshape([batch_size, embed_size]);
            state = self.step(x_t, state);
        }

        state.hidden
    }
}
