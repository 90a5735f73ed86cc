//! Genome-backed feed-forward policy: 24 vision features -> 16 ReLU -> 4 softmax.

use crate::policy::Policy;
use crate::pos::Dir;
use crate::sensors::Observation;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const INPUT_SIZE: usize = 24; // 8 rays x (distance, food, near danger)
pub const HIDDEN_SIZE: usize = 16;
pub const OUTPUT_SIZE: usize = 4; // up, down, left, right

pub const GENOME_LEN: usize =
    INPUT_SIZE * HIDDEN_SIZE + HIDDEN_SIZE + HIDDEN_SIZE * OUTPUT_SIZE + OUTPUT_SIZE;

/// A ray that stops on body or wall closer than this fraction of the grid
/// width counts as danger. Rays that stop on food never do.
const NEAR_DANGER: f32 = 0.2;

#[derive(Debug, Error)]
pub enum GenomeError {
    #[error("genome has {actual} weights, expected {expected}", expected = GENOME_LEN)]
    Length { actual: usize },
    #[error("weight {0} is not finite")]
    NonFinite(usize),
    #[error("genome json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("genome encode: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("genome decode: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Flat weight vector: input->hidden (row per input), hidden bias,
/// hidden->output (row per hidden unit), output bias.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Genome(Vec<f32>);

impl TryFrom<Vec<f32>> for Genome {
    type Error = GenomeError;

    fn try_from(weights: Vec<f32>) -> Result<Self, Self::Error> {
        if weights.len() != GENOME_LEN {
            return Err(GenomeError::Length { actual: weights.len() });
        }
        if let Some(i) = weights.iter().position(|w| !w.is_finite()) {
            return Err(GenomeError::NonFinite(i));
        }
        Ok(Self(weights))
    }
}

impl From<Genome> for Vec<f32> {
    fn from(genome: Genome) -> Self {
        genome.0
    }
}

impl Genome {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self((0..GENOME_LEN).map(|_| rng.gen_range(-1.0..1.0)).collect())
    }

    pub fn weights(&self) -> &[f32] {
        &self.0
    }

    pub fn to_json(&self) -> Result<String, GenomeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(src: &str) -> Result<Self, GenomeError> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, GenomeError> {
        Ok(bincode::serde::encode_to_vec(self, bincode::config::standard())?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GenomeError> {
        let (weights, _): (Vec<f32>, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
        Self::try_from(weights)
    }
}

#[derive(Clone, Debug)]
pub struct Network {
    w_ih: Vec<f32>,
    b_h: Vec<f32>,
    w_ho: Vec<f32>,
    b_o: Vec<f32>,
}

impl Network {
    pub fn from_genome(genome: &Genome) -> Self {
        let w = genome.weights();
        let (ih, hb, ho) = (
            INPUT_SIZE * HIDDEN_SIZE,
            HIDDEN_SIZE,
            HIDDEN_SIZE * OUTPUT_SIZE,
        );
        Self {
            w_ih: w[..ih].to_vec(),
            b_h: w[ih..ih + hb].to_vec(),
            w_ho: w[ih + hb..ih + hb + ho].to_vec(),
            b_o: w[ih + hb + ho..].to_vec(),
        }
    }

    /// Action probabilities in [`Dir::ALL`] order.
    pub fn forward(&self, inputs: &[f32; INPUT_SIZE]) -> [f32; OUTPUT_SIZE] {
        let mut hidden = [0.0f32; HIDDEN_SIZE];
        for (j, h) in hidden.iter_mut().enumerate() {
            let sum: f32 = inputs
                .iter()
                .enumerate()
                .map(|(i, x)| x * self.w_ih[i * HIDDEN_SIZE + j])
                .sum();
            *h = (sum + self.b_h[j]).max(0.0);
        }

        let mut out = [0.0f32; OUTPUT_SIZE];
        for (k, o) in out.iter_mut().enumerate() {
            let sum: f32 = hidden
                .iter()
                .enumerate()
                .map(|(j, h)| h * self.w_ho[j * OUTPUT_SIZE + k])
                .sum();
            *o = sum + self.b_o[k];
        }
        softmax(&mut out);
        out
    }

    pub fn predict(&self, inputs: &[f32; INPUT_SIZE]) -> Dir {
        let probs = self.forward(inputs);
        let mut best = 0;
        for k in 1..OUTPUT_SIZE {
            if probs[k] > probs[best] {
                best = k;
            }
        }
        Dir::ALL[best]
    }
}

fn softmax(xs: &mut [f32]) {
    let max = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut total = 0.0;
    for x in xs.iter_mut() {
        *x = (*x - max).exp();
        total += *x;
    }
    for x in xs.iter_mut() {
        *x /= total;
    }
}

/// Network inputs from the vision rays, distances normalised by grid width.
pub fn encode(observation: &Observation, grid_width: u32) -> [f32; INPUT_SIZE] {
    let scale = grid_width.max(1) as f32;
    let mut inputs = [0.0f32; INPUT_SIZE];
    for (i, ray) in observation.vision.iter().enumerate() {
        let dist = ray.distance as f32 / scale;
        inputs[i * 3] = dist;
        inputs[i * 3 + 1] = if ray.food_found { 1.0 } else { 0.0 };
        inputs[i * 3 + 2] = if dist < NEAR_DANGER && !ray.food_found { 1.0 } else { 0.0 };
    }
    inputs
}

#[derive(Clone, Debug)]
pub struct NeuralPolicy {
    net: Network,
    grid_width: u32,
}

impl NeuralPolicy {
    pub fn new(genome: &Genome, grid_width: u32) -> Self {
        Self { net: Network::from_genome(genome), grid_width }
    }

    pub fn network(&self) -> &Network {
        &self.net
    }
}

impl Policy for NeuralPolicy {
    fn decide(&mut self, observation: &Observation) -> Dir {
        self.net.predict(&encode(observation, self.grid_width))
    }
}
