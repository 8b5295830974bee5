//! Target-height sources for new segments

use crate::config::{ChartConfig, HeightMode};
use price_feed::PriceSample;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use std::collections::VecDeque;

/// Produces the vertical position of the next segment end
pub trait HeightSource: Send {
    fn next_height(&mut self, latest: &PriceSample) -> f64;

    fn mode(&self) -> HeightMode;
}

/// Uniform integer in [-2, 2), ignoring the price
#[derive(Debug)]
pub struct RandomHeight {
    rng: StdRng,
}

impl RandomHeight {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl HeightSource for RandomHeight {
    fn next_height(&mut self, _latest: &PriceSample) -> f64 {
        f64::from(self.rng.gen_range(-2i32..2))
    }

    fn mode(&self) -> HeightMode {
        HeightMode::Random
    }
}

/// Latest price min/max-normalized over a rolling window of recent ticks
#[derive(Debug)]
pub struct PriceHeight {
    window: VecDeque<f64>,
    window_len: usize,
    half_range: f64,
}

impl PriceHeight {
    pub fn new(window_len: usize, half_range: f64) -> Self {
        Self {
            window: VecDeque::with_capacity(window_len.max(1)),
            window_len: window_len.max(1),
            half_range,
        }
    }

    fn normalize(&self, value: f64) -> f64 {
        let (min, max) = self
            .window
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let spread = max - min;
        if !spread.is_finite() || spread <= f64::EPSILON {
            return 0.0;
        }
        ((value - min) / spread) * 2.0 * self.half_range - self.half_range
    }
}

impl HeightSource for PriceHeight {
    fn next_height(&mut self, latest: &PriceSample) -> f64 {
        // The placeholder is not a market price; keep it out of the window
        if latest.is_placeholder() {
            return 0.0;
        }
        let Some(value) = latest.value.to_f64() else {
            return 0.0;
        };

        self.window.push_back(value);
        while self.window.len() > self.window_len {
            self.window.pop_front();
        }
        self.normalize(value)
    }

    fn mode(&self) -> HeightMode {
        HeightMode::Price
    }
}

/// Height source selected by `height_mode`
pub fn from_config(config: &ChartConfig) -> Box<dyn HeightSource> {
    match config.height_mode {
        HeightMode::Random => Box::new(RandomHeight::new(config.seed)),
        HeightMode::Price => Box::new(PriceHeight::new(
            config.line_caching,
            config.price_half_range,
        )),
    }
}
