//! Beta posterior and Gamma-based Beta sampling.
//!
//! Beta(α, β) is drawn as `Ga / (Ga + Gb)` with `Ga ~ Gamma(α, 1)` and
//! `Gb ~ Gamma(β, 1)`. Gamma variates use Marsaglia & Tsang (2000) for
//! shape >= 1 and the shape + 1 boost (`Gamma(k + 1) * U^(1/k)`) below 1.

use rand::Rng;
use rand_distr::StandardNormal;

/// Numerical floor for both posterior parameters
pub const MIN_PARAMETER: f64 = 0.01;

/// Beta(α, β) belief over a latent success probability
///
/// Immutable: `update` returns a new posterior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaPosterior {
    alpha: f64,
    beta: f64,
}

impl BetaPosterior {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            alpha: floor_parameter(alpha),
            beta: floor_parameter(beta),
        }
    }

    /// Beta(1, 1), the uniform prior
    pub fn uniform() -> Self {
        Self::new(1.0, 1.0)
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    pub fn variance(&self) -> f64 {
        let sum = self.alpha + self.beta;
        (self.alpha * self.beta) / (sum * sum * (sum + 1.0))
    }

    /// Mode, defined only when both parameters exceed 1
    pub fn mode(&self) -> Option<f64> {
        if self.alpha > 1.0 && self.beta > 1.0 {
            Some((self.alpha - 1.0) / (self.alpha + self.beta - 2.0))
        } else {
            None
        }
    }

    /// Conjugate Bernoulli update
    #[must_use]
    pub fn update(&self, success: bool) -> Self {
        if success {
            Self::new(self.alpha + 1.0, self.beta)
        } else {
            Self::new(self.alpha, self.beta + 1.0)
        }
    }

    pub fn sample(&self) -> f64 {
        sample_beta(self.alpha, self.beta)
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        sample_beta_with(rng, self.alpha, self.beta)
    }
}

impl Default for BetaPosterior {
    fn default() -> Self {
        Self::uniform()
    }
}

#[inline]
fn floor_parameter(value: f64) -> f64 {
    if value.is_nan() {
        MIN_PARAMETER
    } else {
        value.max(MIN_PARAMETER)
    }
}

/// Draw from Beta(alpha, beta) using the thread-local RNG
pub fn sample_beta(alpha: f64, beta: f64) -> f64 {
    sample_beta_with(&mut rand::thread_rng(), alpha, beta)
}

/// Draw from Beta(alpha, beta) using the supplied RNG
///
/// Degenerate parameters (both below the floor) yield a uniform draw.
pub fn sample_beta_with<R: Rng + ?Sized>(rng: &mut R, alpha: f64, beta: f64) -> f64 {
    if alpha < MIN_PARAMETER && beta < MIN_PARAMETER {
        return rng.gen::<f64>();
    }

    let gamma_alpha = sample_gamma(rng, floor_parameter(alpha));
    let gamma_beta = sample_gamma(rng, floor_parameter(beta));

    let sum = gamma_alpha + gamma_beta;
    if sum <= 0.0 || !sum.is_finite() {
        return 0.5;
    }

    (gamma_alpha / sum).clamp(0.0, 1.0)
}

/// Draw from Gamma(shape, 1)
pub fn sample_gamma<R: Rng + ?Sized>(rng: &mut R, shape: f64) -> f64 {
    if shape < 1.0 {
        // (0, 1] so the power never sees zero
        let u: f64 = 1.0 - rng.gen::<f64>();
        return sample_gamma(rng, shape + 1.0) * u.powf(1.0 / shape);
    }

    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();

    loop {
        let mut x: f64;
        let mut v: f64;
        loop {
            x = rng.sample(StandardNormal);
            v = 1.0 + c * x;
            if v > 0.0 {
                break;
            }
        }

        let v = v * v * v;
        let u: f64 = rng.gen();
        let x_squared = x * x;

        if u < 1.0 - 0.0331 * x_squared * x_squared {
            return d * v;
        }
        if u.ln() < 0.5 * x_squared + d * (1.0 - v + v.ln()) {
            return d * v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn moments(alpha: f64, beta: f64, draws: usize, seed: u64) -> (f64, f64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let samples: Vec<f64> = (0..draws)
            .map(|_| sample_beta_with(&mut rng, alpha, beta))
            .collect();
        let mean = samples.iter().sum::<f64>() / draws as f64;
        let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / draws as f64;
        (mean, variance)
    }

    #[test]
    fn test_update_success_increments_alpha() {
        let prior = BetaPosterior::new(2.0, 3.0);
        let posterior = prior.update(true);

        assert_eq!(posterior.alpha(), 3.0);
        assert_eq!(posterior.beta(), 3.0);
        // Receiver unchanged
        assert_eq!(prior.alpha(), 2.0);
        assert_eq!(prior.beta(), 3.0);
    }

    #[test]
    fn test_update_failure_increments_beta() {
        let prior = BetaPosterior::new(2.0, 3.0);
        let posterior = prior.update(false);

        assert_eq!(posterior.alpha(), 2.0);
        assert_eq!(posterior.beta(), 4.0);
    }

    #[test]
    fn test_parameters_are_floored() {
        let posterior = BetaPosterior::new(0.0, -4.0);
        assert_eq!(posterior.alpha(), MIN_PARAMETER);
        assert_eq!(posterior.beta(), MIN_PARAMETER);

        let nan = BetaPosterior::new(f64::NAN, 1.0);
        assert_eq!(nan.alpha(), MIN_PARAMETER);
    }

    #[test]
    fn test_mean_variance_mode() {
        let posterior = BetaPosterior::new(9.0, 3.0);
        assert!((posterior.mean() - 0.75).abs() < 1e-12);
        assert!((posterior.variance() - 27.0 / (144.0 * 13.0)).abs() < 1e-12);
        assert!((posterior.mode().unwrap() - 0.8).abs() < 1e-12);
        assert!(BetaPosterior::uniform().mode().is_none());
    }

    #[test]
    fn test_sample_mean_matches_posterior_mean() {
        for (i, (alpha, beta)) in [(2.0, 5.0), (10.0, 3.0), (1.0, 1.0), (0.5, 0.5), (0.3, 2.0)]
            .into_iter()
            .enumerate()
        {
            let expected = alpha / (alpha + beta);
            let (mean, _) = moments(alpha, beta, 100_000, 42 + i as u64);
            assert!(
                (mean - expected).abs() < 0.01,
                "Beta({}, {}) mean {} expected {}",
                alpha,
                beta,
                mean,
                expected
            );
        }
    }

    #[test]
    fn test_sample_variance_matches_posterior_variance() {
        for (alpha, beta) in [(2.0, 5.0), (0.5, 0.5), (20.0, 20.0)] {
            let expected = BetaPosterior::new(alpha, beta).variance();
            let (_, variance) = moments(alpha, beta, 100_000, 7);
            assert!(
                (variance - expected).abs() / expected < 0.05,
                "Beta({}, {}) variance {} expected {}",
                alpha,
                beta,
                variance,
                expected
            );
        }
    }

    #[test]
    fn test_samples_stay_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(3);
        for &(alpha, beta) in &[(0.01, 0.01), (0.01, 50.0), (500.0, 0.02), (1.0, 1.0)] {
            for _ in 0..10_000 {
                let s = sample_beta_with(&mut rng, alpha, beta);
                assert!((0.0..=1.0).contains(&s), "sample {} out of range", s);
            }
        }
    }

    #[test]
    fn test_degenerate_parameters_fall_back_to_uniform() {
        let (mean, variance) = moments(0.001, 0.001, 50_000, 11);
        assert!((mean - 0.5).abs() < 0.01);
        // Uniform variance is 1/12
        assert!((variance - 1.0 / 12.0).abs() < 0.005);
    }

    #[test]
    fn test_gamma_mean_matches_shape() {
        let mut rng = StdRng::seed_from_u64(99);
        for shape in [0.4, 1.0, 3.5] {
            let mean = (0..100_000).map(|_| sample_gamma(&mut rng, shape)).sum::<f64>() / 100_000.0;
            assert!((mean - shape).abs() / shape < 0.03, "Gamma({}) mean {}", shape, mean);
        }
    }
}
