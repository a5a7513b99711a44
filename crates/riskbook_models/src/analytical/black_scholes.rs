//! Black-Scholes-Merton pricing for European options on dividend-paying
//! underlyings.
//!
//! ## Mathematical Formulas
//!
//! With η = +1 for calls and −1 for puts:
//!
//! **Price**: V = η·[S·e^(−qT)·N(η·d₁) − K·e^(−rT)·N(η·d₂)]
//!
//! Where:
//! - d₁ = (ln(S/K) + (r − q + σ²/2)T) / (σ√T)
//! - d₂ = d₁ − σ√T
//!
//! Greeks follow desk conventions: theta per calendar day, rho per 1% rate
//! move and vega per volatility point.

use num_traits::Float;
use riskbook_core::math::distributions::{norm_cdf, norm_inv, norm_pdf};

use super::error::AnalyticalError;
use super::OptionType;

/// Implied volatility tolerance on the price.
const IMPLIED_VOL_TOLERANCE: f64 = 1e-8;
/// Implied volatility iteration cap.
const IMPLIED_VOL_MAX_ITER: usize = 100;
/// Largest single Newton step in volatility.
const IMPLIED_VOL_MAX_STEP: f64 = 0.5;
/// Volatility floor during the Newton iteration.
const IMPLIED_VOL_FLOOR: f64 = 1e-15;

#[inline]
fn lit<T: Float>(x: f64) -> T {
    T::from(x).unwrap_or_else(T::nan)
}

/// Price and sensitivities of a European option.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Greeks<T> {
    /// Option value
    pub value: T,
    /// ∂V/∂S
    pub delta: T,
    /// ∂²V/∂S²
    pub gamma: T,
    /// Value change per calendar day
    pub theta: T,
    /// Value change per 1% move in the rate
    pub rho: T,
    /// Value change per volatility point
    pub vega: T,
}

/// Black-Scholes-Merton model for European option pricing.
///
/// Negative rates are floored at zero on construction.
///
/// # Type Parameters
/// * `T` - Floating-point type implementing `Float`
///
/// # Examples
/// ```
/// use riskbook_models::analytical::{BlackScholes, OptionType};
///
/// let bs = BlackScholes::new(100.0_f64, 0.05, 0.02, 0.2).unwrap();
/// let g = bs.greeks(OptionType::Call, 100.0, 1.0);
///
/// assert!(g.value > 0.0);
/// assert!(g.delta > 0.0 && g.delta < 1.0);
/// assert!(g.theta < 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BlackScholes<T: Float> {
    spot: T,
    rate: T,
    dividend: T,
    volatility: T,
}

impl<T: Float> BlackScholes<T> {
    /// Creates a new model.
    ///
    /// # Arguments
    /// * `spot` - Current spot price (must be positive)
    /// * `rate` - Continuously compounded risk-free rate, floored at zero
    /// * `dividend` - Continuous dividend yield
    /// * `volatility` - Volatility (must be positive)
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidSpot` if spot <= 0
    /// - `AnalyticalError::InvalidVolatility` if volatility <= 0
    pub fn new(spot: T, rate: T, dividend: T, volatility: T) -> Result<Self, AnalyticalError> {
        let zero = T::zero();

        if !(spot > zero) {
            return Err(AnalyticalError::InvalidSpot {
                spot: spot.to_f64().unwrap_or(f64::NAN),
            });
        }

        if !(volatility > zero) {
            return Err(AnalyticalError::InvalidVolatility {
                volatility: volatility.to_f64().unwrap_or(f64::NAN),
            });
        }

        Ok(Self {
            spot,
            rate: rate.max(zero),
            dividend,
            volatility,
        })
    }

    /// Returns the spot price.
    #[inline]
    pub fn spot(&self) -> T {
        self.spot
    }

    /// Returns the floored risk-free rate.
    #[inline]
    pub fn rate(&self) -> T {
        self.rate
    }

    /// Returns the dividend yield.
    #[inline]
    pub fn dividend(&self) -> T {
        self.dividend
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> T {
        self.volatility
    }

    #[inline]
    fn expired(expiry: T) -> bool {
        expiry <= lit(1e-10)
    }

    /// Computes d₁. At expiry returns ±100 (or 0 at the money) so that
    /// N(d₁) collapses to the exercise indicator.
    #[inline]
    pub fn d1(&self, strike: T, expiry: T) -> T {
        if Self::expired(expiry) {
            let large = lit(100.0);
            return if self.spot > strike {
                large
            } else if self.spot < strike {
                -large
            } else {
                T::zero()
            };
        }

        let half = lit::<T>(0.5);
        let vol_sqrt_t = self.volatility * expiry.sqrt();
        let log_moneyness = (self.spot / strike).ln();
        let drift = (self.rate - self.dividend + half * self.volatility * self.volatility) * expiry;

        (log_moneyness + drift) / vol_sqrt_t
    }

    /// Computes d₂ = d₁ − σ√T.
    #[inline]
    pub fn d2(&self, strike: T, expiry: T) -> T {
        if Self::expired(expiry) {
            return self.d1(strike, expiry);
        }
        self.d1(strike, expiry) - self.volatility * expiry.sqrt()
    }

    /// Option value. Expired options are worth their intrinsic value.
    ///
    /// # Examples
    /// ```
    /// use riskbook_models::analytical::{BlackScholes, OptionType};
    ///
    /// let bs = BlackScholes::new(110.0_f64, 0.05, 0.0, 0.2).unwrap();
    /// assert!((bs.price(OptionType::Call, 100.0, 0.0) - 10.0).abs() < 1e-12);
    /// assert_eq!(bs.price(OptionType::Put, 100.0, 0.0), 0.0);
    /// ```
    pub fn price(&self, kind: OptionType, strike: T, expiry: T) -> T {
        if Self::expired(expiry) {
            return kind.intrinsic(self.spot, strike);
        }
        let eta: T = kind.sign();
        let df_q = (-self.dividend * expiry).exp();
        let df_r = (-self.rate * expiry).exp();
        let d1 = self.d1(strike, expiry);
        let d2 = self.d2(strike, expiry);

        eta * (self.spot * df_q * norm_cdf(eta * d1) - strike * df_r * norm_cdf(eta * d2))
    }

    /// Delta: η·e^(−qT)·N(η·d₁).
    pub fn delta(&self, kind: OptionType, strike: T, expiry: T) -> T {
        let eta: T = kind.sign();
        let df_q = (-self.dividend * expiry.max(T::zero())).exp();
        eta * df_q * norm_cdf(eta * self.d1(strike, expiry))
    }

    /// Gamma: e^(−qT)·φ(d₁) / (S·σ·√T). Zero at expiry.
    pub fn gamma(&self, strike: T, expiry: T) -> T {
        if Self::expired(expiry) {
            return T::zero();
        }
        let df_q = (-self.dividend * expiry).exp();
        df_q * norm_pdf(self.d1(strike, expiry)) / (self.spot * self.volatility * expiry.sqrt())
    }

    /// Vega per volatility point: 0.01·S·e^(−qT)·√T·φ(d₁). Zero at expiry.
    pub fn vega(&self, strike: T, expiry: T) -> T {
        if Self::expired(expiry) {
            return T::zero();
        }
        let df_q = (-self.dividend * expiry).exp();
        lit::<T>(0.01) * self.spot * df_q * expiry.sqrt() * norm_pdf(self.d1(strike, expiry))
    }

    /// Theta per calendar day. Zero at expiry.
    pub fn theta(&self, kind: OptionType, strike: T, expiry: T) -> T {
        if Self::expired(expiry) {
            return T::zero();
        }
        let eta: T = kind.sign();
        let two = lit::<T>(2.0);
        let df_q = (-self.dividend * expiry).exp();
        let df_r = (-self.rate * expiry).exp();
        let d1 = self.d1(strike, expiry);
        let d2 = self.d2(strike, expiry);

        let decay = -self.spot * self.volatility * df_q * norm_pdf(d1) / (two * expiry.sqrt());
        let carry = self.rate * strike * df_r * norm_cdf(eta * d2)
            - self.dividend * self.spot * df_q * norm_cdf(eta * d1);

        (decay - eta * carry) / lit(365.0)
    }

    /// Rho per 1% rate move: η·0.01·K·T·e^(−rT)·N(η·d₂).
    pub fn rho(&self, kind: OptionType, strike: T, expiry: T) -> T {
        if Self::expired(expiry) {
            return T::zero();
        }
        let eta: T = kind.sign();
        let df_r = (-self.rate * expiry).exp();
        eta * lit(0.01) * strike * expiry * df_r * norm_cdf(eta * self.d2(strike, expiry))
    }

    /// Value together with every sensitivity.
    pub fn greeks(&self, kind: OptionType, strike: T, expiry: T) -> Greeks<T> {
        Greeks {
            value: self.price(kind, strike, expiry),
            delta: self.delta(kind, strike, expiry),
            gamma: self.gamma(strike, expiry),
            theta: self.theta(kind, strike, expiry),
            rho: self.rho(kind, strike, expiry),
            vega: self.vega(strike, expiry),
        }
    }
}

impl BlackScholes<f64> {
    /// Volatility that reproduces `target` price.
    ///
    /// Damped Newton iteration from `initial`: each step is
    /// `(price − target) / (100·vega)` clamped to ±0.5, with the volatility
    /// kept above 1e-15.
    ///
    /// # Errors
    /// - `AnalyticalError::NonConvergentCalibration` if the price is not
    ///   matched to 1e-8 within 100 iterations
    ///
    /// # Examples
    /// ```
    /// use riskbook_models::analytical::{BlackScholes, OptionType};
    ///
    /// let quoted = BlackScholes::new(50.0_f64, 0.02, 0.01, 0.35).unwrap();
    /// let price = quoted.price(OptionType::Put, 55.0, 0.75);
    ///
    /// let vol = quoted.implied_volatility(OptionType::Put, 55.0, 0.75, price, 0.2).unwrap();
    /// assert!((vol - 0.35).abs() < 1e-6);
    /// ```
    pub fn implied_volatility(
        &self,
        kind: OptionType,
        strike: f64,
        expiry: f64,
        target: f64,
        initial: f64,
    ) -> Result<f64, AnalyticalError> {
        let mut sigma = initial.max(IMPLIED_VOL_FLOOR);
        let mut residual = f64::INFINITY;

        for _ in 0..IMPLIED_VOL_MAX_ITER {
            let model = Self {
                volatility: sigma,
                ..*self
            };
            residual = model.price(kind, strike, expiry) - target;
            if residual.abs() < IMPLIED_VOL_TOLERANCE {
                return Ok(sigma);
            }
            let vega = model.vega(strike, expiry);
            let step = if vega > 0.0 {
                residual / (100.0 * vega)
            } else {
                residual.signum() * IMPLIED_VOL_MAX_STEP
            };
            let step = step.clamp(-IMPLIED_VOL_MAX_STEP, IMPLIED_VOL_MAX_STEP);
            sigma = (sigma - step).max(IMPLIED_VOL_FLOOR);
        }

        Err(AnalyticalError::NonConvergentCalibration {
            iterations: IMPLIED_VOL_MAX_ITER,
            residual: residual.abs(),
        })
    }

    /// Strike at which the option has the given delta.
    ///
    /// Inverts `delta = η·e^(−qT)·N(η·d₁)` for d₁ and then d₁ for the strike.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidStrike` if the delta is unattainable
    ///   for the option type (outside (0, e^(−qT)) for calls or
    ///   (−e^(−qT), 0) for puts), or the option has expired
    pub fn implied_strike(
        &self,
        kind: OptionType,
        delta: f64,
        expiry: f64,
    ) -> Result<f64, AnalyticalError> {
        let eta: f64 = kind.sign();
        let prob = eta * delta * (self.dividend * expiry).exp();
        if Self::expired(expiry) || !(prob > 0.0 && prob < 1.0) {
            return Err(AnalyticalError::InvalidStrike { strike: f64::NAN });
        }
        let d1 = eta * norm_inv(prob);
        let vol_sqrt_t = self.volatility * expiry.sqrt();
        let drift = (self.rate - self.dividend + 0.5 * self.volatility * self.volatility) * expiry;

        Ok(self.spot * (drift - d1 * vol_sqrt_t).exp())
    }
}
