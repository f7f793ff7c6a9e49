//! Link functions mapping means to the linear-predictor scale.

/// Link function of a saturated loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// g(μ) = log(μ)
    Log,
    /// g(μ) = log(-log(1-μ))
    Cloglog,
}

impl Link {
    /// Compute the link function g(μ).
    #[inline]
    pub fn link(&self, mu: f64) -> f64 {
        match self {
            Link::Log => mu.max(1e-300).ln(),
            Link::Cloglog => {
                let mu_clamped = mu.clamp(1e-10, 1.0 - 1e-10);
                (-((1.0 - mu_clamped).ln())).ln()
            }
        }
    }

    /// Compute the inverse link function g⁻¹(η) = μ.
    #[inline]
    pub fn link_inverse(&self, eta: f64) -> f64 {
        match self {
            Link::Log => eta.exp(),
            Link::Cloglog => {
                // 1 - exp(-exp(η))
                let result = if eta > 10.0 {
                    1.0 - 1e-14
                } else if eta < -30.0 {
                    1e-14
                } else {
                    -(-eta.exp()).exp_m1()
                };
                result.clamp(1e-14, 1.0 - 1e-14)
            }
        }
    }
}
