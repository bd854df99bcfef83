//! Effective periodic rate of an installment loan.
//!
//! The solver runs a fixed number of Newton-Raphson steps with no convergence
//! check, so its result is an estimate. Extreme inputs (fees large relative to
//! the principal, a single installment) may stop short of the true root.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

pub const NEWTON_ITERATIONS: usize = 20;
/// Starting point of the search when the nominal rate is zero.
pub const ZERO_RATE_SEED: f64 = 0.02;
pub const MONTHS_PER_YEAR: u32 = 12;

/// Level installment that amortizes `principal` over `installments` periods at `rate`.
pub fn installment(principal: f64, rate: f64, installments: u32) -> f64 {
    if installments == 0 {
        return 0.0;
    }
    let n = f64::from(installments);
    if rate == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + rate).powf(n);
    principal * rate * growth / (growth - 1.0)
}

/// Periodic rate that equates the fee-adjusted installment stream with the principal.
///
/// Degenerate inputs (`principal <= 0` or no installments) return `0.0`.
pub fn effective_rate(principal: f64, nominal_rate: f64, installments: u32, fee: f64) -> f64 {
    if principal <= 0.0 || installments == 0 {
        return 0.0;
    }
    let payment = installment(principal, nominal_rate, installments)
        + fee / f64::from(installments.max(1));

    let mut x = if nominal_rate > 0.0 {
        nominal_rate
    } else {
        ZERO_RATE_SEED
    };
    for iteration in 0..NEWTON_ITERATIONS {
        let (residual, derivative) = present_value(payment, x, installments, principal);
        if derivative != 0.0 {
            x = (x - residual / derivative).max(0.0);
        }
        trace!(iteration, rate = x, residual, "newton step");
    }
    x
}

/// Net present value residual and its derivative with respect to the rate.
fn present_value(payment: f64, rate: f64, installments: u32, principal: f64) -> (f64, f64) {
    let base = 1.0 + rate;
    let mut value = -principal;
    let mut derivative = 0.0;
    for k in 1..=installments {
        let k = f64::from(k);
        value += payment / base.powf(k);
        derivative -= k * payment / base.powf(k + 1.0);
    }
    (value, derivative)
}

/// Compound a periodic rate over `periods_per_year` periods.
pub fn annualize(rate: f64, periods_per_year: u32) -> f64 {
    (1.0 + rate).powf(f64::from(periods_per_year)) - 1.0
}

/// Nominal terms of an installment loan. Rates are fractions per period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: f64,
    pub nominal_rate: f64,
    pub installments: u32,
    #[serde(default)]
    pub fee: f64,
}

/// Cost figures derived from [`LoanTerms`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub installment: f64,
    /// Installment with fees spread evenly across periods.
    pub adjusted_installment: f64,
    pub effective_rate: f64,
    /// Effective rate compounded over twelve monthly periods.
    pub annualized_rate: f64,
    pub total_paid: f64,
    /// Everything paid beyond the principal.
    pub total_cost: f64,
}

impl LoanTerms {
    pub fn new(principal: f64, nominal_rate: f64, installments: u32, fee: f64) -> Self {
        Self {
            principal,
            nominal_rate,
            installments,
            fee,
        }
    }

    #[instrument(name = "quote_loan", skip(self), fields(principal = self.principal, installments = self.installments))]
    pub fn quote(&self) -> LoanQuote {
        let degenerate = self.principal <= 0.0 || self.installments == 0;
        let installment = if degenerate {
            0.0
        } else {
            installment(self.principal, self.nominal_rate, self.installments)
        };
        let adjusted_installment = if degenerate {
            0.0
        } else {
            installment + self.fee / f64::from(self.installments.max(1))
        };
        let effective_rate = effective_rate(
            self.principal,
            self.nominal_rate,
            self.installments,
            self.fee,
        );
        let total_paid = adjusted_installment * f64::from(self.installments);
        let quote = LoanQuote {
            installment,
            adjusted_installment,
            effective_rate,
            annualized_rate: annualize(effective_rate, MONTHS_PER_YEAR),
            total_paid,
            total_cost: if degenerate {
                0.0
            } else {
                total_paid - self.principal
            },
        };
        debug!(effective_rate, annualized = quote.annualized_rate, "loan quoted");
        quote
    }
}
