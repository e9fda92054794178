//! The transformation applied to prices before they reach the regressor.
use common::{PriceError, PriceResult};

/// Maps a price into the space the regressor is fit in.
pub fn forward(price: f64, log_target: bool) -> f64 {
    if log_target {
        price.ln_1p()
    } else {
        price
    }
}

/// Maps a regressor output back to a price.
/// # Returns
/// - An [PriceError::Inference] if the result is not finite.
pub fn inverse(output: f64, log_target: bool) -> PriceResult<f64> {
    let price = if log_target { output.exp_m1() } else { output };
    if price.is_finite() {
        // a price below zero has no meaning
        Ok(price.max(0.0))
    } else {
        Err(PriceError::Inference(format!(
            "regressor produced the non finite price {}",
            price
        )))
    }
}
