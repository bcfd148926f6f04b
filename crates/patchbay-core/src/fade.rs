//! Crossfade gain laws.
//!
//! Computes the left/right gain pair for a crossfade position `t ∈ [0, 1]`
//! under one of four curve shapes. `t = 0` is fully left, `t = 1` fully
//! right. Input is clamped before computation and outputs are rounded to
//! three decimal places so persisted fade positions stay stable across
//! platforms.
//!
//! | Curve | Law |
//! |-------|-----|
//! | [`Linear`](CrossfadeCurve::Linear) | `left = 1-t`, `right = t` |
//! | [`EqualPower`](CrossfadeCurve::EqualPower) | `left = cos(tπ/2)`, `right = sin(tπ/2)` |
//! | [`Log`](CrossfadeCurve::Log) | `left = (1-t)²`, `right = t²` |
//! | [`Sigmoid`](CrossfadeCurve::Sigmoid) | logistic centered at `t = 0.5`, sharpness 10 |

use serde::{Deserialize, Serialize};

/// Sharpness constant of the sigmoid law.
const SIGMOID_K: f32 = 10.0;

/// Shape of the crossfade law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossfadeCurve {
    /// Straight-line blend. Dips ~3 dB at the midpoint for correlated
    /// signals.
    Linear,
    /// Constant-power pan law; the usual choice for uncorrelated program
    /// material.
    EqualPower,
    /// Squared-ramp blend, faster rolloff near the edges.
    Log,
    /// Logistic blend centered at the midpoint; holds each side near full
    /// gain until close to the switch point.
    Sigmoid,
}

/// A computed left/right gain pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoGain {
    /// Gain applied to the left (outgoing) side.
    pub left: f32,
    /// Gain applied to the right (incoming) side.
    pub right: f32,
}

/// Computes the left/right gain pair for blend position `t`.
///
/// `t` is clamped to `[0, 1]`; outputs are rounded to 3 decimal places.
///
/// # Example
///
/// ```rust
/// use patchbay_core::{CrossfadeCurve, crossfade_gain};
///
/// let g = crossfade_gain(0.0, CrossfadeCurve::EqualPower);
/// assert_eq!(g.left, 1.0);
/// assert_eq!(g.right, 0.0);
///
/// let g = crossfade_gain(0.5, CrossfadeCurve::Linear);
/// assert_eq!(g.left, 0.5);
/// assert_eq!(g.right, 0.5);
/// ```
pub fn crossfade_gain(t: f32, curve: CrossfadeCurve) -> StereoGain {
    let t = t.clamp(0.0, 1.0);
    let (left, right) = match curve {
        CrossfadeCurve::Linear => (1.0 - t, t),
        CrossfadeCurve::EqualPower => {
            let phase = t * core::f32::consts::FRAC_PI_2;
            (phase.cos(), phase.sin())
        }
        CrossfadeCurve::Log => ((1.0 - t) * (1.0 - t), t * t),
        CrossfadeCurve::Sigmoid => {
            let left = 1.0 / (1.0 + ((t - 0.5) * SIGMOID_K).exp());
            (left, 1.0 - left)
        }
    };
    StereoGain {
        left: round3(left),
        right: round3(right),
    }
}

/// Rounds to 3 decimal places.
#[inline]
fn round3(v: f32) -> f32 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_power_boundaries() {
        let g = crossfade_gain(0.0, CrossfadeCurve::EqualPower);
        assert_eq!(g.left, 1.0);
        assert_eq!(g.right, 0.0);

        let g = crossfade_gain(1.0, CrossfadeCurve::EqualPower);
        assert_eq!(g.left, 0.0);
        assert_eq!(g.right, 1.0);
    }

    #[test]
    fn test_equal_power_midpoint_is_constant_power() {
        let g = crossfade_gain(0.5, CrossfadeCurve::EqualPower);
        // cos(π/4) = sin(π/4) ≈ 0.707
        assert_eq!(g.left, 0.707);
        assert_eq!(g.right, 0.707);
    }

    #[test]
    fn test_linear_midpoint() {
        let g = crossfade_gain(0.5, CrossfadeCurve::Linear);
        assert_eq!(g.left, 0.5);
        assert_eq!(g.right, 0.5);
    }

    #[test]
    fn test_log_curve() {
        let g = crossfade_gain(0.5, CrossfadeCurve::Log);
        assert_eq!(g.left, 0.25);
        assert_eq!(g.right, 0.25);

        let g = crossfade_gain(1.0, CrossfadeCurve::Log);
        assert_eq!(g.left, 0.0);
        assert_eq!(g.right, 1.0);
    }

    #[test]
    fn test_sigmoid_midpoint_and_symmetry() {
        let g = crossfade_gain(0.5, CrossfadeCurve::Sigmoid);
        assert_eq!(g.left, 0.5);
        assert_eq!(g.right, 0.5);

        let a = crossfade_gain(0.2, CrossfadeCurve::Sigmoid);
        let b = crossfade_gain(0.8, CrossfadeCurve::Sigmoid);
        assert_eq!(a.left, b.right);
        assert_eq!(a.right, b.left);
    }

    #[test]
    fn test_input_clamped() {
        let g = crossfade_gain(-4.0, CrossfadeCurve::Linear);
        assert_eq!(g.left, 1.0);
        assert_eq!(g.right, 0.0);

        let g = crossfade_gain(7.5, CrossfadeCurve::Linear);
        assert_eq!(g.left, 0.0);
        assert_eq!(g.right, 1.0);
    }

    #[test]
    fn test_curve_serde_tags() {
        let tags: Vec<CrossfadeCurve> =
            serde_json::from_str(r#"["linear","equal-power","log","sigmoid"]"#).unwrap();
        assert_eq!(
            tags,
            vec![
                CrossfadeCurve::Linear,
                CrossfadeCurve::EqualPower,
                CrossfadeCurve::Log,
                CrossfadeCurve::Sigmoid,
            ]
        );
    }
}
