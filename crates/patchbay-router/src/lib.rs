//! Channel routing matrix with solo/mute state.
//!
//! A [`ChannelRouter`] sits between a track's splitter and the output
//! merger and keeps three layers of state:
//!
//! - the desired routing matrix (input channel × output channel)
//! - per-channel solo flags
//! - per-channel mute flags (mute dominates solo)
//!
//! The live patch is always the intersection of the desired matrix and
//! channel audibility, so toggling solo or mute never loses routing state.
//!
//! [`apply_crossfade`] pairs the router with the crossfade gain laws in
//! `patchbay-core` for A/B deck blends.
//!
//! ```rust
//! use patchbay_core::PatchContext;
//! use patchbay_router::{ChannelRouter, RoutingConnection};
//!
//! let mut ctx = PatchContext::new(48000.0);
//! let mut router = ChannelRouter::new(&mut ctx, 2, 2)?;
//!
//! router.toggle_solo(&mut ctx, 0)?;
//! assert!(router.is_audible(0));
//! assert!(!router.is_audible(1));
//! # Ok::<(), patchbay_router::RouterError>(())
//! ```

mod error;
mod matrix;

pub use error::RouterError;
pub use matrix::{ChannelRouter, RoutingConnection, default_matrix};

use patchbay_core::{CrossfadeCurve, NodeHandle, PatchContext, StereoGain, crossfade_gain};

/// Applies a crossfade position to a pair of live gain nodes.
///
/// `t = 0` leaves `left` at full gain and `right` silent, `t = 1` the
/// reverse; values are clamped and rounded by the gain law. Returns the
/// pair that was written so callers can display it.
pub fn apply_crossfade(
    ctx: &mut PatchContext,
    t: f32,
    curve: CrossfadeCurve,
    left: NodeHandle,
    right: NodeHandle,
) -> Result<StereoGain, RouterError> {
    let gains = crossfade_gain(t, curve);
    ctx.set_param(left, "gain", f64::from(gains.left))?;
    ctx.set_param(right, "gain", f64::from(gains.right))?;
    Ok(gains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchbay_core::NodeOptions;

    #[test]
    fn test_apply_crossfade_writes_both_gains() {
        let mut ctx = PatchContext::new(48000.0);
        let a = ctx.create_node("gain", &NodeOptions::new()).unwrap();
        let b = ctx.create_node("gain", &NodeOptions::new()).unwrap();

        let gains = apply_crossfade(&mut ctx, 0.5, CrossfadeCurve::EqualPower, a, b).unwrap();
        assert_eq!(gains.left, 0.707);
        assert_eq!(ctx.param(a, "gain"), Some(0.707));
        assert_eq!(ctx.param(b, "gain"), Some(0.707));
    }

    #[test]
    fn test_apply_crossfade_dead_handle() {
        let mut ctx = PatchContext::new(48000.0);
        let a = ctx.create_node("gain", &NodeOptions::new()).unwrap();
        let b = ctx.create_node("gain", &NodeOptions::new()).unwrap();
        ctx.release(a).unwrap();

        let err = apply_crossfade(&mut ctx, 0.0, CrossfadeCurve::Linear, a, b).unwrap_err();
        assert!(matches!(err, RouterError::Patch(_)));
    }
}
