//! Channel routing matrix with solo/mute state.
//!
//! A [`ChannelRouter`] tracks, per audio track, a boolean connectivity
//! matrix from input channel index to output channel index, plus
//! independent solo and mute flags per input channel, and applies the
//! result to a live splitter/merger pair.
//!
//! Two layers of state are kept apart:
//!
//! - the **desired matrix** — what the caller routed, via
//!   [`route_nodes`](ChannelRouter::route_nodes)
//! - **audibility** — the solo/mute overlay. A channel contributes iff it
//!   is not muted and either no channel is soloed or it is soloed itself.
//!   Mute dominates solo: a channel that is both muted and soloed is
//!   silent.
//!
//! The live patch is always `desired ∧ audible`; toggling solo or mute
//! re-patches without clobbering the desired matrix.

use patchbay_core::{NodeHandle, NodeOptions, PatchContext};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RouterError;

/// One cell update of the routing matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConnection {
    /// Input channel index (splitter output).
    pub input_index: u32,
    /// Output channel index (merger input).
    pub output_index: u32,
    /// Whether the cell is routed.
    pub connected: bool,
}

impl RoutingConnection {
    /// Convenience constructor.
    pub fn new(input_index: u32, output_index: u32, connected: bool) -> Self {
        Self {
            input_index,
            output_index,
            connected,
        }
    }
}

/// Per-track channel router over a live splitter/merger pair.
///
/// # Example
///
/// ```rust
/// use patchbay_core::PatchContext;
/// use patchbay_router::{ChannelRouter, RoutingConnection};
///
/// let mut ctx = PatchContext::new(48000.0);
/// let mut router = ChannelRouter::new(&mut ctx, 2, 2)?;
///
/// // Identity default for stereo in/out.
/// assert!(router.is_routed(0, 0));
/// assert!(router.is_routed(1, 1));
///
/// // Swap the channels.
/// router.route_nodes(&mut ctx, &[
///     RoutingConnection::new(0, 0, false),
///     RoutingConnection::new(1, 1, false),
///     RoutingConnection::new(0, 1, true),
///     RoutingConnection::new(1, 0, true),
/// ])?;
/// assert!(router.is_routed(0, 1));
/// # Ok::<(), patchbay_router::RouterError>(())
/// ```
#[derive(Debug)]
pub struct ChannelRouter {
    splitter: NodeHandle,
    merger: NodeHandle,
    inputs: u32,
    outputs: u32,
    /// Desired matrix, row-major: `matrix[input * outputs + output]`.
    matrix: Vec<bool>,
    solo: Vec<bool>,
    mute: Vec<bool>,
    destroyed: bool,
}

impl ChannelRouter {
    /// Creates the splitter/merger pair and applies the built-in default
    /// matrix for the channel counts.
    pub fn new(ctx: &mut PatchContext, inputs: u32, outputs: u32) -> Result<Self, RouterError> {
        let splitter = ctx.create_node("splitter", &NodeOptions::new().with("channels", inputs))?;
        let merger = match ctx.create_node("merger", &NodeOptions::new().with("channels", outputs))
        {
            Ok(handle) => handle,
            Err(err) => {
                // Don't leave the splitter behind.
                let _ = ctx.release(splitter);
                return Err(err.into());
            }
        };

        let mut router = Self {
            splitter,
            merger,
            inputs,
            outputs,
            matrix: vec![false; (inputs * outputs) as usize],
            solo: vec![false; inputs as usize],
            mute: vec![false; inputs as usize],
            destroyed: false,
        };
        router.reset_all_nodes(ctx, None)?;
        Ok(router)
    }

    /// Input channel count.
    pub fn inputs(&self) -> u32 {
        self.inputs
    }

    /// Output channel count.
    pub fn outputs(&self) -> u32 {
        self.outputs
    }

    /// The live splitter handle (track side).
    pub fn splitter(&self) -> NodeHandle {
        self.splitter
    }

    /// The live merger handle (bus side).
    pub fn merger(&self) -> NodeHandle {
        self.merger
    }

    /// Applies a list of cell updates, in order.
    ///
    /// Each update is independent; cells not present in the list keep
    /// their prior state. Re-applying the current state is a no-op.
    pub fn route_nodes(
        &mut self,
        ctx: &mut PatchContext,
        updates: &[RoutingConnection],
    ) -> Result<(), RouterError> {
        self.ensure_live()?;
        for update in updates {
            self.check_channel(update.input_index, "input", self.inputs)?;
            self.check_channel(update.output_index, "output", self.outputs)?;
            let cell = (update.input_index * self.outputs + update.output_index) as usize;
            self.matrix[cell] = update.connected;
            self.apply_cell(ctx, update.input_index, update.output_index)?;
        }
        Ok(())
    }

    /// Toggles solo on an input channel and re-patches.
    ///
    /// Solo is exclusive: while any channel is soloed, non-soloed channels
    /// stop contributing; their desired routing is preserved and restored
    /// when solo clears.
    pub fn toggle_solo(&mut self, ctx: &mut PatchContext, channel: u32) -> Result<(), RouterError> {
        self.ensure_live()?;
        self.check_channel(channel, "input", self.inputs)?;
        self.solo[channel as usize] = !self.solo[channel as usize];
        debug!(channel, soloed = self.solo[channel as usize], "toggled solo");
        self.reapply(ctx)
    }

    /// Toggles mute on an input channel and re-patches.
    ///
    /// Mute dominates solo: a channel that is both muted and soloed stays
    /// silent.
    pub fn toggle_mute(&mut self, ctx: &mut PatchContext, channel: u32) -> Result<(), RouterError> {
        self.ensure_live()?;
        self.check_channel(channel, "input", self.inputs)?;
        self.mute[channel as usize] = !self.mute[channel as usize];
        debug!(channel, muted = self.mute[channel as usize], "toggled mute");
        self.reapply(ctx)
    }

    /// Resets the matrix (and solo/mute state) to a default.
    ///
    /// With an explicit `default`, that list is applied to a cleared
    /// matrix. Otherwise the built-in default applies: for stereo output,
    /// the standard L/R/C/LFE/Ls/Rs layout mapping (center and LFE feed
    /// both sides, surrounds their matching side, channels beyond six
    /// alternate); for other output counts, identity up to the smaller
    /// channel count.
    pub fn reset_all_nodes(
        &mut self,
        ctx: &mut PatchContext,
        default: Option<&[RoutingConnection]>,
    ) -> Result<(), RouterError> {
        self.ensure_live()?;
        self.matrix.fill(false);
        self.solo.fill(false);
        self.mute.fill(false);
        match default {
            Some(connections) => {
                // Cells the explicit default doesn't mention stay cleared,
                // so re-patch the whole grid first.
                self.reapply(ctx)?;
                self.route_nodes(ctx, connections)
            }
            None => {
                let connections = default_matrix(self.inputs, self.outputs);
                self.reapply(ctx)?;
                self.route_nodes(ctx, &connections)
            }
        }
    }

    /// Snapshot of the full desired matrix, row by row.
    pub fn connections(&self) -> Vec<RoutingConnection> {
        let mut grid = Vec::with_capacity(self.matrix.len());
        for input in 0..self.inputs {
            for output in 0..self.outputs {
                grid.push(RoutingConnection::new(
                    input,
                    output,
                    self.matrix[(input * self.outputs + output) as usize],
                ));
            }
        }
        grid
    }

    /// Whether a cell is routed in the desired matrix (ignores solo/mute).
    pub fn is_routed(&self, input: u32, output: u32) -> bool {
        input < self.inputs
            && output < self.outputs
            && self.matrix[(input * self.outputs + output) as usize]
    }

    /// Whether an input channel is soloed.
    pub fn is_soloed(&self, channel: u32) -> bool {
        self.solo.get(channel as usize).copied().unwrap_or(false)
    }

    /// Whether an input channel is muted.
    pub fn is_muted(&self, channel: u32) -> bool {
        self.mute.get(channel as usize).copied().unwrap_or(false)
    }

    /// Whether an input channel currently contributes to the output.
    pub fn is_audible(&self, channel: u32) -> bool {
        let idx = channel as usize;
        if idx >= self.inputs as usize || self.mute[idx] {
            return false;
        }
        let any_solo = self.solo.iter().any(|&s| s);
        !any_solo || self.solo[idx]
    }

    /// Releases the splitter/merger pair. Idempotent.
    pub fn destroy(&mut self, ctx: &mut PatchContext) -> Result<(), RouterError> {
        if self.destroyed {
            return Ok(());
        }
        ctx.release(self.splitter)?;
        ctx.release(self.merger)?;
        self.destroyed = true;
        Ok(())
    }

    // --- Internal helpers ---

    /// Re-patches every cell as `desired ∧ audible`.
    fn reapply(&self, ctx: &mut PatchContext) -> Result<(), RouterError> {
        for input in 0..self.inputs {
            for output in 0..self.outputs {
                self.apply_cell(ctx, input, output)?;
            }
        }
        Ok(())
    }

    fn apply_cell(&self, ctx: &mut PatchContext, input: u32, output: u32) -> Result<(), RouterError> {
        let desired =
            self.matrix[(input * self.outputs + output) as usize] && self.is_audible(input);
        if desired {
            ctx.connect(self.splitter, input, self.merger, output)?;
        } else {
            ctx.disconnect(self.splitter, input, self.merger, output)?;
        }
        Ok(())
    }

    fn check_channel(&self, index: u32, direction: &'static str, count: u32) -> Result<(), RouterError> {
        if index >= count {
            return Err(RouterError::ChannelOutOfRange {
                direction,
                index,
                count,
            });
        }
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), RouterError> {
        if self.destroyed {
            return Err(RouterError::RouterDestroyed);
        }
        Ok(())
    }
}

/// Built-in default matrix for the given channel counts.
///
/// For stereo outputs this follows the standard 5.1 channel layout
/// (L, R, C, LFE, Ls, Rs): center and LFE feed both sides, surrounds go to
/// their matching side, and channels beyond six alternate left/right. For
/// any other output count the default is identity up to the smaller
/// channel count.
pub fn default_matrix(inputs: u32, outputs: u32) -> Vec<RoutingConnection> {
    let mut connections = Vec::new();
    if outputs == 2 {
        for input in 0..inputs {
            match input {
                0 | 4 => connections.push(RoutingConnection::new(input, 0, true)),
                1 | 5 => connections.push(RoutingConnection::new(input, 1, true)),
                2 | 3 => {
                    connections.push(RoutingConnection::new(input, 0, true));
                    connections.push(RoutingConnection::new(input, 1, true));
                }
                _ => connections.push(RoutingConnection::new(input, input % 2, true)),
            }
        }
    } else {
        for input in 0..inputs.min(outputs) {
            connections.push(RoutingConnection::new(input, input, true));
        }
    }
    connections
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(inputs: u32, outputs: u32) -> (PatchContext, ChannelRouter) {
        let mut ctx = PatchContext::new(48000.0);
        let router = ChannelRouter::new(&mut ctx, inputs, outputs).unwrap();
        (ctx, router)
    }

    fn live(ctx: &PatchContext, r: &ChannelRouter, input: u32, output: u32) -> bool {
        ctx.is_connected(r.splitter(), input, r.merger(), output)
    }

    #[test]
    fn test_default_matrix_stereo_follows_51_layout() {
        let cells = default_matrix(6, 2);
        let routed: Vec<(u32, u32)> = cells.iter().map(|c| (c.input_index, c.output_index)).collect();
        assert_eq!(
            routed,
            vec![(0, 0), (1, 1), (2, 0), (2, 1), (3, 0), (3, 1), (4, 0), (5, 1)]
        );
    }

    #[test]
    fn test_default_matrix_identity_for_non_stereo() {
        let cells = default_matrix(4, 4);
        let routed: Vec<(u32, u32)> = cells.iter().map(|c| (c.input_index, c.output_index)).collect();
        assert_eq!(routed, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);

        // Extra inputs stay unrouted when there is no matching output.
        assert_eq!(default_matrix(6, 4).len(), 4);
    }

    #[test]
    fn test_new_applies_default_live() {
        let (ctx, r) = router(6, 2);
        assert!(live(&ctx, &r, 0, 0));
        assert!(live(&ctx, &r, 2, 0));
        assert!(live(&ctx, &r, 2, 1));
        assert!(!live(&ctx, &r, 0, 1));
    }

    #[test]
    fn test_route_nodes_updates_only_listed_cells() {
        let (mut ctx, mut r) = router(2, 2);
        r.route_nodes(&mut ctx, &[RoutingConnection::new(0, 1, true)])
            .unwrap();
        // Listed cell changed; identity default untouched.
        assert!(r.is_routed(0, 1));
        assert!(r.is_routed(0, 0));
        assert!(r.is_routed(1, 1));
        assert!(live(&ctx, &r, 0, 1));
    }

    #[test]
    fn test_route_nodes_idempotent() {
        let (mut ctx, mut r) = router(4, 2);
        let update = [RoutingConnection::new(2, 1, true)];

        r.route_nodes(&mut ctx, &update).unwrap();
        let once = (r.connections(), ctx.connection_count());
        r.route_nodes(&mut ctx, &update).unwrap();
        assert_eq!((r.connections(), ctx.connection_count()), once);
    }

    #[test]
    fn test_route_nodes_out_of_range() {
        let (mut ctx, mut r) = router(2, 2);
        let err = r
            .route_nodes(&mut ctx, &[RoutingConnection::new(2, 0, true)])
            .unwrap_err();
        assert!(matches!(
            err,
            RouterError::ChannelOutOfRange {
                direction: "input",
                index: 2,
                count: 2,
            }
        ));
    }

    #[test]
    fn test_solo_is_exclusive() {
        let (mut ctx, mut r) = router(2, 2);
        r.toggle_solo(&mut ctx, 0).unwrap();

        assert!(r.is_audible(0));
        assert!(!r.is_audible(1));
        assert!(live(&ctx, &r, 0, 0));
        assert!(!live(&ctx, &r, 1, 1));
        // Desired matrix is untouched underneath.
        assert!(r.is_routed(1, 1));

        // Clearing solo restores the non-soloed channel.
        r.toggle_solo(&mut ctx, 0).unwrap();
        assert!(live(&ctx, &r, 1, 1));
    }

    #[test]
    fn test_mute_dominates_solo() {
        let (mut ctx, mut r) = router(2, 2);
        r.toggle_solo(&mut ctx, 0).unwrap();
        r.toggle_mute(&mut ctx, 0).unwrap();

        assert!(r.is_soloed(0));
        assert!(r.is_muted(0));
        assert!(!r.is_audible(0));
        assert!(!live(&ctx, &r, 0, 0));

        // Unmuting brings the soloed channel back.
        r.toggle_mute(&mut ctx, 0).unwrap();
        assert!(live(&ctx, &r, 0, 0));
    }

    #[test]
    fn test_reset_clears_solo_mute_and_restores_default() {
        let (mut ctx, mut r) = router(2, 2);
        r.toggle_mute(&mut ctx, 0).unwrap();
        r.route_nodes(&mut ctx, &[RoutingConnection::new(0, 1, true)])
            .unwrap();

        r.reset_all_nodes(&mut ctx, None).unwrap();
        assert!(!r.is_muted(0));
        assert!(r.is_routed(0, 0));
        assert!(!r.is_routed(0, 1));
        assert!(live(&ctx, &r, 0, 0));
    }

    #[test]
    fn test_reset_with_explicit_default() {
        let (mut ctx, mut r) = router(2, 2);
        r.reset_all_nodes(
            &mut ctx,
            Some(&[
                RoutingConnection::new(0, 1, true),
                RoutingConnection::new(1, 0, true),
            ]),
        )
        .unwrap();

        assert!(r.is_routed(0, 1));
        assert!(r.is_routed(1, 0));
        assert!(!r.is_routed(0, 0));
        assert!(!live(&ctx, &r, 0, 0));
        assert!(live(&ctx, &r, 0, 1));
    }

    #[test]
    fn test_destroy_releases_pair() {
        let (mut ctx, mut r) = router(2, 2);
        r.destroy(&mut ctx).unwrap();
        r.destroy(&mut ctx).unwrap();
        assert_eq!(ctx.node_count(), 0);
        assert_eq!(ctx.connection_count(), 0);

        let err = r.toggle_solo(&mut ctx, 0).unwrap_err();
        assert!(matches!(err, RouterError::RouterDestroyed));
    }

    #[test]
    fn test_connection_serde_shape() {
        let c = RoutingConnection::new(2, 1, true);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"inputIndex":2,"outputIndex":1,"connected":true}"#);
        let back: RoutingConnection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
