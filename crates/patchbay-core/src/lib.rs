//! Patchbay Core - live patch context and node primitives
//!
//! This crate provides the foundation the effects graph and channel router
//! are built on: a live audio patch context, the primitive node kinds it can
//! allocate, and the parameter model shared by every layer above.
//!
//! # Core Abstractions
//!
//! ## Patch Context
//!
//! - [`PatchContext`] - owns every live primitive node and every live
//!   connection; all mutation goes through it
//! - [`NodeHandle`] - stable identifier for one live primitive
//! - [`NodeOptions`] - typed construction options passed to a primitive
//!
//! ## Parameters
//!
//! - [`NodeParam`] - a named control parameter on a node
//! - [`ParamValue`] - constant value or time-keyed automation curve
//! - [`AutomationPoint`] - one `{time, value}` pair of a curve
//!
//! ## Utilities
//!
//! - [`crossfade_gain`] - left/right gain pair for a blend position
//! - [`ScalarValue`] - closed string/number/bool variant used by options
//!   and attribute maps
//!
//! # Design Principles
//!
//! - **Explicit dependency injection**: the context is passed `&mut` into
//!   every operation that mutates live state; there are no globals.
//! - **Synchronous, non-blocking**: every operation completes before it
//!   returns; destroying nodes is the only cancellation primitive.
//! - **Typed errors**: structural misuse surfaces as [`PatchError`], never
//!   as a silent partial state.

pub mod context;
pub mod fade;
pub mod param;
pub mod scalar;

pub use context::{NodeHandle, NodeOptions, PatchContext, PatchError};
pub use fade::{CrossfadeCurve, StereoGain, crossfade_gain};
pub use param::{AutomationPoint, NodeParam, ParamValue};
pub use scalar::ScalarValue;
