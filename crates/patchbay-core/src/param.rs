//! Node parameter model.
//!
//! A [`NodeParam`] represents one controllable value on a node — gain,
//! delay time, filter frequency — decoupled from how it is rendered to the
//! underlying primitive. Each param carries one or more value props, each
//! either a constant scalar or a time-keyed automation curve.
//!
//! The param's `name` is its identity: `"gain"` on a param matches the live
//! gain control of a gain primitive, `"delayTime"` matches a delay
//! primitive's time control, and so on. Names are unique within a node's
//! param set; the owning wrapper enforces that.

use serde::{Deserialize, Serialize};

/// One `{time, value}` pair of an automation curve.
///
/// `time` is in the unit of the underlying primitive (seconds for
/// time-based params).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutomationPoint {
    /// Time key of the point.
    pub time: f64,
    /// Value at that time.
    pub value: f64,
}

/// One value prop of a [`NodeParam`]: a constant or an automation curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// A constant scalar value.
    #[serde(rename = "value")]
    Constant(f64),
    /// A time-keyed automation curve.
    #[serde(rename = "curve")]
    Curve(Vec<AutomationPoint>),
}

/// A named control parameter on a node.
///
/// # Example
///
/// ```rust
/// use patchbay_core::NodeParam;
///
/// let mut gain = NodeParam::new_constant("gain", 0.5);
/// assert_eq!(gain.constant(), Some(0.5));
///
/// gain.set_value(0.25);
/// assert_eq!(gain.constant(), Some(0.25));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeParam {
    /// Identity of the param within its owning node (e.g. `"gain"`).
    pub name: String,
    /// One or more value props.
    pub values: Vec<ParamValue>,
}

impl NodeParam {
    /// Creates a param with a single constant value prop.
    pub fn new_constant(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            values: vec![ParamValue::Constant(value)],
        }
    }

    /// Creates a param with a single automation-curve value prop.
    pub fn curve(name: impl Into<String>, points: Vec<AutomationPoint>) -> Self {
        Self {
            name: name.into(),
            values: vec![ParamValue::Curve(points)],
        }
    }

    /// Replaces the current constant value.
    ///
    /// If the param holds a constant prop, the last one is overwritten;
    /// otherwise a constant prop is appended. Always succeeds — the change
    /// is visible the next time the value is read or applied to the live
    /// primitive.
    pub fn set_value(&mut self, value: f64) {
        for prop in self.values.iter_mut().rev() {
            if let ParamValue::Constant(v) = prop {
                *v = value;
                return;
            }
        }
        self.values.push(ParamValue::Constant(value));
    }

    /// Returns the effective constant value of this param.
    ///
    /// The last constant prop wins; when only curves are present, the first
    /// point of the first curve is used. `None` when the param has no value
    /// props at all.
    pub fn constant(&self) -> Option<f64> {
        for prop in self.values.iter().rev() {
            if let ParamValue::Constant(v) = prop {
                return Some(*v);
            }
        }
        for prop in &self.values {
            if let ParamValue::Curve(points) = prop
                && let Some(first) = points.first()
            {
                return Some(first.value);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_param() {
        let p = NodeParam::new_constant("gain", 1.0);
        assert_eq!(p.name, "gain");
        assert_eq!(p.constant(), Some(1.0));
    }

    #[test]
    fn test_set_value_overwrites_constant() {
        let mut p = NodeParam::new_constant("delayTime", 1.0);
        p.set_value(0.25);
        assert_eq!(p.constant(), Some(0.25));
        assert_eq!(p.values.len(), 1);
    }

    #[test]
    fn test_set_value_appends_when_only_curves() {
        let mut p = NodeParam::curve(
            "gain",
            vec![AutomationPoint {
                time: 0.0,
                value: 0.5,
            }],
        );
        assert_eq!(p.constant(), Some(0.5));

        p.set_value(0.8);
        assert_eq!(p.values.len(), 2);
        assert_eq!(p.constant(), Some(0.8));
    }

    #[test]
    fn test_empty_param_has_no_constant() {
        let p = NodeParam {
            name: "gain".into(),
            values: Vec::new(),
        };
        assert_eq!(p.constant(), None);
    }

    #[test]
    fn test_serde_shape() {
        let p = NodeParam {
            name: "gain".into(),
            values: vec![
                ParamValue::Constant(0.5),
                ParamValue::Curve(vec![AutomationPoint {
                    time: 1.0,
                    value: 0.0,
                }]),
            ],
        };
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(
            json,
            r#"{"name":"gain","values":[{"value":0.5},{"curve":[{"time":1.0,"value":0.0}]}]}"#
        );
        let back: NodeParam = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
