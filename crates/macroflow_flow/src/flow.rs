//! The ASIC flow graph.

use macroflow_common::{InternalError, MacroflowResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Step that writes the GDS layout.
pub const WRITE_GDS: &str = "write.gds";
/// Step that writes the LEF abstract and Liberty timing views.
pub const WRITE_VIEWS: &str = "write.views";

const ASICFLOW_STEPS: [&str; 9] = [
    "elaborate",
    "synthesis",
    "floorplan",
    "place",
    "cts",
    "route",
    "dfm",
    WRITE_GDS,
    WRITE_VIEWS,
];

/// One `(step, index)` of a flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowNode {
    pub step: String,
    pub index: u32,
}

impl FlowNode {
    /// Creates a node.
    pub fn new(step: impl Into<String>, index: u32) -> Self {
        Self {
            step: step.into(),
            index,
        }
    }
}

impl fmt::Display for FlowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.step, self.index)
    }
}

/// Nodes of the named flow, in execution order. `None` for an unknown flow.
pub fn flow_nodes(flow: &str) -> Option<Vec<FlowNode>> {
    match flow {
        "asicflow" => Some(
            ASICFLOW_STEPS
                .iter()
                .map(|step| FlowNode::new(*step, 0))
                .collect(),
        ),
        _ => None,
    }
}

/// Finds the node that runs `step` in a flow.
pub fn node_for_step<'a>(nodes: &'a [FlowNode], step: &str) -> MacroflowResult<&'a FlowNode> {
    nodes
        .iter()
        .find(|n| n.step == step)
        .ok_or_else(|| InternalError::new(format!("flow graph has no {step} node")))
}
