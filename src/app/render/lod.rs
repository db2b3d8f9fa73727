use crate::source::EntityType;
use crate::util::truncate_label;

use super::super::graph::SimNode;
use super::style::node_icon;

const MINIMAL_SCALE: f32 = 0.5;
const FULL_SCALE: f32 = 1.5;
const LABEL_DEGREE: u64 = 10;
const LABEL_CHARS: usize = 15;
const FULL_LABEL_CHARS: usize = 30;
const SIGNATURE_CHARS: usize = 48;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum DetailLevel {
    Minimal,
    Normal,
    Full,
}

impl DetailLevel {
    pub(in crate::app) fn for_scale(scale: f32) -> Self {
        if scale <= MINIMAL_SCALE {
            Self::Minimal
        } else if scale > FULL_SCALE {
            Self::Full
        } else {
            Self::Normal
        }
    }
}

/// What to draw around one node circle at a given scale.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(in crate::app) struct NodeDecoration {
    pub(in crate::app) label: Option<String>,
    pub(in crate::app) icon: Option<&'static str>,
    pub(in crate::app) signature: Option<String>,
}

/// `emphasized` is true for the selected or hovered node.
pub(in crate::app) fn node_decoration(node: &SimNode, scale: f32, emphasized: bool) -> NodeDecoration {
    let level = DetailLevel::for_scale(scale);
    let full = level == DetailLevel::Full;

    let wants_label = level != DetailLevel::Minimal || node.degree > LABEL_DEGREE || emphasized;
    let label = wants_label.then(|| {
        let limit = if full { FULL_LABEL_CHARS } else { LABEL_CHARS };
        truncate_label(&node.name, limit)
    });

    let icon = full.then(|| node_icon(node.kind));

    let signature = if full && node.kind == EntityType::Function {
        node.signature
            .as_deref()
            .filter(|signature| !signature.trim().is_empty())
            .map(|signature| truncate_label(signature.trim(), SIGNATURE_CHARS))
    } else {
        None
    };

    NodeDecoration {
        label,
        icon,
        signature,
    }
}

pub(in crate::app) fn shows_edge_labels(scale: f32) -> bool {
    DetailLevel::for_scale(scale) == DetailLevel::Full
}
