use eframe::egui::{Color32, Pos2, Vec2, vec2};

use crate::source::{EntityType, RelationType};

pub(in crate::app) fn node_color(kind: EntityType) -> Color32 {
    match kind {
        EntityType::Function => Color32::from_rgb(0x4e, 0x9a, 0xf1),
        EntityType::Class => Color32::from_rgb(0xf1, 0xa9, 0x4e),
        EntityType::Document => Color32::from_rgb(0x5e, 0xcf, 0x8a),
        EntityType::File => Color32::from_rgb(0xb5, 0x8c, 0xf0),
        EntityType::Directory => Color32::from_rgb(0x9a, 0xa5, 0xb1),
    }
}

pub(in crate::app) fn node_icon(kind: EntityType) -> &'static str {
    match kind {
        EntityType::Function => "ƒ",
        EntityType::Class => "C",
        EntityType::Document => "¶",
        EntityType::File => "F",
        EntityType::Directory => "▸",
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum LinePattern {
    Solid,
    Dashed,
    Dotted,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct EdgeStyle {
    pub(in crate::app) pattern: LinePattern,
    pub(in crate::app) color: Color32,
    pub(in crate::app) width: f32,
    pub(in crate::app) arrow: bool,
}

pub(in crate::app) fn edge_style(relation: RelationType) -> EdgeStyle {
    let blue = Color32::from_rgb(96, 156, 232);
    let green = Color32::from_rgb(102, 196, 136);
    let orange = Color32::from_rgb(232, 160, 84);
    let grey = Color32::from_rgb(120, 128, 140);
    let purple = Color32::from_rgb(170, 132, 230);

    let (pattern, color, width, arrow) = match relation {
        RelationType::Calls => (LinePattern::Solid, blue, 1.2, true),
        RelationType::Documents => (LinePattern::Dashed, green, 1.2, true),
        RelationType::Extends => (LinePattern::Solid, orange, 2.2, true),
        RelationType::Implements => (LinePattern::Dashed, orange, 1.4, true),
        RelationType::Contains => (LinePattern::Dotted, grey, 1.0, false),
        RelationType::Defines => (LinePattern::Dotted, purple, 1.0, true),
    };
    EdgeStyle {
        pattern,
        color,
        width,
        arrow,
    }
}

/// Arrowhead pointing along `start -> end` whose tip sits on the target's
/// boundary. Returns `[tip, left, right]`, or `None` when the endpoints are
/// too close for a visible head.
pub(in crate::app) fn arrow_head(
    start: Pos2,
    end: Pos2,
    target_radius: f32,
    head_length: f32,
) -> Option<[Pos2; 3]> {
    let delta = end - start;
    let length = delta.length();
    if !length.is_finite() || length <= target_radius + f32::EPSILON {
        return None;
    }

    let direction = delta / length;
    let tip = end - direction * target_radius;
    let back = tip - direction * head_length;
    let normal: Vec2 = vec2(-direction.y, direction.x) * (head_length * 0.5);
    Some([tip, back + normal, back - normal])
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn arrow_tip_touches_target_boundary() {
        let [tip, left, right] = arrow_head(pos2(0.0, 0.0), pos2(100.0, 0.0), 20.0, 8.0).unwrap();
        assert_eq!(tip, pos2(80.0, 0.0));
        assert_eq!(left.x, 72.0);
        assert_eq!(right.x, 72.0);
        assert!((left.y + right.y).abs() < 1e-5);

        let diagonal = arrow_head(pos2(0.0, 0.0), pos2(30.0, 40.0), 10.0, 6.0).unwrap();
        assert!((diagonal[0] - pos2(24.0, 32.0)).length() < 1e-4);
    }

    #[test]
    fn arrow_is_dropped_when_source_sits_inside_target() {
        assert!(arrow_head(pos2(0.0, 0.0), pos2(5.0, 0.0), 10.0, 8.0).is_none());
    }

    #[test]
    fn containment_edges_have_no_arrow() {
        assert!(!edge_style(RelationType::Contains).arrow);
        assert_eq!(edge_style(RelationType::Documents).pattern, LinePattern::Dashed);
        assert!(edge_style(RelationType::Extends).width > edge_style(RelationType::Calls).width);
    }
}
