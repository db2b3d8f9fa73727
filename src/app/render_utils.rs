use eframe::egui::{Color32, Painter, Pos2, Rect, Vec2};

pub(in crate::app) const MIN_ZOOM: f32 = 0.1;
pub(in crate::app) const MAX_ZOOM: f32 = 10.0;

/// Maps world coordinates onto the graph canvas. `zoom` is the global scale
/// the level-of-detail rules read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct ViewTransform {
    pub(in crate::app) rect: Rect,
    pub(in crate::app) pan: Vec2,
    pub(in crate::app) zoom: f32,
}

impl ViewTransform {
    pub(in crate::app) fn world_to_screen(self, world: Vec2) -> Pos2 {
        self.rect.center() + self.pan + world * self.zoom
    }

    pub(in crate::app) fn screen_to_world(self, screen: Pos2) -> Vec2 {
        (screen - self.rect.center() - self.pan) / self.zoom
    }
}

fn mix_channel(from: u8, to: u8, t: f32) -> u8 {
    (f32::from(from) + (f32::from(to) - f32::from(from)) * t).round() as u8
}

/// Moves `base` toward `toward` by `amount` in 0..=1, alpha included.
pub(in crate::app) fn blend_color(base: Color32, toward: Color32, amount: f32) -> Color32 {
    let t = amount.clamp(0.0, 1.0);
    let [r, g, b, a] = base.to_srgba_unmultiplied();
    let [tr, tg, tb, ta] = toward.to_srgba_unmultiplied();
    Color32::from_rgba_unmultiplied(
        mix_channel(r, tr, t),
        mix_channel(g, tg, t),
        mix_channel(b, tb, t),
        mix_channel(a, ta, t),
    )
}

/// Darkens toward black. Opacity never drops below half.
pub(in crate::app) fn dim_color(color: Color32, brightness: f32) -> Color32 {
    let brightness = brightness.clamp(0.0, 1.0);
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let shade = |channel: u8| (f32::from(channel) * brightness) as u8;
    let alpha = f32::from(a) * (0.5 + brightness * 0.5);
    Color32::from_rgba_unmultiplied(shade(r), shade(g), shade(b), alpha as u8)
}

pub(in crate::app) fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

/// Canvas fill plus a dot lattice that moves with the camera.
pub(in crate::app) fn draw_background(painter: &Painter, view: ViewTransform) {
    let rect = view.rect;
    painter.rect_filled(rect, 0.0, Color32::from_rgb(16, 19, 25));

    let spacing = 48.0 * view.zoom.clamp(0.5, 2.0);
    if spacing < 16.0 {
        return;
    }
    let origin = view.world_to_screen(Vec2::ZERO);
    let first = |lo: f32, anchor: f32| lo + (anchor - lo).rem_euclid(spacing);
    let dot = Color32::from_rgba_unmultiplied(70, 80, 98, 90);

    let mut y = first(rect.top(), origin.y);
    while y <= rect.bottom() {
        let mut x = first(rect.left(), origin.x);
        while x <= rect.right() {
            painter.circle_filled(Pos2::new(x, y), 1.1, dot);
            x += spacing;
        }
        y += spacing;
    }
}

pub(in crate::app) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    rect.expand(radius).contains(position)
}

/// Whether any part of the segment falls inside `rect` grown by `padding`.
/// Clips the segment's parameter range against each slab of the rectangle.
pub(in crate::app) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let bounds = rect.expand(padding);
    let delta = end - start;
    let (mut enter, mut exit) = (0.0_f32, 1.0_f32);

    let slabs = [
        (delta.x, start.x, bounds.left(), bounds.right()),
        (delta.y, start.y, bounds.top(), bounds.bottom()),
    ];
    for (step, from, lo, hi) in slabs {
        if step.abs() <= f32::EPSILON {
            if from < lo || from > hi {
                return false;
            }
            continue;
        }
        let (t0, t1) = ((lo - from) / step, (hi - from) / step);
        enter = enter.max(t0.min(t1));
        exit = exit.min(t0.max(t1));
        if enter > exit {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    #[test]
    fn screen_and_world_round_trip_through_pan_and_zoom() {
        let view = ViewTransform {
            rect: Rect::from_min_size(pos2(10.0, 20.0), vec2(800.0, 600.0)),
            pan: vec2(-35.0, 12.0),
            zoom: 2.5,
        };
        let world = vec2(14.0, -7.0);
        let screen = view.world_to_screen(world);
        assert_eq!(screen, pos2(410.0 - 35.0 + 35.0, 320.0 + 12.0 - 17.5));
        let back = view.screen_to_world(screen);
        assert!((back - world).length() < 1e-4);
    }

    #[test]
    fn edges_crossing_the_viewport_are_visible() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0));
        assert!(edge_visible(rect, pos2(-50.0, 50.0), pos2(150.0, 50.0), 0.0));
        assert!(!edge_visible(rect, pos2(-50.0, -50.0), pos2(-10.0, 150.0), 0.0));
        assert!(!edge_visible(rect, pos2(-20.0, 10.0), pos2(10.0, -20.0), 0.0));
        assert!(edge_visible(rect, pos2(-20.0, 10.0), pos2(10.0, -20.0), 15.0));
        assert!(edge_visible(rect, pos2(50.0, -10.0), pos2(50.0, 110.0), 0.0));
        assert!(circle_visible(rect, pos2(-5.0, 50.0), 10.0));
        assert!(!circle_visible(rect, pos2(-15.0, 50.0), 10.0));
    }

    #[test]
    fn blending_and_dimming_stay_in_range() {
        let red = Color32::from_rgb(200, 0, 0);
        assert_eq!(blend_color(red, Color32::WHITE, 0.0), red);
        assert_eq!(blend_color(red, Color32::WHITE, 2.0), Color32::WHITE);
        assert_eq!(dim_color(red, 0.0).a(), 127);
        assert_eq!(dim_color(red, 1.0), red);
    }
}
