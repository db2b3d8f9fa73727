use eframe::egui::{Rect, Vec2};

use super::super::render_utils::{MAX_ZOOM, MIN_ZOOM};

pub(in crate::app) const ZOOM_STEP: f32 = 1.3;
pub(in crate::app) const ZOOM_TWEEN_SECS: f64 = 0.3;
pub(in crate::app) const FIT_TWEEN_SECS: f64 = 0.4;
pub(in crate::app) const FIT_PADDING: f32 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Tween {
    from_zoom: f32,
    from_pan: Vec2,
    to_zoom: f32,
    to_pan: Vec2,
    start: f64,
    duration: f64,
}

/// Pan and zoom of the graph canvas. Pan is the screen offset of the world
/// origin from the canvas center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Camera {
    zoom: f32,
    pan: Vec2,
    tween: Option<Tween>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            tween: None,
        }
    }
}

fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        1.0
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

impl Camera {
    pub(in crate::app) fn zoom(&self) -> f32 {
        self.zoom
    }

    pub(in crate::app) fn pan(&self) -> Vec2 {
        self.pan
    }

    pub(in crate::app) fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Moves an active tween to `now`.
    pub(in crate::app) fn advance(&mut self, now: f64) {
        let Some(tween) = self.tween else {
            return;
        };

        let t = if tween.duration <= 0.0 {
            1.0
        } else {
            ((now - tween.start) / tween.duration + 1e-9).clamp(0.0, 1.0) as f32
        };
        let eased = ease_out_cubic(t);
        self.zoom = tween.from_zoom + (tween.to_zoom - tween.from_zoom) * eased;
        self.pan = tween.from_pan + (tween.to_pan - tween.from_pan) * eased;

        if t >= 1.0 {
            self.zoom = tween.to_zoom;
            self.pan = tween.to_pan;
            self.tween = None;
        }
    }

    fn animate_to(&mut self, zoom: f32, pan: Vec2, now: f64, duration: f64) {
        self.advance(now);
        self.tween = Some(Tween {
            from_zoom: self.zoom,
            from_pan: self.pan,
            to_zoom: zoom,
            to_pan: pan,
            start: now,
            duration,
        });
    }

    /// Animated zoom about the canvas center.
    pub(in crate::app) fn zoom_by(&mut self, factor: f32, now: f64) {
        self.advance(now);
        let target = clamp_zoom(self.zoom * factor);
        let pan = self.pan * (target / self.zoom);
        self.animate_to(target, pan, now, ZOOM_TWEEN_SECS);
    }

    /// Immediate zoom keeping the world point under `anchor` fixed. `anchor`
    /// is relative to the canvas center.
    pub(in crate::app) fn zoom_at(&mut self, factor: f32, anchor: Vec2) {
        self.tween = None;
        let world = (anchor - self.pan) / self.zoom;
        self.zoom = clamp_zoom(self.zoom * factor);
        self.pan = anchor - world * self.zoom;
    }

    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        if let Some(tween) = &mut self.tween {
            tween.from_pan += delta;
            tween.to_pan += delta;
        }
        self.pan += delta;
    }

    /// Animates so `bounds` (world units) fits inside `viewport` with
    /// `FIT_PADDING` pixels on every side.
    pub(in crate::app) fn zoom_to_fit(&mut self, bounds: Rect, viewport: Vec2, now: f64) {
        if !bounds.is_finite() {
            return;
        }
        let available_x = (viewport.x - FIT_PADDING * 2.0).max(1.0);
        let available_y = (viewport.y - FIT_PADDING * 2.0).max(1.0);
        let zoom = clamp_zoom(
            (available_x / bounds.width().max(1.0)).min(available_y / bounds.height().max(1.0)),
        );
        let pan = -bounds.center().to_vec2() * zoom;
        self.animate_to(zoom, pan, now, FIT_TWEEN_SECS);
    }

    pub(in crate::app) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    #[test]
    fn keyboard_zoom_tweens_over_300ms() {
        let mut camera = Camera::default();
        camera.pan_by(vec2(40.0, -20.0));
        camera.zoom_by(ZOOM_STEP, 10.0);

        camera.advance(10.15);
        assert!(camera.zoom() > 1.0 && camera.zoom() < ZOOM_STEP);
        assert!(camera.is_animating());

        camera.advance(10.31);
        assert!(!camera.is_animating());
        assert!((camera.zoom() - ZOOM_STEP).abs() < 1e-5);
        assert!((camera.pan() - vec2(52.0, -26.0)).length() < 1e-3);
    }

    #[test]
    fn zoom_stays_within_bounds() {
        let mut camera = Camera::default();
        for _ in 0..40 {
            camera.zoom_at(1.5, vec2(10.0, 10.0));
        }
        assert_eq!(camera.zoom(), MAX_ZOOM);
        for step in 0..40 {
            camera.zoom_by(1.0 / ZOOM_STEP, step as f64);
        }
        camera.advance(100.0);
        assert_eq!(camera.zoom(), MIN_ZOOM);
    }

    #[test]
    fn wheel_zoom_keeps_anchor_fixed() {
        let mut camera = Camera::default();
        camera.pan_by(vec2(30.0, 5.0));
        let anchor = vec2(-120.0, 80.0);
        let world_before = (anchor - camera.pan()) / camera.zoom();
        camera.zoom_at(2.0, anchor);
        let world_after = (anchor - camera.pan()) / camera.zoom();
        assert!((world_before - world_after).length() < 1e-4);
    }

    #[test]
    fn new_request_restarts_from_current_value() {
        let mut camera = Camera::default();
        camera.zoom_by(ZOOM_STEP, 0.0);
        camera.advance(0.1);
        let midway = camera.zoom();

        camera.zoom_by(ZOOM_STEP, 0.1);
        camera.advance(0.1);
        assert!((camera.zoom() - midway).abs() < 1e-6);
        camera.advance(0.45);
        assert!((camera.zoom() - midway * ZOOM_STEP).abs() < 1e-4);
    }

    #[test]
    fn fit_brings_bounds_inside_padded_viewport_within_400ms() {
        let mut camera = Camera::default();
        camera.zoom_at(5.0, Vec2::ZERO);
        camera.advance(1.0);

        let bounds = Rect::from_min_max(pos2(-300.0, -120.0), pos2(500.0, 260.0));
        let viewport = vec2(1000.0, 700.0);
        camera.zoom_to_fit(bounds, viewport, 2.0);
        camera.advance(2.0 + FIT_TWEEN_SECS);
        assert!(!camera.is_animating());

        let to_screen = |point: Vec2| point * camera.zoom() + camera.pan();
        let min = to_screen(bounds.min.to_vec2());
        let max = to_screen(bounds.max.to_vec2());
        let half = viewport * 0.5;
        assert!(min.x >= -half.x + FIT_PADDING - 0.01);
        assert!(min.y >= -half.y + FIT_PADDING - 0.01);
        assert!(max.x <= half.x - FIT_PADDING + 0.01);
        assert!(max.y <= half.y - FIT_PADDING + 0.01);
    }
}
