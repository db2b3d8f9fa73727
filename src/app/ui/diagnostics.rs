use std::collections::VecDeque;

use eframe::egui::Context;
use tracing::debug;

use super::super::graph::FrameOutput;

const FPS_SAMPLE_WINDOW: usize = 180;
const LOG_INTERVAL_SECS: f64 = 1.0;

/// Counters surfaced in the header and logged at debug level once per
/// second. Skipped counts are nodes with non-finite positions.
#[derive(Default)]
pub(in crate::app) struct FrameDiagnostics {
    fps_current: f32,
    fps_samples: VecDeque<f32>,
    pub(in crate::app) rendered_nodes: usize,
    pub(in crate::app) skipped_render_nodes: usize,
    pub(in crate::app) rendered_edges: usize,
    pub(in crate::app) hit_painted: usize,
    pub(in crate::app) hit_skipped: usize,
    pub(in crate::app) overlap_pairs: usize,
    pub(in crate::app) non_finite_streak: u32,
    pub(in crate::app) reseeded_total: usize,
    pub(in crate::app) stale_responses: usize,
    pub(in crate::app) alpha: f32,
    last_log_secs: Option<f64>,
}

impl FrameDiagnostics {
    pub(in crate::app) fn update_fps_counter(&mut self, ctx: &Context) {
        let dt = ctx.input(|input| input.stable_dt);
        if dt <= f32::EPSILON {
            return;
        }

        self.fps_current = (1.0 / dt).clamp(0.0, 1000.0);
        self.fps_samples.push_back(self.fps_current);
        while self.fps_samples.len() > FPS_SAMPLE_WINDOW {
            self.fps_samples.pop_front();
        }
    }

    pub(in crate::app) fn record_frame(&mut self, frame: &FrameOutput, alpha: f32) {
        self.rendered_nodes = frame.render.painted_nodes;
        self.skipped_render_nodes = frame.render.skipped_nodes;
        self.rendered_edges = frame.render.painted_edges;
        self.hit_painted = frame.hit_painted;
        self.hit_skipped = frame.hit_skipped;
        self.alpha = alpha;
        if frame.tick.ticked {
            self.overlap_pairs = frame.tick.overlap_pairs;
            self.non_finite_streak = frame.tick.longest_non_finite_streak;
            self.reseeded_total += frame.tick.reseeded;
        }
    }

    pub(in crate::app) fn record_stale_response(&mut self) {
        self.stale_responses += 1;
    }

    pub(in crate::app) fn clear_graph_counters(&mut self) {
        self.rendered_nodes = 0;
        self.skipped_render_nodes = 0;
        self.rendered_edges = 0;
        self.hit_painted = 0;
        self.hit_skipped = 0;
        self.overlap_pairs = 0;
        self.non_finite_streak = 0;
        self.alpha = 0.0;
    }

    /// Emits the counters when at least a second has passed since the last
    /// emission. Returns whether it logged.
    pub(in crate::app) fn log_if_due(&mut self, now: f64) -> bool {
        if self
            .last_log_secs
            .is_some_and(|last| now - last < LOG_INTERVAL_SECS)
        {
            return false;
        }
        self.last_log_secs = Some(now);

        debug!(
            fps = self.fps_current,
            rendered_nodes = self.rendered_nodes,
            skipped_render_nodes = self.skipped_render_nodes,
            rendered_edges = self.rendered_edges,
            hit_painted = self.hit_painted,
            hit_skipped = self.hit_skipped,
            overlap_pairs = self.overlap_pairs,
            non_finite_streak = self.non_finite_streak,
            reseeded_total = self.reseeded_total,
            stale_responses = self.stale_responses,
            alpha = self.alpha,
            "frame diagnostics"
        );
        true
    }

    pub(in crate::app) fn fps_display_text(&self) -> Option<String> {
        if self.fps_current <= f32::EPSILON {
            return None;
        }

        let mut parts = vec![format!("FPS {:.0}", self.fps_current)];
        if !self.fps_samples.is_empty() {
            let avg = self.fps_samples.iter().sum::<f32>() / self.fps_samples.len() as f32;
            parts.push(format!("avg {avg:.1}"));
        }
        parts.push(format!("{:.1} ms", 1000.0 / self.fps_current));
        Some(parts.join(" | "))
    }

    pub(in crate::app) fn detail_lines(&self) -> Vec<String> {
        vec![
            format!(
                "rendered {} nodes / {} edges, skipped {}",
                self.rendered_nodes, self.rendered_edges, self.skipped_render_nodes
            ),
            format!(
                "hit surface {} painted, {} skipped",
                self.hit_painted, self.hit_skipped
            ),
            format!("overlapping pairs {}", self.overlap_pairs),
            format!(
                "non-finite streak {} ticks, {} re-seeded",
                self.non_finite_streak, self.reseeded_total
            ),
            format!("stale responses dropped {}", self.stale_responses),
            format!("alpha {:.3}", self.alpha),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::physics::TickReport;
    use crate::app::render::RenderCounts;

    fn frame(tick: TickReport) -> FrameOutput {
        FrameOutput {
            commands: Vec::new(),
            tick,
            render: RenderCounts {
                painted_nodes: 12,
                skipped_nodes: 1,
                painted_edges: 20,
            },
            hit_painted: 12,
            hit_skipped: 1,
            animating: true,
        }
    }

    #[test]
    fn logs_at_most_once_per_second() {
        let mut diagnostics = FrameDiagnostics::default();
        assert!(diagnostics.log_if_due(3.0));
        assert!(!diagnostics.log_if_due(3.5));
        assert!(!diagnostics.log_if_due(3.99));
        assert!(diagnostics.log_if_due(4.0));
    }

    #[test]
    fn tick_counters_only_update_on_ticked_frames() {
        let mut diagnostics = FrameDiagnostics::default();
        diagnostics.record_frame(
            &frame(TickReport {
                ticked: true,
                overlap_pairs: 3,
                reseeded: 1,
                longest_non_finite_streak: 30,
                ..TickReport::default()
            }),
            0.4,
        );
        diagnostics.record_frame(&frame(TickReport::default()), 0.4);

        assert_eq!(diagnostics.overlap_pairs, 3);
        assert_eq!(diagnostics.non_finite_streak, 30);
        assert_eq!(diagnostics.reseeded_total, 1);
        assert_eq!(diagnostics.skipped_render_nodes, 1);
        assert_eq!(diagnostics.hit_skipped, 1);

        diagnostics.record_stale_response();
        diagnostics.clear_graph_counters();
        assert_eq!(diagnostics.stale_responses, 1);
        assert_eq!(diagnostics.rendered_nodes, 0);
    }
}
