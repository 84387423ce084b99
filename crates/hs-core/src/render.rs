//! Hand-off to an external scatter plot renderer.
//!
//! The builder shows the observed (No WGA, WGA) pairs so the user can place
//! emission parameters. Drawing is someone else's job; this module only
//! defines the point type and the call contract.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::logging::event_names;

/// One observation, coloured by whatever grouping the caller chose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub nwga: f64,
    pub wga: f64,
    pub color: String,
}

/// Anything that can draw a scatter plot.
pub trait ScatterRenderer {
    fn draw(&mut self, points: &[PlotPoint]);
}

/// Draw `points` if a dataset is loaded. Returns whether anything was drawn.
///
/// With no dataset the call is a logged no-op. Non-finite points are dropped
/// before drawing.
pub fn render_scatter<R: ScatterRenderer + ?Sized>(
    renderer: &mut R,
    points: Option<&[PlotPoint]>,
) -> bool {
    let Some(points) = points else {
        info!(event = event_names::RENDER_SKIPPED, "no dataset loaded, scatter plot skipped");
        return false;
    };

    let finite = |p: &PlotPoint| p.nwga.is_finite() && p.wga.is_finite();
    if points.iter().all(finite) {
        renderer.draw(points);
    } else {
        let kept: Vec<PlotPoint> = points.iter().filter(|p| finite(*p)).cloned().collect();
        debug!(dropped = points.len() - kept.len(), "dropping non-finite plot points");
        renderer.draw(&kept);
    }
    true
}
