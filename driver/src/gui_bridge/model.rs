use aperturecore::model::LossMarker;
use aperturecore::{RenderStyle, SweepResult};
use serde::{Deserialize, Serialize};

/// Payload handed to whatever draws the envelope.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub source: Option<String>,
    pub style: RenderStyle,
    pub sweep: SweepResult,
    pub losses: Vec<LossMarker>,
}

impl VisualizationModel {
    pub fn new(source: Option<String>, style: RenderStyle, sweep: SweepResult) -> Self {
        Self {
            source,
            style,
            sweep,
            losses: Vec::new(),
        }
    }

    pub fn with_losses(mut self, losses: Vec<LossMarker>) -> Self {
        self.losses = losses;
        self
    }
}
