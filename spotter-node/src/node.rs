//! The object spotter loop: collect frames, locate blobs at a fixed rate,
//! publish one stamped point per blob.

use crate::config::NodeConfig;
use crate::error::{NodeError, Result};
use crate::sink::CandidateSink;
use crate::slots::InputSlots;
use serde::Serialize;
use spotter_core::{Header, PointStamped};
use spotter_eye::{
    CameraInfo, ColorFrame, ColorObjectLocator, DebugImages, DepthFrame, LocateOutput, VisionError,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Streams feeding the spotter
pub struct NodeInputs {
    pub color: mpsc::Receiver<ColorFrame>,
    pub depth: mpsc::Receiver<DepthFrame>,
    pub camera_info: mpsc::Receiver<CameraInfo>,
}

/// Counters over the lifetime of one spotter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpotterStats {
    /// Timer ticks handled
    pub cycles: u64,
    /// Cycles that ran the locator to completion
    pub processed: u64,
    /// Cycles without a complete frame pair or calibration
    pub skipped: u64,
    pub failed: u64,
    pub published: u64,
}

pub struct ObjectSpotter {
    config: NodeConfig,
    locator: ColorObjectLocator,
    slots: Arc<InputSlots>,
    debug_tx: Option<mpsc::Sender<DebugImages>>,
    stats: SpotterStats,
}

impl ObjectSpotter {
    pub fn new(config: NodeConfig) -> Result<Self> {
        config.validate().map_err(NodeError::Config)?;
        let locator = ColorObjectLocator::new(config.locator.clone())?;

        Ok(Self {
            config,
            locator,
            slots: Arc::new(InputSlots::new()),
            debug_tx: None,
            stats: SpotterStats::default(),
        })
    }

    /// Forward debug imagery to `sender`. Only produced when the locator
    /// configuration has `debug` set.
    pub fn with_debug_sender(mut self, sender: mpsc::Sender<DebugImages>) -> Self {
        self.debug_tx = Some(sender);
        self
    }

    /// Shared input slots, for producers that push frames directly
    pub fn slots(&self) -> Arc<InputSlots> {
        Arc::clone(&self.slots)
    }

    pub fn locator(&self) -> &ColorObjectLocator {
        &self.locator
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn stats(&self) -> SpotterStats {
        self.stats
    }

    /// Run until `shutdown` turns true or its sender is dropped.
    ///
    /// Pending input is drained before a due tick is handled. Closed input
    /// channels are ignored; frames can still arrive through [`slots`](Self::slots).
    pub async fn run<S>(
        &mut self,
        mut inputs: NodeInputs,
        sink: &S,
        mut shutdown: watch::Receiver<bool>,
    ) -> SpotterStats
    where
        S: CandidateSink + ?Sized,
    {
        let mut ticker = interval(self.config.period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Object spotter running at {} Hz, publishing to {}",
            self.config.rate_hz, self.config.topics.object_candidates
        );

        if *shutdown.borrow() {
            return self.stats;
        }

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                Some(info) = inputs.camera_info.recv() => self.update_calibration(&info),
                Some(frame) = inputs.color.recv() => self.slots.put_color(frame),
                Some(frame) = inputs.depth.recv() => self.slots.put_depth(frame),
                _ = ticker.tick() => self.cycle(sink).await,
            }
        }

        info!(
            "Object spotter stopped after {} cycles ({} processed, {} skipped, {} failed, {} published)",
            self.stats.cycles,
            self.stats.processed,
            self.stats.skipped,
            self.stats.failed,
            self.stats.published
        );
        self.stats
    }

    fn update_calibration(&mut self, info: &CameraInfo) {
        if let Err(e) = self.locator.set_calibration(info) {
            warn!("Ignoring camera info: {}", e);
        }
    }

    async fn cycle<S>(&mut self, sink: &S)
    where
        S: CandidateSink + ?Sized,
    {
        self.stats.cycles += 1;

        let bundle = match self.slots.take_bundle() {
            Ok(Some(bundle)) => bundle,
            Ok(None) => {
                self.stats.skipped += 1;
                return;
            }
            Err(e) => {
                warn!("Discarding frame pair: {}", e);
                self.stats.failed += 1;
                return;
            }
        };

        let LocateOutput { detections, debug } = match self.locator.locate_with_debug(&bundle.color, &bundle.depth)
        {
            Ok(output) => output,
            Err(VisionError::NotCalibrated) => {
                debug!("Skipping cycle: no camera calibration yet");
                self.stats.skipped += 1;
                return;
            }
            Err(e) => {
                warn!("Locate failed: {}", e);
                self.stats.failed += 1;
                return;
            }
        };
        self.stats.processed += 1;

        if let (Some(tx), Some(images)) = (&self.debug_tx, debug) {
            if tx.try_send(images).is_err() {
                debug!("Debug image receiver busy or gone, dropping frame");
            }
        }

        for detection in detections {
            let header = Header::new(bundle.stamp(), self.config.topics.frame_id.clone());
            let candidate = PointStamped::new(header, detection.position);

            if self.config.verbose {
                info!(
                    "Candidate '{}' at pixel ({}, {}), depth {:.3} m -> ({:.3}, {:.3}, {:.3})",
                    detection.color,
                    detection.centroid.x,
                    detection.centroid.y,
                    detection.depth,
                    candidate.point.x,
                    candidate.point.y,
                    candidate.point.z
                );
            }

            match sink.publish(candidate).await {
                Ok(()) => self.stats.published += 1,
                Err(e) => warn!("Failed to publish candidate: {}", e),
            }
        }
    }
}
