//! Latest-value slots for the two image streams

use parking_lot::Mutex;
use spotter_eye::error::Result;
use spotter_eye::{ColorFrame, DepthFrame, FrameBundle};

#[derive(Default)]
struct Slots {
    color: Option<ColorFrame>,
    depth: Option<DepthFrame>,
}

/// Holds the most recent color and depth frame until the next cycle.
///
/// Newer frames overwrite older ones. Every [`take_bundle`](Self::take_bundle)
/// empties both slots, so a cycle only ever sees frames that arrived since
/// the previous one.
#[derive(Default)]
pub struct InputSlots {
    inner: Mutex<Slots>,
}

impl InputSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_color(&self, frame: ColorFrame) {
        self.inner.lock().color = Some(frame);
    }

    pub fn put_depth(&self, frame: DepthFrame) {
        self.inner.lock().depth = Some(frame);
    }

    pub fn has_color(&self) -> bool {
        self.inner.lock().color.is_some()
    }

    pub fn has_depth(&self) -> bool {
        self.inner.lock().depth.is_some()
    }

    /// Pair the stored frames and clear both slots.
    ///
    /// `Ok(None)` when either frame is missing; an error when the pair does
    /// not share dimensions.
    pub fn take_bundle(&self) -> Result<Option<FrameBundle>> {
        let (color, depth) = {
            let mut slots = self.inner.lock();
            (slots.color.take(), slots.depth.take())
        };

        match (color, depth) {
            (Some(color), Some(depth)) => FrameBundle::new(color, depth).map(Some),
            _ => Ok(None),
        }
    }
}
