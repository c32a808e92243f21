// SPDX-License-Identifier: GPL-3.0-only

//! Pull-callback delivery of decoded units
//!
//! The application sink invokes a registered [`SampleHandler`] once per
//! decoded unit. The callback runs on the streaming thread and gates delivery
//! of the next unit, so handlers must return quickly.

use crate::constants::timing;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// One decoded unit delivered to the application sink
#[derive(Debug)]
pub struct DecodedUnit {
    sample: gstreamer::Sample,
}

impl DecodedUnit {
    pub fn new(sample: gstreamer::Sample) -> Self {
        Self { sample }
    }

    /// Payload size in bytes
    pub fn size(&self) -> usize {
        self.sample.buffer().map(|b| b.size()).unwrap_or(0)
    }

    /// Presentation timestamp, if the buffer carries one
    pub fn pts(&self) -> Option<gstreamer::ClockTime> {
        self.sample.buffer().and_then(|b| b.pts())
    }

    /// Frame dimensions when the negotiated caps describe raw video
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        let caps = self.sample.caps()?;
        let info = VideoInfo::from_caps(caps).ok()?;
        Some((info.width(), info.height()))
    }
}

/// Callback receiving each decoded unit
pub trait SampleHandler: Send + 'static {
    fn on_sample(&mut self, unit: &DecodedUnit);
}

impl<F> SampleHandler for F
where
    F: FnMut(&DecodedUnit) + Send + 'static,
{
    fn on_sample(&mut self, unit: &DecodedUnit) {
        self(unit)
    }
}

/// Default handler: writes one marker character per unit
#[derive(Debug, Clone, Copy)]
pub struct MarkerAck {
    marker: char,
}

impl Default for MarkerAck {
    fn default() -> Self {
        Self { marker: '*' }
    }
}

impl SampleHandler for MarkerAck {
    fn on_sample(&mut self, _unit: &DecodedUnit) {
        let mut stdout = std::io::stdout().lock();
        let mut buf = [0u8; 4];
        let _ = stdout.write_all(self.marker.encode_utf8(&mut buf).as_bytes());
        let _ = stdout.flush();
    }
}

/// Hand a pulled unit to `handle` and release it before returning
///
/// An absent unit (sink flushing or at EOS) is a no-op. Returns whether a
/// unit was delivered.
pub fn deliver<U, F>(pulled: Option<U>, handle: F) -> bool
where
    F: FnOnce(&U),
{
    match pulled {
        Some(unit) => {
            handle(&unit);
            drop(unit);
            true
        }
        None => false,
    }
}

/// Register `handler` as the sample callback of `appsink`
///
/// Returns a counter of delivered units.
pub fn register<H: SampleHandler>(appsink: &AppSink, handler: H) -> Arc<AtomicU64> {
    let delivered = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&delivered);
    // GStreamer requires Send + Sync callbacks; only the streaming thread locks this
    let handler = Mutex::new(handler);

    appsink.set_callbacks(
        gstreamer_app::AppSinkCallbacks::builder()
            .new_sample(move |appsink| {
                let pulled = appsink.pull_sample().ok().map(DecodedUnit::new);
                let was_delivered = deliver(pulled, |unit| {
                    match handler.lock() {
                        Ok(mut handler) => handler.on_sample(unit),
                        Err(_) => warn!("Sample handler poisoned, dropping unit"),
                    }

                    let count = counter.fetch_add(1, Ordering::Relaxed) + 1;
                    if count % timing::SAMPLE_LOG_INTERVAL == 0 {
                        debug!(
                            units = count,
                            dimensions = ?unit.dimensions(),
                            size = unit.size(),
                            pts = ?unit.pts(),
                            "Samples delivered"
                        );
                    }
                });

                if !was_delivered {
                    debug!("No sample available (flushing or EOS)");
                }

                Ok(gstreamer::FlowSuccess::Ok)
            })
            .build(),
    );

    delivered
}

/// Remove any callbacks so the sink no longer references the handler
pub fn unregister(appsink: &AppSink) {
    appsink.set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
}
