// SPDX-License-Identifier: GPL-3.0-only

//! Bus message handling
//!
//! GStreamer bus messages are reduced to [`BusEvent`]s. In loop mode every
//! event is handed to a [`MessageHandler`], whose return value alone decides
//! whether the loop keeps running.

use crate::errors::PipelineError;
use futures::{Stream, StreamExt};
use gstreamer::prelude::*;
use tracing::{debug, error, info};

/// A bus message as seen by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// No further data will arrive
    EndOfStream,
    /// A stage reported a fatal error
    Error {
        /// Path of the element that posted the error
        source: Option<String>,
        /// Human-readable summary
        message: String,
        /// Diagnostic detail, if the element provided any
        debug: Option<String>,
    },
    /// Any other message kind (state changes, stream status, tags, ...)
    Other(gstreamer::MessageType),
}

impl BusEvent {
    pub fn from_message(msg: &gstreamer::Message) -> Self {
        match msg.view() {
            gstreamer::MessageView::Eos(..) => BusEvent::EndOfStream,
            gstreamer::MessageView::Error(err) => BusEvent::Error {
                source: err.src().map(|s| s.path_string().to_string()),
                message: err.error().to_string(),
                debug: err.debug().map(|d| d.to_string()),
            },
            _ => BusEvent::Other(msg.type_()),
        }
    }

    /// True for end-of-stream and error
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BusEvent::Other(_))
    }
}

/// Handler decision after each message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Break,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// End-of-stream reached (or the handler stopped the loop on a non-error message)
    Stopped,
    /// An error was posted on the bus
    Failed(PipelineError),
}

impl RunOutcome {
    /// Outcome implied by the message that ended the run
    pub fn from_event(event: Option<BusEvent>) -> Self {
        match event {
            Some(BusEvent::Error {
                source,
                message,
                debug,
            }) => RunOutcome::Failed(PipelineError::Runtime {
                source,
                message,
                debug,
            }),
            Some(_) | None => RunOutcome::Stopped,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed(_))
    }
}

/// Callback invoked for every bus message in loop mode
pub trait MessageHandler {
    fn handle(&mut self, event: &BusEvent) -> LoopControl;
}

impl<F> MessageHandler for F
where
    F: FnMut(&BusEvent) -> LoopControl,
{
    fn handle(&mut self, event: &BusEvent) -> LoopControl {
        self(event)
    }
}

/// Default handler: reports terminal messages and stops on them
#[derive(Debug, Default)]
pub struct ReportingHandler;

impl MessageHandler for ReportingHandler {
    fn handle(&mut self, event: &BusEvent) -> LoopControl {
        match event {
            BusEvent::EndOfStream => {
                info!("End of stream");
                println!("End of stream");
                LoopControl::Break
            }
            BusEvent::Error {
                source,
                message,
                debug: debug_info,
            } => {
                error!(?source, error = %message, debug = ?debug_info, "Pipeline error");
                eprintln!("Error: {}", message);
                LoopControl::Break
            }
            BusEvent::Other(kind) => {
                debug!(?kind, "Ignoring bus message");
                LoopControl::Continue
            }
        }
    }
}

/// Dispatch events to `handler` one at a time until it asks to stop
///
/// Returns the event that stopped the loop, or `None` if the stream ended
/// first. Nothing is pulled from `events` after the handler returns `Break`.
pub async fn drive<S, H>(events: &mut S, handler: &mut H) -> Option<BusEvent>
where
    S: Stream<Item = BusEvent> + Unpin,
    H: MessageHandler + ?Sized,
{
    while let Some(event) = events.next().await {
        if handler.handle(&event) == LoopControl::Break {
            return Some(event);
        }
    }
    None
}

/// Report the single terminal message returned by a blocking wait
pub(crate) fn report_terminal(event: &BusEvent) {
    match event {
        BusEvent::Error {
            source,
            message,
            debug: debug_info,
        } => {
            error!(?source, error = %message, debug = ?debug_info, "Pipeline error");
            eprintln!(
                "Error received from element {}: {}",
                source.as_deref().unwrap_or("unknown"),
                message
            );
            eprintln!(
                "Debugging information: {}",
                debug_info.as_deref().unwrap_or("none")
            );
        }
        BusEvent::EndOfStream => {
            info!("End-Of-Stream reached");
            println!("End-Of-Stream reached.");
        }
        BusEvent::Other(kind) => {
            // Only ERROR and EOS are requested from the bus
            error!(?kind, "Unexpected message received");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::stream;

    fn error_event() -> BusEvent {
        BusEvent::Error {
            source: Some("/GstPipeline:test-pipeline/GstV4l2Src:source".to_string()),
            message: "Device '/dev/video0' is busy".to_string(),
            debug: None,
        }
    }

    #[test]
    fn test_loop_stops_on_error_and_never_pulls_further() {
        let events = vec![
            BusEvent::Other(gstreamer::MessageType::StateChanged),
            BusEvent::Other(gstreamer::MessageType::StreamStatus),
            error_event(),
            BusEvent::EndOfStream,
        ];
        let mut seen = 0;
        let mut handler = |event: &BusEvent| {
            seen += 1;
            ReportingHandler.handle(event)
        };
        let mut events = stream::iter(events);

        let last = block_on(drive(&mut events, &mut handler));

        assert_eq!(last, Some(error_event()));
        assert_eq!(seen, 3);
        let remaining: Vec<BusEvent> = block_on(events.collect());
        assert_eq!(remaining, vec![BusEvent::EndOfStream]);
    }

    #[test]
    fn test_loop_stops_on_end_of_stream() {
        let mut events = stream::iter(vec![
            BusEvent::Other(gstreamer::MessageType::AsyncDone),
            BusEvent::EndOfStream,
        ]);
        let last = block_on(drive(&mut events, &mut ReportingHandler));
        assert_eq!(last, Some(BusEvent::EndOfStream));
        assert_eq!(RunOutcome::from_event(last), RunOutcome::Stopped);
    }

    #[test]
    fn test_exhausted_stream_returns_none() {
        let mut events = stream::iter(vec![BusEvent::Other(
            gstreamer::MessageType::NewClock,
        )]);
        assert_eq!(block_on(drive(&mut events, &mut ReportingHandler)), None);
    }

    #[test]
    fn test_error_event_becomes_failed_outcome() {
        let outcome = RunOutcome::from_event(Some(error_event()));
        assert!(outcome.is_failed());
        match outcome {
            RunOutcome::Failed(PipelineError::Runtime { message, .. }) => {
                assert!(message.contains("busy"))
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_only_eos_and_error_are_terminal() {
        assert!(BusEvent::EndOfStream.is_terminal());
        assert!(error_event().is_terminal());
        assert!(!BusEvent::Other(gstreamer::MessageType::Tag).is_terminal());
    }
}
