//! In-process sink backed by a crossbeam channel.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::core::types::{FilteredSphereParams, SphereParams};
use crate::engine::SphereSink;
use crate::error::{Error, Result};

/// Estimate delivered through a [`ChannelSink`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SphereEstimate {
    Filtered(FilteredSphereParams),
    Raw(SphereParams),
}

/// Forwards estimates to a bounded channel.
///
/// When the consumer falls behind the newest estimate is dropped rather than
/// blocking the fit thread.
pub struct ChannelSink {
    tx: Sender<SphereEstimate>,
}

impl ChannelSink {
    /// Create a sink and the receiving end of its channel.
    pub fn new(capacity: usize) -> (Self, Receiver<SphereEstimate>) {
        let (tx, rx) = bounded(capacity);
        (Self { tx }, rx)
    }

    fn send(&self, estimate: SphereEstimate) -> Result<()> {
        match self.tx.try_send(estimate) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(Error::Other("sink channel full".to_string())),
            Err(TrySendError::Disconnected(_)) => {
                Err(Error::Other("sink channel disconnected".to_string()))
            }
        }
    }
}

impl SphereSink for ChannelSink {
    fn publish(&mut self, params: &FilteredSphereParams) -> Result<()> {
        self.send(SphereEstimate::Filtered(*params))
    }

    fn publish_raw(&mut self, raw: &SphereParams) -> Result<()> {
        self.send(SphereEstimate::Raw(*raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivers_in_order() {
        let (mut sink, rx) = ChannelSink::new(4);
        sink.publish_raw(&SphereParams::new(1.0, 1.0, 1.0, 1.0)).unwrap();
        sink.publish(&FilteredSphereParams::new(2.0, 2.0, 2.0, 2.0))
            .unwrap();

        assert!(matches!(rx.try_recv().unwrap(), SphereEstimate::Raw(_)));
        assert_eq!(
            rx.try_recv().unwrap(),
            SphereEstimate::Filtered(FilteredSphereParams::new(2.0, 2.0, 2.0, 2.0))
        );
    }

    #[test]
    fn test_full_channel_does_not_block() {
        let (mut sink, _rx) = ChannelSink::new(1);
        sink.publish(&FilteredSphereParams::default()).unwrap();
        assert!(sink.publish(&FilteredSphereParams::default()).is_err());
    }

    #[test]
    fn test_disconnected_reported() {
        let (mut sink, rx) = ChannelSink::new(1);
        drop(rx);
        assert!(sink.publish(&FilteredSphereParams::default()).is_err());
    }
}
