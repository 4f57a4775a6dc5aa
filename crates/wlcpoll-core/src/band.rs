// ── Band classification ──
//
// The controller reports one "current channel" per radio with no band
// tag. Channel numbers alone tell the bands apart: 2.4 GHz uses 1-14,
// 5 GHz starts at 36.

use tracing::warn;

use crate::model::{AccessPointRecord, Snapshot};

/// First channel number assigned to the 5 GHz band.
pub const BAND_SPLIT_CHANNEL: i64 = 15;

/// Radio band derived from a channel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Band {
    #[strum(serialize = "2.4GHz")]
    Band24,
    #[strum(serialize = "5GHz")]
    Band5,
}

impl Band {
    /// `None` for channel numbers that cannot belong to any radio.
    pub fn of_channel(channel: i64) -> Option<Self> {
        match channel {
            c if c <= 0 => None,
            c if c < BAND_SPLIT_CHANNEL => Some(Self::Band24),
            _ => Some(Self::Band5),
        }
    }
}

/// Move pending channel observations into the band fields. Returns the
/// number of observations ignored as out of range.
pub fn classify(ap: &mut AccessPointRecord) -> usize {
    let mut ignored = 0;
    for channel in std::mem::take(&mut ap.pending_channels) {
        match Band::of_channel(channel) {
            Some(Band::Band24) => ap.channel_band24 = channel,
            Some(Band::Band5) => ap.channel_band5 = channel,
            None => {
                warn!(mac = %ap.mac_address, channel, "ignoring non-positive channel number");
                ignored += 1;
            }
        }
    }
    ignored
}

/// Run [`classify`] over every access point in the snapshot.
pub fn classify_snapshot(snapshot: &mut Snapshot) -> usize {
    snapshot.access_points.values_mut().map(classify).sum()
}
