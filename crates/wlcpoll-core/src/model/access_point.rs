// ── Access point records ──

use serde::Serialize;

use super::field::{ApField, FieldValue};

/// Per-cycle accumulator for one access point.
///
/// Every field defaults to its zero value; a column the agent did not
/// report for this AP is simply left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessPointRecord {
    /// Hardware address, lowercase hex without separators.
    pub mac_address: String,
    /// Display name (at most 32 bytes on the controller).
    pub name: String,
    /// 2.4 GHz radio channel, 0 if the AP has none.
    pub channel_band24: i64,
    /// 5 GHz radio channel, 0 if the AP has none.
    pub channel_band5: i64,

    /// Raw channel observations awaiting band classification.
    #[serde(skip)]
    pub(crate) pending_channels: Vec<i64>,
}

impl AccessPointRecord {
    /// Assign a decoded value; later assignments overwrite earlier ones.
    pub fn assign(&mut self, field: ApField, value: FieldValue) {
        match field {
            ApField::MacAddress => self.mac_address = value.into_text(),
            ApField::Name => self.name = value.into_text(),
            ApField::Channel => self.pending_channels.push(value.into_integer()),
        }
    }

    pub fn pending_channels(&self) -> &[i64] {
        &self.pending_channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_zero_values() {
        let ap = AccessPointRecord::default();
        assert!(ap.mac_address.is_empty());
        assert!(ap.name.is_empty());
        assert_eq!(ap.channel_band24, 0);
        assert_eq!(ap.channel_band5, 0);
    }

    #[test]
    fn channel_assignments_accumulate() {
        let mut ap = AccessPointRecord::default();
        ap.assign(ApField::Channel, FieldValue::Integer(6));
        ap.assign(ApField::Channel, FieldValue::Integer(36));
        assert_eq!(ap.pending_channels(), &[6, 36]);
    }

    #[test]
    fn name_is_last_write_wins() {
        let mut ap = AccessPointRecord::default();
        ap.assign(ApField::Name, FieldValue::Text("first".into()));
        ap.assign(ApField::Name, FieldValue::Text("second".into()));
        assert_eq!(ap.name, "second");
    }
}
