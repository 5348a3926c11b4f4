// Delivery record model as handed over by the record source

use crate::models::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a delivery has been completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeliveryStatus {
    #[default]
    #[serde(rename = "Not Delivered", alias = "NotDelivered")]
    NotDelivered,
    #[serde(rename = "Delivered")]
    Delivered,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStatus::NotDelivered => write!(f, "Not Delivered"),
            DeliveryStatus::Delivered => write!(f, "Delivered"),
        }
    }
}

/// Represents one delivery assigned to a courier for the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// Booking identifier, unique within a run
    #[serde(rename = "booking_id")]
    pub id: RecordId,

    /// Name of the receiver
    #[serde(default)]
    pub receiver_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_phone: Option<String>,

    /// Free text postal address
    pub receiver_address: String,

    /// Declared window, e.g. "11:08 AM - 11:38 AM"
    pub time_slot: String,

    /// Equipment or category being delivered
    #[serde(default)]
    pub equipment: String,

    #[serde(default)]
    pub status: DeliveryStatus,

    /// Stable id used by the record store
    #[serde(default)]
    pub external_id: String,
}

impl DeliveryRecord {
    /// Creates a record with the fields the scheduler needs
    pub fn new<S: Into<String>>(id: S, receiver_address: S, time_slot: S) -> Self {
        let id = id.into();
        Self {
            external_id: id.clone(),
            id,
            receiver_name: String::new(),
            receiver_phone: None,
            receiver_address: receiver_address.into(),
            time_slot: time_slot.into(),
            equipment: String::new(),
            status: DeliveryStatus::NotDelivered,
        }
    }

    pub fn with_receiver<S: Into<String>>(mut self, name: S) -> Self {
        self.receiver_name = name.into();
        self
    }

    pub fn with_phone<S: Into<String>>(mut self, phone: S) -> Self {
        self.receiver_phone = Some(phone.into()).filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_equipment<S: Into<String>>(mut self, equipment: S) -> Self {
        self.equipment = equipment.into();
        self
    }

    pub fn is_delivered(&self) -> bool {
        self.status == DeliveryStatus::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let record = DeliveryRecord::new("B-1", "12 Lodhi Road, New Delhi", "10:00 AM - 10:30 AM")
            .with_receiver("Asha")
            .with_equipment("Parcel");

        assert_eq!(record.id, "B-1");
        assert_eq!(record.external_id, "B-1");
        assert_eq!(record.receiver_name, "Asha");
        assert_eq!(record.equipment, "Parcel");
        assert!(!record.is_delivered());
    }

    #[test]
    fn test_deserialize_record() {
        let json = r#"{
            "booking_id": "ZX12",
            "receiver_address": "Shahpur Jat, New Delhi",
            "time_slot": "11:08 AM - 11:38 AM",
            "status": "Delivered"
        }"#;

        let record: DeliveryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "ZX12");
        assert_eq!(record.status, DeliveryStatus::Delivered);
        assert!(record.receiver_name.is_empty());
        assert_eq!(record.receiver_phone, None);
    }

    #[test]
    fn test_receiver_phone() {
        let json = r#"{
            "booking_id": "ZX13",
            "receiver_name": "Meera",
            "receiver_phone": "9810012345",
            "receiver_address": "Kalkaji, New Delhi",
            "time_slot": "10:00 AM - 10:30 AM"
        }"#;
        let record: DeliveryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.receiver_phone.as_deref(), Some("9810012345"));

        let blank = DeliveryRecord::new("B-2", "Kalkaji", "10:00 AM - 10:30 AM").with_phone("  ");
        assert_eq!(blank.receiver_phone, None);

        let unset = serde_json::to_value(&blank).unwrap();
        assert!(unset.get("receiver_phone").is_none());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(DeliveryStatus::NotDelivered.to_string(), "Not Delivered");
        assert_eq!(DeliveryStatus::default(), DeliveryStatus::NotDelivered);
    }
}
