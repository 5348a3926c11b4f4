use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::SourceError;
use crate::models::DeliveryRecord;

/// Courier on duty, attached to one post office
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Courier {
    pub courier_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub post_office: String,
}

/// A courier together with the records of one day
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAssignment {
    pub courier: Courier,
    pub date: NaiveDate,
    pub records: Vec<DeliveryRecord>,
}

/// Where delivery records come from
pub trait RecordSource {
    /// Records for the courier's post office on `date`; none is a valid answer
    fn fetch(&self, courier_id: &str, date: NaiveDate) -> Result<DailyAssignment, SourceError>;
}

#[derive(Debug, Clone, Deserialize)]
struct StoredDelivery {
    #[serde(flatten)]
    record: DeliveryRecord,
    post_office: String,
    date: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RecordFile {
    #[serde(default)]
    couriers: Vec<Courier>,
    #[serde(default)]
    deliveries: Vec<StoredDelivery>,
}

/// Record source backed by a JSON file holding couriers and deliveries
#[derive(Debug, Clone)]
pub struct JsonRecordSource {
    path: PathBuf,
}

impl JsonRecordSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn load(&self) -> Result<RecordFile, SourceError> {
        let text = fs::read_to_string(&self.path)?;
        let file: RecordFile = serde_json::from_str(&text)?;
        debug!(
            path = %self.path.display(),
            couriers = file.couriers.len(),
            deliveries = file.deliveries.len(),
            "loaded record file"
        );
        Ok(file)
    }
}

impl RecordSource for JsonRecordSource {
    fn fetch(&self, courier_id: &str, date: NaiveDate) -> Result<DailyAssignment, SourceError> {
        let file = self.load()?;

        let courier = file
            .couriers
            .into_iter()
            .find(|c| c.courier_id == courier_id)
            .ok_or_else(|| SourceError::UnknownCourier(courier_id.to_string()))?;

        let records: Vec<DeliveryRecord> = file
            .deliveries
            .into_iter()
            .filter(|d| d.post_office == courier.post_office && d.date == date)
            .map(|d| d.record)
            .collect();

        info!(
            courier = %courier.courier_id,
            post_office = %courier.post_office,
            %date,
            records = records.len(),
            "fetched deliveries"
        );

        Ok(DailyAssignment {
            courier,
            date,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FILE: &str = r#"{
        "couriers": [
            { "courier_id": "ZLT7WU", "name": "Ravi", "phone": "98100", "post_office": "Andrews Ganj" },
            { "courier_id": "QQ11", "post_office": "Kalkaji" }
        ],
        "deliveries": [
            { "booking_id": "A1", "receiver_address": "Andrews Ganj, New Delhi",
              "time_slot": "10:00 AM - 10:30 AM", "post_office": "Andrews Ganj", "date": "2024-10-12" },
            { "booking_id": "A2", "receiver_address": "Green Park, New Delhi",
              "time_slot": "11:00 AM - 11:30 AM", "post_office": "Andrews Ganj", "date": "2024-10-13" },
            { "booking_id": "K1", "receiver_address": "Kalkaji, New Delhi",
              "time_slot": "10:00 AM - 10:30 AM", "post_office": "Kalkaji", "date": "2024-10-12" }
        ]
    }"#;

    fn write_fixture() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FILE.as_bytes()).unwrap();
        file
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_fetch_filters_by_post_office_and_date() {
        let fixture = write_fixture();
        let source = JsonRecordSource::new(fixture.path());

        let day = source.fetch("ZLT7WU", date("2024-10-12")).unwrap();
        assert_eq!(day.courier.post_office, "Andrews Ganj");
        assert_eq!(day.records.len(), 1);
        assert_eq!(day.records[0].id, "A1");
    }

    #[test]
    fn test_no_deliveries_is_not_an_error() {
        let fixture = write_fixture();
        let source = JsonRecordSource::new(fixture.path());

        let day = source.fetch("QQ11", date("2024-10-13")).unwrap();
        assert!(day.records.is_empty());
    }

    #[test]
    fn test_unknown_courier() {
        let fixture = write_fixture();
        let source = JsonRecordSource::new(fixture.path());

        let err = source.fetch("NOPE", date("2024-10-12")).unwrap_err();
        assert!(matches!(err, SourceError::UnknownCourier(_)));
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = JsonRecordSource::new(dir.path().join("absent.json"));
        assert!(matches!(
            missing.fetch("ZLT7WU", date("2024-10-12")),
            Err(SourceError::Io(_))
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ \"couriers\": [").unwrap();
        assert!(matches!(
            JsonRecordSource::new(&broken).fetch("ZLT7WU", date("2024-10-12")),
            Err(SourceError::Json(_))
        ));
    }
}
