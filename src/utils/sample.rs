// Seeded generation of delivery records for demos and benchmarks

use chrono::NaiveTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{DeliveryRecord, TimeWindow};

const AREAS: [&str; 8] = [
    "Shahpur Jat",
    "Kalkaji",
    "Gautam Nagar",
    "South Extension",
    "Hauz Khas",
    "Andrews Ganj",
    "Masjid Moth",
    "Green Park",
];

const EQUIPMENT: [&str; 5] = ["Parcel", "Letter", "Speed Post", "Medical Kit", "Documents"];

const RECEIVERS: [&str; 6] = ["Asha", "Vikram", "Meera", "Rohan", "Farah", "Imran"];

/// Generates `count` records between 9 AM and 5 PM for one post office area
pub fn generate_records(seed: u64, count: usize) -> Vec<DeliveryRecord> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count)
        .map(|i| {
            let start_minute: u32 = rng.gen_range(9 * 60..17 * 60);
            let length: u32 = rng.gen_range(3..=12) * 5;
            let window = minutes_window(start_minute, start_minute + length);

            let area = AREAS[rng.gen_range(0..AREAS.len())];
            let house: u32 = rng.gen_range(1..300);
            let address = format!("H.No {}, {}, New Delhi - 1100{:02}", house, area, rng.gen_range(10..50));

            DeliveryRecord::new(format!("BK{:05}", seed % 1000 * 100 + i as u64), address, window)
                .with_receiver(RECEIVERS[rng.gen_range(0..RECEIVERS.len())])
                .with_equipment(EQUIPMENT[rng.gen_range(0..EQUIPMENT.len())])
        })
        .collect()
}

fn minutes_window(start: u32, end: u32) -> String {
    let to_time = |m: u32| NaiveTime::from_hms_opt(m / 60, m % 60, 0);

    match (to_time(start), to_time(end)) {
        (Some(s), Some(e)) => match TimeWindow::new(s, e) {
            Ok(window) => window.to_string(),
            Err(_) => String::new(),
        },
        _ => String::new(),
    }
}
