// Stable content hashing for address-derived offsets

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a over the raw bytes of `text`.
///
/// The value depends only on the input bytes, so it is identical across runs,
/// processes and platforms, unlike `std::hash::DefaultHasher`.
pub fn fnv1a_64(text: &str) -> u64 {
    text.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Deterministic (lon, lat) offset for an address.
///
/// Latitude falls in `[-lat_range, lat_range)` and longitude in
/// `[-lon_range, lon_range)`, each quantised to 1/100 of its range. The two
/// offsets are drawn from different halves of the hash.
pub fn address_offset(address: &str, lon_range: f64, lat_range: f64) -> (f64, f64) {
    let hash = fnv1a_64(address);
    let lat_step = ((hash % 200) as f64 - 100.0) / 100.0;
    let lon_step = (((hash >> 32) % 200) as f64 - 100.0) / 100.0;
    (lon_step * lon_range, lat_step * lat_range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv_reference_values() {
        assert_eq!(fnv1a_64(""), 0xcbf29ce484222325);
        assert_eq!(fnv1a_64("a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a_64("foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn test_offset_is_deterministic() {
        let first = address_offset("H.No 12, Shahpur Jat", 0.005, 0.01);
        let second = address_offset("H.No 12, Shahpur Jat", 0.005, 0.01);

        assert_eq!(first, second);
    }

    #[test]
    fn test_offset_ranges() {
        for i in 0..500 {
            let (lon, lat) = address_offset(&format!("address {}", i), 0.005, 0.01);

            assert!((-0.005..0.005).contains(&lon), "lon {}", lon);
            assert!((-0.01..0.01).contains(&lat), "lat {}", lat);
        }
    }

    #[test]
    fn test_distinct_addresses_hash_differently() {
        assert_ne!(fnv1a_64("Gautam Nagar"), fnv1a_64("Masjid Moth"));
        assert_ne!(fnv1a_64("Kalkaji"), fnv1a_64("kalkaji"));
    }
}
