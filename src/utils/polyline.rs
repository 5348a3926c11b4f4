// Encoded polyline decoding (Google polyline algorithm)

use crate::models::Coordinate;

/// Precision used by the directions provider's `polyline` geometry
pub const DEFAULT_PRECISION: u32 = 5;

/// Decodes an encoded polyline into coordinates.
///
/// The encoding stores latitude before longitude as zig-zag varints of
/// deltas; the output is in (lon, lat) order. Returns `None` on malformed
/// input, on accumulator overflow, or when a point leaves the valid
/// latitude/longitude range.
pub fn decode(encoded: &str, precision: u32) -> Option<Vec<Coordinate>> {
    let factor = 10_f64.powi(precision as i32);
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        lat = lat.checked_add(next_delta(bytes, &mut index)?)?;
        lon = lon.checked_add(next_delta(bytes, &mut index)?)?;

        let point = Coordinate::new(lon as f64 / factor, lat as f64 / factor);
        if !(-90.0..=90.0).contains(&point.lat) || !(-180.0..=180.0).contains(&point.lon) {
            return None;
        }
        points.push(point);
    }

    Some(points)
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Option<i64> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes.get(*index)?;
        *index += 1;
        if !(63..=126).contains(&byte) || shift > 60 {
            return None;
        }

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    Some(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}
