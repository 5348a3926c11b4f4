// Static route map rendering for a planned run

use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

use crate::models::{Coordinate, RunSummary};

const ROUTE_COLORS: [RGBColor; 7] = [
    RGBColor(255, 51, 51),
    RGBColor(51, 200, 51),
    RGBColor(51, 51, 255),
    RGBColor(255, 51, 255),
    RGBColor(220, 200, 40),
    RGBColor(51, 200, 200),
    RGBColor(255, 153, 51),
];

const MISSING_SEGMENT: RGBColor = RGBColor(170, 170, 170);
const APPROXIMATE_STOP: RGBColor = RGBColor(255, 140, 0);

/// Draws depot, numbered stops and segment paths into a PNG at `path`
pub fn render_run(summary: &RunSummary, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut points: Vec<Coordinate> = summary.stops.iter().map(|s| s.coordinate).collect();
    points.extend(summary.depot);
    for segment in &summary.segments {
        points.extend(segment.path.iter().copied());
    }
    if points.is_empty() {
        return Err("run has no coordinates to plot".into());
    }
    let (lon_range, lat_range) = padded_bounds(&points);

    let root = BitMapBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Delivery run: {} stops, {}", summary.stops.len(), summary.totals),
            ("sans-serif", 24),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lon_range, lat_range)?;

    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .draw()?;

    for segment in &summary.segments {
        let color = ROUTE_COLORS[segment.index % ROUTE_COLORS.len()];
        let line: Vec<(f64, f64)> = if segment.path.is_empty() {
            vec![
                (segment.from.lon, segment.from.lat),
                (segment.to.lon, segment.to.lat),
            ]
        } else {
            segment.path.iter().map(|c| (c.lon, c.lat)).collect()
        };
        chart.draw_series(LineSeries::new(line, color.stroke_width(3)))?;
    }

    // Straight grey line where the provider gave no path
    for failure in &summary.missing_segments {
        chart.draw_series(LineSeries::new(
            vec![
                (failure.from.lon, failure.from.lat),
                (failure.to.lon, failure.to.lat),
            ],
            MISSING_SEGMENT.stroke_width(1),
        ))?;
    }

    if let Some(depot) = summary.depot {
        chart.draw_series(std::iter::once(TriangleMarker::new(
            (depot.lon, depot.lat),
            12,
            RED.filled(),
        )))?;
    }

    chart.draw_series(summary.stops.iter().enumerate().map(|(i, stop)| {
        let color = if stop.is_low_confidence() {
            APPROXIMATE_STOP
        } else {
            BLUE
        };
        EmptyElement::at((stop.coordinate.lon, stop.coordinate.lat))
            + Circle::new((0, 0), 9, color.filled())
            + Text::new(
                format!("{}", i + 1),
                (-4, -7),
                ("sans-serif", 13).into_font().color(&WHITE),
            )
    }))?;

    root.present()?;
    Ok(())
}

fn padded_bounds(points: &[Coordinate]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let mut min_lon = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;

    for p in points {
        min_lon = min_lon.min(p.lon);
        max_lon = max_lon.max(p.lon);
        min_lat = min_lat.min(p.lat);
        max_lat = max_lat.max(p.lat);
    }

    let pad_lon = ((max_lon - min_lon) * 0.1).max(0.001);
    let pad_lat = ((max_lat - min_lat) * 0.1).max(0.001);

    (
        (min_lon - pad_lon)..(max_lon + pad_lon),
        (min_lat - pad_lat)..(max_lat + pad_lat),
    )
}
