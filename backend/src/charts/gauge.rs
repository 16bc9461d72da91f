use std::f64::consts::PI;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use shared::Disease;

use super::Chart;

pub const GAUGE_SIZE: (u32, u32) = (800, 500);

const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
const ZONE_YELLOW: RGBColor = RGBColor(255, 255, 0);
const ZONE_RED: RGBColor = RGBColor(255, 0, 0);
const CRIMSON: RGBColor = RGBColor(220, 20, 60);

const OUTER_RADIUS: f64 = 1.0;
const INNER_RADIUS: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeZone {
    Low,
    Moderate,
    High,
}

impl GaugeZone {
    pub const ALL: [GaugeZone; 3] = [GaugeZone::Low, GaugeZone::Moderate, GaugeZone::High];

    /// [0, 40) low, [40, 70) moderate, [70, 100] high.
    pub fn for_value(percent: f64) -> Self {
        if percent < 40.0 {
            GaugeZone::Low
        } else if percent < 70.0 {
            GaugeZone::Moderate
        } else {
            GaugeZone::High
        }
    }

    pub fn range(&self) -> (f64, f64) {
        match self {
            GaugeZone::Low => (0.0, 40.0),
            GaugeZone::Moderate => (40.0, 70.0),
            GaugeZone::High => (70.0, 100.0),
        }
    }

    pub fn color(&self) -> RGBColor {
        match self {
            GaugeZone::Low => LIGHT_GREEN,
            GaugeZone::Moderate => ZONE_YELLOW,
            GaugeZone::High => ZONE_RED,
        }
    }
}

/// Semicircular risk gauge: 0% on the left, 100% on the right.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeChart {
    pub title: String,
    pub value: f64,
}

impl GaugeChart {
    pub fn new(disease: Disease, risk_percent: f64) -> Self {
        Self {
            title: format!("{} Risk Probability (%)", disease),
            value: if risk_percent.is_finite() {
                risk_percent.clamp(0.0, 100.0)
            } else {
                0.0
            },
        }
    }

    pub fn zone(&self) -> GaugeZone {
        GaugeZone::for_value(self.value)
    }

    pub fn label(&self) -> String {
        format!("{:.1}%", self.value)
    }

    /// Needle angle in radians, π at 0% and 0 at 100%.
    pub fn needle_angle(&self) -> f64 {
        value_angle(self.value)
    }

    pub fn needle_tip(&self) -> (f64, f64) {
        polar(OUTER_RADIUS, self.needle_angle())
    }
}

fn value_angle(percent: f64) -> f64 {
    PI * (1.0 - percent / 100.0)
}

fn polar(radius: f64, angle: f64) -> (f64, f64) {
    (radius * angle.cos(), radius * angle.sin())
}

/// Ring segment between two gauge values, as a closed polygon outline.
fn ring_segment(from: f64, to: f64, inner: f64, outer: f64) -> Vec<(f64, f64)> {
    let steps = ((to - from).abs().ceil() as usize).max(1);
    let at = |i: usize| from + (to - from) * i as f64 / steps as f64;

    let mut points: Vec<(f64, f64)> = (0..=steps)
        .map(|i| polar(outer, value_angle(at(i))))
        .collect();
    points.extend((0..=steps).rev().map(|i| polar(inner, value_angle(at(i)))));
    points
}

impl Chart for GaugeChart {
    fn size(&self) -> (u32, u32) {
        GAUGE_SIZE
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", 28).into_font())
            .margin(20)
            .build_cartesian_2d(-1.25f64..1.25f64, -0.35f64..1.1f64)?;

        chart.draw_series(GaugeZone::ALL.iter().map(|zone| {
            let (from, to) = zone.range();
            Polygon::new(
                ring_segment(from, to, INNER_RADIUS, OUTER_RADIUS),
                zone.color().filled(),
            )
        }))?;

        if self.value > 0.0 {
            chart.draw_series(std::iter::once(Polygon::new(
                ring_segment(0.0, self.value, 0.72, 0.88),
                CRIMSON.filled(),
            )))?;
        }

        let (tip_x, tip_y) = self.needle_tip();
        let (base_x, base_y) = polar(INNER_RADIUS * 0.95, self.needle_angle());
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(base_x, base_y), (tip_x, tip_y)],
            BLACK.stroke_width(4),
        )))?;

        let number_style = TextStyle::from(("sans-serif", 56).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        chart.draw_series(std::iter::once(Text::new(
            self.label(),
            (0.0, 0.2),
            number_style,
        )))?;

        let tick_style = TextStyle::from(("sans-serif", 18).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        chart.draw_series([0.0, 40.0, 70.0, 100.0].into_iter().map(|tick| {
            let (x, y) = polar(OUTER_RADIUS + 0.08, value_angle(tick));
            Text::new(format!("{tick:.0}"), (x, y - 0.02), tick_style.clone())
        }))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_boundaries() {
        assert_eq!(GaugeZone::for_value(0.0), GaugeZone::Low);
        assert_eq!(GaugeZone::for_value(39.99), GaugeZone::Low);
        assert_eq!(GaugeZone::for_value(40.0), GaugeZone::Moderate);
        assert_eq!(GaugeZone::for_value(69.99), GaugeZone::Moderate);
        assert_eq!(GaugeZone::for_value(70.0), GaugeZone::High);
        assert_eq!(GaugeZone::for_value(100.0), GaugeZone::High);
    }

    #[test]
    fn zones_tile_the_full_range() {
        let ranges: Vec<_> = GaugeZone::ALL.iter().map(|z| z.range()).collect();
        assert_eq!(ranges.first().map(|r| r.0), Some(0.0));
        assert_eq!(ranges.last().map(|r| r.1), Some(100.0));
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }

    #[test]
    fn needle_sweeps_left_to_right() {
        let low = GaugeChart::new(Disease::Diabetes, 0.0);
        let mid = GaugeChart::new(Disease::Diabetes, 50.0);
        let high = GaugeChart::new(Disease::Diabetes, 100.0);
        assert!((low.needle_angle() - PI).abs() < 1e-12);
        assert!((mid.needle_angle() - PI / 2.0).abs() < 1e-12);
        assert!(high.needle_angle().abs() < 1e-12);

        let (x, y) = mid.needle_tip();
        assert!(x.abs() < 1e-9);
        assert!((y - OUTER_RADIUS).abs() < 1e-9);
    }

    #[test]
    fn value_is_clamped_and_labelled() {
        let gauge = GaugeChart::new(Disease::Parkinsons, 123.0);
        assert_eq!(gauge.value, 100.0);
        assert_eq!(gauge.label(), "100.0%");
        assert_eq!(GaugeChart::new(Disease::Parkinsons, f64::NAN).value, 0.0);
        assert_eq!(GaugeChart::new(Disease::Diabetes, 80.0).label(), "80.0%");
        assert_eq!(
            GaugeChart::new(Disease::Diabetes, 80.0).title,
            "Diabetes Risk Probability (%)"
        );
    }

    #[test]
    fn ring_segment_is_closed_outline() {
        let points = ring_segment(0.0, 40.0, INNER_RADIUS, OUTER_RADIUS);
        assert_eq!(points.len(), 2 * 41);
        let (x0, y0) = points[0];
        assert!((x0 + OUTER_RADIUS).abs() < 1e-9 && y0.abs() < 1e-9);
        let (xl, yl) = *points.last().unwrap();
        assert!((xl + INNER_RADIUS).abs() < 1e-9 && yl.abs() < 1e-9);
    }
}
