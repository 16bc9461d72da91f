use std::ops::Range;

use plotters::coord::Shift;
use plotters::prelude::*;
use shared::{Disease, FeatureVector};

use super::Chart;

pub const BAR_CHART_WIDTH: u32 = 800;
pub const MIN_HEIGHT: u32 = 400;
pub const HEIGHT_PER_FIELD: u32 = 30;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);

pub fn chart_height(field_count: usize) -> u32 {
    let scaled = u32::try_from(field_count)
        .unwrap_or(u32::MAX)
        .saturating_mul(HEIGHT_PER_FIELD);
    scaled.max(MIN_HEIGHT)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub name: String,
    pub value: f64,
}

/// Horizontal bar per input field, in schema order from the bottom up.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn new(disease: Disease, features: &FeatureVector) -> Self {
        Self {
            title: format!("Input Parameters for {} Prediction", disease),
            bars: features
                .features()
                .iter()
                .map(|f| Bar {
                    name: f.name.clone(),
                    value: f.value,
                })
                .collect(),
        }
    }

    pub fn height(&self) -> u32 {
        chart_height(self.bars.len())
    }

    /// Value axis range. Always contains zero so every bar starts at the axis.
    pub fn x_range(&self) -> Range<f64> {
        let lo = self.bars.iter().map(|b| b.value).fold(0.0, f64::min);
        let hi = self.bars.iter().map(|b| b.value).fold(0.0, f64::max);
        if lo == hi {
            return 0.0..1.0;
        }
        let pad = (hi - lo) * 0.05;
        let lo = if lo < 0.0 { lo - pad } else { lo };
        let hi = if hi > 0.0 { hi + pad } else { hi };
        lo..hi
    }

    fn label_area_width(&self) -> u32 {
        let longest = self
            .bars
            .iter()
            .map(|b| b.name.chars().count())
            .max()
            .unwrap_or(0) as u32;
        (longest * 7 + 16).clamp(80, 360)
    }
}

impl Chart for BarChart {
    fn size(&self) -> (u32, u32) {
        (BAR_CHART_WIDTH, self.height())
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let count = self.bars.len();
        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", 20).into_font())
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(self.label_area_width())
            .build_cartesian_2d(self.x_range(), (0..count).into_segmented())?;

        let names: Vec<&str> = self.bars.iter().map(|b| b.name.as_str()).collect();
        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(count)
            .y_label_formatter(&|v: &SegmentValue<usize>| match v {
                SegmentValue::CenterOf(i) => names.get(*i).map(|s| s.to_string()).unwrap_or_default(),
                _ => String::new(),
            })
            .x_desc("Values")
            .draw()?;

        chart.draw_series(self.bars.iter().enumerate().map(|(i, bar)| {
            let mut rect = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(i)),
                    (bar.value, SegmentValue::Exact(i + 1)),
                ],
                SKY_BLUE.filled(),
            );
            rect.set_margin(3, 3, 0, 0);
            rect
        }))?;

        Ok(())
    }
}
