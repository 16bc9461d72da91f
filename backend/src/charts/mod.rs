//! Gauge and bar charts for the prediction result.
//!
//! Each chart is a plain layout value computed from its numeric inputs. The
//! same drawing code renders it to SVG markup for on-screen display and to a
//! PNG file for embedding in the PDF report.

pub mod bars;
pub mod gauge;

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

pub use bars::BarChart;
pub use gauge::GaugeChart;

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("chart rendering failed: {0}")]
    Render(String),
}

fn render_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> ChartError {
    ChartError::Render(err.to_string())
}

pub trait Chart {
    fn size(&self) -> (u32, u32);

    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>;

    fn to_svg(&self) -> Result<String, ChartError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.size()).into_drawing_area();
            root.fill(&WHITE).map_err(render_error)?;
            self.draw(&root).map_err(render_error)?;
            root.present().map_err(render_error)?;
        }
        Ok(svg)
    }

    fn save_png(&self, path: &Path) -> Result<(), ChartError> {
        let root = BitMapBackend::new(path, self.size()).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;
        self.draw(&root).map_err(render_error)?;
        root.present().map_err(render_error)?;
        Ok(())
    }
}
