//! PDF medical report.

pub mod writer;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use shared::{DoctorIdentity, FeatureVector, PatientInfo, PredictionResult, RiskEstimate};

use crate::config::OrganizationInfo;
use crate::storage::{ArtifactStore, StorageError};
use writer::{Align, FontStyle, PdfWriter};

pub const IMAGE_WIDTH_MM: f32 = 160.0;

pub const DISCLAIMER: &str = "This is an AI-generated report. Please consult a qualified medical \
                              professional for diagnosis and treatment.";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Failed to embed image {path}: {reason}")]
    Image { path: PathBuf, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Everything printed in one report.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub patient: &'a PatientInfo,
    pub doctor: &'a DoctorIdentity,
    pub result: &'a PredictionResult,
    pub features: &'a FeatureVector,
    pub recommendation: &'a str,
    pub gauge_image: Option<&'a Path>,
    pub bar_image: Option<&'a Path>,
}

pub fn risk_line(risk: &RiskEstimate) -> String {
    match risk {
        RiskEstimate::Available { percent } => format!("Risk Probability: {:.1}%", percent),
        RiskEstimate::Unsupported => "Risk Probability: not available for this model".to_string(),
        RiskEstimate::Failed { .. } => "Risk Probability: could not be computed".to_string(),
    }
}

/// One layout step of a report, in print order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A single line cell.
    Line {
        text: String,
        style: FontStyle,
        size_pt: f32,
        height_mm: f32,
        align: Align,
    },
    /// Wrapped text, optionally greyed.
    Paragraph {
        text: String,
        style: FontStyle,
        size_pt: f32,
        line_mm: f32,
        align: Align,
        grey: Option<f32>,
    },
    Gap(f32),
    /// Raster image; `fallback` is printed instead if it cannot be embedded.
    Image {
        path: PathBuf,
        fallback: Vec<Block>,
    },
}

impl Block {
    fn line(text: impl Into<String>, style: FontStyle, size_pt: f32, height_mm: f32, align: Align) -> Self {
        Block::Line {
            text: text.into(),
            style,
            size_pt,
            height_mm,
            align,
        }
    }

    fn paragraph(text: impl Into<String>, style: FontStyle, size_pt: f32, line_mm: f32) -> Self {
        Block::Paragraph {
            text: text.into(),
            style,
            size_pt,
            line_mm,
            align: Align::Left,
            grey: None,
        }
    }
}

/// Input listing used when the bar chart is unavailable.
fn feature_listing(features: &FeatureVector) -> Vec<Block> {
    features
        .features()
        .iter()
        .map(|feature| {
            Block::paragraph(
                format!("{}: {:?}", feature.name, feature.value),
                FontStyle::Regular,
                11.0,
                7.0,
            )
        })
        .collect()
}

pub fn layout(
    organization: &OrganizationInfo,
    input: &ReportInput<'_>,
    generated_at: &DateTime<Local>,
) -> Vec<Block> {
    let mut blocks = vec![
        Block::line(&organization.name, FontStyle::Bold, 16.0, 10.0, Align::Center),
        Block::line(&organization.address, FontStyle::Regular, 10.0, 6.0, Align::Center),
        Block::line(
            format!("Facility ID: {}", organization.id),
            FontStyle::Regular,
            10.0,
            6.0,
            Align::Center,
        ),
        Block::line(
            format!("Report Generated: {}", generated_at.format("%d-%m-%Y %H:%M")),
            FontStyle::Regular,
            10.0,
            6.0,
            Align::Center,
        ),
        Block::Gap(6.0),
        Block::line("Patient & Doctor Information", FontStyle::Bold, 14.0, 10.0, Align::Left),
    ];
    for line in [
        format!("Patient Name: {}", input.patient.name),
        format!("Age: {}    Sex: {}", input.patient.age, input.patient.sex),
        format!("Doctor Email: {}", input.doctor.email),
        format!("Doctor ID: {}", input.doctor.doctor_id),
        format!("Organization ID: {}", input.doctor.organization_id),
    ] {
        blocks.push(Block::line(line, FontStyle::Regular, 12.0, 8.0, Align::Left));
    }
    blocks.extend([
        Block::Gap(4.0),
        Block::line(
            format!("Disease Predicted: {}", input.result.disease),
            FontStyle::Bold,
            12.0,
            8.0,
            Align::Left,
        ),
        Block::line(
            format!("Prediction Result: {}", input.result.label),
            FontStyle::Bold,
            12.0,
            8.0,
            Align::Left,
        ),
        Block::line(risk_line(&input.result.risk), FontStyle::Regular, 12.0, 8.0, Align::Left),
        Block::Gap(4.0),
    ]);

    if let Some(gauge) = input.gauge_image {
        blocks.extend([
            Block::line("Risk Probability Gauge:", FontStyle::Bold, 12.0, 10.0, Align::Left),
            Block::Image {
                path: gauge.to_path_buf(),
                fallback: Vec::new(),
            },
            Block::Gap(4.0),
        ]);
    }

    blocks.push(Block::line("Input Parameters:", FontStyle::Bold, 12.0, 10.0, Align::Left));
    match input.bar_image {
        Some(bars) => blocks.push(Block::Image {
            path: bars.to_path_buf(),
            fallback: feature_listing(input.features),
        }),
        None => blocks.extend(feature_listing(input.features)),
    }
    blocks.extend([
        Block::Gap(4.0),
        Block::line("Medical Recommendation:", FontStyle::Bold, 12.0, 10.0, Align::Left),
        Block::paragraph(input.recommendation, FontStyle::Regular, 12.0, 8.0),
        Block::Gap(8.0),
        Block::Paragraph {
            text: DISCLAIMER.to_string(),
            style: FontStyle::Italic,
            size_pt: 10.0,
            line_mm: 6.0,
            align: Align::Center,
            grey: Some(0.39),
        },
    ]);
    blocks
}

fn write_blocks(pdf: &mut PdfWriter, blocks: &[Block]) {
    for block in blocks {
        match block {
            Block::Line {
                text,
                style,
                size_pt,
                height_mm,
                align,
            } => pdf.cell(text, *style, *size_pt, *height_mm, *align),
            Block::Paragraph {
                text,
                style,
                size_pt,
                line_mm,
                align,
                grey,
            } => {
                if let Some(level) = grey {
                    pdf.set_grey(*level);
                }
                pdf.paragraph(text, *style, *size_pt, *line_mm, *align);
                if grey.is_some() {
                    pdf.reset_color();
                }
            }
            Block::Gap(height_mm) => pdf.gap(*height_mm),
            Block::Image { path, fallback } => {
                if let Err(err) = pdf.image(path, IMAGE_WIDTH_MM) {
                    log::warn!("Replacing image in report: {}", err);
                    write_blocks(pdf, fallback);
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReportRenderer {
    organization: OrganizationInfo,
    store: ArtifactStore,
}

impl ReportRenderer {
    pub fn new(organization: OrganizationInfo, store: ArtifactStore) -> Self {
        Self {
            organization,
            store,
        }
    }

    /// Writes the report and returns its path inside the reports directory.
    pub fn render(&self, input: &ReportInput<'_>) -> Result<PathBuf, ReportError> {
        self.store.ensure_dirs()?;

        let now = Local::now();
        let file_name = ArtifactStore::generate_report_name(&input.patient.name, &now);
        let path = self.store.report_path(&file_name);

        let mut pdf = PdfWriter::new(&format!("{} Medical Report", input.result.disease))?;
        write_blocks(&mut pdf, &layout(&self.organization, input, &now));
        pdf.save(&path)?;
        log::info!("Report written to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{BarChart, Chart};
    use shared::{Disease, Label, Sex};

    fn fixtures(disease: Disease, values: &[f64]) -> (PatientInfo, DoctorIdentity, FeatureVector) {
        (
            PatientInfo {
                name: "Jane Doe".into(),
                age: 54,
                sex: Sex::Female,
            },
            DoctorIdentity {
                email: "doc@example.com".into(),
                doctor_id: "D-1".into(),
                organization_id: "ORG-9".into(),
            },
            FeatureVector::from_schema(disease, values).unwrap(),
        )
    }

    fn renderer(dir: &Path) -> ReportRenderer {
        ReportRenderer::new(
            OrganizationInfo::default(),
            ArtifactStore::new(dir.join("reports"), dir.join("reports/charts")),
        )
    }

    fn texts(blocks: &[Block]) -> Vec<&str> {
        blocks
            .iter()
            .filter_map(|block| match block {
                Block::Line { text, .. } | Block::Paragraph { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn position(lines: &[&str], prefix: &str) -> usize {
        lines
            .iter()
            .position(|line| line.starts_with(prefix))
            .unwrap_or_else(|| panic!("no line starting with {prefix:?} in {lines:#?}"))
    }

    #[test]
    fn label_only_layout_lists_inputs_as_text_in_section_order() {
        let (patient, doctor, features) = fixtures(Disease::HeartDisease, &[1.0; 13]);
        let result = PredictionResult {
            disease: Disease::HeartDisease,
            label: Label::Negative,
            risk: RiskEstimate::Unsupported,
        };
        let input = ReportInput {
            patient: &patient,
            doctor: &doctor,
            result: &result,
            features: &features,
            recommendation: "Keep it up.",
            gauge_image: None,
            bar_image: None,
        };
        let blocks = layout(&OrganizationInfo::default(), &input, &Local::now());
        let lines = texts(&blocks);

        let order = [
            "Sumit HealthCare Services",
            "Facility ID: HealthCare-001",
            "Report Generated: ",
            "Patient & Doctor Information",
            "Patient Name: Jane Doe",
            "Organization ID: ORG-9",
            "Disease Predicted: Heart Disease",
            "Prediction Result: Negative (Not At Risk)",
            "Risk Probability: not available",
            "Input Parameters:",
            "Age: 1.0",
            "Medical Recommendation:",
            "Keep it up.",
            "This is an AI-generated report.",
        ];
        let positions: Vec<usize> = order.iter().map(|p| position(&lines, p)).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{lines:#?}");

        assert!(!lines.iter().any(|l| l.starts_with("Risk Probability Gauge")));
        assert!(!blocks.iter().any(|b| matches!(b, Block::Image { .. })));
        let listing = &lines[position(&lines, "Input Parameters:") + 1..position(&lines, "Medical Recommendation:")];
        assert_eq!(listing.len(), 13);
        assert!(listing.iter().all(|l| l.ends_with(": 1.0")));
    }

    #[test]
    fn layout_with_charts_keeps_listing_as_bar_fallback() {
        let (patient, doctor, features) = fixtures(Disease::Diabetes, &[2.0; 8]);
        let result = PredictionResult {
            disease: Disease::Diabetes,
            label: Label::Positive,
            risk: RiskEstimate::Available { percent: 80.0 },
        };
        let gauge = Path::new("gauge.png");
        let bars = Path::new("bars.png");
        let blocks = layout(
            &OrganizationInfo::default(),
            &ReportInput {
                patient: &patient,
                doctor: &doctor,
                result: &result,
                features: &features,
                recommendation: "See a specialist.",
                gauge_image: Some(gauge),
                bar_image: Some(bars),
            },
            &Local::now(),
        );
        let lines = texts(&blocks);
        assert!(lines.contains(&"Prediction Result: Positive (At Risk)"));
        assert!(lines.contains(&"Risk Probability: 80.0%"));
        assert!(position(&lines, "Risk Probability Gauge:") < position(&lines, "Input Parameters:"));
        // Inputs are only listed inline when the chart is missing.
        assert!(!lines.iter().any(|l| l.ends_with(": 2.0")));

        let images: Vec<_> = blocks
            .iter()
            .filter_map(|b| match b {
                Block::Image { path, fallback } => Some((path.as_path(), fallback.len())),
                _ => None,
            })
            .collect();
        assert_eq!(images, vec![(gauge, 0), (bars, 8)]);
    }

    #[test]
    fn risk_line_distinguishes_outcomes() {
        assert_eq!(
            risk_line(&RiskEstimate::Available { percent: 80.0 }),
            "Risk Probability: 80.0%"
        );
        assert_ne!(
            risk_line(&RiskEstimate::Unsupported),
            risk_line(&RiskEstimate::Failed { reason: "x".into() })
        );
    }

    #[test]
    fn renders_text_only_report_when_no_images() {
        let tmp = tempfile::tempdir().unwrap();
        let (patient, doctor, features) = fixtures(Disease::HeartDisease, &[1.0; 13]);
        let result = PredictionResult {
            disease: Disease::HeartDisease,
            label: Label::Negative,
            risk: RiskEstimate::Unsupported,
        };

        let path = renderer(tmp.path())
            .render(&ReportInput {
                patient: &patient,
                doctor: &doctor,
                result: &result,
                features: &features,
                recommendation: "Keep it up.",
                gauge_image: None,
                bar_image: None,
            })
            .unwrap();

        assert!(path.starts_with(tmp.path().join("reports")));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("Jane_Doe_Medical_Report_"));
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn unreadable_images_fall_back_to_text() {
        let tmp = tempfile::tempdir().unwrap();
        let (patient, doctor, features) = fixtures(Disease::Diabetes, &[2.0; 8]);
        let result = PredictionResult {
            disease: Disease::Diabetes,
            label: Label::Positive,
            risk: RiskEstimate::Available { percent: 80.0 },
        };
        let bogus = tmp.path().join("not-an-image.png");
        std::fs::write(&bogus, b"nope").unwrap();

        let path = renderer(tmp.path())
            .render(&ReportInput {
                patient: &patient,
                doctor: &doctor,
                result: &result,
                features: &features,
                recommendation: "See a specialist.",
                gauge_image: Some(&bogus),
                bar_image: Some(&bogus),
            })
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn two_patients_get_distinct_reports() {
        let tmp = tempfile::tempdir().unwrap();
        let renderer = renderer(tmp.path());
        let (patient, doctor, features) = fixtures(Disease::Diabetes, &[2.0; 8]);
        let other = PatientInfo {
            name: "John Roe".into(),
            ..patient.clone()
        };
        let result = PredictionResult {
            disease: Disease::Diabetes,
            label: Label::Negative,
            risk: RiskEstimate::Available { percent: 12.5 },
        };
        let input = ReportInput {
            patient: &patient,
            doctor: &doctor,
            result: &result,
            features: &features,
            recommendation: "ok",
            gauge_image: None,
            bar_image: None,
        };

        let a = renderer.render(&input).unwrap();
        let b = renderer
            .render(&ReportInput {
                patient: &other,
                ..input
            })
            .unwrap();
        assert_ne!(a, b);
        assert!(a.exists() && b.exists());
    }

    #[test]
    fn embeds_rendered_bar_chart_when_available() {
        let tmp = tempfile::tempdir().unwrap();
        let (patient, doctor, features) = fixtures(Disease::Diabetes, &[3.0; 8]);
        let png = tmp.path().join("bars.png");
        // Raster output needs system fonts; skip the embedding check without them.
        if BarChart::new(Disease::Diabetes, &features).save_png(&png).is_err() {
            return;
        }
        let result = PredictionResult {
            disease: Disease::Diabetes,
            label: Label::Negative,
            risk: RiskEstimate::Unsupported,
        };
        let path = renderer(tmp.path())
            .render(&ReportInput {
                patient: &patient,
                doctor: &doctor,
                result: &result,
                features: &features,
                recommendation: "ok",
                gauge_image: None,
                bar_image: Some(&png),
            })
            .unwrap();
        let pdf_len = std::fs::metadata(&path).unwrap().len();
        assert!(pdf_len > std::fs::metadata(&png).unwrap().len() / 10);
    }
}
