//! score -> charts -> recommendation -> report -> scheduled cleanup.

use std::path::PathBuf;

use shared::{DoctorIdentity, FeatureVector, PatientInfo, PredictRequest, PredictionResult, SchemaError};

use crate::charts::{BarChart, Chart, ChartError, GaugeChart};
use crate::cleanup::CleanupScheduler;
use crate::config::{CleanupSettings, OrganizationInfo};
use crate::model::{ModelRegistry, RegistryError};
use crate::recommendation::recommend;
use crate::report::{ReportError, ReportInput, ReportRenderer};
use crate::scoring::{ScoringError, score};
use crate::storage::ArtifactStore;

pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 120;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidPatient(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub result: PredictionResult,
    pub risk_message: Option<&'static str>,
    pub recommendation: &'static str,
    pub gauge_svg: Option<String>,
    pub inputs_svg: Option<String>,
    pub report_path: PathBuf,
    pub report_file: String,
}

pub fn validate_patient(patient: &PatientInfo) -> Result<(), PipelineError> {
    if patient.name.trim().is_empty() {
        return Err(PipelineError::InvalidPatient(
            "Patient name is required".to_string(),
        ));
    }
    if !(MIN_AGE..=MAX_AGE).contains(&patient.age) {
        return Err(PipelineError::InvalidPatient(format!(
            "Patient age must be between {} and {}",
            MIN_AGE, MAX_AGE
        )));
    }
    Ok(())
}

/// A rendered chart: SVG markup for the response, PNG path for the report.
struct RenderedChart {
    svg: Option<String>,
    png: Option<PathBuf>,
    attempted: PathBuf,
}

fn render_chart<C: Chart>(chart: &C, png_path: PathBuf, what: &str) -> RenderedChart {
    let svg = chart
        .to_svg()
        .map_err(|e| log_chart_failure(what, "SVG", &e))
        .ok();
    let png = match chart.save_png(&png_path) {
        Ok(()) => Some(png_path.clone()),
        Err(e) => {
            log_chart_failure(what, "PNG", &e);
            None
        }
    };
    RenderedChart {
        svg,
        png,
        attempted: png_path,
    }
}

fn log_chart_failure(what: &str, format: &str, err: &ChartError) {
    log::warn!("{} chart {} unavailable: {}", what, format, err);
}

#[derive(Clone)]
pub struct PredictionPipeline {
    registry: ModelRegistry,
    store: ArtifactStore,
    renderer: ReportRenderer,
    scheduler: CleanupScheduler,
    cleanup: CleanupSettings,
}

impl PredictionPipeline {
    pub fn new(
        registry: ModelRegistry,
        store: ArtifactStore,
        organization: OrganizationInfo,
        scheduler: CleanupScheduler,
        cleanup: CleanupSettings,
    ) -> Self {
        Self {
            renderer: ReportRenderer::new(organization, store.clone()),
            registry,
            store,
            scheduler,
            cleanup,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn scheduler(&self) -> &CleanupScheduler {
        &self.scheduler
    }

    pub fn cleanup(&self) -> CleanupSettings {
        self.cleanup
    }

    pub fn run(
        &self,
        doctor: &DoctorIdentity,
        request: &PredictRequest,
    ) -> Result<PredictionOutcome, PipelineError> {
        validate_patient(&request.patient)?;
        let features = FeatureVector::from_schema(request.disease, &request.values)?;
        let model = self.registry.get(request.disease)?;

        let result = score(model, request.disease, &features.values())?;
        log::info!("{} for patient {}", result.headline(), request.patient.name);

        self.store
            .ensure_dirs()
            .map_err(|e| PipelineError::Report(e.into()))?;

        let gauge = result.risk_percent().map(|percent| {
            render_chart(
                &GaugeChart::new(request.disease, percent),
                self.store.new_chart_path("gauge"),
                "Gauge",
            )
        });
        let bars = render_chart(
            &BarChart::new(request.disease, &features),
            self.store.new_chart_path("inputs"),
            "Input",
        );

        // A failed raster may still leave a partial file behind.
        let temporary: Vec<PathBuf> = gauge
            .as_ref()
            .map(|g| g.attempted.clone())
            .into_iter()
            .chain(std::iter::once(bars.attempted.clone()))
            .collect();

        let recommendation = recommend(request.disease, result.label);
        let rendered = self.renderer.render(&ReportInput {
            patient: &request.patient,
            doctor,
            result: &result,
            features: &features,
            recommendation,
            gauge_image: gauge.as_ref().and_then(|g| g.png.as_deref()),
            bar_image: bars.png.as_deref(),
        });

        self.scheduler.schedule(temporary, self.cleanup.grace());
        let report_path = rendered?;
        self.scheduler
            .schedule([report_path.clone()], self.cleanup.report_retention());

        let report_file = report_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(PredictionOutcome {
            risk_message: result.risk.unavailable_message(),
            recommendation,
            gauge_svg: gauge.and_then(|g| g.svg),
            inputs_svg: bars.svg,
            report_path,
            report_file,
            result,
        })
    }
}
