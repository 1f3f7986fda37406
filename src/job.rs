//! Headless bake jobs.
//!
//! A job is a JSON file naming a page image, a signature image and the
//! placements to stamp. Relative paths are resolved against the job file's
//! directory.

use anyhow::Context;
use image::RgbaImage;
use inkstamp_core::{InkColor, Point, Size};
use inkstamp_editor::{
    fit_page_to_limit, BakeOutcome, EditingSession, EditorOptions, PageRef, PageSink,
    PlacementField, PlacementLimits, PlacementRecord, SignatureImage,
};
use inkstamp_settings::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One placement requested by a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPlacement {
    pub center: Point,
    /// Falls back to the configured default width.
    #[serde(default)]
    pub width_ratio: Option<f64>,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub color: InkColor,
    /// Overrides the job's signature for this placement.
    #[serde(default)]
    pub signature: Option<PathBuf>,
}

/// A page to stamp and where to put the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakeJob {
    pub page: PathBuf,
    pub output: PathBuf,
    pub signature: PathBuf,
    #[serde(default)]
    pub page_index: usize,
    /// Where to write the stamp records as JSON, if anywhere.
    #[serde(default)]
    pub records: Option<PathBuf>,
    #[serde(default)]
    pub confirm_mixed: bool,
    /// Downscale pages larger than the render limit instead of failing.
    #[serde(default)]
    pub fit_to_limit: bool,
    pub placements: Vec<JobPlacement>,
}

impl BakeJob {
    /// Reads a job file and resolves its relative paths.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading job {}", path.display()))?;
        let job: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing job {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(job.resolved_against(base))
    }

    fn resolved_against(mut self, base: &Path) -> Self {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.page);
        resolve(&mut self.output);
        resolve(&mut self.signature);
        if let Some(records) = self.records.as_mut() {
            resolve(records);
        }
        for placement in &mut self.placements {
            if let Some(signature) = placement.signature.as_mut() {
                resolve(signature);
            }
        }
        self
    }
}

/// Writes baked pages as image files and their records as JSON.
#[derive(Debug, Clone)]
pub struct FilePageSink {
    output: PathBuf,
    records: Option<PathBuf>,
}

impl FilePageSink {
    pub fn new(output: PathBuf, records: Option<PathBuf>) -> Self {
        Self { output, records }
    }
}

impl PageSink for FilePageSink {
    fn store_page(
        &self,
        page: usize,
        image: RgbaImage,
        records: Vec<PlacementRecord>,
    ) -> inkstamp_core::Result<()> {
        image.save(&self.output).map_err(|e| {
            inkstamp_core::Error::other(format!("writing {}: {}", self.output.display(), e))
        })?;
        tracing::info!("Wrote page {} to {}", page, self.output.display());

        if let Some(path) = &self.records {
            let json = serde_json::to_string_pretty(&records)
                .map_err(|e| inkstamp_core::Error::other(e.to_string()))?;
            std::fs::write(path, json)?;
            tracing::info!("Wrote {} stamp record(s) to {}", records.len(), path.display());
        }
        Ok(())
    }
}

/// Editor options from the loaded configuration.
pub fn editor_options(config: &Config) -> EditorOptions {
    let placement = &config.placement;
    EditorOptions {
        limits: PlacementLimits {
            min_width_ratio: placement.min_width_ratio,
            max_width_ratio: placement.max_width_ratio,
        },
        default_width_ratio: placement.default_width_ratio,
        stagger_step: placement.stagger_step,
        duplicate_offset: placement.duplicate_offset,
        safe_region_margin: placement.safe_region_margin,
        history_depth: config.history.max_depth,
        handle_tolerance_px: config.render.handle_tolerance_px,
        blend_mode: config.render.blend_mode,
        max_render_edge: config.render.max_render_edge,
    }
}

fn load_signature(path: &Path) -> anyhow::Result<SignatureImage> {
    let image = image::open(path)
        .with_context(|| format!("opening signature {}", path.display()))?
        .to_rgba8();
    Ok(SignatureImage::new(image))
}

/// Runs a job: places the signatures, bakes the page on a worker and writes it.
pub async fn run_job(job: &BakeJob, config: &Config) -> anyhow::Result<BakeOutcome> {
    let mut page_image = image::open(&job.page)
        .with_context(|| format!("opening page {}", job.page.display()))?
        .to_rgba8();
    if job.fit_to_limit {
        page_image = fit_page_to_limit(&page_image, config.render.max_render_edge);
    }

    let index = job.page_index;
    let page = PageRef::new(
        index,
        Size::from_pixels(page_image.width(), page_image.height()),
    );
    let sink = Arc::new(FilePageSink::new(job.output.clone(), job.records.clone()));
    let mut session = EditingSession::new(editor_options(config), sink)
        .with_signature_source(Arc::new(load_signature(&job.signature)?));

    for requested in &job.placements {
        let placement = match &requested.signature {
            Some(path) => session.add_placement(page, load_signature(path)?)?,
            None => session.add_signature(page)?,
        };
        let id = placement.id;
        if let Some(width_ratio) = requested.width_ratio {
            session.mutate(index, id, PlacementField::WidthRatio(width_ratio))?;
        }
        session.mutate(index, id, PlacementField::Center(requested.center))?;
        session.mutate(index, id, PlacementField::Rotation(requested.rotation))?;
        session.mutate(index, id, PlacementField::Color(requested.color))?;
    }

    let pending = session.begin_bake(index, page_image, job.confirm_mixed)?;
    let outcome = session.finish_bake(pending).await?;
    session.close();
    Ok(outcome)
}
