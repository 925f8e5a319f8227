//! The fetch → compress → save → crop pipeline run by the command line tool.
//!
//! A [`WorkflowPlan`] describes the steps as data and [`run_workflow`] drives a
//! [`PhotoSession`] through them. In [`RunMode::Lenient`] every failing step is
//! logged and recorded and the run carries on, which is how the tool behaves
//! by default. [`RunMode::Strict`] stops at the first failure.

use crate::config::DEFAULT_SOURCE_URL;
use crate::error::{AppError, Result};
use crate::image_processing::RelativeRect;
use crate::session::PhotoSession;
use std::path::PathBuf;
use std::str::FromStr;

/// Quality used by the example run.
pub const EXAMPLE_QUALITY: u8 = 50;

/// One crop to cut from the compressed image and save under `label`.
#[derive(Debug, Clone, PartialEq)]
pub struct CropJob {
    pub label: String,
    pub area: RelativeRect,
}

impl CropJob {
    pub fn new(label: impl Into<String>, area: RelativeRect) -> Self {
        Self {
            label: label.into(),
            area,
        }
    }

    /// The three face crops of the example image.
    pub fn example_faces() -> Vec<CropJob> {
        vec![
            CropJob::new("face1", RelativeRect::new(5.0, 55.0, 17.0, 50.0)),
            CropJob::new("face2", RelativeRect::new(0.0, 24.0, 24.0, 8.0)),
            CropJob::new("face3", RelativeRect::new(3.0, 82.0, 10.0, 77.0)),
        ]
    }
}

/// Parses `TOP,RIGHT,BOTTOM,LEFT[@LABEL]`.
///
/// Without a label one is derived from the numbers, e.g. `crop-5-55-17-50`.
impl FromStr for CropJob {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let (numbers, label) = match s.split_once('@') {
            Some((numbers, label)) if !label.trim().is_empty() => {
                (numbers, Some(label.trim().to_string()))
            }
            Some((numbers, _)) => (numbers, None),
            None => (s, None),
        };

        let values = numbers
            .split(',')
            .map(|part| {
                part.trim().parse::<f64>().map_err(|_| {
                    AppError::crop(format!("'{}' is not a percentage in '{}'", part.trim(), s))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        let &[top, right, bottom, left] = values.as_slice() else {
            return Err(AppError::crop(format!(
                "expected TOP,RIGHT,BOTTOM,LEFT, got {} values in '{}'",
                values.len(),
                s
            )));
        };

        let label = label.unwrap_or_else(|| {
            format!(
                "crop-{}-{}-{}-{}",
                label_part(top),
                label_part(right),
                label_part(bottom),
                label_part(left)
            )
        });

        Ok(CropJob::new(label, RelativeRect::new(top, right, bottom, left)))
    }
}

fn label_part(value: f64) -> String {
    value.to_string().replace('.', "_")
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowPlan {
    pub source_url: String,
    /// Prefix prepended verbatim to every output file name.
    pub output_dir: String,
    pub quality: u8,
    /// Round-trip the image through base64 before compressing.
    pub base64_roundtrip: bool,
    pub crops: Vec<CropJob>,
}

impl WorkflowPlan {
    /// The example run: fetch the sample image, round-trip it through base64,
    /// compress at quality 50, save it, then cut and save three faces.
    pub fn example(output_dir: impl Into<String>) -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            output_dir: output_dir.into(),
            quality: EXAMPLE_QUALITY,
            base64_roundtrip: true,
            crops: CropJob::example_faces(),
        }
    }

    fn prefix(&self, label: &str) -> String {
        format!("{}{}-", self.output_dir, label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug)]
pub struct StepFailure {
    pub step: String,
    pub error: AppError,
}

/// Outcome of a workflow run.
#[derive(Debug, Default)]
pub struct WorkflowReport {
    /// Files written, in order.
    pub written: Vec<PathBuf>,
    /// Steps that failed in a lenient run.
    pub failures: Vec<StepFailure>,
}

impl WorkflowReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Runner {
    mode: RunMode,
    report: WorkflowReport,
}

impl Runner {
    fn step<T>(&mut self, step: impl Into<String>, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(error) if self.mode == RunMode::Strict => Err(error),
            Err(error) => {
                let step = step.into();
                log::error!("{} failed: {}", step, error);
                self.report.failures.push(StepFailure { step, error });
                Ok(None)
            }
        }
    }

    fn record(&mut self, written: Option<Option<PathBuf>>) {
        if let Some(Some(path)) = written {
            self.report.written.push(path);
        }
    }
}

/// Runs `plan` against `session`.
///
/// # Errors
///
/// Only in [`RunMode::Strict`]: the first failing step's error.
pub fn run_workflow(
    session: &mut PhotoSession,
    plan: &WorkflowPlan,
    mode: RunMode,
) -> Result<WorkflowReport> {
    let mut runner = Runner {
        mode,
        report: WorkflowReport::default(),
    };

    runner.step("fetch", session.try_fetch(&plan.source_url))?;

    if plan.base64_roundtrip {
        runner.step("to_base64", session.try_to_base64())?;
        runner.step("from_base64", session.try_from_base64())?;
    }

    runner.step("compress", session.try_compress(plan.quality))?;

    let original = runner.step("persist", session.try_persist(&plan.prefix("original")))?;
    runner.record(original);

    for job in &plan.crops {
        log::info!("Cropping {} ({})", job.label, job.area);
        runner.step(
            format!("relative_crop {}", job.label),
            session.try_relative_crop(job.area),
        )?;

        let written = runner.step(
            format!("persist_cropped {}", job.label),
            session.try_persist_cropped(&plan.prefix(&job.label)),
        )?;
        runner.record(written);
    }

    Ok(runner.report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labelled_crop() {
        let job: CropJob = "5,55,17,50@face1".parse().unwrap();
        assert_eq!(job, CropJob::new("face1", RelativeRect::new(5.0, 55.0, 17.0, 50.0)));
    }

    #[test]
    fn derives_label_when_missing() {
        let job: CropJob = " 0, 24.5, 24 ,8 ".parse().unwrap();
        assert_eq!(job.label, "crop-0-24_5-24-8");
        assert_eq!(job.area, RelativeRect::new(0.0, 24.5, 24.0, 8.0));
    }

    #[test]
    fn rejects_wrong_arity() {
        assert!("1,2,3".parse::<CropJob>().is_err());
        assert!("1,2,3,4,5@x".parse::<CropJob>().is_err());
        assert!("a,b,c,d".parse::<CropJob>().is_err());
    }

    #[test]
    fn example_plan_matches_sample_run() {
        let plan = WorkflowPlan::example("/media/out/");
        assert_eq!(plan.quality, 50);
        assert!(plan.base64_roundtrip);
        assert_eq!(plan.crops.len(), 3);
        assert_eq!(plan.prefix("face2"), "/media/out/face2-");
    }

    #[test]
    fn strict_run_stops_at_unreachable_source() {
        let mut plan = WorkflowPlan::example("");
        plan.source_url = "http://127.0.0.1:1/missing.jpg".to_string();

        let mut session = PhotoSession::new("strict");
        let err = run_workflow(&mut session, &plan, RunMode::Strict).unwrap_err();
        assert!(matches!(err, AppError::Network(_) | AppError::HttpStatus { .. }));
    }

    #[test]
    fn lenient_run_records_failures_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut plan = WorkflowPlan::example(format!("{}/", dir.path().display()));
        plan.source_url = "http://127.0.0.1:1/missing.jpg".to_string();

        let mut session = PhotoSession::new("lenient");
        let report = run_workflow(&mut session, &plan, RunMode::Lenient).unwrap();

        assert!(report.written.is_empty());
        assert_eq!(report.failures[0].step, "fetch");
        // Base64 decode of an empty session is the only other failing step.
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[1].step, "from_base64");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
