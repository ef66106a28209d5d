// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion pipeline — runs one assembly job as a sequence of observable
// phases.
//
//   Idle -> Reading -> Finalizing -> Done
//              \            \
//               +------------+--> Error
//
// Done and Error hold until `reset`. The pipeline owns at most one job; a job
// that is still reading or finalizing when `start` is called again is
// discarded, and any future that was driving it is simply dropped by its
// caller. The byte stream of a finished job lives in the shared `BlobStore`
// and is revoked on `reset`, on `cancel`, or when the pipeline is dropped.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pagewright_core::blob::{BlobHandle, BlobStore};
use pagewright_core::error::{PagewrightError, Result};
use pagewright_core::human_errors::{HumanError, humanize_error};
use pagewright_core::types::{JobId, JobPhase, Operation};
use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::assembly::AssemblyEngine;
use crate::source::{AdaptedSource, InputFile, SourceAdapter};

/// The artifact of a finished job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// Handle of the document bytes in the pipeline's blob store.
    pub handle: BlobHandle,
    pub page_count: usize,
    pub byte_len: usize,
    /// Hex-encoded SHA-256 of the document bytes.
    pub sha256: String,
    /// File name to offer when the result is saved.
    pub suggested_name: String,
}

/// One conversion job and everything it has produced so far.
#[derive(Debug)]
pub struct ConversionJob {
    pub id: JobId,
    pub operation: Operation,
    pub phase: JobPhase,
    pub inputs: Vec<InputFile>,
    /// Sources adapted so far, in input order.
    staged: Vec<AdaptedSource>,
    pub result: Option<ConversionResult>,
    pub error: Option<String>,
    pub human_error: Option<HumanError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversionJob {
    fn new(operation: Operation, inputs: Vec<InputFile>) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            operation,
            phase: JobPhase::Reading,
            inputs,
            staged: Vec::new(),
            result: None,
            error: None,
            human_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Number of inputs the adapters have finished with.
    pub fn inputs_read(&self) -> usize {
        self.staged.len()
    }
}

pub struct ConversionPipeline {
    adapter: Arc<SourceAdapter>,
    engine: Arc<AssemblyEngine>,
    blobs: BlobStore,
    job: Option<ConversionJob>,
    phase_tx: watch::Sender<JobPhase>,
}

impl ConversionPipeline {
    pub fn new(adapter: SourceAdapter, engine: AssemblyEngine, blobs: BlobStore) -> Self {
        let (phase_tx, _) = watch::channel(JobPhase::Idle);
        Self {
            adapter: Arc::new(adapter),
            engine: Arc::new(engine),
            blobs,
            job: None,
            phase_tx,
        }
    }

    /// Receive every phase transition as it happens.
    pub fn subscribe(&self) -> watch::Receiver<JobPhase> {
        self.phase_tx.subscribe()
    }

    pub fn phase(&self) -> JobPhase {
        self.job.as_ref().map_or(JobPhase::Idle, |job| job.phase)
    }

    pub fn job(&self) -> Option<&ConversionJob> {
        self.job.as_ref()
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    // -- Lifecycle ------------------------------------------------------------

    /// Begin a new job in the `Reading` phase.
    ///
    /// An unfinished job is discarded first. A finished or failed job must be
    /// acknowledged with [`reset`](Self::reset) before another can start.
    #[instrument(skip(self, inputs), fields(inputs = inputs.len()))]
    pub fn start(&mut self, operation: Operation, inputs: Vec<InputFile>) -> Result<JobId> {
        if let Some(job) = &self.job {
            if job.phase.is_terminal() {
                return Err(PagewrightError::PipelineBusy);
            }
            warn!(job_id = %job.id, phase = ?job.phase, "discarding unfinished job");
            self.discard();
        }

        if !operation.assembles() {
            return Err(PagewrightError::InvalidInput(format!(
                "{} does not run a conversion",
                operation.display_name()
            )));
        }
        AssemblyEngine::validate_input_count(operation, inputs.len())?;

        let job = ConversionJob::new(operation, inputs);
        let id = job.id;
        info!(job_id = %id, ?operation, "conversion job started");
        self.job = Some(job);
        self.publish(JobPhase::Reading);
        Ok(id)
    }

    /// Run every input through the source adapter, strictly in input order.
    #[instrument(skip(self))]
    pub async fn read_inputs(&mut self) -> Result<()> {
        let (operation, inputs) = match &self.job {
            Some(job) if job.phase == JobPhase::Reading => (job.operation, job.inputs.clone()),
            _ => return Err(PagewrightError::NoActiveJob),
        };

        let mut staged = Vec::with_capacity(inputs.len());
        for input in inputs {
            let adapter = Arc::clone(&self.adapter);
            let name = input.name.clone();
            let adapted = tokio::task::spawn_blocking(move || adapter.adapt(&input, operation))
                .await
                .map_err(|err| {
                    PagewrightError::InvalidInput(format!("reading {name} was aborted: {err}"))
                })
                .and_then(|result| result);

            match adapted {
                Ok(source) => {
                    debug!(name = %source.name, kind = ?source.kind, "input staged");
                    staged.push(source);
                }
                Err(err) => return Err(self.fail(err)),
            }
        }

        if let Some(job) = self.job.as_mut() {
            job.staged = staged;
            job.updated_at = Utc::now();
        }
        Ok(())
    }

    /// Assemble the staged sources and store the finished document.
    #[instrument(skip(self))]
    pub async fn finalize(&mut self) -> Result<ConversionResult> {
        let (operation, sources) = match self.job.as_mut() {
            Some(job) if job.phase == JobPhase::Reading && job.staged.len() == job.inputs.len() => {
                (job.operation, std::mem::take(&mut job.staged))
            }
            Some(job) if job.phase == JobPhase::Reading => {
                return Err(PagewrightError::InvalidInput(format!(
                    "only {} of {} inputs have been read",
                    job.inputs_read(),
                    job.inputs.len()
                )));
            }
            _ => return Err(PagewrightError::NoActiveJob),
        };
        self.set_phase(JobPhase::Finalizing);

        let engine = Arc::clone(&self.engine);
        let assembled = tokio::task::spawn_blocking(move || engine.assemble(operation, sources))
            .await
            .map_err(|err| PagewrightError::Pdf(format!("assembly was aborted: {err}")))
            .and_then(|result| result);

        let output = match assembled {
            Ok(output) => output,
            Err(err) => return Err(self.fail(err)),
        };

        let sha256 = hex::encode(Sha256::digest(&output.bytes));
        let byte_len = output.bytes.len();
        let handle = self.blobs.create(output.bytes);
        let result = ConversionResult {
            handle,
            page_count: output.page_count,
            byte_len,
            sha256,
            suggested_name: format!("pagewright_{}.pdf", Utc::now().timestamp_millis()),
        };

        if let Some(job) = self.job.as_mut() {
            job.result = Some(result.clone());
        }
        self.set_phase(JobPhase::Done);
        info!(%handle, pages = result.page_count, bytes = byte_len, "conversion job done");
        Ok(result)
    }

    /// Start a job and drive it to a terminal phase.
    pub async fn run(
        &mut self,
        operation: Operation,
        inputs: Vec<InputFile>,
    ) -> Result<ConversionResult> {
        self.start(operation, inputs)?;
        self.read_inputs().await?;
        self.finalize().await
    }

    /// Abandon a job that is still reading or finalizing. Nothing it produced
    /// survives.
    #[instrument(skip(self))]
    pub fn cancel(&mut self) -> Result<()> {
        match &self.job {
            Some(job) if job.phase.is_active() => {
                info!(job_id = %job.id, phase = ?job.phase, "conversion job cancelled");
                self.discard();
                Ok(())
            }
            _ => Err(PagewrightError::NoActiveJob),
        }
    }

    /// Acknowledge the current job and return to `Idle`, revoking its result.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        if let Some(job) = &self.job {
            debug!(job_id = %job.id, phase = ?job.phase, "conversion job reset");
        }
        self.discard();
    }

    // -- Internals ------------------------------------------------------------

    fn discard(&mut self) {
        if let Some(result) = self.job.take().and_then(|job| job.result) {
            self.blobs.revoke(&result.handle);
        }
        self.publish(JobPhase::Idle);
    }

    fn fail(&mut self, err: PagewrightError) -> PagewrightError {
        if let Some(job) = self.job.as_mut() {
            warn!(job_id = %job.id, phase = ?job.phase, %err, "conversion job failed");
            job.staged.clear();
            job.error = Some(err.to_string());
            job.human_error = Some(humanize_error(&err));
        }
        self.set_phase(JobPhase::Error);
        err
    }

    fn set_phase(&mut self, phase: JobPhase) {
        if let Some(job) = self.job.as_mut() {
            job.phase = phase;
            job.updated_at = Utc::now();
        }
        self.publish(phase);
    }

    fn publish(&self, phase: JobPhase) {
        self.phase_tx.send_replace(phase);
    }
}

impl Drop for ConversionPipeline {
    fn drop(&mut self) {
        if let Some(result) = self.job.as_ref().and_then(|job| job.result.as_ref()) {
            self.blobs.revoke(&result.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::pdf::reader::PdfReader;
    use crate::pdf::reader::tests::fixture_pdf;
    use pagewright_bridge::{Collaborators, TextExtractor};

    struct SlowExtractor;

    impl TextExtractor for SlowExtractor {
        fn name(&self) -> &str {
            "slow"
        }

        fn extract_text(&self, _bytes: &[u8]) -> Result<String> {
            std::thread::sleep(Duration::from_millis(300));
            Ok("slowly extracted".into())
        }
    }

    fn pipeline() -> ConversionPipeline {
        let adapter =
            SourceAdapter::new(Collaborators::default().with_text(Arc::new(SlowExtractor)));
        ConversionPipeline::new(adapter, AssemblyEngine::default(), BlobStore::new())
    }

    fn text(name: &str, body: &str) -> InputFile {
        InputFile::new(name, Some("text/plain"), body.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn run_reaches_done_with_a_stored_result() {
        let mut pipeline = pipeline();
        let result = pipeline
            .run(Operation::Text, vec![text("a.txt", "hello\nworld")])
            .await
            .unwrap();

        assert_eq!(pipeline.phase(), JobPhase::Done);
        assert_eq!(result.page_count, 1);
        assert_eq!(result.sha256.len(), 64);
        assert!(result.suggested_name.starts_with("pagewright_"));

        let bytes = pipeline.blobs().get(&result.handle).unwrap();
        assert_eq!(bytes.len(), result.byte_len);
        assert_eq!(PdfReader::from_bytes(&bytes).unwrap().page_count(), 1);
    }

    #[tokio::test]
    async fn phases_are_published_in_order() {
        let mut pipeline = pipeline();
        let mut phases = pipeline.subscribe();
        assert_eq!(*phases.borrow_and_update(), JobPhase::Idle);

        pipeline
            .start(Operation::Text, vec![text("a.txt", "x")])
            .unwrap();
        assert_eq!(*phases.borrow_and_update(), JobPhase::Reading);

        pipeline.read_inputs().await.unwrap();
        pipeline.finalize().await.unwrap();
        assert!(phases.has_changed().unwrap());
        assert_eq!(*phases.borrow_and_update(), JobPhase::Done);

        pipeline.reset();
        assert_eq!(*phases.borrow_and_update(), JobPhase::Idle);
    }

    #[tokio::test]
    async fn terminal_job_must_be_reset_before_the_next() {
        let mut pipeline = pipeline();
        let result = pipeline
            .run(Operation::Text, vec![text("a.txt", "x")])
            .await
            .unwrap();

        let err = pipeline
            .start(Operation::Text, vec![text("b.txt", "y")])
            .unwrap_err();
        assert!(matches!(err, PagewrightError::PipelineBusy));

        pipeline.reset();
        assert_eq!(pipeline.phase(), JobPhase::Idle);
        assert!(!pipeline.blobs().contains(&result.handle));
        assert!(pipeline.start(Operation::Text, vec![text("b.txt", "y")]).is_ok());
    }

    #[tokio::test]
    async fn corrupt_merge_input_fails_the_whole_job() {
        let mut pipeline = pipeline();
        let inputs = vec![
            InputFile::new("good.pdf", None, fixture_pdf(&["1"])),
            InputFile::new("bad.pdf", None, b"%PDF-garbage".to_vec()),
        ];
        let err = pipeline.run(Operation::Merge, inputs).await.unwrap_err();

        assert!(matches!(err, PagewrightError::CorruptInput(_)));
        assert_eq!(pipeline.phase(), JobPhase::Error);
        let job = pipeline.job().unwrap();
        assert!(job.result.is_none());
        assert!(job.human_error.as_ref().is_some_and(|h| h.retriable));
        assert_eq!(pipeline.blobs().live_count(), 0);
    }

    #[tokio::test]
    async fn empty_output_fails_the_job_while_finalizing() {
        let mut pipeline = pipeline();
        let mut phases = pipeline.subscribe();
        pipeline
            .start(
                Operation::Merge,
                vec![InputFile::new("empty.pdf", None, fixture_pdf(&[]))],
            )
            .unwrap();
        pipeline.read_inputs().await.unwrap();
        assert_eq!(pipeline.job().unwrap().inputs_read(), 1);

        let err = pipeline.finalize().await.unwrap_err();
        assert!(matches!(err, PagewrightError::EmptyOutput));
        assert_eq!(pipeline.phase(), JobPhase::Error);
        assert!(phases.has_changed().unwrap());
        assert_eq!(*phases.borrow_and_update(), JobPhase::Error);

        let job = pipeline.job().unwrap();
        assert!(job.result.is_none());
        assert!(job.human_error.is_some());
        assert_eq!(pipeline.blobs().live_count(), 0);

        let busy = pipeline
            .start(Operation::Text, vec![text("next.txt", "z")])
            .unwrap_err();
        assert!(matches!(busy, PagewrightError::PipelineBusy));

        pipeline.reset();
        assert!(pipeline.start(Operation::Text, vec![text("next.txt", "z")]).is_ok());
    }

    #[tokio::test]
    async fn new_job_discards_one_still_reading() {
        let mut pipeline = pipeline();
        let slow = InputFile::new("slow.docx", None, b"PK".to_vec());

        let timed_out = tokio::time::timeout(
            Duration::from_millis(20),
            pipeline.run(Operation::Word, vec![slow]),
        )
        .await;
        assert!(timed_out.is_err());
        assert_eq!(pipeline.phase(), JobPhase::Reading);
        let abandoned = pipeline.job().map(|job| job.id).unwrap();

        let result = pipeline
            .run(Operation::Text, vec![text("fast.txt", "fast")])
            .await
            .unwrap();

        let job = pipeline.job().unwrap();
        assert_ne!(job.id, abandoned);
        assert_eq!(job.phase, JobPhase::Done);
        assert_eq!(job.result.as_ref(), Some(&result));
        assert_eq!(pipeline.blobs().live_count(), 1);
    }

    #[tokio::test]
    async fn cancel_returns_to_idle_without_output() {
        let mut pipeline = pipeline();
        assert!(matches!(pipeline.cancel(), Err(PagewrightError::NoActiveJob)));

        pipeline
            .start(Operation::Text, vec![text("a.txt", "x")])
            .unwrap();
        pipeline.read_inputs().await.unwrap();
        pipeline.cancel().unwrap();

        assert_eq!(pipeline.phase(), JobPhase::Idle);
        assert!(pipeline.job().is_none());
        assert!(matches!(
            pipeline.finalize().await,
            Err(PagewrightError::NoActiveJob)
        ));
        assert_eq!(pipeline.blobs().live_count(), 0);
    }

    #[tokio::test]
    async fn dropping_the_pipeline_revokes_its_result() {
        let blobs = BlobStore::new();
        {
            let mut pipeline =
                ConversionPipeline::new(SourceAdapter::default(), AssemblyEngine::default(), blobs.clone());
            pipeline
                .run(Operation::Text, vec![text("a.txt", "x")])
                .await
                .unwrap();
            assert_eq!(blobs.live_count(), 1);
        }
        assert_eq!(blobs.live_count(), 0);
    }

    #[test]
    fn view_is_not_a_conversion() {
        let mut pipeline = pipeline();
        let err = pipeline
            .start(Operation::View, vec![InputFile::new("a.pdf", None, Vec::new())])
            .unwrap_err();
        assert!(matches!(err, PagewrightError::InvalidInput(_)));
        assert_eq!(pipeline.phase(), JobPhase::Idle);
    }
}
