//! Submission handling: provisional run, media copy, evaluation,
//! finalize-or-discard.

use crate::auth::SessionContext;
use crate::errors::SubmitError;
use crate::eval::EvalTool;
use crate::fingerprint;
use crate::media::MediaStore;
use crate::model::Run;
use crate::storage::{NewRun, Store};
use crate::validate::ValidRun;
use anyhow::anyhow;
use chrono::Utc;

pub struct SubmissionService {
    store: Store,
    media: MediaStore,
    tool: EvalTool,
}

impl SubmissionService {
    pub fn new(store: Store, media: MediaStore, tool: EvalTool) -> Self {
        Self { store, media, tool }
    }

    /// Submit a run for a task on behalf of the session's researcher.
    ///
    /// The run row exists provisionally while the external tool evaluates
    /// the stored file; on any evaluation failure the row and the stored
    /// file are discarded, so no partially scored run survives.
    pub fn submit(
        &self,
        session: &SessionContext,
        task_id: i64,
        run: &ValidRun,
    ) -> Result<Run, SubmitError> {
        let task = self
            .store
            .task_by_id(task_id)?
            .ok_or(SubmitError::UnknownTask(task_id))?;

        let run_id = self.store.insert_provisional_run(&NewRun {
            researcher_id: session.researcher.id,
            task_id: task.id,
            name: run.name.clone(),
            description: run.description.clone(),
            run_type: run.run_type,
            query_type: run.query_type,
            feedback_type: run.feedback_type,
            submitted_at: Utc::now(),
        })?;

        let stored = match self.media.store_results(run_id, &run.results_file) {
            Ok(path) => path,
            Err(e) => {
                self.discard(run_id);
                return Err(SubmitError::Media(e));
            }
        };
        let sha256 = match fingerprint::sha256_file(&stored) {
            Ok(sha) => sha,
            Err(e) => {
                self.discard(run_id);
                return Err(SubmitError::Media(e));
            }
        };
        self.store.set_run_results_file(run_id, &stored, &sha256)?;

        match self.tool.evaluate(&task.judgement_file, &stored) {
            Ok(scores) => {
                self.store.finalize_run_scores(run_id, scores)?;
                tracing::info!(
                    run_id,
                    map = scores.map,
                    p10 = scores.p10,
                    p20 = scores.p20,
                    "run evaluated"
                );
                self.store
                    .run_by_id(run_id)?
                    .ok_or_else(|| SubmitError::Store(anyhow!("run {run_id} vanished")))
            }
            Err(err) => {
                tracing::warn!(run_id, error = %err, "evaluation failed, discarding run");
                self.discard(run_id);
                Err(SubmitError::Evaluation(err))
            }
        }
    }

    fn discard(&self, run_id: i64) {
        if let Err(e) = self.store.delete_run(run_id) {
            tracing::error!(run_id, error = %e, "failed to delete provisional run");
        }
        if let Err(e) = self.media.remove_results(run_id) {
            tracing::error!(run_id, error = %e, "failed to remove stored results");
        }
    }
}
