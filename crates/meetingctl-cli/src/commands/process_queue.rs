use meetingctl_core::domain::Job;
use meetingctl_core::pipeline::{resolve_input_audio, run_processing, ProcessContext};
use meetingctl_core::queue::{process_jobs, FailureMode};

use crate::capabilities;
use crate::config::Config;
use crate::output::CliOutcome;

pub struct ProcessQueueArgs {
    pub max_jobs: usize,
    pub mode: FailureMode,
}

pub async fn run(config: &Config, args: ProcessQueueArgs) -> CliOutcome {
    let transcriber = capabilities::transcriber(config);
    let summarizer = capabilities::summarizer(config);
    let converter = capabilities::converter(config);
    let recordings_root = config.recordings_path.clone();
    let vault_root = config.vault_path.clone();
    let processed_jobs_file = config.processed_jobs_file.clone();

    let handler = |job: Job| {
        let recordings_root = recordings_root.clone();
        let vault_root = vault_root.clone();
        let processed_jobs_file = processed_jobs_file.clone();
        let transcriber = transcriber.as_ref();
        let summarizer = summarizer.as_ref();
        let converter = converter.as_ref();
        async move {
            let audio_path = resolve_input_audio(&job, &recordings_root).map_err(|e| e.to_string())?;
            let ctx = ProcessContext {
                transcript_path: recordings_root.join(format!("{}.txt", job.meeting_id)),
                mp3_path: recordings_root.join(format!("{}.mp3", job.meeting_id)),
                meeting_id: job.meeting_id.clone(),
                note_path: std::path::PathBuf::from(&job.note_path),
                audio_path,
                vault_root,
                recordings_root,
            };
            run_processing(&ctx, transcriber, summarizer, converter, &processed_jobs_file)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        }
    };

    match process_jobs(&config.process_queue_file, Some(&config.process_queue_dead_letter_file), args.max_jobs, args.mode, handler).await {
        Ok(outcome) => CliOutcome::success(
            serde_json::json!({
                "processed_jobs": outcome.processed_jobs,
                "failed_jobs": outcome.failed_jobs,
                "remaining_jobs": outcome.remaining_jobs,
                "failure_reason": outcome.failure_reason,
            }),
            format!(
                "Processed {} job(s), {} failed, {} remaining.",
                outcome.processed_jobs, outcome.failed_jobs, outcome.remaining_jobs
            ),
        ),
        Err(e) => CliOutcome::error(serde_json::json!({"error": e.to_string()}), e.to_string()),
    }
}
