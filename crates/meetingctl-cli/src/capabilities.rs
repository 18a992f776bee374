//! Selects the subprocess or dry-run implementation of each external
//! collaborator per `MEETINGCTL_*_DRY_RUN`.

use meetingctl_core::capability::{
    dry_run::{DryRunConverter, DryRunRecorder, DryRunSummarizer, DryRunTranscriber},
    Converter, Recorder, Summarizer, SubprocessConverter, SubprocessRecorder, SubprocessSummarizer, SubprocessTranscriber,
    Transcriber,
};

use crate::config::Config;

pub fn recorder(config: &Config) -> Box<dyn Recorder> {
    if config.recorder_dry_run {
        Box::new(DryRunRecorder)
    } else {
        Box::new(SubprocessRecorder { binary: config.recorder_bin.clone() })
    }
}

pub fn transcriber(config: &Config) -> Box<dyn Transcriber> {
    if config.transcriber_dry_run {
        Box::new(DryRunTranscriber)
    } else {
        Box::new(SubprocessTranscriber { binary: config.transcriber_bin.clone() })
    }
}

pub fn summarizer(config: &Config) -> Box<dyn Summarizer> {
    if config.summarizer_dry_run {
        Box::new(DryRunSummarizer)
    } else {
        Box::new(SubprocessSummarizer { binary: config.summarizer_bin.clone() })
    }
}

pub fn converter(config: &Config) -> Box<dyn Converter> {
    if config.converter_dry_run {
        Box::new(DryRunConverter)
    } else {
        Box::new(SubprocessConverter { binary: config.converter_bin.clone() })
    }
}
