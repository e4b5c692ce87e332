//! Transcript normalization.
//!
//! Converts raw caption-track content (WebVTT) into continuous plain prose
//! suitable for prompting. Plain-text transcripts pass through unchanged.

use crate::error::{Error, PipelineErrorKind};

/// Normalized output shorter than this is treated as "too short to process".
const MIN_TRANSCRIPT_LEN: usize = 10;

/// Header marker identifying a WebVTT caption track.
const VTT_HEADER: &str = "WEBVTT";

/// Normalizes a raw transcript into continuous plain text.
///
/// If the content carries a WebVTT header the caption structure is stripped:
/// the header line, pure numeric cue index lines, and timestamp-range lines
/// are discarded, and the remaining non-blank lines are joined with single
/// spaces. Content without the caption header passes through unchanged, so
/// normalizing an already-normalized transcript is a no-op.
///
/// Fails with `EmptyTranscript` when the result is too short to process.
pub fn normalize_transcript(raw: &str) -> Result<String, Error> {
    let normalized = if is_caption_track(raw) {
        strip_caption_structure(raw)
    } else {
        raw.to_string()
    };

    if normalized.trim().len() < MIN_TRANSCRIPT_LEN {
        return Err(Error::pipeline(PipelineErrorKind::EmptyTranscript));
    }

    Ok(normalized)
}

fn is_caption_track(raw: &str) -> bool {
    raw.trim_start().starts_with(VTT_HEADER)
}

fn strip_caption_structure(raw: &str) -> String {
    let spoken_lines = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with(VTT_HEADER))
        .filter(|line| !is_cue_index(line))
        .filter(|line| !is_timestamp_range(line));

    // Joining with single spaces also collapses any whitespace runs that
    // spanned caption line breaks.
    spoken_lines
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A cue index is a line consisting solely of digits.
fn is_cue_index(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

/// Timestamp-range lines contain the WebVTT time-range marker.
fn is_timestamp_range(line: &str) -> bool {
    line.contains("-->")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainErrorKind;

    #[test]
    fn strips_vtt_caption_structure() {
        let raw = "WEBVTT\n\n1\n00:00:01.000 --> 00:00:02.000\nHello world\n";
        assert_eq!(normalize_transcript(raw).unwrap(), "Hello world");
    }

    #[test]
    fn joins_multiple_cues_with_single_spaces() {
        let raw = "WEBVTT\n\n1\n00:00:01.000 --> 00:00:02.000\nJohn: I will send\n\
                   the report\n\n2\n00:00:03.000 --> 00:00:05.000\nby Friday.\n";
        assert_eq!(
            normalize_transcript(raw).unwrap(),
            "John: I will send the report by Friday."
        );
    }

    #[test]
    fn plain_text_passes_through_unchanged() {
        let raw = "John: I will send the report by Friday.";
        assert_eq!(normalize_transcript(raw).unwrap(), raw);
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = "WEBVTT\n\n1\n00:00:01.000 --> 00:00:02.000\nHello world again\n";
        let once = normalize_transcript(raw).unwrap();
        let twice = normalize_transcript(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn too_short_content_is_rejected() {
        let err = normalize_transcript("hi").unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Pipeline(PipelineErrorKind::EmptyTranscript)
        );
    }

    #[test]
    fn caption_track_with_no_spoken_lines_is_rejected() {
        let raw = "WEBVTT\n\n1\n00:00:01.000 --> 00:00:02.000\n";
        let err = normalize_transcript(raw).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Pipeline(PipelineErrorKind::EmptyTranscript)
        );
    }
}
