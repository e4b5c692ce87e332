use domain::Id;
use serde::Deserialize;
use utoipa::ToSchema;

/// Request body for direct transcript submission.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExtractTasksParams {
    /// Meeting the transcript belongs to. Must be owned by the caller.
    #[schema(value_type = String, format = Uuid)]
    pub(crate) meeting_id: Id,
    pub(crate) transcript: String,
    /// When set, extraction runs in full but nothing is persisted.
    #[serde(default, alias = "dry_run")]
    pub(crate) dry_run: bool,
}

/// Request body for recording-based extraction.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ZoomExtractParams {
    /// Zoom's numeric meeting id, as a string.
    pub(crate) zoom_meeting_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_defaults_to_false_and_accepts_both_spellings() {
        let id = Id::new_v4();

        let plain: ExtractTasksParams = serde_json::from_str(&format!(
            r#"{{"meetingId":"{id}","transcript":"hello"}}"#
        ))
        .unwrap();
        assert!(!plain.dry_run);

        let snake: ExtractTasksParams = serde_json::from_str(&format!(
            r#"{{"meetingId":"{id}","transcript":"hello","dry_run":true}}"#
        ))
        .unwrap();
        assert!(snake.dry_run);

        let camel: ExtractTasksParams = serde_json::from_str(&format!(
            r#"{{"meetingId":"{id}","transcript":"hello","dryRun":true}}"#
        ))
        .unwrap();
        assert!(camel.dry_run);
    }
}
