//! Export payload for submitted form instances.
//!
//! A submitted instance is packaged as `<uuid>.zip` holding a `data.json` document,
//! plus one transmission per media file referenced by its answers.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::response::{clean_value, QuestionResponse};

use super::types::FormInstance;

/// Name of the JSON document inside an exported archive.
pub const DATA_FILE_NAME: &str = "data.json";

/// Device and user details stamped on every export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportContext {
    pub device_id: String,
    pub username: String,
    pub email: String,
}

/// A single answer as it appears in `data.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedResponse {
    pub question_id: String,
    pub answer_type: String,
    pub value: String,
    pub iteration: i32,
}

/// The `data.json` document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInstanceData {
    pub uuid: String,
    pub form_id: String,
    pub data_point_id: Option<String>,
    pub device_id: String,
    pub username: String,
    pub email: String,
    /// Submission time in epoch milliseconds.
    pub submission_date: i64,
    /// Seconds spent filling the form.
    pub duration: i64,
    pub form_version: f64,
    pub responses: Vec<ExportedResponse>,
}

/// Everything needed to write an export archive and queue its transmissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInstanceMetadata {
    pub zip_file_name: String,
    pub form_id: String,
    pub form_instance_data: String,
    pub media_file_names: BTreeSet<String>,
}

impl FormInstanceMetadata {
    pub fn is_valid(&self) -> bool {
        !self.zip_file_name.is_empty()
            && !self.form_id.is_empty()
            && !self.form_instance_data.is_empty()
    }
}

/// Archive name for an instance.
pub fn zip_file_name(instance: &FormInstance) -> String {
    format!("{}.zip", instance.uuid)
}

/// Builds the export payload for a submitted instance.
///
/// Answers without a value are skipped. Media answers contribute their file name to
/// the set of files to transmit alongside the archive.
pub fn build_form_instance_metadata(
    instance: &FormInstance,
    responses: &[QuestionResponse],
    context: &ExportContext,
) -> serde_json::Result<FormInstanceMetadata> {
    let mut media_file_names = BTreeSet::new();
    let mut exported = Vec::with_capacity(responses.len());

    for response in responses.iter().filter(|r| r.included && r.has_value()) {
        if response.response_type.is_media() {
            if let Some(name) = media_file_name(response) {
                media_file_names.insert(name);
            }
        }
        exported.push(ExportedResponse {
            question_id: response.question_id.clone(),
            answer_type: response.response_type.as_str().to_string(),
            value: response.value.clone(),
            iteration: response.iteration,
        });
    }

    let data = FormInstanceData {
        uuid: instance.uuid.to_string(),
        form_id: instance.form_id.clone(),
        data_point_id: instance.data_point_id.clone(),
        device_id: clean_value(&context.device_id),
        username: context.username.clone(),
        email: context.email.clone(),
        submission_date: instance
            .submitted_date
            .or(instance.saved_date)
            .map(|d| d.timestamp_millis())
            .unwrap_or_default(),
        duration: instance.duration_ms / 1000,
        form_version: instance.form_version,
        responses: exported,
    };

    Ok(FormInstanceMetadata {
        zip_file_name: zip_file_name(instance),
        form_id: instance.form_id.clone(),
        form_instance_data: serde_json::to_string(&data)?,
        media_file_names,
    })
}

/// File name of a media answer, stripped of any directory.
fn media_file_name(response: &QuestionResponse) -> Option<String> {
    let path = response.filename.as_deref().unwrap_or(&response.value);
    path.rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::response::ResponseType;

    fn submitted_instance() -> FormInstance {
        let mut instance = FormInstance::new_draft("1001", 3.0).with_data_point("dp-9");
        instance.submitted_date = Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        instance.duration_ms = 95_500;
        instance
    }

    fn context() -> ExportContext {
        ExportContext {
            device_id: "device,1".to_string(),
            username: "enumerator".to_string(),
            email: "e@example.com".to_string(),
        }
    }

    #[test]
    fn test_metadata_is_valid_requires_all_fields() {
        let metadata = FormInstanceMetadata {
            zip_file_name: "a.zip".to_string(),
            form_id: "1".to_string(),
            form_instance_data: "{}".to_string(),
            media_file_names: BTreeSet::new(),
        };
        assert!(metadata.is_valid());

        for broken in [
            FormInstanceMetadata {
                zip_file_name: String::new(),
                ..metadata.clone()
            },
            FormInstanceMetadata {
                form_id: String::new(),
                ..metadata.clone()
            },
            FormInstanceMetadata {
                form_instance_data: String::new(),
                ..metadata.clone()
            },
        ] {
            assert!(!broken.is_valid());
        }
    }

    #[test]
    fn test_build_metadata_skips_empty_answers_and_collects_media() {
        let instance = submitted_instance();
        let responses = vec![
            QuestionResponse::new(1, "q1", ResponseType::Value, "42"),
            QuestionResponse::new(1, "q2", ResponseType::Value, ""),
            QuestionResponse::new(1, "q3", ResponseType::Image, "/sdcard/media/photo.jpg"),
            QuestionResponse::new(1, "q4", ResponseType::Video, "x")
                .with_filename("clip.mp4")
                .with_iteration(2),
        ];

        let metadata = build_form_instance_metadata(&instance, &responses, &context()).unwrap();

        assert!(metadata.is_valid());
        assert_eq!(metadata.zip_file_name, format!("{}.zip", instance.uuid));
        assert_eq!(
            metadata.media_file_names.iter().cloned().collect::<Vec<_>>(),
            vec!["clip.mp4".to_string(), "photo.jpg".to_string()]
        );

        let data: serde_json::Value = serde_json::from_str(&metadata.form_instance_data).unwrap();
        assert_eq!(data["formId"], "1001");
        assert_eq!(data["dataPointId"], "dp-9");
        assert_eq!(data["deviceId"], "device 1");
        assert_eq!(data["duration"], 95);
        assert_eq!(data["submissionDate"], 1_714_564_800_000_i64);
        assert_eq!(data["responses"].as_array().unwrap().len(), 3);
        assert_eq!(data["responses"][2]["iteration"], 2);
        assert_eq!(data["responses"][1]["answerType"], "IMAGE");
    }

    #[test]
    fn test_excluded_answers_are_not_exported() {
        let instance = submitted_instance();
        let responses = vec![QuestionResponse::new(1, "q1", ResponseType::Value, "1").excluded()];

        let metadata = build_form_instance_metadata(&instance, &responses, &context()).unwrap();
        let data: serde_json::Value = serde_json::from_str(&metadata.form_instance_data).unwrap();

        assert!(data["responses"].as_array().unwrap().is_empty());
    }
}
