use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::form::{FormInstance, FormInstanceStatus};
use crate::response::{CompoundId, QuestionResponse, ResponseType};
use crate::serde::{
    deserialize_lenient_f64, deserialize_optional_string, deserialize_string_list,
    deserialize_string_or_number,
};

/// One page of assigned data points.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DataPointPage {
    #[serde(default, rename = "dataPointData")]
    pub data_points: Vec<ApiDataPoint>,
    /// Cursor for the next page. Absent once the server has nothing newer.
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub cursor: Option<String>,
}

/// A data point as served by the data point endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDataPoint {
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub id: String,
    pub survey_group_id: i64,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub longitude: Option<f64>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub last_modified: i64,
    #[serde(default)]
    pub survey_instances: Vec<ApiFormInstance>,
}

/// A form instance attached to a downloaded data point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFormInstance {
    pub uuid: String,
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub survey_id: String,
    #[serde(default)]
    pub submitter: Option<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub collection_date: i64,
    #[serde(default)]
    pub form_version: f64,
    #[serde(default, rename = "qasList")]
    pub responses: Vec<ApiQuestionAnswer>,
}

/// A single answer of a downloaded form instance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiQuestionAnswer {
    #[serde(rename = "q", deserialize_with = "deserialize_string_or_number")]
    pub question_id: String,
    #[serde(rename = "a", default)]
    pub answer: String,
    #[serde(rename = "t", default)]
    pub answer_type: String,
    #[serde(rename = "i", default)]
    pub iteration: i32,
}

/// A monitored entity that anchors form instances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    pub id: String,
    pub survey_group_id: i64,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub last_modified: DateTime<Utc>,
}

fn from_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
}

impl From<&ApiDataPoint> for DataPoint {
    fn from(api: &ApiDataPoint) -> Self {
        Self {
            id: api.id.clone(),
            survey_group_id: api.survey_group_id,
            name: api.display_name.clone().unwrap_or_default(),
            latitude: api.latitude,
            longitude: api.longitude,
            last_modified: from_millis(api.last_modified),
        }
    }
}

impl ApiFormInstance {
    /// Local record for this instance, owned by `data_point_id`.
    ///
    /// Instances with a malformed uuid get a fresh one so they can still be stored.
    pub fn to_form_instance(&self, data_point_id: &str) -> FormInstance {
        let collected = from_millis(self.collection_date);
        FormInstance {
            id: None,
            uuid: Uuid::parse_str(&self.uuid).unwrap_or_else(|_| Uuid::new_v4()),
            form_id: self.survey_id.clone(),
            data_point_id: Some(data_point_id.to_string()),
            form_version: self.form_version,
            user_id: None,
            status: FormInstanceStatus::Downloaded,
            start_date: Some(collected),
            saved_date: Some(collected),
            submitted_date: Some(collected),
            duration_ms: 0,
            submitter: self.submitter.clone(),
        }
    }

    /// Answers of this instance. The owning row id is assigned on insert.
    pub fn to_responses(&self) -> Vec<QuestionResponse> {
        self.responses
            .iter()
            .map(|qa| {
                let compound = CompoundId::parse(&qa.question_id);
                let iteration = if qa.iteration > 0 {
                    qa.iteration
                } else {
                    compound.iteration.max(0)
                };
                QuestionResponse::new(
                    0,
                    compound.base,
                    ResponseType::parse(&qa.answer_type),
                    qa.answer.clone(),
                )
                .with_iteration(iteration)
            })
            .collect()
    }

    /// File names of image answers, to be fetched into the media directory.
    pub fn image_file_names(&self) -> Vec<String> {
        self.responses
            .iter()
            .filter(|qa| ResponseType::parse(&qa.answer_type) == ResponseType::Image)
            .filter_map(|qa| image_file_name(&qa.answer))
            .collect()
    }
}

/// Device notification: uploads the server never received and forms it withdrew.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFiles {
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub missing_files: Vec<String>,
    /// Files the server cannot attribute to a form instance.
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub missing_unknown: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub deleted_forms: Vec<String>,
}

impl PendingFiles {
    /// Names of every missing file, stripped of any directory.
    pub fn missing_file_names(&self) -> BTreeSet<String> {
        self.missing_files
            .iter()
            .chain(&self.missing_unknown)
            .filter_map(|path| image_file_name(path))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.missing_files.is_empty()
            && self.missing_unknown.is_empty()
            && self.deleted_forms.is_empty()
    }
}

/// Extracts the file name from an image answer.
///
/// Answers are either a plain path or a JSON object with a `filename` field.
pub fn image_file_name(answer: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ImageValue {
        filename: String,
    }

    let path = serde_json::from_str::<ImageValue>(answer)
        .map(|v| v.filename)
        .unwrap_or_else(|_| answer.to_string());
    path.rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
