//! Command handlers wiring the use cases to their collaborators.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use flowsync_client::{DeviceIdentity, FlowClient, HmacRequestSigner, S3ProxyStore, S3Store};
use flowsync_core::cascade::CascadeNode;
use flowsync_core::form::{ExportContext, FormInstance, InstalledForm};
use flowsync_core::response::{
    group_repetitions, sanitize_value, GroupRepetition, QuestionResponse,
    RepeatableGroupIterations, ResponseType,
};
use flowsync_core::storage::{
    DataPointRepository, FormInstanceRepository, FormRepository, ResponseRepository,
};
use flowsync_core::sync::{image_file_name, DataPoint, DownloadResult, ObjectStore};
use serde::Serialize;
use uuid::Uuid;

use crate::bootstrap::{BootstrapProcessor, BundleOutcome};
use crate::cascade::{CascadeLoad, CascadeResolver, FormResourceBrowser};
use crate::config::Config;
use crate::forms::{FormUpdater, InstallReport};
use crate::scope::TaskScope;
use crate::storage::SqliteStore;
use crate::sync::{DataPointDataRepository, DownloadDataPoints, TcpConnectivity};
use crate::transmission::{ExportReport, TransmissionManager, UploadSummary};

/// Result of `sync forms`.
#[derive(Debug, Serialize)]
pub struct FormsSync {
    pub report: InstallReport,
    /// Forms with a version the user has not been told about.
    pub updated: Vec<InstalledForm>,
}

#[derive(Debug, Serialize)]
pub struct CascadeChildren {
    pub parent: i64,
    pub outcome: CascadeLoad,
    pub children: Vec<CascadeNode>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct NewRepetition {
    pub iteration: i32,
    /// Zero-based display position.
    pub position: usize,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct DeletedRepetition {
    pub iteration: i32,
    pub removed: usize,
    pub remaining: usize,
}

/// Form instance an answer is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerTarget {
    Instance(i64),
    /// A new draft of an installed form, created with the first answer.
    NewDraft {
        form_id: String,
        data_point: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct Answer {
    /// Question id, optionally suffixed with `|<iteration>`.
    pub question: String,
    pub response_type: ResponseType,
    pub value: String,
    /// Also store the answer as the data point's display name.
    pub names_data_point: bool,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct SavedAnswer {
    pub instance: i64,
    pub created: bool,
    pub question: String,
    pub value: String,
    pub data_point_name: Option<String>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct SubmittedInstance {
    pub instance: i64,
    pub uuid: Uuid,
    pub duration_ms: i64,
}

pub async fn open_store(config: &Config) -> Result<Arc<SqliteStore>> {
    config
        .ensure_dirs()
        .with_context(|| format!("Failed to create data directories under {}", config.data_dir.display()))?;
    let store = SqliteStore::new(&config.sqlite_path)
        .await
        .with_context(|| format!("Failed to open database at {}", config.sqlite_path))?;
    Ok(Arc::new(store))
}

pub fn flow_client(config: &Config) -> Arc<FlowClient> {
    let device = DeviceIdentity {
        android_id: config.android_id.clone(),
        device_id: config.device_id.clone(),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        ..DeviceIdentity::default()
    };
    Arc::new(FlowClient::new(&config.server_url, &config.api_key, device))
}

/// Signed bucket access when a bucket is configured, the storage proxy otherwise.
pub fn object_store(config: &Config) -> Arc<dyn ObjectStore> {
    match (config.s3_endpoint(), &config.s3_bucket) {
        (Some(endpoint), Some(bucket)) => {
            tracing::debug!(bucket = %bucket, "Using signed bucket storage");
            let signer = HmacRequestSigner::new(&config.s3_access_key, &config.s3_secret_key);
            Arc::new(S3Store::new(endpoint, bucket, Arc::new(signer)))
        }
        _ => Arc::new(S3ProxyStore::new(&config.s3_proxy_url, &config.instance)),
    }
}

pub async fn sync_datapoints(config: &Config, survey: Option<i64>) -> Result<DownloadResult> {
    let store = open_store(config).await?;
    let repository = DataPointDataRepository::new(
        flow_client(config),
        store,
        object_store(config),
        config.media_dir(),
    );
    let use_case = DownloadDataPoints::new(Arc::new(TcpConnectivity::new(&config.server_url)), repository);
    Ok(use_case.execute(survey).await?)
}

/// Installs form updates and takes the list of versions to announce.
///
/// With a form id only that form is checked.
pub async fn sync_forms(config: &Config, form: Option<&str>) -> Result<FormsSync> {
    let store = open_store(config).await?;
    let updater = FormUpdater::new(
        flow_client(config),
        store,
        object_store(config),
        config.forms_dir(),
        config.resources_dir(),
    );
    let report = match form {
        Some(form_id) => updater
            .update_form(form_id)
            .await
            .with_context(|| format!("Failed to update form {form_id}"))?,
        None => updater
            .install_updates()
            .await
            .context("Failed to update forms")?,
    };
    let updated = updater.forms_needing_notification().await?;
    updater.mark_notified(&updated).await?;
    Ok(FormsSync { report, updated })
}

fn transmission_manager(config: &Config, store: Arc<SqliteStore>, context: ExportContext) -> TransmissionManager {
    TransmissionManager::new(
        store,
        flow_client(config),
        object_store(config),
        context,
        config.outbox_dir(),
        config.media_dir(),
    )
    .with_concurrency(config.upload_concurrency)
}

pub async fn export(config: &Config, username: String, email: String) -> Result<ExportReport> {
    let store = open_store(config).await?;
    let context = ExportContext {
        device_id: config.device_id.clone(),
        username,
        email,
    };
    Ok(transmission_manager(config, store, context)
        .export_submitted()
        .await?)
}

pub async fn upload(config: &Config) -> Result<UploadSummary> {
    let store = open_store(config).await?;
    Ok(transmission_manager(config, store, ExportContext::default())
        .sync_transmissions()
        .await?)
}

pub async fn bootstrap(config: &Config) -> Result<Vec<BundleOutcome>> {
    let store = open_store(config).await?;
    let processor = BootstrapProcessor::new(
        store,
        config.instance.clone(),
        config.bootstrap_dir(),
        config.forms_dir(),
        config.resources_dir(),
    );
    processor
        .process()
        .await
        .context("Failed to process bootstrap bundles")
}

/// Loads a cascade resource in a task scope and lists one level of it.
pub async fn cascade_children(config: &Config, src: String, parent: i64) -> Result<CascadeChildren> {
    let resolver = Arc::new(CascadeResolver::new(Arc::new(FormResourceBrowser::new(
        config.resources_dir(),
    ))));

    let mut scope = TaskScope::new();
    let loader = resolver.clone();
    scope.spawn(async move { loader.load_cascade_data(&src).await });
    let Some(outcome) = scope.next().await else {
        bail!("Cascade load was cancelled");
    };

    Ok(CascadeChildren {
        parent,
        children: resolver.load_values_for_parent(Some(parent)),
        outcome,
    })
}

async fn load_iterations<S: ResponseRepository + ?Sized>(
    store: &S,
    instance: i64,
    questions: &HashSet<String>,
) -> Result<(RepeatableGroupIterations, Vec<QuestionResponse>)> {
    let responses = store
        .get_responses(instance)
        .await
        .with_context(|| format!("Failed to load responses of form instance {instance}"))?;
    let mut iterations = RepeatableGroupIterations::new();
    iterations.load_ids(questions, &responses);
    Ok((iterations, responses))
}

pub async fn list_repetitions<S: ResponseRepository + ?Sized>(
    store: &S,
    instance: i64,
    questions: &[String],
) -> Result<Vec<GroupRepetition>> {
    let group: HashSet<String> = questions.iter().cloned().collect();
    let (iterations, responses) = load_iterations(store, instance, &group).await?;
    Ok(group_repetitions(&iterations, &group, &responses))
}

pub async fn add_repetition<S: ResponseRepository + ?Sized>(
    store: &S,
    instance: i64,
    questions: &[String],
) -> Result<NewRepetition> {
    let group: HashSet<String> = questions.iter().cloned().collect();
    let (mut iterations, _) = load_iterations(store, instance, &group).await?;
    let iteration = iterations.next_iteration();
    Ok(NewRepetition {
        iteration,
        position: iterations.len() - 1,
    })
}

/// Deletes one repetition of a draft.
pub async fn delete_repetition<S>(
    store: &S,
    instance: i64,
    questions: &[String],
    iteration: i32,
) -> Result<DeletedRepetition>
where
    S: FormInstanceRepository + ResponseRepository + ?Sized,
{
    let Some(form_instance) = store.get_form_instance(instance).await? else {
        bail!("Form instance {instance} not found");
    };
    if !form_instance.status.is_editable() {
        bail!(
            "Form instance {instance} is {} and can no longer be edited",
            form_instance.status.as_str()
        );
    }

    let removed = store
        .delete_repetition(instance, questions, iteration)
        .await
        .with_context(|| format!("Failed to delete iteration {iteration}"))?;

    let group: HashSet<String> = questions.iter().cloned().collect();
    let (iterations, _) = load_iterations(store, instance, &group).await?;
    Ok(DeletedRepetition {
        iteration,
        removed,
        remaining: iterations.len(),
    })
}

/// Writes one answer, creating the draft on the first answer to a new form.
///
/// Saving again replaces the answer for the same question and iteration.
pub async fn save_answer<S>(store: &S, target: AnswerTarget, answer: Answer) -> Result<SavedAnswer>
where
    S: FormRepository
        + FormInstanceRepository
        + ResponseRepository
        + DataPointRepository
        + ?Sized,
{
    let mut response = QuestionResponse::from_compound(
        0,
        &answer.question,
        answer.response_type,
        sanitize_value(&answer.value),
    );
    if response.response_type.is_media() {
        if let Some(filename) = image_file_name(&response.value) {
            response = response.with_filename(filename);
        }
    }
    if !response.is_valid() {
        bail!(
            "Invalid {} answer for question {}: {:?}",
            response.response_type.as_str(),
            answer.question,
            answer.value
        );
    }

    let (instance, created) = match target {
        AnswerTarget::Instance(id) => {
            let Some(instance) = store.get_form_instance(id).await? else {
                bail!("Form instance {id} not found");
            };
            if !instance.status.is_editable() {
                bail!(
                    "Form instance {id} is {} and can no longer be edited",
                    instance.status.as_str()
                );
            }
            (instance, false)
        }
        AnswerTarget::NewDraft {
            form_id,
            data_point,
        } => {
            let Some(form) = store.get_form(&form_id).await? else {
                bail!("Form {form_id} is not installed");
            };
            let mut draft = FormInstance::new_draft(form.id, form.version);
            if let Some(data_point) = data_point {
                draft = draft.with_data_point(data_point);
            }
            (draft, true)
        }
    };
    if answer.names_data_point && instance.data_point_id.is_none() {
        bail!("Form instance has no data point to name");
    }

    let id = match instance.id {
        Some(id) => id,
        None => store
            .create_form_instance(&instance)
            .await
            .context("Failed to create form instance")?,
    };
    response.form_instance_id = id;
    store
        .save_response(&response)
        .await
        .with_context(|| format!("Failed to save answer to question {}", answer.question))?;
    store.touch_form_instance(id).await?;

    let data_point_name = match (&instance.data_point_id, answer.names_data_point) {
        (Some(data_point_id), true) => {
            Some(name_data_point(store, &instance.form_id, data_point_id, &response).await?)
        }
        _ => None,
    };

    tracing::debug!(instance = id, question = %answer.question, created, "Saved answer");
    Ok(SavedAnswer {
        instance: id,
        created,
        question: response.compound_id().to_string(),
        value: response.value,
        data_point_name,
    })
}

async fn name_data_point<S>(
    store: &S,
    form_id: &str,
    data_point_id: &str,
    response: &QuestionResponse,
) -> Result<String>
where
    S: FormRepository + DataPointRepository + ?Sized,
{
    let name = response.datapoint_name_value();
    let data_point = match store.get_data_point(data_point_id).await? {
        Some(existing) => DataPoint {
            name: name.clone(),
            last_modified: Utc::now(),
            ..existing
        },
        None => {
            let group = store.get_form(form_id).await?.and_then(|form| form.group_id);
            DataPoint {
                id: data_point_id.to_string(),
                survey_group_id: group.unwrap_or_default(),
                name: name.clone(),
                latitude: None,
                longitude: None,
                last_modified: Utc::now(),
            }
        }
    };
    store
        .save_data_point(&data_point)
        .await
        .with_context(|| format!("Failed to name data point {data_point_id}"))?;
    Ok(name)
}

/// Marks a draft submitted so the next export packages it.
pub async fn submit_instance<S>(store: &S, instance: i64, duration_secs: u64) -> Result<SubmittedInstance>
where
    S: FormInstanceRepository + ResponseRepository + ?Sized,
{
    let Some(form_instance) = store.get_form_instance(instance).await? else {
        bail!("Form instance {instance} not found");
    };
    let responses = store.get_responses(instance).await?;
    if !responses.iter().any(|response| response.has_value()) {
        bail!("Form instance {instance} has no answers");
    }

    let duration_ms = i64::try_from(duration_secs)
        .ok()
        .and_then(|secs| secs.checked_mul(1000))
        .context("Duration is too long")?;
    store
        .submit_form_instance(instance, duration_ms)
        .await
        .with_context(|| format!("Failed to submit form instance {instance}"))?;

    tracing::info!(instance, uuid = %form_instance.uuid, "Submitted form instance");
    Ok(SubmittedInstance {
        instance,
        uuid: form_instance.uuid,
        duration_ms,
    })
}
