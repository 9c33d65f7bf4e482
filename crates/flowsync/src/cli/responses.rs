//! Answer editing CLI commands.

use clap::{Args, Parser, Subcommand};
use flowsync_core::response::ResponseType;

use crate::commands::{Answer, AnswerTarget};

#[derive(Debug, Parser)]
pub struct ResponsesCommand {
    #[command(subcommand)]
    pub action: ResponsesAction,
}

#[derive(Debug, Subcommand)]
pub enum ResponsesAction {
    /// Save one answer, starting a draft when given a form.
    Save(SaveArgs),
}

#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Draft form instance row id.
    #[arg(long, required_unless_present = "form", conflicts_with = "form")]
    pub instance: Option<i64>,
    /// Installed form id. Starts a new draft.
    #[arg(long)]
    pub form: Option<String>,
    /// Data point of the new draft.
    #[arg(long, requires = "form")]
    pub data_point: Option<String>,
    /// Question id, `<id>` or `<id>|<iteration>`.
    #[arg(long)]
    pub question: String,
    /// Answer type, e.g. VALUE, OPTION, GEO, IMAGE.
    #[arg(long = "type", default_value = "VALUE", value_parser = parse_response_type)]
    pub response_type: ResponseType,
    #[arg(long)]
    pub value: String,
    /// Use the answer as the data point name.
    #[arg(long)]
    pub names_data_point: bool,
}

fn parse_response_type(raw: &str) -> Result<ResponseType, String> {
    Ok(ResponseType::parse(raw))
}

impl SaveArgs {
    pub fn target(&self) -> anyhow::Result<AnswerTarget> {
        match (&self.form, self.instance) {
            (Some(form_id), _) => Ok(AnswerTarget::NewDraft {
                form_id: form_id.clone(),
                data_point: self.data_point.clone(),
            }),
            (None, Some(id)) => Ok(AnswerTarget::Instance(id)),
            (None, None) => anyhow::bail!("Either --instance or --form is required"),
        }
    }

    pub fn answer(&self) -> Answer {
        Answer {
            question: self.question.clone(),
            response_type: self.response_type,
            value: self.value.clone(),
            names_data_point: self.names_data_point,
        }
    }
}
