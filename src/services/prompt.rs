//! System prompt rendering.
//!
//! Every prompt is a static template plus a small context. The only input
//! that changes between otherwise identical requests is `today`, and it is
//! always passed in by the caller, so rendering is a pure function.

use chrono::{Days, NaiveDate};
use minijinja::{AutoEscape, Environment, UndefinedBehavior, context};
use serde_json::json;
use thiserror::Error;

use crate::message::TemplateRequest;
use crate::services::contracts::{DisplayMode, Subject};
use crate::services::fields::{FILTER_OPERATORS, OVER_TIME};

const DESCRIBE: &str = include_str!("../../prompts/describe.j2");
const REPORT: &str = include_str!("../../prompts/report.j2");
const TEMPLATE: &str = include_str!("../../prompts/template.j2");

const SKELETON: &str = include_str!("../../prompts/skeleton.html");
const EXAMPLE_LAYOUT: &str = include_str!("../../prompts/example_layout.html");
const EXAMPLE_BIRTHDAY: &str = include_str!("../../prompts/example_birthday.html");

const SOCIAL_DOMAIN: &str = "https://editor.ne16.com";

/// Default reporting window when the user names none.
const DEFAULT_WINDOW_DAYS: u64 = 90;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("failed to render prompt `{name}`: {source}")]
    Render {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to serialize field list: {0}")]
    Fields(#[from] serde_json::Error),
}

pub struct PromptComposer {
    env: Environment<'static>,
}

impl PromptComposer {
    pub fn new() -> Result<Self, PromptError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);

        for (name, source) in [("describe", DESCRIBE), ("report", REPORT), ("template", TEMPLATE)] {
            env.add_template(name, source)
                .map_err(|source| PromptError::Render { name, source })?;
        }

        Ok(Self { env })
    }

    fn render(&self, name: &'static str, ctx: minijinja::Value) -> Result<String, PromptError> {
        self.env
            .get_template(name)
            .and_then(|tmpl| tmpl.render(ctx))
            .map_err(|source| PromptError::Render { name, source })
    }

    pub fn describe(&self) -> Result<String, PromptError> {
        self.render("describe", context! {})
    }

    /// The field list is embedded as compact JSON exactly as given. For
    /// contact reports it comes from the caller and is not inspected.
    pub fn report(
        &self,
        subject: Subject,
        display: DisplayMode,
        fields: &[String],
        today: NaiveDate,
    ) -> Result<String, PromptError> {
        let example = match subject {
            Subject::Campaigns => Some(campaign_example(display, today)),
            Subject::Contacts => None,
        };

        self.render(
            "report",
            context! {
                subject => subject.as_str(),
                display => display.as_str(),
                today => today.format("%Y-%m-%d").to_string(),
                fields => serde_json::to_string(fields)?,
                over_time => OVER_TIME,
                operators => FILTER_OPERATORS.join(", "),
                example => example,
            },
        )
    }

    pub fn template(&self, web_search: bool) -> Result<String, PromptError> {
        self.render(
            "template",
            context! {
                web_search => web_search,
                social_domain => SOCIAL_DOMAIN,
                skeleton => SKELETON.trim_end(),
                examples => [EXAMPLE_LAYOUT.trim_end(), EXAMPLE_BIRTHDAY.trim_end()],
            },
        )
    }
}

fn campaign_example(display: DisplayMode, today: NaiveDate) -> String {
    let start = today
        .checked_sub_days(Days::new(DEFAULT_WINDOW_DAYS))
        .unwrap_or(today);
    let (start, end) = (start.format("%Y-%m-%d").to_string(), today.format("%Y-%m-%d").to_string());

    let example = match display {
        DisplayMode::Graph => json!({
            "chatResponse": "Here is your open rate over the last 90 days.",
            "xAxis": OVER_TIME,
            "yAxis": "Open%",
            "startDate": start,
            "endDate": end,
        }),
        DisplayMode::Grid => json!({
            "chatResponse": "Here are your campaigns with an open rate above 10% over the last 90 days.",
            "fields": ["Title", "Subject", "Open%", "Click%"],
            "startDate": start,
            "endDate": end,
            "filter": [{ "Open%": { "$gt": 10 } }],
        }),
    };
    example.to_string()
}

/// User message for the template route, built from the request options.
pub fn template_request_text(req: &TemplateRequest) -> String {
    let mut text = format!("Request: {}", req.request_text);
    if let Some(font) = req.font_family.as_deref().filter(|f| !f.trim().is_empty()) {
        text.push_str(&format!("\nFont Family: {font}"));
    }
    if req.enable_web_search.unwrap_or(false) {
        text.push_str("\nWeb Search: Enabled");
    }
    if let Some(images) = req.attached_images.as_ref().filter(|i| !i.is_empty()) {
        text.push_str(&format!("\nAttached Images: {}", images.join(", ")));
    }
    text
}
