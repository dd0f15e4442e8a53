//! Request and response shapes for every endpoint.

use crate::schema::{Field, Schema};
use crate::services::fields::FILTER_OPERATORS;

/// Which dataset a report runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Campaigns,
    Contacts,
}

impl Subject {
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Campaigns => "campaigns",
            Subject::Contacts => "contacts",
        }
    }
}

/// How the report is rendered on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Graph,
    Grid,
}

impl DisplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Graph => "graph",
            DisplayMode::Grid => "grid",
        }
    }
}

fn chat_message() -> Schema {
    Schema::Object(vec![
        Field::required("role", Schema::enumeration(["user", "assistant", "system"])),
        Field::required("content", Schema::String),
    ])
}

pub fn chat_request() -> Schema {
    Schema::Object(vec![Field::required("messages", Schema::array(chat_message()))])
}

pub fn contacts_request() -> Schema {
    Schema::Object(vec![
        Field::required("contactFields", Schema::array(Schema::String)),
        Field::required("messages", Schema::array(chat_message())),
    ])
}

pub fn template_request() -> Schema {
    Schema::Object(vec![
        Field::required("requestText", Schema::String)
            .describe("A description of the desired email template."),
        Field::optional("brandImage", Schema::Url).describe(
            "Optional URL of a brand image to inspire the email's theme, vibe, and colors.",
        ),
        Field::optional("attachedImages", Schema::array(Schema::Url))
            .describe("Optional array of image URLs to be included in the email template."),
        Field::optional("fontFamily", Schema::String)
            .describe("The selected font family for the email template."),
        Field::optional("enableWebSearch", Schema::Boolean)
            .describe("Whether to enable web search to find relevant images or information."),
    ])
}

fn chat_response() -> Field {
    Field::required("chatResponse", Schema::String)
        .describe("The conversational response to the user's message.")
}

pub fn describe_response() -> Schema {
    Schema::Object(vec![
        chat_response(),
        Field::required(
            "reportType",
            Schema::enumeration([Subject::Campaigns.as_str(), Subject::Contacts.as_str()]),
        )
        .describe("'campaigns' if the request is about campaigns, 'contacts' if it is about contacts."),
        Field::optional(
            "displayType",
            Schema::enumeration([DisplayMode::Graph.as_str(), DisplayMode::Grid.as_str()]),
        )
        .describe("'graph' for a chart over two axes, 'grid' for a table of columns."),
    ])
}

/// A single filter clause: `{ "<field>": { "<operator>": <string|number> } }`.
pub fn filter_clause(fields: &[String]) -> Schema {
    let condition = Schema::single_entry(
        FILTER_OPERATORS,
        Schema::AnyOf(vec![Schema::String, Schema::Number]),
    );
    Schema::single_entry(fields.iter().cloned(), condition)
}

/// Output shape of a report extraction endpoint.
///
/// Graph and grid results are not cross-checked against what the describe
/// endpoint suggested; each route only enforces its own shape.
pub fn report_response(fields: &[String], display: DisplayMode) -> Schema {
    let mut shape = vec![chat_response()];
    match display {
        DisplayMode::Graph => {
            shape.push(Field::required("xAxis", Schema::String).describe(
                "Either 'over time' or a field from the list of available fields, used as the x axis.",
            ));
            shape.push(
                Field::required("yAxis", Schema::String)
                    .describe("The field from the list of available fields used as the y axis."),
            );
        }
        DisplayMode::Grid => {
            shape.push(
                Field::required("fields", Schema::array(Schema::String))
                    .describe("The fields from the list of available fields to show as columns."),
            );
        }
    }
    shape.push(
        Field::optional("startDate", Schema::Date)
            .describe("First day of the report, YYYY-MM-DD."),
    );
    shape.push(Field::optional("endDate", Schema::Date).describe("Last day of the report, YYYY-MM-DD."));
    shape.push(
        Field::optional("filter", Schema::array(filter_clause(fields)))
            .describe("Conditions rows must satisfy, one field and operator per clause."),
    );
    Schema::Object(shape)
}

pub fn template_response() -> Schema {
    Schema::Object(vec![
        Field::required("generatedHtml", Schema::String)
            .describe("The complete HTML for the generated email template."),
    ])
}
