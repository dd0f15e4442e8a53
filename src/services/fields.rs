/// Columns available on the campaign summary report.
pub const CAMPAIGN_FIELDS: [&str; 62] = [
    "Account",
    "Status",
    "Type",
    "TypeCombineAPI",
    "Created",
    "Segment",
    "From",
    "Title",
    "Subject",
    "Active",
    "Active%",
    "Attempted",
    "Attempted%",
    "Remaining",
    "Remaining%",
    "Completed",
    "CompletedRecips",
    "Completed%",
    "Total",
    "Received",
    "Success",
    "Success%",
    "Paused",
    "Opens (Unique)",
    "Opens (Total)",
    "Open%",
    "Click-To-Open Rate (CTOR)%",
    "Opens, Mobile (Unique)",
    "Opens, Mobile (Total)",
    "Opens, Mobile %",
    "Opens, Desktop (Unique)",
    "Opens, Desktop (Total)",
    "Opens, Desktop %",
    "Opens, Web (Unique)",
    "Opens, Web (Total)",
    "Opens, Web %",
    "Opens, Unknown (Unique)",
    "Opens, Unknown (Total)",
    "Opens, Unknown %",
    "Clicks (Unique)",
    "Clicks (Total)",
    "Click%",
    "ClickStreams (Unique)",
    "ClickStreams (Total)",
    "ClickStream%",
    "Complaints",
    "Complaint%",
    "Unsubscribes",
    "Unsubscribe%",
    "Soft Bounce",
    "Hard Bounce",
    "Bounce%",
    "Engagement",
    "Forwards",
    "Impressions",
    "Purchases (Clickstream)",
    "Revenue (Clickstream)",
    "Purchases (Commerce)",
    "Revenue (Commerce)",
    "Sessions (Commerce)",
    "Conversion Rate% (Commerce)",
    "Shares",
];

/// Comparison operators a filter clause may use.
pub const FILTER_OPERATORS: [&str; 5] = ["$eq", "$gt", "$gte", "$lt", "$lte"];

/// Pseudo-field accepted as a graph x axis.
pub const OVER_TIME: &str = "over time";

pub fn campaign_fields() -> Vec<String> {
    CAMPAIGN_FIELDS.iter().map(|f| f.to_string()).collect()
}
