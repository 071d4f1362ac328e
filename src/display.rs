use crate::campaign::{CampaignAction, CampaignPage, HistoryQuery, PreviewResponse, render_message};
use crate::config::WarningSettings;
use crate::segment::{Collision, CollisionKind, Field, RuleRow, collisions};
use chrono::{DateTime, Local};
use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde_json::Value;
use std::fmt::Write as _;

const NAME_KEYS_FIRST: [&str; 4] = ["first", "givenName", "given", "fname"];
const NAME_KEYS_LAST: [&str; 4] = ["last", "familyName", "surname", "lname"];

/// Printable text for a loosely typed backend value.
///
/// Objects that look like a structured name (`{first, last}` and similar)
/// are joined into one string; anything else falls back to its JSON form.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(object) => {
            let pick = |keys: &[&str]| {
                keys.iter()
                    .filter_map(|key| object.get(*key))
                    .filter_map(Value::as_str)
                    .find(|part| !part.is_empty())
            };
            let parts: Vec<&str> = [pick(&NAME_KEYS_FIRST), pick(&NAME_KEYS_LAST)]
                .into_iter()
                .flatten()
                .collect();
            if parts.is_empty() {
                value.to_string()
            } else {
                parts.join(" ")
            }
        }
        Value::Array(_) => value.to_string(),
    }
}

/// Local date-time for an ISO timestamp, or the text unchanged if it doesn't parse
pub fn date_text(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| {
            ts.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|_| raw.to_string())
}

pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

/// Table of rule rows with their coerced values
pub fn rows_table(rows: &[RuleRow]) -> Table {
    let mut table = create_styled_table(&["#", "Field", "Operator", "Value", "Coerced"]);

    for (i, row) in rows.iter().enumerate() {
        let field = Cell::new(row.field.label());
        let op = Cell::new(row.op.label());
        table.add_row(vec![
            Cell::new(i + 1),
            if row.field.is_known() {
                field
            } else {
                field.fg(Color::Yellow)
            },
            if row.op.is_known() {
                op
            } else {
                op.fg(Color::Yellow)
            },
            Cell::new(row.value.display_text()),
            Cell::new(row.coerced_value().to_string()),
        ]);
    }

    table
}

/// Text report for a compiled set of rows
pub fn format_rules_text(rows: &[RuleRow], document: &Value) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Audience rules".bold().bright_white());
    if rows.is_empty() {
        let _ = writeln!(out, "  (no rules - the audience is every customer)");
    } else {
        let _ = writeln!(out, "{}", rows_table(rows));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Segment JSON (sent to backend)".bold().bright_blue());
    let _ = writeln!(
        out,
        "{}",
        serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string())
    );
    out
}

/// Text report for an audience preview, with the message personalised per customer
pub fn format_preview_text(response: &PreviewResponse, message: Option<&str>) -> String {
    let mut out = String::new();
    let data = &response.data;

    let _ = writeln!(
        out,
        "{} {}",
        "Audience size:".bold(),
        data.total.to_string().as_str().green().bold()
    );

    if data.customers.is_empty() {
        let _ = writeln!(out, "No preview customers.");
        return out;
    }

    for customer in &data.customers {
        let name = value_text(&customer.name);
        let display_name: &str = if name.is_empty() { "Unnamed" } else { &name };
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", display_name.bold());

        let email = value_text(&customer.email);
        if !email.is_empty() {
            let _ = writeln!(out, "  {}", email.as_str().dimmed());
        }
        let _ = writeln!(
            out,
            "  Spend: {} • Visits: {}",
            value_text(&customer.total_spend),
            value_text(&customer.visits)
        );
        if let Some(last_active) = &customer.last_active {
            let _ = writeln!(out, "  Last Active: {}", date_text(last_active));
        }
        if let Some(template) = message {
            let _ = writeln!(out, "  Message: {}", render_message(template, &name).as_str().italic());
        }
    }

    out
}

/// Table of campaigns with the actions available for each, plus the paths of
/// the neighbouring history pages
pub fn format_history_text(page: &CampaignPage, query: &HistoryQuery) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        format!("Campaign history, page {}", query.page)
            .as_str()
            .bold()
            .bright_white(),
        query.path().as_str().dimmed()
    );

    if page.data.is_empty() {
        let _ = writeln!(out, "No campaigns yet.");
    } else {
        let mut table = create_styled_table(&["Name", "Status", "Audience", "Created", "Actions"]);
        for record in &page.data {
            let actions: Vec<&str> = record
                .actions()
                .into_iter()
                .map(|action| match action {
                    CampaignAction::Start => "start",
                    CampaignAction::Complete => "complete",
                    CampaignAction::Delete => "delete",
                })
                .collect();
            let status = if record.lifecycle().is_some() {
                Cell::new(&record.status)
            } else {
                Cell::new(&record.status).fg(Color::Yellow)
            };
            table.add_row(vec![
                Cell::new(value_text(&record.name)),
                status,
                Cell::new(value_text(&record.audience_size)),
                Cell::new(record.created_at.as_deref().map(date_text).unwrap_or_default()),
                Cell::new(actions.join(", ")),
            ]);
        }
        let _ = writeln!(out, "{table}");
    }

    if let Some(previous) = query.previous_page() {
        let _ = writeln!(out, "Previous: {}", previous.path());
    }
    let _ = writeln!(out, "Next: {}", query.next_page().path());
    out
}

fn describe_collision(collision: &Collision) -> String {
    match &collision.kind {
        CollisionKind::EqDiscarded { discarded } => format!(
            "'{}': a later $eq rule discards the earlier {} rule(s)",
            collision.field,
            discarded
                .iter()
                .map(|op| op.wire_token())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        CollisionKind::EqPromoted { alongside } => format!(
            "'{}': equality is combined with {} instead of being rejected",
            collision.field, alongside
        ),
        CollisionKind::Overwritten { op } => format!(
            "'{}': {} appears more than once, only the last value is used",
            collision.field, op
        ),
    }
}

/// Warnings for rows that the backend will not understand or that merge silently
pub fn rule_warnings(rows: &[RuleRow], settings: &WarningSettings) -> Vec<String> {
    let mut warnings = Vec::new();

    if settings.unknown_tokens {
        for row in rows {
            if !row.field.is_known() {
                warnings.push(format!(
                    "Unknown field '{}'. Known fields are: {}",
                    row.field,
                    Field::known_names()
                ));
            }
            if !row.op.is_known() {
                warnings.push(format!(
                    "Unknown operator '{}' on field '{}'",
                    row.op, row.field
                ));
            }
        }
    }

    if settings.collisions {
        warnings.extend(collisions(rows).iter().map(describe_collision));
    }

    warnings
}

pub fn print_rule_warnings(rows: &[RuleRow], settings: &WarningSettings) {
    for warning in rule_warnings(rows, settings) {
        eprintln!("{} {}", "Warning:".yellow().bold(), warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Operator;
    use serde_json::json;

    #[test]
    fn test_value_text_structured_name() {
        assert_eq!(value_text(&json!({"first": "Aman", "last": "Gupta"})), "Aman Gupta");
        assert_eq!(value_text(&json!({"givenName": "Aman"})), "Aman");
        assert_eq!(value_text(&json!({"city": "Pune"})), r#"{"city":"Pune"}"#);
        assert_eq!(value_text(&Value::Null), "");
        assert_eq!(value_text(&json!(12.5)), "12.5");
    }

    #[test]
    fn test_date_text_falls_back_to_raw() {
        assert_eq!(date_text("yesterday"), "yesterday");
        assert!(!date_text("2025-01-01T00:00:00.000Z").contains('T'));
    }

    #[test]
    fn test_rule_warnings_respect_settings() {
        let rows = vec![
            RuleRow::new(Field::Other("city".into()), Operator::Eq, "Pune"),
            RuleRow::new(Field::TotalSpend, Operator::Eq, "5"),
            RuleRow::new(Field::TotalSpend, Operator::Gt, "1"),
        ];

        let all = rule_warnings(&rows, &WarningSettings::default());
        assert_eq!(all.len(), 2);
        assert!(all[0].contains("city"));
        assert!(all[0].contains("totalSpend, visits, lastActive"));
        assert!(all[1].contains("$gt"));

        let none = rule_warnings(
            &rows,
            &WarningSettings {
                unknown_tokens: false,
                collisions: false,
            },
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_history_text_lists_every_record() {
        let page: CampaignPage = serde_json::from_value(json!({
            "data": [
                {"_id": "a", "name": "Spring", "status": "draft", "audienceSize": 12},
                {"_id": "b", "name": "Summer", "status": "scheduled", "audienceSize": null}
            ]
        }))
        .unwrap();
        colored::control::set_override(false);
        let text = format_history_text(&page, &HistoryQuery::default());
        assert!(text.contains("Spring"));
        assert!(text.contains("scheduled"));
        assert!(text.contains("Next: /campaigns?page=2&limit=10"));
        assert!(!text.contains("Previous:"));
    }
}
