pub mod campaign;
pub mod cli;
pub mod config;
pub mod display;
pub mod segment;

use crate::campaign::{
    CampaignDraft, CampaignPage, CampaignStatus, HistoryQuery, PreviewRequest, PreviewResponse,
    render_message,
};
use crate::config::SegmentConfig;
use crate::display::{
    format_history_text, format_preview_text, format_rules_text, print_rule_warnings, rows_table,
    value_text,
};
use crate::segment::input::read_json_file;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;

pub use cli::{ColorMode, Commands, OutputFormat, cli_parse};
pub use segment::{
    FieldRule, Operator, RawValue, RuleEditor, RuleRow, SegmentError, SegmentQueryDocument,
    coerce, compile, decompile,
};

fn write_output_file(path: &Path, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, content)
        .map_err(|e| format!("Failed to write output file '{}': {}", path.display(), e).into())
}

fn read_rows(path: &Path) -> Result<Vec<RuleRow>, Box<dyn std::error::Error>> {
    segment::read_rows_file(path)
        .map_err(|e| format!("Failed to load rules from '{}': {}", path.display(), e).into())
}

fn read_response<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let value = read_json_file(path)?;
    serde_json::from_value(value).map_err(|e| {
        format!(
            "Unexpected response shape in '{}': {}",
            path.display(),
            e
        )
        .into()
    })
}

fn pretty(value: &impl serde::Serialize) -> Result<String, Box<dyn std::error::Error>> {
    serde_json::to_string_pretty(value)
        .map_err(|e| format!("Error serializing output: {}", e).into())
}

fn load_rules(
    path: &Path,
    config: &SegmentConfig,
    quiet: bool,
) -> Result<Vec<RuleRow>, Box<dyn std::error::Error>> {
    let rows = read_rows(path)?;
    if !quiet {
        print_rule_warnings(&rows, &config.warnings);
    }
    Ok(rows)
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = cli_parse();
    let config = crate::config::load_config(cli.config.as_deref())
        .map_err(|e| format!("Failed to load config: {}", e))?;
    let format = cli.format;
    let verbose = cli.verbose;
    let quiet = cli.quiet;

    cli.color.apply();

    if verbose > 0 && !quiet {
        eprintln!("Verbosity level: {}", verbose);
        eprintln!("Color mode: {:?}", cli.color);
        eprintln!("Output format: {:?}", format);
        if let Some(out_path) = &cli.output {
            eprintln!("Output will be written to: {}", out_path.display());
        }
        if let Some(config_path) = &cli.config {
            eprintln!("Config file: {}", config_path.display());
        }
    }

    let rendered = match &cli.command {
        Commands::Compile { rows } => {
            let rows = load_rules(rows, &config, quiet)?;
            let document = compile(&rows);
            if verbose > 1 && !quiet {
                eprintln!("Compiled {} row(s) into {} field(s)", rows.len(), document.len());
            }
            match format {
                OutputFormat::Text => format_rules_text(&rows, &document.to_json()),
                OutputFormat::Json => pretty(&document)?,
            }
        }
        Commands::Decompile {
            document,
            onto,
            replace,
        } => {
            let doc = segment::read_document_file(document).map_err(|e| {
                format!(
                    "Failed to load segment document '{}': {}",
                    document.display(),
                    e
                )
            })?;

            let mut editor = match onto {
                Some(path) => RuleEditor::from_rows(read_rows(path)?),
                None => RuleEditor::new(),
            };
            let added = if *replace {
                editor.replace_with_document(&doc);
                editor.rows().len()
            } else {
                editor.import_document(&doc)
            };
            if verbose > 0 && !quiet {
                eprintln!(
                    "Appended {} row(s), {} in total",
                    added,
                    editor.rows().len()
                );
            }
            if !quiet {
                print_rule_warnings(editor.rows(), &config.warnings);
            }

            match format {
                OutputFormat::Text => format!("{}\n", rows_table(editor.rows())),
                OutputFormat::Json => pretty(&editor.rows())?,
            }
        }
        Commands::Coerce { op, value } => {
            let op: Operator = op
                .parse()
                .map_err(|_| SegmentError::UnknownOperator(op.clone()))?;
            let coerced = coerce(&op, value);
            match format {
                OutputFormat::Text => coerced.to_string(),
                OutputFormat::Json => pretty(&coerced)?,
            }
        }
        Commands::Preview { rows, limit } => {
            let rows = load_rules(rows, &config, quiet)?;
            let request =
                PreviewRequest::new(compile(&rows)).with_limit(limit.unwrap_or(config.preview.limit));
            pretty(&request)?
        }
        Commands::Campaign {
            rows,
            name,
            message,
            created_by,
        } => {
            let rows = load_rules(rows, &config, quiet)?;
            let draft = CampaignDraft::new(name.clone())
                .created_by(
                    created_by
                        .clone()
                        .unwrap_or_else(|| config.campaign.created_by.clone()),
                )
                .message(
                    message
                        .clone()
                        .unwrap_or_else(|| config.campaign.default_message.clone()),
                );
            let request = draft
                .into_request(compile(&rows))
                .map_err(|e| format!("Invalid campaign: {}", e))?;
            pretty(&request)?
        }
        Commands::Status { from, to } => {
            let from: CampaignStatus = from.parse()?;
            let to: CampaignStatus = to.parse()?;
            pretty(&from.transition_to(to)?)?
        }
        Commands::ShowPreview { response, message } => {
            let preview: PreviewResponse = read_response(response)?;
            match format {
                OutputFormat::Text => format_preview_text(&preview, message.as_deref()),
                OutputFormat::Json => {
                    let customers: Vec<_> = preview
                        .data
                        .customers
                        .iter()
                        .map(|customer| {
                            let name = value_text(&customer.name);
                            let personalised = message
                                .as_deref()
                                .map(|template| render_message(template, &name));
                            json!({ "name": name, "message": personalised })
                        })
                        .collect();
                    pretty(&json!({ "total": preview.data.total, "customers": customers }))?
                }
            }
        }
        Commands::History {
            response,
            page,
            limit,
        } => {
            let records: CampaignPage = read_response(response)?;
            let query = HistoryQuery::new(*page, *limit);
            match format {
                OutputFormat::Text => format_history_text(&records, &query),
                OutputFormat::Json => {
                    let campaigns: Vec<_> = records
                        .data
                        .iter()
                        .map(|record| {
                            json!({
                                "id": record.id,
                                "name": value_text(&record.name),
                                "status": record.status,
                                "next": record.next_status(),
                                "actions": record.action_requests(),
                            })
                        })
                        .collect();
                    pretty(&json!({
                        "query": query.path(),
                        "previous": query.previous_page().map(|previous| previous.path()),
                        "next": query.next_page().path(),
                        "campaigns": campaigns,
                    }))?
                }
            }
        }
    };

    if rendered.ends_with('\n') {
        print!("{rendered}");
    } else {
        println!("{rendered}");
    }
    if let Some(path) = &cli.output {
        write_output_file(path, &rendered)?;
    }

    Ok(())
}
