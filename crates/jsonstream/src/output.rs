use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One document as read from a stream.
#[derive(Debug)]
pub struct DocumentRecord {
    pub index: usize,
    pub offset: u64,
    pub payload: Vec<u8>,
}

#[derive(Serialize)]
struct DocumentOutput {
    index: usize,
    offset: u64,
    size: usize,
    valid_json: bool,
    document: Value,
}

impl DocumentOutput {
    fn from_record(record: &DocumentRecord) -> Self {
        let (valid_json, document) = match serde_json::from_slice::<Value>(&record.payload) {
            Ok(value) => (true, value),
            Err(_) => (
                false,
                Value::String(String::from_utf8_lossy(&record.payload).into_owned()),
            ),
        };
        Self {
            index: record.index,
            offset: record.offset,
            size: record.payload.len(),
            valid_json,
            document,
        }
    }
}

pub fn print_documents(records: &[DocumentRecord], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for record in records {
                let out = DocumentOutput::from_record(record);
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "OFFSET", "SIZE", "DOCUMENT"]);
            for record in records {
                table.add_row(vec![
                    record.index.to_string(),
                    record.offset.to_string(),
                    record.payload.len().to_string(),
                    payload_preview(&record.payload),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for record in records {
                let out = DocumentOutput::from_record(record);
                println!(
                    "#{} offset={} size={}",
                    out.index, out.offset, out.size
                );
                println!(
                    "{}",
                    serde_json::to_string_pretty(&out.document)
                        .unwrap_or_else(|_| payload_preview(&record.payload))
                );
            }
        }
        OutputFormat::Raw => {
            for record in records {
                print_raw(&record.payload);
                print_raw(b"\n");
            }
        }
    }
}

/// Print a flat key/value summary.
pub fn print_summary<T: Serialize>(title: &str, summary: &T, format: OutputFormat) {
    let fields = match serde_json::to_value(summary) {
        Ok(Value::Object(fields)) => fields,
        _ => serde_json::Map::new(),
    };

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(summary).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (key, value) in &fields {
                table.add_row(vec![key.clone(), scalar_text(value)]);
            }
            println!("{title}");
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{title}\n");
            for (key, value) in &fields {
                println!("  {:<18} {}", format!("{key}:"), scalar_text(value));
            }
        }
        OutputFormat::Raw => {
            let line: Vec<String> = fields
                .iter()
                .map(|(key, value)| format!("{key}={}", scalar_text(value)))
                .collect();
            println!("{}", line.join(" "));
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn document_output_embeds_valid_json() {
        let record = DocumentRecord {
            index: 2,
            offset: 30,
            payload: br#"{"a":[1,2]}"#.to_vec(),
        };
        let out = serde_json::to_value(DocumentOutput::from_record(&record)).unwrap();
        assert_eq!(
            out,
            json!({"index": 2, "offset": 30, "size": 11, "valid_json": true, "document": {"a": [1, 2]}})
        );
    }

    #[test]
    fn document_output_keeps_invalid_payload_as_text() {
        let record = DocumentRecord {
            index: 0,
            offset: 0,
            payload: b"NOT PASS".to_vec(),
        };
        let out = DocumentOutput::from_record(&record);
        assert!(!out.valid_json);
        assert_eq!(out.document, json!("NOT PASS"));
    }

    #[test]
    fn preview_marks_binary_payloads() {
        assert_eq!(payload_preview(&[0xff, 0x00]), "<binary 2 bytes>");
        assert_eq!(payload_preview(b"[1]"), "[1]");
    }

    #[test]
    fn scalar_text_renders_nulls_and_strings_bare() {
        assert_eq!(scalar_text(&Value::Null), "-");
        assert_eq!(scalar_text(&json!("x")), "x");
        assert_eq!(scalar_text(&json!(true)), "true");
    }
}
