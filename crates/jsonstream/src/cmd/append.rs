use std::fs;

use jsonstream_session::{AccessMode, JsonStream, StreamConfig};
use serde::Serialize;

use crate::cmd::AppendArgs;
use crate::exit::{io_error, stream_error, CliResult, SUCCESS};
use crate::output::{print_summary, OutputFormat};

#[derive(Debug, Serialize)]
struct AppendSummary {
    path: String,
    appended: usize,
    end_offset: u64,
    validated: bool,
}

pub fn run(args: AppendArgs, format: OutputFormat, descriptor_width: usize) -> CliResult<i32> {
    let documents = resolve_documents(&args)?;

    let config = StreamConfig {
        descriptor_width,
        mode: AccessMode::WriteOnly,
        ..StreamConfig::default()
    };
    let stream = JsonStream::open_with_config(&args.path, config)
        .map_err(|err| stream_error("open failed", err))?;

    let validate = !args.no_validate;
    for (index, document) in documents.iter().enumerate() {
        stream
            .write_bytes(document, validate)
            .map_err(|err| stream_error(&format!("append of document {index} failed"), err))?;
    }

    let end_offset = stream
        .position()
        .map_err(|err| stream_error("append failed", err))?;
    stream
        .close()
        .map_err(|err| stream_error("close failed", err))?;
    tracing::info!(path = %args.path.display(), appended = documents.len(), "appended documents");

    let summary = AppendSummary {
        path: args.path.display().to_string(),
        appended: documents.len(),
        end_offset,
        validated: validate,
    };
    print_summary("jsonstream append", &summary, format);
    Ok(SUCCESS)
}

fn resolve_documents(args: &AppendArgs) -> CliResult<Vec<Vec<u8>>> {
    if let Some(path) = &args.file {
        let contents = fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        return Ok(vec![trim_trailing_newline(contents)]);
    }
    Ok(args.json.iter().map(|text| text.as_bytes().to_vec()).collect())
}

/// Editors usually end files with a newline that is not part of the document.
fn trim_trailing_newline(mut contents: Vec<u8>) -> Vec<u8> {
    while matches!(contents.last(), Some(b'\n' | b'\r')) {
        contents.pop();
    }
    contents
}
