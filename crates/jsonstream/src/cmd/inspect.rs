use std::io::Read;

use jsonstream_frame::{max_document_len, DocumentReader, FrameError};
use jsonstream_resource::{AccessMode, FileResource, DEFAULT_BUFFER_SIZE};
use jsonstream_session::{JsonCodec, StreamError};
use serde::Serialize;

use crate::cmd::InspectArgs;
use crate::exit::{stream_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_summary, OutputFormat};

#[derive(Debug, Default, Serialize, PartialEq)]
struct InspectReport {
    path: String,
    descriptor_width: usize,
    max_document_len: u64,
    documents: usize,
    payload_bytes: u64,
    stream_bytes: u64,
    largest_document: usize,
    invalid_json: usize,
    clean_end: bool,
    error: Option<String>,
}

pub fn run(args: InspectArgs, format: OutputFormat, descriptor_width: usize) -> CliResult<i32> {
    let resource = FileResource::open(&args.path, AccessMode::ReadOnly, DEFAULT_BUFFER_SIZE)
        .map_err(|err| stream_error("open failed", StreamError::from(err)))?;

    let mut report = scan(resource, descriptor_width)
        .map_err(|err| stream_error("scan failed", StreamError::from(err)))?;
    report.path = args.path.display().to_string();

    print_summary("jsonstream inspect", &report, format);
    if report.clean_end {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}

/// Walk every frame. Corruption ends the scan and is recorded in the
/// report; any other failure is returned.
fn scan<R: Read>(source: R, descriptor_width: usize) -> Result<InspectReport, FrameError> {
    let codec = JsonCodec::default();
    let mut reader = DocumentReader::with_width(source, descriptor_width);
    let mut report = InspectReport {
        descriptor_width,
        max_document_len: max_document_len(descriptor_width),
        ..InspectReport::default()
    };

    loop {
        match reader.read_document() {
            Ok(Some(document)) => {
                report.documents += 1;
                report.payload_bytes += document.payload.len() as u64;
                report.largest_document = report.largest_document.max(document.payload.len());
                if codec.validate(&document.payload).is_err() {
                    report.invalid_json += 1;
                }
            }
            Ok(None) => {
                report.clean_end = true;
                break;
            }
            Err(err) if err.is_corruption() => {
                tracing::warn!(offset = reader.offset(), error = %err, "stream is corrupt");
                report.error = Some(err.to_string());
                break;
            }
            Err(err) => return Err(err),
        }
    }

    report.stream_bytes = reader.offset();
    Ok(report)
}
