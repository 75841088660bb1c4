use std::io::{self, Read, Seek, Write};
use std::path::Path;

use jsonstream_frame::DocumentReader;
use jsonstream_session::{AccessMode, JsonStream, StreamConfig, StreamError};

use crate::cmd::CatArgs;
use crate::exit::{stream_error, CliResult, SUCCESS};
use crate::output::{print_documents, DocumentRecord, OutputFormat};

pub fn run(args: CatArgs, format: OutputFormat, descriptor_width: usize) -> CliResult<i32> {
    let limit = args.count.unwrap_or(usize::MAX);
    let records = if args.path == Path::new("-") {
        read_stdin(descriptor_width, limit)
    } else {
        read_file(&args.path, descriptor_width, limit)
    }
    .map_err(|err| stream_error("read failed", err))?;

    tracing::debug!(documents = records.len(), "read documents");
    print_documents(&records, format);
    Ok(SUCCESS)
}

fn read_file(
    path: &Path,
    descriptor_width: usize,
    limit: usize,
) -> Result<Vec<DocumentRecord>, StreamError> {
    let config = StreamConfig {
        descriptor_width,
        mode: AccessMode::ReadOnly,
        ..StreamConfig::default()
    };
    let stream = JsonStream::open_with_config(path, config)?;
    let records = collect_records(&stream, limit)?;
    stream.close()?;
    Ok(records)
}

fn collect_records<S: Read + Write + Seek>(
    stream: &JsonStream<S>,
    limit: usize,
) -> Result<Vec<DocumentRecord>, StreamError> {
    let mut records = Vec::new();
    while records.len() < limit {
        let offset = stream.position()?;
        let Some(payload) = stream.read_bytes()? else {
            break;
        };
        records.push(DocumentRecord {
            index: records.len(),
            offset,
            payload: payload.to_vec(),
        });
    }
    Ok(records)
}

fn read_stdin(descriptor_width: usize, limit: usize) -> Result<Vec<DocumentRecord>, StreamError> {
    let reader = DocumentReader::with_width(io::stdin().lock(), descriptor_width);
    let mut records = Vec::new();
    for document in reader.take(limit) {
        let document = document?;
        records.push(DocumentRecord {
            index: records.len(),
            offset: document.offset,
            payload: document.payload.to_vec(),
        });
    }
    Ok(records)
}
