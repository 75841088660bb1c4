use std::fmt;
use std::io;

use jsonstream_frame::FrameError;
use jsonstream_resource::ResourceError;
use jsonstream_session::StreamError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

fn io_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    }
}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    CliError::new(io_code(&err), format!("{context}: {err}"))
}

pub fn stream_error(context: &str, err: StreamError) -> CliError {
    let code = match &err {
        StreamError::Io(source)
        | StreamError::Frame(FrameError::Io(source))
        | StreamError::Resource(ResourceError::Io(source))
        | StreamError::Resource(ResourceError::Open { source, .. }) => io_code(source),
        StreamError::InvalidArgument { .. } | StreamError::Forbidden(_) => USAGE,
        StreamError::Frame(FrameError::DescriptorOverflow { .. } | FrameError::EmptyDocument) => {
            USAGE
        }
        StreamError::Frame(_) | StreamError::Json(_) | StreamError::Utf8(_) => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}
