//! # Errors
//!
//! Every bridge operation returns [`Result`]. An [`Error`] carries exactly one [`ErrorKind`] and,
//! when the failure originated below the bridge (transport or codec), the underlying error as its
//! [`source`](std::error::Error::source).

use std::fmt::{Display, Formatter};

/// Boxed underlying error.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Common result type returned by `mavbridge` functions.
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of the bridge failure.
///
/// Numeric codes are stable and can be obtained by casting: `ErrorKind::FailedWrite as u8`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    /// Expected heartbeat was never observed.
    ///
    /// Reserved for link-health monitoring.
    NoHeartbeat = 1,
    /// A command requiring acknowledgment received a reply of a different kind.
    NoCommandAck = 2,
    /// Transport write failed, was incomplete, or the frame could not be encoded.
    FailedWrite = 3,
    /// Transport read failed or the stream has ended.
    FailedRead = 4,
    /// Write did not complete within its deadline.
    TransmitTimeout = 10,
    /// Expected message did not arrive within its deadline.
    ReceiveTimeout = 11,
    /// Command was acknowledged with a result other than `MAV_RESULT_ACCEPTED`.
    CommandDenied = 20,
    /// Operation is not allowed in the current vehicle or link state.
    InvalidState = 21,
    /// Operation was interrupted by bridge shutdown.
    Cancelled = 22,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            ErrorKind::NoHeartbeat => "no heartbeat received from autopilot",
            ErrorKind::NoCommandAck => "no ack received after command",
            ErrorKind::FailedWrite => "could not write, transport error",
            ErrorKind::FailedRead => "could not read, transport error",
            ErrorKind::TransmitTimeout => "could not send message, timed out",
            ErrorKind::ReceiveTimeout => "did not get response, timed out",
            ErrorKind::CommandDenied => "command was denied by autopilot",
            ErrorKind::InvalidState => "operation is not allowed in current state",
            ErrorKind::Cancelled => "operation cancelled",
        };
        f.write_str(message)
    }
}

/// `mavbridge` error.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    kind: ErrorKind,
    #[source]
    source: Option<BoxedSource>,
}

impl Error {
    /// Creates an error of a specified `kind` without underlying source.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Creates an error of a specified `kind` caused by `source`.
    pub fn with_source(kind: ErrorKind, source: impl Into<BoxedSource>) -> Self {
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    /// Kind of this error.
    #[inline(always)]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Underlying transport or codec error, if any.
    pub fn transport_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    pub(crate) fn failed_write(err: impl Into<BoxedSource>) -> Self {
        Self::with_source(ErrorKind::FailedWrite, err)
    }

    pub(crate) fn failed_read(err: impl Into<BoxedSource>) -> Self {
        Self::with_source(ErrorKind::FailedRead, err)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl PartialEq<ErrorKind> for Error {
    fn eq(&self, other: &ErrorKind) -> bool {
        self.kind == *other
    }
}
