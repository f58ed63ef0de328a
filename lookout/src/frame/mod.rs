use std::io::Error;
use std::io::ErrorKind;

use bincode::Decode;
use bincode::Encode;

use bincode::config;
use bincode::config::Configuration;
use bincode::config::Fixint;
use bincode::config::Limit;
use bincode::config::LittleEndian;
use bincode::error::DecodeError;

use bytes::Buf;
use bytes::BufMut;
use bytes::BytesMut;

use tokio_util::codec::Decoder;
use tokio_util::codec::Encoder;

mod demonitor;
mod demonitor_reply;
mod monitor;
mod monitor_reply;
mod process_down;

pub use demonitor::*;
pub use demonitor_reply::*;
pub use monitor::*;
pub use monitor_reply::*;
pub use process_down::*;

/// The largest frame the codec accepts, in bytes.
pub const FRAME_LIMIT: usize = 64 * 1024;

/// Bincode configuration for the frame codec.
const FRAME_CONFIG: Configuration<LittleEndian, Fixint, Limit<FRAME_LIMIT>> = config::standard()
    .with_fixed_int_encoding()
    .with_little_endian()
    .with_limit::<FRAME_LIMIT>();

/// A unit of the monitor protocol exchanged between monitor services.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum Frame {
    Monitor(Monitor),
    MonitorReply(MonitorReply),
    Demonitor(Demonitor),
    DemonitorReply(DemonitorReply),
    ProcessDown(ProcessDown),
}

impl Frame {
    /// Returns the frame kind, used for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Monitor(_) => "monitor",
            Self::MonitorReply(_) => "monitor_reply",
            Self::Demonitor(_) => "demonitor",
            Self::DemonitorReply(_) => "demonitor_reply",
            Self::ProcessDown(_) => "process_down",
        }
    }
}

impl From<Monitor> for Frame {
    fn from(value: Monitor) -> Self {
        Self::Monitor(value)
    }
}

impl From<MonitorReply> for Frame {
    fn from(value: MonitorReply) -> Self {
        Self::MonitorReply(value)
    }
}

impl From<Demonitor> for Frame {
    fn from(value: Demonitor) -> Self {
        Self::Demonitor(value)
    }
}

impl From<DemonitorReply> for Frame {
    fn from(value: DemonitorReply) -> Self {
        Self::DemonitorReply(value)
    }
}

impl From<ProcessDown> for Frame {
    fn from(value: ProcessDown) -> Self {
        Self::ProcessDown(value)
    }
}

/// The frame codec.
#[derive(Default)]
pub struct Codec;

impl Codec {
    /// Constructs a new instance of [Codec] with default settings.
    pub const fn new() -> Self {
        Self
    }
}

impl Encoder<Frame> for Codec {
    type Error = Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        bincode::encode_into_std_write(item, &mut dst.writer(), FRAME_CONFIG)
            .map_err(|e| Error::new(ErrorKind::InvalidInput, e))?;
        Ok(())
    }
}

impl Decoder for Codec {
    type Item = Frame;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let result = bincode::decode_from_slice(&src[..], FRAME_CONFIG);

        match result {
            Ok((frame, length)) => {
                src.advance(length);
                Ok(Some(frame))
            }
            Err(DecodeError::UnexpectedEnd { additional })
                if src.len().saturating_add(additional) <= FRAME_LIMIT =>
            {
                Ok(None)
            }
            Err(DecodeError::UnexpectedEnd { .. }) | Err(DecodeError::LimitExceeded) => Err(
                Error::new(ErrorKind::InvalidData, "frame exceeds the size limit"),
            ),
            Err(e) => Err(Error::new(ErrorKind::InvalidData, e)),
        }
    }
}
