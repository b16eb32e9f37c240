//! # Inbound messages

use mavio::dialects::Common;
use mavio::io::StdIoReader;
use mavio::protocol::{MavLinkVersion, Versionless};
use mavio::{Frame, Receiver};

use crate::core::consts::{MSG_ID_COMMAND_ACK, MSG_ID_GLOBAL_POSITION_INT};
use crate::errors::{Error, ErrorKind, Result};
use crate::protocol::{ComponentId, MessageId, SystemId};

/// `MAVLink` protocol version of a received frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum WireVersion {
    /// `MAVLink 1`
    V1,
    /// `MAVLink 2`
    V2,
}

/// Complete frame received from the autopilot.
///
/// Only frames with a valid checksum for the `common` dialect are represented. Header fields are
/// available immediately, typed payload decoding is performed on demand.
#[derive(Clone, Debug)]
pub struct DecodedMessage {
    frame: Frame<Versionless>,
    bytes: Vec<u8>,
}

/// Acknowledgment of a command.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CommandAck {
    /// Acknowledged `MAV_CMD`.
    pub command: u16,
    /// `MAV_RESULT` value.
    pub result: u8,
}

/// Global position of the vehicle as reported by `GLOBAL_POSITION_INT`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GlobalPosition {
    /// Milliseconds since autopilot boot.
    pub time_boot_ms: u32,
    /// Latitude in degrees.
    pub latitude_deg: f64,
    /// Longitude in degrees.
    pub longitude_deg: f64,
    /// Altitude above mean sea level in meters.
    pub altitude_m: f32,
    /// Altitude above home in meters.
    pub relative_altitude_m: f32,
    /// Heading in degrees, `None` if unknown.
    pub heading_deg: Option<f32>,
}

impl DecodedMessage {
    /// Parses a complete wire frame.
    ///
    /// Fails with [`ErrorKind::FailedRead`] if `bytes` is not a single well-formed frame of the
    /// `common` dialect with a valid checksum. Trailing bytes are rejected.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = bytes;
        let frame = Receiver::versionless(StdIoReader::new(&mut reader))
            .recv()
            .map_err(|err| Error::with_source(ErrorKind::FailedRead, err))?;

        if !reader.is_empty() {
            return Err(Error::with_source(
                ErrorKind::FailedRead,
                format!("{} trailing bytes after frame", reader.len()),
            ));
        }

        frame
            .validate_checksum::<Common>()
            .map_err(|err| Error::with_source(ErrorKind::FailedRead, err))?;

        Ok(Self {
            frame,
            bytes: bytes.to_vec(),
        })
    }

    /// `MAVLink` version of the frame.
    #[inline]
    pub fn version(&self) -> WireVersion {
        match self.frame.version() {
            MavLinkVersion::V1 => WireVersion::V1,
            MavLinkVersion::V2 => WireVersion::V2,
        }
    }

    /// Sender's packet sequence number.
    #[inline(always)]
    pub fn sequence(&self) -> u8 {
        self.frame.sequence()
    }

    /// Sender's system `ID`.
    #[inline(always)]
    pub fn system_id(&self) -> SystemId {
        self.frame.system_id()
    }

    /// Sender's component `ID`.
    #[inline(always)]
    pub fn component_id(&self) -> ComponentId {
        self.frame.component_id()
    }

    /// Message `ID` (message kind).
    #[inline(always)]
    pub fn message_id(&self) -> MessageId {
        self.frame.message_id()
    }

    /// Raw frame bytes including header and checksum.
    #[inline(always)]
    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Underlying `mavio` frame.
    #[inline(always)]
    pub fn frame(&self) -> &Frame<Versionless> {
        &self.frame
    }

    /// Decodes frame into a message of the `common` dialect.
    ///
    /// Fails with [`ErrorKind::FailedRead`] if the payload can't be decoded.
    pub fn decode(&self) -> Result<Common> {
        self.frame
            .decode::<Common>()
            .map_err(|err| Error::with_source(ErrorKind::FailedRead, err))
    }

    /// Decodes `COMMAND_ACK`.
    ///
    /// Returns `None` if this is a different message.
    pub fn command_ack(&self) -> Result<Option<CommandAck>> {
        if self.message_id() != MSG_ID_COMMAND_ACK {
            return Ok(None);
        }
        match self.decode()? {
            Common::CommandAck(ack) => Ok(Some(CommandAck {
                command: ack.command as u16,
                result: ack.result as u8,
            })),
            _ => Ok(None),
        }
    }

    /// Decodes `GLOBAL_POSITION_INT`.
    ///
    /// Returns `None` if this is a different message.
    pub fn global_position(&self) -> Result<Option<GlobalPosition>> {
        if self.message_id() != MSG_ID_GLOBAL_POSITION_INT {
            return Ok(None);
        }
        match self.decode()? {
            Common::GlobalPositionInt(pos) => Ok(Some(GlobalPosition {
                time_boot_ms: pos.time_boot_ms,
                latitude_deg: pos.lat as f64 / 1e7,
                longitude_deg: pos.lon as f64 / 1e7,
                altitude_m: pos.alt as f32 / 1000.0,
                relative_altitude_m: pos.relative_alt as f32 / 1000.0,
                heading_deg: match pos.hdg {
                    u16::MAX => None,
                    hdg => Some(hdg as f32 / 100.0),
                },
            })),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use mavio::dialects::common::enums::MavResult;

    use super::*;
    use crate::protocol::MavCommand;
    use crate::test_utils::{corrupt_checksum, encode_command_ack, encode_global_position};

    #[test]
    fn parses_valid_frame() {
        let bytes = encode_command_ack(MavCommand::ArmDisarm, MavResult::Denied);

        let message = DecodedMessage::parse(&bytes).unwrap();

        assert_eq!(message.version(), WireVersion::V2);
        assert_eq!(message.system_id(), 1);
        assert_eq!(message.component_id(), 1);
        assert_eq!(message.message_id(), MSG_ID_COMMAND_ACK);
        assert_eq!(message.bytes(), bytes.as_slice());
        assert_eq!(
            message.command_ack().unwrap(),
            Some(CommandAck {
                command: 400,
                result: MavResult::Denied as u8,
            })
        );
        assert!(message.global_position().unwrap().is_none());
    }

    #[test]
    fn rejects_invalid_checksum() {
        let bytes = corrupt_checksum(encode_command_ack(
            MavCommand::ArmDisarm,
            MavResult::Accepted,
        ));

        let err = DecodedMessage::parse(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedRead);
    }

    #[test]
    fn rejects_truncated_and_oversized_input() {
        let bytes = encode_command_ack(MavCommand::ArmDisarm, MavResult::Accepted);

        assert!(DecodedMessage::parse(&bytes[..bytes.len() - 1]).is_err());

        let mut doubled = bytes.clone();
        doubled.extend_from_slice(&bytes);
        assert!(DecodedMessage::parse(&doubled).is_err());
    }

    #[test]
    fn global_position_is_scaled() {
        let bytes = encode_global_position(47.5, 8.25, 420.0, 10.0);

        let position = DecodedMessage::parse(&bytes)
            .unwrap()
            .global_position()
            .unwrap()
            .unwrap();

        assert!((position.latitude_deg - 47.5).abs() < 1e-6);
        assert!((position.longitude_deg - 8.25).abs() < 1e-6);
        assert_eq!(position.altitude_m, 420.0);
        assert_eq!(position.relative_altitude_m, 10.0);
        assert_eq!(position.heading_deg, None);
    }
}
