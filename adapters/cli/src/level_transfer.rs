use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use infiltration_core::LevelConfig;

const CODE_DOMAIN: &str = "level";
const CODE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded level payload.
pub(crate) const CODE_HEADER: &str = "level:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a level into a single-line share code.
pub(crate) fn encode(level: &LevelConfig) -> Result<String, LevelTransferError> {
    let json = serde_json::to_vec(level).map_err(LevelTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{CODE_HEADER}:{}x{}:{encoded}", level.columns, level.rows))
}

/// Decodes a level from its share code.
///
/// The grid dimensions in the header must agree with the payload.
pub(crate) fn decode(value: &str) -> Result<LevelConfig, LevelTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LevelTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(LevelTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(LevelTransferError::MissingVersion)?;
    let dimensions = parts.next().ok_or(LevelTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(LevelTransferError::MissingPayload)?;

    if domain != CODE_DOMAIN {
        return Err(LevelTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != CODE_VERSION {
        return Err(LevelTransferError::UnsupportedVersion(version.to_owned()));
    }

    let (columns, rows) = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LevelTransferError::InvalidEncoding)?;
    let level: LevelConfig =
        serde_json::from_slice(&bytes).map_err(LevelTransferError::InvalidPayload)?;

    if (level.columns, level.rows) != (columns, rows) {
        return Err(LevelTransferError::DimensionMismatch {
            header: (columns, rows),
            payload: (level.columns, level.rows),
        });
    }

    Ok(level)
}

/// Errors that can occur while encoding or decoding level share codes.
#[derive(Debug)]
pub(crate) enum LevelTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the code.
    MissingPrefix,
    /// The code did not contain a version segment.
    MissingVersion,
    /// The code did not include grid dimensions.
    MissingDimensions,
    /// The code did not include the payload segment.
    MissingPayload,
    /// The code used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The code used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the code.
    InvalidDimensions(String),
    /// The header dimensions disagree with the embedded level.
    DimensionMismatch {
        /// Dimensions announced by the header.
        header: (u32, u32),
        /// Dimensions stored in the payload.
        payload: (u32, u32),
    },
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for LevelTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "level code was empty"),
            Self::MissingPrefix => write!(f, "level code is missing the prefix"),
            Self::MissingVersion => write!(f, "level code is missing the version"),
            Self::MissingDimensions => write!(f, "level code is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "level code is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "level code prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "level code version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::DimensionMismatch { header, payload } => write!(
                f,
                "header announces a {}x{} grid but the level is {}x{}",
                header.0, header.1, payload.0, payload.1
            ),
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode level payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse level payload: {error}")
            }
        }
    }
}

impl Error for LevelTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LevelTransferError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LevelTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| LevelTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| LevelTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(LevelTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use infiltration_core::{DetectionPolicy, TileRect};

    fn level() -> LevelConfig {
        let mut level = LevelConfig::new(
            12,
            8,
            vec![TileRect::new(1, 1, 3, 3), TileRect::new(7, 2, 4, 4)],
            1,
            0,
        );
        level.corridors.push(TileRect::new(4, 2, 3, 1));
        level.guard_rooms = Some(vec![1]);
        level.detection = DetectionPolicy::HardFail;
        level
    }

    #[test]
    fn codes_carry_the_header_and_the_full_level() {
        let code = encode(&level()).expect("level serialises");
        assert!(code.starts_with(&format!("{CODE_HEADER}:12x8:")));

        assert_eq!(decode(&code).expect("code decodes"), level());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let code = encode(&level()).expect("level serialises");

        assert!(decode(&format!("  {code}\n")).is_ok());
    }

    #[test]
    fn foreign_prefixes_and_versions_are_rejected() {
        assert!(matches!(
            decode("maze:v1:12x8:e30"),
            Err(LevelTransferError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            decode("level:v2:12x8:e30"),
            Err(LevelTransferError::UnsupportedVersion(version)) if version == "v2"
        ));
        assert!(matches!(decode("   "), Err(LevelTransferError::EmptyPayload)));
        assert!(matches!(
            decode("level:v1"),
            Err(LevelTransferError::MissingDimensions)
        ));
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let code = encode(&level()).expect("level serialises");
        let tampered = code.replacen("12x8", "10x8", 1);

        assert!(matches!(
            decode(&tampered),
            Err(LevelTransferError::DimensionMismatch {
                header: (10, 8),
                payload: (12, 8)
            })
        ));
    }

    #[test]
    fn zero_sized_or_garbled_dimensions_are_rejected() {
        assert!(matches!(
            decode("level:v1:0x8:e30"),
            Err(LevelTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode("level:v1:twelve:e30"),
            Err(LevelTransferError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn corrupt_payloads_surface_their_cause() {
        let error = decode("level:v1:12x8:!!!").expect_err("invalid base64");

        assert!(matches!(error, LevelTransferError::InvalidEncoding(_)));
        assert!(error.source().is_some());
    }
}
