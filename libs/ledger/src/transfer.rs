//! Transfer reply decoding
//!
//! Assets reply to a transfer either with nothing or with an ABI-encoded
//! boolean. No payload counts as success and a boolean must be `true`. Any
//! other payload is treated as a failed transfer.

use ethabi::{ParamType, Token};

/// Decode a transfer reply
///
/// `Ok(true)` is a success and `Ok(false)` an asset that refused and moved
/// nothing. `Err` carries the reason a payload could not be read; the funds
/// did move in that case.
pub fn decode_reply(payload: Option<&[u8]>) -> Result<bool, String> {
    let data = match payload {
        None => return Ok(true),
        Some(data) if data.is_empty() => return Ok(true),
        Some(data) => data,
    };

    let tokens = ethabi::decode(&[ParamType::Bool], data)
        .map_err(|e| format!("unparseable transfer reply 0x{}: {}", hex::encode(data), e))?;

    match tokens.first() {
        Some(Token::Bool(value)) => Ok(*value),
        _ => Err(format!("unexpected transfer reply 0x{}", hex::encode(data))),
    }
}

/// ABI encoding of a boolean reply
pub fn encode_bool_reply(value: bool) -> Vec<u8> {
    ethabi::encode(&[Token::Bool(value)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_empty_payload_is_success() {
        assert_eq!(decode_reply(None), Ok(true));
        assert_eq!(decode_reply(Some(&[])), Ok(true));
    }

    #[test]
    fn test_boolean_payload() {
        assert_eq!(decode_reply(Some(&encode_bool_reply(true))), Ok(true));
        assert_eq!(decode_reply(Some(&encode_bool_reply(false))), Ok(false));
    }

    #[test]
    fn test_garbage_payload_is_failure() {
        let err = decode_reply(Some(&[0x01, 0x02])).unwrap_err();
        assert!(err.contains("0x0102"));

        // A full word that is not a valid boolean
        let mut word = [0u8; 32];
        word[31] = 2;
        assert!(decode_reply(Some(&word)).is_err());
    }
}
