//! Envelope codec: classifies raw payloads and decodes request envelopes.
//!
//! A batch is split into its top-level elements *before* any element is
//! decoded, so one syntactically broken element only costs its own slot.

use serde_json::error::Category;
use serde_json::Value;

use crate::envelope::{Request, Response};
use crate::error::{ErrorKind, ErrorObject};
use crate::id::RequestId;

/// A classified inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame<'a> {
    Single(&'a str),
    /// Raw element texts, in input order. Never empty.
    Batch(Vec<&'a str>),
}

/// Classify a payload as a single envelope or a batch.
///
/// Failures are returned as the error response to send back, always with a
/// null id since nothing has been decoded yet.
pub fn split(bytes: &[u8]) -> Result<Frame<'_>, Response> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| rejection(ErrorObject::parse_error("request body is not valid UTF-8")))?;
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(rejection(ErrorObject::parse_error("empty request body")));
    }

    if trimmed.starts_with('[') {
        let elements = split_array(trimmed)
            .ok_or_else(|| rejection(ErrorObject::parse_error("invalid JSON batch")))?;
        if elements.len() == 1 && elements[0].is_empty() {
            return Err(rejection(ErrorObject::invalid_request("empty batch")));
        }
        return Ok(Frame::Batch(elements));
    }

    Ok(Frame::Single(trimmed))
}

/// Split `[a, b, ...]` at its depth-zero commas. `None` when the array is
/// never closed or text follows the closing bracket. Elements are returned
/// trimmed and may be empty.
fn split_array(text: &str) -> Option<Vec<&str>> {
    let mut elements = Vec::new();
    let mut start = 1;

    loop {
        // An unterminated string swallows the rest of the input; rescan that
        // element blind to quotes so its siblings keep their slots.
        let (end, closed) =
            element_end(text, start, true).or_else(|| element_end(text, start, false))?;
        elements.push(text[start..end].trim());
        if closed {
            return text[end + 1..].trim().is_empty().then_some(elements);
        }
        start = end + 1;
    }
}

/// Byte index of the depth-zero `,` or `]` that ends the element starting
/// at `from`, and whether it was the closing `]`.
fn element_end(text: &str, from: usize, quotes: bool) -> Option<(usize, bool)> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[from..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' if quotes => in_string = true,
            '[' | '{' => depth += 1,
            ']' if depth == 0 => return Some((from + offset, true)),
            ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some((from + offset, false)),
            _ => {}
        }
    }

    None
}

/// Decode a top-level (non-batch) envelope.
pub fn decode_request(text: &str) -> Result<Request, Response> {
    decode(text, ErrorKind::ParseError)
}

/// Decode one batch element. Valid JSON that is not an object is an
/// InvalidRequest here rather than a ParseError.
pub fn decode_element(text: &str) -> Result<Request, Response> {
    decode(text, ErrorKind::InvalidRequest)
}

fn decode(text: &str, non_object: ErrorKind) -> Result<Request, Response> {
    // Derived struct decoding also accepts arrays as positional fields.
    if !text.trim_start().starts_with('{') {
        let kind = match serde_json::from_str::<Value>(text) {
            Ok(_) => non_object,
            Err(_) => ErrorKind::ParseError,
        };
        return Err(rejection(ErrorObject::from_kind(kind)));
    }

    let err = match serde_json::from_str::<Request>(text) {
        Ok(request) => return Ok(request),
        Err(err) => err,
    };

    match err.classify() {
        Category::Syntax | Category::Eof | Category::Io => {
            tracing::debug!("malformed envelope: {err}");
            Err(rejection(ErrorObject::from_kind(ErrorKind::ParseError)))
        }
        Category::Data => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => {
                tracing::debug!("envelope has wrong member types: {err}");
                let id = RequestId::normalize(map.get("id")).unwrap_or(RequestId::Null);
                Err(Response::error(
                    id,
                    ErrorObject::from_kind(ErrorKind::InvalidRequest),
                ))
            }
            _ => Err(rejection(ErrorObject::from_kind(non_object))),
        },
    }
}

fn rejection(error: ErrorObject) -> Response {
    Response::error(RequestId::Null, error)
}

/// Render a decoded request back to its wire form.
pub fn encode_request(request: &Request) -> serde_json::Result<String> {
    serde_json::to_string(request)
}

pub fn encode_response(response: &Response) -> serde_json::Result<String> {
    serde_json::to_string(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(resp: &Response) -> i32 {
        resp.error_object().expect("error response").code
    }

    #[test]
    fn test_split_single() {
        assert_eq!(split(b"  {\"a\":1}\n").unwrap(), Frame::Single("{\"a\":1}"));
    }

    #[test]
    fn test_split_empty_body() {
        let resp = split(b"   \n\t").unwrap_err();
        assert_eq!(code(&resp), -32700);
        assert_eq!(resp.error_object().unwrap().message, "empty request body");
        assert_eq!(resp.id, RequestId::Null);
    }

    #[test]
    fn test_split_invalid_utf8() {
        assert_eq!(code(&split(&[0xff, 0xfe]).unwrap_err()), -32700);
    }

    #[test]
    fn test_split_empty_batch() {
        for input in ["[]", "[ ]", " [\n] "] {
            let resp = split(input.as_bytes()).unwrap_err();
            assert_eq!(code(&resp), -32600, "input {input:?}");
        }
    }

    #[test]
    fn test_split_batch_elements() {
        let frame = split(br#"[{"a":[1,2]}, "x,y", 3]"#).unwrap();
        assert_eq!(frame, Frame::Batch(vec![r#"{"a":[1,2]}"#, r#""x,y""#, "3"]));
    }

    #[test]
    fn test_split_keeps_broken_element() {
        let frame = split(br#"[{"id":1}, {"jsonrpc": }, {"id":3}]"#).unwrap();
        match frame {
            Frame::Batch(elements) => {
                assert_eq!(elements.len(), 3);
                assert_eq!(elements[1], r#"{"jsonrpc": }"#);
            }
            Frame::Single(_) => panic!("expected batch"),
        }
    }

    #[test]
    fn test_split_escaped_quote_in_string() {
        let frame = split(br#"["a\"]", 2]"#).unwrap();
        assert_eq!(frame, Frame::Batch(vec![r#""a\"]""#, "2"]));
    }

    #[test]
    fn test_split_unterminated_string_keeps_siblings() {
        let text = r#"[{"id":1}, {"method":"one, "id":2}, {"id":3}]"#;
        assert_eq!(
            split(text.as_bytes()).unwrap(),
            Frame::Batch(vec![r#"{"id":1}"#, r#"{"method":"one, "id":2}"#, r#"{"id":3}"#])
        );
        assert_eq!(
            split(br#"["abc]"#).unwrap(),
            Frame::Batch(vec![r#""abc"#])
        );
    }

    #[test]
    fn test_split_unclosed_batch() {
        for input in ["[1, 2", r#"[{"a":"x}"#, "[1] trailing"] {
            let resp = split(input.as_bytes()).unwrap_err();
            assert_eq!(code(&resp), -32700, "input {input:?}");
            assert_eq!(resp.error_object().unwrap().message, "invalid JSON batch");
        }
    }

    #[test]
    fn test_decode_invalid_json() {
        let resp = decode_request(r#"{"broken":"#).unwrap_err();
        assert_eq!(code(&resp), -32700);
        assert_eq!(resp.id, RequestId::Null);
    }

    #[test]
    fn test_decode_scalar_top_level_is_parse_error() {
        assert_eq!(code(&decode_request("42").unwrap_err()), -32700);
        assert_eq!(code(&decode_element("42").unwrap_err()), -32600);
    }

    #[test]
    fn test_decode_wrong_types_recovers_id() {
        let resp = decode_request(r#"{"jsonrpc":"2.0","method":5,"id":9}"#).unwrap_err();
        assert_eq!(code(&resp), -32600);
        assert_eq!(resp.id, RequestId::Number(9));
    }

    #[test]
    fn test_decode_array_element_is_not_a_request() {
        assert_eq!(code(&decode_element("[]").unwrap_err()), -32600);
        assert_eq!(code(&decode_element(r#"["2.0","m",null,1]"#).unwrap_err()), -32600);
    }

    #[test]
    fn test_decode_empty_element() {
        assert_eq!(code(&decode_element("").unwrap_err()), -32700);
    }

    #[test]
    fn test_round_trip_preserves_members() {
        let text = r#"{"jsonrpc":"2.0","method":"math.add","params":{"a":2,"b":3},"id":1}"#;
        let req = decode_request(text).unwrap();
        assert_eq!(encode_request(&req).unwrap(), text);
    }

    #[test]
    fn test_round_trip_notification_omits_id() {
        let text = r#"{"jsonrpc":"2.0","method":"text.concat","params":["x"]}"#;
        let req = decode_request(text).unwrap();
        assert!(req.is_notification());
        assert_eq!(encode_request(&req).unwrap(), text);
    }
}
