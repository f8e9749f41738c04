// LogScope - core/extract.rs
//
// Maps the captures of a successful pattern match into the typed field
// set of the matched format. One extraction function per field-set shape;
// nothing here inspects how many groups a pattern produced.
//
// Pure mapping: malformed numbers degrade to 0, unknown timestamps to None.

use crate::core::model::{
    AccessFields, CombinedFields, CustomFields, Entry, LogFormat, Record, RequestLine,
};
use crate::core::timestamp::parse_timestamp;
use crate::util::constants;
use regex::Captures;
use std::str::FromStr;

/// Build the entry for a line that matched the pattern of `format`.
pub fn extract(caps: &Captures<'_>, format: LogFormat, raw_line: &str) -> Entry {
    let record = match format {
        LogFormat::Apache => Record::Apache(extract_access(caps)),
        LogFormat::Common => Record::Common(extract_access(caps)),
        LogFormat::Nginx => Record::Nginx(extract_combined(caps)),
        LogFormat::Combined => Record::Combined(extract_combined(caps)),
        LogFormat::Custom => Record::Custom(extract_custom(caps)),
    };

    Entry {
        raw_line: raw_line.to_string(),
        line_number: None,
        record,
    }
}

fn extract_access(caps: &Captures<'_>) -> AccessFields {
    let request = group(caps, "request");
    AccessFields {
        ip: group(caps, "ip").to_string(),
        timestamp: parse_timestamp(group(caps, "timestamp")),
        request: request.to_string(),
        status: parse_number(group(caps, "status")),
        size: parse_number(group(caps, "size")),
        request_line: split_request(request),
    }
}

fn extract_combined(caps: &Captures<'_>) -> CombinedFields {
    let referer = group(caps, "referer");
    CombinedFields {
        access: extract_access(caps),
        referer: (referer != "-").then(|| referer.to_string()),
        user_agent: Some(group(caps, "user_agent").to_string()),
    }
}

fn extract_custom(caps: &Captures<'_>) -> CustomFields {
    CustomFields {
        timestamp: parse_timestamp(group(caps, "timestamp")),
        level: group(caps, "level").to_string(),
        message: group(caps, "message").to_string(),
    }
}

/// Text of a named group, empty if the group did not participate.
fn group<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map_or("", |m| m.as_str())
}

/// Numeric field with the "0 when not a number" rule. Values that do not
/// fit the target type count as not a number.
fn parse_number<T: FromStr + Default>(raw: &str) -> T {
    raw.parse().unwrap_or_default()
}

/// Split `"GET /path HTTP/1.0"` into its parts. Fewer than two tokens
/// yields `None`; a missing protocol defaults to HTTP/1.1.
pub fn split_request(request: &str) -> Option<RequestLine> {
    let mut tokens = request.split_whitespace();
    let method = tokens.next()?;
    let path = tokens.next()?;
    let protocol = tokens.next().unwrap_or(constants::DEFAULT_PROTOCOL);

    Some(RequestLine {
        method: method.to_string(),
        path: path.to_string(),
        protocol: protocol.to_string(),
    })
}
