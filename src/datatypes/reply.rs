// ABOUTME: Shared parsing helpers for textual AT replies
// ABOUTME: Extracts comma-separated integer fields, signal strength and SBDRT message bodies

use crate::client::error::{SbdError, SbdResult};

/// Prefix the modem places before a text message read with `AT+SBDRT`
pub const SBDRT_PREFIX: &str = "+SBDRT:";

/// Token closing a successful reply
pub const OK_TOKEN: &str = "OK";

/// Parse the `N` comma-separated integers that follow `prefix` in `reply`.
///
/// The reply may contain earlier lines (command echo, blank lines); only
/// the line that carries `prefix` is considered, up to its line break.
pub fn parse_fields<const N: usize>(reply: &str, prefix: &str) -> SbdResult<[i32; N]> {
    let start = reply
        .find(prefix)
        .ok_or_else(|| SbdError::protocol(reply, format!("missing {prefix} prefix")))?;
    let payload = &reply[start + prefix.len()..];
    let line = payload
        .split(['\r', '\n'])
        .next()
        .unwrap_or_default();

    let mut fields = [0i32; N];
    let mut count = 0;
    for raw in line.split(',') {
        if count == N {
            return Err(SbdError::protocol(
                reply,
                format!("expected {N} fields after {prefix}"),
            ));
        }
        fields[count] = raw.trim().parse().map_err(|_| {
            SbdError::protocol(reply, format!("field {count} ({:?}) is not an integer", raw.trim()))
        })?;
        count += 1;
    }

    if count != N {
        return Err(SbdError::protocol(
            reply,
            format!("expected {N} fields after {prefix}, found {count}"),
        ));
    }
    Ok(fields)
}

/// Parse the `<rssi>` digit of a `+CSQ:<rssi>` reply (0–5).
pub fn parse_signal_strength(reply: &str) -> SbdResult<u8> {
    const PREFIX: &str = "+CSQ:";
    let start = reply
        .find(PREFIX)
        .ok_or_else(|| SbdError::protocol(reply, "missing +CSQ: prefix"))?;
    reply[start + PREFIX.len()..]
        .trim_start()
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as u8)
        .ok_or_else(|| SbdError::protocol(reply, "signal strength is not a digit"))
}

/// Strip the `+SBDRT:` marker and the closing `OK` line from a text read.
///
/// ```text
/// +SBDRT:<CR>05/11/14, 14:39. Test message.<CR>OK<CR>
/// ```
///
/// yields `05/11/14, 14:39. Test message.`
///
/// The reader stops at the first line break once `OK` has been seen, so a
/// body that itself contains `OK` arrives without the closing line. In that
/// case the body is returned up to the terminator.
pub fn extract_message_text(reply: &str) -> SbdResult<String> {
    let start = reply
        .find(SBDRT_PREFIX)
        .ok_or_else(|| SbdError::protocol(reply, "missing +SBDRT: prefix"))?;
    let body = reply[start + SBDRT_PREFIX.len()..].trim_end_matches(['\r', '\n']);
    let body = match body.rfind(['\r', '\n']) {
        Some(idx) if &body[idx + 1..] == OK_TOKEN => &body[..idx],
        None if body == OK_TOKEN => "",
        _ => body,
    };
    Ok(body.trim_matches(['\r', '\n']).to_string())
}

/// Whether `needle` occurs anywhere in `haystack`. An empty needle always matches.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}
