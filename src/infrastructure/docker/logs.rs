//! Log de-framing and scrubbing (spec.md §4.7 step 7).

/// Scrub non-printable control characters (keeping TAB and LF) out of an
/// already-demultiplexed log payload and trim trailing whitespace. Use this
/// directly on bytes bollard's typed `LogOutput` API has already split by
/// stream — it strips no framing of its own.
pub fn scrub(raw: &[u8]) -> String {
    let scrubbed: String = String::from_utf8_lossy(raw)
        .chars()
        .filter(|c| !c.is_control() || *c == '\t' || *c == '\n')
        .collect();

    scrubbed.trim_end().to_string()
}

/// Strip the 8-byte per-frame header the container runtime prepends to
/// multiplexed stdout/stderr streams (1 stream-type byte, 3 reserved bytes,
/// 4-byte big-endian payload length), then scrub and trim as [`scrub`] does.
/// For raw, not-yet-demultiplexed bytes only — bollard's typed log API
/// demultiplexes internally and must not be passed through this a second
/// time (use [`scrub`] instead).
pub fn deframe(raw: &[u8]) -> String {
    let mut payload = Vec::with_capacity(raw.len());
    let mut offset = 0;
    while offset + 8 <= raw.len() {
        let len = u32::from_be_bytes([raw[offset + 4], raw[offset + 5], raw[offset + 6], raw[offset + 7]]) as usize;
        let start = offset + 8;
        let end = (start + len).min(raw.len());
        payload.extend_from_slice(&raw[start..end]);
        if end <= start {
            break;
        }
        offset = end;
    }

    // Frames that don't parse as the expected multiplexed format (e.g. a
    // tty-attached container, which bollard streams unframed) fall back to
    // treating the whole buffer as plain text.
    let text_bytes = if payload.is_empty() && !raw.is_empty() {
        raw
    } else {
        &payload
    };

    scrub(text_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(stream_type: u8, payload: &[u8]) -> Vec<u8> {
        let mut frame = vec![stream_type, 0, 0, 0];
        frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        frame.extend_from_slice(payload);
        frame
    }

    #[test]
    fn strips_single_frame_header() {
        let raw = frame(1, b"hello\n");
        assert_eq!(deframe(&raw), "hello");
    }

    #[test]
    fn concatenates_multiple_frames() {
        let mut raw = frame(1, b"line one\n");
        raw.extend(frame(2, b"line two\n"));
        assert_eq!(deframe(&raw), "line one\nline two");
    }

    #[test]
    fn strips_control_characters_but_keeps_tab_and_newline() {
        let raw = frame(1, b"a\x07b\tc\n");
        assert_eq!(deframe(&raw), "ab\tc");
    }

    #[test]
    fn falls_back_to_plain_text_when_unframed() {
        assert_eq!(deframe(b"plain output\n"), "plain output");
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(deframe(b""), "");
    }

    #[test]
    fn scrub_passes_already_demultiplexed_bytes_through_unframed() {
        assert_eq!(scrub(b"hello world\n"), "hello world");
    }

    #[test]
    fn scrub_strips_control_characters_but_keeps_tab_and_newline() {
        assert_eq!(scrub(b"a\x07b\tc\n"), "ab\tc");
    }
}
