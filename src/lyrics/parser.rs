//! Timestamped lyrics parsers.
//!
//! Two formats arrive from providers:
//! - LRC: `[mm:ss.cc] Lyrics line here`
//! - VTT-style cues: `mm:ss.mmm --> mm:ss.mmm` followed by text lines
//!
//! Both parsers are total: malformed lines are skipped, never an error.
//! Output order is input order; nothing is sorted here.

use crate::lyrics::Line;

/// Parse LRC content. Takes the first `[mm:ss.cc]` tag on each line,
/// drops lines whose remaining text is empty after trimming.
pub fn parse_lrc(content: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    for raw in content.lines() {
        if let Some((timestamp, rest)) = first_lrc_tag(raw) {
            let text = rest.trim();
            if !text.is_empty() {
                lines.push(Line {
                    timestamp,
                    text: text.to_string(),
                });
            }
        }
    }
    lines
}

/// Find the first valid `[min:sec.centi]` tag anywhere in the line and
/// return its value plus everything after the closing bracket.
fn first_lrc_tag(line: &str) -> Option<(f64, &str)> {
    let mut from = 0;
    while let Some(open) = line[from..].find('[') {
        let open = from + open;
        let close = line[open + 1..].find(']')? + open + 1;
        if let Some(ts) = parse_lrc_timestamp(&line[open + 1..close]) {
            return Some((ts, &line[close + 1..]));
        }
        from = open + 1;
    }
    None
}

fn parse_lrc_timestamp(tag: &str) -> Option<f64> {
    let (min, rest) = tag.split_once(':')?;
    let (sec, centi) = rest.split_once('.')?;
    let min: u64 = parse_digits(min)?;
    let sec: u64 = parse_digits(sec)?;
    let centi: u64 = parse_digits(centi)?;
    Some(min as f64 * 60.0 + sec as f64 + centi as f64 / 100.0)
}

fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse WebVTT-style content. A cue is a line with a `-->` separator whose
/// left side is a timestamp; the following non-blank lines up to the next
/// blank line or cue are the text, joined with single spaces. Text may be
/// empty if the cue is immediately followed by a blank line or another cue.
pub fn parse_vtt(content: &str) -> Vec<Line> {
    let raw: Vec<&str> = content.lines().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < raw.len() {
        let Some(timestamp) = cue_start(raw[i]) else {
            i += 1;
            continue;
        };
        i += 1;
        let mut parts: Vec<&str> = Vec::new();
        while i < raw.len() {
            let trimmed = raw[i].trim();
            if trimmed.is_empty() {
                i += 1;
                break;
            }
            if cue_start(trimmed).is_some() {
                // next cue starts here, leave it for the outer pass
                break;
            }
            parts.push(trimmed);
            i += 1;
        }
        out.push(Line {
            timestamp,
            text: parts.join(" "),
        });
    }
    out
}

fn cue_start(line: &str) -> Option<f64> {
    let (left, _) = line.split_once("-->")?;
    parse_vtt_timestamp(left.trim())
}

/// Field count picks the interpretation: `H:MM:SS.mmm`, `MM:SS.mmm` or
/// bare `SS.mmm`.
fn parse_vtt_timestamp(s: &str) -> Option<f64> {
    fn field(f: &str) -> Option<f64> {
        if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
            return None;
        }
        f.parse().ok()
    }
    let fields: Vec<&str> = s.split(':').collect();
    match fields.as_slice() {
        [h, m, sec] => Some(field(h)? * 3600.0 + field(m)? * 60.0 + field(sec)?),
        [m, sec] => Some(field(m)? * 60.0 + field(sec)?),
        [sec] => field(sec),
        _ => None,
    }
}

/// Extract the text between `<tag>` and `</tag>`, trimmed. If either tag is
/// missing, or the closing tag comes first, the input is returned unchanged
/// so that an undecorated response still flows through.
pub fn extract_between_tags(text: &str, tag: &str) -> String {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    match (text.find(&open), text.find(&close)) {
        (Some(start), Some(end)) if end > start => {
            text[start + open.len()..end].trim().to_string()
        }
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lrc_basic() {
        let lrc = "[00:12.34] First line\n[00:15.00]Second line";
        let lines = parse_lrc(lrc);
        assert_eq!(lines.len(), 2);
        assert!((lines[0].timestamp - 12.34).abs() < 1e-9);
        assert_eq!(lines[0].text, "First line");
        assert!((lines[1].timestamp - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_lrc_skips_metadata_and_garbage() {
        let lrc = "[ti:Some Title]\n[ar:Artist]\nnot a lyric\n[01:02.03]kept";
        let lines = parse_lrc(lrc);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "kept");
        assert!((lines[0].timestamp - 62.03).abs() < 1e-9);
    }

    #[test]
    fn test_lrc_drops_empty_text() {
        let lines = parse_lrc("[00:10.00]\n[00:11.00]   \n[00:12.00]word");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "word");
    }

    #[test]
    fn test_lrc_first_tag_only() {
        // multi-tag lines keep the first timestamp, the rest rides along as text
        let lines = parse_lrc("[00:10.00][00:20.00]doubled");
        assert_eq!(lines.len(), 1);
        assert!((lines[0].timestamp - 10.0).abs() < 1e-9);
        assert_eq!(lines[0].text, "[00:20.00]doubled");
    }

    #[test]
    fn test_lrc_preserves_input_order() {
        let lines = parse_lrc("[00:30.00]later\n[00:10.00]earlier");
        assert_eq!(lines[0].text, "later");
        assert_eq!(lines[1].text, "earlier");
    }

    #[test]
    fn test_vtt_cues_and_text_joining() {
        let vtt = "WEBVTT\n\n00:12.000 --> 00:15.000\nHello\nworld\n\n00:15.000 --> 00:18.000\nNext";
        let lines = parse_vtt(vtt);
        assert_eq!(lines.len(), 2);
        assert!((lines[0].timestamp - 12.0).abs() < 1e-9);
        assert_eq!(lines[0].text, "Hello world");
        assert_eq!(lines[1].text, "Next");
    }

    #[test]
    fn test_vtt_back_to_back_cues() {
        // second cue terminates the first's text block and is parsed itself
        let vtt = "00:01.000 --> 00:02.000\nfirst\n00:03.000 --> 00:04.000\nsecond";
        let lines = parse_vtt(vtt);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "first");
        assert_eq!(lines[1].text, "second");
    }

    #[test]
    fn test_vtt_empty_text_cue() {
        let lines = parse_vtt("00:01.000 --> 00:02.000\n\n00:03.000 --> 00:04.000\nwords");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "");
        assert_eq!(lines[1].text, "words");
    }

    #[test]
    fn test_vtt_timestamp_forms() {
        assert_eq!(parse_vtt_timestamp("1:02:03.500"), Some(3723.5));
        assert_eq!(parse_vtt_timestamp("02:03.500"), Some(123.5));
        assert_eq!(parse_vtt_timestamp("3.25"), Some(3.25));
        assert_eq!(parse_vtt_timestamp("not a time"), None);
    }

    #[test]
    fn test_extract_between_tags() {
        assert_eq!(
            extract_between_tags("noise <lyrics> hello </lyrics> trail", "lyrics"),
            "hello"
        );
        // missing tags pass the input through
        assert_eq!(extract_between_tags("no tags here", "lyrics"), "no tags here");
        // closing before opening also passes through
        assert_eq!(
            extract_between_tags("</lyrics>x<lyrics>", "lyrics"),
            "</lyrics>x<lyrics>"
        );
    }
}
