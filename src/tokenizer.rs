//! Event tokenizer
//!
//! Turns raw PsychoPy log text into [`LogEvent`]s. Each line is
//! `time<TAB>type<TAB>message`; lines with fewer than three fields or a
//! non-numeric time are skipped without complaint, since instrument logs
//! routinely carry continuation lines and banners.

use crate::error::ExtractError;
use crate::types::LogEvent;
use flate2::read::MultiGzDecoder;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Buffer size for reading log files (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Parse one log line. Returns `None` for lines that are not events.
///
/// The line terminator, if present, is ignored. Fields beyond the third are
/// discarded.
pub fn parse_line(line: &str) -> Option<LogEvent> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let mut fields = line.split('\t');
    let time_field = fields.next()?;
    let event_type = fields.next()?;
    let message = fields.next()?;

    // PsychoPy pads the time column ("1.2345 \t"), so surrounding whitespace
    // is not part of the number.
    let timestamp: f64 = time_field.trim().parse().ok()?;

    Some(LogEvent::new(timestamp, event_type, message))
}

/// Whether the path names a gzip-compressed log
pub fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Lazy, single-pass iterator of events over any buffered reader.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. Invalid UTF-8 is replaced
/// rather than rejected. Only I/O failures surface as errors.
pub struct EventReader<R> {
    reader: R,
    buffer: Vec<u8>,
    /// Events parsed from a chunk that held several `\r`-terminated lines
    pending: VecDeque<LogEvent>,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(256),
            pending: VecDeque::new(),
        }
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = io::Result<LogEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }

            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    let decoded = String::from_utf8_lossy(&self.buffer);
                    let chunk: &str = &decoded;
                    let chunk = chunk.strip_suffix('\n').unwrap_or(chunk);
                    let chunk = chunk.strip_suffix('\r').unwrap_or(chunk);
                    self.pending.extend(chunk.split('\r').filter_map(parse_line));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Open a log file for event iteration, decompressing `.gz` files.
pub fn open_log(path: &Path) -> Result<EventReader<Box<dyn BufRead>>, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::MissingInput(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let inner: Box<dyn Read> = if is_gzip(path) {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let reader: Box<dyn BufRead> = Box::new(BufReader::with_capacity(BUFFER_SIZE, inner));
    Ok(EventReader::new(reader))
}

/// Read every event of a log file into memory.
///
/// The file is closed before this returns.
pub fn read_events(path: &Path) -> Result<Vec<LogEvent>, ExtractError> {
    let events = open_log(path)?.collect::<io::Result<Vec<_>>>()?;
    log::debug!("{}: {} events", path.display(), events.len());
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};

    #[test]
    fn test_parse_line_valid() {
        let event = parse_line("1.5000 \tEXP \tfirstImg: autoDraw = true\n").unwrap();
        assert_eq!(event.timestamp, 1.5);
        assert_eq!(event.event_type, "EXP ");
        assert_eq!(event.message, "firstImg: autoDraw = true");
    }

    #[test]
    fn test_parse_line_drops_short_and_non_numeric() {
        assert!(parse_line("1.0\tDATA").is_none());
        assert!(parse_line("no tabs at all").is_none());
        assert!(parse_line("").is_none());
        assert!(parse_line("abc\tDATA\tKeydown: 1").is_none());
        assert!(parse_line("\tDATA\tKeydown: 1").is_none());
    }

    #[test]
    fn test_parse_line_keeps_only_third_field_as_message() {
        let event = parse_line("2.0\tDATA\tpart one\tpart two").unwrap();
        assert_eq!(event.message, "part one");
    }

    #[test]
    fn test_parse_line_strips_crlf() {
        let event = parse_line("2.0\tDATA\tKeydown: 1\r\n").unwrap();
        assert_eq!(event.message, "Keydown: 1");
    }

    #[test]
    fn test_reader_counts_valid_lines_in_order() {
        let text = "header line\n\
                    1.0\tEXP\ta\n\
                    bad\tEXP\tb\n\
                    2.0\tEXP\n\
                    3.0\tDATA\tc\n\
                    \n\
                    4.0\tDATA\td";
        let events: Vec<LogEvent> = EventReader::new(Cursor::new(text))
            .collect::<io::Result<_>>()
            .unwrap();

        let messages: Vec<&str> = events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_reader_splits_on_bare_carriage_returns() {
        let text = "1.0\tEXP\ta\r2.0\tEXP\tb\rjunk\r3.0\tEXP\tc\r";
        let events: Vec<LogEvent> = EventReader::new(Cursor::new(text))
            .collect::<io::Result<_>>()
            .unwrap();

        let messages: Vec<&str> = events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reader_mixed_line_endings() {
        let text = "1.0\tEXP\ta\r\n2.0\tEXP\tb\n3.0\tEXP\tc\r4.0\tEXP\td";
        let events: Vec<LogEvent> = EventReader::new(Cursor::new(text))
            .collect::<io::Result<_>>()
            .unwrap();

        let messages: Vec<&str> = events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "c", "d"]);
        assert_eq!(events[3].timestamp, 4.0);
    }

    #[test]
    fn test_reader_replaces_invalid_utf8() {
        let bytes: Vec<u8> = b"1.0\tEXP\tcaf\xff\n2.0\tEXP\tok\n".to_vec();
        let events: Vec<LogEvent> = EventReader::new(Cursor::new(bytes))
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "caf\u{FFFD}");
    }

    #[test]
    fn test_read_events_plain_and_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let text = "1.0\tEXP\tone\n2.0\tEXP\ttwo\n";

        let plain = dir.path().join("a.log");
        std::fs::write(&plain, text).unwrap();

        let gz = dir.path().join("a.log.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let from_plain = read_events(&plain).unwrap();
        let from_gz = read_events(&gz).unwrap();
        assert_eq!(from_plain.len(), 2);
        assert_eq!(from_plain, from_gz);
    }

    #[test]
    fn test_read_events_missing_file() {
        let err = read_events(Path::new("/nonexistent/psylog/x.log")).unwrap_err();
        assert!(matches!(err, ExtractError::MissingInput(_)));
    }
}
