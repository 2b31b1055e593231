//! PsychoPy filename extractor
//!
//! PsychoPy names data files `<participant>_<expName>_<date>`, where the date
//! is `YYYY-MM-DD_HHhMM.SS.mmm`, e.g.
//! `P1_time_perception_2021-07-16_09h56.52.759.log.gz`.

use crate::error::ExtractError;
use crate::types::ExperimentMetadata;
use std::path::Path;

use super::MetadataExtractor;

/// Positional template of the datetime stamp; `#` is an ASCII digit, every
/// other byte is literal.
const STAMP_TEMPLATE: &[u8; 23] = b"####-##-##_##h##.##.###";

/// PsychoPy filename extractor
pub struct PsychopyFilename;

impl MetadataExtractor for PsychopyFilename {
    fn extract(&self, path: &Path) -> Result<ExperimentMetadata, ExtractError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let stamp = find_stamp(&filename)
            .ok_or_else(|| ExtractError::MetadataFormat(filename.clone()))?;

        // Byte offsets into an all-ASCII stamp
        let date = &stamp[0..10];
        let (hour, minute, second, ms) = (&stamp[11..13], &stamp[14..16], &stamp[17..19], &stamp[20..23]);

        Ok(ExperimentMetadata {
            experiment_date: date.to_string(),
            experiment_time: format!("{hour}:{minute}:{second}.{ms}"),
        })
    }
}

/// Locate the leftmost datetime stamp in a filename.
fn find_stamp(filename: &str) -> Option<&str> {
    let bytes = filename.as_bytes();
    if bytes.len() < STAMP_TEMPLATE.len() {
        return None;
    }

    (0..=bytes.len() - STAMP_TEMPLATE.len())
        .find(|&start| matches_template(&bytes[start..start + STAMP_TEMPLATE.len()]))
        // A matched window is pure ASCII, so both ends are char boundaries.
        .map(|start| &filename[start..start + STAMP_TEMPLATE.len()])
}

fn matches_template(window: &[u8]) -> bool {
    window
        .iter()
        .zip(STAMP_TEMPLATE.iter())
        .all(|(&b, &t)| match t {
            b'#' => b.is_ascii_digit(),
            literal => b == literal,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(name: &str) -> Result<ExperimentMetadata, ExtractError> {
        PsychopyFilename.extract(Path::new(name))
    }

    #[test]
    fn test_extract_gzip_name() {
        let meta = extract(
            "/data/raw/beh/PARTICIPANT_time_perception_2Phases_ENRU_2021-07-16_09h56.52.759.log.gz",
        )
        .unwrap();

        assert_eq!(
            meta,
            ExperimentMetadata {
                experiment_date: "2021-07-16".to_string(),
                experiment_time: "09:56:52.759".to_string(),
            }
        );
    }

    #[test]
    fn test_extract_plain_name() {
        let meta = extract("P1_2021-07-16_09h56.52.759.log").unwrap();
        assert_eq!(meta.experiment_date, "2021-07-16");
        assert_eq!(meta.experiment_time, "09:56:52.759");
    }

    #[test]
    fn test_only_basename_is_searched() {
        let err = extract("/2021-07-16_09h56.52.759/participant.log").unwrap_err();
        assert!(matches!(err, ExtractError::MetadataFormat(ref name) if name == "participant.log"));
    }

    #[test]
    fn test_leftmost_stamp_wins() {
        let meta = extract("a_2020-01-02_03h04.05.006_b_2021-07-16_09h56.52.759.log").unwrap();
        assert_eq!(meta.experiment_date, "2020-01-02");
        assert_eq!(meta.experiment_time, "03:04:05.006");
    }

    #[test]
    fn test_rejects_wrong_widths() {
        assert!(extract("P1_2021-07-16_9h56.52.759.log").is_err());
        assert!(extract("P1_2021-07-16_09h56.52.75.log").is_err());
        assert!(extract("P1_2021-07-16 09h56.52.759.log").is_err());
        assert!(extract("P1_2021-07-16_09:56:52.759.log").is_err());
        assert!(extract("short.log").is_err());
    }

    #[test]
    fn test_error_message_names_the_file() {
        let err = extract("/tmp/participant.log").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not extract experiment datetime from filename: participant.log"
        );
    }

    #[test]
    fn test_non_ascii_prefix() {
        let meta = extract("Übung_2021-07-16_09h56.52.759.log").unwrap();
        assert_eq!(meta.experiment_time, "09:56:52.759");
    }
}
