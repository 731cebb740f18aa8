use crate::gdrom::gdi::error::{GdiError, GdiResult};
use crate::gdrom::gdi::models::{Ctrl, GdiSheet, TrackRecord, TrailerField};
use std::io::{BufRead, Cursor};
use std::path::{Path, PathBuf};

pub mod error;
pub mod models;

/// Parser for the GDI descriptor format: a track-count line followed by one
/// whitespace-separated record per track
/// (`number fad_start ctrl sector_size file_name trailer`).
pub struct GdiParser {
    gdi_path: PathBuf,
}

impl GdiParser {
    pub fn new(gdi_path: impl AsRef<Path>) -> Self {
        Self {
            gdi_path: gdi_path.as_ref().to_path_buf(),
        }
    }

    pub async fn parse(&self) -> GdiResult<GdiSheet> {
        let data = tokio::fs::read(&self.gdi_path).await?;
        let reader = Cursor::new(data);

        let mut declared: Option<usize> = None;
        let mut tracks: Vec<TrackRecord> = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            match declared {
                None => declared = Some(self.parse_track_count(line)?),
                Some(_) => {
                    let record = self.parse_record(line)?;

                    if tracks.iter().any(|t| t.number == record.number) {
                        return Err(GdiError::DuplicateTrackIndex(record.number));
                    }

                    tracks.push(record);
                }
            }
        }

        let declared = declared.ok_or_else(|| {
            GdiError::MalformedDescriptor("descriptor is empty".to_string())
        })?;

        if tracks.len() != declared {
            return Err(GdiError::MalformedDescriptor(format!(
                "descriptor declares {declared} tracks but provides {}",
                tracks.len()
            )));
        }

        Ok(GdiSheet { tracks })
    }

    fn parse_track_count(&self, line: &str) -> GdiResult<usize> {
        let count = line
            .parse::<usize>()
            .map_err(|_| GdiError::MalformedDescriptor(format!("invalid track count: {line}")))?;

        if count == 0 {
            return Err(GdiError::MalformedDescriptor(
                "descriptor declares no tracks".to_string(),
            ));
        }

        Ok(count)
    }

    fn parse_record(&self, line: &str) -> GdiResult<TrackRecord> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 6 {
            return Err(GdiError::MalformedDescriptor(format!(
                "expected 6 fields per track record, found {}: {line}",
                parts.len()
            )));
        }

        let number = self.parse_field::<u8>("track number", parts[0])?;
        if number == 0 {
            return Err(GdiError::MalformedDescriptor(format!(
                "track numbers are 1-based: {line}"
            )));
        }

        let fad_start = self.parse_field::<i64>("FAD start", parts[1])?;
        if fad_start < 0 {
            return Err(GdiError::InvalidTrackGeometry(format!(
                "track {number} has a negative FAD start: {fad_start}"
            )));
        }
        let fad_start = u32::try_from(fad_start).map_err(|_| {
            GdiError::InvalidTrackGeometry(format!(
                "track {number} starts outside the addressable FAD range: {fad_start}"
            ))
        })?;

        let ctrl = Ctrl(self.parse_field::<u32>("control flags", parts[2])?);

        let sector_size = self.parse_field::<i64>("sector size", parts[3])?;
        if sector_size <= 0 {
            return Err(GdiError::InvalidTrackGeometry(format!(
                "track {number} has a non-positive sector size: {sector_size}"
            )));
        }
        let sector_size = u32::try_from(sector_size).map_err(|_| {
            GdiError::InvalidTrackGeometry(format!(
                "track {number} has an oversized sector size: {sector_size}"
            ))
        })?;

        let (file_name, trailer_text) = self.split_file_and_trailer(line, &parts)?;
        if file_name.is_empty() {
            return Err(GdiError::MalformedDescriptor(format!(
                "track {number} has an empty file name"
            )));
        }

        let trailer = TrailerField(self.parse_field::<i64>("trailer field", trailer_text)?);

        Ok(TrackRecord {
            number,
            fad_start,
            ctrl,
            sector_size,
            file_name,
            trailer,
        })
    }

    fn parse_field<T: std::str::FromStr>(&self, field: &str, text: &str) -> GdiResult<T> {
        text.parse::<T>()
            .map_err(|_| GdiError::MalformedDescriptor(format!("invalid {field}: {text}")))
    }

    // File names with spaces are double-quoted; everything after the closing
    // quote is the trailer column.
    fn split_file_and_trailer<'a>(
        &self,
        line: &'a str,
        parts: &[&'a str],
    ) -> GdiResult<(String, &'a str)> {
        if let Some(start) = line.find('"') {
            let end = line
                .rfind('"')
                .filter(|&end| end > start)
                .ok_or_else(|| {
                    GdiError::MalformedDescriptor(format!("unterminated quoted file name: {line}"))
                })?;

            let rest: Vec<&str> = line[end + 1..].split_whitespace().collect();
            if rest.len() != 1 {
                return Err(GdiError::MalformedDescriptor(format!(
                    "expected a single trailer field after the file name: {line}"
                )));
            }

            Ok((line[start + 1..end].to_string(), rest[0]))
        } else {
            if parts.len() != 6 {
                return Err(GdiError::MalformedDescriptor(format!(
                    "expected 6 fields per track record, found {}: {line}",
                    parts.len()
                )));
            }

            Ok((parts[4].to_string(), parts[5]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn parse_text(contents: &str) -> GdiResult<GdiSheet> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disc.gdi");
        std::fs::write(&path, contents).unwrap();

        GdiParser::new(&path).parse().await
    }

    #[tokio::test]
    async fn parses_three_track_descriptor() {
        let sheet = parse_text(
            "3\n\
             1 0 4 2352 track01.bin 0\n\
             2 756 0 2352 track02.raw 0\n\
             3 45150 4 2352 track03.bin 0\n",
        )
        .await
        .unwrap();

        assert_eq!(sheet.tracks.len(), 3);
        assert_eq!(sheet.tracks[0].number, 1);
        assert_eq!(sheet.tracks[1].fad_start, 756);
        assert_eq!(sheet.tracks[1].ctrl, Ctrl(0));
        assert_eq!(sheet.tracks[2].sector_size, 2352);
        assert_eq!(sheet.tracks[2].file_name, "track03.bin");
    }

    #[tokio::test]
    async fn parses_quoted_file_names() {
        let sheet = parse_text("1\n1 0 4 2352 \"track 01.bin\" 0\n").await.unwrap();

        assert_eq!(sheet.tracks[0].file_name, "track 01.bin");
        assert_eq!(sheet.tracks[0].trailer, TrailerField(0));
    }

    #[tokio::test]
    async fn keeps_trailer_field_verbatim() {
        let sheet = parse_text("1\n1 0 4 2352 track01.bin 307200\n").await.unwrap();

        assert_eq!(sheet.tracks[0].trailer, TrailerField(307_200));
    }

    #[tokio::test]
    async fn rejects_missing_track_record() {
        let err = parse_text("2\n1 0 4 2352 track01.bin 0\n").await.unwrap_err();

        assert!(matches!(err, GdiError::MalformedDescriptor(_)));
    }

    #[tokio::test]
    async fn rejects_surplus_track_record() {
        let err = parse_text(
            "1\n\
             1 0 4 2352 track01.bin 0\n\
             2 756 0 2352 track02.raw 0\n",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, GdiError::MalformedDescriptor(_)));
    }

    #[tokio::test]
    async fn rejects_zero_sector_size() {
        let err = parse_text("1\n1 0 4 0 track01.bin 0\n").await.unwrap_err();

        assert!(matches!(err, GdiError::InvalidTrackGeometry(_)));
    }

    #[tokio::test]
    async fn rejects_negative_fad_start() {
        let err = parse_text("1\n1 -300 4 2352 track01.bin 0\n").await.unwrap_err();

        assert!(matches!(err, GdiError::InvalidTrackGeometry(_)));
    }

    #[tokio::test]
    async fn rejects_duplicate_track_index() {
        let err = parse_text(
            "2\n\
             1 0 4 2352 track01.bin 0\n\
             1 756 0 2352 track02.raw 0\n",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, GdiError::DuplicateTrackIndex(1)));
    }

    #[tokio::test]
    async fn rejects_non_numeric_field() {
        let err = parse_text("1\n1 zero 4 2352 track01.bin 0\n").await.unwrap_err();

        assert!(matches!(err, GdiError::MalformedDescriptor(_)));
    }

    #[tokio::test]
    async fn rejects_short_record() {
        let err = parse_text("1\n1 0 4 2352 track01.bin\n").await.unwrap_err();

        assert!(matches!(err, GdiError::MalformedDescriptor(_)));
    }

    #[tokio::test]
    async fn rejects_empty_descriptor() {
        let err = parse_text("").await.unwrap_err();

        assert!(matches!(err, GdiError::MalformedDescriptor(_)));
    }
}
