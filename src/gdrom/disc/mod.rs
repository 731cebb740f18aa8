use crate::cd::{PRIMARY_DATA_TRACK, SECONDARY_DATA_TRACK};
use crate::gdrom::disc::error::{DiscError, DiscResult};
use crate::gdrom::error::{GdRomError, GdRomResult};
use crate::gdrom::gdi::models::{Ctrl, GdiSheet, TrackRecord};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use tokio::fs;

pub mod error;

/// One validated entry of the disc's table of contents. A `Track` only exists
/// once every field has parsed and passed its sanity checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    number: u8,
    fad_start: u32,
    ctrl: Ctrl,
    sector_size: u32,
    rel_path: String,
    abs_path: PathBuf,
    offset: u64,
    sector_count: u32,
}

impl Track {
    /// The backing file is stat'ed exactly once here; the recorded size fixes
    /// the track's span for the lifetime of the mount.
    async fn from_record(record: &TrackRecord, base_dir: &Path) -> GdRomResult<Self> {
        let rel = Path::new(&record.file_name);
        let abs_path = if rel.is_absolute() {
            rel.to_path_buf()
        } else {
            base_dir.join(rel)
        };

        let metadata = fs::metadata(&abs_path)
            .await
            .map_err(|_| GdRomError::MissingBackingFile(record.file_name.clone()))?;
        if !metadata.is_file() {
            return Err(GdRomError::MissingBackingFile(record.file_name.clone()));
        }

        // Every current GDI dump layout stores sector data from the first
        // byte of the track file; other layouts would adjust the skip here.
        let offset = 0u64;

        let payload = metadata.len() - offset;
        if payload % u64::from(record.sector_size) != 0 {
            warn!(
                "Track {} backing file {} ends in a partial sector, excluding it",
                record.number, record.file_name
            );
        }

        let sector_count = u32::try_from(payload / u64::from(record.sector_size))
            .map_err(|_| {
                GdRomError::InvalidTrackGeometry(format!(
                    "track {} spans more sectors than the FAD space holds",
                    record.number
                ))
            })?;
        if sector_count == 0 {
            return Err(GdRomError::InvalidTrackGeometry(format!(
                "track {} spans zero sectors",
                record.number
            )));
        }
        if record.fad_start.checked_add(sector_count).is_none() {
            return Err(GdRomError::InvalidTrackGeometry(format!(
                "track {} extends beyond the addressable FAD range",
                record.number
            )));
        }

        Ok(Self {
            number: record.number,
            fad_start: record.fad_start,
            ctrl: record.ctrl,
            sector_size: record.sector_size,
            rel_path: record.file_name.clone(),
            abs_path,
            offset,
            sector_count,
        })
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn fad_start(&self) -> u32 {
        self.fad_start
    }

    /// First FAD past the end of the track.
    pub fn fad_end(&self) -> u32 {
        self.fad_start + self.sector_count
    }

    pub fn ctrl(&self) -> Ctrl {
        self.ctrl
    }

    pub fn sector_size(&self) -> u32 {
        self.sector_size
    }

    /// The backing file path as written in the descriptor. Diagnostics use
    /// this, never the resolved path.
    pub fn rel_path(&self) -> &str {
        &self.rel_path
    }

    /// The resolved path used for file access.
    pub fn abs_path(&self) -> &Path {
        &self.abs_path
    }

    /// Byte offset within the backing file at which sector data begins.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn sector_count(&self) -> u32 {
        self.sector_count
    }

    pub fn contains_fad(&self, fad: u32) -> bool {
        fad >= self.fad_start && fad < self.fad_end()
    }

    /// Data tracks sit at the format-designated positions; all other tracks
    /// are audio or other, regardless of their control flags.
    pub fn is_data(&self) -> bool {
        self.number == PRIMARY_DATA_TRACK || self.number == SECONDARY_DATA_TRACK
    }

    pub(crate) fn byte_offset_of(&self, fad: u32) -> u64 {
        self.offset + u64::from(fad - self.fad_start) * u64::from(self.sector_size)
    }
}

/// The mount table: an immutable, FAD-sorted view of one mounted disc. All
/// queries are read-only, so concurrent readers need no locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscImage {
    tracks: Vec<Track>,
}

impl DiscImage {
    pub(crate) async fn assemble(sheet: &GdiSheet, base_dir: &Path) -> GdRomResult<Self> {
        let mut tracks = Vec::with_capacity(sheet.tracks.len());
        for record in &sheet.tracks {
            tracks.push(Track::from_record(record, base_dir).await?);
        }

        // Descriptors are not guaranteed pre-sorted.
        tracks.sort_by_key(|t| t.fad_start);

        for pair in tracks.windows(2) {
            if pair[1].fad_start < pair[0].fad_end() {
                return Err(GdRomError::InvalidTrackGeometry(format!(
                    "track {} starts at FAD {} inside track {}, which ends at FAD {}",
                    pair[1].number,
                    pair[1].fad_start,
                    pair[0].number,
                    pair[0].fad_end()
                )));
            }
        }

        debug!("Assembled mount table with {} tracks", tracks.len());

        Ok(Self { tracks })
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Tracks in ascending `fad_start` order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Positional lookup over the FAD-sorted list (0-based).
    pub fn track_at(&self, index: usize) -> DiscResult<&Track> {
        self.tracks.get(index).ok_or(DiscError::OutOfRange {
            index,
            count: self.tracks.len(),
        })
    }

    /// Binary search for the track whose range contains `fad`. FADs before
    /// the first track, in inter-track gaps, or past the last track's end
    /// (lead-out) have no covering track.
    pub fn find_track_for_fad(&self, fad: u32) -> DiscResult<&Track> {
        self.position_for_fad(fad).map(|position| &self.tracks[position])
    }

    pub(crate) fn position_for_fad(&self, fad: u32) -> DiscResult<usize> {
        let upper = self.tracks.partition_point(|t| t.fad_start <= fad);
        if upper == 0 {
            return Err(DiscError::NotFound(fad));
        }

        let candidate = upper - 1;
        if self.tracks[candidate].contains_fad(fad) {
            Ok(candidate)
        } else {
            Err(DiscError::NotFound(fad))
        }
    }

    /// The exact byte address of `fad`'s sector within its track's backing
    /// file, paired with the resolved path to read from.
    pub fn byte_offset_for_fad(&self, fad: u32) -> DiscResult<(&Path, u64)> {
        let track = self.find_track_for_fad(fad)?;

        Ok((track.abs_path(), track.byte_offset_of(fad)))
    }

    /// Entry point for filesystem readers into the disc's data area.
    pub fn primary_data_track(&self) -> DiscResult<&Track> {
        self.track_with_number(PRIMARY_DATA_TRACK)
    }

    /// The second data track of a dual-density disc, when present.
    pub fn secondary_data_track(&self) -> DiscResult<&Track> {
        self.track_with_number(SECONDARY_DATA_TRACK)
    }

    fn track_with_number(&self, number: u8) -> DiscResult<&Track> {
        self.tracks
            .iter()
            .find(|t| t.number == number)
            .ok_or(DiscError::NoDataTrack(number))
    }
}
