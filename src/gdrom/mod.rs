use crate::cd::{CD_SYNC_PATTERN, DensityArea, RAW_SECTOR_SIZE};
use crate::gdrom::disc::DiscImage;
use crate::gdrom::error::{GdRomError, GdRomResult};
use crate::gdrom::gdi::GdiParser;
use crate::gdrom::reader::SectorReader;
use indicatif::{MultiProgress, ProgressBar};
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

pub mod disc;
pub mod error;
pub mod gdi;
pub mod reader;

/// Parses the descriptor and builds the mount table. All-or-nothing: any
/// parse or geometry error leaves no disc behind.
pub async fn mount(gdi_path: impl AsRef<Path>) -> GdRomResult<DiscImage> {
    let gdi_path = gdi_path.as_ref();

    debug!("Parsing GDI descriptor: {:?}", gdi_path);
    let parser = GdiParser::new(gdi_path);
    let sheet = parser.parse().await?;

    // Relative track paths resolve against the descriptor's directory.
    let base_dir = gdi_path.parent().unwrap_or(Path::new("."));
    let disc = DiscImage::assemble(&sheet, base_dir).await?;

    debug!("Mounted disc with {} tracks", disc.track_count());
    Ok(disc)
}

/// Releases the mount table and every track it owns.
pub fn unmount(disc: DiscImage) {
    debug!("Unmounting disc with {} tracks", disc.track_count());
    drop(disc);
}

pub async fn print_disc_info(gdi_path: PathBuf) -> GdRomResult<()> {
    let disc = mount(&gdi_path).await?;

    println!("Tracks: {}", disc.track_count());
    println!(
        "{:<5} {:>9} {:>9} {:>6} {:>6} {:>7}  File",
        "Track", "Start", "End", "Ctrl", "Size", "Area"
    );
    for track in disc.tracks() {
        println!(
            "{:<5} {:>9} {:>9} {:>6} {:>6} {:>7}  {}",
            track.number(),
            track.fad_start(),
            track.fad_end(),
            track.ctrl().0,
            track.sector_size(),
            DensityArea::of(track.fad_start()).name(),
            track.rel_path()
        );
    }

    match disc.primary_data_track() {
        Ok(track) => println!("Primary data track: {}", track.number()),
        Err(_) => println!("Primary data track: none"),
    }
    if let Ok(track) = disc.secondary_data_track() {
        println!("Secondary data track: {}", track.number());
    }

    unmount(disc);
    Ok(())
}

/// Dumps one track's sector stream to `output_path` through the mount table.
pub async fn extract_track(
    pb: MultiProgress,
    gdi_path: PathBuf,
    track_number: u8,
    output_path: PathBuf,
    force: bool,
) -> GdRomResult<()> {
    // Check if output exists
    if fs::metadata(&output_path).await.is_ok() && !force {
        return Err(GdRomError::OutputFileAlreadyExists);
    }

    let disc = mount(&gdi_path).await?;
    let track = disc
        .tracks()
        .iter()
        .find(|t| t.number() == track_number)
        .ok_or(GdRomError::TrackNotPresent(track_number))?;

    debug!(
        "Extracting track {} ({} sectors of {} bytes)",
        track.number(),
        track.sector_count(),
        track.sector_size()
    );

    let mut reader = SectorReader::open(&disc).await?;
    let file = File::create(&output_path).await?;
    let mut writer = BufWriter::with_capacity(8 * 1024 * 1024, file); // 8 MB buffer

    let bar = pb.add(ProgressBar::new(u64::from(track.sector_count())));
    for fad in track.fad_start()..track.fad_end() {
        let sector = reader.read_fad(fad).await?;
        writer.write_all(&sector).await?;
        bar.inc(1);
    }
    writer.flush().await?;
    bar.finish();

    info!("Extracted track {track_number} to {:?}", output_path);
    Ok(())
}

/// Mounts the disc, reports inter-track gaps, and checks that every raw data
/// track starts with a valid sync pattern.
pub async fn verify_disc(gdi_path: PathBuf) -> GdRomResult<()> {
    let disc = mount(&gdi_path).await?;
    let mut reader = SectorReader::open(&disc).await?;

    for pair in disc.tracks().windows(2) {
        let gap = pair[1].fad_start() - pair[0].fad_end();
        if gap > 0 {
            debug!(
                "Gap of {} FADs between track {} and track {}",
                gap,
                pair[0].number(),
                pair[1].number()
            );
        }
    }

    for track in disc.tracks() {
        // Audio tracks and cooked data dumps carry no sync pattern.
        if !track.is_data() || track.sector_size() != RAW_SECTOR_SIZE as u32 {
            continue;
        }

        let sector = reader.read_fad(track.fad_start()).await?;
        if sector[..CD_SYNC_PATTERN.len()] != CD_SYNC_PATTERN {
            return Err(GdRomError::CorruptTrackData(track.number()));
        }
    }

    println!("OK: {} ({} tracks)", gdi_path.display(), disc.track_count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_descriptor(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("disc.gdi");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn overlapping_tracks_fail_to_mount() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("track01.raw"), vec![0u8; 2352 * 10]).unwrap();
        std::fs::write(dir.path().join("track03.bin"), vec![0u8; 2352 * 10]).unwrap();
        let gdi = write_descriptor(
            dir.path(),
            "2\n\
             1 0 0 2352 track01.raw 0\n\
             3 0 4 2352 track03.bin 0\n",
        );

        let err = mount(gdi).await.unwrap_err();
        assert!(matches!(err, GdRomError::InvalidTrackGeometry(_)));
    }

    #[tokio::test]
    async fn missing_backing_file_fails_to_mount() {
        let dir = tempfile::tempdir().unwrap();
        let gdi = write_descriptor(dir.path(), "1\n3 0 4 2352 track03.bin 0\n");

        let err = mount(gdi).await.unwrap_err();
        assert!(matches!(err, GdRomError::MissingBackingFile(_)));

        // Diagnostics carry the path as written, never the resolved one.
        let message = err.to_string();
        assert!(message.contains("track03.bin"));
        assert!(!message.contains(dir.path().to_str().unwrap()));
    }

    #[tokio::test]
    async fn empty_backing_file_fails_to_mount() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("track01.raw"), []).unwrap();
        let gdi = write_descriptor(dir.path(), "1\n1 0 0 2352 track01.raw 0\n");

        let err = mount(gdi).await.unwrap_err();
        assert!(matches!(err, GdRomError::InvalidTrackGeometry(_)));
    }

    #[tokio::test]
    async fn extract_round_trips_a_track_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = Vec::new();
        for sector in 0..8u8 {
            bytes.extend(std::iter::repeat_n(sector, 2352));
        }
        std::fs::write(dir.path().join("track03.bin"), &bytes).unwrap();
        let gdi = write_descriptor(dir.path(), "1\n3 0 4 2352 track03.bin 0\n");
        let output = dir.path().join("dump.bin");

        extract_track(MultiProgress::new(), gdi, 3, output.clone(), false)
            .await
            .unwrap();

        assert_eq!(std::fs::read(output).unwrap(), bytes);
    }

    #[tokio::test]
    async fn extract_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("track03.bin"), vec![0u8; 2352]).unwrap();
        let gdi = write_descriptor(dir.path(), "1\n3 0 4 2352 track03.bin 0\n");
        let output = dir.path().join("dump.bin");
        std::fs::write(&output, b"existing").unwrap();

        let err = extract_track(MultiProgress::new(), gdi.clone(), 3, output.clone(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, GdRomError::OutputFileAlreadyExists));

        extract_track(MultiProgress::new(), gdi, 3, output.clone(), true)
            .await
            .unwrap();
        assert_eq!(std::fs::read(output).unwrap().len(), 2352);
    }

    #[tokio::test]
    async fn extract_rejects_absent_track_numbers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("track03.bin"), vec![0u8; 2352]).unwrap();
        let gdi = write_descriptor(dir.path(), "1\n3 0 4 2352 track03.bin 0\n");

        let err = extract_track(
            MultiProgress::new(),
            gdi,
            4,
            dir.path().join("dump.bin"),
            false,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GdRomError::TrackNotPresent(4)));
    }

    #[tokio::test]
    async fn verify_checks_the_data_track_sync_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let mut good = vec![0u8; 2352 * 2];
        good[..CD_SYNC_PATTERN.len()].copy_from_slice(&CD_SYNC_PATTERN);
        std::fs::write(dir.path().join("track03.bin"), &good).unwrap();
        let gdi = write_descriptor(dir.path(), "1\n3 0 4 2352 track03.bin 0\n");

        verify_disc(gdi).await.unwrap();
    }

    #[tokio::test]
    async fn verify_rejects_a_corrupt_data_track() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("track03.bin"), vec![0u8; 2352 * 2]).unwrap();
        let gdi = write_descriptor(dir.path(), "1\n3 0 4 2352 track03.bin 0\n");

        let err = verify_disc(gdi).await.unwrap_err();
        assert!(matches!(err, GdRomError::CorruptTrackData(3)));
    }

    #[tokio::test]
    async fn verify_skips_audio_tracks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("track01.raw"), vec![0u8; 2352 * 2]).unwrap();
        let gdi = write_descriptor(dir.path(), "1\n1 0 0 2352 track01.raw 0\n");

        verify_disc(gdi).await.unwrap();
    }
}
