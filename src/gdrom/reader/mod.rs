pub mod error;

use crate::gdrom::disc::DiscImage;
use crate::gdrom::reader::error::ReaderResult;
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::AsyncSeekExt;
use tokio::io::{AsyncReadExt, BufReader};

/// Sector-level read access to a mounted disc: one buffered reader per track,
/// addressed by FAD through the mount table.
pub struct SectorReader<'d> {
    disc: &'d DiscImage,
    readers: Vec<BufReader<File>>,
}

impl<'d> SectorReader<'d> {
    pub async fn open(disc: &'d DiscImage) -> ReaderResult<Self> {
        let mut readers = Vec::with_capacity(disc.track_count());
        for track in disc.tracks() {
            let file = File::open(track.abs_path()).await?;
            readers.push(BufReader::with_capacity(512 * 1024, file));
        }

        Ok(Self { disc, readers })
    }

    /// Reads the single sector addressed by `fad`. The buffer length is the
    /// covering track's sector size.
    pub async fn read_fad(&mut self, fad: u32) -> ReaderResult<Vec<u8>> {
        let position = self.disc.position_for_fad(fad)?;
        let track = &self.disc.tracks()[position];

        let mut buffer = vec![0u8; track.sector_size() as usize];
        let (_, byte_offset) = self.disc.byte_offset_for_fad(fad)?;

        let reader = &mut self.readers[position];
        reader.seek(SeekFrom::Start(byte_offset)).await?;
        reader.read_exact(&mut buffer).await?;

        Ok(buffer)
    }
}
