/// Control/type flags of a track as encoded in the descriptor. The drive
/// firmware interprets the bits; this crate carries them through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ctrl(pub u32);

/// Last numeric column of a GDI track record. Dumping tools disagree on its
/// meaning, so it is kept verbatim for round-tripping and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailerField(pub i64);

/// One track record exactly as written in the descriptor, before path
/// resolution and cross-track validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub number: u8,
    pub fad_start: u32,
    pub ctrl: Ctrl,
    pub sector_size: u32,
    pub file_name: String,
    pub trailer: TrailerField,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GdiSheet {
    pub tracks: Vec<TrackRecord>,
}
