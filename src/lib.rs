//! # lyrebird
//!
//! Core of a lyrics-driven language-learning player: parsing of
//! line-synchronized (LRC) lyrics, translation overlays keyed by the same
//! timeline, and resolution of the active line and translation against a
//! playback clock.
//!
//! The crate is deliberately UI- and transport-free. It turns text sources
//! and a stream of playback positions into "what should be on screen right
//! now"; rendering and networking live with the caller.
//!
//! - [`parser`]: lenient LRC parsing into lines plus metadata
//! - [`types`]: documents, lines, overlays, and playback snapshots
//! - [`engine`]: active-line and translation resolution, display modes
//! - [`clock`]: monotonic position estimation between coarse reports
//! - [`timing`]: offsets, interpolation, and word-timing estimates
//! - [`store`]: cached async fetch of lyrics documents

pub mod clock;
pub mod engine;
pub mod parser;
pub mod store;
pub mod timing;
pub mod types;

pub use clock::PlaybackClock;
pub use engine::{DisplayMode, DisplayText, SyncEngine, SyncUpdate};
pub use parser::{parse_lrc, ParsedLyrics};
pub use store::{LyricsSource, LyricsStore};
pub use types::{
    LyricLine, LyricsDocument, LyricsMetadata, PlaybackState, ResolvedSyncState, TranslationLine,
};
