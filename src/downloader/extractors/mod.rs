// Extractor implementations
//
// yt-dlp is the only engine in use; the MediaExtractor trait keeps the
// orchestrator independent of it so tests can script transfers.

mod ytdlp;

pub use ytdlp::{parse_extractor_line, ExtractorLine, YtDlpExtractor, DEFAULT_INFO_TIMEOUT_SECS};
