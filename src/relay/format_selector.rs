// FormatSelector - yt-dlp format and post-processing arguments per container
//
// mp4: H.264 video + M4A audio, merged and recoded to MP4
// mp3: best audio extracted and recoded to MP3 at 192 kbps

use std::path::{Path, PathBuf};

use super::models::MediaFormat;

/// Target audio bitrate for MP3 extraction
pub const MP3_QUALITY: &str = "192K";

/// yt-dlp selection for a requested container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSelection {
    /// yt-dlp `-f` format specification
    pub format_spec: &'static str,
    /// Post-processing arguments appended after `-f`
    pub postprocess: Vec<String>,
}

pub struct FormatSelector;

impl FormatSelector {
    pub fn select(format: MediaFormat) -> FormatSelection {
        match format {
            MediaFormat::Mp4 => FormatSelection {
                format_spec:
                    "bestvideo[vcodec~='^(avc|h264)'][ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]",
                postprocess: vec![
                    "--merge-output-format".to_string(),
                    "mp4".to_string(),
                    "--recode-video".to_string(),
                    "mp4".to_string(),
                ],
            },
            MediaFormat::Mp3 => FormatSelection {
                format_spec: "bestaudio[ext=m4a]/bestaudio",
                postprocess: vec![
                    "--extract-audio".to_string(),
                    "--audio-format".to_string(),
                    "mp3".to_string(),
                    "--audio-quality".to_string(),
                    MP3_QUALITY.to_string(),
                ],
            },
        }
    }

    /// Full argument list: `-f <spec>` followed by post-processing flags
    pub fn args(format: MediaFormat) -> Vec<String> {
        let selection = Self::select(format);
        let mut args = vec!["-f".to_string(), selection.format_spec.to_string()];
        args.extend(selection.postprocess);
        args
    }

    /// Force the extension of a templated output path to the requested container
    pub fn force_extension(path: &Path, format: MediaFormat) -> PathBuf {
        path.with_extension(format.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mp4_requests_h264_and_recode() {
        let args = FormatSelector::args(MediaFormat::Mp4);
        assert_eq!(args[0], "-f");
        assert!(args[1].contains("[ext=mp4]+bestaudio[ext=m4a]"));
        // never falls back to a non-mp4 container
        assert!(args[1].ends_with("/best[ext=mp4]"));
        assert!(args.windows(2).any(|w| w[0] == "--recode-video" && w[1] == "mp4"));
        assert!(args.windows(2).any(|w| w[0] == "--merge-output-format" && w[1] == "mp4"));
    }

    #[test]
    fn test_mp3_extracts_audio_at_192k() {
        let args = FormatSelector::args(MediaFormat::Mp3);
        assert!(args.contains(&"--extract-audio".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "--audio-format" && w[1] == "mp3"));
        assert!(args.windows(2).any(|w| w[0] == "--audio-quality" && w[1] == "192K"));
    }

    #[test]
    fn test_force_extension() {
        let path = Path::new("/tmp/stage/My Song [abc].webm");
        assert_eq!(
            FormatSelector::force_extension(path, MediaFormat::Mp3),
            PathBuf::from("/tmp/stage/My Song [abc].mp3")
        );
        let path = Path::new("/tmp/stage/clip.mkv");
        assert_eq!(
            FormatSelector::force_extension(path, MediaFormat::Mp4),
            PathBuf::from("/tmp/stage/clip.mp4")
        );
    }
}
