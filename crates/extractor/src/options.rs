/// Format selection expression handed to the extraction tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSelector(String);

impl FormatSelector {
    pub fn best() -> Self {
        Self("best".to_string())
    }

    pub fn best_audio() -> Self {
        Self("bestaudio/best".to_string())
    }

    /// Best streams whose height does not exceed `height`, with a plain
    /// `best` fallback for sources that offer no capped variant.
    pub fn capped(height: u32) -> Self {
        Self(format!(
            "bestvideo[height<={height}]+bestaudio/best[height<={height}]/best"
        ))
    }

    /// Maps a user-supplied quality string to a selector.
    ///
    /// `"<N>p"` caps the stream height at `N`; everything else, including a
    /// missing value and `"best"`, selects the best available format.
    pub fn from_quality(quality: Option<&str>) -> Self {
        match quality {
            Some(q) if q != "best" => q
                .strip_suffix('p')
                .and_then(|height| height.parse::<u32>().ok())
                .map(Self::capped)
                .unwrap_or_else(Self::best),
            _ => Self::best(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Post-download audio conversion parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTranscode {
    pub format: String,
    pub quality: String,
}

impl AudioTranscode {
    pub fn mp3() -> Self {
        Self {
            format: "mp3".to_string(),
            quality: "192K".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOptions {
    pub format: FormatSelector,
    /// When set, the extractor strips the audio track and converts it.
    pub transcode: Option<AudioTranscode>,
}

impl ExtractionOptions {
    pub fn video(format: FormatSelector) -> Self {
        Self {
            format,
            transcode: None,
        }
    }

    pub fn audio() -> Self {
        Self {
            format: FormatSelector::best_audio(),
            transcode: Some(AudioTranscode::mp3()),
        }
    }
}
