use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

/// Default record file, relative to the working directory
pub const DEFAULT_RECORDS_PATH: &str = "barcode_information.csv";
/// Default number of localization attempts per capture
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

fn parse_env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

static MAX_ATTEMPTS: OnceLock<usize> = OnceLock::new();

/// Localization attempts per capture (`EAN_MAX_ATTEMPTS`, 1-10).
///
/// Strength grows by one per retry and the strength control tops out at 10,
/// so at most 10 attempts are meaningful.
pub fn max_attempts() -> usize {
    *MAX_ATTEMPTS.get_or_init(|| {
        parse_env_usize("EAN_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS).clamp(1, DEFAULT_MAX_ATTEMPTS)
    })
}

static PREFIX_DIGITS: OnceLock<usize> = OnceLock::new();

/// Leading digits dropped from extracted payloads (`EAN_PREFIX_DIGITS`)
pub fn prefix_digits() -> usize {
    *PREFIX_DIGITS.get_or_init(|| parse_env_usize("EAN_PREFIX_DIGITS", 0).min(13))
}

static ANIMATION_DELAY_MS: OnceLock<u64> = OnceLock::new();

/// Delay between loading-animation dots (`EAN_ANIMATION_DELAY_MS`)
pub fn animation_delay() -> Duration {
    let ms = *ANIMATION_DELAY_MS
        .get_or_init(|| parse_env_u64("EAN_ANIMATION_DELAY_MS", 200).min(5_000));
    Duration::from_millis(ms)
}

/// Record file location (`EAN_RECORDS_PATH`)
pub fn records_path() -> PathBuf {
    parse_env_path("EAN_RECORDS_PATH").unwrap_or_else(|| PathBuf::from(DEFAULT_RECORDS_PATH))
}

/// Resolve a still-image path, relative paths against `ImagingData` when set
pub fn resolve_image_path(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match parse_env_path("ImagingData") {
        Some(base) if base.join(&path).exists() => base.join(path),
        _ => path,
    }
}

/// Settings for one reader session
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderConfig {
    /// Localization attempts per capture
    pub max_attempts: usize,
    /// Leading digits dropped from extracted payloads
    pub prefix_digits: usize,
    /// Record file location
    pub records_path: PathBuf,
    /// Delay between loading-animation dots
    pub animation_delay: Duration,
}

impl ReaderConfig {
    /// Settings from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            max_attempts: max_attempts(),
            prefix_digits: prefix_digits(),
            records_path: records_path(),
            animation_delay: animation_delay(),
        }
    }

    /// Override the attempt budget, clamped to 1-10
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.clamp(1, DEFAULT_MAX_ATTEMPTS);
        self
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            prefix_digits: 0,
            records_path: PathBuf::from(DEFAULT_RECORDS_PATH),
            animation_delay: Duration::from_millis(200),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.prefix_digits, 0);
        assert_eq!(config.records_path, PathBuf::from("barcode_information.csv"));
    }

    #[test]
    fn test_max_attempts_clamped() {
        assert_eq!(ReaderConfig::default().with_max_attempts(0).max_attempts, 1);
        assert_eq!(ReaderConfig::default().with_max_attempts(50).max_attempts, 10);
        assert_eq!(ReaderConfig::default().with_max_attempts(4).max_attempts, 4);
    }

    #[test]
    fn test_parse_env_fallback() {
        assert_eq!(parse_env_usize("EAN_TEST_UNSET_VARIABLE", 7), 7);
        assert_eq!(parse_env_u64("EAN_TEST_UNSET_VARIABLE", 9), 9);
    }

    #[test]
    fn test_absolute_image_path_untouched() {
        let path = std::env::temp_dir().join("capture.jpg");
        assert_eq!(resolve_image_path(path.clone()), path);
    }
}
