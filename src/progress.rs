/// Severity band of a task's completion percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    /// Below 30%.
    AtRisk,
    /// 30% up to, but excluding, 70%.
    InProgress,
    /// 70% and above.
    OnTrack,
}

impl ProgressBand {
    /// Classifies a completion percentage. Absent progress counts as 0.
    ///
    /// The thresholds are fixed at 30 and 70. Values outside 0..=100 fall
    /// into the nearest band.
    pub fn from_progress(progress: Option<i64>) -> ProgressBand {
        let p = progress.unwrap_or(0);
        if p < 30 {
            ProgressBand::AtRisk
        } else if p < 70 {
            ProgressBand::InProgress
        } else {
            ProgressBand::OnTrack
        }
    }

    /// Hex color used for the band.
    pub fn color(&self) -> &'static str {
        match self {
            ProgressBand::AtRisk => "#ef4444",
            ProgressBand::InProgress => "#f59e0b",
            ProgressBand::OnTrack => "#10b981",
        }
    }
}

/// Shorthand for `ProgressBand::from_progress(progress).color()`.
pub fn progress_color(progress: Option<i64>) -> &'static str {
    ProgressBand::from_progress(progress).color()
}

/// Splits a `#rrggbb` color into its channels. Malformed channels read as 0.
pub fn hex_rgb(color: &str) -> (u8, u8, u8) {
    let channel = |i: usize| u8::from_str_radix(color.get(i..i + 2).unwrap_or("00"), 16).unwrap_or(0);
    (channel(1), channel(3), channel(5))
}
