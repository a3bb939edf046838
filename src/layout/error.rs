use thiserror::Error;

/// Failures that abort a whole layout. Per-label fitting problems never do.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("no leaf has a positive weight")]
    EmptyInput,
    #[error("clip polygon needs at least 3 points and a positive area ({points} points, area {area})")]
    InvalidClip { points: usize, area: f64 },
}
