//! The FSRS-4.5 default parameter vector.
//!
//! The engine's weight constants (`w0..w16`) are specified only as "FSRS-4.5
//! canonical" without literal values (an explicit open question). This
//! repository pins them to the published FSRS-4.5 default parameters from
//! the open-spaced-repetition project's `fsrs4anki` v4.5 optimizer defaults,
//! the reference set in wide use at the time those defaults were current.
//! See DESIGN.md for the per-index mapping onto the formulas in
//! [`crate::fsrs`].
pub const FSRS45_DEFAULT_WEIGHTS: [f64; 17] = [
    0.4872, 1.4003, 3.7145, 13.8206, 5.1618, 1.2298, 0.8975, 0.0310, 1.6474, 0.1367, 1.0461,
    2.1072, 0.0793, 0.3246, 1.5870, 0.2272, 2.8755,
];
