/// Data layer: corner taxonomy, result discovery, loading, splitting.
///
/// Architecture:
/// ```text
///  results/tt_0_27, results/tt_0_27_Iin, ...
///        │
///        ▼
///   ┌──────────┐
///   │ discover  │  file name → Corner + SweepKind
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  delimited text → SweepTable (columns 0 and 2)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  split    │  SweepTable → three equal-length experiments
///   └──────────┘
/// ```

pub mod discover;
pub mod loader;
pub mod model;
pub mod split;
