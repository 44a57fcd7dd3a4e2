/// Split layer: labels, proportions and the splitter itself.
///
/// ```text
///   MetadataTable ──► eligible positions ──► SplitSizes (floor / remainder)
///                                │
///                                ▼
///                     optional seeded shuffle
///                                │
///                                ▼
///                      SplitAssignment ──apply──► split column
/// ```

pub mod label;
pub mod proportions;
pub mod splitter;

pub use label::SplitLabel;
pub use proportions::{Proportions, SplitSizes};
pub use splitter::{SplitAssignment, Splitter};
