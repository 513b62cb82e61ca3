/// This module provides one-hot encoding of integer class labels into the
/// column-per-sample target matrices consumed by the network
pub mod label_encoding;

/// This module reads labelled numeric datasets from comma separated files
pub mod csv_reader;

/// This module provides shuffled, proportional splitting of a dataset into
/// several disjoint parts, such as train, validation and test sets
pub mod split;

pub use csv_reader::*;
pub use label_encoding::*;
pub use split::*;
