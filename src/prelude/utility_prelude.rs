pub use crate::utility::csv_reader::{parse_csv_xy, read_csv_xy};
pub use crate::utility::label_encoding::{infer_num_classes, one_hot_encode};
pub use crate::utility::split::split_xy;
