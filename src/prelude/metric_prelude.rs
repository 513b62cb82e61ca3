pub use crate::metric::{argmax_columns, categorical_accuracy};
