pub mod matrix_loader;

pub use matrix_loader::{load_exam_matrix, parse_exam_matrix, resolve_exam_matrix};
