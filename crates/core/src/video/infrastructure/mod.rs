pub mod image_file_sink;
pub mod image_sequence_source;
