pub mod byte_array;
pub mod str_encoded;
