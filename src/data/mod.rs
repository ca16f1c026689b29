pub mod serializer;
pub mod value;

pub use serializer::to_value;
pub use value::Value;
