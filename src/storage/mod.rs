//! Columnar storage: segments, attribute vectors, and chunks.

mod attribute_vector;
mod chunk;
mod dictionary_segment;
mod reference_segment;
mod segment;
mod value_segment;

pub use attribute_vector::FixedWidthAttributeVector;
pub use chunk::Chunk;
pub use dictionary_segment::DictionarySegment;
pub use reference_segment::ReferenceSegment;
pub use segment::{
    shared_segment, AnyDictionarySegment, AnyValueSegment, Segment, SegmentDispatch, SharedSegment,
};
pub use value_segment::ValueSegment;
