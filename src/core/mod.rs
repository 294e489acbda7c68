// Path descriptors, the accessor seam, and error modeling.
pub mod accessor;
pub mod error;
pub mod path;
