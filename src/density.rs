pub(crate) mod estimate;
pub(crate) mod kernel;
pub(crate) mod normalize;
