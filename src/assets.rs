pub(crate) mod backgrounds;
pub(crate) mod decode;
