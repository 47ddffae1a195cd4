pub(crate) mod payload;
pub(crate) mod store;
