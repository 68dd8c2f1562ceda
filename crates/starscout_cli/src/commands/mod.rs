pub(crate) mod fetch;
pub(crate) mod meta;
pub(crate) mod websites;
