//! Hand-off of finished composites to download and sharing collaborators.

pub(crate) mod sink;
