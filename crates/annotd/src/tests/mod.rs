//! Test suites for the dispatcher bootstrap and request pipeline.

pub(crate) mod support;
