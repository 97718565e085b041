pub(crate) mod bootstrap;
pub(crate) mod console;
pub(crate) mod loop_runner;
