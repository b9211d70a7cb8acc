mod debug;
mod formatter;

pub use debug::*;
pub use formatter::TraceFormatter;
