// Output side: page sinks and the document renderer that drives the layout engine.

pub mod document;
pub mod pdf;
pub mod sink;
