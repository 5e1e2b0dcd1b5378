// Application layer: consumers of the aggregation output.

pub mod view;
