/// Presentation adapter: maps aggregation results onto egui widgets.
/// Nothing in here computes; every view re-queries the engine from the
/// current (dataset, filter) each frame.

pub mod panels;
pub mod plot;
pub mod table;
