// qrstudio persisted stores
// Managers own state that outlives a single generation: the history log and style presets.

pub mod history_store;
pub mod preset_store;
