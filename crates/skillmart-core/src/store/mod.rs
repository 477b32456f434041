// ── Local state slices ──
//
// Whatever the session fetched last, held behind `watch` channels so a
// reader always gets a consistent snapshot.

mod collection;
mod data_store;
mod refresh;

pub use data_store::DataStore;
