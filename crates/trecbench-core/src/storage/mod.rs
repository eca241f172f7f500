pub mod schema;
mod store;

pub use store::{NewResearcher, NewRun, NewTask, NewTrack, ProfileUpdate, SessionRow, Store};
