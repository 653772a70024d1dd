// Shared helpers that carry no UI or backend state

pub mod date;
