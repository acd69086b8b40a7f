pub mod firestore;
pub mod gate;
pub mod memory;
