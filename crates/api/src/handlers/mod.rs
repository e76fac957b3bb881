pub mod viewings;
