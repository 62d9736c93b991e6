pub mod blocking;
