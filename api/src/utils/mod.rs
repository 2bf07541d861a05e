pub mod timeval;
