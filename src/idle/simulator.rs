//! Balance simulator for AI-Idle.
//! Run with: cargo test simulate_greedy -- --nocapture
