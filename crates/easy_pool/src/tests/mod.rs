//! End-to-end pooling scenarios

mod delayed_despawn;
mod startup_registration;
