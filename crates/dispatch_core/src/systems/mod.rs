pub mod fleet_step;
pub mod vehicle_state;
