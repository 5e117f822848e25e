//! Response bodies for the operational endpoints.

pub mod health;
pub mod whoami;
