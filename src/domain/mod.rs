// Domain layer: the form model and the seams to the network and the user.

pub mod model;
pub mod ports;
