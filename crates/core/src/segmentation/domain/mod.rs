pub mod background_model;
pub mod mask_conditioner;
pub mod mask_refiner;
pub mod temporal_smoother;
