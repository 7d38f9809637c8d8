pub mod mog2_background_model;
