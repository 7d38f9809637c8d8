pub mod cpu_gaussian_blurrer;
