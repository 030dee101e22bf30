pub mod helpers;
mod paths;
mod properties;
