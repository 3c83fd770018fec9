//! External ML inference plugin for `marinetext-classifiers`.
//!
//! This crate provides a Candle/HuggingFace-backed implementation of
//! `ModelLoaderPlugin` that `ModelRegistry::load` uses to build the
//! dashboard's three pretrained classifiers.

pub mod external_ml_loader;

pub use external_ml_loader::ExternalMlModelLoader;
