//! Toy solar production predictor.
//! A tiny regressor fitted in the background on synthetic data, driven from the terminal.
//!
//! # Features
//!
//! - **Small auto-grad core**: Tensors with zero-copy views and broadcasting,
//! recorded into a computation graph when tracked, and minimized with SGD or Adam.
//!
//! - **Background fitting**: The network is fitted on its own thread while the
//! session stays interactive. Its readiness is an explicit [NetworkStatus].
//!
//! - **Clamped predictions**: Outputs are never negative and always shown
//! with two decimals.
//!
//! - **Hourly chart**: A fresh random curve of 24 values is drawn with every screen.
//!
//! # Examples
//!
//! Fitting a regressor by hand:
//! ```
//! use solarcast::{ Tensor, network::*, optimize::{ Optimizer, Adam } };
//! use rand::{ SeedableRng, rngs::StdRng };
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let model = Sequential::regressor(5, 10, 1, &mut rng);
//! let mut regressor = Regressor::compile(model, Optimizer::new(0.001, Adam::default()), Loss::MeanSquaredError);
//!
//! let x = Tensor::randn_with(&[100, 5], &mut rng);
//! let y = Tensor::randn_with(&[100, 1], &mut rng);
//! let report = regressor.fit(&x, &y, &FitOptions { epochs: 10, ..Default::default() }, &mut rng).unwrap();
//! assert_eq!(report.epochs(), 10);
//! ```
//!
//! Predicting once the background fit is done:
//! ```
//! use solarcast::{ AppState, InputField, InputVector, NetworkLifecycle, TrainingConfig };
//!
//! let lifecycle = NetworkLifecycle::start(TrainingConfig::default());
//! let mut state = AppState::new(InputVector::default(), lifecycle);
//! state.set_input(InputField::Temperature, 30.0);
//! state.wait();
//! println!("{}", state.request_prediction().unwrap());
//! ```
//!
//! # Optional features
//!
//! - `unsafe` *(default)*: Accelerated matrix math using [matrixmultiply] crate.

mod internal;
mod shape;
mod tensor;
mod variable;

pub mod ops;
pub mod scalar;
pub mod optimize;
pub mod network;
pub mod data;
pub mod input;
pub mod lifecycle;
pub mod prediction;
pub mod chart;
pub mod state;
pub mod ui;
pub mod config;
pub mod error;
pub mod logging;

pub use shape::Shape;
pub use tensor::{ Tensor, Gemm };
pub use variable::{ Variable, UnaryOp, BinaryOp };
pub use error::{ Error, Result };
pub use input::{ InputField, InputVector };
pub use lifecycle::{ NetworkLifecycle, NetworkStatus, TrainedNetwork };
pub use prediction::PredictionResult;
pub use state::AppState;
pub use config::{ AppConfig, TrainingConfig };
