//! Single- and two-layer sigmoid perceptrons trained by online gradient
//! descent with momentum and an adaptive learning rate.

pub mod activation;
pub mod config;
pub mod data;
pub mod error;
pub mod init;
pub mod logging;
pub mod metrics;
pub mod network;
pub mod report;
pub mod trace;
pub mod train;

pub use activation::Sigmoid;
pub use config::{AdaptiveRate, TrainConfig};
pub use data::Dataset;
pub use error::{Error, Result};
pub use init::{init_double, init_single};
pub use network::{SingleLayer, TwoLayer, TwoLayerOutputs};
pub use trace::ErrorTrace;
pub use train::{
    train_double, train_single, Limits, SingleLayerOutcome, StopReason, TwoLayerOutcome,
};

#[macro_export]
macro_rules! assert_rel_eq_arr2 {
    ($actual:expr, $expected:expr) => {
        assert_eq!($actual.shape(), $expected.shape());
        ndarray::Zip::from(&$actual)
            .and(&$expected)
            .for_each(|v, w| {
                assert_relative_eq!(v, w);
            });
    };
}
