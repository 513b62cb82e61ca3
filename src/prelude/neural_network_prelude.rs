pub use crate::neural_network::activation::Activation;
pub use crate::neural_network::layer::{Dense, LayerSpec};
pub use crate::neural_network::loss_function::CategoricalCrossEntropy;
pub use crate::neural_network::network::{
    ACCURACY_REPORT_INTERVAL, ForwardCache, LayerCache, LayerGradient, NeuralNetwork,
};
