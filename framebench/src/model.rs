/*!
    The model interface.
*/

use framepipe_types::Result;

use crate::tensor::{Tensor, TensorSpec};

/**
    An inference model under benchmark.

    The engine behind this trait is a black box; the runner only needs to
    know what geometry to feed it and when an inference failed. `infer`
    takes `&mut self` because most engine bindings mutate internal state
    per invocation.
*/
pub trait Model {
    /// Input geometry and element type, queried once before the run.
    fn input_spec(&self) -> TensorSpec;

    /// Run one inference; output tensors are model-defined.
    fn infer(&mut self, input: &Tensor) -> Result<Vec<Tensor>>;
}
